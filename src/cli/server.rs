use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use prometheus::{BasicAuthentication, labels};
use tokio::net::TcpListener;
use tokio::task::spawn_blocking;
use tokio::time::{Duration, sleep};

use crate::clarifai::ClarifaiClient;
use crate::cli::SubCommandExtend;
use crate::config::{ClarifaiOptions, S3Options, SearchOptions, parse_basic_auth};
use crate::storage::{LocalStore, S3Store};
use crate::server::Views;
use crate::{Opts, db, server};

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub s3: S3Options,
    #[command(flatten)]
    pub clarifai: ClarifaiOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 监听地址
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,
    /// 监听端口
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// 静态文件目录，本地上传的图片保存在其中的 uploads 子目录
    #[arg(long, value_name = "DIR", default_value = "public")]
    pub public_dir: PathBuf,
    /// 请求体大小上限，单位为字节
    #[arg(long, value_name = "BYTES", default_value_t = server::DEFAULT_BODY_LIMIT)]
    pub max_upload_size: usize,
    /// prometheus 主动推送地址
    #[arg(long, value_name = "URL")]
    pub prometheus_push: Option<String>,
    /// 自定义 instance 标签值
    #[arg(long, value_name = "NAME")]
    pub prometheus_instance: Option<String>,
    /// prometheus 认证信息，格式为 username:password
    #[arg(long, value_name = "AUTH", value_parser = parse_basic_auth)]
    pub prometheus_auth: Option<(String, String)>,
}

impl ServerCommand {
    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn spawn_metrics_push(&self, url: String) {
        let instance = self.prometheus_instance.clone().unwrap_or_else(|| self.addr());
        let auth = self.prometheus_auth.clone();
        tokio::spawn(async move {
            loop {
                let metric_families = prometheus::gather();
                let url = url.clone();
                let instance = instance.clone();
                let auth = auth.clone();
                let r = spawn_blocking(move || {
                    prometheus::push_metrics(
                        "vpmatch",
                        labels! {
                            "instance".to_string() => instance,
                        },
                        &url,
                        metric_families,
                        auth.map(|(username, password)| BasicAuthentication { username, password }),
                    )
                })
                .await;
                match r {
                    Ok(Err(e)) => error!("推送指标失败: {e}"),
                    Err(e) => error!("推送指标任务异常: {e}"),
                    Ok(Ok(())) => {}
                }
                sleep(Duration::from_secs(30)).await;
            }
        });
    }
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let db = db::init_db(opts.database()).await?;

        let uploads = LocalStore::create(self.public_dir.join("uploads"), "/uploads").await?;
        let objects = S3Store::from_options(&self.s3).await?;
        let search_api = ClarifaiClient::from_options(&self.clarifai);

        // 创建应用状态
        let state = Arc::new(server::AppState {
            db,
            uploads: Arc::new(uploads),
            objects: Arc::new(objects),
            search_api: Arc::new(search_api),
            public_dir: self.public_dir.clone(),
            min_score: self.search.min_score,
            body_limit: self.max_upload_size,
            views: Views::new()?,
        });

        // 创建应用
        let app = server::create_app(state);

        if let Some(url) = self.prometheus_push.clone() {
            self.spawn_metrics_push(url);
        }

        // 启动服务器
        let addr = self.addr();
        info!("服务器启动：http://{addr}");
        let listener = TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
