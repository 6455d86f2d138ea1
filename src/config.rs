use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use clap::{Parser, Subcommand};
use directories::ProjectDirs;

use crate::clarifai::{DEFAULT_API_URL, DEFAULT_MIN_SCORE};
use crate::cli::*;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs = ProjectDirs::from("", "vpmatch", "vpmatch").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct S3Options {
    /// 存储桶名称
    #[arg(long, env = "AWS_BUCKET_NAME")]
    pub bucket: String,
    /// 存储桶所在区域
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,
    /// 自定义 S3 兼容服务地址，例如 MinIO
    #[arg(long, value_name = "URL", env = "AWS_ENDPOINT_URL")]
    pub s3_endpoint: Option<String>,
    /// 对象的公开访问前缀，不填则根据存储桶和区域推断
    #[arg(long, value_name = "URL", env = "S3_PUBLIC_URL")]
    pub public_url: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClarifaiOptions {
    /// Clarifai API key
    #[arg(long, env = "CLARIFAI_API_KEY", hide_env_values = true)]
    pub clarifai_api_key: String,
    /// Clarifai API 地址
    #[arg(long, value_name = "URL", env = "CLARIFAI_API_URL", default_value = DEFAULT_API_URL)]
    pub clarifai_url: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 相似度阈值，只显示严格大于该值的结果
    #[arg(long, value_name = "SCORE", default_value_t = DEFAULT_MIN_SCORE)]
    pub min_score: f64,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "vpmatch", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// vpmatch 配置目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
    /// 数据库文件路径，默认为配置目录下的 vpmatch.db
    #[arg(long, value_name = "FILE", env = "VPMATCH_DATABASE")]
    pub database: Option<PathBuf>,
}

impl Opts {
    pub fn database(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| self.conf_dir.database())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 启动 HTTP 服务
    Server(ServerCommand),
    /// 批量导入目录中的商品图片
    Seed(SeedCommand),
    /// 查看数据库中的记录
    Show(ShowCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回数据库文件的路径
    pub fn database(&self) -> PathBuf {
        self.path.join("vpmatch.db")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

/// 解析 `username:password` 格式的认证信息
pub fn parse_basic_auth(s: &str) -> Result<(String, String), String> {
    match s.split_once(':') {
        Some((username, password)) => Ok((username.to_string(), password.to_string())),
        None => Err(format!("无效的认证信息，应为 username:password: {s}")),
    }
}
