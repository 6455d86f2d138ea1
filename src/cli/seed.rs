use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use axum::body::Bytes;
use clap::Parser;
use indicatif::ProgressBar;
use log::info;
use regex::Regex;
use walkdir::WalkDir;

use crate::catalog::{CatalogUpload, add_catalog_image};
use crate::clarifai::{ClarifaiClient, SearchApi};
use crate::cli::SubCommandExtend;
use crate::config::{ClarifaiOptions, Opts, S3Options};
use crate::db::{self, Database};
use crate::storage::{ObjectStore, S3Store};
use crate::utils::pb_style;

#[derive(Parser, Debug, Clone)]
pub struct SeedCommand {
    #[command(flatten)]
    pub s3: S3Options,
    #[command(flatten)]
    pub clarifai: ClarifaiOptions,
    /// 商品图片所在目录，文件名（不含扩展名）作为商品名称
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png,webp")]
    pub suffix: String,
    /// 商品分类，不填则使用图片所在的目录名
    #[arg(long)]
    pub category: Option<String>,
}

impl SubCommandExtend for SeedCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        if !self.path.is_dir() {
            return Err(anyhow!("不是目录: {}", self.path.display()));
        }

        let re_suf = format!("(?i)^({})$", self.suffix.replace(',', "|"));
        let re_suf = Regex::new(&re_suf)?;

        let db = db::init_db(opts.database()).await?;
        let objects = S3Store::from_options(&self.s3).await?;
        let search_api = ClarifaiClient::from_options(&self.clarifai);

        let files: Vec<PathBuf> = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension().is_some_and(|ext| re_suf.is_match(&ext.to_string_lossy()))
            })
            .collect();

        let pb = ProgressBar::new(files.len() as u64).with_style(pb_style());
        let added = self.seed_files(&db, &objects, &search_api, &files, &pb).await;

        pb.finish_with_message("导入完成");
        info!("共导入 {added} 张商品图片");

        Ok(())
    }
}

impl SeedCommand {
    fn category_of(&self, path: &Path) -> String {
        if let Some(category) = &self.category {
            return category.clone();
        }
        path.parent()
            .filter(|parent| *parent != self.path.as_path())
            .and_then(|parent| parent.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// 逐个导入文件，单个文件失败只打印错误，返回成功导入的数量
    async fn seed_files(
        &self,
        db: &Database,
        objects: &dyn ObjectStore,
        search_api: &dyn SearchApi,
        files: &[PathBuf],
        pb: &ProgressBar,
    ) -> usize {
        let mut added = 0;
        for path in files {
            pb.inc(1);
            match self.seed_file(db, objects, search_api, path).await {
                Ok(image_url) => {
                    added += 1;
                    pb.set_message(image_url);
                }
                Err(e) => pb.println(format!("[ERR] {}: {e:#}", path.display())),
            }
        }
        added
    }

    /// 上传、写入数据库，然后等待索引完成
    async fn seed_file(
        &self,
        db: &Database,
        objects: &dyn ObjectStore,
        search_api: &dyn SearchApi,
        path: &Path,
    ) -> anyhow::Result<String> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("无法读取文件: {}", path.display()))?;
        let upload = CatalogUpload {
            name: path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default(),
            category: self.category_of(path),
            file_name: path.file_name().map(|s| s.to_string_lossy().into_owned()),
            // 由文件内容识别
            content_type: None,
            data: Bytes::from(data),
        };
        let metadata = upload.metadata();

        let image_url = add_catalog_image(db, objects, upload).await?;
        search_api.index(&image_url, Some(metadata)).await?;
        Ok(image_url)
    }
}
