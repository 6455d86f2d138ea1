use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use log::debug;
use reqwest::Url;

use super::{ObjectStore, object_url};

/// 把文件写入本地目录，返回站内路径 `<url_prefix>/<key>`，键名按路径段转义
pub struct LocalStore {
    dir: PathBuf,
    /// 只用到路径部分
    base: Url,
}

impl LocalStore {
    /// 创建存储目录（如果不存在）
    pub async fn create(dir: impl Into<PathBuf>, url_prefix: &str) -> Result<Self> {
        let base = Url::parse("http://localhost/")?
            .join(url_prefix)
            .with_context(|| format!("无效的路径前缀: {url_prefix}"))?;
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("无法创建上传目录: {}", dir.display()))?;
        Ok(Self { dir, base })
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes, _content_type: Option<&str>) -> Result<String> {
        let path = self.dir.join(key);
        debug!("写入文件: {} ({} 字节)", path.display(), data.len());
        tokio::fs::write(&path, &data)
            .await
            .with_context(|| format!("写入文件失败: {}", path.display()))?;
        Ok(object_url(&self.base, key)?.path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_and_returns_url() {
        let root = tempfile::TempDir::new().unwrap();
        let store = LocalStore::create(root.path().join("uploads"), "/uploads/").await.unwrap();

        let url = store.put("1-a.jpg", Bytes::from_static(b"jpeg"), None).await.unwrap();

        assert_eq!(url, "/uploads/1-a.jpg");
        let written = std::fs::read(root.path().join("uploads/1-a.jpg")).unwrap();
        assert_eq!(written, b"jpeg");
    }

    #[tokio::test]
    async fn url_escapes_file_name() {
        let root = tempfile::TempDir::new().unwrap();
        let store = LocalStore::create(root.path(), "/uploads").await.unwrap();

        let url = store.put("1-photo#1 (2).jpg", Bytes::from_static(b"jpeg"), None).await.unwrap();

        assert_eq!(url, "/uploads/1-photo%231%20(2).jpg");
        assert!(root.path().join("1-photo#1 (2).jpg").is_file());
    }
}
