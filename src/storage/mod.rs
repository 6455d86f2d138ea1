mod local;
mod s3;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Bytes;

pub use self::local::LocalStore;
pub use self::s3::{S3Store, object_url};

/// 对象存储，写入数据后返回可公开访问的地址
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<String>;
}

/// 本地上传文件名：`<毫秒时间戳>-<原始文件名>`
pub fn upload_file_name(original: Option<&str>) -> String {
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), base_name(original))
}

/// 对象存储键名：`<毫秒时间戳>_<原始文件名>`
pub fn object_key(original: Option<&str>) -> String {
    format!("{}_{}", chrono::Utc::now().timestamp_millis(), base_name(original))
}

/// 只保留客户端文件名的最后一段，避免写出上传目录
fn base_name(original: Option<&str>) -> &str {
    let name = original.and_then(|s| s.rsplit(['/', '\\']).next()).unwrap_or_default();
    match name {
        "" | "." | ".." => "image",
        name => name,
    }
}

/// 根据文件内容识别 MIME 类型，不依赖扩展名
pub fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    infer::get(data).map(|kind| kind.mime_type())
}
