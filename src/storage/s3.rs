use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Bytes;
use log::{debug, info};
use reqwest::Url;

use super::ObjectStore;
use crate::config::S3Options;

/// S3 兼容的对象存储
pub struct S3Store {
    client: Client,
    bucket: String,
    public_base: Url,
}

impl S3Store {
    pub fn new(client: Client, bucket: impl Into<String>, public_base: Url) -> Self {
        Self { client, bucket: bucket.into(), public_base }
    }

    /// 根据命令行参数创建客户端
    ///
    /// 凭证使用 AWS SDK 默认的查找顺序：环境变量、共享凭证文件、实例角色
    pub async fn from_options(opts: &S3Options) -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(opts.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&config);
        if let Some(endpoint) = &opts.s3_endpoint {
            // 自建的 S3 兼容服务一般不支持虚拟主机风格的地址
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        let public_base = Url::parse(&public_base(opts))?;
        info!("对象存储: {} -> {}", opts.bucket, public_base);

        Ok(Self::new(client, &opts.bucket, public_base))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<String> {
        debug!("上传对象: {} ({} 字节)", key, data.len());
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .set_content_type(content_type.map(str::to_string))
            .send()
            .await
            .with_context(|| format!("上传到 S3 失败: {key}"))?;

        Ok(object_url(&self.public_base, key)?.to_string())
    }
}

/// 存储桶的公开访问前缀
fn public_base(opts: &S3Options) -> String {
    match (&opts.public_url, &opts.s3_endpoint) {
        (Some(url), _) => url.clone(),
        (None, Some(endpoint)) => format!("{}/{}", endpoint.trim_end_matches('/'), opts.bucket),
        (None, None) => format!("https://{}.s3.{}.amazonaws.com", opts.bucket, opts.region),
    }
}

/// 拼接对象的公开地址，键名会作为一个路径段进行转义
pub fn object_url(base: &Url, key: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("无效的公开地址: {base}"))?
        .pop_if_empty()
        .push(key);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(endpoint: Option<&str>, public_url: Option<&str>) -> S3Options {
        S3Options {
            bucket: "products".to_string(),
            region: "eu-west-1".to_string(),
            s3_endpoint: endpoint.map(str::to_string),
            public_url: public_url.map(str::to_string),
        }
    }

    #[test]
    fn public_base_defaults_to_aws() {
        assert_eq!(public_base(&options(None, None)), "https://products.s3.eu-west-1.amazonaws.com");
        assert_eq!(
            public_base(&options(Some("http://localhost:9000/"), None)),
            "http://localhost:9000/products"
        );
        assert_eq!(
            public_base(&options(Some("http://localhost:9000"), Some("https://cdn.example.com"))),
            "https://cdn.example.com"
        );
    }

    #[test]
    fn object_url_escapes_key() {
        let base = Url::parse("https://products.s3.eu-west-1.amazonaws.com").unwrap();
        let url = object_url(&base, "1700000000000_red chair.jpg").unwrap();
        assert_eq!(
            url.as_str(),
            "https://products.s3.eu-west-1.amazonaws.com/1700000000000_red%20chair.jpg"
        );

        let base = Url::parse("http://localhost:9000/products/").unwrap();
        let url = object_url(&base, "k.png").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/products/k.png");
    }
}
