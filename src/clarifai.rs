//! Clarifai v2 视觉搜索接口
//!
//! 只用到两个接口：`POST /inputs` 把图片加入索引，`POST /searches` 按图片搜索相似图片

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::ClarifaiOptions;

pub const DEFAULT_API_URL: &str = "https://api.clarifai.com/v2";

/// 默认的相似度阈值，只保留严格大于该值的结果
pub const DEFAULT_MIN_SCORE: f64 = 0.5;

/// 远程视觉搜索服务
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// 将图片加入索引
    async fn index(&self, image_url: &str, metadata: Option<Metadata>) -> Result<()>;
    /// 搜索相似图片，结果按相似度降序排列
    async fn search(&self, image_url: &str) -> Result<Vec<Hit>>;
}

/// 附加在索引图片上的元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_string")]
    pub category: Option<String>,
}

/// 远程索引中的元数据不一定由本服务写入，数字和布尔值转为字符串，其它类型忽略
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub data: InputData,
}

impl Input {
    fn from_url(image_url: &str, metadata: Option<Metadata>) -> Self {
        Self {
            id: String::new(),
            data: InputData { image: Some(ImageData { url: image_url.to_string() }), metadata },
        }
    }
}

/// 一条搜索结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub score: f64,
    #[serde(default)]
    pub input: Input,
}

impl Hit {
    /// 远程服务中的 input ID
    pub fn reference(&self) -> &str {
        &self.input.id
    }

    pub fn image_url(&self) -> Option<&str> {
        self.input.data.image.as_ref().map(|image| image.url.as_str())
    }

    pub fn name(&self) -> Option<&str> {
        self.input.data.metadata.as_ref()?.name.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.input.data.metadata.as_ref()?.category.as_deref()
    }
}

#[derive(Serialize)]
struct IndexRequest {
    inputs: Vec<Input>,
}

#[derive(Serialize)]
struct SearchRequest {
    query: Query,
}

#[derive(Serialize)]
struct Query {
    ands: Vec<And>,
}

#[derive(Serialize)]
struct And {
    input: Input,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

impl IndexRequest {
    fn new(image_url: &str, metadata: Option<Metadata>) -> Self {
        Self { inputs: vec![Input::from_url(image_url, metadata)] }
    }
}

impl SearchRequest {
    fn new(image_url: &str) -> Self {
        Self { query: Query { ands: vec![And { input: Input::from_url(image_url, None) }] } }
    }
}

/// 只保留相似度严格大于 `min_score` 的结果，保持原有顺序
pub fn filter_hits(hits: Vec<Hit>, min_score: f64) -> Vec<Hit> {
    hits.into_iter().filter(|hit| hit.score > min_score).collect()
}

pub struct ClarifaiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ClarifaiClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), api_key: api_key.into() }
    }

    pub fn from_options(opts: &ClarifaiOptions) -> Self {
        Self::new(&opts.clarifai_url, &opts.clarifai_api_key)
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        debug!("POST {url}");

        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Key {}", self.api_key))
            .json(body)
            .send()
            .await
            .with_context(|| format!("请求 {url} 失败"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("{url} 返回 {status}: {text}");
        }
        Ok(resp)
    }
}

#[async_trait]
impl SearchApi for ClarifaiClient {
    async fn index(&self, image_url: &str, metadata: Option<Metadata>) -> Result<()> {
        self.post("inputs", &IndexRequest::new(image_url, metadata)).await?;
        Ok(())
    }

    async fn search(&self, image_url: &str) -> Result<Vec<Hit>> {
        let resp = self.post("searches", &SearchRequest::new(image_url)).await?;
        let resp: SearchResponse = resp.json().await.context("无法解析搜索结果")?;
        Ok(resp.hits)
    }
}
