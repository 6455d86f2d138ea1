use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{Html, Redirect};
use axum_typed_multipart::{FieldData, TypedMultipart};
use log::{debug, error, info};

use super::error::{AppError, Result, ResultExt};
use super::state::AppState;
use super::types::*;
use crate::catalog::{self, CatalogUpload};
use crate::clarifai::{Metadata, SearchApi, filter_hits};
use crate::db::crud;
use crate::metrics;
use crate::storage::{object_key, sniff_content_type, upload_file_name};

const NO_FILE: &str = "No file uploaded";
const SAVE_FAILED: &str = "Error saving image";
const RETRIEVE_FAILED: &str = "Error retrieving images";
const SEED_FAILED: &str = "Upload failed";
const SEARCH_FAILED: &str = "Error searching for similar images";
const RENDER_FAILED: &str = "Error rendering page";

/// 取出上传的文件，没有文件名的部分视为未上传
fn require_file(field: Option<FieldData<Bytes>>) -> Result<FieldData<Bytes>> {
    match field {
        Some(file) if file.metadata.file_name.as_deref().is_some_and(|name| !name.is_empty()) => {
            Ok(file)
        }
        _ => Err(AppError::BadRequest(NO_FILE)),
    }
}

/// 首页
pub async fn home_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    state.views.home().or_500(RENDER_FAILED)
}

/// 上传一张图片，替换之前上传的图片
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 303, description = "跳转到 /result"),
        (status = 400, description = "没有上传文件"),
    )
)]
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    TypedMultipart(data): TypedMultipart<ImageRequest>,
) -> Result<Redirect> {
    let result = upload(&state, data).await;
    metrics::inc_request("upload", result.is_ok());
    result
}

async fn upload(state: &AppState, data: ImageRequest) -> Result<Redirect> {
    let file = require_file(data.image)?;
    let file_name = upload_file_name(file.metadata.file_name.as_deref());

    let image_url = state
        .uploads
        .put(&file_name, file.contents, file.metadata.content_type.as_deref())
        .await
        .or_500(SAVE_FAILED)?;
    crud::replace_uploaded_image(&state.db, &image_url).await.or_500(SAVE_FAILED)?;
    info!("图片已上传: {image_url}");

    Ok(Redirect::to("/result"))
}

/// 查看最近上传的图片
pub async fn result_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let images = crud::get_uploaded_images(&state.db).await.or_500(RETRIEVE_FAILED)?;
    state.views.result(&images).or_500(RETRIEVE_FAILED)
}

/// 商品图片导入页面
pub async fn admin_handler(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    state.views.admin().or_500(RENDER_FAILED)
}

/// 导入商品图片
///
/// 图片保存后立即返回，索引在后台进行，失败只会记录日志
#[utoipa::path(
    post,
    path = "/admin",
    request_body(content = SeedForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "图片的公开地址", body = String, content_type = "text/plain"),
        (status = 400, description = "没有上传文件"),
    )
)]
pub async fn seed_handler(
    State(state): State<Arc<AppState>>,
    TypedMultipart(data): TypedMultipart<SeedRequest>,
) -> Result<String> {
    let result = seed(&state, data).await;
    metrics::inc_request("seed", result.is_ok());
    result
}

async fn seed(state: &AppState, data: SeedRequest) -> Result<String> {
    let file = require_file(data.image)?;
    let upload = CatalogUpload {
        name: data.name.unwrap_or_default(),
        category: data.category.unwrap_or_default(),
        file_name: file.metadata.file_name,
        content_type: file.metadata.content_type,
        data: file.contents,
    };
    let metadata = upload.metadata();

    let image_url = catalog::add_catalog_image(&state.db, state.objects.as_ref(), upload)
        .await
        .or_500(SEED_FAILED)?;

    spawn_index(state.search_api.clone(), image_url.clone(), metadata);

    Ok(format!("Image uploaded: {image_url}"))
}

/// 在后台提交索引，不等待结果
fn spawn_index(api: Arc<dyn SearchApi>, image_url: String, metadata: Metadata) {
    tokio::spawn(async move {
        match api.index(&image_url, Some(metadata)).await {
            Ok(()) => info!("图片已加入索引: {image_url}"),
            Err(e) => {
                metrics::inc_index_failure();
                error!("图片索引失败: {image_url}: {e:#}");
            }
        }
    });
}

/// 搜索相似图片
///
/// NOTE: 查询图片本身也会被加入索引，之后的搜索可能会返回它
#[utoipa::path(
    post,
    path = "/search-similar",
    request_body(content = ImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "相似图片列表", content_type = "text/html"),
        (status = 400, description = "没有上传文件"),
    )
)]
pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    TypedMultipart(data): TypedMultipart<ImageRequest>,
) -> Result<Html<String>> {
    let result = search(&state, data).await;
    metrics::inc_request("search", result.is_ok());
    result
}

async fn search(state: &AppState, data: ImageRequest) -> Result<Html<String>> {
    let file = require_file(data.image)?;
    let key = object_key(file.metadata.file_name.as_deref());
    let content_type =
        sniff_content_type(&file.contents).or(file.metadata.content_type.as_deref());

    let image_url = state
        .objects
        .put(&key, file.contents, content_type)
        .await
        .or_500(SEARCH_FAILED)?;
    info!("查询图片已上传: {image_url}");

    // 先索引再搜索，索引失败时不会发起搜索
    state.search_api.index(&image_url, None).await.or_500(SEARCH_FAILED)?;
    let hits = state.search_api.search(&image_url).await.or_500(SEARCH_FAILED)?;

    let total = hits.len();
    let hits = filter_hits(hits, state.min_score);
    debug!("搜索结果: {} 条，过滤后 {} 条", total, hits.len());
    metrics::observe_search_hits(hits.len());

    state.views.results(&hits).or_500(SEARCH_FAILED)
}
