mod api;
mod error;
mod state;
mod types;
mod views;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use utoipa::OpenApi;

pub use self::state::*;
pub use self::views::Views;

/// 默认上传限制：10M
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024 * 10;

#[derive(OpenApi)]
#[openapi(
    paths(api::upload_handler, api::seed_handler, api::search_handler),
    components(schemas(types::ImageForm, types::SeedForm))
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::home_handler))
        .route("/upload", post(api::upload_handler))
        .route("/result", get(api::result_handler))
        .route("/admin", get(api::admin_handler).post(api::seed_handler))
        .route("/search-similar", post(api::search_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // 其余路径作为静态文件处理，本地上传的图片位于 /uploads 下
        .fallback_service(ServeDir::new(&state.public_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.body_limit))
        .with_state(state)
}
