use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::error;

/// API错误类型
///
/// 返回给客户端的只有固定的提示文本，具体错误写入日志
#[derive(Debug)]
pub enum AppError {
    BadRequest(&'static str),
    Internal(&'static str, anyhow::Error),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::Internal(msg, err) => {
                error!("{msg}: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response()
            }
        }
    }
}

pub trait ResultExt<T> {
    /// 将任意错误转换为 500，并附带给客户端的提示文本
    fn or_500(self, msg: &'static str) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn or_500(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| AppError::Internal(msg, e.into()))
    }
}
