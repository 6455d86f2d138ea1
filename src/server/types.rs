use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use utoipa::ToSchema;

/// 单张图片上传
#[derive(TryFromMultipart)]
pub struct ImageRequest {
    pub image: Option<FieldData<Bytes>>,
}

/// 商品图片导入
#[derive(TryFromMultipart)]
pub struct SeedRequest {
    pub image: Option<FieldData<Bytes>>,
    pub name: Option<String>,
    pub category: Option<String>,
}

/// 单张图片上传表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct ImageForm {
    /// 上传的图片文件
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
}

/// 商品图片导入表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct SeedForm {
    /// 商品图片
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: String,
    /// 商品名称
    pub name: Option<String>,
    /// 商品分类
    pub category: Option<String>,
}
