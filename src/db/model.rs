use serde::Serialize;

/// 用户上传的图片，同一时间最多存在一条
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct UploadedImageRecord {
    pub id: i64,
    /// 本地文件的公开路径，例如 `/uploads/1700000000000-chair.jpg`
    pub image_url: String,
}

/// 商品目录图片
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CatalogImageRecord {
    pub id: i64,
    /// 商品名称
    pub name: String,
    /// 商品分类
    pub category: String,
    /// 对象存储返回的公开地址
    pub image_url: String,
    /// 特征向量，目前由远程搜索服务负责计算，本地始终为空
    #[sqlx(json)]
    pub embedding: Vec<f32>,
}
