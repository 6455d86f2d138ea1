use std::path::PathBuf;
use std::sync::Arc;

use super::views::Views;
use crate::clarifai::SearchApi;
use crate::db::Database;
use crate::storage::ObjectStore;

/// 应用状态
pub struct AppState {
    /// 数据库连接
    pub db: Database,
    /// 普通上传使用的本地存储
    pub uploads: Arc<dyn ObjectStore>,
    /// 商品图片和查询图片使用的对象存储
    pub objects: Arc<dyn ObjectStore>,
    /// 远程视觉搜索服务
    pub search_api: Arc<dyn SearchApi>,
    /// 静态文件目录，本地上传的图片位于其中的 uploads 子目录
    pub public_dir: PathBuf,
    /// 相似度阈值
    pub min_score: f64,
    /// 请求体大小限制
    pub body_limit: usize,
    /// 页面模板
    pub views: Views,
}
