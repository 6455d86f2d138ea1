use anyhow::{Context, Result};
use axum::body::Bytes;
use log::info;

use crate::clarifai::Metadata;
use crate::db::{Database, crud};
use crate::storage::{ObjectStore, object_key, sniff_content_type};

/// 待加入商品目录的图片
pub struct CatalogUpload {
    pub name: String,
    pub category: String,
    /// 客户端提供的原始文件名
    pub file_name: Option<String>,
    /// 客户端声明的 MIME 类型，只在无法从内容识别时使用
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl CatalogUpload {
    pub fn metadata(&self) -> Metadata {
        Metadata { name: Some(self.name.clone()), category: Some(self.category.clone()) }
    }
}

/// 上传图片到对象存储并写入商品目录，返回图片的公开地址
///
/// 不负责索引，由调用方决定同步等待还是放到后台执行
pub async fn add_catalog_image(
    db: &Database,
    objects: &dyn ObjectStore,
    upload: CatalogUpload,
) -> Result<String> {
    let key = object_key(upload.file_name.as_deref());
    let content_type = sniff_content_type(&upload.data).or(upload.content_type.as_deref());
    let image_url = objects.put(&key, upload.data, content_type).await?;

    crud::add_catalog_image(db, &upload.name, &upload.category, &image_url)
        .await
        .context("保存商品图片失败")?;
    info!("商品图片已保存: {} ({}) -> {}", upload.name, upload.category, image_url);

    Ok(image_url)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::db::init_memory_db;

    /// 记录写入时使用的 MIME 类型
    #[derive(Default)]
    struct RecordingStore {
        content_types: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn put(&self, key: &str, _data: Bytes, content_type: Option<&str>) -> Result<String> {
            self.content_types.lock().unwrap().push(content_type.map(str::to_string));
            Ok(format!("https://cdn.example.com/{key}"))
        }
    }

    fn upload(file_name: &str, content_type: Option<&str>, data: &'static [u8]) -> CatalogUpload {
        CatalogUpload {
            name: "Chair".to_string(),
            category: "Furniture".to_string(),
            file_name: Some(file_name.to_string()),
            content_type: content_type.map(str::to_string),
            data: Bytes::from_static(data),
        }
    }

    #[tokio::test]
    async fn stores_object_then_record() {
        let db = init_memory_db().await.unwrap();
        let store = RecordingStore::default();

        let url = add_catalog_image(&db, &store, upload("chair.jpg", Some("image/jpeg"), b"jpeg"))
            .await
            .unwrap();

        assert!(url.starts_with("https://cdn.example.com/"));
        assert!(url.ends_with("_chair.jpg"));

        let images = crud::get_catalog_images(&db).await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].image_url, url);
        assert_eq!(images[0].name, "Chair");
    }

    #[tokio::test]
    async fn content_type_follows_bytes() {
        let db = init_memory_db().await.unwrap();
        let store = RecordingStore::default();

        let png = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
        add_catalog_image(&db, &store, upload("mislabeled.jpeg", Some("image/jpeg"), png)).await.unwrap();
        add_catalog_image(&db, &store, upload("unknown.bin", Some("image/avif"), b"????")).await.unwrap();
        add_catalog_image(&db, &store, upload("none", None, b"????")).await.unwrap();

        let content_types = store.content_types.lock().unwrap().clone();
        assert_eq!(
            content_types,
            vec![Some("image/png".to_string()), Some("image/avif".to_string()), None]
        );
    }
}
