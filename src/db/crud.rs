use sqlx::types::Json;
use sqlx::{Executor, Result, Sqlite, SqlitePool};

use super::{CatalogImageRecord, UploadedImageRecord};

/// 清空已上传图片，并写入新的一条记录
///
/// 删除和插入在同一个事务中完成，保证结束后恰好只有一条记录
pub async fn replace_uploaded_image(executor: &SqlitePool, image_url: &str) -> Result<i64> {
    let mut tx = executor.begin().await?;
    sqlx::query("DELETE FROM uploaded_image").execute(&mut *tx).await?;
    let id = sqlx::query_scalar(
        r#"
        INSERT INTO uploaded_image (image_url)
        VALUES (?)
        RETURNING id
        "#,
    )
    .bind(image_url)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(id)
}

/// 获取所有已上传图片
pub async fn get_uploaded_images(executor: &SqlitePool) -> Result<Vec<UploadedImageRecord>> {
    sqlx::query_as("SELECT id, image_url FROM uploaded_image ORDER BY id ASC")
        .fetch_all(executor)
        .await
}

/// 添加商品目录图片
pub async fn add_catalog_image<'c, E>(
    executor: E,
    name: &str,
    category: &str,
    image_url: &str,
) -> Result<i64>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"
        INSERT INTO catalog_image (name, category, image_url, embedding)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(category)
    .bind(image_url)
    .bind(Json(Vec::<f32>::new()))
    .fetch_one(executor)
    .await
}

/// 获取所有商品目录图片
pub async fn get_catalog_images(executor: &SqlitePool) -> Result<Vec<CatalogImageRecord>> {
    sqlx::query_as(
        r#"
        SELECT id, name, category, image_url, embedding
        FROM catalog_image
        ORDER BY id ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn count_catalog_images(executor: &SqlitePool) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM catalog_image").fetch_one(executor).await
}
