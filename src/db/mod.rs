use std::path::Path;
use std::str::FromStr;

use log::info;
use sqlx::sqlite::*;
use sqlx::SqlitePool;

pub mod crud;
pub mod model;

pub use model::*;

pub type Database = SqlitePool;

pub async fn init_db(filename: impl AsRef<Path>) -> anyhow::Result<Database> {
    let filename = filename.as_ref();
    info!("初始化数据库连接: {}", filename.display());

    if let Some(parent) = filename.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .filename(filename)
        .create_if_missing(true);

    let pool = SqlitePool::connect_with(options).await?;
    migrate(&pool).await?;

    Ok(pool)
}

/// 创建内存数据库，仅保留一个连接，否则每个连接都会看到不同的数据库
pub async fn init_memory_db() -> anyhow::Result<Database> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &Database) -> anyhow::Result<()> {
    info!("检查数据库迁移");
    sqlx::migrate!().run(pool).await?;
    Ok(())
}
