use std::path::Path;

use anyhow::{Context, Result};
use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePool, SqliteQueryResult},
};

pub async fn connect(path: &Path) -> Result<Pool<Sqlite>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let connection = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;

    create_kv_store(&connection).await?;

    Ok(connection)
}

pub async fn connect_in_memory() -> Result<Pool<Sqlite>> {
    // A single connection keeps every query on the same in-memory database.
    let connection = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    create_kv_store(&connection).await?;

    Ok(connection)
}

pub async fn create_kv_store(
    connection: &sqlx::Pool<sqlx::Sqlite>,
) -> Result<SqliteQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(connection)
    .await
}
