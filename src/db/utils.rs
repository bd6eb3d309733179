use anyhow::{Context, Result};
use serde_json::Value;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

pub const STORAGE_PREFIX: &str = "fund-tracker";

pub const TRACKED_FUNDS: &str = "trackedFunds";
pub const USER_HOLDINGS: &str = "userHoldings";
pub const WALLETS: &str = "wallets";
pub const SETTINGS: &str = "settings";
pub const PRECIOUS_METALS: &str = "preciousMetals";
pub const MARKET_INDICES: &str = "marketIndices";
pub const MACRO_ECONOMIC_DATA: &str = "macroEconomicData";

pub fn storage_key(name: &str) -> String {
    format!("{}:{}", STORAGE_PREFIX, name)
}

pub fn metal_history_key(series: &str) -> String {
    format!("preciousMetalHistory:{}", series)
}

pub async fn select_value(connection: &Pool<Sqlite>, key: &str) -> Result<Option<Value>> {
    let row = sqlx::query(
        r#"
        SELECT value FROM kv_store
        WHERE key = ?
        "#,
    )
    .bind(key)
    .fetch_optional(connection)
    .await?;

    row.map(|r| parse_value_from_row(&r, key)).transpose()
}

pub async fn upsert_value(connection: &Pool<Sqlite>, key: &str, value: &Value) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO kv_store (key, value, updated_at)
        VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(connection)
    .await
    .with_context(|| format!("Failed to write '{}'", key))?;

    Ok(())
}

pub async fn upsert_values(connection: &Pool<Sqlite>, values: &[(String, Value)]) -> Result<()> {
    let mut tx = connection.begin().await?;

    for (key, value) in values {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value.to_string())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to write '{}'", key))?;
    }

    tx.commit().await?;
    Ok(())
}

pub async fn delete_value(connection: &Pool<Sqlite>, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM kv_store WHERE key = ?")
        .bind(key)
        .execute(connection)
        .await?;
    Ok(())
}

fn parse_value_from_row(row: &SqliteRow, key: &str) -> Result<Value> {
    let text: String = row
        .try_get("value")
        .with_context(|| format!("Failed to read value for '{}'", key))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to decode value for '{}'", key))
}
