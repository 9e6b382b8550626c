use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Creates the schema on an open pool. Idempotent.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // One row per data line of the loaded file
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS row_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            search_text TEXT NOT NULL,
            file_name TEXT NOT NULL,
            fields_json TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_row_records_file_name ON row_records(file_name)")
        .execute(pool)
        .await?;

    Ok(())
}
