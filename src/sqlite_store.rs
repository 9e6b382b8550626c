//! SQLite-backed [`RowRepository`] implementation.
//!
//! Rows live in the `row_records` table (see [`migrate`](crate::migrate)).
//! Saving deletes every stored row and bulk-inserts the new dataset in a
//! single transaction, so a failed save leaves the previous dataset intact.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};

use rowscan_core::models::RowRecord;
use rowscan_core::store::{decode_fields, encode_fields, RowRepository};

/// SQLite implementation of the [`RowRepository`] trait.
pub struct SqliteRowRepository {
    pool: SqlitePool,
}

impl SqliteRowRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Number of stored rows and the file they came from.
    pub async fn summary(&self) -> Result<(i64, Option<String>)> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM row_records")
            .fetch_one(&self.pool)
            .await?;
        let file_name: Option<String> =
            sqlx::query_scalar("SELECT file_name FROM row_records ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok((count, file_name))
    }
}

#[async_trait]
impl RowRepository for SqliteRowRepository {
    async fn save_all(&self, rows: &[RowRecord], file_name: &str) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM row_records")
            .execute(&mut *tx)
            .await?;

        for row in rows {
            sqlx::query(
                "INSERT INTO row_records (search_text, file_name, fields_json, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(row.search_text())
            .bind(file_name)
            .bind(encode_fields(row.fields())?)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(file_name, rows = rows.len(), "dataset saved");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<RowRecord>> {
        let stored = sqlx::query(
            "SELECT id, search_text, file_name, fields_json FROM row_records ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        stored
            .iter()
            .map(|r| {
                let id: i64 = r.get("id");
                let fields_json: String = r.get("fields_json");
                let fields = decode_fields(&fields_json)
                    .with_context(|| format!("corrupt field mapping in row {}", id))?;
                Ok(RowRecord::new(
                    r.get::<String, _>("search_text"),
                    fields,
                    r.get::<String, _>("file_name"),
                ))
            })
            .collect()
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM row_records")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
