//! In-memory [`RowRepository`] implementation for tests and library callers.
//!
//! Rows are kept in their encoded form behind a `std::sync::RwLock`, so the
//! same encode/decode path as a durable backend is exercised.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::RowRecord;

use super::{decode_fields, encode_fields, RowRepository};

struct StoredRow {
    search_text: String,
    file_name: String,
    fields_json: String,
}

/// In-memory repository.
pub struct InMemoryRepository {
    rows: RwLock<Vec<StoredRow>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RowRepository for InMemoryRepository {
    async fn save_all(&self, rows: &[RowRecord], file_name: &str) -> Result<()> {
        let encoded = rows
            .iter()
            .map(|row| {
                Ok(StoredRow {
                    search_text: row.search_text().to_string(),
                    file_name: file_name.to_string(),
                    fields_json: encode_fields(row.fields())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut stored = self.rows.write().map_err(|_| anyhow!("repository lock poisoned"))?;
        *stored = encoded;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<RowRecord>> {
        let stored = self.rows.read().map_err(|_| anyhow!("repository lock poisoned"))?;
        stored
            .iter()
            .map(|s| {
                Ok(RowRecord::new(
                    s.search_text.clone(),
                    decode_fields(&s.fields_json)?,
                    s.file_name.clone(),
                ))
            })
            .collect()
    }

    async fn clear(&self) -> Result<()> {
        self.rows
            .write()
            .map_err(|_| anyhow!("repository lock poisoned"))?
            .clear();
        Ok(())
    }
}
