//! Persistence abstraction for loaded datasets.
//!
//! The [`RowRepository`] trait is the narrow contract between the core and
//! durable storage. A repository holds a single dataset: saving replaces
//! whatever was stored before, matching the one-resident-dataset model of
//! [`RowStore`](crate::dataset::RowStore).
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::RowRecord;

/// Durable storage for the current dataset.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`save_all`](RowRepository::save_all) | Delete everything, then insert `rows` tagged with `file_name` |
/// | [`load_all`](RowRepository::load_all) | Read back every stored row in insertion order |
/// | [`clear`](RowRepository::clear) | Delete every stored row |
///
/// Field mappings must round-trip exactly: order, header names, and values.
#[async_trait]
pub trait RowRepository: Send + Sync {
    /// Replaces the stored dataset with `rows`.
    async fn save_all(&self, rows: &[RowRecord], file_name: &str) -> Result<()>;

    /// Loads the stored dataset.
    async fn load_all(&self) -> Result<Vec<RowRecord>>;

    /// Removes the stored dataset.
    async fn clear(&self) -> Result<()>;
}

/// Encodes a row's fields for storage as a JSON array of `[header, value]` pairs.
///
/// An array keeps column order, which a JSON object would not guarantee.
pub fn encode_fields(fields: &[(String, String)]) -> Result<String> {
    Ok(serde_json::to_string(fields)?)
}

/// Inverse of [`encode_fields`].
pub fn decode_fields(json: &str) -> Result<Vec<(String, String)>> {
    Ok(serde_json::from_str(json)?)
}
