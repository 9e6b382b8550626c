//! The in-memory row store.
//!
//! A [`RowStore`] holds at most one dataset: the rows of the last loaded
//! file. It is a plain owned value; callers that share it across threads
//! must serialize loads and queries themselves.

use crate::models::RowRecord;

#[derive(Debug, Default, Clone)]
pub struct RowStore {
    rows: Vec<RowRecord>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `rows`.
    pub fn with_rows(rows: Vec<RowRecord>) -> Self {
        Self { rows }
    }

    /// Replaces the current dataset entirely.
    pub fn load(&mut self, rows: Vec<RowRecord>) {
        self.rows = rows;
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Rows of the current dataset, in file order.
    pub fn current(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// File name of the resident dataset, if any rows are loaded.
    pub fn source_file(&self) -> Option<&str> {
        self.rows.first().map(|r| r.source_file())
    }

    /// Per-row predicate used by the matcher.
    pub fn contains_text(row: &RowRecord, needle: &str) -> bool {
        row.contains_text(needle)
    }

    /// Rows matching `needle`, in dataset order.
    pub fn filter(&self, needle: &str) -> Vec<RowRecord> {
        self.rows
            .iter()
            .filter(|row| Self::contains_text(row, needle))
            .cloned()
            .collect()
    }
}
