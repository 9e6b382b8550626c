//! Row construction shared by the delimited-text and spreadsheet parsers.
//!
//! Both formats reduce to "a header list followed by value lists"; this
//! module turns that shape into [`RowRecord`]s.

use crate::models::RowRecord;

/// Returns true when every value is blank after trimming (or there are none).
pub fn is_blank_row(values: &[String]) -> bool {
    values.iter().all(|v| v.trim().is_empty())
}

/// Builds one row from a header list and a value list.
///
/// Headers and values are paired positionally and truncated to the shorter
/// list. The search text is the first value, or empty. Returns `None` for a
/// row whose values are all blank.
pub fn build_row(headers: &[String], values: Vec<String>, source_file: &str) -> Option<RowRecord> {
    if is_blank_row(&values) {
        return None;
    }
    let search_text = values.first().cloned().unwrap_or_default();
    let pairs = headers.iter().cloned().zip(values);
    Some(RowRecord::new(search_text, pairs, source_file))
}

/// Accumulates rows: the first pushed value list becomes the header.
#[derive(Debug)]
pub struct RowBuilder {
    source_file: String,
    headers: Option<Vec<String>>,
    rows: Vec<RowRecord>,
}

impl RowBuilder {
    pub fn new(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            headers: None,
            rows: Vec::new(),
        }
    }

    /// Feeds the next line of values.
    pub fn push(&mut self, values: Vec<String>) {
        match &self.headers {
            None => {
                tracing::debug!(headers = ?values, "header row");
                self.headers = Some(values);
            }
            Some(headers) => {
                if let Some(row) = build_row(headers, values, &self.source_file) {
                    self.rows.push(row);
                }
            }
        }
    }

    pub fn finish(self) -> Vec<RowRecord> {
        self.rows
    }
}
