//! Core data models used throughout rowscan.
//!
//! A [`RowRecord`] is one data line of an ingested file. A [`QueryOutcome`]
//! is what the matcher hands back to callers instead of a raw list.

/// Largest result set still returned as [`QueryOutcome::Multiple`].
pub const MULTIPLE_MATCH_LIMIT: usize = 10;

/// One data row of a loaded file.
///
/// Fields keep the column order of the source file. Header names are unique
/// within a row: when a file repeats a header, the last value wins and the
/// column keeps the position of its first occurrence.
///
/// A record cannot be mutated once built; editing produces a new record via
/// [`RowRecord::with_fields`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    search_text: String,
    fields: Vec<(String, String)>,
    source_file: String,
}

impl RowRecord {
    /// Builds a record from header/value pairs, collapsing duplicate headers.
    pub fn new(
        search_text: impl Into<String>,
        pairs: impl IntoIterator<Item = (String, String)>,
        source_file: impl Into<String>,
    ) -> Self {
        let mut fields: Vec<(String, String)> = Vec::new();
        for (header, value) in pairs {
            match fields.iter_mut().find(|(h, _)| *h == header) {
                Some(slot) => slot.1 = value,
                None => fields.push((header, value)),
            }
        }
        Self {
            search_text: search_text.into(),
            fields,
            source_file: source_file.into(),
        }
    }

    /// Value of the first column; used as the row's short label.
    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Header/value pairs in column order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Name of the file this row was read from.
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Looks up a field value by header name.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Case-insensitive substring test against the search text or any field value.
    pub fn contains_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.search_text.to_lowercase().contains(&needle)
            || self
                .fields
                .iter()
                .any(|(_, value)| value.to_lowercase().contains(&needle))
    }

    /// Label for list views: the search text, or the first non-blank value.
    pub fn label(&self) -> &str {
        if !self.search_text.trim().is_empty() {
            return &self.search_text;
        }
        self.fields
            .iter()
            .map(|(_, v)| v.as_str())
            .find(|v| !v.trim().is_empty())
            .unwrap_or("")
    }

    /// Renders the row as `header: value` blocks separated by blank lines.
    ///
    /// Blank values are left out.
    pub fn formatted(&self) -> String {
        self.fields
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(header, value)| format!("{}: {}", header, value))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Returns a copy of this row with some field values replaced.
    ///
    /// Headers not present in the row are ignored; callers validate them first.
    pub fn with_fields(&self, overrides: &[(String, String)]) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|(header, value)| {
                let value = overrides
                    .iter()
                    .rev()
                    .find(|(h, _)| h == header)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| value.clone());
                (header.clone(), value)
            })
            .collect();
        Self {
            search_text: self.search_text.clone(),
            fields,
            source_file: self.source_file.clone(),
        }
    }
}

/// Result of matching a query against the loaded rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// No row contains the query.
    NoMatch,
    /// Exactly one row matched.
    Unique(RowRecord),
    /// Between two and [`MULTIPLE_MATCH_LIMIT`] rows matched, in dataset order.
    Multiple(Vec<RowRecord>),
    /// More rows matched than a caller can usefully show; carries the count.
    TooMany(usize),
}

impl QueryOutcome {
    /// Classifies a filtered result set by its size.
    pub fn from_matches(mut rows: Vec<RowRecord>) -> Self {
        match rows.len() {
            0 => QueryOutcome::NoMatch,
            1 => QueryOutcome::Unique(rows.remove(0)),
            n if n <= MULTIPLE_MATCH_LIMIT => QueryOutcome::Multiple(rows),
            n => QueryOutcome::TooMany(n),
        }
    }

    /// Number of rows that satisfied the query.
    pub fn match_count(&self) -> usize {
        match self {
            QueryOutcome::NoMatch => 0,
            QueryOutcome::Unique(_) => 1,
            QueryOutcome::Multiple(rows) => rows.len(),
            QueryOutcome::TooMany(n) => *n,
        }
    }
}
