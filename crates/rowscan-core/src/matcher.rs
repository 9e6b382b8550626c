//! Query matching against the loaded rows.
//!
//! [`match_query`] has no length requirement; the two entry points used by
//! front ends apply their own gates first:
//!
//! | Entry point       | Preprocessing               | Rejected when                  |
//! |-------------------|-----------------------------|--------------------------------|
//! | [`search_text`]   | trim                        | fewer than [`MIN_QUERY_CHARS`] |
//! | [`search_scan`]   | [`scan::normalize`]         | blank                          |

use crate::dataset::RowStore;
use crate::models::QueryOutcome;
use crate::scan;

/// Minimum trimmed length for a typed query, in characters.
pub const MIN_QUERY_CHARS: usize = 2;

/// A query refused before it reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Typed query shorter than [`MIN_QUERY_CHARS`] after trimming.
    TooShort { min: usize },
    /// Scanned code empty after normalization.
    Blank,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::TooShort { min } => {
                write!(f, "enter at least {} characters to search", min)
            }
            QueryError::Blank => write!(f, "code not recognized"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Filters the store by `query` and classifies the result by size.
pub fn match_query(store: &RowStore, query: &str) -> QueryOutcome {
    QueryOutcome::from_matches(store.filter(query))
}

/// Free-text search: the trimmed query must have at least two characters.
pub fn search_text(store: &RowStore, raw: &str) -> Result<QueryOutcome, QueryError> {
    let query = raw.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(QueryError::TooShort {
            min: MIN_QUERY_CHARS,
        });
    }
    Ok(match_query(store, query))
}

/// Scanned-code search: the payload is normalized and must not be blank.
pub fn search_scan(store: &RowStore, raw: &str) -> Result<QueryOutcome, QueryError> {
    let code = scan::normalize(raw);
    if code.is_empty() {
        return Err(QueryError::Blank);
    }
    Ok(match_query(store, &code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowRecord;

    fn store_with(values: &[&str]) -> RowStore {
        RowStore::with_rows(
            values
                .iter()
                .map(|v| {
                    RowRecord::new(
                        *v,
                        vec![
                            ("Name".to_string(), v.to_string()),
                            ("Code".to_string(), format!("C-{}", v)),
                        ],
                        "f.csv",
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn cardinality_classes() {
        let store = store_with(&[
            "alpha", "beta", "gamma", "delta1", "delta2", "x01", "x02", "x03", "x04", "x05",
            "x06", "x07", "x08", "x09", "x10", "x11",
        ]);
        assert_eq!(match_query(&store, "omega"), QueryOutcome::NoMatch);
        assert!(matches!(match_query(&store, "BETA"), QueryOutcome::Unique(r) if r.search_text() == "beta"));
        assert!(matches!(match_query(&store, "delta"), QueryOutcome::Multiple(r) if r.len() == 2));
        assert_eq!(match_query(&store, "x"), QueryOutcome::TooMany(11));
        assert!(matches!(match_query(&store, "x0"), QueryOutcome::Multiple(r) if r.len() == 9));
    }

    #[test]
    fn exactly_ten_is_multiple_eleven_is_too_many() {
        let ten: Vec<String> = (0..10).map(|i| format!("k{}", i)).collect();
        let refs: Vec<&str> = ten.iter().map(String::as_str).collect();
        assert!(matches!(match_query(&store_with(&refs), "k"), QueryOutcome::Multiple(r) if r.len() == 10));

        let eleven: Vec<String> = (0..11).map(|i| format!("k{}", i)).collect();
        let refs: Vec<&str> = eleven.iter().map(String::as_str).collect();
        assert_eq!(match_query(&store_with(&refs), "k"), QueryOutcome::TooMany(11));
    }

    #[test]
    fn multiple_preserves_order_and_duplicates() {
        let store = store_with(&["dup", "other", "dup"]);
        match match_query(&store, "dup") {
            QueryOutcome::Multiple(rows) => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0], rows[1]);
            }
            other => panic!("expected Multiple, got {:?}", other),
        }
    }

    #[test]
    fn matcher_itself_accepts_single_character() {
        let store = store_with(&["a"]);
        assert!(matches!(match_query(&store, "a"), QueryOutcome::Unique(_)));
    }

    #[test]
    fn free_text_requires_two_trimmed_characters() {
        let store = store_with(&["ab"]);
        assert_eq!(
            search_text(&store, " a "),
            Err(QueryError::TooShort { min: MIN_QUERY_CHARS })
        );
        assert!(matches!(search_text(&store, " ab "), Ok(QueryOutcome::Unique(_))));
    }

    #[test]
    fn free_text_counts_characters_not_bytes() {
        let store = store_with(&["жук"]);
        assert!(search_text(&store, "ж").is_err());
        assert!(matches!(search_text(&store, "жу"), Ok(QueryOutcome::Unique(_))));
    }

    #[test]
    fn scan_accepts_single_character_but_not_blank() {
        let store = store_with(&["7"]);
        assert!(matches!(search_scan(&store, "7;"), Ok(QueryOutcome::Unique(_))));
        assert_eq!(search_scan(&store, " ; "), Err(QueryError::Blank));
    }

    #[test]
    fn scan_normalizes_before_matching() {
        let store = store_with(&["1234"]);
        assert!(matches!(search_scan(&store, " 12;34 "), Ok(QueryOutcome::Unique(_))));
    }
}
