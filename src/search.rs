//! Search and scan commands over the stored dataset.
//!
//! Rows are read from SQLite into a [`RowStore`] and matched in memory.
//! Every [`QueryOutcome`] has its own rendering; a rejected query surfaces
//! as an error so the process exits non-zero.

use anyhow::{bail, Result};
use rowscan_core::dataset::RowStore;
use rowscan_core::matcher;
use rowscan_core::models::{QueryOutcome, RowRecord};
use rowscan_core::store::RowRepository;

use crate::config::Config;
use crate::db;
use crate::migrate;

use crate::sqlite_store::SqliteRowRepository;

/// How a query reached the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Typed,
    Scanned,
}

/// Opens the database and loads every stored row.
pub async fn open_store(config: &Config) -> Result<(SqliteRowRepository, RowStore)> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let repo = SqliteRowRepository::new(pool);
    let store = RowStore::with_rows(repo.load_all().await?);
    tracing::debug!(rows = store.len(), "dataset opened");
    Ok((repo, store))
}

/// Runs the matcher for `kind`, turning a rejected query into an error.
pub fn run_query(store: &RowStore, query: &str, kind: QueryKind) -> Result<QueryOutcome> {
    let outcome = match kind {
        QueryKind::Typed => matcher::search_text(store, query)?,
        QueryKind::Scanned => matcher::search_scan(store, query)?,
    };
    tracing::debug!(query, matches = outcome.match_count(), "query matched");
    Ok(outcome)
}

/// Narrows an outcome to one row when the caller picked a list entry.
///
/// `pick` is 1-based and only applies to [`QueryOutcome::Multiple`].
pub fn select(outcome: QueryOutcome, pick: Option<usize>) -> Result<QueryOutcome> {
    let Some(pick) = pick else {
        return Ok(outcome);
    };
    match outcome {
        QueryOutcome::Multiple(mut rows) => {
            if pick == 0 || pick > rows.len() {
                bail!("--pick must be between 1 and {}", rows.len());
            }
            Ok(QueryOutcome::Unique(rows.swap_remove(pick - 1)))
        }
        other => Ok(other),
    }
}

/// Renders an outcome for the terminal.
pub fn render_outcome(outcome: &QueryOutcome, query: &str) -> String {
    match outcome {
        QueryOutcome::NoMatch => format!("Nothing found for '{}'.", query.trim()),
        QueryOutcome::Unique(row) => render_row(row),
        QueryOutcome::Multiple(rows) => {
            let mut out = format!("Found {} matches:\n", rows.len());
            for (i, row) in rows.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, row.label()));
            }
            out.push_str("Use --pick N to show one of them.");
            out
        }
        QueryOutcome::TooMany(n) => {
            format!("Found {} matches, refine the query.", n)
        }
    }
}

fn render_row(row: &RowRecord) -> String {
    let body = row.formatted();
    if body.is_empty() {
        format!("[{}]\n(all fields are empty)", row.source_file())
    } else {
        format!("[{}]\n{}", row.source_file(), body)
    }
}

async fn run(config: &Config, query: &str, kind: QueryKind, pick: Option<usize>) -> Result<()> {
    let (repo, store) = open_store(config).await?;
    repo.pool().close().await;

    if store.is_empty() {
        println!("No data loaded. Run `rowscan load <FILE>` first.");
        return Ok(());
    }

    let outcome = select(run_query(&store, query, kind)?, pick)?;
    println!("{}", render_outcome(&outcome, query));
    Ok(())
}

pub async fn run_search(config: &Config, query: &str, pick: Option<usize>) -> Result<()> {
    run(config, query, QueryKind::Typed, pick).await
}

pub async fn run_scan(config: &Config, code: &str, pick: Option<usize>) -> Result<()> {
    run(config, code, QueryKind::Scanned, pick).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, code: &str) -> RowRecord {
        RowRecord::new(
            name,
            vec![
                ("Name".to_string(), name.to_string()),
                ("Code".to_string(), code.to_string()),
            ],
            "people.csv",
        )
    }

    fn store() -> RowStore {
        RowStore::with_rows(vec![
            row("Ivanov", "A-1"),
            row("Ivanova", "A-2"),
            row("Petrov", "B-1"),
        ])
    }

    #[test]
    fn typed_query_too_short_is_error() {
        let err = run_query(&store(), " I ", QueryKind::Typed).unwrap_err();
        assert!(err.to_string().contains("at least 2 characters"));
    }

    #[test]
    fn scanned_query_strips_delimiters() {
        let outcome = run_query(&store(), " B-1;\n", QueryKind::Scanned).unwrap();
        assert_eq!(outcome, QueryOutcome::Unique(row("Petrov", "B-1")));
    }

    #[test]
    fn blank_scan_is_error() {
        assert!(run_query(&store(), ";;", QueryKind::Scanned).is_err());
    }

    #[test]
    fn pick_selects_from_multiple() {
        let outcome = run_query(&store(), "ivan", QueryKind::Typed).unwrap();
        let picked = select(outcome, Some(2)).unwrap();
        assert_eq!(picked, QueryOutcome::Unique(row("Ivanova", "A-2")));
    }

    #[test]
    fn pick_out_of_range_is_error() {
        let outcome = run_query(&store(), "ivan", QueryKind::Typed).unwrap();
        assert!(select(outcome.clone(), Some(0)).is_err());
        assert!(select(outcome, Some(3)).is_err());
    }

    #[test]
    fn pick_ignored_for_unique() {
        let outcome = QueryOutcome::Unique(row("Petrov", "B-1"));
        assert_eq!(select(outcome.clone(), Some(5)).unwrap(), outcome);
    }

    #[test]
    fn renders_each_outcome() {
        assert_eq!(
            render_outcome(&QueryOutcome::NoMatch, " zz "),
            "Nothing found for 'zz'."
        );
        assert_eq!(
            render_outcome(&QueryOutcome::Unique(row("Petrov", "B-1")), "pet"),
            "[people.csv]\nName: Petrov\n\nCode: B-1"
        );
        let multiple = render_outcome(
            &QueryOutcome::Multiple(vec![row("Ivanov", "A-1"), row("Ivanova", "A-2")]),
            "ivan",
        );
        assert!(multiple.starts_with("Found 2 matches:\n1. Ivanov\n2. Ivanova\n"));
        assert_eq!(
            render_outcome(&QueryOutcome::TooMany(11), "a"),
            "Found 11 matches, refine the query."
        );
    }
}
