//! Append-only journal of edited rows.
//!
//! Each edit is written as a timestamped block:
//!
//! ```text
//! === Changes from 2024-03-15 14:02:11 ===
//! Name: Ivanov
//!
//! Code: A-1
//!
//! ```
//!
//! Edits never modify the stored dataset; the journal is the only record.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use rowscan_core::models::{QueryOutcome, RowRecord};

use crate::config::Config;
use crate::search::{open_store, render_outcome, run_query, select, QueryKind};

/// Formats one journal entry.
pub fn format_entry(text: &str, at: NaiveDateTime) -> String {
    format!(
        "=== Changes from {} ===\n{}\n\n",
        at.format("%Y-%m-%d %H:%M:%S"),
        text
    )
}

/// Appends an entry to `path`, creating the file and its directory if needed.
pub fn append_edit(path: &Path, text: &str, at: NaiveDateTime) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create journal directory: {}", parent.display())
            })?;
        }
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open journal: {}", path.display()))?;
    file.write_all(format_entry(text, at).as_bytes())
        .with_context(|| format!("Failed to write journal: {}", path.display()))?;
    Ok(())
}

/// Applies `--set` overrides to `row`, rejecting headers the row lacks.
pub fn apply_edits(row: &RowRecord, edits: &[(String, String)]) -> Result<RowRecord> {
    if edits.is_empty() {
        bail!("Nothing to change: pass at least one --set HEADER=VALUE");
    }
    for (header, _) in edits {
        if row.get(header).is_none() {
            let known: Vec<&str> = row.fields().iter().map(|(h, _)| h.as_str()).collect();
            bail!(
                "Unknown header '{}'. Available: {}",
                header,
                known.join(", ")
            );
        }
    }
    Ok(row.with_fields(edits))
}

pub async fn run_edit(
    config: &Config,
    query: &str,
    pick: Option<usize>,
    edits: &[(String, String)],
) -> Result<()> {
    let (repo, store) = open_store(config).await?;
    repo.pool().close().await;

    if store.is_empty() {
        bail!("No data loaded. Run `rowscan load <FILE>` first.");
    }

    let outcome = select(run_query(&store, query, QueryKind::Typed)?, pick)?;
    let row = match outcome {
        QueryOutcome::Unique(row) => row,
        other => bail!("{}", render_outcome(&other, query)),
    };

    let edited = apply_edits(&row, edits)?;
    let path = config.journal_path();
    append_edit(&path, &edited.formatted(), Local::now().naive_local())?;
    tracing::info!(journal = %path.display(), fields = edits.len(), "edit recorded");

    println!("{}", edited.formatted());
    println!();
    println!("Saved to {}", path.display());
    Ok(())
}
