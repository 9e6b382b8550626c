//! # rowscan Core
//!
//! Shared, I/O-free logic for rowscan: the row model, input format
//! sniffing, delimited-text parsing, the in-memory row store, query
//! matching, scanned-code cleanup, and the persistence trait.
//!
//! This crate contains no tokio, sqlx, or filesystem access. Spreadsheet
//! parsing and SQLite persistence live in the `rowscan` crate.
//!
//! ```rust
//! use rowscan_core::dataset::RowStore;
//! use rowscan_core::delimited::parse_text;
//! use rowscan_core::matcher::match_query;
//! use rowscan_core::models::QueryOutcome;
//!
//! let rows = parse_text("Name;Code\nIvan;001\nPetr;002\n", "people.csv");
//! let mut store = RowStore::new();
//! store.load(rows);
//! assert!(matches!(match_query(&store, "petr"), QueryOutcome::Unique(_)));
//! ```

pub mod dataset;
pub mod delimited;
pub mod matcher;
pub mod models;
pub mod rows;
pub mod scan;
pub mod sniff;
pub mod store;
