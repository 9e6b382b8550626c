//! # rowscan
//!
//! Loads a single tabular file and answers row lookups against it.
//!
//! A file is sniffed by its first four bytes: the zip signature selects the
//! xlsx reader, anything else is read as semicolon-delimited Windows-1251
//! text. The first row supplies the column headers and every later non-blank
//! row becomes a [`RowRecord`](rowscan_core::models::RowRecord). Loading a
//! file replaces the previous dataset in SQLite.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌──────────┐   ┌───────────┐
//! │  File    │──▶│ sniff + parse │──▶│  SQLite  │──▶│ RowStore  │
//! │ csv/xlsx │   │ delimited/xlsx│   │ row_recs │   │ + matcher │
//! └──────────┘   └──────────────┘   └──────────┘   └─────┬─────┘
//!                                                        ▼
//!                                                  ┌──────────┐
//!                                                  │   CLI    │
//!                                                  └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite row repository |
//! | [`xlsx`] | First-sheet workbook reader |
//! | [`cell_format`] | Number-format rendering of numeric cells |
//! | [`ingest`] | Sniff, parse, and persist a file |
//! | [`search`] | Typed and scanned lookups |
//! | [`journal`] | Append-only edit journal |
//!
//! Pure parsing and matching logic lives in the `rowscan-core` crate.

pub mod cell_format;
pub mod config;
pub mod db;
pub mod ingest;
pub mod journal;
pub mod migrate;
pub mod search;
pub mod sqlite_store;
pub mod xlsx;
