//! # rowscan CLI
//!
//! The `rowscan` binary loads one tabular file at a time (semicolon-delimited
//! Windows-1251 text or an xlsx workbook) and looks rows up by typed text or
//! scanned code.
//!
//! ## Usage
//!
//! ```bash
//! rowscan --config ./config/rowscan.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rowscan init` | Create the SQLite database and schema |
//! | `rowscan load <FILE>` | Replace the stored dataset with the rows of `FILE` |
//! | `rowscan search <QUERY>` | Find rows containing `QUERY` (at least 2 characters) |
//! | `rowscan scan <CODE>` | Find rows by a scanned code (`;` stripped) |
//! | `rowscan edit <QUERY> --set H=V` | Record an edited copy of one row in the journal |
//! | `rowscan status` | Show the loaded file and row count |
//! | `rowscan clear` | Remove the stored dataset |
//!
//! Set `RUST_LOG=debug` for diagnostic output on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rowscan::{config, ingest, journal, migrate, search};

/// rowscan: load a spreadsheet or delimited file and look rows up by text or scanned code.
#[derive(Parser)]
#[command(
    name = "rowscan",
    about = "Load tabular data and look rows up by text or scanned code",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/rowscan.toml`. Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/rowscan.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent: running it again keeps the stored dataset.
    Init,

    /// Load a file, replacing the stored dataset.
    ///
    /// The format is detected from the file content. A file that yields no
    /// data rows is rejected and the previous dataset is kept.
    Load {
        /// Path to a `.csv` or `.xlsx` file.
        file: PathBuf,
    },

    /// Search rows by free text (case-insensitive substring).
    Search {
        /// Text to look for; at least two characters after trimming.
        query: String,

        /// Show entry N (1-based) when several rows match.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Search rows by a scanned code.
    Scan {
        /// Raw scanner payload; `;` characters and surrounding whitespace are dropped.
        code: String,

        /// Show entry N (1-based) when several rows match.
        #[arg(long)]
        pick: Option<usize>,
    },

    /// Record an edited copy of a row in the edit journal.
    ///
    /// The query must resolve to a single row (use `--pick` to choose one).
    /// The stored dataset is not modified.
    Edit {
        /// Text identifying the row.
        query: String,

        /// Show entry N (1-based) when several rows match.
        #[arg(long)]
        pick: Option<usize>,

        /// Field changes as `HEADER=VALUE` pairs.
        #[arg(long = "set", value_parser = parse_key_val)]
        edits: Vec<(String, String)>,
    },

    /// Show the loaded file name and row count.
    Status,

    /// Remove the stored dataset.
    Clear,
}

/// Parse a `key=value` pair for `--set` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid HEADER=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Load { file } => {
            ingest::run_load(&cfg, &file).await?;
        }
        Commands::Search { query, pick } => {
            search::run_search(&cfg, &query, pick).await?;
        }
        Commands::Scan { code, pick } => {
            search::run_scan(&cfg, &code, pick).await?;
        }
        Commands::Edit { query, pick, edits } => {
            journal::run_edit(&cfg, &query, pick, &edits).await?;
        }
        Commands::Status => {
            ingest::run_status(&cfg).await?;
        }
        Commands::Clear => {
            ingest::run_clear(&cfg).await?;
        }
    }

    Ok(())
}
