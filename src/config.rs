use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Where edited rows are appended.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct JournalConfig {
    /// Defaults to `edits.txt` next to the database file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Largest decompressed size read from a single workbook entry.
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_entry_bytes: default_max_entry_bytes(),
        }
    }
}

fn default_max_entry_bytes() -> u64 {
    50 * 1024 * 1024
}

impl Config {
    /// Defaults used when no config file is present.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/rowscan.sqlite"),
            },
            journal: JournalConfig::default(),
            ingest: IngestConfig::default(),
        }
    }

    pub fn journal_path(&self) -> PathBuf {
        match &self.journal.path {
            Some(p) => p.clone(),
            None => self
                .db
                .path
                .parent()
                .map(|dir| dir.join("edits.txt"))
                .unwrap_or_else(|| PathBuf::from("edits.txt")),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.db.path.as_os_str().is_empty() {
        anyhow::bail!("db.path must not be empty");
    }

    if config.ingest.max_entry_bytes == 0 {
        anyhow::bail!("ingest.max_entry_bytes must be > 0");
    }

    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rowscan.toml");
        std::fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn minimal_file_uses_defaults() {
        let (_tmp, path) = write_config("[db]\npath = \"/var/lib/rowscan/rows.sqlite\"\n");
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.ingest.max_entry_bytes, 50 * 1024 * 1024);
        assert_eq!(
            cfg.journal_path(),
            PathBuf::from("/var/lib/rowscan/edits.txt")
        );
    }

    #[test]
    fn explicit_journal_path_wins() {
        let (_tmp, path) = write_config(
            "[db]\npath = \"rows.sqlite\"\n\n[journal]\npath = \"/tmp/new.txt\"\n",
        );
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.journal_path(), PathBuf::from("/tmp/new.txt"));
    }

    #[test]
    fn zero_entry_limit_is_rejected() {
        let (_tmp, path) =
            write_config("[db]\npath = \"rows.sqlite\"\n\n[ingest]\nmax_entry_bytes = 0\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_minimal() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cfg = load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.db.path, PathBuf::from("./data/rowscan.sqlite"));
    }
}
