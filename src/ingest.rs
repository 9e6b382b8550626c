//! Ingestion pipeline orchestration.
//!
//! Coordinates a file load: open → sniff → parse → persist → publish.
//! Parsing is fail-closed: an unreadable or malformed file yields no rows,
//! and a load that produced no rows leaves the stored dataset untouched.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{bail, Result};
use rowscan_core::dataset::RowStore;
use rowscan_core::delimited::read_delimited;
use rowscan_core::models::RowRecord;
use rowscan_core::sniff::{sniff_reader, DataFormat};
use rowscan_core::store::RowRepository;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteRowRepository;
use crate::xlsx::read_workbook;

/// Display name for a loaded file: its final path component.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Sniffs and parses a stream. Any failure yields no rows.
pub fn read_rows<R: Read>(reader: R, source_file: &str, max_entry_bytes: u64) -> Vec<RowRecord> {
    let (format, mut reader) = match sniff_reader(reader) {
        Ok(sniffed) => sniffed,
        Err(e) => {
            tracing::warn!(source_file, error = %e, "failed to read file header");
            return Vec::new();
        }
    };
    tracing::info!(source_file, %format, "detected format");

    match format {
        DataFormat::DelimitedText => read_delimited(reader, source_file),
        DataFormat::Spreadsheet => {
            let mut bytes = Vec::new();
            if let Err(e) = reader.read_to_end(&mut bytes) {
                tracing::warn!(source_file, error = %e, "failed to read workbook");
                return Vec::new();
            }
            read_workbook(&bytes, source_file, max_entry_bytes)
        }
    }
}

/// Opens and parses a file. Any failure yields no rows.
pub fn read_file(path: &Path, max_entry_bytes: u64) -> Vec<RowRecord> {
    let source_file = display_name(path);
    match File::open(path) {
        Ok(file) => read_rows(BufReader::new(file), &source_file, max_entry_bytes),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to open file");
            Vec::new()
        }
    }
}

/// Parses `path`, stores its rows, and publishes them to `store`.
///
/// The repository write completes before `store` is touched. Returns the
/// number of rows loaded; an empty parse result is an error and changes
/// nothing.
pub async fn load_file(
    config: &Config,
    repo: &dyn RowRepository,
    store: &mut RowStore,
    path: &Path,
) -> Result<usize> {
    let file_name = display_name(path);
    let rows = read_file(path, config.ingest.max_entry_bytes);
    if rows.is_empty() {
        bail!("File is empty or contains no data: {}", path.display());
    }

    repo.save_all(&rows, &file_name).await?;
    let count = rows.len();
    store.load(rows);
    tracing::info!(file_name, rows = count, "dataset loaded");
    Ok(count)
}

pub async fn run_load(config: &Config, path: &Path) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let repo = SqliteRowRepository::new(pool);
    let mut store = RowStore::new();

    let count = load_file(config, &repo, &mut store, path).await?;

    println!("load {}", display_name(path));
    println!("  rows loaded: {}", count);
    println!("ok");
    Ok(())
}

pub async fn run_clear(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let repo = SqliteRowRepository::new(pool);
    repo.clear().await?;
    println!("Dataset cleared.");
    Ok(())
}

pub async fn run_status(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::create_schema(&pool).await?;
    let repo = SqliteRowRepository::new(pool);
    let (count, file_name) = repo.summary().await?;
    match file_name {
        Some(name) => println!("file: {}", name),
        None => println!("file: (none)"),
    }
    println!("rows: {}", count);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowscan_core::store::memory::InMemoryRepository;
    use std::io;

    #[test]
    fn delimited_stream_is_parsed_from_first_byte() {
        let rows = read_rows(&b"Name;Code\nIvan;1\n"[..], "f.csv", 1024);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("Name"), Some("Ivan"));
    }

    #[test]
    fn short_input_is_treated_as_text() {
        assert!(read_rows(&b"PK"[..], "f.csv", 1024).is_empty());
        assert!(read_rows(&b""[..], "f.csv", 1024).is_empty());
    }

    #[test]
    fn zip_magic_with_garbage_yields_no_rows() {
        assert!(read_rows(&b"PK\x03\x04not really a zip"[..], "f.xlsx", 1024).is_empty());
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("unplugged"))
        }
    }

    /// Returns at most two bytes per read.
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = 2usize.min(buf.len()).min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    fn one_row_workbook() -> Vec<u8> {
        use std::io::{Cursor, Write};
        let sheet = "<?xml version=\"1.0\"?><worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>\
            <row><c t=\"inlineStr\"><is><t>Article</t></is></c></row>\
            <row><c t=\"inlineStr\"><is><t>Bolt</t></is></c></row>\
            </sheetData></worksheet>";
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("xl/worksheets/sheet1.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(sheet.as_bytes()).unwrap();
            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn workbook_survives_short_reads() {
        let xlsx = one_row_workbook();
        let direct = read_rows(&xlsx[..], "b.xlsx", 1 << 20);
        let trickled = read_rows(Trickle(&xlsx), "b.xlsx", 1 << 20);
        assert_eq!(direct.len(), 1);
        assert_eq!(trickled, direct);
        assert_eq!(trickled[0].get("Article"), Some("Bolt"));
    }

    #[test]
    fn read_error_yields_no_rows() {
        assert!(read_rows(BrokenReader, "f.csv", 1024).is_empty());
    }

    #[test]
    fn missing_file_yields_no_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(read_file(&tmp.path().join("absent.csv"), 1024).is_empty());
    }

    #[test]
    fn display_name_is_file_component() {
        assert_eq!(display_name(Path::new("/data/in/people.csv")), "people.csv");
    }

    #[tokio::test]
    async fn empty_file_does_not_replace_dataset() {
        let tmp = tempfile::TempDir::new().unwrap();
        let good = tmp.path().join("good.csv");
        let empty = tmp.path().join("empty.csv");
        std::fs::write(&good, "A;B\n1;2\n").unwrap();
        std::fs::write(&empty, "A;B\n").unwrap();

        let cfg = Config::minimal();
        let repo = InMemoryRepository::new();
        let mut store = RowStore::new();

        assert_eq!(load_file(&cfg, &repo, &mut store, &good).await.unwrap(), 1);
        assert!(load_file(&cfg, &repo, &mut store, &empty).await.is_err());
        assert_eq!(store.len(), 1);
        assert_eq!(repo.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn second_load_replaces_first() {
        let tmp = tempfile::TempDir::new().unwrap();
        let a = tmp.path().join("a.csv");
        let b = tmp.path().join("b.csv");
        std::fs::write(&a, "N\na1\na2\n").unwrap();
        std::fs::write(&b, "N\nb1\n").unwrap();

        let cfg = Config::minimal();
        let repo = InMemoryRepository::new();
        let mut store = RowStore::new();
        load_file(&cfg, &repo, &mut store, &a).await.unwrap();
        load_file(&cfg, &repo, &mut store, &b).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.source_file(), Some("b.csv"));
        let stored = repo.load_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].source_file(), "b.csv");
    }
}
