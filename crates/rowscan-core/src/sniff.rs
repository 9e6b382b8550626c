//! Input format detection.
//!
//! Only the first four bytes are consulted: the zip local-file-header magic
//! means "spreadsheet", anything else means "delimited text". Any zip-based
//! file matches, so a zip that is not a workbook will fail later in the
//! spreadsheet parser and load as an empty dataset.

use std::io::{self, Chain, Cursor, Read};

/// Zip local file header signature (`PK\x03\x04`).
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Detected input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// Zip-based workbook (xlsx).
    Spreadsheet,
    /// `;`-separated text in Windows-1251.
    DelimitedText,
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Spreadsheet => write!(f, "spreadsheet"),
            DataFormat::DelimitedText => write!(f, "delimited text"),
        }
    }
}

/// Classifies a byte prefix. Fewer than four bytes is delimited text.
pub fn sniff(prefix: &[u8]) -> DataFormat {
    if prefix.len() >= ZIP_MAGIC.len() && prefix[..ZIP_MAGIC.len()] == ZIP_MAGIC {
        DataFormat::Spreadsheet
    } else {
        DataFormat::DelimitedText
    }
}

/// Reads up to four bytes from `reader` and classifies them.
///
/// Short reads are retried until four bytes have arrived or the stream ends.
/// The returned reader replays the prefix and then continues with the rest
/// of the stream, so the caller can hand it straight to a parser.
pub fn sniff_reader<R: Read>(mut reader: R) -> io::Result<(DataFormat, Chain<Cursor<Vec<u8>>, R>)> {
    let mut prefix = [0u8; ZIP_MAGIC.len()];
    let mut filled = 0;
    while filled < prefix.len() {
        match reader.read(&mut prefix[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let head = &prefix[..filled];
    Ok((sniff(head), Cursor::new(head.to_vec()).chain(reader)))
}
