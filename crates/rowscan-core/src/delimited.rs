//! Semicolon-delimited text parsing.
//!
//! Files come from Windows tooling and are decoded as Windows-1251. Field
//! splitting uses a simple quote toggle rather than RFC 4180:
//!
//! - every `"` flips the in-quotes state and is never copied to the output;
//! - `;` separates fields only outside quotes;
//! - there is no escaping and no `""` doubling;
//! - an unbalanced quote keeps the rest of the line in one field.
//!
//! Each field is trimmed. The first line is the header line.

use std::io::Read;

use encoding_rs::WINDOWS_1251;

use crate::models::RowRecord;
use crate::rows::RowBuilder;

/// Field separator.
pub const DELIMITER: char = ';';
const QUOTE: char = '"';

/// Decodes Windows-1251 bytes. Every byte value has a mapping.
///
/// A leading UTF-8 byte order mark is not special-cased.
pub fn decode_cp1251(bytes: &[u8]) -> String {
    let (text, _had_errors) = WINDOWS_1251.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Splits one line into trimmed fields.
///
/// `a;"b;c";d` gives `["a", "b;c", "d"]`; `a;"b;c` gives `["a", "b;c"]`.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Splits text into lines on `\n`, `\r\n`, or a lone `\r`.
///
/// A terminator at the very end does not produce a trailing empty line.
pub fn lines(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                out.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                out.push(&text[start..i]);
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        out.push(&text[start..]);
    }
    out
}

/// Parses decoded text into rows.
pub fn parse_text(text: &str, source_file: &str) -> Vec<RowRecord> {
    let mut builder = RowBuilder::new(source_file);
    for line in lines(text) {
        builder.push(split_fields(line));
    }
    builder.finish()
}

/// Parses raw Windows-1251 bytes into rows.
pub fn parse_delimited(bytes: &[u8], source_file: &str) -> Vec<RowRecord> {
    let rows = parse_text(&decode_cp1251(bytes), source_file);
    tracing::debug!(source_file, rows = rows.len(), "delimited text parsed");
    rows
}

/// Reads a whole stream and parses it.
///
/// Any read error discards everything and returns no rows.
pub fn read_delimited<R: Read>(mut reader: R, source_file: &str) -> Vec<RowRecord> {
    let mut bytes = Vec::new();
    if let Err(e) = reader.read_to_end(&mut bytes) {
        tracing::warn!(source_file, error = %e, "failed to read delimited text");
        return Vec::new();
    }
    parse_delimited(&bytes, source_file)
}
