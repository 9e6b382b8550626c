//! First-sheet row extraction from xlsx workbooks.
//!
//! Reads the workbook with `zip` + `quick-xml` and produces the same row
//! shape as the delimited-text parser: the first sheet row is the header,
//! every later non-blank row becomes a [`RowRecord`]. Each present cell is
//! rendered to its display text (see [`cell_format`](crate::cell_format));
//! cells missing from the XML are not padded.
//!
//! [`read_workbook`] is fail-closed: any error yields no rows at all.

use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rowscan_core::models::RowRecord;
use rowscan_core::rows::RowBuilder;

use crate::cell_format::NumberFormats;

const WORKBOOK_XML: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_XML: &str = "xl/sharedStrings.xml";
const STYLES_XML: &str = "xl/styles.xml";

/// Default limit on decompressed bytes read from one zip entry (zip-bomb protection).
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Workbook parse error.
#[derive(Debug)]
pub enum XlsxError {
    Zip(String),
    Xml(String),
    EntryTooLarge { name: String, limit: u64 },
    NoSheet,
    Malformed(String),
}

impl std::fmt::Display for XlsxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            XlsxError::Zip(e) => write!(f, "invalid zip archive: {}", e),
            XlsxError::Xml(e) => write!(f, "invalid workbook XML: {}", e),
            XlsxError::EntryTooLarge { name, limit } => {
                write!(f, "ZIP entry {} exceeds size limit ({} bytes)", name, limit)
            }
            XlsxError::NoSheet => write!(f, "workbook has no worksheets"),
            XlsxError::Malformed(e) => write!(f, "malformed workbook: {}", e),
        }
    }
}

impl std::error::Error for XlsxError {}

impl From<zip::result::ZipError> for XlsxError {
    fn from(e: zip::result::ZipError) -> Self {
        XlsxError::Zip(e.to_string())
    }
}

impl From<quick_xml::Error> for XlsxError {
    fn from(e: quick_xml::Error) -> Self {
        XlsxError::Xml(e.to_string())
    }
}

type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

/// Parses the first sheet, returning no rows on any failure.
pub fn read_workbook(bytes: &[u8], source_file: &str, max_entry_bytes: u64) -> Vec<RowRecord> {
    match parse_workbook(bytes, source_file, max_entry_bytes) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(source_file, error = %e, "failed to parse workbook");
            Vec::new()
        }
    }
}

/// Parses the first sheet of an xlsx workbook into rows.
pub fn parse_workbook(
    bytes: &[u8],
    source_file: &str,
    max_entry_bytes: u64,
) -> Result<Vec<RowRecord>, XlsxError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let workbook = read_optional_entry(&mut archive, WORKBOOK_XML, max_entry_bytes)?;
    let (first_sheet_rid, date1904) = match &workbook {
        Some(xml) => parse_workbook_xml(xml)?,
        None => (None, false),
    };

    let sheet_path = resolve_first_sheet(&mut archive, first_sheet_rid.as_deref(), max_entry_bytes)?;
    tracing::debug!(source_file, sheet = %sheet_path, "reading first sheet");

    let shared_strings = match read_optional_entry(&mut archive, SHARED_STRINGS_XML, max_entry_bytes)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let mut formats = match read_optional_entry(&mut archive, STYLES_XML, max_entry_bytes)? {
        Some(xml) => parse_styles(&xml)?,
        None => NumberFormats::new(),
    };
    formats.set_date1904(date1904);

    let sheet_xml = read_entry_bounded(&mut archive, &sheet_path, max_entry_bytes)?;
    let mut builder = RowBuilder::new(source_file);
    for values in parse_sheet_rows(&sheet_xml, &shared_strings, &formats)? {
        builder.push(values);
    }
    let rows = builder.finish();
    tracing::debug!(source_file, rows = rows.len(), "workbook parsed");
    Ok(rows)
}

fn read_entry_bounded(
    archive: &mut Archive<'_>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, XlsxError> {
    let entry = archive.by_name(name)?;
    let mut out = Vec::new();
    entry
        .take(max_bytes.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|e| XlsxError::Zip(e.to_string()))?;
    if out.len() as u64 > max_bytes {
        return Err(XlsxError::EntryTooLarge {
            name: name.to_string(),
            limit: max_bytes,
        });
    }
    Ok(out)
}

fn read_optional_entry(
    archive: &mut Archive<'_>,
    name: &str,
    max_bytes: u64,
) -> Result<Option<Vec<u8>>, XlsxError> {
    if archive.index_for_name(name).is_none() {
        return Ok(None);
    }
    read_entry_bounded(archive, name, max_bytes).map(Some)
}

fn attr_value(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, XlsxError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XlsxError::Xml(e.to_string()))?;
        if attr.key.local_name().as_ref() == local {
            let value = attr.unescape_value()?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Returns the relationship id of the first `<sheet>` and the date system flag.
fn parse_workbook_xml(xml: &[u8]) -> Result<(Option<String>, bool), XlsxError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut first_rid = None;
    let mut date1904 = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    date1904 = matches!(
                        attr_value(&e, b"date1904")?.as_deref(),
                        Some("1") | Some("true")
                    );
                }
                b"sheet" if first_rid.is_none() => {
                    first_rid = attr_value(&e, b"id")?;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok((first_rid, date1904))
}

/// Finds the zip path of the first sheet.
///
/// Follows the workbook relationship when present, otherwise takes the
/// lowest numbered `xl/worksheets/sheetN.xml`.
fn resolve_first_sheet(
    archive: &mut Archive<'_>,
    rid: Option<&str>,
    max_bytes: u64,
) -> Result<String, XlsxError> {
    if let Some(rid) = rid {
        if let Some(rels) = read_optional_entry(archive, WORKBOOK_RELS, max_bytes)? {
            if let Some(target) = find_relationship_target(&rels, rid)? {
                let path = match target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{}", target),
                };
                if archive.index_for_name(&path).is_some() {
                    return Ok(path);
                }
            }
        }
    }

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });
    names.into_iter().next().ok_or(XlsxError::NoSheet)
}

fn find_relationship_target(xml: &[u8], rid: &str) -> Result<Option<String>, XlsxError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if attr_value(&e, b"Id")?.as_deref() == Some(rid) {
                    return attr_value(&e, b"Target");
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// Reads the shared string table. Rich-text runs are concatenated; phonetic
/// runs (`rPh`) are skipped.
fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, XlsxError> {
    let mut strings = Vec::new();
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut in_phonetic = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(te) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&te.unescape()?);
                }
            }
            Event::CData(cd) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&String::from_utf8_lossy(&cd));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(current.take().unwrap_or_default()),
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Reads custom number formats and the cell style table from `styles.xml`.
fn parse_styles(xml: &[u8]) -> Result<NumberFormats, XlsxError> {
    let mut formats = NumberFormats::new();
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut in_cell_xfs = false;
    loop {
        let tag = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => Some((e, false)),
            Event::Empty(e) => Some((e, true)),
            Event::End(e) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };
        if let Some((e, empty)) = tag {
            match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = attr_value(&e, b"numFmtId")?.and_then(|v| v.parse::<u32>().ok());
                    let code = attr_value(&e, b"formatCode")?;
                    if let (Some(id), Some(code)) = (id, code) {
                        formats.add_custom(id, code);
                    }
                }
                // `<cellXfs/>` has no entries to follow
                b"cellXfs" => in_cell_xfs = !empty,
                b"xf" if in_cell_xfs => {
                    let id = attr_value(&e, b"numFmtId")?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0);
                    formats.push_cell_style(id);
                }
                _ => {}
            }
        }
        buf.clear();
    }
    Ok(formats)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Number,
    SharedString,
    InlineString,
    FormulaString,
    Boolean,
    Error,
    IsoDate,
}

impl CellKind {
    fn from_attr(t: Option<&str>) -> Self {
        match t {
            Some("s") => CellKind::SharedString,
            Some("inlineStr") => CellKind::InlineString,
            Some("str") => CellKind::FormulaString,
            Some("b") => CellKind::Boolean,
            Some("e") => CellKind::Error,
            Some("d") => CellKind::IsoDate,
            _ => CellKind::Number,
        }
    }
}

struct Cell {
    kind: CellKind,
    style: usize,
    value: String,
    inline: String,
}

impl Cell {
    fn start(e: &BytesStart<'_>) -> Result<Self, XlsxError> {
        let kind = CellKind::from_attr(attr_value(e, b"t")?.as_deref());
        let style = attr_value(e, b"s")?
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        Ok(Self {
            kind,
            style,
            value: String::new(),
            inline: String::new(),
        })
    }

    fn display(&self, shared: &[String], formats: &NumberFormats) -> Result<String, XlsxError> {
        let raw = self.value.trim();
        let text = match self.kind {
            CellKind::InlineString => self.inline.clone(),
            CellKind::FormulaString | CellKind::Error | CellKind::IsoDate => self.value.clone(),
            CellKind::SharedString => {
                if raw.is_empty() {
                    return Ok(String::new());
                }
                let idx: usize = raw
                    .parse()
                    .map_err(|_| XlsxError::Malformed(format!("bad shared string index '{}'", raw)))?;
                shared
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| XlsxError::Malformed(format!("shared string {} out of range", idx)))?
            }
            CellKind::Boolean => match raw {
                "" => String::new(),
                "1" | "true" => "TRUE".to_string(),
                _ => "FALSE".to_string(),
            },
            CellKind::Number => {
                if raw.is_empty() {
                    return Ok(String::new());
                }
                let value: f64 = raw
                    .parse()
                    .map_err(|_| XlsxError::Malformed(format!("bad numeric cell '{}'", raw)))?;
                formats.display(value, self.style)
            }
        };
        Ok(text)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    InlineText,
}

/// Streams `<row>`/`<c>` elements of a sheet into display-text value lists.
fn parse_sheet_rows(
    xml: &[u8],
    shared: &[String],
    formats: &NumberFormats,
) -> Result<Vec<Vec<String>>, XlsxError> {
    let mut rows = Vec::new();
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut row: Option<Vec<String>> = None;
    let mut cell: Option<Cell> = None;
    let mut capture = Capture::None;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row = Some(Vec::new()),
                b"c" => cell = Some(Cell::start(&e)?),
                b"v" if cell.is_some() => capture = Capture::Value,
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic
                    && cell.as_ref().is_some_and(|c| c.kind == CellKind::InlineString) =>
                {
                    capture = Capture::InlineText
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => rows.push(Vec::new()),
                b"c" => {
                    if let Some(values) = row.as_mut() {
                        values.push(String::new());
                    }
                }
                _ => {}
            },
            Event::Text(te) if capture != Capture::None => {
                let text = te.unescape()?;
                if let Some(c) = cell.as_mut() {
                    match capture {
                        Capture::Value => c.value.push_str(&text),
                        Capture::InlineText => c.inline.push_str(&text),
                        Capture::None => {}
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = Capture::None,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    if let Some(c) = cell.take() {
                        let text = c.display(shared, formats)?;
                        if let Some(values) = row.as_mut() {
                            values.push(text);
                        }
                    }
                }
                b"row" => {
                    if let Some(values) = row.take() {
                        rows.push(values);
                    }
                }
                b"sheetData" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_xlsx(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, content) in entries {
                zip.start_file(*name, zip::write::SimpleFileOptions::default())
                    .unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn sheet(rows: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?><worksheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><sheetData>{}</sheetData></worksheet>",
            rows
        )
    }

    const SHARED: &str = "<?xml version=\"1.0\"?><sst xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><si><t>Name</t></si><si><t>Code</t></si><si><t>Ivan</t></si><si><r><t>Pe</t></r><r><t>tr</t></r></si></sst>";

    #[test]
    fn reads_shared_strings_and_numbers() {
        let sheet1 = sheet(
            "<row r=\"1\"><c r=\"A1\" t=\"s\"><v>0</v></c><c r=\"B1\" t=\"s\"><v>1</v></c></row>\
             <row r=\"2\"><c r=\"A2\" t=\"s\"><v>2</v></c><c r=\"B2\"><v>4607</v></c></row>\
             <row r=\"3\"><c r=\"A3\" t=\"s\"><v>3</v></c><c r=\"B3\"><v>2.5</v></c></row>",
        );
        let xlsx = build_xlsx(&[
            ("xl/sharedStrings.xml", SHARED),
            ("xl/worksheets/sheet1.xml", sheet1.as_str()),
        ]);
        let rows = parse_workbook(&xlsx, "book.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].search_text(), "Ivan");
        assert_eq!(rows[0].get("Code"), Some("4607"));
        assert_eq!(rows[1].search_text(), "Petr");
        assert_eq!(rows[1].get("Code"), Some("2.5"));
        assert_eq!(rows[1].source_file(), "book.xlsx");
    }

    #[test]
    fn inline_bool_and_formula_strings() {
        let sheet1 = sheet(
            "<row><c t=\"inlineStr\"><is><t>A</t></is></c><c t=\"inlineStr\"><is><t>B</t></is></c><c t=\"inlineStr\"><is><t>C</t></is></c></row>\
             <row><c t=\"inlineStr\"><is><t>x &amp; y</t></is></c><c t=\"b\"><v>1</v></c><c t=\"str\"><f>A2</f><v>calc</v></c></row>",
        );
        let xlsx = build_xlsx(&[("xl/worksheets/sheet1.xml", sheet1.as_str())]);
        let rows = parse_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("A"), Some("x & y"));
        assert_eq!(rows[0].get("B"), Some("TRUE"));
        assert_eq!(rows[0].get("C"), Some("calc"));
    }

    #[test]
    fn blank_rows_are_skipped_and_missing_cells_not_padded() {
        let sheet1 = sheet(
            "<row><c t=\"inlineStr\"><is><t>A</t></is></c><c t=\"inlineStr\"><is><t>B</t></is></c></row>\
             <row><c s=\"0\"/><c t=\"inlineStr\"><is><t> </t></is></c></row>\
             <row><c r=\"B4\"><v>9</v></c></row>",
        );
        let xlsx = build_xlsx(&[("xl/worksheets/sheet1.xml", sheet1.as_str())]);
        let rows = parse_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap();
        assert_eq!(rows.len(), 1);
        // The lone B4 cell is the first present cell, so it pairs with "A".
        assert_eq!(rows[0].get("A"), Some("9"));
        assert_eq!(rows[0].search_text(), "9");
    }

    #[test]
    fn follows_workbook_relationships_to_first_sheet() {
        let workbook = "<?xml version=\"1.0\"?><workbook xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\" xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><sheets><sheet name=\"Main\" sheetId=\"2\" r:id=\"rId7\"/><sheet name=\"Other\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>";
        let rels = "<?xml version=\"1.0\"?><Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"worksheet\" Target=\"worksheets/sheet1.xml\"/><Relationship Id=\"rId7\" Type=\"worksheet\" Target=\"/xl/worksheets/sheet2.xml\"/></Relationships>";
        let sheet1 = sheet("<row><c t=\"inlineStr\"><is><t>H</t></is></c></row><row><c t=\"inlineStr\"><is><t>other</t></is></c></row>");
        let sheet2 = sheet("<row><c t=\"inlineStr\"><is><t>H</t></is></c></row><row><c t=\"inlineStr\"><is><t>main</t></is></c></row>");
        let xlsx = build_xlsx(&[
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/worksheets/sheet1.xml", sheet1.as_str()),
            ("xl/worksheets/sheet2.xml", sheet2.as_str()),
        ]);
        let rows = parse_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].search_text(), "main");
    }

    #[test]
    fn applies_date_styles() {
        let styles = "<?xml version=\"1.0\"?><styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><numFmts count=\"1\"><numFmt numFmtId=\"164\" formatCode=\"dd.mm.yyyy\"/></numFmts><cellStyleXfs count=\"1\"><xf numFmtId=\"0\"/></cellStyleXfs><cellXfs count=\"3\"><xf numFmtId=\"0\"/><xf numFmtId=\"164\" applyNumberFormat=\"1\"><alignment horizontal=\"left\"/></xf><xf numFmtId=\"4\"/></cellXfs></styleSheet>";
        let sheet1 = sheet(
            "<row><c t=\"inlineStr\"><is><t>Date</t></is></c><c t=\"inlineStr\"><is><t>Sum</t></is></c></row>\
             <row><c s=\"1\"><v>45366</v></c><c s=\"2\"><v>1234.5</v></c></row>",
        );
        let xlsx = build_xlsx(&[("xl/styles.xml", styles), ("xl/worksheets/sheet1.xml", sheet1.as_str())]);
        let rows = parse_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap();
        assert_eq!(rows[0].get("Date"), Some("15.03.2024"));
        assert_eq!(rows[0].get("Sum"), Some("1,234.50"));
    }

    #[test]
    fn invalid_zip_returns_error_and_no_rows() {
        let err = parse_workbook(b"PK\x03\x04garbage", "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap_err();
        assert!(matches!(err, XlsxError::Zip(_)));
        assert!(read_workbook(b"PK\x03\x04garbage", "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).is_empty());
    }

    #[test]
    fn zip_without_sheets_is_an_error() {
        let xlsx = build_xlsx(&[("readme.txt", "not a workbook")]);
        let err = parse_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).unwrap_err();
        assert!(matches!(err, XlsxError::NoSheet));
    }

    #[test]
    fn bad_shared_string_index_fails_closed() {
        let sheet1 = sheet("<row><c t=\"s\"><v>0</v></c></row><row><c t=\"s\"><v>99</v></c></row>");
        let xlsx = build_xlsx(&[("xl/sharedStrings.xml", SHARED), ("xl/worksheets/sheet1.xml", sheet1.as_str())]);
        assert!(read_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES).is_empty());
    }

    #[test]
    fn oversized_entry_is_rejected() {
        let big = sheet(&"<row><c><v>1</v></c></row>".repeat(100));
        let xlsx = build_xlsx(&[("xl/worksheets/sheet1.xml", big.as_str())]);
        let err = parse_workbook(&xlsx, "b.xlsx", 64).unwrap_err();
        assert!(matches!(err, XlsxError::EntryTooLarge { .. }));
    }

    #[test]
    fn entry_at_exact_limit_is_accepted() {
        let sheet1 = sheet("<row><c t=\"inlineStr\"><is><t>H</t></is></c></row><row><c><v>7</v></c></row>");
        let xlsx = build_xlsx(&[("xl/worksheets/sheet1.xml", sheet1.as_str())]);
        let limit = sheet1.len() as u64;
        let rows = parse_workbook(&xlsx, "b.xlsx", limit).unwrap();
        assert_eq!(rows[0].get("H"), Some("7"));
        let err = parse_workbook(&xlsx, "b.xlsx", limit - 1).unwrap_err();
        assert!(matches!(err, XlsxError::EntryTooLarge { .. }));
    }

    #[test]
    fn date_style_with_huge_serial_renders_as_number() {
        let styles = "<?xml version=\"1.0\"?><styleSheet xmlns=\"http://schemas.openxmlformats.org/spreadsheetml/2006/main\"><cellXfs count=\"2\"><xf numFmtId=\"0\"/><xf numFmtId=\"14\"/></cellXfs></styleSheet>";
        let sheet1 = sheet(
            "<row><c t=\"inlineStr\"><is><t>When</t></is></c></row>\
             <row><c s=\"1\"><v>1000000000</v></c></row>\
             <row><c s=\"1\"><v>1E+300</v></c></row>",
        );
        let xlsx = build_xlsx(&[("xl/styles.xml", styles), ("xl/worksheets/sheet1.xml", sheet1.as_str())]);
        let rows = read_workbook(&xlsx, "b.xlsx", DEFAULT_MAX_ENTRY_BYTES);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("When"), Some("1000000000"));
        assert_eq!(rows[1].get("When"), Some("1E+300"));
    }
}
