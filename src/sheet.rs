//! In-memory spreadsheet table.
//!
//! The first worksheet of an `.xlsx` / `.xlsb` workbook is read from memory;
//! its first row becomes the header, every following row a data row. Rows
//! are padded to the header width so positional access never goes out of
//! bounds. A table can also be written back out as a single-sheet `.xlsx`.

use std::io::{Cursor, Write};

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Workbook could not be opened: {0}")]
    Open(String),
    #[error("Workbook has no worksheets")]
    NoWorksheet,
    #[error("Worksheet could not be read: {0}")]
    Worksheet(String),
    #[error("Workbook could not be written: {0}")]
    Write(String),
}

impl From<zip::result::ZipError> for SheetError {
    fn from(err: zip::result::ZipError) -> Self {
        SheetError::Write(err.to_string())
    }
}

impl From<std::io::Error> for SheetError {
    fn from(err: std::io::Error) -> Self {
        SheetError::Write(err.to_string())
    }
}

/// A single cell value, reduced to what the pipelines care about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Text content, trimmed. Numbers are rendered without a trailing `.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let t = s.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t.to_string())
                }
            }
            Cell::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::DateTime(dt) => Some(dt.format("%d/%m/%Y").to_string()),
        }
    }

    /// Text content as stored, without trimming. Only empty strings are `None`.
    pub fn raw_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            other => other.as_text(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }
}

impl From<&Data> for Cell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(n) => Cell::Number(*n as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::Error(_) => Cell::Empty,
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(parsed) => Cell::DateTime(parsed),
                None => Cell::Empty,
            },
            Data::DateTimeIso(s) => Cell::Text(s.clone()),
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Header plus rows; every row has `headers.len()` cells when built
/// through [`Table::new`]. Readers go through [`Table::cell`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, padding or keeping rows so they match the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, Cell::Empty);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Positional cell access; out-of-range yields `Cell::Empty`.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .map(|c| Cell::from(c).as_text().unwrap_or_default())
                .collect(),
            None => return Self::new(Vec::new(), Vec::new()),
        };

        let body: Vec<Vec<Cell>> = rows
            .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>())
            .filter(|row: &Vec<Cell>| row.iter().any(|c| !c.is_empty()))
            .collect();

        Self::new(headers, body)
    }
}

/// Parse the first worksheet of a workbook held in memory.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Table, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| SheetError::Open(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)?
        .map_err(|e| SheetError::Worksheet(e.to_string()))?;

    let table = Table::from_range(&range);
    log::debug!(
        "Parsed worksheet: {} columns, {} rows",
        table.column_count(),
        table.row_count()
    );
    Ok(table)
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            // not valid in XML 1.0
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// `0` -> `A`, `25` -> `Z`, `26` -> `AA`.
fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().map(|b| *b as char).collect()
}

fn write_cell(xml: &mut String, reference: &str, cell: &Cell) {
    match cell {
        Cell::Empty => {}
        Cell::Number(n) if n.is_finite() => {
            xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
        }
        Cell::Bool(b) => {
            xml.push_str(&format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, reference, u8::from(*b)));
        }
        other => {
            if let Some(text) = other.raw_text() {
                xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    reference,
                    escape_xml(&text)
                ));
            }
        }
    }
}

fn sheet_xml(table: &Table) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="{}"><sheetData>"#,
        SHEET_NS
    );
    let header_row: Vec<Cell> = table.headers.iter().map(|h| Cell::Text(h.clone())).collect();
    for (r, row) in std::iter::once(&header_row).chain(table.rows.iter()).enumerate() {
        xml.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(c), r + 1);
            write_cell(&mut xml, &reference, cell);
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Write `table` as a one-sheet `.xlsx` workbook: headers in row 1, then the
/// data rows. Text is stored inline, dates as `dd/mm/yyyy` text.
pub fn write_workbook(table: &Table, sheet_name: &str) -> Result<Vec<u8>, SheetError> {
    let workbook_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        SHEET_NS,
        escape_xml(sheet_name)
    );

    let sheet = sheet_xml(table);
    let parts: [(&str, &str); 5] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", workbook_xml.as_str()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/worksheets/sheet1.xml", sheet.as_str()),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    let bytes = zip.finish()?.into_inner();
    log::debug!(
        "Wrote workbook '{}': {} rows, {} bytes",
        sheet_name,
        table.row_count(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Shorthand for building fixtures: `""` is empty, anything else is text.
    pub fn text_row(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect()
    }

    pub fn headers(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Coluna {}", i + 1)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_short_rows_are_padded() {
        let table = Table::new(headers(4), vec![text_row(&["a", "b"])]);
        assert_eq!(table.rows[0].len(), 4);
        assert_eq!(table.cell(0, 3), &Cell::Empty);
    }

    #[test]
    fn test_out_of_range_cell_is_empty() {
        let table = Table::new(headers(2), vec![text_row(&["a", "b"])]);
        assert_eq!(table.cell(5, 0), &Cell::Empty);
        assert_eq!(table.cell(0, 9), &Cell::Empty);
    }

    #[test]
    fn test_cell_text_rendering() {
        assert_eq!(Cell::Number(42.0).as_text().as_deref(), Some("42"));
        assert_eq!(Cell::Number(1.5).as_text().as_deref(), Some("1.5"));
        assert_eq!(Cell::Text("  ELETRICISTA ".into()).as_text().as_deref(), Some("ELETRICISTA"));
        assert_eq!(Cell::Text("   ".into()).as_text(), None);
        assert!(Cell::Empty.is_empty());
    }

    #[test]
    fn test_from_range_uses_first_row_as_header() {
        let mut range: Range<Data> = Range::new((0, 0), (2, 1));
        range.set_value((0, 0), Data::String("Nome".into()));
        range.set_value((0, 1), Data::String("Função".into()));
        range.set_value((1, 0), Data::String("Ana".into()));
        range.set_value((1, 1), Data::String("ELETRICISTA".into()));
        // Row 2 left blank: dropped.

        let table = Table::from_range(&range);
        assert_eq!(table.headers, vec!["Nome", "Função"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 0), &Cell::Text("Ana".into()));
    }

    #[test]
    fn test_raw_text_keeps_spaces() {
        assert_eq!(Cell::Text(" NÃO CONTRATADO".into()).raw_text().as_deref(), Some(" NÃO CONTRATADO"));
        assert_eq!(Cell::Text(String::new()).raw_text(), None);
        assert_eq!(Cell::Number(7.0).raw_text().as_deref(), Some("7"));
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(13), "N");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(701), "ZZ");
        assert_eq!(column_letters(702), "AAA");
    }

    #[test]
    fn test_written_workbook_reads_back() {
        let table = Table::new(
            vec!["Nome".into(), "Função".into(), "Idade".into()],
            vec![
                vec![
                    Cell::Text("Ana <Souza> & Cia".into()),
                    Cell::Text("ELETRICISTA".into()),
                    Cell::Number(31.0),
                ],
                vec![Cell::Text("Bruno".into()), Cell::Empty, Cell::Text("".into())],
            ],
        );

        let bytes = write_workbook(&table, "Avaliações").expect("write");
        assert!(bytes.starts_with(b"PK"));

        let back = parse_workbook(bytes).expect("read back");
        assert_eq!(back.headers, vec!["Nome", "Função", "Idade"]);
        assert_eq!(back.row_count(), 2);
        assert_eq!(back.cell(0, 0).as_text().as_deref(), Some("Ana <Souza> & Cia"));
        assert_eq!(back.cell(0, 2).as_text().as_deref(), Some("31"));
        assert_eq!(back.cell(1, 0).as_text().as_deref(), Some("Bruno"));
        assert!(back.cell(1, 1).is_empty());
    }

    #[test]
    fn test_garbage_bytes_fail_to_open() {
        let err = parse_workbook(b"not a workbook".to_vec()).unwrap_err();
        assert!(matches!(err, SheetError::Open(_)));
    }
}
