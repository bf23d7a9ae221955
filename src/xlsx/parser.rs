//! XLSX workbook parser.

use crate::archive::XlsxArchive;
use crate::error::{Error, Result};
use crate::model::{CellValue, Sheet, Workbook};
use std::collections::HashMap;
use std::path::Path;

use super::shared_strings::SharedStrings;

/// Sheet entry from workbook.xml.
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    rel_id: String,
}

/// Parser for XLSX (Excel) workbooks.
pub struct XlsxParser {
    archive: XlsxArchive,
    shared_strings: SharedStrings,
    sheets: Vec<SheetEntry>,
    relationships: HashMap<String, String>,
}

impl XlsxParser {
    /// Open an XLSX file for parsing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_archive(XlsxArchive::open(path)?)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_archive(XlsxArchive::from_bytes(data)?)
    }

    fn from_archive(archive: XlsxArchive) -> Result<Self> {
        // Shared strings are optional: workbooks without text cells omit
        // the part entirely.
        let shared_strings = if archive.exists("xl/sharedStrings.xml") {
            SharedStrings::parse(&archive.read_xml("xl/sharedStrings.xml")?)?
        } else {
            SharedStrings::default()
        };

        let relationships = Self::parse_workbook_rels(&archive)?;
        let sheets = Self::parse_workbook(&archive)?;

        Ok(Self {
            archive,
            shared_strings,
            sheets,
            relationships,
        })
    }

    /// Parse workbook relationships (`xl/_rels/workbook.xml.rels`).
    fn parse_workbook_rels(archive: &XlsxArchive) -> Result<HashMap<String, String>> {
        let mut rels = HashMap::new();
        // A workbook with no sheets may legitimately carry no rels part.
        if !archive.exists("xl/_rels/workbook.xml.rels") {
            return Ok(rels);
        }
        let xml = archive.read_xml("xl/_rels/workbook.xml.rels")?;

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = String::new();
                    let mut target = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                            b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !id.is_empty() && !target.is_empty() {
                        rels.insert(id, target);
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::Format(format!("XML parse error: {}", e))),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Parse workbook.xml for the ordered sheet list.
    ///
    /// Sheet names are taken verbatim; Excel allows names with leading or
    /// trailing spaces and selection must match them exactly.
    fn parse_workbook(archive: &XlsxArchive) -> Result<Vec<SheetEntry>> {
        let mut sheets = Vec::new();
        let xml = archive.read_xml("xl/workbook.xml")?;

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(e)) | Ok(quick_xml::events::Event::Start(e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => name = String::from_utf8_lossy(&attr.value).to_string(),
                            b"r:id" => rel_id = String::from_utf8_lossy(&attr.value).to_string(),
                            _ => {}
                        }
                    }

                    if !name.is_empty() {
                        sheets.push(SheetEntry { name, rel_id });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::Format(format!("XML parse error: {}", e))),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Parse every sheet and return the workbook model.
    pub fn parse(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();

        for entry in &self.sheets {
            let target = self.relationships.get(&entry.rel_id).ok_or_else(|| {
                Error::Format(format!(
                    "no worksheet part for sheet {:?} ({})",
                    entry.name, entry.rel_id
                ))
            })?;

            let part = if let Some(absolute) = target.strip_prefix('/') {
                absolute.to_string()
            } else {
                format!("xl/{}", target)
            };

            let xml = self.archive.read_xml(&part)?;
            let mut sheet = Sheet::new(entry.name.clone());
            sheet.rows = self.parse_sheet_rows(&xml)?;
            workbook.add_sheet(sheet);
        }

        Ok(workbook)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Parse a worksheet part into grid rows.
    ///
    /// Worksheet XML is sparse: rows and cells carry `r` attributes and
    /// anything empty is simply absent. Leading gaps are padded with
    /// [`CellValue::Empty`] so cell positions survive the round trip;
    /// nothing is appended past the last stored cell of a row.
    fn parse_sheet_rows(&self, xml: &str) -> Result<Vec<Vec<CellValue>>> {
        let mut rows: Vec<Vec<CellValue>> = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);

        let mut buf = Vec::new();
        let mut in_row = false;
        let mut in_cell = false;
        let mut in_value = false;
        let mut current_row: Vec<CellValue> = Vec::new();
        let mut cell_type: Option<String> = None;
        let mut cell_column: Option<usize> = None;
        let mut cell_value = String::new();
        let mut has_value = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"row" => {
                        in_row = true;
                        current_row = Vec::new();
                        // Skipped rows become empty rows so vertical
                        // positions are preserved.
                        if let Some(number) = row_number(e) {
                            while rows.len() + 1 < number {
                                rows.push(Vec::new());
                            }
                        }
                    }
                    b"c" if in_row => {
                        in_cell = true;
                        cell_type = None;
                        cell_column = None;
                        cell_value.clear();
                        has_value = false;
                        read_cell_attributes(e, &mut cell_type, &mut cell_column);
                    }
                    b"v" | b"t" if in_cell => in_value = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Empty(ref e)) => match e.local_name().as_ref() {
                    // Self-closing cell: present in the file (usually for a
                    // style) but holding no value.
                    b"c" if in_row => {
                        cell_type = None;
                        cell_column = None;
                        read_cell_attributes(e, &mut cell_type, &mut cell_column);
                        place_cell(&mut current_row, cell_column, CellValue::Empty);
                    }
                    // Self-closing row with no cells at all.
                    b"row" => {
                        if let Some(number) = row_number(e) {
                            while rows.len() + 1 < number {
                                rows.push(Vec::new());
                            }
                        }
                        rows.push(Vec::new());
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_value {
                        cell_value.push_str(&e.unescape().unwrap_or_default());
                        has_value = true;
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.local_name().as_ref() {
                    b"row" => {
                        rows.push(std::mem::take(&mut current_row));
                        in_row = false;
                    }
                    b"c" if in_cell => {
                        let value = self.resolve_cell(&cell_value, cell_type.as_deref(), has_value);
                        place_cell(&mut current_row, cell_column, value);
                        in_cell = false;
                    }
                    b"v" | b"t" => in_value = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::Format(format!("XML parse error: {}", e))),
                _ => {}
            }
            buf.clear();
        }

        Ok(rows)
    }

    /// Resolve a raw cell value based on its type attribute.
    fn resolve_cell(&self, raw: &str, cell_type: Option<&str>, has_value: bool) -> CellValue {
        match cell_type {
            Some("s") => {
                // Shared string index
                match raw.trim().parse::<usize>() {
                    Ok(idx) => CellValue::Text(
                        self.shared_strings.get(idx).unwrap_or_default().to_string(),
                    ),
                    Err(_) => CellValue::Text(raw.to_string()),
                }
            }
            Some("b") => CellValue::Bool(raw.trim() == "1"),
            Some("str") | Some("inlineStr") => CellValue::Text(raw.to_string()),
            // Error cells keep their literal, e.g. "#DIV/0!".
            Some("e") => CellValue::Text(raw.to_string()),
            _ => {
                if !has_value || raw.trim().is_empty() {
                    CellValue::Empty
                } else {
                    match raw.trim().parse::<f64>() {
                        Ok(n) => CellValue::Number(n),
                        Err(_) => CellValue::Text(raw.to_string()),
                    }
                }
            }
        }
    }
}

/// Read the `t` (type) and `r` (reference) attributes of a cell element.
fn read_cell_attributes(
    e: &quick_xml::events::BytesStart<'_>,
    cell_type: &mut Option<String>,
    cell_column: &mut Option<usize>,
) {
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"t" => *cell_type = Some(String::from_utf8_lossy(&attr.value).to_string()),
            b"r" => {
                *cell_column = column_index(&String::from_utf8_lossy(&attr.value));
            }
            _ => {}
        }
    }
}

/// Read the 1-based `r` attribute of a row element.
fn row_number(e: &quick_xml::events::BytesStart<'_>) -> Option<usize> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"r")
        .and_then(|a| String::from_utf8_lossy(&a.value).trim().parse().ok())
}

/// Place a cell at its column, padding skipped columns with empty cells.
fn place_cell(row: &mut Vec<CellValue>, column: Option<usize>, value: CellValue) {
    if let Some(target) = column {
        while row.len() < target {
            row.push(CellValue::Empty);
        }
    }
    row.push(value);
}

/// Zero-based column index from a cell reference like `"BC7"`.
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }

    let mut index: usize = 0;
    for c in letters.chars() {
        index = index * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}
