//! Workbook data model.
//!
//! Parsers produce these structures and renderers serialize them; nothing
//! mutates a [`Workbook`] after construction.

use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A single cell value.
///
/// Only the last computed value of a cell is retained. Formulas, styling
/// and number formats are not part of the model.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// An empty cell, serialized as JSON `null`.
    #[default]
    Empty,
    /// A boolean cell.
    Bool(bool),
    /// A numeric cell. Excel stores all numbers as doubles.
    Number(f64),
    /// A text cell (shared, inline, or error literal).
    Text(String),
}

impl CellValue {
    /// Whether this cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

// Largest integer magnitude an f64 represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Number(n) => {
                // Integral values print without a fractional part so the
                // output matches what the workbook shows (42, not 42.0).
                if n.fract() == 0.0 && n.is_finite() && n.abs() <= MAX_EXACT_INT {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            CellValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// One named sheet: an ordered, possibly jagged grid of cell values.
///
/// Row order is top-to-bottom and cell order left-to-right, matching the
/// source workbook. The name is kept verbatim, including any leading or
/// trailing whitespace.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// Sheet name as stored in the workbook.
    pub name: String,
    /// Grid rows. Leading gaps are padded with [`CellValue::Empty`];
    /// trailing gaps are not, so rows may differ in length.
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Create an empty sheet with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Append a row to the grid.
    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Number of rows in the grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Widest row in the grid.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for Sheet {
    /// A sheet serializes as its grid: an array of row arrays.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// A parsed workbook: an ordered sequence of sheets.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    /// Sheets in workbook order.
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet.
    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Look up a sheet by exact name.
    ///
    /// The match is case-sensitive and whitespace-sensitive: `" Fr-01"`
    /// and `"Fr-01"` are different sheets.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Whether the workbook has no sheets.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
