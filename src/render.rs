//! JSON rendering for sheets and workbooks.

use crate::error::Result;
use crate::model::Sheet;
use serde_json::Value;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Render a single sheet as its grid: an array of row arrays.
pub fn sheet_value(sheet: &Sheet) -> Value {
    serde_json::to_value(sheet).unwrap_or(Value::Null)
}

/// Render a set of sheets as an object mapping sheet name to grid.
///
/// Insertion order is preserved, so the object keys follow workbook order.
pub fn sheets_value<'a>(sheets: impl IntoIterator<Item = &'a Sheet>) -> Value {
    let mut map = serde_json::Map::new();
    for sheet in sheets {
        map.insert(sheet.name.clone(), sheet_value(sheet));
    }
    Value::Object(map)
}

/// Serialize a JSON value with the given format.
pub fn to_string(value: &Value, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(value)?,
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
    };
    Ok(json)
}
