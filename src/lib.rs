//! # sheetdump
//!
//! Excel workbook to JSON extraction.
//!
//! This library parses `.xlsx` workbooks and converts their sheets to
//! JSON grids, either as a single document or as one file per sheet.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sheetdump::{extract, ExtractOptions};
//!
//! // Single combined file: all sheets keyed by name.
//! extract("data.xlsx", "data.json", &ExtractOptions::default())?;
//!
//! // One sheet only, matched verbatim.
//! let options = ExtractOptions {
//!     sheet: Some(" Fr-01".to_string()),
//!     ..Default::default()
//! };
//! extract("data.xlsx", "fr01.json", &options)?;
//!
//! // One JSON file per sheet in a directory.
//! let options = ExtractOptions {
//!     split_sheets: true,
//!     ..Default::default()
//! };
//! extract("data.xlsx", "out/", &options)?;
//! # Ok::<(), sheetdump::Error>(())
//! ```
//!
//! ## Lower-level API
//!
//! ```no_run
//! use sheetdump::open_workbook;
//!
//! let workbook = open_workbook("data.xlsx")?;
//! for sheet in &workbook.sheets {
//!     println!("{}: {} rows", sheet.name, sheet.row_count());
//! }
//! # Ok::<(), sheetdump::Error>(())
//! ```

pub mod archive;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod xlsx;

// Re-exports
pub use error::{Error, Result};
pub use extract::{extract, extract_workbook, ExtractOptions, ExtractSummary};
pub use model::{CellValue, Sheet, Workbook};
pub use render::JsonFormat;
pub use xlsx::XlsxParser;

use std::path::Path;

/// Open and parse a workbook file.
///
/// # Example
///
/// ```no_run
/// use sheetdump::open_workbook;
///
/// let workbook = open_workbook("data.xlsx")?;
/// println!("Sheets: {}", workbook.sheet_count());
/// # Ok::<(), sheetdump::Error>(())
/// ```
pub fn open_workbook(path: impl AsRef<Path>) -> Result<Workbook> {
    XlsxParser::open(path)?.parse()
}

/// Parse a workbook from bytes.
///
/// # Example
///
/// ```no_run
/// use sheetdump::parse_bytes;
///
/// let data = std::fs::read("data.xlsx")?;
/// let workbook = parse_bytes(&data)?;
/// # Ok::<(), sheetdump::Error>(())
/// ```
pub fn parse_bytes(data: &[u8]) -> Result<Workbook> {
    XlsxParser::from_bytes(data.to_vec())?.parse()
}
