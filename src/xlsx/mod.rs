//! XLSX (Excel) workbook parsing.
//!
//! This module reads workbooks in the Office Open XML (.xlsx) format and
//! produces the [`Workbook`](crate::Workbook) model: named sheets holding
//! typed cell grids.
//!
//! # Example
//!
//! ```no_run
//! use sheetdump::xlsx::XlsxParser;
//!
//! let parser = XlsxParser::open("data.xlsx")?;
//! let workbook = parser.parse()?;
//!
//! for sheet in &workbook.sheets {
//!     println!("{}: {} rows", sheet.name, sheet.row_count());
//! }
//! # Ok::<(), sheetdump::Error>(())
//! ```

mod parser;
mod shared_strings;

pub use parser::XlsxParser;
pub use shared_strings::SharedStrings;
