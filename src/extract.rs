//! Sheet selection and JSON output writing.
//!
//! This is the extraction pipeline behind the `extract` binary: open the
//! workbook, select sheets, serialize, write. It runs single-threaded and
//! touches no output path until selection has succeeded; every file write
//! goes through a temp file so a failed run never leaves partial output.

use crate::error::{Error, Result};
use crate::model::{Sheet, Workbook};
use crate::render::{self, JsonFormat};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Options controlling an extraction run.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Restrict output to exactly this sheet, matched verbatim
    /// (case-sensitive, whitespace-sensitive).
    pub sheet: Option<String>,
    /// Write one JSON file per selected sheet into the output directory
    /// instead of a single combined file.
    pub split_sheets: bool,
    /// JSON formatting of the output.
    pub format: JsonFormat,
}

/// What an extraction run wrote.
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    /// Output files, in the order they were written.
    pub files: Vec<PathBuf>,
    /// Names of the sheets that were extracted, in workbook order.
    pub sheets: Vec<String>,
}

/// Convert a workbook file to JSON on disk.
///
/// In single-file mode `output` is the destination file: one selected sheet
/// serializes as its grid directly, several as an object keyed by sheet
/// name. In split mode `output` is a directory (created if absent) and each
/// selected sheet becomes `<sanitized name>.json` inside it.
pub fn extract(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractSummary> {
    let workbook = crate::open_workbook(input)?;
    extract_workbook(&workbook, output.as_ref(), options)
}

/// Run the selection and writing stages on an already-parsed workbook.
pub fn extract_workbook(
    workbook: &Workbook,
    output: &Path,
    options: &ExtractOptions,
) -> Result<ExtractSummary> {
    let selected = select_sheets(workbook, options.sheet.as_deref())?;

    let mut summary = ExtractSummary {
        files: Vec::new(),
        sheets: selected.iter().map(|s| s.name.clone()).collect(),
    };

    if options.split_sheets {
        // Serialize everything up front; writing starts only once every
        // payload is known good.
        let names = output_filenames(&selected);
        let mut payloads = Vec::with_capacity(selected.len());
        for (sheet, name) in selected.iter().zip(&names) {
            let json = render::to_string(&render::sheet_value(sheet), options.format)?;
            payloads.push((output.join(name), json));
        }

        std::fs::create_dir_all(output)?;
        for (path, json) in payloads {
            write_atomic(&path, json.as_bytes())?;
            summary.files.push(path);
        }
    } else {
        let value = if selected.len() == 1 {
            render::sheet_value(selected[0])
        } else {
            render::sheets_value(selected.iter().copied())
        };
        let json = render::to_string(&value, options.format)?;

        write_atomic(output, json.as_bytes())?;
        summary.files.push(output.to_path_buf());
    }

    Ok(summary)
}

/// Select sheets for extraction.
///
/// A filter must match exactly one sheet verbatim; no filter selects every
/// sheet in workbook order.
fn select_sheets<'a>(workbook: &'a Workbook, filter: Option<&str>) -> Result<Vec<&'a Sheet>> {
    match filter {
        Some(name) => workbook
            .sheet(name)
            .map(|s| vec![s])
            .ok_or_else(|| Error::SheetNotFound(name.to_string())),
        None => Ok(workbook.sheets.iter().collect()),
    }
}

/// Output filenames for split mode: sanitized, `.json`-suffixed, and
/// de-duplicated with a numeric suffix when two names collapse to the same
/// file.
fn output_filenames(sheets: &[&Sheet]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::with_capacity(sheets.len());

    for sheet in sheets {
        let base = sanitize_filename(&sheet.name);
        let count = seen.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            names.push(format!("{}.json", base));
        } else {
            names.push(format!("{}_{}.json", base, count));
        }
    }

    names
}

/// Make a sheet name safe to use as a filename.
///
/// Trims the name, then replaces each run of characters outside
/// `[A-Za-z0-9._-]` with a single underscore. Names that sanitize to
/// nothing fall back to `sheet`.
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_gap = false;

    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            if pending_gap {
                out.push('_');
                pending_gap = false;
            }
            out.push(c);
        } else {
            pending_gap = true;
        }
    }
    if pending_gap {
        out.push('_');
    }

    if out.is_empty() {
        "sheet".to_string()
    } else {
        out
    }
}

/// Write a file atomically: serialize into a temp file next to the target,
/// then rename over it. A failure mid-write leaves the target untouched.
fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CellValue;

    fn workbook_with(names: &[&str]) -> Workbook {
        let mut wb = Workbook::new();
        for name in names {
            let mut sheet = Sheet::new(*name);
            sheet.push_row(vec![CellValue::from(*name)]);
            wb.add_sheet(sheet);
        }
        wb
    }

    #[test]
    fn test_select_all_in_order() {
        let wb = workbook_with(&["b", "a", "c"]);
        let selected = select_sheets(&wb, None).unwrap();
        let names: Vec<&str> = selected.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn test_select_exact_match_only() {
        let wb = workbook_with(&[" Fr-01", "Fr-01"]);

        let selected = select_sheets(&wb, Some(" Fr-01")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name, " Fr-01");

        let err = select_sheets(&wb, Some("fr-01")).unwrap_err();
        assert!(matches!(err, Error::SheetNotFound(_)));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename(" Fr-01"), "Fr-01");
        assert_eq!(sanitize_filename("Q1 / Summary"), "Q1_Summary");
        assert_eq!(sanitize_filename("a++b"), "a_b");
        assert_eq!(sanitize_filename("données"), "donn_es");
        assert_eq!(sanitize_filename("   "), "sheet");
        assert_eq!(sanitize_filename("报表"), "_");
        assert_eq!(sanitize_filename("plain_name.v2"), "plain_name.v2");
    }

    #[test]
    fn test_filename_deduplication() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::new("Q1 Report"));
        wb.add_sheet(Sheet::new("Q1/Report"));
        wb.add_sheet(Sheet::new("Q1+Report"));
        let selected: Vec<&Sheet> = wb.sheets.iter().collect();

        assert_eq!(
            output_filenames(&selected),
            [
                "Q1_Report.json",
                "Q1_Report_2.json",
                "Q1_Report_3.json"
            ]
        );
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_single_mode_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let wb = workbook_with(&["one", "two"]);

        // One selected sheet: the document is the grid itself.
        let single = dir.path().join("single.json");
        let options = ExtractOptions {
            sheet: Some("one".to_string()),
            ..Default::default()
        };
        extract_workbook(&wb, &single, &options).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&single).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([["one"]]));

        // All sheets: an object keyed by sheet name.
        let combined = dir.path().join("combined.json");
        extract_workbook(&wb, &combined, &ExtractOptions::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&combined).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({"one": [["one"]], "two": [["two"]]}));
    }

    #[test]
    fn test_split_mode_writes_per_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("sheets");
        let wb = workbook_with(&[" Fr-01", " Fr-02"]);

        let options = ExtractOptions {
            split_sheets: true,
            ..Default::default()
        };
        let summary = extract_workbook(&wb, &out, &options).unwrap();

        assert_eq!(summary.files.len(), 2);
        assert!(out.join("Fr-01.json").exists());
        assert!(out.join("Fr-02.json").exists());
    }

    #[test]
    fn test_sheet_not_found_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing");
        let wb = workbook_with(&["a"]);

        let options = ExtractOptions {
            sheet: Some("b".to_string()),
            split_sheets: true,
            ..Default::default()
        };
        let err = extract_workbook(&wb, &out, &options).unwrap_err();
        assert!(matches!(err, Error::SheetNotFound(_)));
        // The selection miss happens before the directory is created.
        assert!(!out.exists());
    }

    #[test]
    fn test_empty_workbook_single_mode() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.json");

        extract_workbook(&Workbook::new(), &out, &ExtractOptions::default()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
