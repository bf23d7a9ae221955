//! End-to-end extraction tests against generated workbooks.

use serde_json::json;
use sheetdump::{extract, CellValue, ExtractOptions, JsonFormat};
use std::path::Path;

// Helper module for generating test fixtures
mod fixtures {
    use rust_xlsxwriter::{Workbook, XlsxError};
    use std::path::Path;

    /// A workbook with two sheets whose names carry a leading space.
    pub fn write_frame_workbook(path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();

        let sheet1 = workbook.add_worksheet();
        sheet1.set_name(" Fr-01")?;
        sheet1.write_string(0, 0, "part")?;
        sheet1.write_string(0, 1, "qty")?;
        sheet1.write_string(1, 0, "bolt")?;
        sheet1.write_number(1, 1, 12.0)?;

        let sheet2 = workbook.add_worksheet();
        sheet2.set_name(" Fr-02")?;
        sheet2.write_string(0, 0, "part")?;
        sheet2.write_string(1, 0, "nut")?;

        workbook.save(path)?;
        Ok(())
    }

    /// A single sheet exercising every cell type plus a column gap.
    pub fn write_typed_workbook(path: &Path) -> Result<(), XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Types")?;

        sheet.write_string(0, 0, "label")?;
        sheet.write_number(0, 1, 3.25)?;
        sheet.write_number(0, 2, 7.0)?;
        sheet.write_boolean(0, 3, true)?;
        // Column E left empty, F written: D..E gap must pad with null.
        sheet.write_string(0, 5, "after gap")?;

        workbook.save(path)?;
        Ok(())
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn single_sheet_selection_yields_grid() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    let output = dir.path().join("fr01.json");
    let options = ExtractOptions {
        sheet: Some(" Fr-01".to_string()),
        ..Default::default()
    };
    extract(&input, &output, &options).unwrap();

    assert_eq!(
        read_json(&output),
        json!([["part", "qty"], ["bolt", 12]])
    );
}

#[test]
fn selection_requires_exact_whitespace() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    // Same name without the leading space must miss.
    let output = dir.path().join("never.json");
    let options = ExtractOptions {
        sheet: Some("Fr-01".to_string()),
        ..Default::default()
    };
    let err = extract(&input, &output, &options).unwrap_err();

    assert!(matches!(err, sheetdump::Error::SheetNotFound(_)));
    assert!(!output.exists());
}

#[test]
fn all_sheets_combine_into_object() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    let output = dir.path().join("all.json");
    extract(&input, &output, &ExtractOptions::default()).unwrap();

    let value = read_json(&output);
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, [" Fr-01", " Fr-02"]);
    assert_eq!(value[" Fr-02"], json!([["part"], ["nut"]]));
}

#[test]
fn split_mode_writes_sanitized_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    let out_dir = dir.path().join("sheets");
    let options = ExtractOptions {
        split_sheets: true,
        ..Default::default()
    };
    let summary = extract(&input, &out_dir, &options).unwrap();

    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.sheets, [" Fr-01", " Fr-02"]);

    // Leading spaces are trimmed away by filename sanitization.
    let fr01 = out_dir.join("Fr-01.json");
    let fr02 = out_dir.join("Fr-02.json");
    assert!(fr01.exists());
    assert!(fr02.exists());
    assert_eq!(read_json(&fr01), json!([["part", "qty"], ["bolt", 12]]));
}

#[test]
fn split_mode_honors_sheet_filter() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    let out_dir = dir.path().join("one");
    let options = ExtractOptions {
        sheet: Some(" Fr-02".to_string()),
        split_sheets: true,
        ..Default::default()
    };
    extract(&input, &out_dir, &options).unwrap();

    assert!(out_dir.join("Fr-02.json").exists());
    assert!(!out_dir.join("Fr-01.json").exists());
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    let first = dir.path().join("a.json");
    let second = dir.path().join("b.json");
    extract(&input, &first, &ExtractOptions::default()).unwrap();
    extract(&input, &second, &ExtractOptions::default()).unwrap();

    assert_eq!(
        std::fs::read(&first).unwrap(),
        std::fs::read(&second).unwrap()
    );
}

#[test]
fn cell_types_map_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("types.xlsx");
    fixtures::write_typed_workbook(&input).unwrap();

    let output = dir.path().join("types.json");
    let options = ExtractOptions {
        format: JsonFormat::Compact,
        ..Default::default()
    };
    extract(&input, &output, &options).unwrap();

    assert_eq!(
        read_json(&output),
        json!([["label", 3.25, 7, true, null, "after gap"]])
    );
}

#[test]
fn parse_bytes_matches_open() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("frames.xlsx");
    fixtures::write_frame_workbook(&input).unwrap();

    let from_path = sheetdump::open_workbook(&input).unwrap();
    let from_bytes = sheetdump::parse_bytes(&std::fs::read(&input).unwrap()).unwrap();

    assert_eq!(from_path.sheet_names(), from_bytes.sheet_names());
    assert_eq!(
        from_path.sheet(" Fr-01").unwrap().rows,
        from_bytes.sheet(" Fr-01").unwrap().rows
    );
    assert_eq!(
        from_path.sheet(" Fr-01").unwrap().rows[1][1],
        CellValue::Number(12.0)
    );
}

#[test]
fn missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = extract(
        dir.path().join("absent.xlsx"),
        dir.path().join("out.json"),
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, sheetdump::Error::Io(_)));
}

#[test]
fn garbage_input_is_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.xlsx");
    std::fs::write(&input, b"not a workbook at all").unwrap();

    let err = extract(
        &input,
        dir.path().join("out.json"),
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, sheetdump::Error::Format(_)));
}
