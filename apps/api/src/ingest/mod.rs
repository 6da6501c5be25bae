//! Spreadsheet ingestion: uploaded `.xlsx` / `.xls` exports → generic
//! key/value rows for the analytics webhook.
//!
//! Rules:
//! - sheet: the first whose name contains "conversation" (any case), else the first sheet
//! - the first row is the header; blank headers become `__EMPTY`, `__EMPTY_1`, ...
//!   and repeated headers get `_1`, `_2`, ... suffixes
//! - blank cells default to `""`; rows with no values at all are skipped
//! - every value is rendered as display text

pub mod handlers;

use std::collections::{BTreeMap, HashMap};
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, DataType, Reader};
use thiserror::Error;
use tracing::debug;

/// One spreadsheet row keyed by header.
pub type SheetRow = BTreeMap<String, String>;

const SUPPORTED_EXTENSIONS: [&str; 5] = [".xlsx", ".xls", ".xlsm", ".xlsb", ".ods"];
const PREFERRED_SHEET_HINT: &str = "conversation";
const EMPTY_HEADER: &str = "__EMPTY";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{0}: unsupported file type (expected .xlsx or .xls)")]
    UnsupportedFile(String),

    #[error("{file}: {source}")]
    Workbook {
        file: String,
        #[source]
        source: calamine::Error,
    },

    #[error("{0}: workbook has no sheets")]
    NoSheets(String),
}

pub fn is_supported_file(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    SUPPORTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Parses one uploaded workbook into rows.
pub fn parse_workbook(file_name: &str, bytes: Vec<u8>) -> Result<Vec<SheetRow>, IngestError> {
    if !is_supported_file(file_name) {
        return Err(IngestError::UnsupportedFile(file_name.to_string()));
    }

    let workbook_error = |source| IngestError::Workbook {
        file: file_name.to_string(),
        source,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(workbook_error)?;
    let sheet_names = workbook.sheet_names();
    let sheet = pick_sheet(&sheet_names)
        .ok_or_else(|| IngestError::NoSheets(file_name.to_string()))?
        .to_string();

    let range = workbook.worksheet_range(&sheet).map_err(workbook_error)?;
    let rows = rows_from_cells(range.rows());
    debug!("{file_name}: sheet '{sheet}' → {} rows", rows.len());
    Ok(rows)
}

/// Parses several workbooks and concatenates their rows in order.
pub fn parse_workbooks(files: Vec<(String, Vec<u8>)>) -> Result<Vec<SheetRow>, IngestError> {
    let mut all_rows = Vec::new();
    for (name, bytes) in files {
        all_rows.extend(parse_workbook(&name, bytes)?);
    }
    Ok(all_rows)
}

pub fn pick_sheet(names: &[String]) -> Option<&str> {
    names
        .iter()
        .find(|n| n.to_lowercase().contains(PREFERRED_SHEET_HINT))
        .or_else(|| names.first())
        .map(String::as_str)
}

/// Header row + data rows → keyed records.
pub fn rows_from_cells<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Vec<SheetRow> {
    let Some(header_cells) = rows.next() else {
        return Vec::new();
    };
    let headers = header_names(header_cells);

    rows.filter(|cells| cells.iter().any(|c| !cell_text(c).is_empty()))
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = cells.get(i).map(cell_text).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    cells
        .iter()
        .map(|cell| {
            let text = cell_text(cell);
            let base = if text.is_empty() {
                EMPTY_HEADER.to_string()
            } else {
                text
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{base}_{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

/// Display text for a cell.
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Whole numbers print without a fractional part.
fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_pick_sheet_prefers_conversation() {
        let names = vec![
            "Summary".to_string(),
            "Conversation Reports".to_string(),
            "Raw".to_string(),
        ];
        assert_eq!(pick_sheet(&names), Some("Conversation Reports"));
    }

    #[test]
    fn test_pick_sheet_falls_back_to_first() {
        let names = vec!["Sheet1".to_string(), "Sheet2".to_string()];
        assert_eq!(pick_sheet(&names), Some("Sheet1"));
        assert_eq!(pick_sheet(&[]), None);
    }

    #[test]
    fn test_rows_default_blank_cells_and_skip_blank_rows() {
        let grid = vec![
            vec![s("Name"), s("Phone"), s("Status")],
            vec![s("Ali"), Data::Float(91234567.0), Data::Empty],
            vec![Data::Empty, Data::Empty, Data::Empty],
            vec![s("Bee")],
        ];
        let rows = rows_from_cells(grid.iter().map(Vec::as_slice));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Phone"], "91234567");
        assert_eq!(rows[0]["Status"], "");
        assert_eq!(rows[1]["Name"], "Bee");
        assert_eq!(rows[1]["Phone"], "");
    }

    #[test]
    fn test_blank_and_duplicate_headers() {
        let grid = vec![
            vec![s("Name"), Data::Empty, s("Name"), Data::Empty],
            vec![s("a"), s("b"), s("c"), s("d")],
        ];
        let rows = rows_from_cells(grid.iter().map(Vec::as_slice));
        let keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Name", "Name_1", "__EMPTY", "__EMPTY_1"]);
        assert_eq!(rows[0]["Name_1"], "c");
        assert_eq!(rows[0]["__EMPTY_1"], "d");
    }

    #[test]
    fn test_cell_text_formats() {
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&s("  padded ")), "padded");
    }

    #[test]
    fn test_empty_sheet_has_no_rows() {
        let grid: Vec<Vec<Data>> = Vec::new();
        assert!(rows_from_cells(grid.iter().map(Vec::as_slice)).is_empty());
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = parse_workbook("export.csv", b"a,b\n1,2".to_vec()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFile(_)));
    }

    #[test]
    fn test_rejects_corrupt_workbook() {
        let err = parse_workbook("export.xlsx", b"definitely not a zip".to_vec()).unwrap_err();
        assert!(matches!(err, IngestError::Workbook { .. }));
    }
}
