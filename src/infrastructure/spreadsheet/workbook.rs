// Excel-family workbooks (xlsx, xlsm, xls, xlsb, ods) via calamine.

use crate::domain::error::{AppError, Result};
use crate::domain::table::{CellValue, Table};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

pub fn read_workbook(path: &Path, sheet: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        AppError::IoError(format!("Failed to open Excel file {}: {}", path.display(), e))
    })?;
    read_sheet(&mut workbook, sheet)
}

pub fn read_workbook_bytes(bytes: Vec<u8>, sheet: &str) -> Result<Table> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::IoError(format!("Failed to open Excel data: {}", e)))?;
    read_sheet(&mut workbook, sheet)
}

fn read_sheet<RS: Read + Seek>(workbook: &mut Sheets<RS>, sheet: &str) -> Result<Table> {
    let names = workbook.sheet_names();
    if !names.iter().any(|name| name == sheet) {
        return Err(AppError::IoError(format!(
            "Worksheet '{}' not found (available: {})",
            sheet,
            names.join(", ")
        )));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| AppError::IoError(format!("Failed to read worksheet '{}': {}", sheet, e)))?;

    let table = range_to_table(&range);
    debug!(sheet, columns = table.headers().len(), rows = table.len(), "Worksheet loaded");
    Ok(table)
}

/// First non-empty row is the header; fully blank rows are dropped.
fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|cells| !cells.iter().all(CellValue::is_blank));

    let Some(header_cells) = rows.next() else {
        return Table::default();
    };
    let headers = header_cells.iter().map(|c| c.trimmed()).collect();

    Table::from_rows(headers, rows.collect())
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_datetime(serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// 1900 date system; serial 1.0 is 1900-01-01 (the phantom 1900-02-29 is
/// absorbed by the 1899-12-30 epoch for every serial after it).
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn articles_workbook() -> Workbook {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Articles").unwrap();

        sheet.write_string(0, 0, "Média").unwrap();
        sheet.write_string(0, 1, "Date").unwrap();
        sheet.write_string(0, 2, "URL").unwrap();
        sheet.write_string(0, 3, "Vues").unwrap();

        sheet.write_string(1, 0, "Le Monde").unwrap();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let date = ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
        sheet.write_datetime_with_format(1, 1, &date, &date_format).unwrap();
        sheet.write_string(1, 2, "https://lemonde.fr/x").unwrap();
        sheet.write_number(1, 3, 1200.0).unwrap();

        // row 2 left blank on purpose
        sheet.write_string(3, 0, "Libération").unwrap();
        sheet.write_string(3, 1, "n/a").unwrap();

        workbook.add_worksheet().set_name("Autre").unwrap();
        workbook
    }

    #[test]
    fn test_serial_conversion() {
        let dt = excel_serial_to_datetime(45356.5).unwrap();
        assert_eq!(dt.to_string(), "2024-03-05 12:00:00");
        assert_eq!(excel_serial_to_datetime(-1.0), None);
    }

    #[test]
    fn test_read_named_sheet_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revue.xlsx");
        articles_workbook().save(&path).unwrap();

        let table = read_workbook(&path, "Articles").unwrap();

        assert_eq!(table.headers(), &["Média", "Date", "URL", "Vues"]);
        assert_eq!(table.len(), 2);
        let first = &table.rows()[0];
        assert_eq!(first.text("Média"), "Le Monde");
        assert!(matches!(first.get("Date"), CellValue::DateTime(_)));
        assert_eq!(first.text("Vues"), "1200");
        assert_eq!(table.rows()[1].text("Date"), "n/a");
        assert_eq!(table.rows()[1].get("URL"), &CellValue::Empty);
    }

    #[test]
    fn test_read_from_bytes() {
        let bytes = articles_workbook().save_to_buffer().unwrap();
        let table = read_workbook_bytes(bytes, "Articles").unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_missing_sheet_lists_available_ones() {
        let bytes = articles_workbook().save_to_buffer().unwrap();
        let err = read_workbook_bytes(bytes, "Feuil1").unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
        let message = err.to_string();
        assert!(message.contains("Feuil1"));
        assert!(message.contains("Articles, Autre"));
    }

    #[test]
    fn test_empty_sheet_gives_empty_table() {
        let bytes = articles_workbook().save_to_buffer().unwrap();
        let table = read_workbook_bytes(bytes, "Autre").unwrap();
        assert!(table.headers().is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_garbage_bytes_are_an_io_error() {
        let err = read_workbook_bytes(b"not a workbook".to_vec(), "Articles").unwrap_err();
        assert!(matches!(err, AppError::IoError(_)));
    }
}
