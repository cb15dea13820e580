pub mod delimited;
pub mod workbook;

use crate::domain::error::{AppError, Result};
use crate::domain::table::Table;
use chrono::{DateTime, Local};
use delimited::CsvReader;
use std::fs;
use std::path::{Path, PathBuf};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Read `sheet` from a workbook, or the whole file for CSV input.
pub fn read_table(path: &Path, sheet: &str) -> Result<Table> {
    if !path.exists() {
        return Err(AppError::NotFound(format!(
            "Input file not found: {}",
            path.display()
        )));
    }

    match extension_of(&path.to_string_lossy()).as_deref() {
        Some("csv") | Some("txt") => CsvReader::new().read_file(path),
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => workbook::read_workbook(path, sheet),
        _ => Err(AppError::ValidationError(format!(
            "Unsupported input file: {}",
            path.display()
        ))),
    }
}

/// Same as [`read_table`] for uploaded content; without a file name the
/// bytes are treated as a workbook.
pub fn read_table_bytes(file_name: Option<&str>, bytes: Vec<u8>, sheet: &str) -> Result<Table> {
    match file_name.and_then(extension_of).as_deref() {
        Some("csv") | Some("txt") => CsvReader::new().read_bytes(&bytes),
        _ => workbook::read_workbook_bytes(bytes, sheet),
    }
}

#[derive(Debug, Clone)]
pub struct SpreadsheetCandidate {
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

impl SpreadsheetCandidate {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// `*.xlsx` files in `dir`, newest first. Excel lock files (`~$…`) are
/// ignored. A missing directory yields an empty list.
pub fn discover_spreadsheets(dir: &Path) -> Result<Vec<SpreadsheetCandidate>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if !path.is_file() || name.starts_with("~$") {
            continue;
        }
        if extension_of(&name).as_deref() != Some("xlsx") {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        candidates.push(SpreadsheetCandidate {
            path,
            modified: DateTime::<Local>::from(modified),
        });
    }

    candidates.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(candidates)
}
