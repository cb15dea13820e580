// ============================================================
// DELIMITED TEXT READER
// ============================================================
// CSV exports of clipping sheets, with encoding and delimiter detection

use crate::domain::error::{AppError, Result};
use crate::domain::table::{CellValue, Table};
use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;
use std::path::Path;

/// CSV reader producing a [`Table`]
#[derive(Default)]
pub struct CsvReader {
    /// Delimiter character; detected from content when `None`
    delimiter: Option<u8>,
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_file(&self, path: &Path) -> Result<Table> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.read_bytes(&bytes)
    }

    pub fn read_bytes(&self, bytes: &[u8]) -> Result<Table> {
        let content = decode(bytes);
        self.parse_content(&content)
    }

    /// First record is the header row; blank lines are skipped.
    pub fn parse_content(&self, content: &str) -> Result<Table> {
        let delimiter = self
            .delimiter
            .unwrap_or_else(|| Self::detect_delimiter(content));

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(Trim::Headers)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            rows.push(record.iter().map(CellValue::from).collect());
        }

        Ok(Table::from_rows(headers, rows))
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];
        let sample_lines: Vec<_> = content.lines().take(10).collect();

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}

/// UTF-8 (BOM stripped) or, failing that, Windows-1252 as produced by
/// older Excel "CSV" exports.
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(content) => content.to_string(),
        Err(_) => {
            let (content, _, _) = WINDOWS_1252.decode(bytes);
            content.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_semicolon_export() {
        let content = "Média;Date;Lien\nLe Monde;01/02/2023;https://lemonde.fr/x\n;;\nLibé;;\n";
        let table = CsvReader::new().parse_content(content).unwrap();

        assert_eq!(table.headers(), &["Média", "Date", "Lien"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].text("Lien"), "https://lemonde.fr/x");
        assert_eq!(table.rows()[1].get("Date"), &CellValue::Empty);
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(CsvReader::detect_delimiter("a,b,c\nd,e,f"), b',');
        assert_eq!(CsvReader::detect_delimiter("a;b;c\nd;e;f"), b';');
        assert_eq!(CsvReader::detect_delimiter("a\tb\tc\nd\te\tf"), b'\t');
    }

    #[test]
    fn test_windows_1252_fallback() {
        // "Média" in Windows-1252
        let bytes = b"M\xe9dia,url\nX,https://x.fr\n";
        let table = CsvReader::new().read_bytes(bytes).unwrap();
        assert_eq!(table.headers()[0], "Média");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFmedia,url\nX,https://x.fr\n";
        let table = CsvReader::new().read_bytes(bytes).unwrap();
        assert_eq!(table.headers()[0], "media");
    }
}
