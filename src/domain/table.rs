// ============================================================
// TABLE TYPES
// ============================================================
// In-memory representation of one worksheet: a header row and data rows
// keyed by header text.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A single spreadsheet cell, independent of the file format it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Missing value (blank cell, error cell, short row)
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl CellValue {
    /// Whether the cell carries no usable value once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Stringified, trimmed form of the cell.
    pub fn trimmed(&self) -> String {
        self.to_string().trim().to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => {
                // Integers without decimals
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

/// One data row: header text -> cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new(cells: HashMap<String, CellValue>) -> Self {
        Self { cells }
    }

    /// Cell under `header`, or `Empty` when the row has no such column.
    pub fn get(&self, header: &str) -> &CellValue {
        self.cells.get(header).unwrap_or(&EMPTY_CELL)
    }

    /// Stringified and trimmed cell under `header`.
    pub fn text(&self, header: &str) -> String {
        self.get(header).trimmed()
    }
}

/// A header row plus data rows. Header names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl Table {
    /// Build a table from raw header cells and positional rows.
    ///
    /// Blank headers become `Unnamed: N`; repeated headers get a `.1`, `.2`
    /// suffix so every column stays addressable. Rows shorter than the
    /// header are padded with `Empty`, extra cells are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let headers = dedupe_headers(headers);

        let rows = rows
            .into_iter()
            .map(|cells| {
                let mut map = HashMap::with_capacity(headers.len());
                let mut cells = cells.into_iter();
                for header in &headers {
                    let value = cells.next().unwrap_or(CellValue::Empty);
                    map.insert(header.clone(), value);
                }
                RawRow::new(map)
            })
            .collect();

        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All values of one column, in row order.
    pub fn column<'a>(&'a self, header: &'a str) -> impl Iterator<Item = &'a CellValue> + 'a {
        self.rows.iter().map(move |row| row.get(header))
    }
}

fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut suffixes: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(headers.len());

    for (idx, raw) in headers.into_iter().enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw
        };

        let mut name = base.clone();
        if taken.contains(&name) {
            // Skip suffixes already used by a literal header
            let counter = suffixes.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                name = format!("{}.{}", base, counter);
                if !taken.contains(&name) {
                    break;
                }
            }
        }
        taken.insert(name.clone());
        out.push(name);
    }

    out
}
