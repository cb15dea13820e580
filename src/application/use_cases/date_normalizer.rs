// Free-form publication dates -> calendar dates.
//
// Day-before-month is preferred for ambiguous numeric dates; the date may be
// embedded in surrounding text ("Publié le 5 mars 2024 à 10h"). Failure is
// never an error: callers keep the raw text for display.

use crate::application::use_cases::column_resolver::normalize_header;
use crate::domain::table::CellValue;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\d])(\d{1,4})[-/.](\d{1,2})[-/.](\d{1,4})(?:[^\d]|$)").unwrap());

static COMPACT_DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").unwrap());

// 5 mars 2024, 1er avril 2023, 5th of March 2024
static DAY_MONTH_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})(?:er|st|nd|rd|th)?\s+(?:of\s+|de\s+)?([a-z]{3,9})\.?,?\s+(\d{4}|\d{2})\b").unwrap()
});

// March 5, 2024
static MONTH_DAY_YEAR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").unwrap()
});

/// Outcome of coercing one cell into a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCoercion {
    Parsed(NaiveDate),
    /// Missing or whitespace-only cell.
    Blank,
    /// Non-blank cell that holds no recognizable date.
    Unparseable { raw: String },
}

impl DateCoercion {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DateCoercion::Parsed(d) => Some(*d),
            _ => None,
        }
    }
}

/// Display format used in the report.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn coerce(value: &CellValue) -> DateCoercion {
    match value {
        CellValue::Empty => DateCoercion::Blank,
        CellValue::DateTime(dt) => DateCoercion::Parsed(dt.date()),
        other => coerce_text(&other.to_string()),
    }
}

pub fn coerce_text(raw: &str) -> DateCoercion {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return DateCoercion::Blank;
    }

    let folded = normalize_header(trimmed);

    parse_compact(&folded)
        .or_else(|| parse_numeric(&folded))
        .or_else(|| parse_day_month_year(&folded))
        .or_else(|| parse_month_day_year(&folded))
        .map(DateCoercion::Parsed)
        .unwrap_or_else(|| DateCoercion::Unparseable {
            raw: trimmed.to_string(),
        })
}

fn parse_compact(s: &str) -> Option<NaiveDate> {
    let caps = COMPACT_DATE_PATTERN.captures(s)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_numeric(s: &str) -> Option<NaiveDate> {
    NUMERIC_DATE_PATTERN
        .captures_iter(s)
        .find_map(|caps| numeric_date(&caps[1], &caps[2], &caps[3]))
}

fn numeric_date(a: &str, b: &str, c: &str) -> Option<NaiveDate> {
    // 2024-03-05: year first, then month and day
    if a.len() == 4 {
        let year = a.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, b.parse().ok()?, c.parse().ok()?);
    }

    if c.len() != 2 && c.len() != 4 {
        return None;
    }
    let year = expand_year(c)?;
    let first: u32 = a.parse().ok()?;
    let second: u32 = b.parse().ok()?;

    // Day first; fall back to month first when the day-first reading is
    // impossible (e.g. 02/13/2023).
    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn parse_day_month_year(s: &str) -> Option<NaiveDate> {
    DAY_MONTH_YEAR_PATTERN.captures_iter(s).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = expand_year(&caps[3])?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn parse_month_day_year(s: &str) -> Option<NaiveDate> {
    MONTH_DAY_YEAR_PATTERN.captures_iter(s).find_map(|caps| {
        let month = month_from_name(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

fn expand_year(s: &str) -> Option<i32> {
    let n: i32 = s.parse().ok()?;
    match s.len() {
        4 => Some(n),
        2 if n < 70 => Some(2000 + n),
        2 => Some(1900 + n),
        _ => None,
    }
}

/// French or English month name (accents already stripped), full or abbreviated.
fn month_from_name(name: &str) -> Option<u32> {
    let month = match name {
        "janvier" | "january" | "jan" | "janv" => 1,
        "fevrier" | "february" | "feb" | "fev" | "fevr" => 2,
        "mars" | "march" | "mar" => 3,
        "avril" | "april" | "apr" | "avr" => 4,
        "mai" | "may" => 5,
        "juin" | "june" | "jun" => 6,
        "juillet" | "july" | "jul" | "juil" => 7,
        "aout" | "august" | "aug" => 8,
        "septembre" | "september" | "sep" | "sept" => 9,
        "octobre" | "october" | "oct" => 10,
        "novembre" | "november" | "nov" => 11,
        "decembre" | "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
