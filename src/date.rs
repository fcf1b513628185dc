//! Date resolution for menu payloads.
//!
//! Every extractor funnels its date-like values through this module:
//! - numeric year/month/day triples (month already normalized to 1-indexed),
//! - full date strings ("2025-01-15", "January 15, 2025", "1/15/25"),
//! - free-form lines that merely contain a date somewhere.
//!
//! Free-text recognition tries patterns in a fixed priority order and stops
//! at the first match:
//! 1. weekday + month + day ("Monday, January 15")
//! 2. month + day + year ("January 15, 2025")
//! 3. numeric `M/D/Y` or `M-D-Y`
//! 4. bare month + day (year supplied by the caller)
//!
//! A weekday on its own never matches; a line like "Friday we had pizza"
//! carries no recoverable month and is not a date.

use chrono::NaiveDate;
use std::ops::Range;
use thiserror::Error;

/// A date-like value that could not be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("could not resolve '{0}' to a calendar date")]
pub struct DateUnparseable(pub String);

/// A date found inside a line of text, with the span it occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// The resolved date.
    pub date: NaiveDate,
    /// Byte range of the matched date text within the line.
    pub span: Range<usize>,
}

impl LineMatch {
    /// The line with the matched date text removed and separators trimmed.
    pub fn remainder<'a>(&self, line: &'a str) -> &'a str {
        let after = &line[self.span.end..];
        after.trim_start_matches([',', ':', '-', '–', ' ', '\t'])
    }
}

const MONTH_NAMES: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

/// Alternation fragment matching any month name. Longer names come first in
/// `MONTH_NAMES` so the regex engine prefers "january" over "jan".
fn month_alternation() -> String {
    MONTH_NAMES
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join("|")
}

/// Resolve a month name (full or abbreviated) to its 1-indexed number.
fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, num)| *num)
}

/// Build a real calendar date from a 1-indexed month triple.
///
/// Extractors consuming the vendor's 0-indexed month convention must add one
/// before calling; this function only ever sees human-convention months.
pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, DateUnparseable> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateUnparseable(format!("{}-{}-{}", year, month, day)))
}

/// Resolve a standalone date string.
///
/// Accepts ISO "YYYY-MM-DD" first, then the same patterns as the free-text
/// scan (with `default_year` filling in when the string omits the year).
pub fn resolve_str(value: &str, default_year: i32) -> Result<NaiveDate, DateUnparseable> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    scan_line(trimmed, default_year)
        .map(|m| m.date)
        .ok_or_else(|| DateUnparseable(trimmed.to_string()))
}

/// Scan a line of free text for a date, first match wins.
///
/// Returns `None` when the line contains no recognizable date; callers
/// decide whether that means "skip" or "continuation of the current day".
pub fn scan_line(line: &str, default_year: i32) -> Option<LineMatch> {
    let months = month_alternation();

    // 1. Weekday, month day — "Monday, January 15"
    let weekday_pattern = regex::Regex::new(&format!(
        r"(?i)\b(?:mon|tues|wednes|thurs|fri|satur|sun)day,?\s+({})\.?\s+(\d{{1,2}})\b",
        months
    ))
    .expect("Invalid regex");
    if let Some(cap) = weekday_pattern.captures(line) {
        let month = month_from_name(&cap[1])?;
        if let Ok(day) = cap[2].parse::<u32>() {
            if let Some(date) = NaiveDate::from_ymd_opt(default_year, month, day) {
                let m = cap.get(0).expect("capture 0 always present");
                return Some(LineMatch {
                    date,
                    span: m.start()..m.end(),
                });
            }
        }
    }

    // 2. Month day, year — "January 15, 2025"
    let mdy_pattern = regex::Regex::new(&format!(
        r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b",
        months
    ))
    .expect("Invalid regex");
    if let Some(cap) = mdy_pattern.captures(line) {
        let month = month_from_name(&cap[1])?;
        if let (Ok(day), Ok(year)) = (cap[2].parse::<u32>(), cap[3].parse::<i32>()) {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let m = cap.get(0).expect("capture 0 always present");
                return Some(LineMatch {
                    date,
                    span: m.start()..m.end(),
                });
            }
        }
    }

    // 3. Numeric M/D/Y or M-D-Y — "1/15/2025", "1-15-25"
    let numeric_pattern =
        regex::Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})\b").expect("Invalid regex");
    if let Some(cap) = numeric_pattern.captures(line) {
        if let (Ok(month), Ok(day), Ok(year)) = (
            cap[1].parse::<u32>(),
            cap[2].parse::<u32>(),
            cap[3].parse::<i32>(),
        ) {
            let year = if year < 100 { 2000 + year } else { year };
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let m = cap.get(0).expect("capture 0 always present");
                return Some(LineMatch {
                    date,
                    span: m.start()..m.end(),
                });
            }
        }
    }

    // 4. Bare month day — "January 15" (year from caller context)
    let bare_pattern = regex::Regex::new(&format!(
        r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b",
        months
    ))
    .expect("Invalid regex");
    if let Some(cap) = bare_pattern.captures(line) {
        let month = month_from_name(&cap[1])?;
        if let Ok(day) = cap[2].parse::<u32>() {
            if let Some(date) = NaiveDate::from_ymd_opt(default_year, month, day) {
                let m = cap.get(0).expect("capture 0 always present");
                return Some(LineMatch {
                    date,
                    span: m.start()..m.end(),
                });
            }
        }
    }

    None
}
