//! Extractor for the flat item-list shape.
//!
//! Each record carries its own date and menu text, with both fields checked
//! under several historical aliases. Records missing either are skipped.

use serde_json::Value;

use crate::date;
use crate::extract::{ExtractContext, Extraction, MenuItem, RawDayEntry, SkipReason};

/// Aliases tried, in order, for a record's date field.
const DATE_FIELDS: &[&str] = &["date", "servedOn", "menuDate"];

/// Aliases tried, in order, for a record's menu text.
const TEXT_FIELDS: &[&str] = &["menu", "text", "items", "description"];

pub fn extract(value: &Value, ctx: ExtractContext) -> Extraction {
    let mut extraction = Extraction::default();
    let Some(items) = value.get("items").and_then(Value::as_array) else {
        return extraction;
    };

    for record in items {
        let Some(date_str) = record_date(record) else {
            extraction.skip(SkipReason::MissingDayNumber, record.to_string());
            continue;
        };
        let resolved = match date::resolve_str(date_str, ctx.default_year) {
            Ok(resolved) => resolved,
            Err(err) => {
                extraction.skip(SkipReason::DateUnparseable(err), record.to_string());
                continue;
            }
        };
        extraction.entries.push(RawDayEntry {
            date: resolved,
            items: record_items(record),
        });
    }
    extraction
}

fn record_date(record: &Value) -> Option<&str> {
    DATE_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
}

fn record_items(record: &Value) -> Vec<MenuItem> {
    for field in TEXT_FIELDS {
        match record.get(*field) {
            Some(Value::String(s)) if !s.is_empty() => {
                // A single text blob may pack several items on one line.
                return s
                    .split('\n')
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(MenuItem::plain)
                    .collect();
            }
            Some(Value::Array(values)) if !values.is_empty() => {
                return values
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(MenuItem::plain)
                    .collect();
            }
            _ => continue,
        }
    }
    Vec::new()
}
