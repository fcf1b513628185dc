//! Extractor for the date-map shape.
//!
//! A `dates` object maps date strings to either a list of item strings or a
//! single string. Keys that fail date resolution are skipped; one bad key
//! never poisons the rest of the map.

use serde_json::Value;

use crate::date;
use crate::extract::{ExtractContext, Extraction, MenuItem, RawDayEntry, SkipReason};

pub fn extract(value: &Value, ctx: ExtractContext) -> Extraction {
    let mut extraction = Extraction::default();
    let Some(dates) = value.get("dates").and_then(Value::as_object) else {
        return extraction;
    };

    // serde_json object iteration preserves insertion order; sort by the
    // resolved date later stages anyway, but keep extraction deterministic.
    for (key, day_value) in dates {
        match date::resolve_str(key, ctx.default_year) {
            Ok(resolved) => extraction.entries.push(RawDayEntry {
                date: resolved,
                items: day_items(day_value),
            }),
            Err(err) => extraction.skip(SkipReason::DateUnparseable(err), key.clone()),
        }
    }
    extraction
}

fn day_items(value: &Value) -> Vec<MenuItem> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(MenuItem::plain)
            .collect(),
        Value::String(s) if !s.is_empty() => vec![MenuItem::plain(s.clone())],
        _ => Vec::new(),
    }
}
