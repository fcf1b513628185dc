//! Extractor for the GraphQL-style category-grouped item shape.
//!
//! Records carry a day number, a `hidden` flag, and a nested `product` with
//! a name and category. Items are grouped by day; the category literally
//! named `Entrees` is what the assembler later promotes to the front of the
//! description and mines for the event title.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::date;
use crate::error::PayloadError;
use crate::extract::{Extraction, MenuItem, RawDayEntry, SkipReason};

pub fn extract(value: &Value) -> Result<Extraction, PayloadError> {
    let year = value
        .get("year")
        .and_then(Value::as_i64)
        .ok_or(PayloadError::MissingField("year"))? as i32;
    let month0 = value.get("month").and_then(Value::as_i64).unwrap_or(0);
    if !(0..=11).contains(&month0) {
        return Err(PayloadError::InvalidMonth(month0));
    }
    let month = month0 as u32 + 1;

    let items = value
        .get("items")
        .and_then(Value::as_array)
        .ok_or(PayloadError::MissingField("items"))?;

    let mut extraction = Extraction::default();

    // Group visible products by day number, preserving source order within
    // a day. BTreeMap keeps days ascending.
    let mut days: BTreeMap<u32, Vec<MenuItem>> = BTreeMap::new();
    for record in items {
        if record.get("hidden").and_then(Value::as_bool).unwrap_or(false) {
            continue;
        }
        let Some(day_num) = record.get("day").and_then(Value::as_u64) else {
            extraction.skip(SkipReason::MissingDayNumber, record.to_string());
            continue;
        };
        let Some(product) = record.get("product") else {
            continue;
        };
        let Some(name) = product.get("name").and_then(Value::as_str).filter(|n| !n.is_empty())
        else {
            continue;
        };
        let category = product
            .get("category")
            .and_then(Value::as_str)
            .unwrap_or("");
        days.entry(day_num as u32)
            .or_default()
            .push(MenuItem::categorized(name, category));
    }

    for (day_num, day_items) in days {
        match date::from_ymd(year, month, day_num) {
            Ok(resolved) => extraction.entries.push(RawDayEntry {
                date: resolved,
                items: day_items,
            }),
            Err(err) => {
                extraction.skip(SkipReason::DateUnparseable(err), format!("day {}", day_num))
            }
        }
    }
    Ok(extraction)
}
