//! Extractor for the day-array shape.
//!
//! The vendor's monthly API payload carries a top-level `year`, a 0-indexed
//! `month`, and a `days` array. Each day record supplies a day number and
//! its items under one of several historical key names.

use serde_json::Value;

use crate::date;
use crate::error::PayloadError;
use crate::extract::{Extraction, MenuItem, RawDayEntry, SkipReason};

/// Keys tried, in order, for a day record's item list. The first key that
/// is present and non-empty wins.
const ITEM_KEYS: &[&str] = &["menu_items", "items", "recipes", "menuItems", "recipeItems"];

/// Fields tried, in order, for an item record's display name.
const NAME_FIELDS: &[&str] = &["name", "recipeName", "text", "label"];

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

    let days = value
        .get("days")
        .and_then(Value::as_array)
        .ok_or(PayloadError::MissingField("days"))?;

    let mut extraction = Extraction::default();
    for day in days {
        let Some(day_num) = day_number(day) else {
            extraction.skip(SkipReason::MissingDayNumber, day.to_string());
            continue;
        };
        match date::from_ymd(year, month, day_num) {
            Ok(resolved) => extraction.entries.push(RawDayEntry {
                date: resolved,
                items: day_items(day),
            }),
            Err(err) => extraction.skip(SkipReason::DateUnparseable(err), day.to_string()),
        }
    }
    Ok(extraction)
}

/// Day number under `day` or `dayNum`, as a number or numeric string.
fn day_number(day: &Value) -> Option<u32> {
    for key in ["day", "dayNum"] {
        match day.get(key) {
            Some(Value::Number(n)) => return n.as_u64().map(|n| n as u32),
            Some(Value::String(s)) => return s.trim().parse().ok(),
            _ => continue,
        }
    }
    None
}

fn day_items(day: &Value) -> Vec<MenuItem> {
    for key in ITEM_KEYS {
        if let Some(items) = day.get(*key).and_then(Value::as_array) {
            if items.is_empty() {
                continue;
            }
            return items.iter().map(item_name).map(MenuItem::plain).collect();
        }
    }
    Vec::new()
}

/// Display text for an item: a bare string, the first populated name field,
/// or a JSON rendering of the whole record as a last resort.
fn item_name(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            for field in NAME_FIELDS {
                if let Some(name) = obj.get(*field).and_then(Value::as_str) {
                    if !name.is_empty() {
                        return name.to_string();
                    }
                }
            }
            item.to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_extract_basic_month() {
        // month is 0-indexed: 0 = January.
        let payload = json!({
            "year": 2025,
            "month": 0,
            "days": [
                {"day": 15, "menu_items": ["Tacos", "Rice"]},
                {"day": 16, "menu_items": ["Pizza"]}
            ]
        });
        let extraction = extract(&payload).unwrap();
        assert_eq!(extraction.entries.len(), 2);
        assert_eq!(
            extraction.entries[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
        );
        assert_eq!(extraction.entries[0].items[0].name, "Tacos");
        assert!(extraction.entries[0].items[0].category.is_none());
    }

    #[test]
    fn test_item_key_preference_order() {
        let payload = json!({
            "year": 2025,
            "month": 2,
            "days": [{"day": 3, "recipes": [{"recipeName": "Chicken Sandwich"}]}]
        });
        let extraction = extract(&payload).unwrap();
        assert_eq!(extraction.entries[0].items[0].name, "Chicken Sandwich");
    }

    #[test]
    fn test_name_field_preference_order() {
        let payload = json!({
            "year": 2025,
            "month": 0,
            "days": [{"day": 7, "items": [{"label": "Milk", "text": "1% Milk"}]}]
        });
        let extraction = extract(&payload).unwrap();
        // "text" outranks "label" in the preference list.
        assert_eq!(extraction.entries[0].items[0].name, "1% Milk");
    }

    #[test]
    fn test_nameless_record_falls_back_to_json_rendering() {
        let payload = json!({
            "year": 2025,
            "month": 0,
            "days": [{"day": 8, "items": [{"calories": 250}]}]
        });
        let extraction = extract(&payload).unwrap();
        assert!(extraction.entries[0].items[0].name.contains("calories"));
    }

    #[test]
    fn test_day_num_alias_and_string_day() {
        let payload = json!({
            "year": 2025,
            "month": 0,
            "days": [{"dayNum": "9", "items": ["Soup"]}]
        });
        let extraction = extract(&payload).unwrap();
        assert_eq!(
            extraction.entries[0].date,
            NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()
        );
    }

    #[test]
    fn test_missing_day_number_is_skipped_not_fatal() {
        let payload = json!({
            "year": 2025,
            "month": 0,
            "days": [
                {"items": ["Mystery Meal"]},
                {"day": 10, "items": ["Burger"]}
            ]
        });
        let extraction = extract(&payload).unwrap();
        assert_eq!(extraction.entries.len(), 1);
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].reason, SkipReason::MissingDayNumber);
    }

    #[test]
    fn test_impossible_day_is_skipped() {
        // February 30 does not exist.
        let payload = json!({
            "year": 2025,
            "month": 1,
            "days": [{"day": 30, "items": ["Ghost Lunch"]}]
        });
        let extraction = extract(&payload).unwrap();
        assert!(extraction.entries.is_empty());
        assert!(matches!(
            extraction.skipped[0].reason,
            SkipReason::DateUnparseable(_)
        ));
    }

    #[test]
    fn test_invalid_month_is_payload_error() {
        let payload = json!({"year": 2025, "month": 12, "days": []});
        assert!(matches!(
            extract(&payload),
            Err(PayloadError::InvalidMonth(12))
        ));
    }

    #[test]
    fn test_missing_year_is_payload_error() {
        let payload = json!({"month": 0, "days": []});
        assert!(matches!(
            extract(&payload),
            Err(PayloadError::MissingField("year"))
        ));
    }

    #[test]
    fn test_day_with_no_items_still_yields_entry() {
        // The assembler is responsible for dropping empty days.
        let payload = json!({
            "year": 2025,
            "month": 0,
            "days": [{"day": 20}]
        });
        let extraction = extract(&payload).unwrap();
        assert_eq!(extraction.entries.len(), 1);
        assert!(extraction.entries[0].items.is_empty());
    }
}
