//! Payload shape detection and extraction.
//!
//! Vendor menu payloads arrive in several incompatible shapes. This module
//! classifies a raw payload into a [`ShapeTag`] and dispatches to the one
//! extractor for that shape. Extractors never guess: a payload matching no
//! known shape is reported as [`PayloadError::UnrecognizedShape`], and each
//! extractor turns its payload into a flat sequence of [`RawDayEntry`]
//! values regardless of the original nesting.
//!
//! Shape detection is the single place that inspects top-level keys; the
//! precedence is fixed:
//!
//! 1. `days`  → [`ShapeTag::DayArray`]
//! 2. `dates` → [`ShapeTag::DateMap`]
//! 3. `items` → [`ShapeTag::ItemList`] or [`ShapeTag::CategoryGroupedItems`]
//!    depending on whether item records carry a nested `product`/`category`
//! 4. `menu` (or a GraphQL `data.menu` envelope) → recurse into it
//! 5. plain text → [`ShapeTag::FreeText`]
//! 6. otherwise → [`ShapeTag::Unrecognized`]

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use crate::date::DateUnparseable;
use crate::error::PayloadError;

pub mod category_items;
pub mod date_map;
pub mod day_array;
pub mod free_text;
pub mod item_list;

// ============================================================================
// Payload and Entry Types
// ============================================================================

/// A raw payload as handed over by the fetch collaborators.
///
/// Owned transiently by one pipeline run; read, never mutated.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// Structured JSON data.
    Json(Value),
    /// Raw text extracted from a PDF or rendered page.
    Text(String),
}

/// Classification of a raw payload's structural shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeTag {
    /// Array of day records under a payload-level year/month.
    DayArray,
    /// Map keyed by date strings.
    DateMap,
    /// Flat list of records each carrying its own date.
    ItemList,
    /// GraphQL-style item/product records grouped by day and category.
    CategoryGroupedItems,
    /// Free-form text, parsed line by line.
    FreeText,
    /// None of the known shapes.
    Unrecognized,
}

/// One menu item: a display name plus an optional category.
///
/// `None` means the source shape has no category concept at all (items
/// render as bare lines); `Some("")` means the category field was present
/// but empty (rendered under the fallback label).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub category: Option<String>,
}

impl MenuItem {
    /// An item with no category concept.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
        }
    }

    /// An item with a (possibly empty) category.
    pub fn categorized(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: Some(category.into()),
        }
    }
}

/// One day's worth of extracted menu data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDayEntry {
    /// The resolved calendar date.
    pub date: NaiveDate,
    /// Items in source order.
    pub items: Vec<MenuItem>,
}

/// Why an individual entry was dropped. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The entry's date-like value could not be resolved.
    DateUnparseable(DateUnparseable),
    /// A day record carried no day number.
    MissingDayNumber,
    /// The entry resolved to a date but had no item text.
    EmptyDayEntry,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DateUnparseable(err) => write!(f, "{}", err),
            SkipReason::MissingDayNumber => write!(f, "day record has no day number"),
            SkipReason::EmptyDayEntry => write!(f, "day has no menu items"),
        }
    }
}

/// A dropped entry, kept observable for the run report.
#[derive(Debug, Clone)]
pub struct SkippedEntry {
    pub reason: SkipReason,
    /// Short description of the offending fragment.
    pub context: String,
}

/// The outcome of extracting one payload: surviving entries plus an
/// account of everything that was dropped.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entries: Vec<RawDayEntry>,
    pub skipped: Vec<SkippedEntry>,
}

impl Extraction {
    pub(crate) fn skip(&mut self, reason: SkipReason, context: impl Into<String>) {
        self.skipped.push(SkippedEntry {
            reason,
            context: context.into(),
        });
    }
}

/// Caller-supplied context for extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext {
    /// Year assumed for date patterns that omit one (free text, bare
    /// month+day strings).
    pub default_year: i32,
}

// ============================================================================
// Schema Resolver
// ============================================================================

/// Descend through known wrapper keys (`data`, `menu`) to the menu object.
///
/// Wrapper keys are only followed when the current object carries none of
/// the shape-defining keys itself; `days`/`dates`/`items` always take
/// precedence over a `menu` key that might just be a display name.
fn unwrap_envelope(value: &Value) -> &Value {
    if let Some(obj) = value.as_object() {
        let has_shape_key =
            obj.contains_key("days") || obj.contains_key("dates") || obj.contains_key("items");
        if !has_shape_key {
            if let Some(data) = obj.get("data") {
                if data.get("menu").is_some() {
                    return unwrap_envelope(data);
                }
            }
            if let Some(menu) = obj.get("menu").filter(|m| m.is_object()) {
                return unwrap_envelope(menu);
            }
        }
    }
    value
}

/// Classify a raw payload. This is the only place shape detection happens.
pub fn detect_shape(payload: &RawPayload) -> ShapeTag {
    match payload {
        RawPayload::Text(_) => ShapeTag::FreeText,
        RawPayload::Json(value) => {
            let value = unwrap_envelope(value);
            let Some(obj) = value.as_object() else {
                return ShapeTag::Unrecognized;
            };
            if obj.contains_key("days") {
                ShapeTag::DayArray
            } else if obj.contains_key("dates") {
                ShapeTag::DateMap
            } else if let Some(items) = obj.get("items").and_then(Value::as_array) {
                let has_product = items.iter().any(|item| {
                    item.get("product").is_some() || item.get("category").is_some()
                });
                if has_product {
                    ShapeTag::CategoryGroupedItems
                } else {
                    ShapeTag::ItemList
                }
            } else {
                ShapeTag::Unrecognized
            }
        }
    }
}

/// The payload's declared year and 1-indexed month, when present.
///
/// Monthly vendor payloads declare a year and a 0-indexed month at the top
/// level; the pipeline uses this to skip months outside the target window
/// before extraction.
pub fn payload_month(payload: &RawPayload) -> Option<(i32, u32)> {
    let RawPayload::Json(value) = payload else {
        return None;
    };
    let value = unwrap_envelope(value);
    let year = value.get("year")?.as_i64()? as i32;
    let month0 = value.get("month")?.as_i64()?;
    if (0..=11).contains(&month0) {
        Some((year, month0 as u32 + 1))
    } else {
        None
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Classify and extract one payload.
///
/// Returns the detected shape together with the extraction outcome, or a
/// [`PayloadError`] when the payload as a whole is unusable.
pub fn extract_payload(
    payload: &RawPayload,
    ctx: ExtractContext,
) -> Result<(ShapeTag, Extraction), PayloadError> {
    let shape = detect_shape(payload);
    let extraction = match (shape, payload) {
        (ShapeTag::FreeText, RawPayload::Text(text)) => free_text::extract(text, ctx),
        (ShapeTag::DayArray, RawPayload::Json(value)) => {
            day_array::extract(unwrap_envelope(value))?
        }
        (ShapeTag::DateMap, RawPayload::Json(value)) => {
            date_map::extract(unwrap_envelope(value), ctx)
        }
        (ShapeTag::ItemList, RawPayload::Json(value)) => {
            item_list::extract(unwrap_envelope(value), ctx)
        }
        (ShapeTag::CategoryGroupedItems, RawPayload::Json(value)) => {
            category_items::extract(unwrap_envelope(value))?
        }
        (ShapeTag::Unrecognized, RawPayload::Json(value)) => {
            let keys = describe_keys(unwrap_envelope(value));
            return Err(PayloadError::UnrecognizedShape(keys));
        }
        // detect_shape never pairs a tag with the wrong payload variant.
        _ => unreachable!("shape tag inconsistent with payload variant"),
    };
    Ok((shape, extraction))
}

fn describe_keys(value: &Value) -> String {
    match value.as_object() {
        Some(obj) if !obj.is_empty() => {
            let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
            keys.sort_unstable();
            format!("top-level keys [{}]", keys.join(", "))
        }
        Some(_) => "empty object".to_string(),
        None => "non-object JSON value".to_string(),
    }
}
