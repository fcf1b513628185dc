//! Canonical event assembly.
//!
//! Every extractor output converges here: a [`RawDayEntry`] becomes a
//! [`CanonicalEvent`] with a stable uid derived from the date alone, a
//! title (the first entrée when one exists), and description lines with
//! the entrée category leading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extract::{MenuItem, RawDayEntry, SkipReason};

/// Title used when no entrée can be named.
pub const DEFAULT_TITLE: &str = "School Lunch";

/// Fixed namespace for event uids. Part of the output contract: uids are
/// `<YYYYMMDD>-lunch@<namespace>` and must not vary between runs.
pub const UID_NAMESPACE: &str = "menucal";

/// Category literal the vendor uses for main dishes.
const ENTREE_CATEGORY: &str = "Entrees";

/// Header line rendered above the entrée items.
const ENTREE_HEADER: &str = "Main Dish:";

/// Label for items whose category is empty or missing.
const FALLBACK_CATEGORY: &str = "Sides";

const BULLET: &str = "  • ";

/// The normalized output unit: one all-day lunch event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    /// Calendar date, no time component.
    pub date: NaiveDate,
    /// Short display string.
    pub title: String,
    /// Ordered description lines; joined with newlines at emission.
    pub description_lines: Vec<String>,
    /// Deterministic identifier derived from the date alone.
    pub uid: String,
}

impl CanonicalEvent {
    /// The uid any event on `date` must carry.
    pub fn uid_for(date: NaiveDate) -> String {
        format!("{}-lunch@{}", date.format("%Y%m%d"), UID_NAMESPACE)
    }

    /// Newline-joined description.
    pub fn description(&self) -> String {
        self.description_lines.join("\n")
    }
}

/// Converts raw day entries into canonical events.
#[derive(Debug, Clone)]
pub struct EventAssembler {
    default_title: String,
}

impl Default for EventAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventAssembler {
    pub fn new() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
        }
    }

    /// Use a different fallback title (configurable display text).
    pub fn with_default_title(title: impl Into<String>) -> Self {
        Self {
            default_title: title.into(),
        }
    }

    /// Assemble one day entry into an event.
    ///
    /// A day that resolved to a date but has no items is not a calendar
    /// gap, it is absent: such entries yield `Err(SkipReason::EmptyDayEntry)`
    /// so callers can count them.
    pub fn assemble(&self, entry: &RawDayEntry) -> Result<CanonicalEvent, SkipReason> {
        if entry.items.is_empty() {
            return Err(SkipReason::EmptyDayEntry);
        }

        let title = entry
            .items
            .iter()
            .find(|item| item.category.as_deref() == Some(ENTREE_CATEGORY))
            .map(|item| format!("Lunch: {}", item.name))
            .unwrap_or_else(|| self.default_title.clone());

        Ok(CanonicalEvent {
            date: entry.date,
            title,
            description_lines: render_description(&entry.items),
            uid: CanonicalEvent::uid_for(entry.date),
        })
    }
}

/// Render description lines.
///
/// Shapes without a category concept produce bare item lines. Categorized
/// items render as a header per category with bulleted items beneath:
/// entrées first under the `Main Dish:` header, then remaining categories
/// alphabetically, with empty/missing category names folded into the
/// fallback label.
fn render_description(items: &[MenuItem]) -> Vec<String> {
    if items.iter().all(|item| item.category.is_none()) {
        return items.iter().map(|item| item.name.clone()).collect();
    }

    let mut entrees: Vec<&str> = Vec::new();
    // Category label -> items, insertion-ordered within a category.
    let mut by_category: Vec<(String, Vec<&str>)> = Vec::new();

    for item in items {
        let label = match item.category.as_deref() {
            Some(ENTREE_CATEGORY) => {
                entrees.push(&item.name);
                continue;
            }
            Some("") | None => FALLBACK_CATEGORY.to_string(),
            Some(other) => other.to_string(),
        };
        match by_category.iter_mut().find(|(name, _)| *name == label) {
            Some((_, bucket)) => bucket.push(&item.name),
            None => by_category.push((label, vec![&item.name])),
        }
    }
    by_category.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut lines = Vec::new();
    if !entrees.is_empty() {
        lines.push(ENTREE_HEADER.to_string());
        for name in entrees {
            lines.push(format!("{}{}", BULLET, name));
        }
    }
    for (label, names) in by_category {
        lines.push(format!("{}:", label));
        for name in names {
            lines.push(format!("{}{}", BULLET, name));
        }
    }
    lines
}
