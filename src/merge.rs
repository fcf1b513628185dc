//! Event merging, deduplication, and window filtering.
//!
//! Events from multiple source payloads (typically one file per month, with
//! overlapping or corrected months) are combined into one ordered set with
//! at most one event per date. When two payloads disagree on a date, the
//! payload processed later wins: later-saved source files carry corrected
//! data, and the pipeline processes payloads in a fixed, deterministic
//! order precisely so this rule is reproducible.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::CanonicalEvent;

// ============================================================================
// Event Set
// ============================================================================

/// An ordered, date-deduplicated collection of canonical events.
///
/// Built fresh per pipeline run; never persisted between runs.
#[derive(Debug, Clone, Default)]
pub struct EventSet {
    events: BTreeMap<NaiveDate, CanonicalEvent>,
}

impl EventSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event, replacing any existing event on the same date
    /// (last-write-wins). Returns true when an event was replaced.
    pub fn insert(&mut self, event: CanonicalEvent) -> bool {
        self.events.insert(event.date, event).is_some()
    }

    /// Absorb another set; `other`'s events win on date collisions.
    pub fn merge(&mut self, other: EventSet) {
        for (date, event) in other.events {
            self.events.insert(date, event);
        }
    }

    /// Keep only events inside the resolved window.
    pub fn retain_window(&mut self, window: &ResolvedWindow) {
        self.events.retain(|date, _| window.contains(*date));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in ascending date order.
    pub fn iter(&self) -> impl Iterator<Item = &CanonicalEvent> {
        self.events.values()
    }

    /// First and last event dates, when any events exist.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.events.keys().next()?;
        let last = self.events.keys().next_back()?;
        Some((*first, *last))
    }
}

impl FromIterator<CanonicalEvent> for EventSet {
    fn from_iter<T: IntoIterator<Item = CanonicalEvent>>(iter: T) -> Self {
        let mut set = EventSet::new();
        for event in iter {
            set.insert(event);
        }
        set
    }
}

// ============================================================================
// Date Window
// ============================================================================

/// Which dates the output calendar should retain.
///
/// Either an explicit start/end range, or a relative "current month through
/// N months ahead" window resolved against the run's current date. Past
/// dates are excluded by default; `include_past` widens the window back to
/// its nominal start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateWindow {
    /// Explicit inclusive start date; overrides the relative window start.
    pub start: Option<NaiveDate>,
    /// Explicit inclusive end date; overrides the relative window end.
    pub end: Option<NaiveDate>,
    /// Months ahead of the current month to retain (relative form).
    pub months_ahead: u32,
    /// Keep dates earlier than the run's current date.
    pub include_past: bool,
}

impl Default for DateWindow {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            months_ahead: 2,
            include_past: false,
        }
    }
}

impl DateWindow {
    /// Resolve the window against the run's current date.
    pub fn resolve(&self, today: NaiveDate) -> ResolvedWindow {
        let month_start = first_of_month(today);
        let nominal_start = self.start.unwrap_or(month_start);
        let start = if self.include_past {
            nominal_start
        } else {
            nominal_start.max(today)
        };
        let end = self.end.unwrap_or_else(|| {
            // Last day of (current month + months_ahead).
            let next = add_months(month_start, self.months_ahead + 1);
            next.pred_opt().unwrap_or(next)
        });
        ResolvedWindow { start, end }
    }
}

/// A concrete inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ResolvedWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Whether any day of the given year/month (1-indexed) falls inside
    /// the window. Used to skip whole monthly payloads early.
    pub fn contains_month(&self, year: i32, month: u32) -> bool {
        let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return false;
        };
        let month_end = add_months(month_start, 1)
            .pred_opt()
            .unwrap_or(month_start);
        month_end >= first_of_month(self.start) && month_start <= self.end
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Add months to a date, clamping to the last valid day when needed.
fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, date.day())
        .or_else(|| {
            NaiveDate::from_ymd_opt(year, month, 1)
                .and_then(|d| d.checked_add_days(Days::new(27)))
        })
        .unwrap_or(date)
}
