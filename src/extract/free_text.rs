//! Extractor for free-form text, e.g. text pulled out of a menu PDF.
//!
//! A single pass over the lines with two states: "no current date" and
//! "current date with accumulated lines". A line containing a date flushes
//! the previous day, starts a new one, and keeps whatever follows the date
//! on the same line as the first menu line. Anything else extends the
//! current day, or is discarded if no date has been seen yet.
//!
//! Quirk, kept on purpose: a weekday mentioned without a month ("Friday we
//! celebrated...") is not a date, so such lines extend the current day
//! instead of starting a new one. The original data contains prose like
//! this and treating it as a boundary would shear menus apart.

use crate::date;
use crate::extract::{ExtractContext, Extraction, MenuItem, RawDayEntry};

pub fn extract(text: &str, ctx: ExtractContext) -> Extraction {
    let mut extraction = Extraction::default();
    let mut current: Option<RawDayEntry> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(found) = date::scan_line(line, ctx.default_year) {
            if let Some(entry) = current.take() {
                extraction.entries.push(entry);
            }
            let mut entry = RawDayEntry {
                date: found.date,
                items: Vec::new(),
            };
            let remainder = found.remainder(line);
            if !remainder.is_empty() {
                entry.items.push(MenuItem::plain(remainder));
            }
            current = Some(entry);
        } else if let Some(entry) = current.as_mut() {
            entry.items.push(MenuItem::plain(line));
        }
        // Lines before the first date are discarded.
    }

    if let Some(entry) = current.take() {
        extraction.entries.push(entry);
    }
    extraction
}
