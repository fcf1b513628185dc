//! iCalendar emission and round-trip parsing.
//!
//! Each canonical event becomes an all-day VEVENT: `DTSTART;VALUE=DATE` on
//! the event date, exclusive `DTEND` one day later, the deterministic uid,
//! and a DTSTAMP carrying the generation time. Document metadata (PRODID,
//! display name, description, timezone hint) comes from configuration.
//!
//! Emission is byte-stable for identical input apart from DTSTAMP, so the
//! serializer is written out property by property here: text escaping and
//! line folding per RFC 5545, CRLF line endings, fixed property order.
//! Parsing (used to verify round-trips) goes through the `ical` crate.

use std::fs;
use std::io::{BufReader, Write};
use std::path::Path;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::error::EmitError;
use crate::merge::EventSet;

/// Maximum content-line length in octets before folding.
const FOLD_AT: usize = 75;

/// Document-level calendar metadata. Values come from configuration, never
/// inferred from menu data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMeta {
    /// Display name (X-WR-CALNAME).
    pub name: String,
    /// Calendar description (X-WR-CALDESC).
    pub description: String,
    /// Product identifier (PRODID).
    pub product_id: String,
    /// Timezone hint (X-WR-TIMEZONE), optional.
    pub timezone: Option<String>,
}

// ============================================================================
// Emission
// ============================================================================

/// Serialize an event set into an iCalendar document.
///
/// `generated_at` becomes every event's DTSTAMP; injecting it keeps the
/// rest of the document reproducible byte for byte.
pub fn emit(events: &EventSet, meta: &CalendarMeta, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_property(&mut out, "PRODID", &meta.product_id);
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_property(&mut out, "X-WR-CALNAME", &meta.name);
    push_property(&mut out, "X-WR-CALDESC", &meta.description);
    if let Some(tz) = &meta.timezone {
        push_property(&mut out, "X-WR-TIMEZONE", tz);
    }

    let dtstamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();
    for event in events.iter() {
        push_line(&mut out, "BEGIN:VEVENT");
        push_property(&mut out, "SUMMARY", &event.title);
        push_property(&mut out, "DESCRIPTION", &event.description());
        push_property(
            &mut out,
            "DTSTART;VALUE=DATE",
            &event.date.format("%Y%m%d").to_string(),
        );
        let end = event
            .date
            .checked_add_days(Days::new(1))
            .unwrap_or(event.date);
        push_property(&mut out, "DTEND;VALUE=DATE", &end.format("%Y%m%d").to_string());
        push_property(&mut out, "UID", &event.uid);
        push_property(&mut out, "DTSTAMP", &dtstamp);
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

/// Write the document atomically: temp file in the target directory, then
/// rename over any existing file. Parent directories are created as needed;
/// a failed write never leaves a truncated calendar behind.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), EmitError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| EmitError::CreateDir {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let tmp_path = path.with_extension("ics.tmp");
    let write_err = |source| EmitError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = fs::File::create(&tmp_path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;
    drop(file);
    fs::rename(&tmp_path, path).map_err(write_err)?;
    Ok(())
}

fn push_property(out: &mut String, name: &str, value: &str) {
    push_line(out, &format!("{}:{}", name, escape_text(value)));
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(&fold_line(line));
    out.push_str("\r\n");
}

/// Escape TEXT values per RFC 5545 §3.3.11.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Fold a content line at 75 octets, continuing with CRLF + space.
/// Splits only on UTF-8 character boundaries, so a multibyte character
/// never straddles a fold.
fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_AT {
        return line.to_string();
    }
    let mut folded = String::with_capacity(line.len() + line.len() / FOLD_AT * 3);
    let mut budget = FOLD_AT;
    let mut current = 0usize;
    for (idx, ch) in line.char_indices() {
        if idx - current + ch.len_utf8() > budget {
            folded.push_str(&line[current..idx]);
            folded.push_str("\r\n ");
            current = idx;
            // Continuation lines start with a space, which counts.
            budget = FOLD_AT - 1;
        }
    }
    folded.push_str(&line[current..]);
    folded
}

// ============================================================================
// Round-trip parsing
// ============================================================================

/// An event read back out of a calendar document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub uid: String,
}

/// Parse a calendar document back into its (date, title, description, uid)
/// tuples. Used to verify that emission round-trips.
pub fn parse(content: &str) -> Result<Vec<ParsedEvent>, EmitError> {
    let reader = BufReader::new(content.as_bytes());
    let mut parsed = Vec::new();

    for calendar in ical::IcalParser::new(reader) {
        let calendar = calendar.map_err(|err| EmitError::Parse(err.to_string()))?;
        for event in calendar.events {
            let mut date = None;
            let mut title = String::new();
            let mut description = String::new();
            let mut uid = String::new();
            for property in &event.properties {
                let value = property.value.as_deref().unwrap_or("");
                match property.name.as_str() {
                    "DTSTART" => {
                        date = NaiveDate::parse_from_str(value, "%Y%m%d").ok();
                    }
                    "SUMMARY" => title = unescape_text(value),
                    "DESCRIPTION" => description = unescape_text(value),
                    "UID" => uid = value.to_string(),
                    _ => {}
                }
            }
            let date = date
                .ok_or_else(|| EmitError::Parse("event without a parseable DTSTART".to_string()))?;
            parsed.push(ParsedEvent {
                date,
                title,
                description,
                uid,
            });
        }
    }
    Ok(parsed)
}
