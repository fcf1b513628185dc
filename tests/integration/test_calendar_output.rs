//! Calendar document tests: emission, determinism, and round-trips.

use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use menucal::merge::DateWindow;
use menucal::{ics, CalendarMeta, EventAssembler, EventSet, Pipeline};

fn write_payload(dir: &Path, name: &str, content: &str) {
    let mut file = File::create(dir.join(name)).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn meta() -> CalendarMeta {
    CalendarMeta {
        name: "School Lunch Menu".to_string(),
        description: "School lunch menu, regenerated from vendor data".to_string(),
        product_id: "-//menucal//School Lunch Menu//EN".to_string(),
        timezone: Some("America/New_York".to_string()),
    }
}

fn sample_events() -> EventSet {
    let dir = TempDir::new().unwrap();
    write_payload(
        dir.path(),
        "menu.json",
        r#"{"data": {"menu": {"year": 2025, "month": 1, "items": [
            {"day": 10, "product": {"name": "Cheese Pizza", "category": "Entrees"}},
            {"day": 10, "product": {"name": "Corn, buttered", "category": "Sides"}},
            {"day": 10, "product": {"name": "Milk", "category": ""}},
            {"day": 11, "product": {"name": "Walking Tacos", "category": "Entrees"}}
        ]}}}"#,
    );
    let pipeline = Pipeline::new(
        DateWindow::default(),
        EventAssembler::new(),
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
    );
    let (events, _) = pipeline.run(dir.path()).unwrap();
    events
}

#[test]
fn test_regeneration_is_byte_identical() {
    let stamp = Utc.with_ymd_and_hms(2025, 2, 1, 6, 30, 0).unwrap();
    let first = ics::emit(&sample_events(), &meta(), stamp);
    let second = ics::emit(&sample_events(), &meta(), stamp);
    assert_eq!(first, second);
}

#[test]
fn test_only_dtstamp_varies_between_generations() {
    let events = sample_events();
    let first = ics::emit(
        &events,
        &meta(),
        Utc.with_ymd_and_hms(2025, 2, 1, 6, 30, 0).unwrap(),
    );
    let second = ics::emit(
        &events,
        &meta(),
        Utc.with_ymd_and_hms(2025, 2, 2, 18, 0, 0).unwrap(),
    );

    let differing: Vec<(&str, &str)> = first
        .split("\r\n")
        .zip(second.split("\r\n"))
        .filter(|(a, b)| a != b)
        .collect();
    assert!(!differing.is_empty());
    for (a, b) in differing {
        assert!(a.starts_with("DTSTAMP:"), "unexpected difference: {a:?}");
        assert!(b.starts_with("DTSTAMP:"));
    }
}

#[test]
fn test_events_carry_stable_uids_and_exclusive_dtend() {
    let doc = ics::emit(
        &sample_events(),
        &meta(),
        Utc.with_ymd_and_hms(2025, 2, 1, 6, 30, 0).unwrap(),
    );
    assert!(doc.contains("UID:20250210-lunch@menucal\r\n"));
    assert!(doc.contains("UID:20250211-lunch@menucal\r\n"));
    assert!(doc.contains("DTSTART;VALUE=DATE:20250210\r\n"));
    assert!(doc.contains("DTEND;VALUE=DATE:20250211\r\n"));
}

#[test]
fn test_written_calendar_round_trips() {
    let out = TempDir::new().unwrap();
    let path = out.path().join("calendars").join("school-lunch.ics");

    let doc = ics::emit(
        &sample_events(),
        &meta(),
        Utc.with_ymd_and_hms(2025, 2, 1, 6, 30, 0).unwrap(),
    );
    ics::write_atomic(&path, &doc).unwrap();

    let parsed = ics::parse(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.len(), 2);

    let feb10 = &parsed[0];
    assert_eq!(feb10.date, NaiveDate::from_ymd_opt(2025, 2, 10).unwrap());
    assert_eq!(feb10.title, "Lunch: Cheese Pizza");
    assert_eq!(
        feb10.description,
        "Main Dish:\n  • Cheese Pizza\nSides:\n  • Corn, buttered\n  • Milk"
    );
    assert_eq!(feb10.uid, "20250210-lunch@menucal");

    let feb11 = &parsed[1];
    assert_eq!(feb11.title, "Lunch: Walking Tacos");
    assert_eq!(feb11.description, "Main Dish:\n  • Walking Tacos");
}

#[test]
fn test_rewrite_replaces_calendar_atomically() {
    let out = TempDir::new().unwrap();
    let path = out.path().join("school-lunch.ics");
    let stamp = Utc.with_ymd_and_hms(2025, 2, 1, 6, 30, 0).unwrap();

    ics::write_atomic(&path, &ics::emit(&sample_events(), &meta(), stamp)).unwrap();
    let first = fs::read_to_string(&path).unwrap();

    ics::write_atomic(&path, &ics::emit(&sample_events(), &meta(), stamp)).unwrap();
    let second = fs::read_to_string(&path).unwrap();

    assert_eq!(first, second);
    assert!(!path.with_extension("ics.tmp").exists());
}
