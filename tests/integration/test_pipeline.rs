//! End-to-end pipeline tests over payload files on disk.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::TempDir;

use menucal::merge::DateWindow;
use menucal::{EventAssembler, Pipeline};

fn write_payload(dir: &Path, name: &str, content: &str) {
    let mut file = File::create(dir.join(name)).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

/// A pipeline run with a pinned current date of 2025-02-01.
fn pipeline() -> Pipeline {
    Pipeline::new(
        DateWindow::default(),
        EventAssembler::new(),
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One payload in each of the five supported shapes; every shape must
/// contribute events to the same calendar.
#[test]
fn test_all_payload_shapes_contribute_events() {
    let dir = TempDir::new().unwrap();
    // Vendor months are 0-indexed: month 1 is February.
    write_payload(
        dir.path(),
        "01_day_array.json",
        r#"{"year": 2025, "month": 1, "days": [
            {"day": 3, "menu_items": ["Pizza", "Corn"]}
        ]}"#,
    );
    write_payload(
        dir.path(),
        "02_date_map.json",
        r#"{"dates": {"2025-02-04": ["Tacos", "Rice"]}}"#,
    );
    write_payload(
        dir.path(),
        "03_item_list.json",
        r#"{"items": [{"date": "2025-02-05", "menu": "Chili\nCornbread"}]}"#,
    );
    write_payload(
        dir.path(),
        "04_graphql.json",
        r#"{"data": {"menu": {"year": 2025, "month": 1, "items": [
            {"day": 6, "product": {"name": "Cheeseburger", "category": "Entrees"}},
            {"day": 6, "product": {"name": "Fries", "category": "Sides"}}
        ]}}}"#,
    );
    write_payload(
        dir.path(),
        "05_extracted.txt",
        "February 7\nFish Sticks\nMac and Cheese\n",
    );

    let (events, report) = pipeline().run(dir.path()).unwrap();

    let dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();
    assert_eq!(
        dates,
        [
            date(2025, 2, 3),
            date(2025, 2, 4),
            date(2025, 2, 5),
            date(2025, 2, 6),
            date(2025, 2, 7),
        ]
    );
    assert_eq!(report.payloads_processed, 5);
    assert!(report.unrecognized.is_empty());

    // The categorized payload names its entrée in the title.
    let feb6 = events.iter().find(|e| e.date == date(2025, 2, 6)).unwrap();
    assert_eq!(feb6.title, "Lunch: Cheeseburger");
    assert_eq!(
        feb6.description(),
        "Main Dish:\n  • Cheeseburger\nSides:\n  • Fries"
    );

    // Uncategorized payloads fall back to the default title.
    let feb5 = events.iter().find(|e| e.date == date(2025, 2, 5)).unwrap();
    assert_eq!(feb5.title, "School Lunch");
    assert_eq!(feb5.description(), "Chili\nCornbread");
}

/// Two payloads covering the same date: the later filename wins the date,
/// and events unique to either payload survive.
#[test]
fn test_corrected_payload_overrides_earlier_one() {
    let dir = TempDir::new().unwrap();
    write_payload(
        dir.path(),
        "menu_2025-02-01.json",
        r#"{"year": 2025, "month": 1, "days": [
            {"day": 10, "menu_items": ["Meatloaf"]},
            {"day": 11, "menu_items": ["Spaghetti"]}
        ]}"#,
    );
    write_payload(
        dir.path(),
        "menu_2025-02-08.json",
        r#"{"year": 2025, "month": 1, "days": [
            {"day": 10, "menu_items": ["Pizza Party"]}
        ]}"#,
    );

    let (events, _) = pipeline().run(dir.path()).unwrap();
    assert_eq!(events.len(), 2);
    let feb10 = events.iter().find(|e| e.date == date(2025, 2, 10)).unwrap();
    assert_eq!(feb10.description(), "Pizza Party");
    let feb11 = events.iter().find(|e| e.date == date(2025, 2, 11)).unwrap();
    assert_eq!(feb11.description(), "Spaghetti");
}

/// Stale monthly payloads are skipped before extraction; dates outside the
/// window are clipped even when their payload is current.
#[test]
fn test_window_filtering() {
    let dir = TempDir::new().unwrap();
    // September 2024 (month 8, 0-indexed): far in the past.
    write_payload(
        dir.path(),
        "menu_2024-09.json",
        r#"{"year": 2024, "month": 8, "days": [
            {"day": 5, "menu_items": ["Ancient Meatloaf"]}
        ]}"#,
    );
    // Date-keyed payload reaching past the window's end (Feb + 2 months).
    write_payload(
        dir.path(),
        "menu_far_future.json",
        r#"{"dates": {"2025-02-12": ["Pizza"], "2025-09-01": ["Too Far Out"]}}"#,
    );

    let (events, report) = pipeline().run(dir.path()).unwrap();
    let dates: Vec<NaiveDate> = events.iter().map(|e| e.date).collect();
    assert_eq!(dates, [date(2025, 2, 12)]);
    assert_eq!(report.payloads_out_of_window, 1);
}

/// Unrecognized payloads are reported by name without sinking the run, as
/// long as something else produced events.
#[test]
fn test_unrecognized_payload_reported_by_name() {
    let dir = TempDir::new().unwrap();
    write_payload(dir.path(), "mystery.json", r#"{"schedule": [1, 2, 3]}"#);
    write_payload(
        dir.path(),
        "menu.json",
        r#"{"dates": {"2025-02-12": ["Pizza"]}}"#,
    );

    let (events, report) = pipeline().run(dir.path()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(report.unrecognized, ["mystery.json"]);
}

/// A run where nothing was recognized and nothing was produced must fail
/// loudly; that is how a vendor format change surfaces.
#[test]
fn test_only_unrecognized_payloads_fails_the_run() {
    let dir = TempDir::new().unwrap();
    write_payload(dir.path(), "mystery.json", r#"{"schedule": [1, 2, 3]}"#);

    let result = pipeline().run(dir.path());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("mystery.json"));
}

/// Per-entry problems are tallied, not fatal.
#[test]
fn test_skipped_entries_are_counted() {
    let dir = TempDir::new().unwrap();
    write_payload(
        dir.path(),
        "menu.json",
        r#"{"year": 2025, "month": 1, "days": [
            {"menu_items": ["No Day Number"]},
            {"day": 13, "menu_items": []},
            {"day": 14, "menu_items": ["Pizza"]}
        ]}"#,
    );
    write_payload(
        dir.path(),
        "bad_dates.json",
        r#"{"dates": {"not-a-date": ["Mystery Meal"], "2025-02-18": ["Tacos"]}}"#,
    );

    let (events, report) = pipeline().run(dir.path()).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(report.missing_day_number, 1);
    assert_eq!(report.empty_days, 1);
    assert_eq!(report.dates_unparseable, 1);
    assert_eq!(report.skipped_entries(), 3);
}

/// Free-text payloads resolve bare month/day dates against the run's year
/// and keep weekday-prefixed date lines as day boundaries.
#[test]
fn test_free_text_payload_end_to_end() {
    let dir = TempDir::new().unwrap();
    write_payload(
        dir.path(),
        "menu.txt",
        "Kramer Elementary February Menu\n\
         Monday, February 10\n\
         Cheese Pizza\n\
         Garden Salad\n\
         Tuesday, February 11 Walking Tacos\n\
         Friday we celebrate school spirit day\n",
    );

    let (events, _) = pipeline().run(dir.path()).unwrap();
    assert_eq!(events.len(), 2);
    let feb10 = events.iter().find(|e| e.date == date(2025, 2, 10)).unwrap();
    assert_eq!(feb10.description(), "Cheese Pizza\nGarden Salad");
    // The spirit-day prose line belongs to Feb 11, not a new day.
    let feb11 = events.iter().find(|e| e.date == date(2025, 2, 11)).unwrap();
    assert_eq!(
        feb11.description(),
        "Walking Tacos\nFriday we celebrate school spirit day"
    );
}

/// An empty input directory yields an empty, successful run.
#[test]
fn test_empty_directory_is_a_successful_empty_run() {
    let dir = TempDir::new().unwrap();
    let (events, report) = pipeline().run(dir.path()).unwrap();
    assert!(events.is_empty());
    assert_eq!(report.events, 0);
    assert_eq!(report.date_range, None);
}
