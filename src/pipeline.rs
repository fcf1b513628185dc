//! Pipeline orchestration: payloads in, event set out.
//!
//! One run processes every source file in ascending filename order,
//! sequentially. Monthly payloads whose declared month falls outside the
//! target window are skipped before extraction. Everything that survives
//! extraction and assembly merges into a single [`EventSet`] where the
//! latest payload wins each date, and the set is clipped to the window at
//! the end. The run is pure over its inputs: same files, same current
//! date, same events.

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PayloadError, Result};
use crate::event::EventAssembler;
use crate::extract::{self, ExtractContext, SkipReason};
use crate::merge::{DateWindow, EventSet, ResolvedWindow};
use crate::sources::{self, SourceFile};

// ============================================================================
// Run Report
// ============================================================================

/// Tally of what one pipeline run did, for logging and inspection.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Payloads that were extracted (recognized shape).
    pub payloads_processed: usize,
    /// Monthly payloads skipped because their month is outside the window.
    pub payloads_out_of_window: usize,
    /// Filenames of payloads matching no known shape.
    pub unrecognized: Vec<String>,
    /// Payloads that failed extraction for a structural reason other than
    /// shape, with the error text.
    pub payloads_failed: Vec<(String, String)>,
    /// Entries dropped because a date-like value would not resolve.
    pub dates_unparseable: usize,
    /// Day records dropped for carrying no day number.
    pub missing_day_number: usize,
    /// Days that resolved to a date but had no items.
    pub empty_days: usize,
    /// Events in the final set.
    pub events: usize,
    /// First and last event dates, when any events exist.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl RunReport {
    fn tally(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::DateUnparseable(_) => self.dates_unparseable += 1,
            SkipReason::MissingDayNumber => self.missing_day_number += 1,
            SkipReason::EmptyDayEntry => self.empty_days += 1,
        }
    }

    /// Total entries dropped across all payloads.
    pub fn skipped_entries(&self) -> usize {
        self.dates_unparseable + self.missing_day_number + self.empty_days
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// The conversion pipeline. Cheap to construct, one per run.
#[derive(Debug, Clone)]
pub struct Pipeline {
    window: DateWindow,
    assembler: EventAssembler,
    /// The run's notion of "today"; injected so runs are reproducible.
    today: NaiveDate,
}

impl Pipeline {
    pub fn new(window: DateWindow, assembler: EventAssembler, today: NaiveDate) -> Self {
        Self {
            window,
            assembler,
            today,
        }
    }

    /// Process every payload file in `input_dir`.
    ///
    /// A run that produces no events *and* saw at least one unrecognized
    /// payload fails: silence there would hide a vendor format change
    /// behind an empty calendar.
    pub fn run(&self, input_dir: &Path) -> Result<(EventSet, RunReport)> {
        let mut loaded = Vec::new();
        for path in sources::discover(input_dir)? {
            loaded.push(sources::load(&path)?);
        }
        self.run_sources(&loaded)
    }

    /// Process payloads already loaded, in the order given.
    pub fn run_sources(&self, payloads: &[SourceFile]) -> Result<(EventSet, RunReport)> {
        let window = self.window.resolve(self.today);
        let mut set = EventSet::new();
        let mut report = RunReport::default();

        for source in payloads {
            self.ingest(source, &window, &mut set, &mut report);
        }

        set.retain_window(&window);
        report.events = set.len();
        report.date_range = set.date_range();

        if set.is_empty() && !report.unrecognized.is_empty() {
            return Err(PayloadError::UnrecognizedShape(format!(
                "no events produced; unrecognized payloads: {}",
                report.unrecognized.join(", ")
            ))
            .into());
        }

        info!(
            events = report.events,
            payloads = report.payloads_processed,
            skipped_entries = report.skipped_entries(),
            "Pipeline run complete"
        );
        Ok((set, report))
    }

    fn ingest(
        &self,
        source: &SourceFile,
        window: &ResolvedWindow,
        set: &mut EventSet,
        report: &mut RunReport,
    ) {
        let declared_month = extract::payload_month(&source.payload);
        if let Some((year, month)) = declared_month {
            if !window.contains_month(year, month) {
                debug!(file = %source.name, year, month, "Payload month outside window, skipping");
                report.payloads_out_of_window += 1;
                return;
            }
        }

        // Dates without an explicit year resolve against the payload's
        // declared year when it has one, else the run's current year.
        let ctx = ExtractContext {
            default_year: declared_month.map(|(y, _)| y).unwrap_or(self.today.year()),
        };

        let (shape, extraction) = match extract::extract_payload(&source.payload, ctx) {
            Ok(result) => result,
            Err(PayloadError::UnrecognizedShape(detail)) => {
                warn!(file = %source.name, %detail, "Unrecognized payload shape");
                report.unrecognized.push(source.name.clone());
                return;
            }
            Err(err) => {
                warn!(file = %source.name, error = %err, "Payload extraction failed");
                report.payloads_failed.push((source.name.clone(), err.to_string()));
                return;
            }
        };

        report.payloads_processed += 1;
        for skipped in &extraction.skipped {
            debug!(file = %source.name, reason = %skipped.reason, context = %skipped.context,
                   "Entry skipped");
            report.tally(&skipped.reason);
        }

        let mut inserted = 0usize;
        let mut replaced = 0usize;
        for entry in &extraction.entries {
            match self.assembler.assemble(entry) {
                Ok(event) => {
                    if set.insert(event) {
                        replaced += 1;
                    }
                    inserted += 1;
                }
                Err(reason) => report.tally(&reason),
            }
        }
        info!(
            file = %source.name,
            shape = ?shape,
            events = inserted,
            replaced,
            "Payload extracted"
        );
    }
}
