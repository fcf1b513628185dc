//! Menucal: School Menu Calendar Generator
//!
//! Converts school-menu payloads saved by a fetch step (vendor JSON in
//! several shapes, plus free text extracted from PDFs) into a single
//! subscribable iCalendar feed with one all-day event per school day.

pub mod config;
pub mod date;
pub mod error;
pub mod event;
pub mod extract;
pub mod ics;
pub mod merge;
pub mod pipeline;
pub mod sources;

pub use config::{CalendarConfig, Config, InputConfig, OutputConfig};
pub use error::{ConfigError, EmitError, MenucalError, PayloadError, Result};
pub use event::{CanonicalEvent, EventAssembler, DEFAULT_TITLE, UID_NAMESPACE};
pub use extract::{
    detect_shape, extract_payload, payload_month, ExtractContext, Extraction, MenuItem,
    RawDayEntry, RawPayload, ShapeTag, SkipReason, SkippedEntry,
};
pub use ics::{CalendarMeta, ParsedEvent};
pub use merge::{DateWindow, EventSet, ResolvedWindow};
pub use pipeline::{Pipeline, RunReport};
pub use sources::SourceFile;
