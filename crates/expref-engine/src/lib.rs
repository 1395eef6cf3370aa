//! expref engine - validation runs
//!
//! This crate implements the run-level logic:
//! - Link validation over a file set (bulkheaded per file and per link)
//! - Report delivery to text, JSON and Markdown sinks
//! - ASCII-only checks for EXPRESS sources

pub mod validator;
pub mod sink;
pub mod ascii;

pub use validator::{FileOutcome, LinkValidator, ValidatorOptions};
pub use sink::{
    render_markdown, JsonFileSink, MarkdownFileSink, ReportError, ReportSink, TextFileSink,
};
pub use ascii::{
    iso_10303_11, AsciiReport, AsciiValidator, CharacterSummary, FileViolations,
    NonAsciiOccurrence,
};
