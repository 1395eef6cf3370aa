//! Reference extraction and resolution
//!
//! This crate handles:
//! - Extracting `<<express:...>>` reference markers from text
//! - Resolving reference paths against the schema corpus
//! - Explaining failed resolutions with stable diagnostic codes

pub mod extractor;
pub mod resolver;

pub use extractor::{LinkExtractor, LinkReference, MARKER_PATTERN};
pub use resolver::{PathResolver, ResolutionResult, UnresolvedReason};
