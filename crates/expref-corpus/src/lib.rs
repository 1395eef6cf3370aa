//! Schema manifest loading and the schema corpus
//!
//! This crate handles:
//! - Parsing the schema manifest (schema id -> EXPRESS file)
//! - Loading parsed schemas through a pluggable [`SchemaLoader`]
//! - Building the immutable, case-insensitive [`SchemaCorpus`]

pub mod manifest;
pub mod corpus;

pub use manifest::{SchemaManifest, SchemaEntry, ManifestError};
pub use corpus::{SchemaCorpus, SchemaLoader, JsonSchemaLoader, CorpusError};
