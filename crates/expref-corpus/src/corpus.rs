//! Schema corpus
//!
//! An immutable, case-insensitive namespace over every schema of a run.
//! Construction is all-or-nothing: resolution must never see a corpus with
//! holes in it, so any file that fails to load aborts the whole build.

use expref_core::{ident_key, Schema};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::manifest::SchemaManifest;

/// Loads parsed schemas for one EXPRESS file
///
/// Implemented by adapters over an EXPRESS parser.
pub trait SchemaLoader {
    /// Load every schema declared in the file at `path`
    fn load(&self, path: &Path) -> Result<Vec<Schema>, CorpusError>;
}

/// Parsed-schema document as exported by the EXPRESS parser
#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    schemas: Vec<Schema>,
}

/// Reads the parser's JSON export that sits next to each EXPRESS file
///
/// `schemas/action_schema.exp` is read from `schemas/action_schema.json`
/// unless the path already carries the parsed extension.
#[derive(Debug, Clone)]
pub struct JsonSchemaLoader {
    extension: String,
}

impl JsonSchemaLoader {
    pub fn new() -> Self {
        Self::with_extension("json")
    }

    /// Use a different extension for the parsed documents
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Path of the parsed document for an EXPRESS file
    pub fn document_path(&self, path: &Path) -> PathBuf {
        let already_parsed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false);

        if already_parsed {
            path.to_path_buf()
        } else {
            path.with_extension(&self.extension)
        }
    }

    /// Parse a document from a JSON string
    pub fn parse(json: &str) -> Result<Vec<Schema>, serde_json::Error> {
        serde_json::from_str::<SchemaDocument>(json).map(|doc| doc.schemas)
    }
}

impl Default for JsonSchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader for JsonSchemaLoader {
    fn load(&self, path: &Path) -> Result<Vec<Schema>, CorpusError> {
        let doc_path = self.document_path(path);
        let contents = std::fs::read_to_string(&doc_path).map_err(|e| CorpusError::IoError {
            path: doc_path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::parse(&contents).map_err(|e| CorpusError::ParseError {
            path: doc_path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Every schema of a run, keyed case-insensitively by id
#[derive(Debug, Clone, Default)]
pub struct SchemaCorpus {
    /// Schemas in load order
    schemas: Vec<Schema>,

    /// Lower-cased id -> index into `schemas`
    index: HashMap<String, usize>,
}

impl SchemaCorpus {
    /// Build a corpus from already-parsed schemas
    ///
    /// Fails if two schemas share an id (ignoring case).
    pub fn from_schemas(schemas: Vec<Schema>) -> Result<Self, CorpusError> {
        let mut index = HashMap::with_capacity(schemas.len());

        for (i, schema) in schemas.iter().enumerate() {
            if let Some(&first) = index.get(&ident_key(&schema.id)) {
                let first: &Schema = &schemas[first];
                return Err(CorpusError::DuplicateSchema {
                    first: first.id.clone(),
                    second: schema.id.clone(),
                });
            }
            index.insert(ident_key(&schema.id), i);
        }

        Ok(Self { schemas, index })
    }

    /// Load every file with `loader`, failing on the first error
    pub fn load<P: AsRef<Path>>(
        paths: &[P],
        loader: &dyn SchemaLoader,
    ) -> Result<Self, CorpusError> {
        info!(files = paths.len(), "Loading EXPRESS schemas");

        let mut schemas = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let loaded = loader.load(path)?;
            debug!(file = %path.display(), schemas = loaded.len(), "Loaded schema file");
            schemas.extend(loaded);
        }

        let corpus = Self::from_schemas(schemas)?;
        info!(schemas = corpus.len(), "Schema corpus ready");
        Ok(corpus)
    }

    /// Load every schema file listed in a manifest
    pub fn from_manifest(
        manifest: &SchemaManifest,
        loader: &dyn SchemaLoader,
    ) -> Result<Self, CorpusError> {
        let paths: Vec<PathBuf> = manifest
            .schema_paths()
            .into_iter()
            .map(|(_, path)| path)
            .collect();

        Self::load(&paths, loader)
    }

    /// Look up a schema by id (case-insensitive)
    pub fn lookup_schema(&self, id: &str) -> Option<&Schema> {
        self.index
            .get(&ident_key(id))
            .map(|&i| &self.schemas[i])
    }

    /// Schemas in load order
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Corpus construction errors (all fatal for a run)
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("Failed to read parsed schema {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse schema document {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Duplicate schema id '{second}' (already loaded as '{first}')")]
    DuplicateSchema { first: String, second: String },
}
