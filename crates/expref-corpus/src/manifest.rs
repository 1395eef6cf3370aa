//! Schema manifest parsing
//!
//! Parses the collection's schema manifest (YAML) listing every schema id and
//! the EXPRESS file it lives in:
//!
//! ```yaml
//! schemas:
//!   action_schema:
//!     path: schemas/resources/action_schema/action_schema.exp
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One schema listed in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    /// Schema id (the manifest key)
    pub id: String,

    /// Path to the EXPRESS file, as written in the manifest
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    schemas: serde_yaml::Mapping,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default)]
    path: Option<String>,
}

/// Schema manifest, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaManifest {
    /// Location of the manifest file, if loaded from disk
    pub path: Option<PathBuf>,

    /// Listed schemas
    pub schemas: Vec<SchemaEntry>,
}

impl SchemaManifest {
    /// Load manifest from file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ManifestError::IoError(path.display().to_string(), e.to_string()))?;

        let mut manifest = Self::from_yaml(&contents)?;
        manifest.path = Some(path.to_path_buf());
        Ok(manifest)
    }

    /// Parse manifest from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_yaml::from_str(yaml)
            .map_err(|e| ManifestError::ParseError(e.to_string()))?;

        let mut schemas = Vec::with_capacity(raw.schemas.len());
        for (key, value) in raw.schemas {
            let id = match key {
                serde_yaml::Value::String(id) => id,
                other => {
                    return Err(ManifestError::ParseError(format!(
                        "schema id must be a string, got {:?}",
                        other
                    )))
                }
            };

            let entry: RawEntry = if value.is_null() {
                RawEntry::default()
            } else {
                serde_yaml::from_value(value)
                    .map_err(|e| ManifestError::ParseError(format!("schema '{}': {}", id, e)))?
            };

            let path = entry.path.ok_or_else(|| ManifestError::MissingPath(id.clone()))?;

            schemas.push(SchemaEntry {
                id,
                path: PathBuf::from(path),
            });
        }

        Ok(Self { path: None, schemas })
    }

    /// Directory relative schema paths are resolved against
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Ordered `(id, path)` pairs with paths resolved against [`Self::base_dir`]
    pub fn schema_paths(&self) -> Vec<(String, PathBuf)> {
        let base = self.base_dir();
        self.schemas
            .iter()
            .map(|entry| {
                let path = if entry.path.is_absolute() {
                    entry.path.clone()
                } else {
                    base.join(&entry.path)
                };
                (entry.id.clone(), path)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Manifest parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read schema manifest {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse schema manifest YAML: {0}")]
    ParseError(String),

    #[error("Schema '{0}' has no path in the manifest")]
    MissingPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
schemas:
  product_schema:
    path: resources/product_schema/product_schema.exp
  action_schema:
    path: resources/action_schema/action_schema.exp
    schemas-only: true
"#;

    #[test]
    fn preserves_file_order() {
        let manifest = SchemaManifest::from_yaml(MANIFEST).unwrap();
        let ids: Vec<&str> = manifest.schemas.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["product_schema", "action_schema"]);
    }

    #[test]
    fn resolves_paths_against_manifest_dir() {
        let mut manifest = SchemaManifest::from_yaml(MANIFEST).unwrap();
        manifest.path = Some(PathBuf::from("/srv/collection/schemas-srl.yml"));

        let paths = manifest.schema_paths();
        assert_eq!(
            paths[1],
            (
                "action_schema".to_string(),
                PathBuf::from("/srv/collection/resources/action_schema/action_schema.exp")
            )
        );
    }

    #[test]
    fn missing_path_is_an_error() {
        let result = SchemaManifest::from_yaml("schemas:\n  lonely_schema:\n");
        assert!(matches!(result, Err(ManifestError::MissingPath(id)) if id == "lonely_schema"));
    }

    #[test]
    fn empty_manifest() {
        let manifest = SchemaManifest::from_yaml("schemas: {}").unwrap();
        assert!(manifest.is_empty());
        assert!(manifest.schema_paths().is_empty());
    }

    #[test]
    fn extra_entry_keys_are_ignored() {
        let manifest = SchemaManifest::from_yaml(MANIFEST).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(
            manifest.schemas[1].path,
            PathBuf::from("resources/action_schema/action_schema.exp")
        );
    }
}
