//! Configuration schema (expref.toml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use crate::diagnostic::{DiagnosticCode, Severity};

/// Severity threshold overrides for specific diagnostic codes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    /// Map of diagnostic code to severity override
    #[serde(default)]
    pub overrides: HashMap<String, Severity>,
}

impl SeverityThreshold {
    /// Get severity for a diagnostic code, or default
    pub fn get_severity(&self, code: DiagnosticCode, default: Severity) -> Severity {
        self.overrides
            .get(code.as_str())
            .copied()
            .unwrap_or(default)
    }

    /// Set severity override for a code
    pub fn set_override(&mut self, code: DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.as_str().to_string(), severity);
    }
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("documents")
}

fn default_document_extensions() -> Vec<String> {
    vec!["adoc".to_string()]
}

fn default_parsed_extension() -> String {
    "json".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("validation_results.txt")
}

fn default_jobs() -> usize {
    1
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for documents
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// File extensions treated as documents
    #[serde(default = "default_document_extensions")]
    pub document_extensions: Vec<String>,

    /// Extension of the parser's exported schema documents
    #[serde(default = "default_parsed_extension")]
    pub parsed_extension: String,

    /// Text report destination
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Worker threads for file scanning (1 = sequential)
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Severity thresholds
    #[serde(default)]
    pub severity: SeverityThreshold,

    /// Project root path (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            documents_dir: default_documents_dir(),
            document_extensions: default_document_extensions(),
            parsed_extension: default_parsed_extension(),
            output: default_output(),
            jobs: default_jobs(),
            severity: SeverityThreshold::default(),
            project_root: PathBuf::new(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config.jobs == 0 {
            return Err(ConfigError::InvalidValue("jobs must be at least 1".to_string()));
        }

        Ok(config)
    }

    /// Resolve a configured path against the project root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Check whether a file has one of the document extensions
    pub fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.document_extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.documents_dir, PathBuf::from("documents"));
        assert_eq!(config.parsed_extension, "json");
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config =
            Config::from_toml("jobs = 4\ndocument_extensions = [\"adoc\", \"exp\"]").unwrap();
        assert_eq!(config.jobs, 4);
        assert_eq!(config.output, PathBuf::from("validation_results.txt"));
        assert!(config.is_document(Path::new("a/b.EXP")));
        assert!(!config.is_document(Path::new("a/b.txt")));
    }

    #[test]
    fn zero_jobs_rejected() {
        assert!(matches!(
            Config::from_toml("jobs = 0"),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn severity_override_from_toml() {
        let config = Config::from_toml(
            "[severity]\noverrides = { LINK_NOT_NAVIGABLE = \"warn\" }"
        ).unwrap();

        assert_eq!(
            config.severity.get_severity(DiagnosticCode::LinkNotNavigable, Severity::Error),
            Severity::Warn
        );
        assert_eq!(
            config.severity.get_severity(DiagnosticCode::LinkSchemaNotFound, Severity::Error),
            Severity::Error
        );
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = Config::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(config.document_extensions, parsed.document_extensions);
        assert_eq!(config.jobs, parsed.jobs);
    }

    #[test]
    fn resolve_relative_paths() {
        let mut config = Config::default();
        config.project_root = PathBuf::from("/srv/collection");
        assert_eq!(
            config.resolve_path(Path::new("documents")),
            PathBuf::from("/srv/collection/documents")
        );
        assert_eq!(config.resolve_path(Path::new("/abs")), PathBuf::from("/abs"));
    }
}
