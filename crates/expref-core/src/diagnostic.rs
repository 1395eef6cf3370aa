//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the public API.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Link resolution
    /// First path segment does not name a schema in the corpus
    LinkSchemaNotFound,

    /// Second path segment does not name any element of the schema
    LinkElementNotFound,

    /// Segment does not name an attribute of the current entity
    LinkAttributeNotFound,

    /// Segment does not name a value of the current enumeration
    LinkEnumValueNotFound,

    /// A named base type could not be found in the schema
    LinkBaseTypeNotFound,

    /// Path continues past a type whose base type is a built-in keyword
    LinkBuiltinTypeLeaf,

    /// Path continues past an enumeration value
    LinkEnumValueLeaf,

    /// Path continues past an element that has no members
    LinkNotNavigable,

    /// Base type chain is longer than the schema allows (cycle)
    LinkRedirectionLimit,

    // File handling
    /// File could not be read and was skipped
    FileUnreadable,

    // Source hygiene
    /// Non-ASCII character found in an EXPRESS file
    AsciiNonAsciiCharacter,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkSchemaNotFound => "LINK_SCHEMA_NOT_FOUND",
            Self::LinkElementNotFound => "LINK_ELEMENT_NOT_FOUND",
            Self::LinkAttributeNotFound => "LINK_ATTRIBUTE_NOT_FOUND",
            Self::LinkEnumValueNotFound => "LINK_ENUM_VALUE_NOT_FOUND",
            Self::LinkBaseTypeNotFound => "LINK_BASE_TYPE_NOT_FOUND",
            Self::LinkBuiltinTypeLeaf => "LINK_BUILTIN_TYPE_LEAF",
            Self::LinkEnumValueLeaf => "LINK_ENUM_VALUE_LEAF",
            Self::LinkNotNavigable => "LINK_NOT_NAVIGABLE",
            Self::LinkRedirectionLimit => "LINK_REDIRECTION_LIMIT",
            Self::FileUnreadable => "FILE_UNREADABLE",
            Self::AsciiNonAsciiCharacter => "ASCII_NON_ASCII_CHARACTER",
        }
    }

    /// Default severity when no override is configured
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::FileUnreadable => Severity::Warn,
            _ => Severity::Error,
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - blocking issue that should fail CI
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source location in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path as supplied to the run
    pub file: String,

    /// Optional line number (1-indexed)
    pub line: Option<usize>,

    /// Optional column number (1-indexed)
    pub column: Option<usize>,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
        }
    }

    /// Create a location with file and line number
    pub fn with_line(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
            column: None,
        }
    }

    /// Create a location with file, line, and column
    pub fn with_position(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file)?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
            if let Some(column) = self.column {
                write!(f, ":{}", column)?;
            }
        }
        Ok(())
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// The offending reference or text, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            subject: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set the offending subject
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}
