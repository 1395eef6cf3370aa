//! Validation report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::config::SeverityThreshold;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Location};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary counters for a validation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Files handed to the run (read or not)
    pub total_files: usize,

    /// Files that could not be read and contributed no links
    pub files_skipped: usize,

    /// Links resolved; duplicates within one file count once
    pub total_links_checked: usize,

    /// Links that failed to resolve
    pub unresolved: usize,
}

/// A reference that failed to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedLink {
    /// File the reference was found in
    pub file: String,

    /// First line containing the reference (1-indexed)
    pub line: usize,

    /// Reference path without render text
    pub raw_path: String,

    /// Stable code for the failure
    pub code: DiagnosticCode,

    /// Human-readable reason
    pub reason: String,
}

impl UnresolvedLink {
    /// Convert into a diagnostic, applying severity overrides
    pub fn to_diagnostic(&self, severity: &SeverityThreshold) -> Diagnostic {
        Diagnostic::new(
            self.code,
            severity.get_severity(self.code, self.code.default_severity()),
            self.reason.clone(),
        )
        .with_location(Location::with_line(self.file.clone(), self.line))
        .with_subject(self.raw_path.clone())
    }
}

impl std::fmt::Display for UnresolvedLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - <<express:{}>> - {}",
            self.file, self.line, self.raw_path, self.reason
        )
    }
}

/// Link validation report (report.json v1)
///
/// Append-only while a run is in progress; entries keep file-scan order,
/// then link-discovery order within a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Unresolved links in discovery order
    pub unresolved: Vec<UnresolvedLink>,

    /// File-level problems (unreadable files)
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            unresolved: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Count a file as scanned
    pub fn record_file(&mut self) {
        self.summary.total_files += 1;
    }

    /// Count a file that could not be read
    pub fn record_skipped_file(&mut self, warning: Diagnostic) {
        self.summary.total_files += 1;
        self.summary.files_skipped += 1;
        self.warnings.push(warning);
    }

    /// Count a link that resolved
    pub fn record_resolved(&mut self) {
        self.summary.total_links_checked += 1;
    }

    /// Count a link that failed to resolve
    pub fn record_unresolved(&mut self, link: UnresolvedLink) {
        self.summary.total_links_checked += 1;
        self.summary.unresolved += 1;
        self.unresolved.push(link);
    }

    /// Check whether every link resolved
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Plain-text rendering
    ///
    /// First line is the link count; then one success line or one line per
    /// unresolved link.
    pub fn to_text(&self) -> String {
        let mut lines = vec![format!(
            "Validation complete. Checked {} links.",
            self.summary.total_links_checked
        )];

        if self.unresolved.is_empty() {
            lines.push("All links resolved successfully!".to_string());
        } else {
            lines.extend(self.unresolved.iter().map(ToString::to_string));
        }

        lines.join("\n")
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
