//! Report delivery
//!
//! A finished [`ValidationReport`] is handed to one or more sinks. The text
//! sink writes the line format consumed by CI scripts; JSON and Markdown are
//! for tooling and pull-request summaries.

use expref_core::{SeverityThreshold, Severity, ValidationReport};
use std::path::{Path, PathBuf};

/// Destination for a finished report
pub trait ReportSink {
    fn deliver(&self, report: &ValidationReport) -> Result<(), ReportError>;
}

/// Writes [`ValidationReport::to_text`] to a file
#[derive(Debug, Clone)]
pub struct TextFileSink {
    path: PathBuf,
}

impl TextFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for TextFileSink {
    fn deliver(&self, report: &ValidationReport) -> Result<(), ReportError> {
        write_file(&self.path, report.to_text())
    }
}

/// Writes the versioned JSON report
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonFileSink {
    fn deliver(&self, report: &ValidationReport) -> Result<(), ReportError> {
        let json = report
            .to_json()
            .map_err(|e| ReportError::SerializeError(e.to_string()))?;
        write_file(&self.path, json)
    }
}

/// Writes a Markdown summary
#[derive(Debug, Clone)]
pub struct MarkdownFileSink {
    path: PathBuf,
    severity: SeverityThreshold,
}

impl MarkdownFileSink {
    pub fn new(path: impl Into<PathBuf>, severity: SeverityThreshold) -> Self {
        Self {
            path: path.into(),
            severity,
        }
    }
}

impl ReportSink for MarkdownFileSink {
    fn deliver(&self, report: &ValidationReport) -> Result<(), ReportError> {
        write_file(&self.path, render_markdown(report, &self.severity))
    }
}

fn write_file(path: &Path, contents: String) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|e| ReportError::IoError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Render the report as Markdown
pub fn render_markdown(report: &ValidationReport, severity: &SeverityThreshold) -> String {
    let mut md = String::new();

    md.push_str("# Express Link Validation Report\n\n");
    md.push_str(&format!("**Version:** {}\n\n", report.version));
    md.push_str(&format!("**Timestamp:** {}\n\n", report.timestamp));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Files scanned: {}\n", report.summary.total_files));
    md.push_str(&format!("- Files skipped: {}\n", report.summary.files_skipped));
    md.push_str(&format!("- Links checked: {}\n", report.summary.total_links_checked));
    md.push_str(&format!("- Unresolved: {}\n", report.summary.unresolved));
    md.push('\n');

    if report.is_clean() {
        md.push_str("✅ **All links resolved successfully!**\n");
    } else {
        md.push_str("## Unresolved links\n\n");
        md.push_str("| Severity | Location | Link | Reason |\n");
        md.push_str("|---|---|---|---|\n");

        for link in &report.unresolved {
            let diag = link.to_diagnostic(severity);
            let marker = match diag.severity {
                Severity::Error => "❌",
                Severity::Warn => "⚠️",
                Severity::Info => "ℹ️",
            };
            md.push_str(&format!(
                "| {} {} | `{}:{}` | `{}` | {} |\n",
                marker,
                diag.severity,
                link.file,
                link.line,
                link.raw_path,
                link.reason.replace('|', "\\|"),
            ));
        }
        md.push('\n');
    }

    if !report.warnings.is_empty() {
        md.push_str("## Skipped files\n\n");
        for warning in &report.warnings {
            md.push_str(&format!("- {}\n", warning.message));
        }
    }

    md
}

/// Report delivery errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {message}")]
    IoError { path: String, message: String },

    #[error("Failed to serialize report: {0}")]
    SerializeError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use expref_core::{DiagnosticCode, UnresolvedLink};

    fn report_with_failure() -> ValidationReport {
        let mut report = ValidationReport::new();
        report.record_file();
        report.record_resolved();
        report.record_unresolved(UnresolvedLink {
            file: "documents/a.adoc".to_string(),
            line: 9,
            raw_path: "action_schema.bogus".to_string(),
            code: DiagnosticCode::LinkElementNotFound,
            reason: "Element 'bogus' not found in schema 'action_schema'".to_string(),
        });
        report
    }

    #[test]
    fn text_sink_writes_report_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = TextFileSink::new(dir.path().join("validation_results.txt"));
        sink.deliver(&report_with_failure()).unwrap();

        let written = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "Validation complete. Checked 2 links.");
        assert_eq!(
            lines[1],
            "documents/a.adoc:9 - <<express:action_schema.bogus>> - Element 'bogus' not found in schema 'action_schema'"
        );
    }

    #[test]
    fn json_sink_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        JsonFileSink::new(&path).deliver(&report_with_failure()).unwrap();

        let parsed: ValidationReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.summary.unresolved, 1);
        assert_eq!(parsed.unresolved[0].code, DiagnosticCode::LinkElementNotFound);
    }

    #[test]
    fn markdown_uses_severity_overrides() {
        let mut severity = SeverityThreshold::default();
        severity.set_override(DiagnosticCode::LinkElementNotFound, Severity::Warn);

        let md = render_markdown(&report_with_failure(), &severity);
        assert!(md.contains("- Links checked: 2"));
        assert!(md.contains("⚠️ warn"));
        assert!(md.contains("`documents/a.adoc:9`"));
    }

    #[test]
    fn markdown_clean_report() {
        let md = render_markdown(&ValidationReport::new(), &SeverityThreshold::default());
        assert!(md.contains("All links resolved successfully!"));
        assert!(!md.contains("## Unresolved links"));
    }

    #[test]
    fn write_failure_is_reported() {
        let sink = TextFileSink::new("/definitely/not/a/dir/out.txt");
        assert!(matches!(
            sink.deliver(&ValidationReport::new()),
            Err(ReportError::IoError { .. })
        ));
    }
}
