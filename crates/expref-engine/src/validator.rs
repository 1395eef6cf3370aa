//! Link validation over a set of files
//!
//! Reads each file, extracts its references and resolves every one against a
//! shared schema corpus. A file that cannot be read is skipped with a warning;
//! a reference that does not resolve is recorded and the run moves on.

use expref_core::{Diagnostic, DiagnosticCode, Location, UnresolvedLink, ValidationReport};
use expref_corpus::SchemaCorpus;
use expref_links::{LinkExtractor, PathResolver, ResolutionResult};
use std::path::Path;
use tracing::{debug, info, warn};

/// Validator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Worker threads for scanning files (1 = sequential)
    pub jobs: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

/// Result of validating one file, merged into the report in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileOutcome {
    /// Set when the file could not be read
    pub skipped: Option<Diagnostic>,

    /// Number of references that resolved
    pub resolved: usize,

    /// References that did not resolve, in discovery order
    pub unresolved: Vec<UnresolvedLink>,
}

impl FileOutcome {
    /// Append this outcome to the report
    pub fn apply_to(self, report: &mut ValidationReport) {
        match self.skipped {
            Some(warning) => report.record_skipped_file(warning),
            None => report.record_file(),
        }
        for _ in 0..self.resolved {
            report.record_resolved();
        }
        for link in self.unresolved {
            report.record_unresolved(link);
        }
    }
}

/// Validates `<<express:...>>` references against a schema corpus
#[derive(Debug, Clone)]
pub struct LinkValidator<'c> {
    resolver: PathResolver<'c>,
    extractor: LinkExtractor,
    options: ValidatorOptions,
}

impl<'c> LinkValidator<'c> {
    /// Create a sequential validator over a fully built corpus
    pub fn new(corpus: &'c SchemaCorpus) -> Self {
        Self {
            resolver: PathResolver::new(corpus),
            extractor: LinkExtractor::new(),
            options: ValidatorOptions::default(),
        }
    }

    /// Set validator options
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate every file and build the report
    ///
    /// Entries are ordered by position in `files`, then by discovery order
    /// within a file, whether or not files are scanned in parallel.
    pub fn validate_files<P>(&self, files: &[P]) -> ValidationReport
    where
        P: AsRef<Path> + Sync,
    {
        info!(files = files.len(), jobs = self.options.jobs, "Validating express links");

        let outcomes = if self.options.jobs > 1 && files.len() > 1 {
            self.scan_parallel(files)
        } else {
            files.iter().map(|f| self.validate_file(f.as_ref())).collect()
        };

        let mut report = ValidationReport::new();
        for outcome in outcomes {
            outcome.apply_to(&mut report);
        }

        info!(
            links = report.summary.total_links_checked,
            unresolved = report.summary.unresolved,
            skipped = report.summary.files_skipped,
            "Validation finished"
        );
        report
    }

    /// Scan contiguous chunks of `files` on scoped worker threads
    fn scan_parallel<P>(&self, files: &[P]) -> Vec<FileOutcome>
    where
        P: AsRef<Path> + Sync,
    {
        let chunk_size = files.len().div_ceil(self.options.jobs);

        std::thread::scope(|scope| {
            let workers: Vec<_> = files
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|f| self.validate_file(f.as_ref()))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            // Joining in spawn order keeps file order
            workers
                .into_iter()
                .flat_map(|worker| match worker.join() {
                    Ok(outcomes) => outcomes,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    /// Read and validate one file
    pub fn validate_file(&self, path: &Path) -> FileOutcome {
        let file = path.display().to_string();

        match std::fs::read_to_string(path) {
            Ok(text) => self.validate_text(&file, &text),
            Err(e) => {
                warn!(file = %file, error = %e, "Could not read file, skipping");
                FileOutcome {
                    skipped: Some(
                        Diagnostic::new(
                            DiagnosticCode::FileUnreadable,
                            DiagnosticCode::FileUnreadable.default_severity(),
                            format!("Could not read file {}: {}", file, e),
                        )
                        .with_location(Location::new(file.clone())),
                    ),
                    ..FileOutcome::default()
                }
            }
        }
    }

    /// Validate the references in already-read text
    pub fn validate_text(&self, file: &str, text: &str) -> FileOutcome {
        let references = self.extractor.extract(text, file);
        debug!(file, links = references.len(), "Extracted express links");

        let mut outcome = FileOutcome::default();
        for reference in references {
            match self.resolver.resolve(&reference.raw_path) {
                ResolutionResult::Resolved => outcome.resolved += 1,
                ResolutionResult::Unresolved { failing_segment_index, reason } => {
                    debug!(
                        file,
                        line = reference.line_number,
                        path = %reference.raw_path,
                        segment = failing_segment_index,
                        "Unresolved express link"
                    );
                    outcome.unresolved.push(UnresolvedLink {
                        file: reference.source_file,
                        line: reference.line_number,
                        raw_path: reference.raw_path,
                        code: reason.code(),
                        reason: reason.to_string(),
                    });
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expref_core::{Attribute, Entity, Schema};
    use pretty_assertions::assert_eq;

    fn corpus() -> SchemaCorpus {
        SchemaCorpus::from_schemas(vec![Schema::new("action_schema")
            .with_entity(Entity::new("action").with_attribute(Attribute::new("name")))])
        .unwrap()
    }

    #[test]
    fn scenario_resolved_link() {
        let corpus = corpus();
        let outcome = LinkValidator::new(&corpus)
            .validate_text("doc.adoc", "See <<express:action_schema.action.name>>.");

        assert_eq!(outcome.resolved, 1);
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn scenario_missing_element() {
        let corpus = corpus();
        let outcome = LinkValidator::new(&corpus)
            .validate_text("doc.adoc", "\n<<express:action_schema.bogus>>");

        assert_eq!(outcome.resolved, 0);
        assert_eq!(
            outcome.unresolved,
            vec![UnresolvedLink {
                file: "doc.adoc".to_string(),
                line: 2,
                raw_path: "action_schema.bogus".to_string(),
                code: DiagnosticCode::LinkElementNotFound,
                reason: "Element 'bogus' not found in schema 'action_schema'".to_string(),
            }]
        );
    }

    #[test]
    fn scenario_missing_schema() {
        let corpus = corpus();
        let outcome = LinkValidator::new(&corpus)
            .validate_text("doc.adoc", "<<express:missing_schema.x>>");

        assert_eq!(outcome.unresolved[0].reason, "Schema 'missing_schema' not found");
    }

    #[test]
    fn duplicates_within_a_file_count_once() {
        let corpus = corpus();
        let text = "<<express:action_schema.nope>>\n<<express:action_schema.nope,again>>\n";
        let outcome = LinkValidator::new(&corpus).validate_text("doc.adoc", text);

        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].line, 1);
    }

    #[test]
    fn outcome_applies_counters() {
        let corpus = corpus();
        let outcome = LinkValidator::new(&corpus).validate_text(
            "doc.adoc",
            "<<express:action_schema.action>> <<express:action_schema.x>>",
        );

        let mut report = ValidationReport::new();
        outcome.apply_to(&mut report);
        assert_eq!(report.summary.total_files, 1);
        assert_eq!(report.summary.total_links_checked, 2);
        assert_eq!(report.summary.unresolved, 1);
    }

    #[test]
    fn unreadable_file_is_skipped() {
        let corpus = corpus();
        let outcome = LinkValidator::new(&corpus)
            .validate_file(Path::new("/definitely/not/here.adoc"));

        let warning = outcome.skipped.unwrap();
        assert_eq!(warning.code, DiagnosticCode::FileUnreadable);
        assert_eq!(outcome.resolved, 0);
    }
}
