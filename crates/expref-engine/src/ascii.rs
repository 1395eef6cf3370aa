//! ASCII-only check for EXPRESS sources
//!
//! EXPRESS files in the collection must be plain ASCII. This reports every
//! non-ASCII character with its position and encoding so it can be replaced.

use expref_core::{Diagnostic, DiagnosticCode, Location};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One non-ASCII character occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonAsciiOccurrence {
    /// Line number (1-indexed)
    pub line: usize,

    /// Character column (1-indexed)
    pub column: usize,

    pub character: char,
}

/// Distinct non-ASCII character in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub character: char,

    /// Code point, e.g. `U+00E9`
    pub code_point: String,

    /// UTF-8 bytes, e.g. `0xc3 0xa9`
    pub utf8: String,

    /// EXPRESS encoded string literal to use instead, e.g. `"000000E9"`
    pub replacement: String,

    pub occurrence_count: usize,
}

/// Encode a character as an ISO 10303-11 encoded string literal
///
/// The literal is the four octets (group, plane, row, cell) of the code
/// point in upper-case hex, wrapped in double quotes.
pub fn iso_10303_11(character: char) -> String {
    format!("\"{:08X}\"", character as u32)
}

impl CharacterSummary {
    fn new(character: char) -> Self {
        let mut buf = [0u8; 4];
        let utf8 = character
            .encode_utf8(&mut buf)
            .bytes()
            .map(|b| format!("0x{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            character,
            code_point: format!("U+{:04X}", character as u32),
            utf8,
            replacement: iso_10303_11(character),
            occurrence_count: 0,
        }
    }
}

/// Non-ASCII findings for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileViolations {
    pub file: String,

    /// Occurrences in reading order
    pub occurrences: Vec<NonAsciiOccurrence>,

    /// Distinct characters, in order of first appearance
    pub characters: Vec<CharacterSummary>,
}

impl FileViolations {
    pub fn violation_count(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_clean(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// One diagnostic per occurrence
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.occurrences
            .iter()
            .map(|occ| {
                let summary = CharacterSummary::new(occ.character);
                Diagnostic::new(
                    DiagnosticCode::AsciiNonAsciiCharacter,
                    DiagnosticCode::AsciiNonAsciiCharacter.default_severity(),
                    format!(
                        "Non-ASCII character '{}' ({}, {}), use {}",
                        occ.character, summary.code_point, summary.utf8, summary.replacement
                    ),
                )
                .with_location(Location::with_position(self.file.clone(), occ.line, occ.column))
            })
            .collect()
    }
}

/// Checks text for non-ASCII characters
pub struct AsciiValidator;

impl AsciiValidator {
    /// Check already-read text
    pub fn check_text(file: &str, text: &str) -> FileViolations {
        let mut occurrences = Vec::new();
        let mut characters: Vec<CharacterSummary> = Vec::new();

        for (line_idx, line) in text.lines().enumerate() {
            for (col_idx, character) in line.chars().enumerate() {
                if character.is_ascii() {
                    continue;
                }

                occurrences.push(NonAsciiOccurrence {
                    line: line_idx + 1,
                    column: col_idx + 1,
                    character,
                });

                match characters.iter_mut().find(|c| c.character == character) {
                    Some(summary) => summary.occurrence_count += 1,
                    None => {
                        let mut summary = CharacterSummary::new(character);
                        summary.occurrence_count = 1;
                        characters.push(summary);
                    }
                }
            }
        }

        FileViolations {
            file: file.to_string(),
            occurrences,
            characters,
        }
    }

    /// Read and check a file
    pub fn check_file(path: &Path) -> Result<FileViolations, std::io::Error> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::check_text(&path.display().to_string(), &text))
    }
}

/// Findings across all checked files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsciiReport {
    pub files_scanned: usize,

    /// Only files that have violations
    pub files: Vec<FileViolations>,
}

impl AsciiReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result for one file
    pub fn add(&mut self, violations: FileViolations) {
        self.files_scanned += 1;
        if !violations.is_clean() {
            self.files.push(violations);
        }
    }

    pub fn files_with_violations(&self) -> usize {
        self.files.len()
    }

    pub fn total_violations(&self) -> usize {
        self.files.iter().map(FileViolations::violation_count).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.files.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
