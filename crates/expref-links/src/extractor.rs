//! Reference marker extraction
//!
//! Finds `<<express:PATH>>` and `<<express:PATH,RENDER>>` markers in
//! documentation and schema source text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Marker grammar: PATH excludes `,` and `>`, RENDER excludes `>`
pub const MARKER_PATTERN: &str = r"<<express:([^,>]+)(?:,([^>]+))?>>";

/// A reference found in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// Dotted path, without render text
    pub raw_path: String,

    /// Display text after the comma, if any (first occurrence)
    pub render_text: Option<String>,

    /// File the reference was found in
    pub source_file: String,

    /// First line containing the reference (1-indexed)
    pub line_number: usize,
}

impl LinkReference {
    /// Path segments, split on `.`
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.raw_path.split('.')
    }
}

/// Extracts reference markers from text
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    marker: Regex,
}

impl LinkExtractor {
    /// Create a new extractor
    pub fn new() -> Self {
        Self {
            marker: Regex::new(MARKER_PATTERN).expect("marker pattern is a valid regex"),
        }
    }

    /// Distinct raw paths in order of first appearance
    pub fn extract_paths(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.marker
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|path| seen.insert(*path))
            .map(str::to_string)
            .collect()
    }

    /// Distinct references with their source location
    ///
    /// A path used several times in one file yields a single reference,
    /// located at the first line that contains it.
    pub fn extract(&self, text: &str, source_file: &str) -> Vec<LinkReference> {
        let mut seen = HashSet::new();
        let mut references = Vec::new();

        for caps in self.marker.captures_iter(text) {
            let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !seen.insert(path.as_str()) {
                continue;
            }

            // Markers broken across lines never match a single line; fall
            // back to the line the marker starts on.
            let line_number = self
                .find_line(text, path.as_str())
                .unwrap_or_else(|| line_of_offset(text, whole.start()));

            references.push(LinkReference {
                raw_path: path.as_str().to_string(),
                render_text: caps.get(2).map(|m| m.as_str().to_string()),
                source_file: source_file.to_string(),
                line_number,
            });
        }

        references
    }

    /// First line (1-indexed) holding a marker for exactly `raw_path`
    pub fn find_line(&self, text: &str, raw_path: &str) -> Option<usize> {
        text.lines()
            .position(|line| {
                self.marker
                    .captures_iter(line)
                    .any(|caps| caps.get(1).map(|m| m.as_str()) == Some(raw_path))
            })
            .map(|idx| idx + 1)
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn line_of_offset(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "\
== Actions

See <<express:action_schema.action>> for details.
The <<express:action_schema.action.name,name>> attribute is a label.

Again: <<express:action_schema.action,the action entity>>.
<<express:action_schema>>
";

    #[test]
    fn extracts_distinct_paths_in_order() {
        let extractor = LinkExtractor::new();
        assert_eq!(
            extractor.extract_paths(DOC),
            vec![
                "action_schema.action".to_string(),
                "action_schema.action.name".to_string(),
                "action_schema".to_string(),
            ]
        );
    }

    #[test]
    fn render_text_is_not_part_of_path() {
        let extractor = LinkExtractor::new();
        let refs = extractor.extract(DOC, "doc.adoc");

        let name = &refs[1];
        assert_eq!(name.raw_path, "action_schema.action.name");
        assert_eq!(name.render_text.as_deref(), Some("name"));
        assert_eq!(name.line_number, 4);
        assert_eq!(name.source_file, "doc.adoc");
    }

    #[test]
    fn duplicate_takes_first_line() {
        let extractor = LinkExtractor::new();
        let refs = extractor.extract(DOC, "doc.adoc");

        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0].raw_path, "action_schema.action");
        assert_eq!(refs[0].line_number, 3);
        assert_eq!(refs[0].render_text, None);
        assert_eq!(refs[2].line_number, 7);
    }

    #[test]
    fn find_line_is_anchored_to_whole_path() {
        let extractor = LinkExtractor::new();
        let text = "<<express:a_schema.thing.attr>>\n<<express:a_schema.thing>>\n";

        // The prefix on line 1 must not count as a match
        assert_eq!(extractor.find_line(text, "a_schema.thing"), Some(2));
        assert_eq!(extractor.find_line(text, "a_schema.thing.attr"), Some(1));
        assert_eq!(extractor.find_line(text, "a_schema"), None);
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = LinkExtractor::new();
        assert_eq!(extractor.extract_paths(DOC), extractor.extract_paths(DOC));
        assert_eq!(extractor.extract(DOC, "x"), extractor.extract(DOC, "x"));
    }

    #[test]
    fn ignores_malformed_markers() {
        let extractor = LinkExtractor::new();
        let text = "<<express:>> <express:a.b>> <<express:,render>> <<xref:a.b>>";
        assert!(extractor.extract_paths(text).is_empty());
    }

    #[test]
    fn marker_split_across_lines_uses_start_line() {
        let extractor = LinkExtractor::new();
        let text = "intro\n<<express:a_schema.\nthing>>\n";
        let refs = extractor.extract(text, "x");

        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].raw_path, "a_schema.\nthing");
        assert_eq!(refs[0].line_number, 2);
    }

    #[test]
    fn several_markers_on_one_line() {
        let extractor = LinkExtractor::new();
        let text = "<<express:s.a>> and <<express:s.b,B>>";
        let refs = extractor.extract(text, "x");

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].raw_path, "s.b");
        assert_eq!(refs[1].line_number, 1);
        assert_eq!(refs[1].segments().collect::<Vec<_>>(), vec!["s", "b"]);
    }
}
