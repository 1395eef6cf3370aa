//! Integration tests for extraction followed by resolution

use expref_core::{Attribute, Entity, Schema, TypeDecl};
use expref_corpus::SchemaCorpus;
use expref_links::{LinkExtractor, PathResolver, ResolutionResult};

fn corpus() -> SchemaCorpus {
    SchemaCorpus::from_schemas(vec![
        Schema::new("action_schema")
            .with_entity(Entity::new("action").with_attribute(Attribute::new("name").with_type("label")))
            .with_type(TypeDecl::new("label").with_base_type("STRING")),
        Schema::new("approval_schema")
            .with_type(TypeDecl::new("approval_level").with_enum_values(["low", "high"]))
            .with_type(TypeDecl::new("review_level").with_base_type("approval_level")),
    ])
    .unwrap()
}

#[test]
fn extract_then_resolve_document() {
    let text = r#"
[[action]]
== Action

An <<express:action_schema.action,action>> carries a
<<express:action_schema.action.name,name>>. Review levels such as
<<express:approval_schema.review_level.HIGH>> reuse
<<express:approval_schema.approval_level>>.

Broken: <<express:action_schema.action.description>> and
<<express:missing_schema.x>>.
"#;

    let corpus = corpus();
    let resolver = PathResolver::new(&corpus);
    let refs = LinkExtractor::new().extract(text, "sections/action.adoc");

    let outcomes: Vec<(usize, bool)> = refs
        .iter()
        .map(|r| (r.line_number, resolver.resolve(&r.raw_path).is_resolved()))
        .collect();

    assert_eq!(
        outcomes,
        vec![(5, true), (6, true), (7, true), (8, true), (10, false), (11, false)]
    );
}

#[test]
fn failing_segment_index_points_at_bad_segment() {
    let corpus = corpus();
    let resolver = PathResolver::new(&corpus);

    let cases = [
        ("missing_schema.x.y", 0),
        ("action_schema.nothing", 1),
        ("action_schema.action.nothing", 2),
        ("approval_schema.review_level.medium", 2),
        ("action_schema.label.x", 2),
    ];

    for (path, expected) in cases {
        match resolver.resolve(path) {
            ResolutionResult::Unresolved { failing_segment_index, .. } => {
                assert_eq!(failing_segment_index, expected, "path {}", path)
            }
            ResolutionResult::Resolved => panic!("{} should not resolve", path),
        }
    }
}
