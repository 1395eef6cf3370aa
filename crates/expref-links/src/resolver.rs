//! Reference path resolution
//!
//! Walks a dotted path (`schema.element.member...`) through the schema corpus.
//! Segment 0 names a schema, segment 1 an element of it; every further
//! segment is looked up inside whatever the previous segments resolved to.
//! All identifier comparisons ignore case.

use expref_core::{Attribute, BuiltinType, DiagnosticCode, Element, Schema};
use expref_corpus::SchemaCorpus;
use std::fmt;
use tracing::debug;

/// Why a path failed to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Segment 0 is not a schema id
    SchemaNotFound { schema: String },

    /// Segment 1 is not an element of the schema
    ElementNotFound { element: String, schema: String },

    /// Segment is not an attribute of the entity at `path`
    AttributeNotFound { attribute: String, path: String },

    /// Segment is not a value of the enumeration at `path`
    EnumValueNotFound { value: String, path: String },

    /// The type at `path` names a base type the schema does not declare
    BaseTypeNotFound { base_type: String, path: String },

    /// The type at `path` bottoms out in a built-in type
    BuiltinType { builtin: BuiltinType, path: String },

    /// Path continues past the enumeration value at `path`
    EnumValueLeaf { path: String },

    /// Element at `path` has no navigable members
    NotNavigable { path: String },

    /// Base type chain from `path` is longer than `limit` (cycle)
    RedirectionLimit { path: String, limit: usize },
}

impl UnresolvedReason {
    /// Stable diagnostic code for this failure
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::SchemaNotFound { .. } => DiagnosticCode::LinkSchemaNotFound,
            Self::ElementNotFound { .. } => DiagnosticCode::LinkElementNotFound,
            Self::AttributeNotFound { .. } => DiagnosticCode::LinkAttributeNotFound,
            Self::EnumValueNotFound { .. } => DiagnosticCode::LinkEnumValueNotFound,
            Self::BaseTypeNotFound { .. } => DiagnosticCode::LinkBaseTypeNotFound,
            Self::BuiltinType { .. } => DiagnosticCode::LinkBuiltinTypeLeaf,
            Self::EnumValueLeaf { .. } => DiagnosticCode::LinkEnumValueLeaf,
            Self::NotNavigable { .. } => DiagnosticCode::LinkNotNavigable,
            Self::RedirectionLimit { .. } => DiagnosticCode::LinkRedirectionLimit,
        }
    }
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SchemaNotFound { schema } => write!(f, "Schema '{}' not found", schema),
            Self::ElementNotFound { element, schema } => {
                write!(f, "Element '{}' not found in schema '{}'", element, schema)
            }
            Self::AttributeNotFound { attribute, path } => {
                write!(f, "Attribute '{}' not found in entity '{}'", attribute, path)
            }
            Self::EnumValueNotFound { value, path } => {
                write!(f, "Enumeration value '{}' not found in type '{}'", value, path)
            }
            Self::BaseTypeNotFound { path, .. } => write!(f, "Base type not found for '{}'", path),
            Self::BuiltinType { builtin, path } => write!(
                f,
                "Cannot navigate deeper from built-in type '{}' at '{}'",
                builtin, path
            ),
            Self::EnumValueLeaf { path } => {
                write!(f, "Cannot navigate deeper from enumeration value '{}'", path)
            }
            Self::NotNavigable { path } => write!(f, "Cannot navigate deeper from '{}'", path),
            Self::RedirectionLimit { path, limit } => write!(
                f,
                "Cannot navigate deeper from '{}': base type chain exceeds {} redirections",
                path, limit
            ),
        }
    }
}

/// Outcome of resolving one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    Resolved,
    Unresolved {
        /// Index of the segment that could not be resolved
        failing_segment_index: usize,
        reason: UnresolvedReason,
    },
}

impl ResolutionResult {
    fn unresolved(failing_segment_index: usize, reason: UnresolvedReason) -> Self {
        Self::Unresolved {
            failing_segment_index,
            reason,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// The failure reason, if unresolved
    pub fn reason(&self) -> Option<&UnresolvedReason> {
        match self {
            Self::Resolved => None,
            Self::Unresolved { reason, .. } => Some(reason),
        }
    }
}

/// What the path walk is currently standing on
#[derive(Debug, Clone, Copy)]
enum Node<'a> {
    Element(Element<'a>),
    Attribute(&'a Attribute),
}

/// Resolves reference paths against a schema corpus
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'c> {
    corpus: &'c SchemaCorpus,
}

impl<'c> PathResolver<'c> {
    pub fn new(corpus: &'c SchemaCorpus) -> Self {
        Self { corpus }
    }

    /// Resolve a dotted reference path
    pub fn resolve(&self, raw_path: &str) -> ResolutionResult {
        let segments: Vec<&str> = raw_path.split('.').collect();

        let schema_id = segments[0];
        let Some(schema) = self.corpus.lookup_schema(schema_id) else {
            return ResolutionResult::unresolved(
                0,
                UnresolvedReason::SchemaNotFound { schema: schema_id.to_string() },
            );
        };

        // A bare schema reference is valid on its own
        let Some(&element_id) = segments.get(1) else {
            return ResolutionResult::Resolved;
        };

        let element = match element_id {
            "" => None,
            id => schema.find_element(id),
        };
        let Some(element) = element else {
            return ResolutionResult::unresolved(
                1,
                UnresolvedReason::ElementNotFound {
                    element: element_id.to_string(),
                    schema: schema_id.to_string(),
                },
            );
        };

        Self::walk(schema, element, &segments)
    }

    /// Resolve segments 2.. starting from `element`
    fn walk(schema: &Schema, element: Element<'_>, segments: &[&str]) -> ResolutionResult {
        let mut current = Node::Element(element);
        let mut path = format!("{}.{}", schema.id, element.id());

        // A valid base type chain visits each declared type at most once
        let limit = schema.types.len();
        let mut redirections = 0;

        let mut idx = 2;
        while idx < segments.len() {
            let segment = segments[idx];
            let is_last = idx + 1 == segments.len();

            match current {
                Node::Element(Element::Entity(entity)) => {
                    let Some(attribute) = entity.find_attribute(segment) else {
                        return ResolutionResult::unresolved(
                            idx,
                            UnresolvedReason::AttributeNotFound {
                                attribute: segment.to_string(),
                                path,
                            },
                        );
                    };
                    current = Node::Attribute(attribute);
                }
                Node::Element(Element::Type(type_decl)) => {
                    if let Some(base_type) = &type_decl.base_type {
                        if let Some(builtin) = BuiltinType::from_keyword(base_type) {
                            return ResolutionResult::unresolved(
                                idx,
                                UnresolvedReason::BuiltinType { builtin, path },
                            );
                        }

                        redirections += 1;
                        if redirections > limit {
                            debug!(path = %path, limit, "Base type chain too long");
                            return ResolutionResult::unresolved(
                                idx,
                                UnresolvedReason::RedirectionLimit { path, limit },
                            );
                        }

                        let Some(target) = schema.find_type(base_type) else {
                            return ResolutionResult::unresolved(
                                idx,
                                UnresolvedReason::BaseTypeNotFound {
                                    base_type: base_type.clone(),
                                    path,
                                },
                            );
                        };
                        debug!(
                            from = %type_decl.id,
                            to = %target.id,
                            segment = idx,
                            "Following base type"
                        );

                        // Same segment, evaluated against the base type
                        current = Node::Element(Element::Type(target));
                        continue;
                    }

                    if type_decl.enum_values.is_some() {
                        if type_decl.find_enum_value(segment).is_none() {
                            return ResolutionResult::unresolved(
                                idx,
                                UnresolvedReason::EnumValueNotFound {
                                    value: segment.to_string(),
                                    path,
                                },
                            );
                        }
                        if is_last {
                            return ResolutionResult::Resolved;
                        }
                        path.push('.');
                        path.push_str(segment);
                        return ResolutionResult::unresolved(
                            idx,
                            UnresolvedReason::EnumValueLeaf { path },
                        );
                    }

                    return ResolutionResult::unresolved(
                        idx,
                        UnresolvedReason::NotNavigable { path },
                    );
                }
                Node::Element(
                    Element::Constant(_)
                    | Element::Function(_)
                    | Element::Rule(_)
                    | Element::Procedure(_)
                    | Element::SubtypeConstraint(_),
                )
                | Node::Attribute(_) => {
                    return ResolutionResult::unresolved(
                        idx,
                        UnresolvedReason::NotNavigable { path },
                    );
                }
            }

            path.push('.');
            path.push_str(segment);
            redirections = 0;
            idx += 1;
        }

        ResolutionResult::Resolved
    }
}
