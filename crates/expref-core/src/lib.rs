//! expref core
//!
//! Core domain model with stable, versioned types.
//! Never rename diagnostic codes - they are part of the public API.

pub mod diagnostic;
pub mod schema;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use schema::{
    ident_eq, ident_key, Attribute, BuiltinType, Declaration, DeclarationKind, Element, ElementKind,
    Entity, Schema, TypeDecl,
};
pub use report::{ReportSummary, ReportVersion, UnresolvedLink, ValidationReport};
pub use config::{Config, ConfigError, SeverityThreshold};
