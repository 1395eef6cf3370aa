//! EXPRESS schema model
//!
//! A parsed EXPRESS schema as handed over by the external parser. Only the
//! parts needed to navigate reference paths are modelled: entities with their
//! attributes, defined types with base types or enumeration values, and the
//! remaining declaration kinds as opaque leaves.

use serde::{Deserialize, Serialize};

/// Compare two EXPRESS identifiers (case-insensitive)
pub fn ident_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Normalised map key for an EXPRESS identifier
pub fn ident_key(id: &str) -> String {
    id.to_ascii_lowercase()
}

/// Built-in EXPRESS simple types
///
/// A defined type whose base type is one of these cannot be navigated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BuiltinType {
    Integer,
    Real,
    String,
    Boolean,
    Number,
    Binary,
    Logical,
}

impl BuiltinType {
    /// All built-in keywords
    pub const ALL: [BuiltinType; 7] = [
        Self::Integer,
        Self::Real,
        Self::String,
        Self::Boolean,
        Self::Number,
        Self::Binary,
        Self::Logical,
    ];

    /// Parse a keyword (case-insensitive)
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| ident_eq(b.as_str(), keyword.trim()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
            Self::Number => "NUMBER",
            Self::Binary => "BINARY",
            Self::Logical => "LOGICAL",
        }
    }
}

impl std::fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An explicit attribute of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute identifier
    pub id: String,

    /// Declared type, as written (not resolved)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_ref: Option<String>,
}

impl Attribute {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_ref: None,
        }
    }

    /// Set the declared type
    pub fn with_type(mut self, type_ref: impl Into<String>) -> Self {
        self.type_ref = Some(type_ref.into());
        self
    }
}

/// ENTITY declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,

    /// Explicit attributes in declaration order
    #[serde(default)]
    pub attributes: Vec<Attribute>,

    /// Supertype references (SUBTYPE OF)
    #[serde(default)]
    pub subtype_of: Vec<String>,
}

impl Entity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Vec::new(),
            subtype_of: Vec::new(),
        }
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a supertype reference
    pub fn with_supertype(mut self, supertype: impl Into<String>) -> Self {
        self.subtype_of.push(supertype.into());
        self
    }

    /// Find an attribute by id (case-insensitive)
    pub fn find_attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| ident_eq(&a.id, id))
    }
}

/// TYPE declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: String,

    /// Underlying type: a built-in keyword or the name of another type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_type: Option<String>,

    /// Enumeration items, for ENUMERATION OF types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl TypeDecl {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_type: None,
            enum_values: None,
        }
    }

    /// Set the base type
    pub fn with_base_type(mut self, base_type: impl Into<String>) -> Self {
        self.base_type = Some(base_type.into());
        self
    }

    /// Set the enumeration items
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Find an enumeration item by id (case-insensitive)
    pub fn find_enum_value(&self, id: &str) -> Option<&str> {
        self.enum_values
            .as_ref()?
            .iter()
            .find(|v| ident_eq(v, id))
            .map(String::as_str)
    }
}

/// Declaration kinds that cannot be navigated into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub id: String,
}

impl Declaration {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Element category, in element search order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Entity,
    Type,
    Constant,
    Function,
    Rule,
    Procedure,
    SubtypeConstraint,
}

impl ElementKind {
    /// Fixed order in which schema collections are searched for an element id
    pub const SEARCH_ORDER: [ElementKind; 7] = [
        Self::Entity,
        Self::Type,
        Self::Constant,
        Self::Function,
        Self::Rule,
        Self::Procedure,
        Self::SubtypeConstraint,
    ];
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::Type => write!(f, "type"),
            Self::Constant => write!(f, "constant"),
            Self::Function => write!(f, "function"),
            Self::Rule => write!(f, "rule"),
            Self::Procedure => write!(f, "procedure"),
            Self::SubtypeConstraint => write!(f, "subtype constraint"),
        }
    }
}

/// Element categories without navigable members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Constant,
    Function,
    Rule,
    Procedure,
    SubtypeConstraint,
}

impl From<DeclarationKind> for ElementKind {
    fn from(kind: DeclarationKind) -> Self {
        match kind {
            DeclarationKind::Constant => Self::Constant,
            DeclarationKind::Function => Self::Function,
            DeclarationKind::Rule => Self::Rule,
            DeclarationKind::Procedure => Self::Procedure,
            DeclarationKind::SubtypeConstraint => Self::SubtypeConstraint,
        }
    }
}

/// A schema member, borrowed from its schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    Entity(&'a Entity),
    Type(&'a TypeDecl),
    Constant(&'a Declaration),
    Function(&'a Declaration),
    Rule(&'a Declaration),
    Procedure(&'a Declaration),
    SubtypeConstraint(&'a Declaration),
}

impl<'a> Element<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            Self::Entity(e) => &e.id,
            Self::Type(t) => &t.id,
            Self::Constant(d)
            | Self::Function(d)
            | Self::Rule(d)
            | Self::Procedure(d)
            | Self::SubtypeConstraint(d) => &d.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Entity(_) => ElementKind::Entity,
            Self::Type(_) => ElementKind::Type,
            Self::Constant(_) => ElementKind::Constant,
            Self::Function(_) => ElementKind::Function,
            Self::Rule(_) => ElementKind::Rule,
            Self::Procedure(_) => ElementKind::Procedure,
            Self::SubtypeConstraint(_) => ElementKind::SubtypeConstraint,
        }
    }
}

/// A parsed EXPRESS schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub id: String,

    #[serde(default)]
    pub entities: Vec<Entity>,

    #[serde(default)]
    pub types: Vec<TypeDecl>,

    #[serde(default)]
    pub constants: Vec<Declaration>,

    #[serde(default)]
    pub functions: Vec<Declaration>,

    #[serde(default)]
    pub rules: Vec<Declaration>,

    #[serde(default)]
    pub procedures: Vec<Declaration>,

    #[serde(default)]
    pub subtype_constraints: Vec<Declaration>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entities: Vec::new(),
            types: Vec::new(),
            constants: Vec::new(),
            functions: Vec::new(),
            rules: Vec::new(),
            procedures: Vec::new(),
            subtype_constraints: Vec::new(),
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_type(mut self, type_decl: TypeDecl) -> Self {
        self.types.push(type_decl);
        self
    }

    /// Add an opaque declaration of the given kind
    pub fn with_declaration(mut self, kind: DeclarationKind, id: impl Into<String>) -> Self {
        let decl = Declaration::new(id);
        match kind {
            DeclarationKind::Constant => self.constants.push(decl),
            DeclarationKind::Function => self.functions.push(decl),
            DeclarationKind::Rule => self.rules.push(decl),
            DeclarationKind::Procedure => self.procedures.push(decl),
            DeclarationKind::SubtypeConstraint => self.subtype_constraints.push(decl),
        }
        self
    }

    /// Find the first element of one category with the given id
    pub fn find_in(&self, kind: ElementKind, id: &str) -> Option<Element<'_>> {
        fn find<'s, T>(items: &'s [T], id: &str, key: impl Fn(&T) -> &str) -> Option<&'s T> {
            items.iter().find(|item| ident_eq(key(item), id))
        }

        match kind {
            ElementKind::Entity => find(&self.entities, id, |e| &e.id).map(Element::Entity),
            ElementKind::Type => find(&self.types, id, |t| &t.id).map(Element::Type),
            ElementKind::Constant => find(&self.constants, id, |d| &d.id).map(Element::Constant),
            ElementKind::Function => find(&self.functions, id, |d| &d.id).map(Element::Function),
            ElementKind::Rule => find(&self.rules, id, |d| &d.id).map(Element::Rule),
            ElementKind::Procedure => find(&self.procedures, id, |d| &d.id).map(Element::Procedure),
            ElementKind::SubtypeConstraint => {
                find(&self.subtype_constraints, id, |d| &d.id).map(Element::SubtypeConstraint)
            }
        }
    }

    /// Find an element by id, searching categories in [`ElementKind::SEARCH_ORDER`]
    pub fn find_element(&self, id: &str) -> Option<Element<'_>> {
        ElementKind::SEARCH_ORDER
            .into_iter()
            .find_map(|kind| self.find_in(kind, id))
    }

    /// Find a defined type by id
    pub fn find_type(&self, id: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| ident_eq(&t.id, id))
    }

    /// Total number of declared elements
    pub fn element_count(&self) -> usize {
        self.entities.len()
            + self.types.len()
            + self.constants.len()
            + self.functions.len()
            + self.rules.len()
            + self.procedures.len()
            + self.subtype_constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new("action_schema")
            .with_entity(
                Entity::new("action")
                    .with_attribute(Attribute::new("name").with_type("label"))
                    .with_attribute(Attribute::new("chosen_method")),
            )
            .with_type(TypeDecl::new("label").with_base_type("STRING"))
            .with_type(TypeDecl::new("status").with_enum_values(["planned", "done"]))
            .with_declaration(DeclarationKind::Function, "acyclic_action")
            .with_declaration(DeclarationKind::Rule, "action")
    }

    #[test]
    fn builtin_keywords() {
        assert_eq!(BuiltinType::from_keyword("integer"), Some(BuiltinType::Integer));
        assert_eq!(BuiltinType::from_keyword(" LOGICAL "), Some(BuiltinType::Logical));
        assert_eq!(BuiltinType::from_keyword("label"), None);
        assert_eq!(BuiltinType::Binary.to_string(), "BINARY");
    }

    #[test]
    fn find_element_case_insensitive() {
        let schema = sample();
        let found = schema.find_element("ACTION").unwrap();
        assert_eq!(found.kind(), ElementKind::Entity);
        assert_eq!(found.id(), "action");
        assert!(schema.find_element("nonexistent").is_none());
    }

    #[test]
    fn search_order_prefers_entities() {
        // "action" is both an entity and a rule
        let schema = sample();
        assert_eq!(schema.find_element("action").unwrap().kind(), ElementKind::Entity);
        assert_eq!(
            schema.find_in(ElementKind::Rule, "action").unwrap().kind(),
            ElementKind::Rule
        );
    }

    #[test]
    fn declarations_land_in_their_collection() {
        let kinds = [
            DeclarationKind::Constant,
            DeclarationKind::Function,
            DeclarationKind::Rule,
            DeclarationKind::Procedure,
            DeclarationKind::SubtypeConstraint,
        ];
        for kind in kinds {
            let schema = Schema::new("s").with_declaration(kind, "decl");
            assert_eq!(schema.element_count(), 1);
            assert_eq!(schema.find_element("decl").unwrap().kind(), ElementKind::from(kind));
        }
    }

    #[test]
    fn entity_and_type_members() {
        let schema = sample();
        let Some(Element::Entity(action)) = schema.find_element("action") else {
            panic!("expected entity");
        };
        assert_eq!(action.find_attribute("NAME").unwrap().type_ref.as_deref(), Some("label"));
        assert!(action.find_attribute("missing").is_none());

        let status = schema.find_type("Status").unwrap();
        assert_eq!(status.find_enum_value("DONE"), Some("done"));
        assert_eq!(status.find_enum_value("cancelled"), None);
        assert_eq!(schema.element_count(), 5);
    }

    #[test]
    fn deserialize_with_missing_collections() {
        let json = r#"{
            "id": "support_resource_schema",
            "types": [{ "id": "identifier", "base_type": "STRING" }],
            "entities": [{ "id": "name_holder", "attributes": [{ "id": "name", "type": "label" }] }]
        }"#;
        let schema: Schema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.types[0].base_type.as_deref(), Some("STRING"));
        assert_eq!(schema.entities[0].attributes[0].type_ref.as_deref(), Some("label"));
        assert!(schema.entities[0].subtype_of.is_empty());
        assert!(schema.functions.is_empty());
    }
}
