//! # Compiled Schema Model
//!
//! The normalized rule tree the compiler produces and the engine walks.
//!
//! A [`CompiledSchema`] is an ordered mapping from property name to
//! [`PropertyRule`]; declaration order is preserved because body projection
//! uses it. Nested schemas are owned children, so the tree is acyclic by
//! construction. The tree is immutable and shared behind an `Arc`: cloning a
//! schema is cheap and clones can validate independent payloads on separate
//! threads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use schemy_core::{DataError, UuidVersion};

use crate::body::{self, BodyOptions};
use crate::decl::{Producer, TypeTag, Validator};
use crate::engine::{Report, ValidationEngine};
use crate::hooks::HookRegistry;

/// What kind of value a property must hold.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    String,
    Number,
    Boolean,
    Object,
    Function,
    Date,
    Uuid(UuidVersion),
    Nested(CompiledSchema),
    /// `None` accepts items of any type.
    ArrayOf(Option<Box<TypeSpec>>),
}

impl TypeSpec {
    /// The runtime category name for specs checked purely by category.
    pub fn category(&self) -> Option<&'static str> {
        match self {
            TypeSpec::String => Some("string"),
            TypeSpec::Number => Some("number"),
            TypeSpec::Boolean => Some("boolean"),
            TypeSpec::Object => Some("object"),
            TypeSpec::Function => Some("function"),
            _ => None,
        }
    }
}

impl From<TypeTag> for TypeSpec {
    fn from(tag: TypeTag) -> Self {
        match tag {
            TypeTag::String => TypeSpec::String,
            TypeTag::Number => TypeSpec::Number,
            TypeTag::Boolean => TypeSpec::Boolean,
            TypeTag::Object => TypeSpec::Object,
            TypeTag::Function => TypeSpec::Function,
            TypeTag::Date => TypeSpec::Date,
        }
    }
}

/// A default applied when the property is absent or null.
#[derive(Debug, Clone)]
pub enum DefaultValue {
    Literal(Value),
    Producer(Producer),
}

/// The compiled contract of one property.
#[derive(Debug, Clone)]
pub struct PropertyRule {
    pub type_spec: TypeSpec,
    pub required: bool,
    pub custom: Option<Validator>,
    pub regex: Option<Regex>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub enum_values: Option<Vec<String>>,
    pub default: Option<DefaultValue>,
    /// Replaces every message recorded for this property.
    pub message: Option<String>,
}

impl PropertyRule {
    pub fn new(type_spec: TypeSpec) -> Self {
        Self {
            type_spec,
            required: false,
            custom: None,
            regex: None,
            min: None,
            max: None,
            enum_values: None,
            default: None,
            message: None,
        }
    }
}

/// Options accepted by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Reject top-level keys the schema does not declare.
    pub strict: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

#[derive(Debug)]
struct SchemaTree {
    properties: Vec<(String, PropertyRule)>,
    positions: HashMap<String, usize>,
}

/// A validated, normalized rule tree.
#[derive(Clone)]
pub struct CompiledSchema {
    tree: Arc<SchemaTree>,
    flex: bool,
}

impl CompiledSchema {
    pub(crate) fn from_properties(properties: Vec<(String, PropertyRule)>, flex: bool) -> Self {
        let positions = properties
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            tree: Arc::new(SchemaTree { properties, positions }),
            flex,
        }
    }

    /// The same rule tree under a different strictness.
    pub(crate) fn with_flex(&self, flex: bool) -> Self {
        Self {
            tree: Arc::clone(&self.tree),
            flex,
        }
    }

    /// True when undeclared top-level keys are tolerated.
    pub fn is_flex(&self) -> bool {
        self.flex
    }

    pub fn get(&self, key: &str) -> Option<&PropertyRule> {
        self.tree
            .positions
            .get(key)
            .map(|&i| &self.tree.properties[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.tree.positions.contains_key(key)
    }

    /// Property names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tree.properties.iter().map(|(k, _)| k.as_str())
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyRule)> {
        self.tree.properties.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.tree.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.properties.is_empty()
    }

    /// Validate `data` without hooks. Defaults are written into `data`.
    pub fn validate(&self, data: &mut Value) -> Result<Report, DataError> {
        ValidationEngine::new(&HookRegistry::new()).validate(self, data)
    }

    /// Project a validated data object; see [`body::project`].
    pub fn body(&self, data: &Map<String, Value>, options: BodyOptions) -> Map<String, Value> {
        body::project(data, self, options)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("flex", &self.flex)
            .field("properties", &self.tree.properties)
            .finish()
    }
}
