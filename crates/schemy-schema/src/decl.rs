//! # Declaration Grammar
//!
//! A raw schema declaration is a [`Decl`] tree: an object mapping property
//! names to type tags, rule objects, or nested declarations. The tree is
//! deliberately loose (any attribute may hold any variant) so that the
//! compiler, not the type system, is the single place where a declaration is
//! judged well-formed, and so that its rejections name what was found.
//!
//! ```
//! use schemy_schema::{Decl, TypeTag};
//!
//! let decl = Decl::object([
//!     ("title", Decl::rule(TypeTag::String).with("required", true).with("max", 80)),
//!     ("age", Decl::rule(TypeTag::Number).with("min", 0).with("max", 120)),
//!     ("tags", Decl::list([TypeTag::String])),
//! ]);
//! assert_eq!(decl.kind_name(), "object");
//! ```

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Number, Value};

use crate::schema::CompiledSchema;

/// Error type a fallible default producer may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The closed set of type markers a property can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Object,
    Function,
    Date,
}

impl TypeTag {
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Number => "Number",
            TypeTag::Boolean => "Boolean",
            TypeTag::Object => "Object",
            TypeTag::Function => "Function",
            TypeTag::Date => "Date",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a custom validator concluded about a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    /// Failed; the engine records a generic message for the property.
    Invalid,
    /// Failed; the message is recorded verbatim.
    Message(String),
}

impl From<bool> for Outcome {
    fn from(ok: bool) -> Self {
        if ok {
            Outcome::Valid
        } else {
            Outcome::Invalid
        }
    }
}

impl From<String> for Outcome {
    fn from(message: String) -> Self {
        Outcome::Message(message)
    }
}

impl From<&str> for Outcome {
    fn from(message: &str) -> Self {
        Outcome::Message(message.to_string())
    }
}

impl From<Option<String>> for Outcome {
    fn from(message: Option<String>) -> Self {
        message.map_or(Outcome::Valid, Outcome::Message)
    }
}

impl<E: fmt::Display> From<Result<(), E>> for Outcome {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Outcome::Valid,
            Err(e) => Outcome::Message(e.to_string()),
        }
    }
}

type ValidatorFn = dyn Fn(&Value, &Map<String, Value>, &CompiledSchema) -> Outcome + Send + Sync;

/// A custom validator, called with `(value, whole data object, schema)`.
#[derive(Clone)]
pub struct Validator(Arc<ValidatorFn>);

impl Validator {
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Value, &Map<String, Value>, &CompiledSchema) -> R + Send + Sync + 'static,
        R: Into<Outcome>,
    {
        Self(Arc::new(move |value, data, schema| f(value, data, schema).into()))
    }

    pub fn call(&self, value: &Value, data: &Map<String, Value>, schema: &CompiledSchema) -> Outcome {
        (self.0)(value, data, schema)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator(..)")
    }
}

type ProducerFn = dyn Fn() -> Result<Value, BoxError> + Send + Sync;

/// A zero-argument default producer. Failures are swallowed by the engine.
#[derive(Clone)]
pub struct Producer(Arc<ProducerFn>);

impl Producer {
    /// Wrap an infallible producer.
    pub fn new<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Into<Value>,
    {
        Self(Arc::new(move || Ok(f().into())))
    }

    /// Wrap a producer that may fail.
    pub fn try_new<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self) -> Result<Value, BoxError> {
        (self.0)()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Producer(..)")
    }
}

/// A node of a raw schema declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    Type(TypeTag),
    Pattern(Regex),
    Validator(Validator),
    Producer(Producer),
    List(Vec<Decl>),
    /// Ordered entries; names are unique.
    Object(Vec<(String, Decl)>),
    /// An already-compiled schema; the compiler does not normalize it again.
    Compiled(CompiledSchema),
}

impl Decl {
    /// Build an object from `(name, value)` pairs. A repeated name replaces
    /// the earlier value in its original position.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Decl>,
    {
        entries
            .into_iter()
            .fold(Decl::Object(Vec::new()), |decl, (k, v)| decl.with(k, v))
    }

    /// A rule object holding only a `type`.
    pub fn rule(type_decl: impl Into<Decl>) -> Self {
        Decl::Object(vec![("type".to_string(), type_decl.into())])
    }

    pub fn list<V, I>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Decl>,
    {
        Decl::List(items.into_iter().map(Into::into).collect())
    }

    /// Insert or replace `name`. A non-object receiver is discarded and
    /// replaced by a single-entry object.
    pub fn with(self, name: impl Into<String>, value: impl Into<Decl>) -> Self {
        let name = name.into();
        let value = value.into();
        let mut entries = match self {
            Decl::Object(entries) => entries,
            _ => Vec::new(),
        };
        match entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => entries.push((name, value)),
        }
        Decl::Object(entries)
    }

    /// Look up an entry of an object declaration.
    pub fn get(&self, name: &str) -> Option<&Decl> {
        match self {
            Decl::Object(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_entries(&self) -> Option<&[(String, Decl)]> {
        match self {
            Decl::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Category name used when a declaration is rejected.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Decl::Null => "null",
            Decl::Bool(_) => "boolean",
            Decl::Number(_) => "number",
            Decl::Str(_) => "string",
            Decl::Type(_) => "type",
            Decl::Pattern(_) => "regex",
            Decl::Validator(_) => "function",
            Decl::Producer(_) => "producer",
            Decl::List(_) => "array",
            Decl::Object(_) => "object",
            Decl::Compiled(_) => "schema",
        }
    }
}

impl From<TypeTag> for Decl {
    fn from(tag: TypeTag) -> Self {
        Decl::Type(tag)
    }
}

impl From<&str> for Decl {
    fn from(s: &str) -> Self {
        Decl::Str(s.to_string())
    }
}

impl From<String> for Decl {
    fn from(s: String) -> Self {
        Decl::Str(s)
    }
}

impl From<bool> for Decl {
    fn from(b: bool) -> Self {
        Decl::Bool(b)
    }
}

macro_rules! decl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Decl {
            fn from(n: $t) -> Self {
                Decl::Number(Number::from(n))
            }
        })*
    };
}

decl_from_int!(i32, i64, u32, u64, usize);

impl From<f64> for Decl {
    /// Non-finite floats have no JSON number form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Decl::Null, Decl::Number)
    }
}

impl From<Regex> for Decl {
    fn from(re: Regex) -> Self {
        Decl::Pattern(re)
    }
}

impl From<Validator> for Decl {
    fn from(v: Validator) -> Self {
        Decl::Validator(v)
    }
}

impl From<Producer> for Decl {
    fn from(p: Producer) -> Self {
        Decl::Producer(p)
    }
}

impl From<CompiledSchema> for Decl {
    fn from(schema: CompiledSchema) -> Self {
        Decl::Compiled(schema)
    }
}

impl<T: Into<Decl>> From<Vec<T>> for Decl {
    fn from(items: Vec<T>) -> Self {
        Decl::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Decl {
    /// Literal conversion: JSON strings stay strings, never type keywords
    /// beyond what the compiler itself recognises.
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Decl::Null,
            Value::Bool(b) => Decl::Bool(b),
            Value::Number(n) => Decl::Number(n),
            Value::String(s) => Decl::Str(s),
            Value::Array(items) => Decl::List(items.into_iter().map(Decl::from).collect()),
            Value::Object(map) => Decl::Object(map.into_iter().map(|(k, v)| (k, Decl::from(v))).collect()),
        }
    }
}
