//! # Error Types
//!
//! Two disjoint error classes exist:
//!
//! - [`SchemaError`]: a malformed schema declaration. Raised by the compiler,
//!   aborts compilation, never yields a partial schema.
//! - Runtime data problems, which are not errors in the `Result` sense. They
//!   are accumulated as [`crate::ValidationError`] records instead.
//!
//! [`DataError`] and [`NotValidated`] cover misuse of the validation surface
//! itself (non-object input, reading results before any run).

use thiserror::Error;

/// A schema declaration was rejected by the compiler.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The `type` of a property is not a tag, keyword, array or schema.
    #[error("Unsupported type on {key}: {found}")]
    UnsupportedType { key: String, found: String },

    /// `regex` or `enum` declared on a property whose type is not `String`.
    #[error("Invalid schema for {key}: regex and enum can be set only for strings")]
    StringOnlyConstraint { key: String },

    /// `regex` declared with something other than a compiled pattern.
    #[error("Invalid schema for {key}: regex must be an instance of Regex")]
    RegexNotPattern { key: String },

    /// `enum` declared with something other than a list of strings.
    #[error("Invalid schema for {key}: enum must be a list of strings")]
    EnumNotStrings { key: String },

    /// `custom` declared with something other than a validator.
    #[error("Custom validator for {key} must be a function, was {found}")]
    CustomNotCallable { key: String, found: String },

    /// `min` or `max` declared with a non-number.
    #[error("Invalid schema for {key}: {bound} property must be a number")]
    BoundNotNumber { key: String, bound: &'static str },

    /// `required` declared with a non-boolean.
    #[error("Invalid schema for {key}: required property must be a boolean")]
    RequiredNotBool { key: String },

    /// `message` declared with a non-string.
    #[error("Invalid schema for {key}: message property must be a string")]
    MessageNotString { key: String },

    /// An array type listing more than one item type.
    #[error(
        "Invalid schema for {key}. Array items must be declared of any type, or just one type: [String], [Number]"
    )]
    MultiTypeArray { key: String },

    /// A property value that is neither a type, a rule, nor a nested schema.
    #[error("Invalid schema for {key}: unsupported declaration {found}")]
    UnsupportedDeclaration { key: String, found: String },

    /// A nested schema declaration failed to compile. The display is
    /// narrowed to the parent key; the underlying failure is the source.
    #[error("Could not parse property {key} as schema")]
    NestedSchema {
        key: String,
        #[source]
        source: Box<SchemaError>,
    },
}

impl SchemaError {
    /// The property key the error was raised for.
    pub fn key(&self) -> &str {
        match self {
            SchemaError::UnsupportedType { key, .. }
            | SchemaError::StringOnlyConstraint { key }
            | SchemaError::RegexNotPattern { key }
            | SchemaError::EnumNotStrings { key }
            | SchemaError::CustomNotCallable { key, .. }
            | SchemaError::BoundNotNumber { key, .. }
            | SchemaError::RequiredNotBool { key }
            | SchemaError::MessageNotString { key }
            | SchemaError::MultiTypeArray { key }
            | SchemaError::UnsupportedDeclaration { key, .. }
            | SchemaError::NestedSchema { key, .. } => key,
        }
    }

    /// Follows `NestedSchema` wrappers down to the error that started it.
    pub fn root_cause(&self) -> &SchemaError {
        match self {
            SchemaError::NestedSchema { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// The data handed to `validate` cannot be validated at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// Data was null, a scalar, or an array.
    #[error("Data passed to validate is incorrect. It must be an object.")]
    NotAnObject,
}

/// Results were read before any validation run.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("You need to call .validate() before .getValidationErrors()")]
pub struct NotValidated;
