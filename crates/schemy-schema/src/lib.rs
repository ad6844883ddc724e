//! # schemy-schema — Declarative Data Validation
//!
//! Compiles schema declarations into rule trees and validates JSON objects
//! against them.
//!
//! ## Pipeline
//!
//! raw [`Decl`] → [`SchemaCompiler`] → [`CompiledSchema`] →
//! [`ValidationEngine`] → [`Report`] → [`body::project`] → output object.
//!
//! - **Declarations** (`decl.rs`): the declaration grammar with its type tags,
//!   custom validators and default producers.
//! - **Compiled model** (`schema.rs`): `TypeSpec`, `PropertyRule` and the
//!   shared, immutable `CompiledSchema`.
//! - **Compiler** (`compile.rs`): normalizes shorthand, resolves types and
//!   rejects malformed declarations with a [`SchemaError`].
//! - **Engine** (`engine.rs`): per-property default, required, custom and
//!   type checks, with nested schemas folded under their parent key.
//! - **Body** (`body.rs`): filtering and ordering of validated data.
//! - **Hooks** (`hooks.rs`): lifecycle observers held by an explicit
//!   [`HookRegistry`].
//! - **Facade** (`schemy.rs`): the stateful [`Schemy`] wrapper and
//!   [`validate_async`].
//!
//! ## Example
//!
//! ```
//! use schemy_schema::{BodyOptions, Decl, Schemy, TypeTag};
//! use serde_json::json;
//!
//! let decl = Decl::object([
//!     ("title", Decl::from(TypeTag::String)),
//!     ("age", Decl::rule(TypeTag::Number).with("min", 0).with("max", 120)),
//! ]);
//! let mut schemy = Schemy::strict(&decl).unwrap();
//!
//! assert!(!schemy.validate(json!({"title": "x", "age": 150})).unwrap());
//! assert_eq!(
//!     schemy.validation_errors().unwrap(),
//!     vec!["Property age must be less than 120"]
//! );
//!
//! assert!(schemy.validate(json!({"age": 30, "title": "x"})).unwrap());
//! let body = schemy.body(BodyOptions::default()).unwrap();
//! assert_eq!(body.keys().collect::<Vec<_>>(), vec!["title", "age"]);
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `schemy-core` internally.
//! - Compilation is all-or-nothing; validation never fails mid-run.
//! - The library emits `tracing` events but never installs a subscriber.

pub mod body;
pub mod compile;
pub mod decl;
pub mod engine;
pub mod hooks;
pub mod schema;
pub mod schemy;

pub use body::{project, BodyOptions};
pub use compile::SchemaCompiler;
pub use decl::{BoxError, Decl, Outcome, Producer, TypeTag, Validator};
pub use engine::{Report, ValidationEngine};
pub use hooks::{Hook, HookRegistry};
pub use schema::{CompileOptions, CompiledSchema, DefaultValue, PropertyRule, TypeSpec};
pub use schemy::{validate_async, Schemy};

pub use schemy_core::{
    DataError, ErrorCollector, ErrorMessage, NotValidated, SchemaError, UuidVersion, ValidationError,
    ValueKind,
};
