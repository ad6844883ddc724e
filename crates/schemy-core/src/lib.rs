//! # schemy-core — Foundational Types for Schemy
//!
//! This crate is the leaf of the Schemy workspace. It holds the pieces of
//! the validation engine that do not depend on how a schema is declared or
//! compiled:
//!
//! - **Value categories** (`value.rs`): the closed set of runtime categories
//!   a JSON value can fall into, used in "is X, expected Y" messages.
//! - **Temporal** (`temporal.rs`): the lenient date recogniser behind the
//!   `Date` type tag.
//! - **Identity** (`identity.rs`): the `uuid/v1` and `uuid/v4` recognisers.
//! - **Reports** (`report.rs`): the structured `ValidationError` record and
//!   the `ErrorCollector` with its flattened and grouped views.
//! - **Errors** (`error.rs`): compile-time `SchemaError` plus the two runtime
//!   misuse errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `schemy-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` on caller-supplied input.

pub mod error;
pub mod identity;
pub mod report;
pub mod temporal;
pub mod value;

pub use error::{DataError, NotValidated, SchemaError};
pub use identity::{is_uuid_v1, is_uuid_v4, UuidVersion};
pub use report::{ErrorCollector, ErrorMessage, ValidationError};
pub use temporal::is_valid_date;
pub use value::ValueKind;
