//! # Stateful Facade
//!
//! [`Schemy`] pairs a compiled schema with the data and report of its most
//! recent run, for callers that validate first and read errors or the body
//! afterwards. `validate` takes `&mut self`, so one instance serves at most
//! one in-flight validation; validate independent payloads concurrently by
//! cloning the compiled schema into separate instances.

use serde_json::{Map, Value};

use schemy_core::{DataError, NotValidated, SchemaError, ValidationError};

use crate::body::BodyOptions;
use crate::compile::SchemaCompiler;
use crate::decl::Decl;
use crate::engine::{Report, ValidationEngine};
use crate::hooks::HookRegistry;
use crate::schema::{CompileOptions, CompiledSchema};

/// A compiled schema plus the outcome of its last validation run.
#[derive(Debug, Clone)]
pub struct Schemy {
    schema: CompiledSchema,
    hooks: HookRegistry,
    last: Option<(Map<String, Value>, Report)>,
}

impl Schemy {
    /// Compile `decl` with `options`, dispatching to `hooks` for the lifetime
    /// of the instance.
    ///
    /// # Errors
    ///
    /// Returns the compiler's [`SchemaError`] for a malformed declaration.
    pub fn new(decl: &Decl, options: CompileOptions, hooks: &HookRegistry) -> Result<Self, SchemaError> {
        let schema = SchemaCompiler::new(hooks).compile(decl, options)?;
        Ok(Self {
            schema,
            hooks: hooks.clone(),
            last: None,
        })
    }

    /// Compile a strict schema without hooks.
    pub fn strict(decl: &Decl) -> Result<Self, SchemaError> {
        Self::new(decl, CompileOptions { strict: true }, &HookRegistry::new())
    }

    /// Compile a flexible schema without hooks.
    pub fn flexible(decl: &Decl) -> Result<Self, SchemaError> {
        Self::new(decl, CompileOptions { strict: false }, &HookRegistry::new())
    }

    /// Wrap an already-compiled schema.
    pub fn from_compiled(schema: CompiledSchema, hooks: &HookRegistry) -> Self {
        Self {
            schema,
            hooks: hooks.clone(),
            last: None,
        }
    }

    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// The data observed by the last successful run, defaults applied.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        self.last.as_ref().map(|(data, _)| data)
    }

    /// Validate `data`, replacing the previous run's data and report.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotAnObject`] when `data` is not an object. The
    /// previous run is discarded in that case too.
    pub fn validate(&mut self, mut data: Value) -> Result<bool, DataError> {
        self.last = None;
        let report = ValidationEngine::new(&self.hooks).validate(&self.schema, &mut data)?;
        let valid = report.is_valid();
        if let Value::Object(map) = data {
            self.last = Some((map, report));
        }
        Ok(valid)
    }

    fn report(&self) -> Result<&Report, NotValidated> {
        self.last.as_ref().map(|(_, report)| report).ok_or(NotValidated)
    }

    /// Every message of the last run, nested messages expanded.
    pub fn validation_errors(&self) -> Result<Vec<String>, NotValidated> {
        let report = self.report()?;
        self.hooks.get_validation_errors();
        Ok(report.flattened())
    }

    /// The `{key, message}` records of the last run.
    pub fn grouped_validation_errors(&self) -> Result<&[ValidationError], NotValidated> {
        let report = self.report()?;
        self.hooks.get_grouped_validation_errors();
        Ok(report.grouped())
    }

    /// Project the last validated data through the schema.
    pub fn body(&self, options: BodyOptions) -> Result<Map<String, Value>, NotValidated> {
        let (data, _) = self.last.as_ref().ok_or(NotValidated)?;
        Ok(self.schema.body(data, options))
    }
}

/// Validate `body` and resolve with its projection, or reject with the
/// flattened error list.
///
/// A compiled schema is used as-is; any other declaration is compiled strict.
/// Compile and data-shape failures reject with their single message.
pub async fn validate_async(
    body: Value,
    schema: impl Into<Decl>,
    options: BodyOptions,
) -> Result<Map<String, Value>, Vec<String>> {
    let mut schemy = match schema.into() {
        Decl::Compiled(compiled) => Schemy::from_compiled(compiled, &HookRegistry::new()),
        decl => Schemy::strict(&decl).map_err(|e| vec![e.to_string()])?,
    };

    if !schemy.validate(body).map_err(|e| vec![e.to_string()])? {
        return Err(schemy.validation_errors().unwrap_or_default());
    }
    schemy.body(options).map_err(|e| vec![e.to_string()])
}
