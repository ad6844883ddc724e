//! # Validation Engine
//!
//! Walks a [`CompiledSchema`] against a data object and accumulates every
//! data problem into a [`Report`]. Nothing here is fatal mid-run: each
//! declared property is evaluated whatever happened to the ones before it.
//!
//! Per property, in declaration order:
//!
//! 1. A `default` is written into the data when the value is absent or null.
//! 2. A required property still absent records "Missing required property".
//! 3. An optional property that is absent is skipped.
//! 4. The custom validator runs, then the type-specific check runs. Both may
//!    record an error for the same key.
//!
//! Nested schema failures are folded into one record at the parent key with
//! every nested message re-prefixed as `parent.child`. Array items are checked
//! element by element and reported with a single aggregate error.

use serde_json::{Map, Value};

use schemy_core::{is_valid_date, DataError, ErrorCollector, ValidationError, ValueKind};

use crate::decl::Outcome;
use crate::hooks::HookRegistry;
use crate::schema::{CompiledSchema, DefaultValue, PropertyRule, TypeSpec};

/// The outcome of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    errors: ErrorCollector,
}

impl Report {
    /// True when the run recorded no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ErrorCollector {
        &self.errors
    }

    /// Every message line, nested lists expanded.
    pub fn flattened(&self) -> Vec<String> {
        self.errors.flattened()
    }

    pub fn grouped(&self) -> &[ValidationError] {
        self.errors.grouped()
    }

    pub fn into_errors(self) -> ErrorCollector {
        self.errors
    }
}

/// Validates data against compiled schemas, dispatching validation hooks.
#[derive(Debug, Clone, Copy)]
pub struct ValidationEngine<'h> {
    hooks: &'h HookRegistry,
}

/// Errors recorded for one property. The rule's `message`, when set,
/// replaces whatever text the check produced.
struct PropertyErrors<'a> {
    key: &'a str,
    message: Option<&'a str>,
    errors: &'a mut ErrorCollector,
}

impl PropertyErrors<'_> {
    fn push(&mut self, message: String) {
        let message = self.message.map_or(message, str::to_string);
        self.errors.push(self.key, message);
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

impl<'h> ValidationEngine<'h> {
    pub fn new(hooks: &'h HookRegistry) -> Self {
        Self { hooks }
    }

    /// Validate `data` against `schema`, writing defaults into `data`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotAnObject`] when `data` is not a JSON object; no
    /// property is examined in that case.
    pub fn validate(&self, schema: &CompiledSchema, data: &mut Value) -> Result<Report, DataError> {
        self.hooks.before_validate(data);

        let Value::Object(map) = &mut *data else {
            return Err(DataError::NotAnObject);
        };

        let mut errors = ErrorCollector::new();
        if !schema.is_flex() {
            for key in map.keys().filter(|key| !schema.contains_key(key)) {
                errors.push(key.as_str(), format!("Property {key} not valid in schema"));
            }
        }

        for (key, rule) in schema.iter() {
            self.check_property(schema, map, key, rule, &mut errors);
        }

        tracing::debug!(
            properties = schema.len(),
            errors = errors.len(),
            "validation run finished"
        );
        self.hooks.after_validate(data);
        Ok(Report { errors })
    }

    fn check_property(
        &self,
        schema: &CompiledSchema,
        map: &mut Map<String, Value>,
        key: &str,
        rule: &PropertyRule,
        errors: &mut ErrorCollector,
    ) {
        if let Some(default) = &rule.default {
            if is_absent(map.get(key)) {
                apply_default(map, key, default);
            }
        }

        let mut errors = PropertyErrors {
            key,
            message: rule.message.as_deref(),
            errors,
        };

        if is_absent(map.get(key)) {
            if rule.required {
                errors.push(format!("Missing required property {key}"));
            }
            return;
        }

        if let Some(custom) = &rule.custom {
            let outcome = match map.get(key) {
                Some(value) => custom.call(value, map, schema),
                None => Outcome::Valid,
            };
            match outcome {
                Outcome::Valid => {}
                Outcome::Invalid => errors.push(format!("Custom validation failed for property {key}")),
                Outcome::Message(message) => errors.push(message),
            }
        }

        if let Some(value) = map.get_mut(key) {
            tracing::trace!(key, kind = %ValueKind::of(value), "checking property");
            self.check_type(rule, value, &mut errors);
        }
    }

    fn check_type(&self, rule: &PropertyRule, value: &mut Value, errors: &mut PropertyErrors<'_>) {
        let key = errors.key;
        let kind = ValueKind::of(value);

        match &rule.type_spec {
            TypeSpec::Nested(nested) => match self.validate(nested, value) {
                Ok(report) if report.is_valid() => {}
                Ok(report) => {
                    let prefix = format!("roperty {key}.");
                    let messages = report
                        .flattened()
                        .into_iter()
                        .map(|message| message.replacen("roperty ", &prefix, 1))
                        .collect();
                    errors.errors.push_nested(key, messages);
                }
                Err(DataError::NotAnObject) => {
                    errors.push(format!("Property {key} is {kind}, expected object"));
                }
            },
            TypeSpec::Date => {
                if !is_valid_date(value) {
                    errors.push(format!("Property {key} is not a valid date"));
                }
            }
            TypeSpec::Uuid(version) => {
                if !value.as_str().is_some_and(|s| version.matches(s)) {
                    errors.push(format!("Property {key} is not a valid {version}"));
                }
            }
            TypeSpec::ArrayOf(item) => self.check_array(rule, item.as_deref(), value, errors),
            primitive => {
                let Some(expected) = primitive.category() else {
                    return;
                };
                if kind.as_str() != expected {
                    errors.push(format!("Property {key} is {kind}, expected {expected}"));
                    return;
                }
                match value {
                    Value::String(s) => check_string(rule, s, errors),
                    Value::Number(n) => {
                        if let Some(n) = n.as_f64() {
                            check_number(rule, n, errors);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn check_array(
        &self,
        rule: &PropertyRule,
        item: Option<&TypeSpec>,
        value: &mut Value,
        errors: &mut PropertyErrors<'_>,
    ) {
        let key = errors.key;
        let Value::Array(items) = value else {
            errors.push(format!("Property {key} is {}, expected array", ValueKind::of(value)));
            return;
        };

        let len = items.len() as f64;
        if let Some(min) = rule.min.filter(|&min| len < min) {
            errors.push(format!("Property {key} must contain at least {min} elements"));
        }
        if let Some(max) = rule.max.filter(|&max| len > max) {
            errors.push(format!("Property {key} must contain no more than {max} elements"));
        }

        let Some(item) = item else {
            return;
        };
        // Runs even when a length bound already failed, unlike a max-then-items
        // chain. Every element is visited so nested defaults land on all of them.
        let failures = items
            .iter_mut()
            .fold(0usize, |n, element| n + usize::from(!self.conforms(item, element)));
        if failures == 0 {
            return;
        }

        match item.category() {
            Some(expected) => errors.push(format!(
                "An item in array of property {key} is not valid. All items must be of type {expected}"
            )),
            None => errors.push(format!("An item in array of property {key} is not valid")),
        }
    }

    /// Whether a single array element satisfies the item spec.
    fn conforms(&self, spec: &TypeSpec, value: &mut Value) -> bool {
        match spec {
            TypeSpec::Nested(nested) => self
                .validate(nested, value)
                .is_ok_and(|report| report.is_valid()),
            TypeSpec::Date => is_valid_date(value),
            TypeSpec::Uuid(version) => value.as_str().is_some_and(|s| version.matches(s)),
            TypeSpec::ArrayOf(None) => value.is_array(),
            TypeSpec::ArrayOf(Some(inner)) => match value {
                Value::Array(items) => items
                    .iter_mut()
                    .fold(true, |ok, element| self.conforms(inner, element) && ok),
                _ => false,
            },
            primitive => primitive
                .category()
                .is_some_and(|expected| ValueKind::of(value).as_str() == expected),
        }
    }
}

fn apply_default(map: &mut Map<String, Value>, key: &str, default: &DefaultValue) {
    match default {
        DefaultValue::Literal(value) => {
            map.insert(key.to_string(), value.clone());
        }
        DefaultValue::Producer(producer) => match producer.call() {
            Ok(value) => {
                map.insert(key.to_string(), value);
            }
            Err(error) => tracing::debug!(key, %error, "default producer failed, leaving value unset"),
        },
    }
}

fn check_string(rule: &PropertyRule, s: &str, errors: &mut PropertyErrors<'_>) {
    let key = errors.key;

    if let Some(allowed) = &rule.enum_values {
        if !allowed.iter().any(|candidate| candidate == s) {
            errors.push(format!("Value of property {key} does not contain an acceptable value"));
        }
    }
    if let Some(re) = &rule.regex {
        if !re.is_match(s) {
            errors.push(format!("Regex validation failed for property {key}"));
        }
    }

    let len = s.chars().count() as f64;
    if let Some(min) = rule.min.filter(|&min| len < min) {
        errors.push(format!("Property {key} must contain at least {min} characters"));
    }
    if let Some(max) = rule.max.filter(|&max| len > max) {
        errors.push(format!("Property {key} must contain less than {max} characters"));
    }
}

fn check_number(rule: &PropertyRule, n: f64, errors: &mut PropertyErrors<'_>) {
    let key = errors.key;

    if let Some(min) = rule.min.filter(|&min| n < min) {
        errors.push(format!("Property {key} must be greater than {min}"));
    }
    if let Some(max) = rule.max.filter(|&max| n > max) {
        errors.push(format!("Property {key} must be less than {max}"));
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::compile::SchemaCompiler;
    use crate::decl::{Decl, TypeTag};
    use crate::schema::CompileOptions;
    use proptest::prelude::*;

    fn tag() -> impl Strategy<Value = TypeTag> {
        prop_oneof![
            Just(TypeTag::String),
            Just(TypeTag::Number),
            Just(TypeTag::Boolean),
            Just(TypeTag::Date),
        ]
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(Value::from),
            "[a-z0-9-]{0,12}".prop_map(Value::String),
        ]
    }

    fn declaration() -> impl Strategy<Value = Vec<(String, TypeTag, bool)>> {
        prop::collection::btree_map("[a-e]", (tag(), any::<bool>()), 1..5)
            .prop_map(|m| m.into_iter().map(|(k, (t, r))| (k, t, r)).collect())
    }

    fn build(props: &[(String, TypeTag, bool)]) -> Decl {
        Decl::object(
            props
                .iter()
                .map(|(k, t, r)| (k.clone(), Decl::rule(*t).with("required", *r))),
        )
    }

    fn compile(decl: &Decl) -> CompiledSchema {
        SchemaCompiler::new(&HookRegistry::new())
            .compile(decl, CompileOptions::default())
            .unwrap()
    }

    proptest! {
        #[test]
        fn compiling_twice_accepts_the_same_data(
            props in declaration(),
            data in prop::collection::btree_map("[a-f]", json_leaf(), 0..6),
        ) {
            let decl = build(&props);
            let first = compile(&decl);
            let second = compile(&decl);
            let data: Value = data.into_iter().collect::<Map<_, _>>().into();

            let a = first.validate(&mut data.clone()).unwrap();
            let b = second.validate(&mut data.clone()).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn missing_required_key_yields_exactly_one_error(
            props in declaration(),
            data in prop::collection::btree_map("[a-f]", json_leaf(), 0..6),
        ) {
            let decl = build(&props);
            let schema = compile(&decl);
            let mut data: Value = data.into_iter().collect::<Map<_, _>>().into();
            let missing: Vec<String> = props
                .iter()
                .filter(|(k, _, required)| *required && data.get(k).map_or(true, Value::is_null))
                .map(|(k, _, _)| k.clone())
                .collect();

            let report = schema.validate(&mut data).unwrap();
            for key in missing {
                let records: Vec<_> = report.errors().for_key(&key).collect();
                prop_assert_eq!(records.len(), 1);
                let expected = format!("Missing required property {key}");
                prop_assert!(records[0].message.contains(&expected));
            }
        }
    }
}
