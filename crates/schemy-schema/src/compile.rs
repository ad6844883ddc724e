//! # Schema Compiler
//!
//! Turns a raw [`Decl`] into a [`CompiledSchema`], rejecting malformed
//! declarations. Compilation is all-or-nothing: the first violation aborts
//! with a [`SchemaError`] and no partial schema escapes.
//!
//! ## Per-property grammar
//!
//! 1. A bare type (`TypeTag` or array) is shorthand for `{type, required: true}`.
//! 2. An object without a `type` key is a nested schema declaration. A
//!    boolean `required` and a validator `custom` are lifted off as the
//!    property's own flag and validator; everything else is compiled
//!    recursively. Failures are narrowed to "Could not parse property".
//! 3. An object with a `type` key is a rule. The type resolves to a tag, a
//!    `uuid/*` keyword, an array of at most one item type, or a nested schema.
//! 4. Rule attributes are checked: `regex` must be a pattern, `custom` a
//!    validator, `min`/`max` numbers, `enum` a list of strings, and `regex`
//!    and `enum` only appear on `String` properties.
//!
//! An already-compiled schema is accepted as-is and never re-normalized.

use schemy_core::{SchemaError, UuidVersion};

use crate::decl::Decl;
use crate::hooks::HookRegistry;
use crate::schema::{CompileOptions, CompiledSchema, DefaultValue, PropertyRule, TypeSpec};

/// Compiles declarations, dispatching parse hooks along the way.
#[derive(Debug, Clone, Copy)]
pub struct SchemaCompiler<'h> {
    hooks: &'h HookRegistry,
}

impl<'h> SchemaCompiler<'h> {
    pub fn new(hooks: &'h HookRegistry) -> Self {
        Self { hooks }
    }

    /// Compile a declaration.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, in declaration order.
    pub fn compile(&self, decl: &Decl, options: CompileOptions) -> Result<CompiledSchema, SchemaError> {
        self.hooks.before_parse(decl);

        let flex = !options.strict;
        let schema = match decl {
            Decl::Compiled(schema) => {
                tracing::debug!("declaration already compiled, skipping normalization");
                schema.with_flex(flex)
            }
            Decl::Object(entries) => {
                let properties = entries
                    .iter()
                    .map(|(key, value)| Ok((key.clone(), self.compile_property(key, value)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?;
                CompiledSchema::from_properties(properties, flex)
            }
            other => {
                return Err(SchemaError::UnsupportedDeclaration {
                    key: "<root>".to_string(),
                    found: other.kind_name().to_string(),
                })
            }
        };

        tracing::debug!(properties = schema.len(), flex, "schema compiled");
        self.hooks.after_parse(&schema);
        Ok(schema)
    }

    fn compile_property(&self, key: &str, decl: &Decl) -> Result<PropertyRule, SchemaError> {
        match decl {
            Decl::Type(_) | Decl::List(_) => {
                let mut rule = PropertyRule::new(self.resolve_type(key, decl)?);
                rule.required = true;
                Ok(rule)
            }
            Decl::Object(entries) if decl.get("type").is_some() => self.compile_rule(key, entries),
            Decl::Object(entries) => self.compile_implicit_nested(key, entries),
            Decl::Compiled(schema) => Ok(PropertyRule::new(TypeSpec::Nested(schema.clone()))),
            other => Err(SchemaError::UnsupportedDeclaration {
                key: key.to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }

    fn compile_implicit_nested(&self, key: &str, entries: &[(String, Decl)]) -> Result<PropertyRule, SchemaError> {
        let mut required = false;
        let mut custom = None;
        let mut properties = Vec::with_capacity(entries.len());

        for (name, value) in entries {
            match (name.as_str(), value) {
                ("required", Decl::Bool(flag)) => required = *flag,
                ("custom", Decl::Validator(validator)) => custom = Some(validator.clone()),
                _ => properties.push((name.clone(), value.clone())),
            }
        }

        let nested = self.compile_nested(key, &Decl::Object(properties))?;
        let mut rule = PropertyRule::new(TypeSpec::Nested(nested));
        rule.required = required;
        rule.custom = custom;
        Ok(rule)
    }

    fn compile_nested(&self, key: &str, decl: &Decl) -> Result<CompiledSchema, SchemaError> {
        self.compile(decl, CompileOptions::default())
            .map_err(|source| SchemaError::NestedSchema {
                key: key.to_string(),
                source: Box::new(source),
            })
    }

    fn compile_rule(&self, key: &str, entries: &[(String, Decl)]) -> Result<PropertyRule, SchemaError> {
        let type_decl = entries
            .iter()
            .find(|(name, _)| name == "type")
            .map(|(_, value)| value);
        let type_spec = self.resolve_type(key, type_decl.unwrap_or(&Decl::Null))?;

        let declares = |attr: &str| {
            entries
                .iter()
                .any(|(name, value)| name == attr && !matches!(value, Decl::Null))
        };
        if !matches!(type_spec, TypeSpec::String) && (declares("regex") || declares("enum")) {
            return Err(SchemaError::StringOnlyConstraint { key: key.to_string() });
        }

        let mut rule = PropertyRule::new(type_spec);
        for (attr, value) in entries {
            if attr == "type" || matches!(value, Decl::Null) {
                continue;
            }
            match attr.as_str() {
                "required" => match value {
                    Decl::Bool(flag) => rule.required = *flag,
                    _ => return Err(SchemaError::RequiredNotBool { key: key.to_string() }),
                },
                "custom" => match value {
                    Decl::Validator(validator) => rule.custom = Some(validator.clone()),
                    other => {
                        return Err(SchemaError::CustomNotCallable {
                            key: key.to_string(),
                            found: other.kind_name().to_string(),
                        })
                    }
                },
                "regex" => match value {
                    Decl::Pattern(re) => rule.regex = Some(re.clone()),
                    _ => return Err(SchemaError::RegexNotPattern { key: key.to_string() }),
                },
                "enum" => rule.enum_values = Some(enum_strings(key, value)?),
                "min" => rule.min = Some(bound(key, "min", value)?),
                "max" => rule.max = Some(bound(key, "max", value)?),
                "default" => rule.default = default_value(key, value),
                "message" => match value {
                    Decl::Str(message) => rule.message = Some(message.clone()),
                    _ => return Err(SchemaError::MessageNotString { key: key.to_string() }),
                },
                unknown => tracing::warn!(key, attribute = unknown, "ignoring unknown rule attribute"),
            }
        }

        Ok(rule)
    }

    fn resolve_type(&self, key: &str, type_decl: &Decl) -> Result<TypeSpec, SchemaError> {
        match type_decl {
            Decl::Type(tag) => Ok(TypeSpec::from(*tag)),
            Decl::Str(keyword) => UuidVersion::from_keyword(keyword)
                .map(TypeSpec::Uuid)
                .ok_or_else(|| SchemaError::UnsupportedType {
                    key: key.to_string(),
                    found: keyword.clone(),
                }),
            Decl::List(items) => match items.as_slice() {
                [] => Ok(TypeSpec::ArrayOf(None)),
                [item] => Ok(TypeSpec::ArrayOf(Some(Box::new(self.resolve_item(key, item)?)))),
                _ => Err(SchemaError::MultiTypeArray { key: key.to_string() }),
            },
            Decl::Object(_) => Ok(TypeSpec::Nested(self.compile_nested(key, type_decl)?)),
            Decl::Compiled(schema) => Ok(TypeSpec::Nested(schema.clone())),
            other => Err(SchemaError::UnsupportedType {
                key: key.to_string(),
                found: other.kind_name().to_string(),
            }),
        }
    }

    /// Array item types compile schema-shaped items in place; their errors
    /// are not narrowed.
    fn resolve_item(&self, key: &str, item: &Decl) -> Result<TypeSpec, SchemaError> {
        match item {
            Decl::Object(_) => Ok(TypeSpec::Nested(self.compile(item, CompileOptions::default())?)),
            other => self.resolve_type(key, other),
        }
    }
}

fn enum_strings(key: &str, value: &Decl) -> Result<Vec<String>, SchemaError> {
    let not_strings = || SchemaError::EnumNotStrings { key: key.to_string() };
    match value {
        Decl::List(items) => items
            .iter()
            .map(|item| match item {
                Decl::Str(s) => Ok(s.clone()),
                _ => Err(not_strings()),
            })
            .collect(),
        _ => Err(not_strings()),
    }
}

fn bound(key: &str, name: &'static str, value: &Decl) -> Result<f64, SchemaError> {
    match value {
        Decl::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| SchemaError::BoundNotNumber {
        key: key.to_string(),
        bound: name,
    })
}

/// Only string and number literals and producers are usable defaults.
fn default_value(key: &str, value: &Decl) -> Option<DefaultValue> {
    match value {
        Decl::Str(s) => Some(DefaultValue::Literal(s.clone().into())),
        Decl::Number(n) => Some(DefaultValue::Literal(n.clone().into())),
        Decl::Producer(producer) => Some(DefaultValue::Producer(producer.clone())),
        other => {
            tracing::warn!(key, found = other.kind_name(), "ignoring default of unsupported shape");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{Producer, TypeTag, Validator};
    use regex::Regex;

    fn compile(decl: Decl) -> Result<CompiledSchema, SchemaError> {
        SchemaCompiler::new(&HookRegistry::new()).compile(&decl, CompileOptions::default())
    }

    fn compile_err(decl: Decl) -> String {
        compile(decl).unwrap_err().to_string()
    }

    #[test]
    fn test_shorthand_is_required() {
        let schema = compile(Decl::object([("title", TypeTag::String)])).unwrap();
        let rule = schema.get("title").unwrap();
        assert!(rule.required);
        assert!(matches!(rule.type_spec, TypeSpec::String));
    }

    #[test]
    fn test_array_shorthand_is_required() {
        let schema = compile(Decl::object([("tags", Decl::list([TypeTag::String]))])).unwrap();
        let rule = schema.get("tags").unwrap();
        assert!(rule.required);
        assert!(matches!(
            rule.type_spec,
            TypeSpec::ArrayOf(Some(ref inner)) if matches!(**inner, TypeSpec::String)
        ));
    }

    #[test]
    fn test_rule_defaults_to_optional() {
        let schema = compile(Decl::object([("title", Decl::rule(TypeTag::String))])).unwrap();
        assert!(!schema.get("title").unwrap().required);
    }

    #[test]
    fn test_regex_on_non_string_rejected() {
        let decl = Decl::object([(
            "title",
            Decl::rule(TypeTag::Number).with("regex", Regex::new("^[a-z]+$").unwrap()),
        )]);
        assert_eq!(
            compile_err(decl),
            "Invalid schema for title: regex and enum can be set only for strings"
        );
    }

    #[test]
    fn test_enum_on_non_string_rejected() {
        let decl = Decl::object([("title", Decl::rule(TypeTag::Number).with("enum", vec!["value"]))]);
        assert_eq!(
            compile_err(decl),
            "Invalid schema for title: regex and enum can be set only for strings"
        );
    }

    #[test]
    fn test_regex_as_string_rejected() {
        let decl = Decl::object([("title", Decl::rule(TypeTag::String).with("regex", "not a regex"))]);
        assert_eq!(
            compile_err(decl),
            "Invalid schema for title: regex must be an instance of Regex"
        );
    }

    #[test]
    fn test_custom_not_callable_cites_category() {
        let decl = Decl::object([("title", Decl::rule(TypeTag::String).with("custom", "string"))]);
        assert_eq!(
            compile_err(decl),
            "Custom validator for title must be a function, was string"
        );
    }

    #[test]
    fn test_unsupported_keyword_rejected() {
        let decl = Decl::object([("title", Decl::rule("not_supported"))]);
        assert_eq!(compile_err(decl), "Unsupported type on title: not_supported");
    }

    #[test]
    fn test_unsupported_type_value_names_category() {
        let decl = Decl::object([("title", Decl::rule(42))]);
        assert_eq!(compile_err(decl), "Unsupported type on title: number");
    }

    #[test]
    fn test_multi_type_array_rejected() {
        let decl = Decl::object([("title", Decl::rule(Decl::list([TypeTag::String, TypeTag::Number])))]);
        assert_eq!(
            compile_err(decl),
            "Invalid schema for title. Array items must be declared of any type, or just one type: [String], [Number]"
        );
    }

    #[test]
    fn test_bounds_must_be_numbers() {
        let decl = Decl::object([("age", Decl::rule(TypeTag::Number).with("min", "4"))]);
        assert_eq!(compile_err(decl), "Invalid schema for age: min property must be a number");

        let decl = Decl::object([("age", Decl::rule(TypeTag::Number).with("max", "4"))]);
        assert_eq!(compile_err(decl), "Invalid schema for age: max property must be a number");
    }

    #[test]
    fn test_enum_must_be_strings() {
        let decl = Decl::object([("kind", Decl::rule(TypeTag::String).with("enum", vec![1, 2]))]);
        assert!(matches!(compile(decl), Err(SchemaError::EnumNotStrings { .. })));
    }

    #[test]
    fn test_malformed_implicit_nested_is_narrowed() {
        let decl = Decl::object([(
            "data",
            Decl::object([("title", Decl::rule(Decl::list([TypeTag::String, TypeTag::Number])))]),
        )]);
        let err = compile(decl).unwrap_err();
        assert_eq!(err.to_string(), "Could not parse property data as schema");
        assert!(matches!(err.root_cause(), SchemaError::MultiTypeArray { key } if key == "title"));
    }

    #[test]
    fn test_malformed_nested_type_is_narrowed() {
        let decl = Decl::object([(
            "data",
            Decl::rule(Decl::object([("title", Decl::rule("bogus"))])),
        )]);
        assert_eq!(compile_err(decl), "Could not parse property data as schema");
    }

    #[test]
    fn test_malformed_array_item_schema_propagates_raw() {
        let decl = Decl::object([(
            "items",
            Decl::rule(Decl::list([Decl::object([("title", Decl::rule("bogus"))])])),
        )]);
        assert_eq!(compile_err(decl), "Unsupported type on title: bogus");
    }

    #[test]
    fn test_implicit_nested_lifts_required_and_custom() {
        let decl = Decl::object([(
            "child",
            Decl::object([
                ("title", Decl::rule(TypeTag::String).with("required", true)),
                ("required", Decl::from(true)),
                ("custom", Decl::from(Validator::new(|_, _, _| true))),
            ]),
        )]);
        let schema = compile(decl).unwrap();
        let rule = schema.get("child").unwrap();
        assert!(rule.required);
        assert!(rule.custom.is_some());
        match &rule.type_spec {
            TypeSpec::Nested(child) => assert_eq!(child.keys().collect::<Vec<_>>(), vec!["title"]),
            other => panic!("expected nested schema, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_schemas_are_strict() {
        let decl = Decl::object([("child", Decl::object([("title", TypeTag::String)]))]);
        let schema = SchemaCompiler::new(&HookRegistry::new())
            .compile(&decl, CompileOptions { strict: false })
            .unwrap();
        assert!(schema.is_flex());
        match &schema.get("child").unwrap().type_spec {
            TypeSpec::Nested(child) => assert!(!child.is_flex()),
            other => panic!("expected nested schema, got {other:?}"),
        }
    }

    #[test]
    fn test_uuid_keywords() {
        let decl = Decl::object([("a", Decl::rule("uuid/v1")), ("b", Decl::rule("uuid/v4"))]);
        let schema = compile(decl).unwrap();
        assert!(matches!(schema.get("a").unwrap().type_spec, TypeSpec::Uuid(UuidVersion::V1)));
        assert!(matches!(schema.get("b").unwrap().type_spec, TypeSpec::Uuid(UuidVersion::V4)));
    }

    #[test]
    fn test_empty_array_means_any_type() {
        let decl = Decl::object([("anything", Decl::rule(Decl::List(Vec::new())))]);
        let schema = compile(decl).unwrap();
        assert!(matches!(schema.get("anything").unwrap().type_spec, TypeSpec::ArrayOf(None)));
    }

    #[test]
    fn test_array_of_schema_compiled_in_place() {
        let decl = Decl::object([(
            "items",
            Decl::rule(Decl::list([Decl::object([("name", TypeTag::String)])])),
        )]);
        let schema = compile(decl).unwrap();
        match &schema.get("items").unwrap().type_spec {
            TypeSpec::ArrayOf(Some(inner)) => assert!(matches!(**inner, TypeSpec::Nested(_))),
            other => panic!("expected array of schema, got {other:?}"),
        }
    }

    #[test]
    fn test_compiled_declaration_not_renormalized() {
        let inner = compile(Decl::object([("name", TypeTag::String)])).unwrap();
        let again = SchemaCompiler::new(&HookRegistry::new())
            .compile(&Decl::from(inner.clone()), CompileOptions { strict: false })
            .unwrap();
        assert!(again.is_flex());
        assert_eq!(again.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_default_shapes() {
        let decl = Decl::object([
            ("a", Decl::rule(TypeTag::String).with("default", "x")),
            ("b", Decl::rule(TypeTag::Number).with("default", 3)),
            ("c", Decl::rule(TypeTag::String).with("default", Producer::new(|| "made"))),
            ("d", Decl::rule(TypeTag::Boolean).with("default", true)),
        ]);
        let schema = compile(decl).unwrap();
        assert!(matches!(schema.get("a").unwrap().default, Some(DefaultValue::Literal(_))));
        assert!(matches!(schema.get("b").unwrap().default, Some(DefaultValue::Literal(_))));
        assert!(matches!(schema.get("c").unwrap().default, Some(DefaultValue::Producer(_))));
        assert!(schema.get("d").unwrap().default.is_none());
    }

    #[test]
    fn test_null_attributes_are_unset() {
        let decl = Decl::object([(
            "n",
            Decl::rule(TypeTag::Number).with("regex", Decl::Null).with("min", Decl::Null),
        )]);
        let schema = compile(decl).unwrap();
        assert!(schema.get("n").unwrap().min.is_none());
    }

    #[test]
    fn test_non_object_root_rejected() {
        assert!(matches!(
            compile(Decl::from("nope")),
            Err(SchemaError::UnsupportedDeclaration { .. })
        ));
    }

    #[test]
    fn test_unsupported_property_declaration_rejected() {
        let decl = Decl::object([("flag", Decl::from(true))]);
        assert_eq!(compile_err(decl), "Invalid schema for flag: unsupported declaration boolean");
    }
}
