//! # Body Projection
//!
//! Derives the output object of a validated payload: optionally drops keys
//! the schema does not declare, and optionally reorders the rest so declared
//! keys come first in declaration order.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::schema::CompiledSchema;

/// How [`project`] shapes the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BodyOptions {
    /// Keep undeclared keys even when the schema is flexible.
    pub include_all: bool,
    /// Put declared keys first, in declaration order.
    pub order_body: bool,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            include_all: false,
            order_body: true,
        }
    }
}

/// Project `data` through `schema`.
///
/// Undeclared keys are only removed for flexible schemas; a strict schema
/// that validated successfully has none. Extra keys that survive are
/// appended after the declared ones in their original order.
pub fn project(data: &Map<String, Value>, schema: &CompiledSchema, options: BodyOptions) -> Map<String, Value> {
    let filtered: Map<String, Value> = if schema.is_flex() && !options.include_all {
        data.iter()
            .filter(|(key, _)| schema.contains_key(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    } else {
        data.clone()
    };

    if !options.order_body {
        return filtered;
    }

    let declared = schema
        .keys()
        .filter_map(|key| filtered.get(key).map(|value| (key.to_string(), value.clone())));
    let extras = filtered
        .iter()
        .filter(|(key, _)| !schema.contains_key(key))
        .map(|(key, value)| (key.clone(), value.clone()));

    declared.chain(extras).collect()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::compile::SchemaCompiler;
    use crate::decl::{Decl, TypeTag};
    use crate::hooks::HookRegistry;
    use crate::schema::CompileOptions;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn ordered_body_lists_declared_keys_first(
            declared in prop::collection::hash_set("[a-h]", 1..6),
            present in prop::collection::vec(("[a-l]", any::<i32>()), 0..10),
        ) {
            let declared: Vec<String> = declared.into_iter().collect();
            let decl = Decl::object(declared.iter().map(|k| (k.clone(), Decl::rule(TypeTag::Number))));
            let schema = SchemaCompiler::new(&HookRegistry::new())
                .compile(&decl, CompileOptions { strict: false })
                .unwrap();

            let data: Map<String, Value> = present.into_iter().map(|(k, v)| (k, Value::from(v))).collect();
            let options = BodyOptions { include_all: true, order_body: true };
            let out = project(&data, &schema, options);

            let expected_declared: Vec<&str> = schema.keys().filter(|k| data.contains_key(*k)).collect();
            let expected_extra: Vec<&str> = data.keys().map(String::as_str).filter(|k| !schema.contains_key(k)).collect();
            let expected: Vec<&str> = expected_declared.into_iter().chain(expected_extra).collect();
            let actual: Vec<&str> = out.keys().map(String::as_str).collect();
            prop_assert_eq!(actual, expected);
            prop_assert_eq!(out.len(), data.len());
        }
    }
}
