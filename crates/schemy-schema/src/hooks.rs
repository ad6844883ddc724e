//! # Lifecycle Hooks
//!
//! External observers of compilation and validation. A [`Hook`] overrides
//! the events it cares about; every method defaults to a no-op. Hooks are
//! owned by a [`HookRegistry`] that the application builds before compiling
//! anything and hands to the compiler, engine, or [`crate::Schemy`] facade.
//! The core never reads anything back from a hook.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::decl::Decl;
use crate::schema::CompiledSchema;

/// Observer of lifecycle events.
pub trait Hook: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Hooks were added to the registry this hook belongs to.
    fn plugins_initialized(&self, _added: &[Arc<dyn Hook>]) {}

    fn before_parse(&self, _declaration: &Decl) {}

    fn after_parse(&self, _schema: &CompiledSchema) {}

    fn before_validate(&self, _data: &Value) {}

    fn after_validate(&self, _data: &Value) {}

    fn get_validation_errors(&self) {}

    fn get_grouped_validation_errors(&self) {}
}

/// Ordered set of registered hooks.
#[derive(Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one hook.
    pub fn register(&mut self, hook: impl Hook + 'static) {
        self.extend(vec![Arc::new(hook) as Arc<dyn Hook>]);
    }

    /// Register several hooks, then notify every registered hook of the
    /// newly added ones.
    pub fn extend(&mut self, added: Vec<Arc<dyn Hook>>) {
        self.hooks.extend(added.iter().cloned());
        tracing::debug!(added = added.len(), total = self.hooks.len(), "hooks registered");
        for hook in &self.hooks {
            hook.plugins_initialized(&added);
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub(crate) fn before_parse(&self, declaration: &Decl) {
        self.hooks.iter().for_each(|h| h.before_parse(declaration));
    }

    pub(crate) fn after_parse(&self, schema: &CompiledSchema) {
        self.hooks.iter().for_each(|h| h.after_parse(schema));
    }

    pub(crate) fn before_validate(&self, data: &Value) {
        self.hooks.iter().for_each(|h| h.before_validate(data));
    }

    pub(crate) fn after_validate(&self, data: &Value) {
        self.hooks.iter().for_each(|h| h.after_validate(data));
    }

    pub(crate) fn get_validation_errors(&self) {
        self.hooks.iter().for_each(|h| h.get_validation_errors());
    }

    pub(crate) fn get_grouped_validation_errors(&self) {
        self.hooks.iter().for_each(|h| h.get_grouped_validation_errors());
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        label: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Hook for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn plugins_initialized(&self, added: &[Arc<dyn Hook>]) {
            let names: Vec<&str> = added.iter().map(|h| h.name()).collect();
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}:init:{}", self.label, names.join(",")));
        }

        fn before_validate(&self, data: &Value) {
            self.seen.lock().unwrap().push(format!("{}:before:{data}", self.label));
        }
    }

    #[test]
    fn test_empty_registry_is_noop() {
        let registry = HookRegistry::new();
        assert!(registry.is_empty());
        registry.before_validate(&Value::Null);
        registry.get_validation_errors();
    }

    #[test]
    fn test_register_notifies_all_hooks_of_new_ones() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.register(Recorder { label: "a", seen: Arc::clone(&seen) });
        registry.register(Recorder { label: "b", seen: Arc::clone(&seen) });

        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["a:init:a", "a:init:b", "b:init:b"]
        );
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();
        registry.extend(vec![
            Arc::new(Recorder { label: "first", seen: Arc::clone(&seen) }) as Arc<dyn Hook>,
            Arc::new(Recorder { label: "second", seen: Arc::clone(&seen) }) as Arc<dyn Hook>,
        ]);
        seen.lock().unwrap().clear();

        registry.before_validate(&serde_json::json!({"a": 1}));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![r#"first:before:{"a":1}"#, r#"second:before:{"a":1}"#]
        );
    }

    #[test]
    fn test_debug_lists_names() {
        let mut registry = HookRegistry::new();
        registry.register(Recorder { label: "audit", ..Default::default() });
        assert!(format!("{registry:?}").contains("audit"));
    }
}
