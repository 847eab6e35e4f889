//! Named format predicates, injected into the engine at construction.
//!
//! A registry is a plain mapping; there is no process-wide instance. Build an
//! empty one with [`FormatRegistry::new`] or start from the built-in set with
//! [`FormatRegistry::standard`] and `register` on top.
pub mod formats;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A pure, total predicate over one value.
pub type FormatFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone, Default)]
pub struct FormatRegistry {
    // BTreeMap keeps `names()` sorted for listing.
    entries: BTreeMap<String, FormatFn>,
}

impl FormatRegistry {
    /// Empty registry: every `format` constraint fails as unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with [`formats::BUILTIN`].
    pub fn standard() -> Self {
        let mut out = Self::new();
        for &(name, check) in formats::BUILTIN {
            out.register(name, check);
        }
        out
    }

    /// Add or replace a predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, check: F) -> &mut Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.entries.insert(name.into(), Arc::new(check));
        self
    }

    pub fn with<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.register(name, check);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&FormatFn> {
        self.entries.get(name)
    }

    /// `None` when the name is not registered.
    pub fn check(&self, name: &str, value: &Value) -> Option<bool> {
        self.lookup(name).map(|f| f(value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_registry_misses_everything() {
        let reg = FormatRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.lookup("email").is_none());
        assert_eq!(reg.check("email", &json!("a@b.co")), None);
    }

    #[test]
    fn standard_registry_has_reference_formats() {
        let reg = FormatRegistry::standard();
        for name in ["email", "phone", "uuid", "jwt", "gstin", "latitude"] {
            assert!(reg.lookup(name).is_some(), "missing {name}");
        }
        assert_eq!(reg.len(), formats::BUILTIN.len());
        let names: Vec<&str> = reg.names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn register_overrides_and_extends() {
        let reg = FormatRegistry::standard()
            .with("email", |_| true)
            .with("even", |v| v.as_i64().is_some_and(|n| n % 2 == 0));
        assert_eq!(reg.check("email", &json!("nope")), Some(true));
        assert_eq!(reg.check("even", &json!(4)), Some(true));
        assert_eq!(reg.check("even", &json!(3)), Some(false));
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FormatRegistry>();
    }
}
