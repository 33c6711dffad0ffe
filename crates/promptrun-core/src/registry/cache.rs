//! Default-model cache — a lazily filled, explicitly invalidated slot.
//!
//! The "default model" lookup is hot and its answer changes only when an
//! operator edits the configuration, so it is cached once and cleared only by
//! an explicit `invalidate` call (no TTL). The cache is an object passed by
//! reference to whoever needs it, never module-level mutable state, so tests
//! can reset it deterministically.

use std::sync::{Arc, RwLock};

use super::schema::ModelDefinition;

/// Single-slot cache for the default model definition.
#[derive(Debug, Default)]
pub struct DefaultModelCache {
    slot: RwLock<Option<Arc<ModelDefinition>>>,
}

impl DefaultModelCache {
    pub fn new() -> Self {
        DefaultModelCache {
            slot: RwLock::new(None),
        }
    }

    /// Return the cached definition, resolving and filling the slot on first
    /// use. `resolve` returning `None` leaves the slot empty, so the next
    /// call retries.
    pub fn get_or_resolve<F>(&self, resolve: F) -> Option<Arc<ModelDefinition>>
    where
        F: FnOnce() -> Option<ModelDefinition>,
    {
        if let Some(cached) = self.slot.read().expect("cache lock poisoned").as_ref() {
            return Some(cached.clone());
        }

        let resolved = resolve().map(Arc::new);
        if let Some(ref def) = resolved {
            let mut slot = self.slot.write().expect("cache lock poisoned");
            // Another run may have filled the slot meanwhile; keep the winner.
            if let Some(existing) = slot.as_ref() {
                return Some(existing.clone());
            }
            *slot = Some(def.clone());
        }
        resolved
    }

    /// Clear the slot; the next `get_or_resolve` resolves afresh.
    pub fn invalidate(&self) {
        *self.slot.write().expect("cache lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(name: &str) -> ModelDefinition {
        serde_json::from_value(json!({ "name": name, "vendor": "openai" })).unwrap()
    }

    #[test]
    fn test_resolves_once_then_caches() {
        let cache = DefaultModelCache::new();
        let mut calls = 0;

        let first = cache.get_or_resolve(|| {
            calls += 1;
            Some(def("gpt-4o"))
        });
        let second = cache.get_or_resolve(|| {
            calls += 1;
            Some(def("other"))
        });

        assert_eq!(calls, 1);
        assert_eq!(first.unwrap().name, "gpt-4o");
        assert_eq!(second.unwrap().name, "gpt-4o");
    }

    #[test]
    fn test_invalidate_forces_re_resolution() {
        let cache = DefaultModelCache::new();
        cache.get_or_resolve(|| Some(def("gpt-4o")));
        cache.invalidate();

        let after = cache.get_or_resolve(|| Some(def("gpt-4o-mini")));
        assert_eq!(after.unwrap().name, "gpt-4o-mini");
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let cache = DefaultModelCache::new();
        assert!(cache.get_or_resolve(|| None).is_none());

        // Next call retries and can succeed
        let retry = cache.get_or_resolve(|| Some(def("gpt-4o")));
        assert_eq!(retry.unwrap().name, "gpt-4o");
    }
}
