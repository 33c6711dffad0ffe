//! Model registry — static per-vendor model definitions and their lookup.
//!
//! Definitions come from a config source of JSON documents (see [`loader`]),
//! are read-mostly after load, and are safe to share across concurrent runs.

pub mod cache;
pub mod loader;
pub mod schema;

pub use cache::DefaultModelCache;
pub use schema::{ModelDefinition, ModelDocument, ModelPricing, ParameterSchema, ParameterTable};

/// Lookup table of model definitions, keyed by `(name, vendor)`.
#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Vec<ModelDefinition>,
}

impl ModelRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        ModelRegistry { models: Vec::new() }
    }

    /// Exact match by `(name, vendor)`.
    pub fn find(&self, name: &str, vendor: &str) -> Option<&ModelDefinition> {
        self.models
            .iter()
            .find(|m| m.name == name && m.vendor == vendor)
    }

    /// All definitions, in load order.
    pub fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Insert one definition. The first `(name, vendor)` entry wins;
    /// duplicates are dropped with a warning.
    pub(crate) fn insert(&mut self, def: ModelDefinition) {
        if self.find(&def.name, &def.vendor).is_some() {
            tracing::warn!(
                model = %def.name,
                vendor = %def.vendor,
                "duplicate model definition ignored"
            );
            return;
        }
        self.models.push(def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(name: &str, vendor: &str) -> ModelDefinition {
        serde_json::from_value(json!({ "name": name, "vendor": vendor })).unwrap()
    }

    #[test]
    fn test_find_exact_match() {
        let mut registry = ModelRegistry::new();
        registry.insert(def("gpt-4o", "openai"));
        registry.insert(def("claude-sonnet-4", "anthropic"));

        assert!(registry.find("gpt-4o", "openai").is_some());
        assert!(registry.find("gpt-4o", "anthropic").is_none());
        assert!(registry.find("nope", "openai").is_none());
    }

    #[test]
    fn test_duplicate_first_wins() {
        let mut registry = ModelRegistry::new();
        let mut first = def("gpt-4o", "openai");
        first.pricing.prompt_per_million = 2.5;
        registry.insert(first);
        registry.insert(def("gpt-4o", "openai"));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.find("gpt-4o", "openai").unwrap().pricing.prompt_per_million,
            2.5
        );
    }
}
