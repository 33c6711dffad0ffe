//! Model definition schema — the typed shape of a config-source document.
//!
//! A document looks like:
//!
//! ```json
//! {
//!   "models": [{
//!     "name": "gpt-4o",
//!     "vendor": "openai",
//!     "pricing": { "prompt_per_million": 2.5, "completion_per_million": 10.0 },
//!     "parameters": {
//!       "temperature": { "min": 0, "max": 2, "default": 0.7 },
//!       "response_format": { "allowed": ["text", "json_object"], "default": "text" }
//!     }
//!   }]
//! }
//! ```
//!
//! Parameter declaration order matters to the sanitizer, so `parameters`
//! deserializes into an order-preserving table rather than a HashMap.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ─────────────────────────────────────────────
// ParameterSchema
// ─────────────────────────────────────────────

/// Constraints for one model parameter.
///
/// Invariant (enforced by fixtures, relied on by the sanitizer): `default`
/// satisfies its own `min`/`max`/`allowed` constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Value used whenever the caller's input is absent or invalid.
    pub default: Value,
    /// Inclusive lower bound for numeric parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Closed set of permitted string values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ParameterSchema {
    /// Schema with only a default (free-form passthrough parameter).
    pub fn with_default(default: Value) -> Self {
        ParameterSchema {
            default,
            min: None,
            max: None,
            allowed: None,
        }
    }

    /// Numeric schema with an inclusive `[min, max]` range.
    pub fn range(default: Value, min: f64, max: f64) -> Self {
        ParameterSchema {
            default,
            min: Some(min),
            max: Some(max),
            allowed: None,
        }
    }

    /// Enumerated schema with a closed allowed set.
    pub fn one_of(default: Value, allowed: &[&str]) -> Self {
        ParameterSchema {
            default,
            min: None,
            max: None,
            allowed: Some(allowed.iter().map(|s| s.to_string()).collect()),
        }
    }
}

// ─────────────────────────────────────────────
// ParameterTable (ordered map of key → schema)
// ─────────────────────────────────────────────

/// The declared parameters of a model, in declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterTable(Vec<(String, ParameterSchema)>);

impl ParameterTable {
    /// Empty table (a model with no constrained parameters).
    pub fn new() -> Self {
        ParameterTable(Vec::new())
    }

    /// Append a parameter declaration. Last declaration wins on duplicate keys.
    pub fn insert(&mut self, key: impl Into<String>, schema: ParameterSchema) {
        let key = key.into();
        self.0.retain(|(k, _)| *k != key);
        self.0.push((key, schema));
    }

    /// Look up a parameter's schema by key.
    pub fn get(&self, key: &str) -> Option<&ParameterSchema> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSchema)> {
        self.0.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ParameterSchema)> for ParameterTable {
    fn from_iter<I: IntoIterator<Item = (String, ParameterSchema)>>(iter: I) -> Self {
        let mut table = ParameterTable::new();
        for (key, schema) in iter {
            table.insert(key, schema);
        }
        table
    }
}

impl Serialize for ParameterTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, schema) in &self.0 {
            map.serialize_entry(key, schema)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ParameterTable;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a map of parameter name to parameter schema")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = ParameterTable::new();
                while let Some((key, schema)) = access.next_entry::<String, ParameterSchema>()? {
                    table.insert(key, schema);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

// ─────────────────────────────────────────────
// ModelDefinition / ModelDocument
// ─────────────────────────────────────────────

/// Per-million-token pricing for a model. Zeros when the source omits it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPricing {
    pub prompt_per_million: f64,
    pub completion_per_million: f64,
}

/// One model as declared by the config source. Immutable after load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model identifier as the vendor knows it.
    pub name: String,
    /// Vendor tag (e.g. `"openai"`, `"anthropic"`, `"custom"`).
    pub vendor: String,
    /// Pricing used by the cost calculator.
    #[serde(default)]
    pub pricing: ModelPricing,
    /// Declared parameters, in declaration order.
    #[serde(default)]
    pub parameters: ParameterTable,
}

/// A config-source document: a batch of model definitions.
#[derive(Clone, Debug, Deserialize)]
pub struct ModelDocument {
    pub models: Vec<ModelDefinition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_table_preserves_declaration_order() {
        let json = json!({
            "response_format": { "allowed": ["text", "json_object"], "default": "text" },
            "temperature": { "min": 0, "max": 2, "default": 0.7 },
            "max_tokens": { "min": 1, "max": 4096, "default": 1024 }
        });

        let table: ParameterTable = serde_json::from_value(json).unwrap();
        let keys: Vec<&str> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["response_format", "temperature", "max_tokens"]);
    }

    #[test]
    fn test_parameter_table_duplicate_last_wins() {
        let mut table = ParameterTable::new();
        table.insert("temperature", ParameterSchema::with_default(json!(0.7)));
        table.insert("temperature", ParameterSchema::with_default(json!(1.0)));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("temperature").unwrap().default, json!(1.0));
    }

    #[test]
    fn test_model_definition_from_json() {
        let json = json!({
            "name": "gpt-4o",
            "vendor": "openai",
            "pricing": { "prompt_per_million": 2.5, "completion_per_million": 10.0 },
            "parameters": {
                "temperature": { "min": 0, "max": 2, "default": 0.7 }
            }
        });

        let def: ModelDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.name, "gpt-4o");
        assert_eq!(def.vendor, "openai");
        assert_eq!(def.pricing.prompt_per_million, 2.5);

        let temp = def.parameters.get("temperature").unwrap();
        assert_eq!(temp.min, Some(0.0));
        assert_eq!(temp.max, Some(2.0));
        assert_eq!(temp.default, json!(0.7));
    }

    #[test]
    fn test_model_definition_pricing_defaults_to_zero() {
        let json = json!({ "name": "local-llm", "vendor": "custom" });
        let def: ModelDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(def.pricing, ModelPricing::default());
        assert!(def.parameters.is_empty());
    }

    #[test]
    fn test_parameter_schema_requires_default() {
        // A parameter with no default is malformed
        let json = json!({ "min": 0, "max": 2 });
        assert!(serde_json::from_value::<ParameterSchema>(json).is_err());
    }

    #[test]
    fn test_parameter_table_round_trip() {
        let mut table = ParameterTable::new();
        table.insert("temperature", ParameterSchema::range(json!(0.7), 0.0, 2.0));
        table.insert(
            "response_format",
            ParameterSchema::one_of(json!("text"), &["text", "json_object"]),
        );

        let json_str = serde_json::to_string(&table).unwrap();
        let back: ParameterTable = serde_json::from_str(&json_str).unwrap();
        assert_eq!(back, table);
    }
}
