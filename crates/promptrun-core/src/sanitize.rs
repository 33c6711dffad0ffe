//! Parameter sanitizer — coerces arbitrary caller input into a complete,
//! schema-valid configuration.
//!
//! The policy is lenient by contract: invalid input is replaced by the schema
//! default, never rejected. Callers always get back a usable configuration,
//! so `sanitize` has no failure path at all.
//!
//! Two parameters are coupled: `json_schema` is carried if and only if
//! `response_format` resolves to `"json_schema"`. The coupling is enforced in
//! three places — the `response_format` branch, the completion pass, and a
//! final consistency sweep — so every interleaving of caller input converges
//! to the same valid map.

use serde_json::Value;
use tracing::warn;

use crate::registry::schema::{ParameterSchema, ParameterTable};
use crate::registry::ModelRegistry;
use crate::types::SanitizedConfig;

const RESPONSE_FORMAT: &str = "response_format";
const JSON_SCHEMA: &str = "json_schema";
const JSON_SCHEMA_MODE: &str = "json_schema";
const TOOLS: &str = "tools";
const EMPTY_JSON_SCHEMA: &str = "{}";

/// Sanitize a raw parameter map against a model's declared schema.
///
/// Schema resolution order: exact `(name, vendor)` registry match, then a
/// dynamically supplied schema (custom-provider lookup). With no schema at
/// all there are no constraints to apply and the raw input is returned
/// unchanged.
///
/// Pure: the output depends only on the schema and the raw input, and the
/// function is idempotent under repeated application.
pub fn sanitize(
    registry: &ModelRegistry,
    model_name: &str,
    vendor: &str,
    raw: &serde_json::Map<String, Value>,
    dynamic_schema: Option<&ParameterTable>,
) -> SanitizedConfig {
    let schema = match registry.find(model_name, vendor) {
        Some(def) => &def.parameters,
        None => match dynamic_schema {
            Some(schema) => schema,
            None => return raw.clone(),
        },
    };

    let mut sanitized = SanitizedConfig::new();

    // Per-key pass, in schema declaration order.
    for (key, spec) in schema.iter() {
        // Fully resolved by the response_format branch below.
        if key == JSON_SCHEMA {
            continue;
        }

        if key == RESPONSE_FORMAT {
            apply_response_format(&mut sanitized, raw, spec);
            continue;
        }

        let Some(value) = raw.get(key) else {
            sanitized.insert(key.to_string(), spec.default.clone());
            continue;
        };

        if key == TOOLS {
            // Tools must be a list; anything else falls back to the default.
            let value = if value.is_array() {
                value.clone()
            } else {
                warn!(parameter = key, "non-list tools value replaced by default");
                spec.default.clone()
            };
            sanitized.insert(key.to_string(), value);
            continue;
        }

        if let Some(allowed) = &spec.allowed {
            let member = value
                .as_str()
                .is_some_and(|s| allowed.iter().any(|a| a == s));
            if member {
                sanitized.insert(key.to_string(), value.clone());
            } else {
                warn!(parameter = key, "value outside allowed set replaced by default");
                sanitized.insert(key.to_string(), spec.default.clone());
            }
            continue;
        }

        if spec.min.is_some() || spec.max.is_some() {
            let in_range = value.as_f64().is_some_and(|n| {
                spec.min.is_none_or(|min| n >= min) && spec.max.is_none_or(|max| n <= max)
            });
            if in_range {
                sanitized.insert(key.to_string(), value.clone());
            } else {
                warn!(parameter = key, "out-of-range value replaced by default");
                sanitized.insert(key.to_string(), spec.default.clone());
            }
            continue;
        }

        // Unconstrained parameter: pass the raw value through unchanged.
        sanitized.insert(key.to_string(), value.clone());
    }

    // Completion pass: every schema-declared parameter still missing gets its
    // default. json_schema's default applies only when response_format
    // resolves to the json_schema mode.
    for (key, spec) in schema.iter() {
        if sanitized.contains_key(key) {
            continue;
        }
        if key == JSON_SCHEMA {
            if resolved_response_format(&sanitized, raw, schema).as_deref()
                == Some(JSON_SCHEMA_MODE)
            {
                sanitized.insert(key.to_string(), spec.default.clone());
            }
            continue;
        }
        sanitized.insert(key.to_string(), spec.default.clone());
    }

    // Final consistency pass: a non-json_schema format never carries a schema.
    if let Some(format) = sanitized.get(RESPONSE_FORMAT).and_then(Value::as_str) {
        if format != JSON_SCHEMA_MODE {
            sanitized.remove(JSON_SCHEMA);
        }
    }

    sanitized
}

/// Resolve `response_format` and its coupled `json_schema` key.
///
/// The format is validated against the allowed set (default on anything
/// invalid or absent). `"json_schema"` keeps a caller-supplied non-empty
/// schema string verbatim — its contents are never parsed or validated here —
/// or falls back to the literal `"{}"`. Every other format drops
/// `json_schema` entirely.
fn apply_response_format(
    sanitized: &mut SanitizedConfig,
    raw: &serde_json::Map<String, Value>,
    spec: &ParameterSchema,
) {
    let format = raw
        .get(RESPONSE_FORMAT)
        .and_then(Value::as_str)
        .filter(|s| {
            spec.allowed
                .as_ref()
                .is_none_or(|allowed| allowed.iter().any(|a| a == s))
        })
        .map(str::to_string)
        .unwrap_or_else(|| spec.default.as_str().unwrap_or_default().to_string());

    sanitized.insert(RESPONSE_FORMAT.to_string(), Value::String(format.clone()));

    if format == JSON_SCHEMA_MODE {
        let payload = raw
            .get(JSON_SCHEMA)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(EMPTY_JSON_SCHEMA);
        sanitized.insert(JSON_SCHEMA.to_string(), Value::String(payload.to_string()));
    } else {
        sanitized.remove(JSON_SCHEMA);
    }
}

/// The `response_format` a `json_schema` default decision should look at:
/// sanitized output so far, else raw input, else the format's own default.
fn resolved_response_format(
    sanitized: &SanitizedConfig,
    raw: &serde_json::Map<String, Value>,
    schema: &ParameterTable,
) -> Option<String> {
    sanitized
        .get(RESPONSE_FORMAT)
        .and_then(Value::as_str)
        .or_else(|| raw.get(RESPONSE_FORMAT).and_then(Value::as_str))
        .or_else(|| {
            schema
                .get(RESPONSE_FORMAT)
                .and_then(|spec| spec.default.as_str())
        })
        .map(str::to_string)
}
