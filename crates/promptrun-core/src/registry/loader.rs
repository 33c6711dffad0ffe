//! Registry loader — reads model-definition documents from a config source.
//!
//! Loading is lenient end to end: a document that fails schema validation is
//! skipped with a warning, and the process never fails to start because of
//! one bad document. Only the directory read itself is fatal.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, warn};

use super::schema::ModelDocument;
use super::ModelRegistry;

impl ModelRegistry {
    /// Build a registry from already-parsed JSON documents.
    ///
    /// Each document must match [`ModelDocument`]; ones that don't are
    /// skipped with a warning.
    pub fn from_documents(documents: Vec<serde_json::Value>) -> Self {
        let mut registry = ModelRegistry::new();

        for (index, doc) in documents.into_iter().enumerate() {
            match serde_json::from_value::<ModelDocument>(doc) {
                Ok(parsed) => {
                    for def in parsed.models {
                        debug!(model = %def.name, vendor = %def.vendor, "registered model");
                        registry.insert(def);
                    }
                }
                Err(e) => {
                    warn!(document = index, error = %e, "skipping malformed model document");
                }
            }
        }

        registry
    }

    /// Load every `.json` document in a directory.
    ///
    /// Unreadable or unparsable files are skipped with a warning.
    pub fn load_dir(dir: &Path) -> anyhow::Result<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read model config directory {}", dir.display()))?;

        let mut documents = Vec::new();
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unreadable model document");
                    continue;
                }
            };
            match serde_json::from_str::<serde_json::Value>(&content) {
                Ok(value) => documents.push(value),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping unparsable model document");
                }
            }
        }

        Ok(ModelRegistry::from_documents(documents))
    }
}
