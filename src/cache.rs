use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
pub struct Cache {
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub source: String,
    pub hash: String,
    /// Generated file, relative to the output root
    pub output: String,
}

impl Cache {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            entries: HashMap::new(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let cache = Self::from_json(&content)?;

        // Invalidate cache if version mismatch
        if cache.version != env!("CARGO_PKG_VERSION") {
            tracing::info!(found = %cache.version, "cache written by another version, ignoring it");
            return Ok(Self::new());
        }

        Ok(cache)
    }

    pub fn save(&mut self, path: &Path) -> anyhow::Result<()> {
        self.generated_at = Utc::now();
        let json = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cache: Cache = serde_json::from_str(json)?;
        Ok(cache)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        Ok(json)
    }

    pub fn get_entry(&self, entity_name: &str) -> Option<&CacheEntry> {
        self.entries.get(entity_name)
    }

    pub fn set_entry(&mut self, entity_name: &str, source: &str, hash: &str, output: &str) {
        self.entries.insert(
            entity_name.to_string(),
            CacheEntry {
                source: source.to_string(),
                hash: hash.to_string(),
                output: output.to_string(),
            },
        );
    }

    pub fn is_valid(&self, entity_name: &str, current_hash: &str) -> bool {
        self.entries
            .get(entity_name)
            .map(|e| e.hash == current_hash)
            .unwrap_or(false)
    }

    /// Key an entity's entry on its model file plus the settings shared by
    /// every entity (config fingerprint, entity catalog).
    pub fn entry_hash(model_hash: &str, shared: &str) -> String {
        crate::model::compute_hash(&format!("{}|{}", model_hash, shared))
    }

    /// Drop entries for entities that no longer exist in the model.
    pub fn retain_entities(&mut self, live: &[&str]) {
        self.entries.retain(|name, _| live.contains(&name.as_str()));
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
