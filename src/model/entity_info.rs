use super::field_info::FieldInfo;
use serde::Deserialize;

/// Raw entity declaration, either a standalone model file or an
/// `[[entities]]` table in the config.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityDef {
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub name: String,
    pub package: String,
    /// Implicit `id`/`version` first, then declared fields in order
    pub fields: Vec<FieldInfo>,
    pub source_file: String,
    pub file_hash: String,
}

impl EntityInfo {
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}
