use serde::Deserialize;

/// A field as declared in an entity model file.
///
/// `kind` is the scaffolding keyword (`string`, `int`, `manyToOne`, ...);
/// relationship kinds carry the related class in `field_type`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub kind: String,
    #[serde(default, rename = "type")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl FieldInfo {
    pub fn new(name: &str, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            field_type: None,
            hidden: false,
        }
    }

    pub fn with_type(mut self, field_type: &str) -> Self {
        self.field_type = Some(field_type.to_string());
        self
    }
}
