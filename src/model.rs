pub mod entity_info;
pub mod field_info;

pub use entity_info::{EntityDef, EntityInfo};
pub use field_info::FieldInfo;

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static JAVA_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("valid identifier regex"));

static JAVA_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][A-Za-z0-9_$]*)(\.[A-Za-z_$][A-Za-z0-9_$]*)*$")
        .expect("valid package regex")
});

const JAVA_KEYWORDS: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "const", "continue", "default", "do", "double", "else", "enum", "extends", "false", "final",
    "finally", "float", "for", "goto", "if", "implements", "import", "instanceof", "int",
    "interface", "long", "native", "new", "null", "package", "private", "protected", "public",
    "return", "short", "static", "strictfp", "super", "switch", "synchronized", "this", "throw",
    "throws", "transient", "true", "try", "void", "volatile", "while",
];

/// Locals and parameters of the generated `getSearchPredicates` method.
const GENERATED_LOCALS: &[&str] = &["builder", "root", "search", "predicatesList"];

/// Simple names the generated class uses unqualified.
const GENERATED_TYPES: &[&str] = &[
    "ArrayList",
    "List",
    "CriteriaBuilder",
    "Predicate",
    "Root",
    "String",
];

/// Loads entity model files into `EntityInfo`s.
pub struct ModelLoader {
    default_package: String,
}

impl ModelLoader {
    pub fn new(default_package: &str) -> Self {
        Self {
            default_package: default_package.to_string(),
        }
    }

    pub fn load_file(&self, path: &Path) -> Result<EntityInfo> {
        let content = std::fs::read_to_string(path)?;
        let file_hash = compute_hash(&content);

        let def: EntityDef = toml::from_str(&content).map_err(|e| Error::InvalidModel {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        self.resolve(def, &path.to_string_lossy(), &file_hash)
    }

    /// Validate a declaration and add the implicit `id` and `version` fields
    /// every scaffolded entity carries.
    pub fn resolve(&self, def: EntityDef, source_file: &str, file_hash: &str) -> Result<EntityInfo> {
        let invalid = |message: String| Error::InvalidModel {
            path: PathBuf::from(source_file),
            message,
        };

        if !JAVA_IDENTIFIER.is_match(&def.name) || JAVA_KEYWORDS.contains(&def.name.as_str()) {
            return Err(invalid(format!("'{}' is not a valid entity name", def.name)));
        }
        if GENERATED_TYPES.contains(&def.name.as_str()) {
            return Err(invalid(format!(
                "entity name '{}' clashes with a type used by the generated search class",
                def.name
            )));
        }

        let package = def.package.unwrap_or_else(|| self.default_package.clone());
        if !package.is_empty() && !JAVA_PACKAGE.is_match(&package) {
            return Err(invalid(format!("'{}' is not a valid package name", package)));
        }

        let mut fields = vec![
            FieldInfo::new("id", "long").with_type("java.lang.Long"),
            FieldInfo::new("version", "int"),
        ];

        let mut seen: HashSet<String> = fields.iter().map(|f| f.name.clone()).collect();
        for field in def.fields {
            if !JAVA_IDENTIFIER.is_match(&field.name) || JAVA_KEYWORDS.contains(&field.name.as_str()) {
                return Err(invalid(format!(
                    "'{}' is not a valid field name in entity '{}'",
                    field.name, def.name
                )));
            }
            if GENERATED_LOCALS.contains(&field.name.as_str()) {
                return Err(invalid(format!(
                    "field '{}' of entity '{}' clashes with a variable of the generated search method",
                    field.name, def.name
                )));
            }
            if field.kind.trim().is_empty() {
                return Err(invalid(format!(
                    "field '{}' of entity '{}' has no kind",
                    field.name, def.name
                )));
            }
            if !seen.insert(field.name.clone()) {
                return Err(Error::DuplicateField {
                    entity: def.name,
                    field: field.name,
                });
            }
            fields.push(field);
        }

        Ok(EntityInfo {
            name: def.name,
            package,
            fields,
            source_file: source_file.to_string(),
            file_hash: file_hash.to_string(),
        })
    }
}

/// Entity names must be unique across all sources.
pub fn check_unique(entities: &[EntityInfo]) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for entity in entities {
        if let Some(first) = seen.insert(&entity.name, &entity.source_file) {
            return Err(Error::DuplicateEntity {
                entity: entity.name.clone(),
                first: first.to_string(),
                second: entity.source_file.clone(),
            });
        }
    }
    Ok(())
}

pub fn compute_hash(content: &str) -> String {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
