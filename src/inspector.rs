//! Field inspection: turns entity models into attribute-carrying field
//! descriptors and resolves declared Java type names.

use crate::error::{Error, Result};
use crate::model::{EntityInfo, FieldInfo};
use crate::type_mapper::TypeMapper;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Element and attribute names shared with the widget builders.
pub mod attrs {
    pub const ENTITY: &str = "entity";
    pub const PROPERTY: &str = "property";

    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const ACTUAL_CLASS: &str = "actual-class";
    pub const HIDDEN: &str = "hidden";
    pub const MANY_TO_ONE: &str = "many-to-one";
    pub const ONE_TO_ONE: &str = "one-to-one";
    pub const ONE_TO_MANY: &str = "one-to-many";
    pub const N_TO_MANY: &str = "n-to-many";

    pub const TRUE: &str = "true";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: String,
    pub attributes: BTreeMap<String, String>,
}

impl FieldDescriptor {
    pub fn new(name: &str, declared_type: &str) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(attrs::NAME.to_string(), name.to_string());
        attributes.insert(attrs::TYPE.to_string(), declared_type.to_string());
        Self {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            attributes,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Absent attributes are false.
    pub fn is_true(&self, key: &str) -> bool {
        self.attribute(key) == Some(attrs::TRUE)
    }

    /// `actual-class` when present, else the `type` attribute, else the
    /// declared type.
    pub fn actual_type(&self) -> &str {
        self.attribute(attrs::ACTUAL_CLASS)
            .or_else(|| self.attribute(attrs::TYPE))
            .unwrap_or(&self.declared_type)
    }
}

/// A Java type as far as search generation cares about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    String,
    Boolean,
    Int,
    /// Any other primitive (`long`, `float`, ...)
    Primitive(String),
    Collection(String),
    Class(String),
}

/// Resolves type names against the JDK types an entity can declare plus
/// the entities of the loaded model.
#[derive(Debug, Clone)]
pub struct TypeResolver {
    known: HashMap<String, ResolvedType>,
}

impl TypeResolver {
    pub fn new() -> Self {
        let mut known = HashMap::new();

        known.insert("java.lang.String".to_string(), ResolvedType::String);
        known.insert("String".to_string(), ResolvedType::String);
        known.insert("boolean".to_string(), ResolvedType::Boolean);
        known.insert("int".to_string(), ResolvedType::Int);

        for primitive in ["byte", "char", "short", "long", "float", "double"] {
            known.insert(
                primitive.to_string(),
                ResolvedType::Primitive(primitive.to_string()),
            );
        }

        for wrapper in [
            "Boolean", "Byte", "Character", "Short", "Integer", "Long", "Float", "Double",
        ] {
            let qualified = format!("java.lang.{}", wrapper);
            known.insert(wrapper.to_string(), ResolvedType::Class(qualified.clone()));
            known.insert(qualified.clone(), ResolvedType::Class(qualified));
        }

        for class in [
            "java.math.BigDecimal",
            "java.math.BigInteger",
            "java.util.Date",
            "java.util.Calendar",
            "java.sql.Date",
            "java.sql.Timestamp",
        ] {
            known.insert(class.to_string(), ResolvedType::Class(class.to_string()));
        }

        for collection in [
            "java.util.Set",
            "java.util.List",
            "java.util.Collection",
            "java.util.Map",
        ] {
            known.insert(
                collection.to_string(),
                ResolvedType::Collection(collection.to_string()),
            );
        }

        Self { known }
    }

    /// Resolver that also knows every entity of the model.
    pub fn with_entities(entities: &[EntityInfo]) -> Self {
        let mut resolver = Self::new();
        for entity in entities {
            resolver.register(&entity.qualified_name());
        }
        resolver
    }

    pub fn register(&mut self, qualified_name: &str) {
        self.known.insert(
            qualified_name.to_string(),
            ResolvedType::Class(qualified_name.to_string()),
        );
    }

    /// Generic arguments are ignored; `java.util.Set<Pet>` resolves as
    /// `java.util.Set`.
    pub fn resolve(&self, type_name: &str) -> Result<ResolvedType> {
        let raw = raw_type(type_name);
        self.known
            .get(raw)
            .cloned()
            .ok_or_else(|| Error::UnresolvableType {
                type_name: type_name.to_string(),
            })
    }
}

impl Default for TypeResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn raw_type(type_name: &str) -> &str {
    let trimmed = type_name.trim();
    match trimmed.find('<') {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed,
    }
}

/// Unqualified class name, e.g. `Owner` for `com.test.model.Owner`.
pub fn simple_name(type_name: &str) -> &str {
    let raw = raw_type(type_name);
    raw.rsplit('.').next().unwrap_or(raw)
}

/// What an entity looks like to the widget builders: a descriptor for the
/// entity itself followed by one per field, in declaration order.
#[derive(Debug, Clone)]
pub struct InspectionResult {
    pub entity: FieldDescriptor,
    pub fields: Vec<FieldDescriptor>,
}

pub struct Inspector<'a> {
    type_mapper: &'a TypeMapper,
    hidden_patterns: Vec<Regex>,
}

impl<'a> Inspector<'a> {
    pub fn new(type_mapper: &'a TypeMapper, hidden_fields: &[String]) -> Result<Self> {
        let hidden_patterns = hidden_fields
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self {
            type_mapper,
            hidden_patterns,
        })
    }

    pub fn inspect(&self, entity: &EntityInfo) -> Result<InspectionResult> {
        let fields = entity
            .fields
            .iter()
            .map(|field| self.inspect_field(entity, field))
            .collect::<Result<Vec<_>>>()?;

        Ok(InspectionResult {
            entity: FieldDescriptor::new(&entity.name, &entity.qualified_name()),
            fields,
        })
    }

    fn inspect_field(&self, entity: &EntityInfo, field: &FieldInfo) -> Result<FieldDescriptor> {
        let related = |kind: &str| {
            field.field_type.clone().ok_or_else(|| Error::InvalidModel {
                path: PathBuf::from(&entity.source_file),
                message: format!(
                    "{} field '{}' of entity '{}' needs a type",
                    kind, field.name, entity.name
                ),
            })
        };

        let mut descriptor = match field.kind.to_lowercase().as_str() {
            "manytoone" => FieldDescriptor::new(&field.name, &related("manyToOne")?)
                .with_attribute(attrs::MANY_TO_ONE, attrs::TRUE),
            "onetoone" => FieldDescriptor::new(&field.name, &related("oneToOne")?)
                .with_attribute(attrs::ONE_TO_ONE, attrs::TRUE),
            "onetomany" => FieldDescriptor::new(&field.name, &collection_type(field))
                .with_attribute(attrs::ONE_TO_MANY, attrs::TRUE)
                .with_attribute(attrs::N_TO_MANY, attrs::TRUE),
            "manytomany" => FieldDescriptor::new(&field.name, &collection_type(field))
                .with_attribute(attrs::N_TO_MANY, attrs::TRUE),
            _ => {
                let declared = field
                    .field_type
                    .clone()
                    .unwrap_or_else(|| self.type_mapper.map(&field.kind));
                FieldDescriptor::new(&field.name, &declared)
            }
        };

        if field.hidden || self.hidden_patterns.iter().any(|p| p.is_match(&field.name)) {
            descriptor = descriptor.with_attribute(attrs::HIDDEN, attrs::TRUE);
        }

        tracing::debug!(
            entity = %entity.name,
            field = %descriptor.name,
            declared_type = %descriptor.declared_type,
            "inspected field"
        );

        Ok(descriptor)
    }
}

fn collection_type(field: &FieldInfo) -> String {
    match &field.field_type {
        Some(element) => format!("java.util.Set<{}>", element),
        None => "java.util.Set".to_string(),
    }
}
