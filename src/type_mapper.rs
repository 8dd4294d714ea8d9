use std::collections::HashMap;

/// Maps field kind keywords (as typed at the scaffolding prompt) to declared
/// Java types.
pub struct TypeMapper {
    mappings: HashMap<String, String>,
}

impl TypeMapper {
    pub fn new(custom_mappings: &HashMap<String, String>) -> Self {
        let mut mappings = Self::builtin_mappings();

        // Merge custom mappings (case-insensitive keys)
        for (key, value) in custom_mappings {
            mappings.insert(key.to_lowercase(), value.clone());
        }

        Self { mappings }
    }

    fn builtin_mappings() -> HashMap<String, String> {
        let mut m = HashMap::new();

        m.insert("string".to_string(), "java.lang.String".to_string());

        // Primitives
        m.insert("boolean".to_string(), "boolean".to_string());
        m.insert("byte".to_string(), "byte".to_string());
        m.insert("char".to_string(), "char".to_string());
        m.insert("short".to_string(), "short".to_string());
        m.insert("int".to_string(), "int".to_string());
        m.insert("long".to_string(), "long".to_string());
        m.insert("float".to_string(), "float".to_string());
        m.insert("double".to_string(), "double".to_string());

        // Temporal
        m.insert("date".to_string(), "java.util.Date".to_string());
        m.insert("calendar".to_string(), "java.util.Calendar".to_string());
        m.insert("timestamp".to_string(), "java.sql.Timestamp".to_string());

        // Numeric objects
        m.insert("bigdecimal".to_string(), "java.math.BigDecimal".to_string());
        m.insert("biginteger".to_string(), "java.math.BigInteger".to_string());

        m
    }

    pub fn map(&self, kind: &str) -> String {
        // Check case-insensitive match
        if let Some(mapped) = self.mappings.get(&kind.to_lowercase()) {
            return mapped.clone();
        }

        // Return original type if no mapping found
        kind.to_string()
    }
}
