use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A declared type name that is neither a known Java type nor a model entity
    #[error("cannot resolve type '{type_name}'")]
    UnresolvableType { type_name: String },

    #[error("invalid entity model {path:?}: {message}")]
    InvalidModel { path: PathBuf, message: String },

    #[error("entity '{entity}' declares field '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    #[error("entity '{entity}' is declared in both {first:?} and {second:?}")]
    DuplicateEntity {
        entity: String,
        first: String,
        second: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolvable_type_display() {
        let err = Error::UnresolvableType {
            type_name: "com.acme.Missing".into(),
        };
        assert_eq!(err.to_string(), "cannot resolve type 'com.acme.Missing'");
    }

    #[test]
    fn test_duplicate_field_display() {
        let err = Error::DuplicateField {
            entity: "Owner".into(),
            field: "city".into(),
        };
        assert!(err.to_string().contains("Owner"));
        assert!(err.to_string().contains("city"));
    }
}
