//! Query-by-example predicate generation.
//!
//! Each searchable field of an entity becomes a read from the `search`
//! example object plus a guarded `predicatesList.add(...)` against the JPA
//! `CriteriaBuilder`. Unset values (null, empty string, `false`, `0`) are
//! left out of the filter.

use crate::error::Result;
use crate::fragment::{GeneratedFragment, JavaStatement};
use crate::inspector::{attrs, simple_name, FieldDescriptor, ResolvedType, TypeResolver};

/// How a field takes part in query-by-example search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
    Int,
    /// Many-to-one reference to another entity
    Reference { class_name: String },
    /// One-to-many and many-to-many relationships
    Collection,
    Unsupported,
}

impl FieldKind {
    /// String, `boolean` and `int` are decided by the resolved type before
    /// relationship markers are considered.
    pub fn resolve(field: &FieldDescriptor, resolver: &TypeResolver) -> Result<Self> {
        let actual = field.actual_type();

        let kind = match resolver.resolve(actual)? {
            ResolvedType::String => FieldKind::String,
            ResolvedType::Boolean => FieldKind::Boolean,
            ResolvedType::Int => FieldKind::Int,
            _ if field.has(attrs::MANY_TO_ONE) => FieldKind::Reference {
                class_name: actual.trim().to_string(),
            },
            ResolvedType::Collection(_) => FieldKind::Collection,
            _ if field.has(attrs::ONE_TO_MANY) || field.has(attrs::N_TO_MANY) => {
                FieldKind::Collection
            }
            _ => FieldKind::Unsupported,
        };

        Ok(kind)
    }
}

pub struct QueryByExampleBuilder<'a> {
    resolver: &'a TypeResolver,
}

impl<'a> QueryByExampleBuilder<'a> {
    pub fn new(resolver: &'a TypeResolver) -> Self {
        Self { resolver }
    }

    /// Build the search fragment for one element.
    ///
    /// Returns `None` for the root entity element (the caller should
    /// descend into its fields) and an empty fragment for fields that are
    /// hidden or cannot be searched. Type resolution errors propagate.
    pub fn generate(
        &self,
        element_name: &str,
        field: &FieldDescriptor,
    ) -> Result<Option<GeneratedFragment>> {
        if element_name == attrs::ENTITY {
            return Ok(None);
        }

        if field.is_true(attrs::HIDDEN) {
            return Ok(Some(GeneratedFragment::empty()));
        }

        let name = field.attribute(attrs::NAME).unwrap_or(&field.name);
        let getter = getter_call(name);

        let fragment = match FieldKind::resolve(field, self.resolver)? {
            FieldKind::String => guarded(
                JavaStatement::new(format!("String {} = {}", name, getter)),
                format!("if ({0} != null && !\"\".equals({0}))", name),
                format!(
                    "predicatesList.add(builder.like(root.<String>get(\"{0}\"), '%' + {0} + '%'))",
                    name
                ),
            ),
            FieldKind::Boolean => guarded(
                JavaStatement::new(format!("boolean {} = {}", name, getter)),
                format!("if ({})", name),
                equal_predicate(name),
            ),
            // 0 doubles as "not set", so searching for 0 is not possible
            FieldKind::Int => guarded(
                JavaStatement::new(format!("int {} = {}", name, getter)),
                format!("if ({} != 0)", name),
                equal_predicate(name),
            ),
            FieldKind::Reference { class_name } => guarded(
                JavaStatement::new(format!("{} {} = {}", simple_name(&class_name), name, getter))
                    .with_import(&class_name),
                format!("if ({0} != null && {0}.getId() != null)", name),
                equal_predicate(name),
            ),
            // "Set containing all of" has no clean CriteriaBuilder form, so
            // collections are not searchable
            FieldKind::Collection | FieldKind::Unsupported => GeneratedFragment::empty(),
        };

        Ok(Some(fragment))
    }
}

fn guarded(read: JavaStatement, condition: String, predicate: String) -> GeneratedFragment {
    let mut fragment = GeneratedFragment::empty();
    fragment.push(read);
    fragment.push(JavaStatement::new(condition).with_child(JavaStatement::new(predicate)));
    fragment
}

fn equal_predicate(name: &str) -> String {
    format!("predicatesList.add(builder.equal(root.get(\"{0}\"), {0}))", name)
}

fn getter_call(name: &str) -> String {
    format!("search.get{}()", capitalize(name))
}

/// JavaBeans property capitalization: `firstName` becomes `FirstName`, but
/// a name whose second letter is already upper case (`dLicense`) is kept.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    if chars.clone().next().is_some_and(char::is_uppercase) {
        return name.to_string();
    }

    first.to_uppercase().chain(chars).collect()
}
