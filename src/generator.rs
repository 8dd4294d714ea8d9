use crate::error::Result;
use crate::fragment::{GeneratedFragment, JavaStatement};
use crate::inspector::{attrs, FieldDescriptor, Inspector, TypeResolver};
use crate::model::EntityInfo;
use crate::widget_builder::QueryByExampleBuilder;
use std::collections::BTreeSet;
use std::path::PathBuf;

const FIXED_IMPORTS: [&str; 5] = [
    "java.util.ArrayList",
    "java.util.List",
    "javax.persistence.criteria.CriteriaBuilder",
    "javax.persistence.criteria.Predicate",
    "javax.persistence.criteria.Root",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path below the output root, e.g. `com/test/rest/OwnerSearchPredicates.java`
    pub relative_path: PathBuf,
    pub content: String,
}

/// Assembles the per-field search fragments of an entity into a
/// `<Entity>SearchPredicates` Java class.
pub struct JavaGenerator<'a> {
    inspector: &'a Inspector<'a>,
    resolver: &'a TypeResolver,
    rest_package: String,
    indent: String,
}

impl<'a> JavaGenerator<'a> {
    pub fn new(
        inspector: &'a Inspector<'a>,
        resolver: &'a TypeResolver,
        rest_package: &str,
        indent_width: usize,
    ) -> Self {
        Self {
            inspector,
            resolver,
            rest_package: rest_package.to_string(),
            indent: " ".repeat(indent_width),
        }
    }

    pub fn class_name(entity: &EntityInfo) -> String {
        format!("{}SearchPredicates", entity.name)
    }

    pub fn generate(&self, entity: &EntityInfo) -> Result<GeneratedFile> {
        let inspection = self.inspector.inspect(entity)?;
        let fragments = self.build_fragments(&entity.name, &inspection.fields)?;
        let class_name = Self::class_name(entity);

        let mut imports: BTreeSet<String> = FIXED_IMPORTS.iter().map(|s| s.to_string()).collect();
        imports.insert(inspection.entity.declared_type.clone());
        for fragment in &fragments {
            imports.extend(fragment.imports());
        }

        let mut lines = Vec::new();
        if !self.rest_package.is_empty() {
            lines.push(format!("package {};", self.rest_package));
            lines.push(String::new());
        }

        let import_lines = self.import_lines(&imports);
        if !import_lines.is_empty() {
            lines.extend(import_lines);
            lines.push(String::new());
        }

        let i1 = self.indent.clone();
        let i2 = self.indent.repeat(2);

        lines.push(format!("public class {}", class_name));
        lines.push("{".to_string());
        lines.push(format!(
            "{}public static Predicate[] getSearchPredicates(CriteriaBuilder builder, Root<{1}> root, {1} search)",
            i1, entity.name
        ));
        lines.push(format!("{}{{", i1));
        lines.push(format!(
            "{}List<Predicate> predicatesList = new ArrayList<Predicate>();",
            i2
        ));

        for fragment in &fragments {
            lines.push(String::new());
            for statement in &fragment.statements {
                self.render_statement(&mut lines, statement, 2);
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "{}return predicatesList.toArray(new Predicate[predicatesList.size()]);",
            i2
        ));
        lines.push(format!("{}}}", i1));
        lines.push("}".to_string());

        let mut relative_path: PathBuf = self.rest_package.split('.').filter(|s| !s.is_empty()).collect();
        relative_path.push(format!("{}.java", class_name));

        let mut content = lines.join("\n");
        content.push('\n');

        Ok(GeneratedFile {
            relative_path,
            content,
        })
    }

    /// Non-empty fragments in field order.
    fn build_fragments(&self, entity_name: &str, fields: &[FieldDescriptor]) -> Result<Vec<GeneratedFragment>> {
        let builder = QueryByExampleBuilder::new(self.resolver);

        let mut fragments = Vec::new();
        for field in fields {
            match builder.generate(attrs::PROPERTY, field)? {
                Some(fragment) if !fragment.is_empty() => fragments.push(fragment),
                _ => tracing::debug!(entity = %entity_name, field = %field.name, "field not searchable"),
            }
        }
        Ok(fragments)
    }

    /// `java` imports first, then `javax`, then everything else, sorted
    /// within each top-level group with a blank line between groups.
    /// `java.lang` and same-package types are implicit.
    fn import_lines(&self, imports: &BTreeSet<String>) -> Vec<String> {
        let mut sorted: Vec<(usize, &str, &str)> = imports
            .iter()
            .filter(|import| {
                let package = import.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
                !package.is_empty() && package != "java.lang" && package != self.rest_package
            })
            .map(|import| {
                let group = import.split('.').next().unwrap_or(import.as_str());
                let rank = match group {
                    "java" => 0,
                    "javax" => 1,
                    _ => 2,
                };
                (rank, group, import.as_str())
            })
            .collect();
        sorted.sort();

        let mut lines = Vec::new();
        let mut last_group: Option<&str> = None;

        for (_, group, import) in sorted {
            if last_group.is_some_and(|g| g != group) {
                lines.push(String::new());
            }
            last_group = Some(group);
            lines.push(format!("import {};", import));
        }

        lines
    }

    fn render_statement(&self, lines: &mut Vec<String>, statement: &JavaStatement, depth: usize) {
        let indent = self.indent.repeat(depth);

        if statement.children.is_empty() {
            lines.push(format!("{}{};", indent, statement.text));
            return;
        }

        lines.push(format!("{}{}", indent, statement.text));
        lines.push(format!("{}{{", indent));
        for child in &statement.children {
            self.render_statement(lines, child, depth + 1);
        }
        lines.push(format!("{}}}", indent));
    }
}
