use std::collections::BTreeSet;

/// One line of generated Java. Statements with children render as a block
/// header (`if (...)`) followed by the children in braces; leaf statements
/// are terminated with a semicolon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaStatement {
    pub text: String,
    pub imports: BTreeSet<String>,
    pub children: Vec<JavaStatement>,
}

impl JavaStatement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            imports: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn with_import(mut self, qualified_name: &str) -> Self {
        self.imports.insert(qualified_name.to_string());
        self
    }

    pub fn with_child(mut self, child: JavaStatement) -> Self {
        self.children.push(child);
        self
    }

    fn collect_imports(&self, into: &mut BTreeSet<String>) {
        into.extend(self.imports.iter().cloned());
        for child in &self.children {
            child.collect_imports(into);
        }
    }
}

/// Generated source for one field, plus the imports it needs.
/// An empty fragment is the placeholder for a suppressed field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedFragment {
    pub statements: Vec<JavaStatement>,
}

impl GeneratedFragment {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: JavaStatement) {
        self.statements.push(statement);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn imports(&self) -> BTreeSet<String> {
        let mut imports = BTreeSet::new();
        for statement in &self.statements {
            statement.collect_imports(&mut imports);
        }
        imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imports_are_collected_from_children() {
        let mut fragment = GeneratedFragment::empty();
        fragment.push(JavaStatement::new("Owner owner = search.getOwner()").with_import("com.test.model.Owner"));
        fragment.push(
            JavaStatement::new("if (owner != null)")
                .with_child(JavaStatement::new("x()").with_import("com.test.model.Vet")),
        );

        let imports: Vec<_> = fragment.imports().into_iter().collect();
        assert_eq!(imports, vec!["com.test.model.Owner", "com.test.model.Vet"]);
        assert!(!fragment.is_empty());
        assert!(GeneratedFragment::empty().is_empty());
    }
}
