use indexmap::{IndexMap, IndexSet};

use crate::structured::document::{Document, NodeId};

/// Who references a rule, and where the rule is declared.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub anchor: Option<NodeId>,
    pub users: IndexSet<String>,
}

/// Back-references between rules, collected while the document is built.
///
/// References may arrive before their target is declared; such entries wait
/// without an anchor until [`UsageIndex::declare`] supplies one.
#[derive(Debug, Default)]
pub struct UsageIndex {
    entries: IndexMap<String, UsageRecord>,
}

impl UsageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `user` references `target`. Repeated references count once.
    pub fn reference(&mut self, target: &str, user: &str) {
        self.entries
            .entry(target.to_owned())
            .or_default()
            .users
            .insert(user.to_owned());
    }

    pub fn declare(&mut self, name: &str, anchor: NodeId) {
        self.entries.entry(name.to_owned()).or_default().anchor = Some(anchor);
    }

    pub fn get(&self, name: &str) -> Option<&UsageRecord> {
        self.entries.get(name)
    }

    /// Appends a `usages` list to every declared entry that has users.
    pub fn flush(self, document: &mut Document) {
        for (name, record) in self.entries {
            let Some(anchor) = record.anchor else {
                log::debug!("No declaration for referenced name '{}'", name);
                continue;
            };
            if record.users.is_empty() {
                continue;
            }

            let usages = document.append_element(anchor, "usages");
            for user in &record.users {
                let declaration = document.append_element(usages, "declaration");
                document.append_text(declaration, user);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_references_keep_users() {
        let mut document = Document::new("tokens");
        let anchor = document.append_element(document.root(), "declaration");

        let mut index = UsageIndex::new();
        index.reference("expr", "statement");
        index.reference("expr", "statement");
        index.reference("expr", "assignment");
        index.declare("expr", anchor);

        let record = index.get("expr").unwrap();
        assert_eq!(record.anchor, Some(anchor));
        assert_eq!(
            record.users.iter().collect::<Vec<_>>(),
            vec!["statement", "assignment"]
        );
    }

    #[test]
    fn test_flush_skips_undeclared_and_unused() {
        let mut document = Document::new("tokens");
        let root = document.root();
        let used = document.append_element(root, "declaration");
        let unused = document.append_element(root, "declaration");

        let mut index = UsageIndex::new();
        index.declare("used", used);
        index.declare("unused", unused);
        index.reference("used", "a");
        index.reference("used", "b");
        index.reference("EOF", "a");
        index.flush(&mut document);

        let usages = document.descendants_named(root, "usages");
        assert_eq!(usages.len(), 1);
        assert_eq!(document.child_elements(unused).count(), 0);

        let names: Vec<_> = document
            .child_elements(usages[0])
            .map(|id| document.text_content(id))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
