use crate::model::{Node, NodeKind, Rule};

/// Drops the excluded rules and removes every reference to them from the
/// remaining rule bodies.
pub fn filter_rules(rules: &[Rule], excluded: &[String]) -> Vec<Rule> {
    if excluded.is_empty() {
        return rules.to_vec();
    }

    rules
        .iter()
        .filter(|rule| !excluded.contains(&rule.name))
        .map(|rule| {
            let body = prune(&rule.body, excluded).unwrap_or_else(|| {
                log::debug!("Rule '{}' is empty after exclusion", rule.name);
                Node::block(Vec::new())
            });
            Rule {
                body,
                ..rule.clone()
            }
        })
        .collect()
}

/// Copy of `node` without references to `excluded`, or `None` when nothing
/// is left. A parent whose children were all removed is removed as well.
pub fn prune(node: &Node, excluded: &[String]) -> Option<Node> {
    if let Some(name) = node.referenced_name() {
        if excluded.iter().any(|e| e == name) {
            return None;
        }
    }
    if node.children.is_empty() {
        return Some(node.clone());
    }

    let children: Vec<Node> = node
        .children
        .iter()
        .filter_map(|child| prune(child, excluded))
        .collect();

    let incomplete = match node.kind {
        NodeKind::Range => children.len() != 2,
        _ => children.is_empty(),
    };
    if incomplete {
        return None;
    }

    Some(Node::new(node.kind.clone(), children))
}
