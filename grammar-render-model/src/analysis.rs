use crate::model::*;

/// Visits `node` and all of its descendants in pre-order.
pub fn walk<'a>(node: &'a Node, f: &mut impl FnMut(&'a Node)) {
    f(node);
    for child in &node.children {
        walk(child, f);
    }
}

/// Distinct literal spellings under `node`, in first-seen order.
pub fn literal_spellings(node: &Node) -> Vec<&str> {
    let mut spellings: Vec<&str> = Vec::new();
    walk(node, &mut |n| {
        if let NodeKind::Terminal(Terminal::Literal(value)) = &n.kind {
            if !spellings.contains(&value.as_str()) {
                spellings.push(value);
            }
        }
    });
    spellings
}

/// Every token or rule name referenced under `node`, once each, in
/// first-seen order.
pub fn referenced_names(node: &Node) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    walk(node, &mut |n| {
        if let Some(name) = n.referenced_name() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    });
    names
}

/// Number of top-level alternatives of a rule body.
pub fn alternative_count(rule: &Rule) -> usize {
    match rule.body.kind {
        NodeKind::Block | NodeKind::Set => rule.body.children.len(),
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        Node::block(vec![
            Node::alt(vec![Node::literal("a"), Node::rule_ref("expr"), Node::literal("a")]),
            Node::alt(vec![Node::optional(Node::seq_block(vec![Node::token("ID")]))]),
        ])
    }

    #[test]
    fn test_literal_spellings_are_distinct() {
        assert_eq!(literal_spellings(&sample()), vec!["a"]);
    }

    #[test]
    fn test_referenced_names_skip_literals() {
        assert_eq!(referenced_names(&sample()), vec!["expr", "ID"]);
    }

    #[test]
    fn test_alternative_count() {
        let rule = Rule::parser("r", 1, sample());
        assert_eq!(alternative_count(&rule), 2);
    }
}
