use indexmap::IndexSet;

use crate::analysis;
use crate::config::RenderConfig;
use crate::model::{Grammar, Node, NodeKind, Terminal};

/// Decides whether a token reference is shown as the token's literal
/// spelling, and remembers which lexer rules were absorbed that way.
pub struct LexerInliner<'g> {
    grammar: &'g Grammar,
    config: &'g RenderConfig,
    inlined: IndexSet<String>,
}

impl<'g> LexerInliner<'g> {
    pub fn new(grammar: &'g Grammar, config: &'g RenderConfig) -> Self {
        Self {
            grammar,
            config,
            inlined: IndexSet::new(),
        }
    }

    /// The spelling to show in place of `token`, if the token is inlined.
    pub fn resolve(&mut self, token: &str) -> Option<&'g str> {
        if self.config.is_stop_terminal(token) {
            return None;
        }

        // An unknown token is not simple; it renders under its own name.
        let rule = self.grammar.lexer_rule(token)?;
        if !is_simple(&rule.body) {
            return None;
        }

        match analysis::literal_spellings(&rule.body).as_slice() {
            [spelling] => {
                if self.inlined.insert(rule.name.clone()) {
                    log::debug!("Inlining lexer rule '{}' as '{}'", rule.name, spelling);
                }
                Some(*spelling)
            }
            _ => None,
        }
    }

    pub fn is_inlined(&self, rule: &str) -> bool {
        self.inlined.contains(rule)
    }
}

/// A lexer rule body is simple when every level holds at most one
/// significant child and the first-child chain ends in a string literal.
pub fn is_simple(node: &Node) -> bool {
    if matches!(node.kind, NodeKind::Not | NodeKind::Range) {
        return false;
    }
    if node.children.iter().filter(|child| is_significant(child)).count() > 1 {
        return false;
    }

    match node.children.first() {
        Some(first) => is_simple(first),
        None => matches!(node.kind, NodeKind::Terminal(Terminal::Literal(_))),
    }
}

fn is_significant(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Terminal(_)
            | NodeKind::CharSet(_)
            | NodeKind::RuleRef(_)
            | NodeKind::Block
            | NodeKind::Alt
            | NodeKind::Set
            | NodeKind::Optional { .. }
            | NodeKind::Plus { .. }
            | NodeKind::Star { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rule;

    fn lexer(rules: Vec<Rule>) -> Grammar {
        Grammar::new(Vec::new(), rules)
    }

    fn single(element: Node) -> Node {
        Node::seq_block(vec![element])
    }

    #[test]
    fn test_single_literal_is_simple() {
        assert!(is_simple(&single(Node::literal("hi"))));
        // Placeholders are not significant.
        assert!(is_simple(&Node::seq_block(vec![
            Node::literal("hi"),
            Node::leaf(NodeKind::RuleRoot),
        ])));
    }

    #[test]
    fn test_complex_bodies_are_not_simple() {
        assert!(!is_simple(&Node::seq_block(vec![
            Node::literal("-"),
            Node::literal(">"),
        ])));
        assert!(!is_simple(&single(Node::plus(single(Node::char_set("a-z"))))));
        assert!(!is_simple(&single(Node::token("OTHER"))));
        assert!(!is_simple(&single(Node::new(
            NodeKind::Not,
            vec![Node::literal("a")]
        ))));
        assert!(!is_simple(&Node::block(vec![
            Node::alt(vec![Node::literal("a")]),
            Node::alt(vec![Node::literal("b")]),
        ])));
    }

    #[test]
    fn test_resolve_marks_inlined() {
        let grammar = lexer(vec![
            Rule::lexer("HELLO", 1, single(Node::literal("hi"))),
            Rule::lexer("NAME", 2, single(Node::plus(single(Node::char_set("a-z"))))),
        ]);
        let config = RenderConfig::default();
        let mut inliner = LexerInliner::new(&grammar, &config);

        assert_eq!(inliner.resolve("HELLO"), Some("hi"));
        assert_eq!(inliner.resolve("HELLO"), Some("hi"));
        assert_eq!(inliner.resolve("NAME"), None);
        assert_eq!(inliner.resolve("MISSING"), None);

        assert!(inliner.is_inlined("HELLO"));
        assert!(!inliner.is_inlined("NAME"));
    }

    #[test]
    fn test_stop_terminals_are_never_inlined() {
        let grammar = lexer(vec![Rule::lexer("SEMI", 1, single(Node::literal(";")))]);
        let config = RenderConfig {
            stop_terminals: vec!["SEMI".to_owned()],
            ..RenderConfig::default()
        };
        let mut inliner = LexerInliner::new(&grammar, &config);

        assert_eq!(inliner.resolve("SEMI"), None);
        assert!(!inliner.is_inlined("SEMI"));
    }
}
