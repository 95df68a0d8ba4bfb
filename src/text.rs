use std::collections::BTreeSet;

use crate::algebra::{Generator, RenderAlgebra};
use crate::config::RenderConfig;
use crate::error::Result;
use crate::exclusion;
use crate::inlining::LexerInliner;
use crate::model::{escape_set, Grammar, Rule, Terminal};
use crate::visitor::visit_rule;

const CONTINUATION_INDENT: &str = "    ";

// Break points left by `alt` and resolved once the whole rule is known.
// Rendered literals and sets escape control characters, so neither marker
// can occur in them.
const SOFT_BREAK: char = '\u{1}';
const HARD_BREAK: char = '\u{2}';

/// Plain notation backend: every rendered node is a `String`.
pub struct TextGenerator<'g> {
    config: &'g RenderConfig,
    inliner: LexerInliner<'g>,
    line_breaks: Option<BTreeSet<usize>>,
    output: String,
}

impl<'g> TextGenerator<'g> {
    pub fn new(grammar: &'g Grammar, config: &'g RenderConfig) -> Self {
        Self {
            config,
            inliner: LexerInliner::new(grammar, config),
            line_breaks: None,
            output: String::new(),
        }
    }

    fn greedy_marker(greedy: bool) -> &'static str {
        if greedy {
            ""
        } else {
            "?"
        }
    }

    fn group_using_pipe(grouping: bool, children: Vec<String>) -> String {
        if grouping && children.len() > 1 {
            format!("({})", children.join(" | "))
        } else {
            children.join("\n| ")
        }
    }
}

/// Resolves break markers in a rule body that starts at `column`. A soft
/// break wraps when the next segment would end past `budget`.
fn layout(body: &str, mut column: usize, budget: usize) -> String {
    let mut out = String::with_capacity(body.len());
    for (index, c) in body.char_indices() {
        match c {
            SOFT_BREAK if column + 1 + segment_len(&body[index + 1..]) > budget => {
                out.push('\n');
                out.push_str(CONTINUATION_INDENT);
                column = CONTINUATION_INDENT.len();
            }
            SOFT_BREAK => {
                out.push(' ');
                column += 1;
            }
            HARD_BREAK => {
                out.push('\n');
                out.push_str(CONTINUATION_INDENT);
                column = CONTINUATION_INDENT.len();
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            c => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

// Width of the text up to the next break point or line end.
fn segment_len(text: &str) -> usize {
    text.chars()
        .take_while(|c| !matches!(*c, SOFT_BREAK | HARD_BREAK | '\n'))
        .count()
}

impl RenderAlgebra for TextGenerator<'_> {
    type Node = String;

    fn enter_rule(&mut self, rule: &Rule) {
        self.line_breaks = self.config.line_breaks(&rule.name).cloned();
    }

    fn optional(&mut self, child: String, greedy: bool) -> String {
        format!("{}?{}", child, Self::greedy_marker(greedy))
    }

    fn plus(&mut self, child: String, greedy: bool) -> String {
        format!("{}+{}", child, Self::greedy_marker(greedy))
    }

    fn star(&mut self, child: String, greedy: bool) -> String {
        format!("{}*{}", child, Self::greedy_marker(greedy))
    }

    fn not(&mut self, child: String) -> String {
        format!("~{}", child)
    }

    fn range(&mut self, left: String, right: String) -> String {
        format!("{}..{}", left, right)
    }

    fn rule(&mut self, children: Vec<String>, name: &str, _line: usize) -> String {
        let body = layout(&children.concat(), 2, self.config.text_column_budget);
        format!("{}\n: {}\n;\n\n", name, body)
    }

    fn block(&mut self, grouping: bool, children: Vec<String>) -> String {
        Self::group_using_pipe(grouping, children)
    }

    fn set(&mut self, grouping: bool, children: Vec<String>) -> String {
        Self::group_using_pipe(grouping, children)
    }

    fn alt(&mut self, grouping: bool, children: Vec<String>) -> String {
        let count = children.len();
        let mut out = String::new();

        for (index, child) in children.into_iter().enumerate() {
            if index != 0 {
                out.push(match &self.line_breaks {
                    Some(indices) if indices.contains(&index) => HARD_BREAK,
                    Some(_) => ' ',
                    None => SOFT_BREAK,
                });
            }
            out.push_str(&child);
        }

        if grouping && count > 1 {
            format!("({})", out)
        } else {
            out
        }
    }

    fn sequence(&mut self, children: Vec<String>) -> String {
        children.join(" ")
    }

    fn terminal(&mut self, terminal: &Terminal) -> String {
        if let Terminal::Token(name) = terminal {
            if let Some(spelling) = self.inliner.resolve(name) {
                return spelling.to_owned();
            }
        }
        terminal.to_string()
    }

    fn rule_ref(&mut self, name: &str) -> String {
        name.to_owned()
    }

    fn chars_set(&mut self, body: &str) -> String {
        format!("[{}]", escape_set(body))
    }

    fn root(&mut self) -> String {
        String::new()
    }

    fn pred(&mut self) -> String {
        String::new()
    }
}

impl Generator for TextGenerator<'_> {
    type Output = String;

    fn generate_notation_description(&mut self) {}

    fn generate_parser_rules(&mut self, grammar: &Grammar) {
        log::info!("Rendering {} parser rules", grammar.parser_rules.len());
        for rule in exclusion::filter_rules(&grammar.parser_rules, &self.config.excluded_rules) {
            log::debug!("Rendering parser rule '{}'", rule.name);
            let text = visit_rule(self, &rule);
            self.output.push_str(&text);
        }
    }

    fn generate_lexer_rules(&mut self, grammar: &Grammar) {
        log::info!("Rendering {} lexer rules", grammar.lexer_rules.len());
        let mut rendered = Vec::new();
        for rule in exclusion::filter_rules(&grammar.lexer_rules, &self.config.excluded_rules) {
            if self.config.is_hidden_lexer_rule(&rule) {
                continue;
            }
            log::debug!("Rendering lexer rule '{}'", rule.name);
            let text = visit_rule(self, &rule);
            rendered.push((rule, text));
        }

        // A rule may be inlined by a lexer rule listed after it.
        for (rule, text) in rendered {
            if self.inliner.is_inlined(&rule.name) {
                continue;
            }
            if rule.is_fragment {
                self.output.push_str("[helper] ");
            }
            self.output.push_str(&text);
        }
    }

    fn finish(self) -> Result<String> {
        Ok(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_measures_from_rule_start() {
        let body = format!("aaaa{}bbbb{}cccc", SOFT_BREAK, SOFT_BREAK);
        assert_eq!(layout(&body, 2, 12), "aaaa bbbb\n    cccc");
        assert_eq!(layout(&body, 2, 80), "aaaa bbbb cccc");

        let top_level = format!("aaaa{}bbbb\n| cccc{}dddd", SOFT_BREAK, SOFT_BREAK);
        assert_eq!(layout(&top_level, 2, 11), "aaaa bbbb\n| cccc dddd");
    }

    #[test]
    fn test_alt_wraps_at_budget() {
        let grammar = Grammar::default();
        let config = RenderConfig {
            text_column_budget: 12,
            ..RenderConfig::default()
        };
        let mut text = TextGenerator::new(&grammar, &config);

        let body = text.alt(false, vec!["aaaa".into(), "bbbb".into(), "cccc".into()]);
        assert_eq!(text.rule(vec![body], "r", 1), "r\n: aaaa bbbb\n    cccc\n;\n\n");
    }

    #[test]
    fn test_table_replaces_length_heuristic() {
        let grammar = Grammar::default();
        let mut config = RenderConfig {
            text_column_budget: 5,
            ..RenderConfig::default()
        };
        config
            .custom_line_breaks
            .insert("r".to_owned(), BTreeSet::from([2]));
        let mut text = TextGenerator::new(&grammar, &config);
        text.enter_rule(&Rule::parser("r", 1, crate::model::Node::block(Vec::new())));

        let body = text.alt(true, vec!["aaaa".into(), "bbbb".into(), "cccc".into()]);
        assert_eq!(
            text.rule(vec![body], "r", 1),
            "r\n: (aaaa bbbb\n    cccc)\n;\n\n"
        );
    }

    #[test]
    fn test_quantifiers_and_literals() {
        let grammar = Grammar::default();
        let config = RenderConfig::default();
        let mut text = TextGenerator::new(&grammar, &config);

        let literal = text.terminal(&Terminal::Literal("it's\n".into()));
        assert_eq!(literal, "'it\\'s\\n'");
        assert_eq!(text.star(literal, false), "'it\\'s\\n'*?");
        assert_eq!(text.chars_set("a-z]"), "[a-z\\]]");
        assert_eq!(text.block(true, vec!["a".into(), "b".into()]), "(a | b)");
        assert_eq!(text.block(false, vec!["a".into(), "b".into()]), "a\n| b");
    }
}
