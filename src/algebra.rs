//! The operation set shared by every rendering backend.
//!
//! The visitor walks a rule's AST bottom-up and hands each operation the
//! already-rendered children, so a backend only decides how one node kind
//! composes its parts. Each backend picks its own rendered-node type.

use crate::error::Result;
use crate::model::{Grammar, Rule, Terminal};

pub trait RenderAlgebra {
    /// What rendering a single AST node produces.
    type Node;

    /// Called before the body of `rule` is visited.
    fn enter_rule(&mut self, rule: &Rule);

    fn optional(&mut self, child: Self::Node, greedy: bool) -> Self::Node;
    fn plus(&mut self, child: Self::Node, greedy: bool) -> Self::Node;
    fn star(&mut self, child: Self::Node, greedy: bool) -> Self::Node;
    fn not(&mut self, child: Self::Node) -> Self::Node;
    fn range(&mut self, left: Self::Node, right: Self::Node) -> Self::Node;

    /// Frames a rendered body with the rule header and trailer.
    fn rule(&mut self, children: Vec<Self::Node>, name: &str, line: usize) -> Self::Node;

    fn block(&mut self, grouping: bool, children: Vec<Self::Node>) -> Self::Node;
    fn set(&mut self, grouping: bool, children: Vec<Self::Node>) -> Self::Node;
    fn alt(&mut self, grouping: bool, children: Vec<Self::Node>) -> Self::Node;
    fn sequence(&mut self, children: Vec<Self::Node>) -> Self::Node;

    fn terminal(&mut self, terminal: &Terminal) -> Self::Node;
    fn rule_ref(&mut self, name: &str) -> Self::Node;
    fn chars_set(&mut self, body: &str) -> Self::Node;
    fn root(&mut self) -> Self::Node;
    fn pred(&mut self) -> Self::Node;
}

/// Whole-document assembly on top of the algebra.
pub trait Generator: RenderAlgebra + Sized {
    type Output;

    /// Renders the notation header, every parser rule and every lexer rule,
    /// then finalizes the document.
    fn run(mut self, grammar: &Grammar) -> Result<Self::Output> {
        self.generate_notation_description();
        self.generate_parser_rules(grammar);
        self.generate_lexer_rules(grammar);
        self.finish()
    }

    fn generate_notation_description(&mut self);
    fn generate_parser_rules(&mut self, grammar: &Grammar);
    fn generate_lexer_rules(&mut self, grammar: &Grammar);

    /// Consumes the generator once all rules are rendered.
    fn finish(self) -> Result<Self::Output>;
}
