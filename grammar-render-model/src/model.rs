use crate::parser;

mod types;

pub use types::{escape, escape_set, RuleKind, Terminal, DEFAULT_MODE};

/// A complete grammar: both rule namespaces plus the raw source lines each
/// namespace was read from.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub parser_rules: Vec<Rule>,
    pub lexer_rules: Vec<Rule>,
    pub parser_source: Vec<String>,
    pub lexer_source: Vec<String>,
}

impl Grammar {
    pub fn new(parser_rules: Vec<Rule>, lexer_rules: Vec<Rule>) -> Self {
        Self {
            parser_rules,
            lexer_rules,
            ..Self::default()
        }
    }

    /// Attaches the source text used for section-marker lookback.
    pub fn with_sources(mut self, parser_source: &str, lexer_source: &str) -> Self {
        self.parser_source = parser_source.lines().map(str::to_owned).collect();
        self.lexer_source = lexer_source.lines().map(str::to_owned).collect();
        self
    }

    pub fn lexer_rule(&self, name: &str) -> Option<&Rule> {
        self.lexer_rules.iter().find(|rule| rule.name == name)
    }

    pub fn parser_rule(&self, name: &str) -> Option<&Rule> {
        self.parser_rules.iter().find(|rule| rule.name == name)
    }

    pub fn source(&self, kind: RuleKind) -> &[String] {
        match kind {
            RuleKind::Lexer => &self.lexer_source,
            RuleKind::Parser => &self.parser_source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub kind: RuleKind,
    pub is_fragment: bool,
    pub mode: String,
    /// 1-based line of the rule name in its source.
    pub line: usize,
    pub body: Node,
}

impl Rule {
    pub fn parser(name: impl Into<String>, line: usize, body: Node) -> Self {
        Self {
            name: name.into(),
            kind: RuleKind::Parser,
            is_fragment: false,
            mode: DEFAULT_MODE.to_owned(),
            line,
            body,
        }
    }

    pub fn lexer(name: impl Into<String>, line: usize, body: Node) -> Self {
        Self {
            kind: RuleKind::Lexer,
            ..Self::parser(name, line, body)
        }
    }

    pub fn fragment(mut self) -> Self {
        self.is_fragment = true;
        self
    }

    pub fn in_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

/// The closed set of AST node kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain juxtaposition of elements without alternative semantics.
    Sequence,
    /// One alternative: its children are matched in order.
    Alt,
    /// A choice between `Alt` children.
    Block,
    /// A choice between single terminals, as produced under `~`.
    Set,
    Optional { greedy: bool },
    Plus { greedy: bool },
    Star { greedy: bool },
    Not,
    Range,
    Terminal(Terminal),
    RuleRef(String),
    CharSet(String),
    Predicate,
    /// Structural placeholder (embedded actions, options) that renders nothing.
    RuleRoot,
}

impl Node {
    pub fn new(kind: NodeKind, children: Vec<Node>) -> Self {
        Self { kind, children }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    pub fn token(name: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Terminal(Terminal::Token(name.into())))
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self::leaf(NodeKind::Terminal(Terminal::Literal(value.into())))
    }

    pub fn rule_ref(name: impl Into<String>) -> Self {
        Self::leaf(NodeKind::RuleRef(name.into()))
    }

    pub fn char_set(body: impl Into<String>) -> Self {
        Self::leaf(NodeKind::CharSet(body.into()))
    }

    pub fn alt(children: Vec<Node>) -> Self {
        Self::new(NodeKind::Alt, children)
    }

    pub fn block(alternatives: Vec<Node>) -> Self {
        Self::new(NodeKind::Block, alternatives)
    }

    /// `Block[Alt[elements..]]`, the shape of a single-alternative body.
    pub fn seq_block(elements: Vec<Node>) -> Self {
        Self::block(vec![Self::alt(elements)])
    }

    pub fn optional(child: Node) -> Self {
        Self::new(NodeKind::Optional { greedy: true }, vec![child])
    }

    pub fn star(child: Node) -> Self {
        Self::new(NodeKind::Star { greedy: true }, vec![child])
    }

    pub fn plus(child: Node) -> Self {
        Self::new(NodeKind::Plus { greedy: true }, vec![child])
    }

    /// The name this node references, for token and rule references.
    pub fn referenced_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Terminal(Terminal::Token(name)) | NodeKind::RuleRef(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_leaf_kind(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Terminal(_)
                | NodeKind::RuleRef(_)
                | NodeKind::CharSet(_)
                | NodeKind::Predicate
                | NodeKind::RuleRoot
        )
    }
}

/// The rules of one namespace, as read from one notation source.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub name: String,
    pub kind: RuleKind,
    pub rules: Vec<Rule>,
}

impl From<parser::GrammarFile> for RuleSet {
    fn from(p: parser::GrammarFile) -> Self {
        let kind = match p.kind {
            parser::GrammarKind::Parser => RuleKind::Parser,
            parser::GrammarKind::Lexer => RuleKind::Lexer,
        };
        Self {
            name: p.name.to_string(),
            kind,
            rules: p
                .rules
                .into_iter()
                .map(|rule| convert_rule(rule, kind))
                .collect(),
        }
    }
}

fn convert_rule(p: parser::Rule, kind: RuleKind) -> Rule {
    let alternatives = p.alternatives.into_iter().map(|alt| alt.elements).collect();
    Rule {
        line: p.name.span().start().line,
        name: p.name.to_string(),
        kind,
        is_fragment: p.fragment.is_some(),
        mode: p
            .mode
            .map(|mode| mode.to_string())
            .unwrap_or_else(|| DEFAULT_MODE.to_owned()),
        body: convert_block(alternatives),
    }
}

fn convert_block(alternatives: Vec<Vec<parser::Element>>) -> Node {
    Node::block(
        alternatives
            .into_iter()
            .map(|seq| Node::alt(seq.into_iter().map(Node::from).collect()))
            .collect(),
    )
}

impl From<parser::Element> for Node {
    fn from(p: parser::Element) -> Self {
        use parser::Element as E;
        match p {
            E::Lit(lit) => Node::literal(lit.value()),
            E::CharSet(set, _) => Node::char_set(set.value()),
            E::Ref(ident) => {
                let name = ident.to_string();
                match RuleKind::of_name(&name) {
                    RuleKind::Lexer => Node::token(name),
                    RuleKind::Parser => Node::rule_ref(name),
                }
            }
            E::Group(alts, _) => convert_block(alts),
            // Quantifiers wrap their operand in a block, as ANTLR does.
            E::Optional(inner, greedy) => {
                Node::new(NodeKind::Optional { greedy }, vec![operand(*inner)])
            }
            E::Star(inner, greedy) => Node::new(NodeKind::Star { greedy }, vec![operand(*inner)]),
            E::Plus(inner, greedy) => Node::new(NodeKind::Plus { greedy }, vec![operand(*inner)]),
            E::Not(inner, _) => Node::new(NodeKind::Not, vec![negated(*inner)]),
            E::Range(left, right) => Node::new(
                NodeKind::Range,
                vec![Node::from(*left), Node::from(*right)],
            ),
            E::Action { predicate: true } => Node::leaf(NodeKind::Predicate),
            E::Action { predicate: false } => Node::leaf(NodeKind::RuleRoot),
        }
    }
}

fn operand(inner: parser::Element) -> Node {
    match inner {
        parser::Element::Group(alts, _) => convert_block(alts),
        other => Node::seq_block(vec![Node::from(other)]),
    }
}

// `~(A | B)` over single terminals becomes a Set of those terminals.
fn negated(inner: parser::Element) -> Node {
    match inner {
        parser::Element::Group(alts, _) if alts.iter().all(|seq| is_set_member(seq)) => Node::new(
            NodeKind::Set,
            alts.into_iter()
                .flat_map(|seq| seq.into_iter().map(Node::from))
                .collect(),
        ),
        other => Node::from(other),
    }
}

fn is_set_member(seq: &[parser::Element]) -> bool {
    match seq {
        [parser::Element::Lit(_)] | [parser::Element::CharSet(..)] => true,
        [parser::Element::Ref(ident)] => RuleKind::of_name(&ident.to_string()) == RuleKind::Lexer,
        _ => false,
    }
}
