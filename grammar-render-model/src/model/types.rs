use std::fmt;

/// Mode assigned to lexer rules declared outside any `mode` block.
pub const DEFAULT_MODE: &str = "DEFAULT_MODE";

/// The namespace a rule lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Lexer,
    Parser,
}

impl RuleKind {
    /// ANTLR convention: token (lexer) names start with an uppercase letter.
    pub fn of_name(name: &str) -> Self {
        if name.chars().next().is_some_and(|c| c.is_uppercase()) {
            RuleKind::Lexer
        } else {
            RuleKind::Parser
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Lexer => write!(f, "lexer"),
            RuleKind::Parser => write!(f, "parser"),
        }
    }
}

/// A terminal leaf: either a reference to a lexer token or a literal spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminal {
    Token(String),
    Literal(String),
}

impl Terminal {
    /// The name or literal value, without any quoting.
    pub fn text(&self) -> &str {
        match self {
            Terminal::Token(name) => name,
            Terminal::Literal(value) => value,
        }
    }
}

/// Renders a token name as-is and a literal in ANTLR's quoted form (`'\n'`).
impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Token(name) => write!(f, "{}", name),
            Terminal::Literal(value) => write!(f, "'{}'", escape(value)),
        }
    }
}

/// Escapes control characters, backslashes and single quotes the way ANTLR
/// source spells them.
pub fn escape(value: &str) -> String {
    escape_with(value, '\'')
}

/// Escaping for the body of a character set, where `]` is the delimiter.
pub fn escape_set(value: &str) -> String {
    escape_with(value, ']')
}

fn escape_with(value: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\\' => out.push_str("\\\\"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
