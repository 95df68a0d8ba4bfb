use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Grammar, RuleKind};

static SECTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^// SECTION: (?P<section>[ \w]*?)$").unwrap());

/// The section named by a `// SECTION: <name>` marker line.
pub fn section_marker(line: &str) -> Option<&str> {
    SECTION_MARKER
        .captures(line.trim_start())
        .and_then(|captures| captures.name("section"))
        .map(|section| section.as_str())
}

/// Finds the section a rule opens by looking a fixed number of lines above
/// the rule in its source.
pub struct SectionBinder<'g> {
    grammar: &'g Grammar,
    offset: usize,
}

impl<'g> SectionBinder<'g> {
    pub fn new(grammar: &'g Grammar, offset: usize) -> Self {
        Self { grammar, offset }
    }

    /// `line` is the 1-based source line of the rule.
    pub fn section_at(&self, kind: RuleKind, line: usize) -> Option<String> {
        let marker_line = line.checked_sub(self.offset)?;
        let index = marker_line.checked_sub(1)?;
        let text = self.grammar.source(kind).get(index)?;
        section_marker(text).map(str::to_owned)
    }
}
