//! Structured backend: renders rules into a cross-referenced element tree.
//!
//! Rendering is two-phase. Visiting a node yields a [`Rendered`] record with
//! the predicted text length of the node and a deferred build step. Parents
//! read their children's lengths to place line breaks and parentheses, and
//! the build steps run afterwards, top-down, once the rule is complete.

pub mod document;

use std::collections::BTreeSet;

use crate::algebra::{Generator, RenderAlgebra};
use crate::config::RenderConfig;
use crate::docs::DocStore;
use crate::error::Result;
use crate::exclusion;
use crate::inlining::LexerInliner;
use crate::model::{escape_set, Grammar, Rule, RuleKind, Terminal};
use crate::sections::SectionBinder;
use crate::usages::UsageIndex;
use crate::visitor::visit_rule;

use document::{Document, NodeId};

type Build = Box<dyn FnOnce(&mut DocumentBuilder)>;

/// One visited node: predicted length, the section a rule opens, and the
/// deferred build step.
pub struct Rendered {
    pub length: usize,
    pub section: Option<String>,
    pub build: Build,
}

impl Rendered {
    pub fn new(length: usize, build: impl FnOnce(&mut DocumentBuilder) + 'static) -> Self {
        Self {
            length,
            section: None,
            build: Box::new(build),
        }
    }

    fn empty() -> Self {
        Self::new(0, |_| {})
    }
}

/// Writes elements at a cursor into the [`Document`] and owns the usage
/// index until the document is finished.
pub struct DocumentBuilder {
    document: Document,
    stack: Vec<NodeId>,
    usages: UsageIndex,
}

impl DocumentBuilder {
    pub fn new(root: &str) -> Self {
        let document = Document::new(root);
        let stack = vec![document.root()];
        Self {
            document,
            stack,
            usages: UsageIndex::new(),
        }
    }

    pub fn current(&self) -> NodeId {
        self.stack[self.stack.len() - 1]
    }

    pub fn root(&self) -> NodeId {
        self.document.root()
    }

    /// Appends an element at the cursor and builds its content inside it.
    pub fn element(&mut self, name: &str, body: impl FnOnce(&mut Self)) -> NodeId {
        let id = self.document.append_element(self.current(), name);
        self.within(id, body);
        id
    }

    /// Runs `body` with the cursor moved to `id`.
    pub fn within(&mut self, id: NodeId, body: impl FnOnce(&mut Self)) {
        self.stack.push(id);
        body(self);
        self.stack.pop();
    }

    pub fn empty(&mut self, name: &str) -> NodeId {
        self.document.append_element(self.current(), name)
    }

    pub fn attribute(&mut self, key: &str, value: &str) {
        self.document.set_attribute(self.current(), key, value);
    }

    pub fn text(&mut self, text: &str) {
        self.document.append_text(self.current(), text);
    }

    pub fn cdata(&mut self, text: &str) {
        self.document.append_cdata(self.current(), text);
    }

    pub fn symbol(&mut self, symbol: &str) {
        self.element("symbol", |b| b.cdata(symbol));
    }

    pub fn string(&mut self, text: &str) {
        self.element("string", |b| b.cdata(text));
    }

    pub fn whitespace(&mut self, count: usize) {
        self.string(&"&nbsp;".repeat(count));
    }

    pub fn crlf(&mut self) {
        self.empty("crlf");
    }

    pub fn doc(&mut self, text: Option<String>) {
        if let Some(text) = text {
            self.element("doc", |b| b.cdata(&text));
        }
    }

    pub fn usages(&mut self) -> &mut UsageIndex {
        &mut self.usages
    }

    /// Flushes the usage index into the tree.
    pub fn finish(self) -> Document {
        let Self {
            mut document,
            usages,
            ..
        } = self;
        usages.flush(&mut document);
        document
    }
}

/// The rule whose body is being visited.
struct CurrentRule {
    name: String,
    kind: RuleKind,
    line_breaks: Option<BTreeSet<usize>>,
}

pub struct StructuredGenerator<'g> {
    config: &'g RenderConfig,
    docs: &'g dyn DocStore,
    grammar: &'g Grammar,
    inliner: LexerInliner<'g>,
    sections: SectionBinder<'g>,
    builder: DocumentBuilder,
    current: Option<CurrentRule>,
}

impl<'g> StructuredGenerator<'g> {
    pub fn new(grammar: &'g Grammar, config: &'g RenderConfig, docs: &'g dyn DocStore) -> Self {
        Self {
            config,
            docs,
            grammar,
            inliner: LexerInliner::new(grammar, config),
            sections: SectionBinder::new(grammar, config.section_marker_offset),
            builder: DocumentBuilder::new("tokens"),
            current: None,
        }
    }

    /// Runs every phase of [`Generator::run`] and returns the finished tree
    /// instead of its serialization.
    pub fn build_document(mut self, grammar: &Grammar) -> Document {
        self.generate_notation_description();
        self.generate_parser_rules(grammar);
        self.generate_lexer_rules(grammar);
        self.builder.finish()
    }

    fn current_name(&self) -> String {
        self.current
            .as_ref()
            .map(|rule| rule.name.clone())
            .unwrap_or_default()
    }

    fn current_kind(&self) -> RuleKind {
        self.current
            .as_ref()
            .map_or(RuleKind::Parser, |rule| rule.kind)
    }

    fn quantified(child: Rendered, symbol: &'static str, greedy: bool) -> Rendered {
        let length = child.length + 1 + usize::from(!greedy);
        Rendered::new(length, move |b| {
            (child.build)(b);
            b.symbol(symbol);
            if !greedy {
                b.symbol("?");
            }
        })
    }

    fn group_using_pipe(grouping: bool, children: Vec<Rendered>) -> Rendered {
        let count = children.len();
        let length = children.iter().map(|child| child.length).sum::<usize>() + 3 * count;
        Rendered::new(length, move |b| {
            let parens = grouping && count > 1;
            if parens {
                b.symbol("(");
            }
            for (index, child) in children.into_iter().enumerate() {
                if index != 0 {
                    if grouping {
                        b.whitespace(1);
                    } else {
                        b.crlf();
                        b.whitespace(2);
                    }
                    b.symbol("|");
                    b.whitespace(1);
                }
                (child.build)(b);
            }
            if parens {
                b.symbol(")");
            }
        })
    }

    /// Renders visited rules in order, opening a `set` wrapper at each
    /// section marker. Inlined lexer rules keep their section but get no item.
    fn emit_rules(&mut self, rules: Vec<(Rule, Rendered)>) {
        let root = self.builder.root();
        let mut context = root;
        let mut section: Option<String> = None;

        for (rule, rendered) in rules {
            if let Some(name) = rendered.section {
                let doc = self.docs.lookup(&name);
                context = self.builder.document.append_element(root, "set");
                self.builder.within(context, |b| {
                    b.attribute("file-name", &name);
                    b.doc(doc);
                });
                section = Some(name);
            }

            if self.inliner.is_inlined(&rule.name) {
                log::debug!("Omitting inlined lexer rule '{}'", rule.name);
                continue;
            }

            let key = match &section {
                Some(section) => format!("{}/{}", section, rule.name),
                None => rule.name.clone(),
            };
            let doc = self.docs.lookup(&key);
            let build = rendered.build;
            self.builder.within(context, |b| {
                b.doc(doc);
                b.element("item", |b| {
                    if rule.is_fragment {
                        b.element("annotation", |b| b.text("helper"));
                    }
                    build(b);
                });
            });
        }
    }

    fn visit_all(&mut self, rules: Vec<Rule>) -> Vec<(Rule, Rendered)> {
        let mut visited = Vec::with_capacity(rules.len());
        for rule in rules {
            log::debug!("Rendering {} rule '{}'", rule.kind, rule.name);
            let rendered = visit_rule(self, &rule);
            visited.push((rule, rendered));
        }
        visited
    }
}

impl RenderAlgebra for StructuredGenerator<'_> {
    type Node = Rendered;

    fn enter_rule(&mut self, rule: &Rule) {
        self.current = Some(CurrentRule {
            name: rule.name.clone(),
            kind: rule.kind,
            line_breaks: self.config.line_breaks(&rule.name).cloned(),
        });
    }

    fn optional(&mut self, child: Rendered, greedy: bool) -> Rendered {
        Self::quantified(child, "?", greedy)
    }

    fn plus(&mut self, child: Rendered, greedy: bool) -> Rendered {
        Self::quantified(child, "+", greedy)
    }

    fn star(&mut self, child: Rendered, greedy: bool) -> Rendered {
        Self::quantified(child, "*", greedy)
    }

    fn not(&mut self, child: Rendered) -> Rendered {
        Rendered::new(child.length + 1, move |b| {
            b.symbol("~");
            (child.build)(b);
        })
    }

    fn range(&mut self, left: Rendered, right: Rendered) -> Rendered {
        Rendered::new(left.length + right.length + 2, move |b| {
            (left.build)(b);
            b.string("..");
            (right.build)(b);
        })
    }

    fn rule(&mut self, children: Vec<Rendered>, name: &str, line: usize) -> Rendered {
        let length = children.iter().map(|child| child.length).sum();
        let section = self.sections.section_at(self.current_kind(), line);
        let start = self.config.is_start_rule(name);
        let name = name.to_owned();

        let mut rendered = Rendered::new(length, move |b| {
            if start {
                b.element("annotation", |b| b.text("start"));
            }
            b.element("declaration", |b| {
                b.attribute("name", &name);
                let anchor = b.current();
                b.usages().declare(&name, anchor);
            });
            b.element("description", |b| {
                b.whitespace(2);
                b.symbol(":");
                b.whitespace(1);
                for child in children {
                    (child.build)(b);
                }
                b.crlf();
                b.whitespace(2);
                b.element("other", |b| b.text(";"));
            });
        });
        rendered.section = section;
        rendered
    }

    fn block(&mut self, grouping: bool, children: Vec<Rendered>) -> Rendered {
        Self::group_using_pipe(grouping, children)
    }

    fn set(&mut self, grouping: bool, children: Vec<Rendered>) -> Rendered {
        Self::group_using_pipe(grouping, children)
    }

    fn alt(&mut self, grouping: bool, children: Vec<Rendered>) -> Rendered {
        let count = children.len();
        let length = children.iter().map(|child| child.length + count).sum();
        let budget = self.config.column_budget;
        let line_breaks = self
            .current
            .as_ref()
            .and_then(|rule| rule.line_breaks.clone());

        Rendered::new(length, move |b| {
            let parens = grouping && count > 1;
            if parens {
                b.symbol("(");
            }
            let mut buffered = 0;
            for (index, child) in children.into_iter().enumerate() {
                if index != 0 {
                    buffered += child.length;
                    match &line_breaks {
                        None if buffered > budget => {
                            b.crlf();
                            b.whitespace(3);
                            buffered = 0;
                        }
                        Some(indices) if indices.contains(&index) => {
                            b.crlf();
                            b.whitespace(3);
                        }
                        _ => {}
                    }
                    b.whitespace(1);
                }
                (child.build)(b);
            }
            if parens {
                b.symbol(")");
            }
        })
    }

    fn sequence(&mut self, children: Vec<Rendered>) -> Rendered {
        let length = children.iter().map(|child| child.length).sum::<usize>()
            + children.len().saturating_sub(1);
        Rendered::new(length, move |b| {
            for (index, child) in children.into_iter().enumerate() {
                if index != 0 {
                    b.whitespace(1);
                }
                (child.build)(b);
            }
        })
    }

    fn terminal(&mut self, terminal: &Terminal) -> Rendered {
        let name = match terminal {
            Terminal::Literal(_) => {
                let text = terminal.to_string();
                return Rendered::new(text.len(), move |b| b.string(&text));
            }
            Terminal::Token(name) => name,
        };

        if let Some(spelling) = self.inliner.resolve(name) {
            let spelling = spelling.to_owned();
            return Rendered::new(spelling.len(), move |b| b.string(&spelling));
        }

        let user = self.current_name();
        let target = name.clone();
        let link = self
            .config
            .terminal_link(name)
            .map(|url| format!("<a href=\"{}\" target=\"_blank\">{}</a>", url, name));
        let declared = self.grammar.lexer_rule(name).is_some();

        Rendered::new(name.len(), move |b| {
            b.usages().reference(&target, &user);
            if let Some(link) = link {
                b.element("other", |b| b.cdata(&link));
            } else if declared {
                b.element("identifier", |b| b.attribute("name", &target));
            } else {
                b.string(&target);
            }
        })
    }

    fn rule_ref(&mut self, name: &str) -> Rendered {
        let user = self.current_name();
        let target = name.to_owned();
        Rendered::new(target.len(), move |b| {
            b.element("identifier", |b| b.attribute("name", &target));
            b.usages().reference(&target, &user);
        })
    }

    fn chars_set(&mut self, body: &str) -> Rendered {
        let text = format!("[{}]", escape_set(body));
        Rendered::new(text.len(), move |b| b.string(&text))
    }

    fn root(&mut self) -> Rendered {
        Rendered::empty()
    }

    fn pred(&mut self) -> Rendered {
        Rendered::empty()
    }
}

impl Generator for StructuredGenerator<'_> {
    type Output = String;

    fn generate_notation_description(&mut self) {
        let doc = self.docs.lookup("description");
        self.builder.element("set", |b| {
            b.attribute("file-name", "description");
            b.doc(doc);
        });
    }

    fn generate_parser_rules(&mut self, grammar: &Grammar) {
        log::info!("Rendering {} parser rules", grammar.parser_rules.len());
        let rules = exclusion::filter_rules(&grammar.parser_rules, &self.config.excluded_rules);
        let rendered = self.visit_all(rules);
        self.emit_rules(rendered);
    }

    fn generate_lexer_rules(&mut self, grammar: &Grammar) {
        log::info!("Rendering {} lexer rules", grammar.lexer_rules.len());
        let rules: Vec<Rule> = exclusion::filter_rules(&grammar.lexer_rules, &self.config.excluded_rules)
            .into_iter()
            .filter(|rule| !self.config.is_hidden_lexer_rule(rule))
            .collect();
        let rendered = self.visit_all(rules);
        self.emit_rules(rendered);
    }

    fn finish(self) -> Result<String> {
        self.builder.finish().to_xml()
    }
}
