//! # grammar-render
//!
//! Renders an ANTLR-style grammar, already parsed into named rules and ASTs
//! (see [`model`]), in one of two forms:
//!
//! * **Text**: a flat notation listing, one rule per paragraph.
//! * **Xml**: a structured document with declarations, identifiers, per-rule
//!   back-references (`usages`) and documentation snippets grouped by source
//!   sections.
//!
//! Both backends implement the same [`algebra::RenderAlgebra`], driven by the
//! [`visitor`]. Trivial lexer tokens are inlined at their parser-side usage
//! sites ([`inlining`]) and configured noise rules are removed beforehand
//! ([`exclusion`]).
//!
//! ```no_run
//! use grammar_render::{convert, docs::NoDocs, config::RenderConfig, Format};
//!
//! let text = convert(
//!     Format::Text,
//!     "grammar/KotlinParser.notation",
//!     "grammar/KotlinLexer.notation",
//!     &RenderConfig::default(),
//!     &NoDocs,
//! )?;
//! # Ok::<(), grammar_render::Error>(())
//! ```

use std::path::Path;
use std::str::FromStr;

pub mod algebra;
pub mod config;
pub mod docs;
pub mod error;
pub mod exclusion;
pub mod inlining;
pub mod resolver;
pub mod sections;
pub mod structured;
pub mod testing;
pub mod text;
pub mod usages;
pub mod visitor;

pub use grammar_render_model::analysis;
pub use grammar_render_model::model;
pub use grammar_render_model::parse_grammar;

pub use error::{Error, Result};

use algebra::Generator;
use config::RenderConfig;
use docs::DocStore;
use model::Grammar;
use resolver::GrammarResolver;
use structured::StructuredGenerator;
use text::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Xml,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "xml" => Ok(Format::Xml),
            other => Err(format!("unknown format '{}', expected 'text' or 'xml'", other)),
        }
    }
}

/// Renders `grammar` in the requested format.
pub fn render(
    grammar: &Grammar,
    format: Format,
    config: &RenderConfig,
    docs: &dyn DocStore,
) -> Result<String> {
    log::info!("Rendering grammar as {:?}", format);
    match format {
        Format::Text => TextGenerator::new(grammar, config).run(grammar),
        Format::Xml => StructuredGenerator::new(grammar, config, docs).run(grammar),
    }
}

/// Reads the two notation files and renders them.
pub fn convert<P: AsRef<Path>, L: AsRef<Path>>(
    format: Format,
    parser_file: P,
    lexer_file: L,
    config: &RenderConfig,
    docs: &dyn DocStore,
) -> Result<String> {
    let grammar = GrammarResolver::new(".").resolve(parser_file, lexer_file)?;
    render(&grammar, format, config, docs)
}
