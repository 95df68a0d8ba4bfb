use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::Grammar;

/// Loads the parser and lexer notation files of one grammar.
pub struct GrammarResolver {
    base_dir: PathBuf,
}

impl GrammarResolver {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn resolve<P: AsRef<Path>, L: AsRef<Path>>(&self, parser_file: P, lexer_file: L) -> Result<Grammar> {
        let parser_source = self.read(parser_file.as_ref())?;
        let lexer_source = self.read(lexer_file.as_ref())?;

        let grammar = grammar_render_model::parse_grammar(&parser_source, &lexer_source)?;
        log::info!(
            "Loaded {} parser rules and {} lexer rules",
            grammar.parser_rules.len(),
            grammar.lexer_rules.len()
        );
        Ok(grammar)
    }

    fn read(&self, file: &Path) -> Result<String> {
        let path = self.base_dir.join(file);
        fs::read_to_string(&path).map_err(|source| Error::Read { path, source })
    }
}
