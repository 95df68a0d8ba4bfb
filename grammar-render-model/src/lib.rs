//! # grammar-render-model
//!
//! The Grammar Model consumed by `grammar-render`: named parser and lexer
//! rules, each owning one AST built from a closed set of node kinds, plus the
//! raw source lines the rules were read from.
//!
//! Models are normally produced by an external grammar tool. This crate also
//! reads a textual notation of the model so that grammars can be written by
//! hand and fixtures stay readable:
//!
//! ```text
//! parser grammar Greeting {
//!     greeting : HELLO NAME? ;
//! }
//!
//! lexer grammar GreetingLexer {
//!     HELLO : "hi" ;
//!     NAME : ["a-z"]+ ;
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. **[parser]**: Parse notation tokens into a syntactic AST.
//! 2. **[model]**: Convert the AST into the Grammar Model (via `Into`).
//! 3. **[validator]**: Check the structural invariants of the model.
//! 4. **[analysis]**: Query helpers used by the renderers.

use proc_macro2::TokenStream;
use syn::Result;

pub mod analysis;
pub mod model;
pub mod parser;
pub mod validator;

/// Reads one `parser grammar` or `lexer grammar` block from tokens.
pub fn parse_rule_set(input: TokenStream) -> Result<model::RuleSet> {
    let p_ast: parser::GrammarFile = syn::parse2(input)?;
    Ok(p_ast.into())
}

/// Reads one notation source; rule lines are taken from `source`.
pub fn parse_rule_set_str(source: &str) -> Result<model::RuleSet> {
    let p_ast: parser::GrammarFile = syn::parse_str(source)?;
    Ok(p_ast.into())
}

/// Reusable pipeline: parses the parser and lexer sources, assembles the
/// model with its source lines, and validates it.
pub fn parse_grammar(parser_source: &str, lexer_source: &str) -> Result<model::Grammar> {
    let parser_rules = parse_rule_set_str(parser_source)?;
    let lexer_rules = parse_rule_set_str(lexer_source)?;

    let grammar = assemble(parser_rules, lexer_rules)?.with_sources(parser_source, lexer_source);
    validator::validate(&grammar)?;
    Ok(grammar)
}

/// Like [`parse_grammar`], for token input without source lines.
pub fn parse_grammar_tokens(parser: TokenStream, lexer: TokenStream) -> Result<model::Grammar> {
    let grammar = assemble(parse_rule_set(parser)?, parse_rule_set(lexer)?)?;
    validator::validate(&grammar)?;
    Ok(grammar)
}

fn assemble(parser: model::RuleSet, lexer: model::RuleSet) -> Result<model::Grammar> {
    for (set, expected) in [
        (&parser, model::RuleKind::Parser),
        (&lexer, model::RuleKind::Lexer),
    ] {
        if set.kind != expected {
            return Err(syn::Error::new(
                proc_macro2::Span::call_site(),
                format!(
                    "Grammar '{}' is a {} grammar, expected a {} grammar.",
                    set.name, set.kind, expected
                ),
            ));
        }
    }
    Ok(model::Grammar::new(parser.rules, lexer.rules))
}

#[cfg(test)]
mod tests {
    use super::model::*;
    use super::*;
    use quote::quote;

    #[test]
    fn test_parse_rules_and_lines() {
        let parser = "parser grammar P {\n    greeting\n        : HELLO NAME?\n        ;\n}\n";
        let lexer = "lexer grammar L {\n    HELLO : \"hi\" ;\n    fragment LETTER : [\"a-z\"] ;\n    NAME : LETTER+ ;\n}\n";

        let grammar = parse_grammar(parser, lexer).expect("Parsing failed");

        let greeting = grammar.parser_rule("greeting").unwrap();
        assert_eq!(greeting.line, 2);
        assert_eq!(grammar.parser_source.len(), 5);

        let letter = grammar.lexer_rule("LETTER").unwrap();
        assert!(letter.is_fragment);
        assert_eq!(letter.line, 3);
        assert_eq!(letter.mode, DEFAULT_MODE);
    }

    #[test]
    fn test_parse_ebnf_structure() {
        let set = parse_rule_set(quote! {
            parser grammar Ebnf {
                test : "start" (a | b)* "end"?? ;
            }
        })
        .expect("Parsing failed");

        let body = &set.rules[0].body;
        assert_eq!(body.kind, NodeKind::Block);
        let alt = &body.children[0];
        assert_eq!(alt.children.len(), 3);

        match &alt.children[1] {
            Node {
                kind: NodeKind::Star { greedy: true },
                children,
            } => {
                assert_eq!(children[0].kind, NodeKind::Block);
                assert_eq!(children[0].children.len(), 2);
            }
            other => panic!("Expected Star, got {:?}", other),
        }
        assert_eq!(alt.children[2].kind, NodeKind::Optional { greedy: false });
    }

    #[test]
    fn test_parse_lexer_constructs() {
        let set = parse_rule_set(quote! {
            lexer grammar L {
                WS : [" \t"]+ -> skip ;
                NOT_QUOTE : ~('"' | '\\') ;
                DIGIT : '0' .. '9' ;
                mode Inside {
                    INSIDE_WS : WS -> channel(HIDDEN) ;
                }
            }
        })
        .expect("Parsing failed");

        assert_eq!(set.kind, RuleKind::Lexer);
        assert_eq!(set.rules[3].mode, "Inside");

        let not = &set.rules[1].body.children[0].children[0];
        assert_eq!(not.kind, NodeKind::Not);
        assert_eq!(not.children[0].kind, NodeKind::Set);
        assert_eq!(not.children[0].children.len(), 2);

        let range = &set.rules[2].body.children[0].children[0];
        assert_eq!(range.kind, NodeKind::Range);
    }

    #[test]
    fn test_labels_and_actions() {
        let set = parse_rule_set_str(
            "parser grammar P {
                call : target=expr args+=arg* { notify(); } {isCall()}? # Call
                     | expr # Plain
                     ;
            }",
        )
        .expect("Parsing failed");
        assert_eq!(set.rules[0].body.children.len(), 2);

        let kinds: Vec<_> = set.rules[0].body.children[0]
            .children
            .iter()
            .map(|n| n.kind.clone())
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::RuleRef("expr".into()),
                NodeKind::Star { greedy: true },
                NodeKind::RuleRoot,
                NodeKind::Predicate,
            ]
        );
    }

    #[test]
    fn test_unrecognized_element() {
        let err = parse_rule_set(quote! {
            parser grammar P { r : a 42 ; }
        })
        .err()
        .expect("Expected failure");
        assert!(err.to_string().contains("unrecognized grammar element"));
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let err = parse_grammar_tokens(
            quote! { parser grammar P { r : A ; r : B ; } },
            quote! { lexer grammar L { A : "a" ; B : "b" ; } },
        )
        .err()
        .expect("Expected failure");
        assert!(err.to_string().contains("Duplicate parser rule 'r'"));
    }
}
