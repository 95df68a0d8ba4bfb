use crate::model::*;
use proc_macro2::Span;
use std::collections::HashSet;
use syn::{Error, Result};

/// Checks the structural invariants the renderers rely on: unique names per
/// namespace, rules filed under the right namespace and node arities.
pub fn validate(grammar: &Grammar) -> Result<()> {
    validate_namespace(&grammar.parser_rules, RuleKind::Parser)?;
    validate_namespace(&grammar.lexer_rules, RuleKind::Lexer)?;
    Ok(())
}

fn validate_namespace(rules: &[Rule], kind: RuleKind) -> Result<()> {
    let mut seen = HashSet::new();

    for rule in rules {
        if !seen.insert(rule.name.as_str()) {
            return Err(error(
                rule,
                format!("Duplicate {} rule '{}'.", kind, rule.name),
            ));
        }
        if rule.kind != kind {
            return Err(error(
                rule,
                format!(
                    "Rule '{}' is a {} rule but was listed with the {} rules.",
                    rule.name, rule.kind, kind
                ),
            ));
        }
        if rule.is_fragment && kind == RuleKind::Parser {
            return Err(error(
                rule,
                format!("Parser rule '{}' cannot be a fragment.", rule.name),
            ));
        }
        validate_node(rule, &rule.body)?;
    }

    Ok(())
}

fn validate_node(rule: &Rule, node: &Node) -> Result<()> {
    let expected = match node.kind {
        NodeKind::Optional { .. } | NodeKind::Plus { .. } | NodeKind::Star { .. } | NodeKind::Not => {
            Some(1)
        }
        NodeKind::Range => Some(2),
        _ if node.is_leaf_kind() => Some(0),
        _ => None,
    };

    if let Some(count) = expected {
        if node.children.len() != count {
            return Err(error(
                rule,
                format!(
                    "{:?} node in rule '{}' expects {} child(ren), but has {}.",
                    node.kind,
                    rule.name,
                    count,
                    node.children.len()
                ),
            ));
        }
    }

    node.children
        .iter()
        .try_for_each(|child| validate_node(rule, child))
}

fn error(rule: &Rule, message: String) -> Error {
    Error::new(Span::call_site(), format!("line {}: {}", rule.line, message))
}
