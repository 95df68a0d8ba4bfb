use crate::algebra::RenderAlgebra;
use crate::model::{Node, NodeKind, Rule};

/// Renders one rule: announces it to the backend, visits its body and frames
/// the result.
pub fn visit_rule<A: RenderAlgebra>(algebra: &mut A, rule: &Rule) -> A::Node {
    algebra.enter_rule(rule);
    // The rule boundary counts as a single-child parent.
    let body = visit(algebra, &rule.body, Parent::RULE);
    algebra.rule(vec![body], &rule.name, rule.line)
}

/// What a node needs to know about its parent while descending.
#[derive(Debug, Clone, Copy)]
struct Parent {
    /// Every ancestor up to the rule boundary has exactly one child.
    sole: bool,
    /// The parent is a Block or Set offering more than one alternative.
    choice: bool,
}

impl Parent {
    const RULE: Parent = Parent {
        sole: true,
        choice: false,
    };

    fn of(node: &Node, parent: Parent) -> Parent {
        Parent {
            sole: parent.sole && node.children.len() <= 1 && !is_operator(node),
            choice: matches!(node.kind, NodeKind::Block | NodeKind::Set) && node.children.len() > 1,
        }
    }
}

fn visit<A: RenderAlgebra>(algebra: &mut A, node: &Node, parent: Parent) -> A::Node {
    let grouping = needs_grouping(node) && !parent.sole;
    let here = Parent::of(node, parent);

    match &node.kind {
        NodeKind::Block => {
            let children = visit_children(algebra, node, here);
            algebra.block(grouping, children)
        }
        NodeKind::Set => {
            let children = visit_children(algebra, node, here);
            algebra.set(grouping, children)
        }
        NodeKind::Alt => {
            let children = visit_children(algebra, node, here);
            // The surrounding `|` layout already delimits each alternative.
            algebra.alt(grouping && !parent.choice, children)
        }
        NodeKind::Sequence => {
            let children = visit_children(algebra, node, here);
            algebra.sequence(children)
        }
        NodeKind::Optional { greedy } => {
            let child = visit(algebra, &node.children[0], here);
            algebra.optional(child, *greedy)
        }
        NodeKind::Plus { greedy } => {
            let child = visit(algebra, &node.children[0], here);
            algebra.plus(child, *greedy)
        }
        NodeKind::Star { greedy } => {
            let child = visit(algebra, &node.children[0], here);
            algebra.star(child, *greedy)
        }
        NodeKind::Not => {
            let child = visit(algebra, &node.children[0], here);
            algebra.not(child)
        }
        NodeKind::Range => {
            let left = visit(algebra, &node.children[0], here);
            let right = visit(algebra, &node.children[1], here);
            algebra.range(left, right)
        }
        NodeKind::Terminal(terminal) => algebra.terminal(terminal),
        NodeKind::RuleRef(name) => algebra.rule_ref(name),
        NodeKind::CharSet(body) => algebra.chars_set(body),
        NodeKind::Predicate => algebra.pred(),
        NodeKind::RuleRoot => algebra.root(),
    }
}

fn visit_children<A: RenderAlgebra>(algebra: &mut A, node: &Node, parent: Parent) -> Vec<A::Node> {
    node.children
        .iter()
        .map(|child| visit(algebra, child, parent))
        .collect()
}

/// True iff `node` is a Block, Set or Alt with more than one child, or any
/// descendant is.
pub fn needs_grouping(node: &Node) -> bool {
    let grouping_kind = matches!(node.kind, NodeKind::Block | NodeKind::Set | NodeKind::Alt);
    (grouping_kind && node.children.len() > 1) || node.children.iter().any(needs_grouping)
}

// Operators bind to their operand, so a chain through them is never the
// whole rule body: `r : (a b)? ;` keeps its parentheses.
fn is_operator(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Optional { .. }
            | NodeKind::Plus { .. }
            | NodeKind::Star { .. }
            | NodeKind::Not
            | NodeKind::Range
    )
}
