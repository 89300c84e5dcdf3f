// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Associative binary operator chains.
//!
//! The AST of `a + b + c + d` is `((a + b) + c) + d`, so selecting `b + c`
//! makes `a + b + c` the common ancestor. Because `+` is associative, the user
//! plausibly meant `b + c`, and extracting exactly those characters is safe.
//!
//! Restrictions:
//! - the operator must be associative (and left-associative)
//! - only one operator kind may appear along the chain
//! - no operand may come from a different macro expansion than the operator
//!
//! Only the extracted range changes. References in unselected operands (the
//! `a` above) still count when choosing the insertion point.
//!
//! ```text
//!          +
//!         / \
//!   N -> +   d
//!       / \
//!      +   c   <- end
//!     / \
//!    a   b     <- start
//! ```

use hoist_ast::node::{BinaryOpKind, OverloadedOperator};
use hoist_ast::{NodeKind, SelectionNodeId, SelectionTree, SourceLocation};
use hoist_core::patch::Span;

/// A built-in or overloaded infix binary operator found in a selection tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBinaryOperator {
    pub kind: BinaryOpKind,
    pub expr_loc: Option<SourceLocation>,
    /// Operand nodes that are part of the selection tree, in source order.
    pub selected_operands: Vec<SelectionNodeId>,
}

impl ParsedBinaryOperator {
    /// Recognize `node` as a binary operator.
    pub fn parse(tree: &SelectionTree<'_>, node: SelectionNodeId) -> Option<Self> {
        let ast = tree.ast();
        let ast_node = ast.node(tree.ast_node(node));
        match &ast_node.kind {
            NodeKind::Binary { op, .. } => Some(ParsedBinaryOperator {
                kind: *op,
                expr_loc: ast_node.expr_loc(),
                selected_operands: tree.children(node).to_vec(),
            }),
            NodeKind::OperatorCall {
                op: OverloadedOperator::Binary(kind),
                args,
                ..
            } if args.len() == 2 => Some(ParsedBinaryOperator {
                kind: *kind,
                expr_loc: ast_node.expr_loc(),
                // The callee is a child too; keep only the arguments.
                selected_operands: tree
                    .children(node)
                    .iter()
                    .copied()
                    .filter(|child| args.contains(&tree.ast_node(*child)))
                    .collect(),
            }),
            _ => None,
        }
    }

    pub fn is_associative(&self) -> bool {
        matches!(
            self.kind,
            BinaryOpKind::Add
                | BinaryOpKind::Mul
                | BinaryOpKind::And
                | BinaryOpKind::Or
                | BinaryOpKind::Xor
                | BinaryOpKind::LAnd
                | BinaryOpKind::LOr
        )
    }

    /// True when some selected operand is located in a different buffer than
    /// the operator itself.
    pub fn crosses_macro_boundary(&self, tree: &SelectionTree<'_>) -> bool {
        let ast = tree.ast();
        let Some(op_loc) = self.expr_loc else {
            return true;
        };
        let op_buffer = ast.sources.buffer_of(op_loc);
        self.selected_operands.iter().any(|operand| {
            let expr = ast.ignore_imp_casts(tree.ast_node(*operand));
            ast.node(expr).expr_loc().map(|loc| ast.sources.buffer_of(loc)) != Some(op_buffer)
        })
    }
}

/// The characters the user meant when selecting inside an associative chain,
/// or `None` when `node` is not such a chain.
pub fn binary_operator_range(tree: &SelectionTree<'_>, node: SelectionNodeId) -> Option<Span> {
    let outer = ParsedBinaryOperator::parse(tree, tree.ignore_implicit(node))?;
    if !outer.is_associative()
        || outer.crosses_macro_boundary(tree)
        || outer.selected_operands.len() != 2
    {
        return None;
    }

    // Left-associative with one operator kind: the chain is a list along the
    // left edges. `end` is already the right operand; push `start` down.
    let mut start = outer.selected_operands[0];
    let end = outer.selected_operands[1];
    while let Some(op) = ParsedBinaryOperator::parse(tree, tree.ignore_implicit(start)) {
        if op.kind != outer.kind || op.crosses_macro_boundary(tree) {
            break;
        }
        match op.selected_operands.as_slice() {
            [rhs] => {
                start = *rhs;
                break;
            }
            [lhs, ..] => start = *lhs,
            [] => break,
        }
    }

    let ast = tree.ast();
    let begin = ast.file_range(tree.ast_node(start))?.start;
    let end = ast.file_range(tree.ast_node(end))?.end;
    (begin <= end).then(|| Span::new(begin, end))
}
