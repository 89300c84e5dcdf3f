// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Whether a selected expression is worth extracting.

use tracing::debug;

use hoist_ast::{Ast, NodeId, NodeKind, Selection, SelectionNodeId, SelectionTree};

use crate::layers::binary_op::ParsedBinaryOperator;

/// True if `inner`, a direct child of `outer`, appears as a statement whose
/// value is unused rather than as a value.
pub fn child_expr_is_disallowed_stmt(ast: &Ast, outer: NodeId, inner: NodeId) -> bool {
    match ast.kind(outer) {
        NodeKind::Case { .. } | NodeKind::Default { .. } => true,
        NodeKind::While { body, .. }
        | NodeKind::Do { body, .. }
        | NodeKind::For { body, .. }
        | NodeKind::RangeFor { body, .. } => inner == *body,
        NodeKind::If { then, else_, .. } => inner == *then || Some(inner) == *else_,
        // Subexpressions and everything else are values.
        _ => false,
    }
}

fn reject(node: NodeId, reason: &str) -> bool {
    debug!(%node, reason, "not eligible for extraction");
    false
}

/// Whether the expression at `node` can and should be extracted.
pub fn eligible_for_extraction(tree: &SelectionTree<'_>, node: SelectionNodeId) -> bool {
    let ast = tree.ast();
    let id = tree.ast_node(node);
    let expr = ast.node(id);
    if !expr.kind.is_expr() {
        return reject(id, "not an expression");
    }

    match &expr.ty {
        None => return reject(id, "expression has no type"),
        Some(ty) if ty.is_void() => return reject(id, "void expression"),
        Some(_) => {}
    }

    // A plain name is not worth a variable of its own.
    // TODO: qualified names such as `std::is_same<A, B>::value` arguably are.
    if let NodeKind::DeclRef { .. } = expr.kind {
        return reject(id, "plain name reference");
    }

    if let NodeKind::Member { base, .. } = expr.kind {
        let base = ast.node(ast.ignore_imp_casts(base));
        if matches!(base.kind, NodeKind::This) && base.implicit {
            return reject(id, "member access through implicit this");
        }
    }

    // `placeholder = a = 1` helps nobody.
    let binary_op = ParsedBinaryOperator::parse(tree, node);
    if binary_op.as_ref().is_some_and(|op| op.kind.is_assignment()) {
        return reject(id, "assignment");
    }

    let outer = tree.outer_implicit(node);
    let Some(parent) = tree.parent(outer) else {
        return reject(id, "no parent");
    };
    let outer_id = tree.ast_node(outer);
    let parent_id = tree.ast_node(parent);
    if child_expr_is_disallowed_stmt(ast, parent_id, outer_id) {
        return reject(id, "expression used as a statement");
    }

    let is_fully_selected_target = |target: NodeId| {
        if target != outer_id {
            return false;
        }
        // For `1 + 2 + [[3 + 4]]` the target is the whole chain, but only
        // part of it is selected.
        binary_op.is_none() || is_fully_selected(tree, node)
    };

    // `x = [[rhs]]` would just duplicate the right-hand side.
    if let NodeKind::Binary { op, rhs, .. } = ast.kind(parent_id) {
        if op.is_assignment() && is_fully_selected_target(*rhs) {
            return reject(id, "entire right-hand side of an assignment");
        }
    }

    // Selecting part of a lambda (say its capture list) targets the lambda;
    // only offer extraction when all of it is selected. The lambda's own
    // tokens stop at the signature, so compare against its full range.
    if let NodeKind::Lambda { .. } = expr.kind {
        let covered = ast
            .file_range(id)
            .is_some_and(|range| tree.selection().contains(&range));
        return (covered && tree.selected(node) == Selection::Complete)
            || reject(id, "lambda not completely selected");
    }

    // Same as assignments, except that moving an init-capture's initializer
    // out of the capture list is useful.
    if let NodeKind::Var {
        init: Some(init),
        init_capture: false,
        ..
    } = ast.kind(parent_id)
    {
        if is_fully_selected_target(*init) {
            return reject(id, "entire initializer of a variable");
        }
    }

    true
}

/// Every node of the subtree that owns source text is completely selected.
/// Implicit and rangeless nodes own none and are skipped.
fn is_fully_selected(tree: &SelectionTree<'_>, node: SelectionNodeId) -> bool {
    let ast_node = tree.ast().node(tree.ast_node(node));
    let owns_text = ast_node.range.is_some() && !ast_node.implicit;
    if owns_text && tree.selected(node) != Selection::Complete {
        return false;
    }
    tree.children(node)
        .iter()
        .all(|child| is_fully_selected(tree, *child))
}
