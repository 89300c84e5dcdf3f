// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Where a hoisted declaration goes.
//!
//! The declaration is always inserted directly before a statement whose
//! parent is a block. Starting at the extracted expression, we climb until we
//! reach such a statement, and give up on the way when climbing further would
//! move the expression away from a declaration it uses.
//!
//! Not supported: extraction out of labels, switch statements, and case
//! labels, which would need to jump over the whole switch. Loop bodies are
//! climbed out of without checking whether the value changes per iteration.

use tracing::{debug, trace};

use hoist_ast::{Ast, NodeId, NodeKind, SelectionNodeId, SelectionTree};

/// Whether a declaration may be placed outside of `node`.
pub fn can_extract_outside(tree: &SelectionTree<'_>, node: SelectionNodeId) -> bool {
    let ast = tree.ast();
    let kind = ast.kind(tree.ast_node(node));
    if kind.is_expr() {
        // A default argument must not become a local of the enclosing
        // function.
        return !tree
            .parent(node)
            .is_some_and(|parent| matches!(ast.kind(tree.ast_node(parent)), NodeKind::Param { .. }));
    }
    matches!(
        kind,
        NodeKind::Attributed { .. }
            | NodeKind::Compound { .. }
            | NodeKind::RangeFor { .. }
            | NodeKind::DeclStmt { .. }
            | NodeKind::Do { .. }
            | NodeKind::For { .. }
            | NodeKind::If { .. }
            | NodeKind::Return { .. }
            | NodeKind::While { .. }
            | NodeKind::Var { .. }
    )
}

/// True if no declaration in `referenced` lies inside `scope`.
fn expr_is_valid_outside(ast: &Ast, scope: NodeId, referenced: &[NodeId]) -> bool {
    let Some(scope_span) = ast.file_range(scope) else {
        return true;
    };
    !referenced.iter().any(|decl| {
        ast.file_range(*decl)
            .is_some_and(|decl_span| scope_span.contains(&decl_span))
    })
}

/// The statement before which the extracted declaration is inserted.
pub fn compute_insertion_point(
    tree: &SelectionTree<'_>,
    expr: SelectionNodeId,
    referenced: &[NodeId],
) -> Option<NodeId> {
    let ast = tree.ast();
    let mut cur = expr;
    while let Some(parent) = tree.parent(cur) {
        if !can_extract_outside(tree, cur) {
            debug!(node = %tree.ast_node(cur), kind = ast.kind(tree.ast_node(cur)).name(), "cannot extract outside");
            break;
        }
        let cur_id = tree.ast_node(cur);
        let is_stmt = ast.kind(cur_id).is_stmt();
        if is_stmt && !expr_is_valid_outside(ast, cur_id, referenced) {
            debug!(scope = %cur_id, "extraction would move a referenced declaration out of scope");
            break;
        }
        let parent_id = tree.ast_node(parent);
        if let NodeKind::Compound { .. } = ast.kind(parent_id) {
            let in_macro = ast
                .node(parent_id)
                .range
                .is_some_and(|range| ast.sources.is_macro_id(range.begin));
            if in_macro {
                trace!(block = %parent_id, "block begins in a macro, climbing further");
            } else {
                return is_stmt.then_some(cur_id);
            }
        }
        cur = parent;
    }
    None
}
