// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declarations referenced by an expression.
//!
//! Used to decide how far up a declaration can be hoisted: it must stay below
//! every declaration the expression mentions.

use hoist_ast::node::LambdaCapture;
use hoist_ast::{Ast, NodeId, NodeKind};

/// Every declaration referenced inside `expr`, in traversal order.
/// Duplicates are kept.
///
/// A lambda contributes what it captures and what its signature mentions, but
/// nothing from its body: locals of the body cannot go out of scope.
pub fn collect_referenced_decls(ast: &Ast, expr: NodeId) -> Vec<NodeId> {
    let mut found = Vec::new();
    collect(ast, expr, &mut found);
    found
}

fn collect(ast: &Ast, id: NodeId, found: &mut Vec<NodeId>) {
    match ast.kind(id) {
        NodeKind::DeclRef { decl, .. } => {
            // `[]{...}()` refers to the closure's own call operator.
            if !is_lambda_call_operator(ast, *decl) {
                found.push(*decl);
            }
        }
        NodeKind::Lambda { .. } => {
            collect_lambda(ast, id, found);
            return;
        }
        _ => {}
    }
    for child in ast.children(id) {
        collect(ast, child, found);
    }
}

/// Captures, requires clause, template parameters, then the call operator's
/// return type, parameters, and attributes.
fn collect_lambda(ast: &Ast, lambda: NodeId, found: &mut Vec<NodeId>) {
    let NodeKind::Lambda {
        captures,
        template_params,
        params,
        attrs,
        trailing_return,
        requires_clause,
        ..
    } = ast.kind(lambda)
    else {
        return;
    };

    for capture in captures {
        match capture {
            LambdaCapture::ByCopy { var } | LambdaCapture::ByRef { var } => found.push(*var),
            LambdaCapture::Init { var } => collect(ast, *var, found),
            LambdaCapture::This => {}
        }
    }
    if let Some(clause) = requires_clause {
        collect(ast, *clause, found);
    }
    for param in template_params {
        collect(ast, *param, found);
    }
    if let Some(ret) = trailing_return {
        collect(ast, *ret, found);
    }
    for param in params {
        collect(ast, *param, found);
    }
    for attr in attrs {
        collect(ast, *attr, found);
    }
}

fn is_lambda_call_operator(ast: &Ast, decl: NodeId) -> bool {
    matches!(
        ast.kind(decl),
        NodeKind::Function {
            lambda_call_operator: true,
            ..
        }
    )
}
