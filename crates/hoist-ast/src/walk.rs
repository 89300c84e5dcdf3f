// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Kind-dispatched child enumeration.
//!
//! [`children`] lists owned subtrees in source order; [`references`] lists the
//! declarations a node points at without owning them. Every traversal in the
//! workspace goes through these two functions.

use crate::node::{LambdaCapture, NodeId, NodeKind};

/// Owned children of a node, in source order.
pub fn children(kind: &NodeKind) -> Vec<NodeId> {
    let mut out = Vec::new();
    match kind {
        NodeKind::TranslationUnit { decls } => out.extend(decls),
        NodeKind::Function {
            params,
            body,
            attrs,
            ..
        } => {
            out.extend(attrs);
            out.extend(params);
            out.extend(body);
        }
        NodeKind::Record { members, .. } => out.extend(members),
        NodeKind::Field { init, .. } | NodeKind::Var { init, .. } => out.extend(init),
        NodeKind::Param { default_arg, .. } | NodeKind::TemplateParam { default_arg, .. } => {
            out.extend(default_arg)
        }
        NodeKind::Property { .. } => {}

        NodeKind::Compound { body } => out.extend(body),
        NodeKind::DeclStmt { decls } => out.extend(decls),
        NodeKind::Return { value } => out.extend(value),
        NodeKind::If {
            init,
            cond,
            then,
            else_,
        } => {
            out.extend(init);
            out.push(*cond);
            out.push(*then);
            out.extend(else_);
        }
        NodeKind::While { cond, body } => {
            out.push(*cond);
            out.push(*body);
        }
        NodeKind::Do { body, cond } => {
            out.push(*body);
            out.push(*cond);
        }
        NodeKind::For {
            init,
            cond,
            inc,
            body,
        } => {
            out.extend(init);
            out.extend(cond);
            out.extend(inc);
            out.push(*body);
        }
        NodeKind::RangeFor {
            var,
            range_init,
            body,
        } => {
            out.push(*var);
            out.push(*range_init);
            out.push(*body);
        }
        NodeKind::Switch { init, cond, body } => {
            out.extend(init);
            out.push(*cond);
            out.push(*body);
        }
        NodeKind::Case { value, body } => {
            out.push(*value);
            out.extend(body);
        }
        NodeKind::Default { body } => out.extend(body),
        NodeKind::Label { body, .. } => out.push(*body),
        NodeKind::Attributed { attrs, sub } => {
            out.extend(attrs);
            out.push(*sub);
        }
        NodeKind::Break | NodeKind::Continue | NodeKind::Null => {}

        NodeKind::Literal { .. } | NodeKind::DeclRef { .. } | NodeKind::This => {}
        NodeKind::Member { base, .. } => out.push(*base),
        NodeKind::Call { callee, args } => {
            out.push(*callee);
            out.extend(args);
        }
        NodeKind::Binary { lhs, rhs, .. } => {
            out.push(*lhs);
            out.push(*rhs);
        }
        NodeKind::OperatorCall { callee, args, .. } => {
            // Source order: `a + b` puts the operator between the operands.
            match args.split_first() {
                Some((first, rest)) => {
                    out.push(*first);
                    out.push(*callee);
                    out.extend(rest);
                }
                None => out.push(*callee),
            }
        }
        NodeKind::Unary { sub, .. } | NodeKind::Paren { sub } | NodeKind::ImplicitCast { sub } => {
            out.push(*sub)
        }
        NodeKind::Conditional { cond, then, else_ } => {
            out.push(*cond);
            out.push(*then);
            out.push(*else_);
        }
        NodeKind::Lambda {
            captures,
            template_params,
            params,
            attrs,
            trailing_return,
            requires_clause,
            body,
            ..
        } => {
            out.extend(captures.iter().filter_map(|c| match c {
                LambdaCapture::Init { var } => Some(*var),
                _ => None,
            }));
            out.extend(template_params);
            out.extend(params);
            out.extend(attrs);
            out.extend(trailing_return);
            out.extend(requires_clause);
            out.push(*body);
        }
        NodeKind::PropertyRef { base, .. } => out.extend(base),

        NodeKind::Decltype { operand } => out.push(*operand),
        NodeKind::Attr { args, .. } => out.extend(args),
    }
    out
}

/// Declarations a node refers to without owning them.
pub fn references(kind: &NodeKind) -> Vec<NodeId> {
    match kind {
        NodeKind::DeclRef { decl, .. } => vec![*decl],
        NodeKind::Lambda {
            captures,
            call_operator,
            ..
        } => captures
            .iter()
            .filter_map(|c| match c {
                LambdaCapture::ByCopy { var } | LambdaCapture::ByRef { var } => Some(*var),
                LambdaCapture::This | LambdaCapture::Init { .. } => None,
            })
            .chain(std::iter::once(*call_operator))
            .collect(),
        NodeKind::PropertyRef {
            property, getter, ..
        } => property.iter().chain(getter.iter()).copied().collect(),
        _ => Vec::new(),
    }
}
