// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Programmatic AST construction.
//!
//! [`AstBuilder`] assembles a translation unit over a piece of source text
//! without a parser. Nodes are added bottom-up; locations are given as byte
//! spans of the main file, usually found with [`AstBuilder::span_of`]:
//!
//! ```ignore
//! use hoist_ast::builder::AstBuilder;
//! use hoist_ast::node::BinaryOpKind;
//! use hoist_ast::ty::QualType;
//!
//! let mut b = AstBuilder::new("int x = 1 + 2;");
//! let one = b.int_literal(b.span_of("1"));
//! let two = b.int_literal(b.span_of("2"));
//! let sum = b.binary(BinaryOpKind::Add, one, two, QualType::int());
//! let x = b.var("x", b.span_of("int x = 1 + 2"), Some(sum), QualType::int());
//! let stmt = b.decl_stmt(vec![x], b.span_of("int x = 1 + 2;"));
//! let ast = b.finish(vec![stmt]);
//! assert_eq!(ast.text(sum), Some("1 + 2"));
//! ```
//!
//! Available under the `test-util` feature. The builder is a fixture API:
//! malformed input (a needle that does not occur, a tree that fails
//! validation) panics.

use hoist_core::config::LanguageStandard;
use hoist_core::patch::{FileId, Span};

use crate::ast::{Ast, LangOptions, Node};
use crate::node::{
    BinaryOpKind, LambdaCapture, LiteralKind, NodeId, NodeKind, OverloadedOperator,
    PropertyMessaging, UnaryOpKind,
};
use crate::source::{SourceLocation, SourceManager, SourceRange};
use crate::ty::QualType;

/// Optional parts of a lambda expression.
#[derive(Debug, Clone)]
pub struct LambdaParts {
    pub captures: Vec<LambdaCapture>,
    pub template_params: Vec<NodeId>,
    pub params: Vec<NodeId>,
    pub attrs: Vec<NodeId>,
    pub trailing_return: Option<NodeId>,
    pub requires_clause: Option<NodeId>,
    pub body: NodeId,
}

impl LambdaParts {
    pub fn new(body: NodeId) -> Self {
        LambdaParts {
            captures: Vec::new(),
            template_params: Vec::new(),
            params: Vec::new(),
            attrs: Vec::new(),
            trailing_return: None,
            requires_clause: None,
            body,
        }
    }
}

/// Builds an [`Ast`] over one main file.
#[derive(Debug)]
pub struct AstBuilder {
    sources: SourceManager,
    main: FileId,
    lang: LangOptions,
    /// Slot 0 is the translation unit, filled in by [`AstBuilder::finish`].
    nodes: Vec<Node>,
}

impl AstBuilder {
    /// Builder over `text` as `main.cpp`.
    pub fn new(text: &str) -> Self {
        AstBuilder::with_path("main.cpp", text)
    }

    pub fn with_path(path: &str, text: &str) -> Self {
        let mut sources = SourceManager::new();
        let main = sources.add_file(path, text);
        AstBuilder {
            sources,
            main,
            lang: LangOptions::default(),
            nodes: vec![Node::new(NodeKind::TranslationUnit { decls: Vec::new() })],
        }
    }

    pub fn standard(mut self, standard: LanguageStandard) -> Self {
        self.lang = LangOptions::new(standard);
        self
    }

    pub fn main_file(&self) -> FileId {
        self.main
    }

    pub fn text(&self) -> &str {
        self.sources.main_text()
    }

    // ------------------------------------------------------------------------
    // Locations
    // ------------------------------------------------------------------------

    /// Span of the first occurrence of `needle`.
    ///
    /// # Panics
    ///
    /// If `needle` does not occur in the main file.
    pub fn span_of(&self, needle: &str) -> Span {
        self.span_nth(needle, 0)
    }

    /// Span of the `n`th (zero-based) occurrence of `needle`.
    ///
    /// # Panics
    ///
    /// If there are not that many occurrences.
    pub fn span_nth(&self, needle: &str, n: usize) -> Span {
        match self.text().match_indices(needle).nth(n) {
            Some((start, _)) => Span::new(start as u64, (start + needle.len()) as u64),
            None => panic!("occurrence {} of {:?} not found", n, needle),
        }
    }

    /// Range in the main file.
    pub fn range(&self, span: Span) -> SourceRange {
        SourceRange::from_span(self.main, span)
    }

    /// Register a macro invocation covering `span` of the main file and
    /// return its expansion buffer.
    pub fn expansion(&mut self, macro_name: &str, span: Span) -> FileId {
        let range = self.range(span);
        self.sources.add_expansion(macro_name, range)
    }

    /// Register a nested expansion inside another buffer.
    pub fn expansion_in(&mut self, macro_name: &str, range: SourceRange) -> FileId {
        self.sources.add_expansion(macro_name, range)
    }

    // ------------------------------------------------------------------------
    // Raw access
    // ------------------------------------------------------------------------

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn spanned(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let range = self.range(span);
        self.add(Node::new(kind).with_range(range))
    }

    fn typed(&mut self, kind: NodeKind, span: Span, ty: QualType) -> NodeId {
        let range = self.range(span);
        self.add(Node::new(kind).with_range(range).with_type(ty))
    }

    fn range_of(&self, id: NodeId) -> SourceRange {
        match self.node(id).range {
            Some(range) => range,
            None => panic!("{} has no source range", id),
        }
    }

    fn join(&self, first: NodeId, last: NodeId) -> SourceRange {
        SourceRange::new(self.range_of(first).begin, self.range_of(last).end)
    }

    /// Location of `token` between two operands, when both lie in the main
    /// file.
    fn token_between(&self, token: &str, lhs: NodeId, rhs: NodeId) -> Option<SourceLocation> {
        let from = self.range_of(lhs).end;
        let to = self.range_of(rhs).begin;
        if from.file != self.main || to.file != self.main {
            return None;
        }
        let gap = self.text().get(from.offset as usize..to.offset as usize)?;
        let at = gap.find(token)?;
        Some(SourceLocation::new(self.main, from.offset + at as u64))
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    pub fn literal(&mut self, lit: LiteralKind, span: Span, ty: QualType) -> NodeId {
        let spelling = self.text()[span.as_range()].to_string();
        self.typed(NodeKind::Literal { lit, spelling }, span, ty)
    }

    pub fn int_literal(&mut self, span: Span) -> NodeId {
        self.literal(LiteralKind::Integer, span, QualType::int())
    }

    /// Reference to `decl`, typed as the declaration.
    pub fn decl_ref(&mut self, decl: NodeId, span: Span) -> NodeId {
        let name = match self.node(decl).kind.clone() {
            NodeKind::Function { name, .. }
            | NodeKind::Var { name, .. }
            | NodeKind::Param { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::TemplateParam { name, .. } => name,
            other => panic!("{} is not a named value declaration", other.name()),
        };
        let range = self.range(span);
        let mut node = Node::new(NodeKind::DeclRef { decl, name }).with_range(range);
        node.ty = self.node(decl).ty.clone();
        self.add(node)
    }

    /// Implicit conversion wrapping `sub`, with the same range.
    pub fn implicit_cast(&mut self, sub: NodeId, ty: QualType) -> NodeId {
        let range = self.range_of(sub);
        self.add(
            Node::new(NodeKind::ImplicitCast { sub })
                .with_range(range)
                .with_type(ty)
                .implicit(),
        )
    }

    /// `lhs op rhs`, located at the operator token.
    pub fn binary(&mut self, op: BinaryOpKind, lhs: NodeId, rhs: NodeId, ty: QualType) -> NodeId {
        let range = self.join(lhs, rhs);
        let mut node = Node::new(NodeKind::Binary { op, lhs, rhs })
            .with_range(range)
            .with_type(ty);
        node.loc = self.token_between(op.spelling(), lhs, rhs);
        self.add(node)
    }

    pub fn paren(&mut self, sub: NodeId, span: Span) -> NodeId {
        let ty = self.node(sub).ty.clone();
        let range = self.range(span);
        let mut node = Node::new(NodeKind::Paren { sub }).with_range(range);
        node.ty = ty;
        self.add(node)
    }

    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>, span: Span, ty: QualType) -> NodeId {
        self.typed(NodeKind::Call { callee, args }, span, ty)
    }

    /// `base.member` or `base->member`, located at the member name.
    pub fn member(&mut self, base: NodeId, member: &str, arrow: bool, span: Span, ty: QualType) -> NodeId {
        let loc = self.text()[span.as_range()]
            .rfind(member)
            .map(|at| SourceLocation::new(self.main, span.start + at as u64));
        let range = self.range(span);
        let mut node = Node::new(NodeKind::Member {
            base,
            member: member.to_string(),
            arrow,
        })
        .with_range(range)
        .with_type(ty);
        node.loc = loc;
        self.add(node)
    }

    /// Implicit `this` at `offset` (the start of the member access it bases).
    pub fn implicit_this(&mut self, offset: u64, ty: QualType) -> NodeId {
        let range = self.range(Span::empty_at(offset));
        self.add(
            Node::new(NodeKind::This)
                .with_range(range)
                .with_type(ty)
                .implicit(),
        )
    }

    pub fn this_expr(&mut self, span: Span, ty: QualType) -> NodeId {
        self.typed(NodeKind::This, span, ty)
    }

    pub fn unary(&mut self, op: UnaryOpKind, sub: NodeId, span: Span, ty: QualType) -> NodeId {
        self.typed(NodeKind::Unary { op, sub }, span, ty)
    }

    pub fn conditional(&mut self, cond: NodeId, then: NodeId, else_: NodeId, ty: QualType) -> NodeId {
        let range = self.join(cond, else_);
        let mut node = Node::new(NodeKind::Conditional { cond, then, else_ })
            .with_range(range)
            .with_type(ty);
        node.loc = self.token_between("?", cond, then);
        self.add(node)
    }

    /// Overloaded `lhs op rhs`: a call to `operator_decl` whose callee is an
    /// implicit-cast reference spelled by the operator token.
    pub fn operator_call(
        &mut self,
        op: BinaryOpKind,
        lhs: NodeId,
        rhs: NodeId,
        operator_decl: NodeId,
        ty: QualType,
    ) -> NodeId {
        let loc = match self.token_between(op.spelling(), lhs, rhs) {
            Some(loc) => loc,
            None => panic!("operator {:?} not found between operands", op.spelling()),
        };
        let token = Span::new(loc.offset, loc.offset + op.spelling().len() as u64);
        let callee_ref = self.decl_ref(operator_decl, token);
        let callee_ty = self
            .node(operator_decl)
            .ty
            .clone()
            .unwrap_or_else(|| QualType::function("<operator>"));
        let callee = self.implicit_cast(callee_ref, callee_ty);
        let range = self.join(lhs, rhs);
        let mut node = Node::new(NodeKind::OperatorCall {
            op: OverloadedOperator::Binary(op),
            callee,
            args: vec![lhs, rhs],
        })
        .with_range(range)
        .with_type(ty);
        node.loc = Some(loc);
        self.add(node)
    }

    /// A lambda expression. Its call operator is created as a separate
    /// declaration outside the tree.
    pub fn lambda(&mut self, parts: LambdaParts, span: Span, ty: QualType) -> NodeId {
        let call_operator = self.add(Node::new(NodeKind::Function {
            name: "operator()".to_string(),
            params: Vec::new(),
            body: None,
            attrs: Vec::new(),
            lambda_call_operator: true,
        }));
        self.typed(
            NodeKind::Lambda {
                captures: parts.captures,
                template_params: parts.template_params,
                params: parts.params,
                attrs: parts.attrs,
                trailing_return: parts.trailing_return,
                requires_clause: parts.requires_clause,
                body: parts.body,
                call_operator,
            },
            span,
            ty,
        )
    }

    /// Reference to the call operator of a lambda, as in `[]{}()` callee
    /// position.
    pub fn call_operator_of(&self, lambda: NodeId) -> NodeId {
        match &self.node(lambda).kind {
            NodeKind::Lambda { call_operator, .. } => *call_operator,
            other => panic!("{} is not a lambda", other.name()),
        }
    }

    pub fn property_ref(
        &mut self,
        base: Option<NodeId>,
        messaging: PropertyMessaging,
        property: Option<NodeId>,
        getter: Option<NodeId>,
        span: Span,
        ty: QualType,
    ) -> NodeId {
        self.typed(
            NodeKind::PropertyRef {
                base,
                messaging,
                property,
                getter,
            },
            span,
            ty,
        )
    }

    pub fn decltype(&mut self, operand: NodeId, span: Span) -> NodeId {
        self.spanned(NodeKind::Decltype { operand }, span)
    }

    pub fn attr(&mut self, name: &str, args: Vec<NodeId>, span: Span) -> NodeId {
        self.spanned(
            NodeKind::Attr {
                name: name.to_string(),
                args,
            },
            span,
        )
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    pub fn var(&mut self, name: &str, span: Span, init: Option<NodeId>, ty: QualType) -> NodeId {
        self.typed(
            NodeKind::Var {
                name: name.to_string(),
                init,
                init_capture: false,
            },
            span,
            ty,
        )
    }

    /// The variable a closure init-capture `[name = init]` declares.
    pub fn init_capture(&mut self, name: &str, span: Span, init: NodeId, ty: QualType) -> NodeId {
        self.typed(
            NodeKind::Var {
                name: name.to_string(),
                init: Some(init),
                init_capture: true,
            },
            span,
            ty,
        )
    }

    pub fn param(&mut self, name: &str, span: Span, default_arg: Option<NodeId>, ty: QualType) -> NodeId {
        self.typed(
            NodeKind::Param {
                name: name.to_string(),
                default_arg,
            },
            span,
            ty,
        )
    }

    pub fn template_param(&mut self, name: &str, span: Span, default_arg: Option<NodeId>) -> NodeId {
        self.spanned(
            NodeKind::TemplateParam {
                name: name.to_string(),
                default_arg,
            },
            span,
        )
    }

    pub fn function(&mut self, name: &str, span: Span, params: Vec<NodeId>, body: Option<NodeId>) -> NodeId {
        self.spanned(
            NodeKind::Function {
                name: name.to_string(),
                params,
                body,
                attrs: Vec::new(),
                lambda_call_operator: false,
            },
            span,
        )
    }

    /// A function declared outside the main file; `ty` is its return type.
    pub fn declared_function(&mut self, name: &str, ty: QualType) -> NodeId {
        self.add(
            Node::new(NodeKind::Function {
                name: name.to_string(),
                params: Vec::new(),
                body: None,
                attrs: Vec::new(),
                lambda_call_operator: false,
            })
            .with_type(ty),
        )
    }

    /// A variable declared outside the main file.
    pub fn declared_var(&mut self, name: &str, ty: QualType) -> NodeId {
        self.add(
            Node::new(NodeKind::Var {
                name: name.to_string(),
                init: None,
                init_capture: false,
            })
            .with_type(ty),
        )
    }

    /// An Objective-C `@property` declared outside the main file.
    pub fn declared_property(&mut self, name: &str, ty: QualType) -> NodeId {
        self.add(
            Node::new(NodeKind::Property {
                name: name.to_string(),
            })
            .with_type(ty),
        )
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    pub fn compound(&mut self, body: Vec<NodeId>, span: Span) -> NodeId {
        self.spanned(NodeKind::Compound { body }, span)
    }

    pub fn decl_stmt(&mut self, decls: Vec<NodeId>, span: Span) -> NodeId {
        self.spanned(NodeKind::DeclStmt { decls }, span)
    }

    pub fn return_stmt(&mut self, value: Option<NodeId>, span: Span) -> NodeId {
        self.spanned(NodeKind::Return { value }, span)
    }

    pub fn if_stmt(
        &mut self,
        init: Option<NodeId>,
        cond: NodeId,
        then: NodeId,
        else_: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        self.spanned(
            NodeKind::If {
                init,
                cond,
                then,
                else_,
            },
            span,
        )
    }

    pub fn while_stmt(&mut self, cond: NodeId, body: NodeId, span: Span) -> NodeId {
        self.spanned(NodeKind::While { cond, body }, span)
    }

    pub fn do_stmt(&mut self, body: NodeId, cond: NodeId, span: Span) -> NodeId {
        self.spanned(NodeKind::Do { body, cond }, span)
    }

    pub fn for_stmt(
        &mut self,
        init: Option<NodeId>,
        cond: Option<NodeId>,
        inc: Option<NodeId>,
        body: NodeId,
        span: Span,
    ) -> NodeId {
        self.spanned(
            NodeKind::For {
                init,
                cond,
                inc,
                body,
            },
            span,
        )
    }

    pub fn range_for(&mut self, var: NodeId, range_init: NodeId, body: NodeId, span: Span) -> NodeId {
        self.spanned(
            NodeKind::RangeFor {
                var,
                range_init,
                body,
            },
            span,
        )
    }

    pub fn switch_stmt(&mut self, init: Option<NodeId>, cond: NodeId, body: NodeId, span: Span) -> NodeId {
        self.spanned(NodeKind::Switch { init, cond, body }, span)
    }

    pub fn case_stmt(&mut self, value: NodeId, body: Option<NodeId>, span: Span) -> NodeId {
        self.spanned(NodeKind::Case { value, body }, span)
    }

    pub fn default_stmt(&mut self, body: Option<NodeId>, span: Span) -> NodeId {
        self.spanned(NodeKind::Default { body }, span)
    }

    pub fn label(&mut self, name: &str, body: NodeId, span: Span) -> NodeId {
        self.spanned(
            NodeKind::Label {
                name: name.to_string(),
                body,
            },
            span,
        )
    }

    pub fn attributed(&mut self, attrs: Vec<NodeId>, sub: NodeId, span: Span) -> NodeId {
        self.spanned(NodeKind::Attributed { attrs, sub }, span)
    }

    pub fn break_stmt(&mut self, span: Span) -> NodeId {
        self.spanned(NodeKind::Break, span)
    }

    pub fn null_stmt(&mut self, span: Span) -> NodeId {
        self.spanned(NodeKind::Null, span)
    }

    // ------------------------------------------------------------------------
    // Finish
    // ------------------------------------------------------------------------

    /// Assemble the translation unit with `decls` as its top-level children.
    ///
    /// # Panics
    ///
    /// If the nodes do not form a valid tree.
    pub fn finish(mut self, decls: Vec<NodeId>) -> Ast {
        self.nodes[0].kind = NodeKind::TranslationUnit { decls };
        match Ast::from_parts(self.lang, self.sources, self.nodes, NodeId::new(0)) {
            Ok(ast) => ast,
            Err(e) => panic!("invalid AST: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_is_located_at_operator() {
        let mut b = AstBuilder::new("a  *  b");
        let a = b.declared_var("a", QualType::int());
        let bb = b.declared_var("b", QualType::int());
        let ra = b.decl_ref(a, b.span_of("a"));
        let rb = b.decl_ref(bb, b.span_of("b"));
        let mul = b.binary(BinaryOpKind::Mul, ra, rb, QualType::int());
        let ast = b.finish(vec![mul]);
        assert_eq!(ast.text(mul), Some("a  *  b"));
        assert_eq!(ast.node(mul).expr_loc().map(|l| l.offset), Some(3));
        assert_eq!(ast.node(ra).ty, Some(QualType::int()));
    }

    #[test]
    fn operator_call_wraps_callee_reference() {
        let mut b = AstBuilder::new("s + t");
        let s_decl = b.declared_var("s", QualType::record("S"));
        let t_decl = b.declared_var("t", QualType::record("S"));
        let op = b.declared_function("operator+", QualType::record("S"));
        let s = b.decl_ref(s_decl, b.span_of("s"));
        let t = b.decl_ref(t_decl, b.span_of("t"));
        let call = b.operator_call(BinaryOpKind::Add, s, t, op, QualType::record("S"));
        let ast = b.finish(vec![call]);

        let NodeKind::OperatorCall { callee, args, .. } = ast.kind(call) else {
            panic!("not an operator call");
        };
        assert_eq!(args, &vec![s, t]);
        assert!(ast.node(*callee).implicit);
        let target = ast.ignore_imp_casts(*callee);
        assert_eq!(ast.text(target), Some("+"));
        assert_eq!(ast.children(call), vec![s, *callee, t]);
    }

    #[test]
    fn lambda_gets_detached_call_operator() {
        let mut b = AstBuilder::new("[] {}");
        let body = b.compound(vec![], b.span_of("{}"));
        let lambda = b.lambda(LambdaParts::new(body), b.span_of("[] {}"), QualType::record("(lambda)"));
        let op = b.call_operator_of(lambda);
        let ast = b.finish(vec![lambda]);
        assert!(matches!(
            ast.kind(op),
            NodeKind::Function {
                lambda_call_operator: true,
                ..
            }
        ));
        assert_eq!(ast.node(op).range, None);
    }

    #[test]
    fn nth_occurrence() {
        let b = AstBuilder::new("x + x + x");
        assert_eq!(b.span_nth("x", 2), Span::new(8, 9));
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn missing_needle_panics() {
        let b = AstBuilder::new("x");
        b.span_of("y");
    }
}
