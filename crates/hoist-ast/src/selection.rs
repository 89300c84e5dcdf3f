// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Selection trees: the part of an AST touched by a selected byte range.
//!
//! Building a tree assigns every source character to at most one AST node:
//! the innermost node whose range covers it. Nodes are visited in post-order,
//! so children claim their characters before their parents do, and a parent
//! only owns the tokens between its children (the `+` of `a + b`, the parens
//! of `(x)`). Whitespace belongs to nobody, and implicit nodes claim nothing.
//!
//! Each node is then classified by how many of *its own* characters are
//! selected:
//!
//! - [`Selection::Complete`]: all of them
//! - [`Selection::Partial`]: some of them
//! - [`Selection::Unselected`]: none, or it claims nothing at all
//!
//! The tree keeps only nodes that are selected or have selected descendants,
//! plus the translation unit at the root.
//!
//! Characters produced by a macro expansion are claimed per expansion buffer
//! offset and count as selected when the whole macro invocation in the main
//! file is selected.

use std::collections::HashSet;
use std::fmt::Write as _;

use hoist_core::patch::{FileId, Span};

use crate::ast::Ast;
use crate::node::NodeId;
use crate::source::{Buffer, SourceRange};

/// How much of a node's own text lies inside the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Unselected,
    Partial,
    Complete,
}

impl Selection {
    pub fn is_selected(self) -> bool {
        self != Selection::Unselected
    }
}

/// Index of a node in a [`SelectionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionNodeId(u32);

impl SelectionNodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of a selection tree, wrapping an AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionNode {
    pub parent: Option<SelectionNodeId>,
    pub children: Vec<SelectionNodeId>,
    pub selected: Selection,
    pub ast_node: NodeId,
}

/// A unit of source text that can be claimed by one node.
type Unit = (FileId, u64);

/// Node under construction, before pruning.
struct Draft {
    ast_node: NodeId,
    selected: Selection,
    children: Vec<Draft>,
}

impl Draft {
    fn is_kept(&self) -> bool {
        self.selected.is_selected() || !self.children.is_empty()
    }
}

/// The selected part of an AST.
#[derive(Debug, Clone)]
pub struct SelectionTree<'a> {
    ast: &'a Ast,
    nodes: Vec<SelectionNode>,
    root: SelectionNodeId,
    selection: Span,
}

impl<'a> SelectionTree<'a> {
    /// Build the selection tree of `selection` over the main file of `ast`.
    ///
    /// An empty selection selects the character after it, or the one before
    /// it when the caret sits on whitespace or at end of file.
    pub fn new(ast: &'a Ast, selection: Span) -> Self {
        let effective = effective_selection(ast.sources.main_text(), selection);
        let mut builder = Builder {
            ast,
            selection: effective,
            claimed: HashSet::new(),
            macro_spans: top_level_macro_spans(ast),
        };
        let draft = builder.visit(ast.root());

        let mut tree = SelectionTree {
            ast,
            nodes: Vec::new(),
            root: SelectionNodeId(0),
            selection,
        };
        tree.root = tree.flatten(draft, None);
        tracing::trace!("selection tree for {:?}:\n{}", selection, tree.dump());
        tree
    }

    fn flatten(&mut self, draft: Draft, parent: Option<SelectionNodeId>) -> SelectionNodeId {
        let id = SelectionNodeId(self.nodes.len() as u32);
        self.nodes.push(SelectionNode {
            parent,
            children: Vec::new(),
            selected: draft.selected,
            ast_node: draft.ast_node,
        });
        let children: Vec<SelectionNodeId> = draft
            .children
            .into_iter()
            .map(|child| self.flatten(child, Some(id)))
            .collect();
        self.nodes[id.index()].children = children;
        id
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    /// The selection as given by the caller.
    pub fn selection(&self) -> Span {
        self.selection
    }

    /// The translation unit.
    pub fn root(&self) -> SelectionNodeId {
        self.root
    }

    pub fn node(&self, id: SelectionNodeId) -> &SelectionNode {
        &self.nodes[id.index()]
    }

    pub fn parent(&self, id: SelectionNodeId) -> Option<SelectionNodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: SelectionNodeId) -> &[SelectionNodeId] {
        &self.node(id).children
    }

    pub fn ast_node(&self, id: SelectionNodeId) -> NodeId {
        self.node(id).ast_node
    }

    pub fn selected(&self, id: SelectionNodeId) -> Selection {
        self.node(id).selected
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The deepest node that contains the whole selection.
    ///
    /// Descends from the root through unselected nodes with a single child.
    /// `None` when that walk stops at the root.
    pub fn common_ancestor(&self) -> Option<SelectionNodeId> {
        let mut ancestor = self.root;
        loop {
            let node = self.node(ancestor);
            match node.children.as_slice() {
                [only] if !node.selected.is_selected() => ancestor = *only,
                _ => break,
            }
        }
        (ancestor != self.root).then_some(ancestor)
    }

    /// Outermost ancestor with the same source range as `id`: climbs through
    /// implicit wrappers such as implicit casts.
    pub fn outer_implicit(&self, mut id: SelectionNodeId) -> SelectionNodeId {
        while let Some(parent) = self.parent(id) {
            if !self.same_range(parent, id) {
                break;
            }
            id = parent;
        }
        id
    }

    /// Innermost descendant with the same source range as `id`, following
    /// single-child chains.
    pub fn ignore_implicit(&self, mut id: SelectionNodeId) -> SelectionNodeId {
        loop {
            match self.children(id) {
                [only] if self.same_range(*only, id) => id = *only,
                _ => return id,
            }
        }
    }

    fn same_range(&self, a: SelectionNodeId, b: SelectionNodeId) -> bool {
        let a = self.ast.node(self.ast_node(a)).range;
        let b = self.ast.node(self.ast_node(b)).range;
        a.is_some() && a == b
    }

    /// Indented rendering of the tree, one node per line.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, id: SelectionNodeId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let mark = match node.selected {
            Selection::Complete => "*",
            Selection::Partial => ".",
            Selection::Unselected => " ",
        };
        let _ = writeln!(
            out,
            "{}{} {}",
            " ".repeat(depth * 2),
            mark,
            self.ast.kind(node.ast_node).name()
        );
        for child in &node.children {
            self.dump_node(*child, depth + 1, out);
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

fn effective_selection(text: &str, selection: Span) -> Span {
    if !selection.is_empty() {
        return selection;
    }
    let bytes = text.as_bytes();
    let p = selection.start as usize;
    let usable = |i: usize| bytes.get(i).is_some_and(|b| !b.is_ascii_whitespace());
    if usable(p) || p == 0 {
        Span::new(selection.start, selection.start + 1)
    } else if usable(p - 1) || p >= bytes.len() {
        Span::new(selection.start - 1, selection.start)
    } else {
        Span::new(selection.start, selection.start + 1)
    }
}

/// Main-file spans of macro invocations written directly in the main file.
fn top_level_macro_spans(ast: &Ast) -> Vec<Span> {
    let Some(main) = ast.sources.main_file() else {
        return Vec::new();
    };
    ast.sources
        .buffers()
        .iter()
        .filter_map(|buffer| match buffer {
            Buffer::Expansion { expansion, .. }
                if expansion.begin.file == main && expansion.end.file == main =>
            {
                ast.sources.file_range(*expansion)
            }
            _ => None,
        })
        .collect()
}

struct Builder<'a> {
    ast: &'a Ast,
    selection: Span,
    claimed: HashSet<Unit>,
    macro_spans: Vec<Span>,
}

impl Builder<'_> {
    fn visit(&mut self, id: NodeId) -> Draft {
        let children: Vec<Draft> = self
            .ast
            .children(id)
            .into_iter()
            .map(|child| self.visit(child))
            .filter(Draft::is_kept)
            .collect();
        let selected = self.claim(id);
        Draft {
            ast_node: id,
            selected,
            children,
        }
    }

    /// Claim the node's unclaimed units and classify it by them.
    fn claim(&mut self, id: NodeId) -> Selection {
        let node = self.ast.node(id);
        if node.implicit {
            return Selection::Unselected;
        }
        let Some(range) = node.range else {
            return Selection::Unselected;
        };

        let mut total = 0usize;
        let mut complete = 0usize;
        let mut partial = 0usize;
        for unit in self.units(range) {
            if !self.claimed.insert(unit) {
                continue;
            }
            total += 1;
            match self.unit_selection(unit) {
                Selection::Complete => complete += 1,
                Selection::Partial => partial += 1,
                Selection::Unselected => {}
            }
        }

        if total == 0 || complete + partial == 0 {
            Selection::Unselected
        } else if complete == total {
            Selection::Complete
        } else {
            Selection::Partial
        }
    }

    /// Claimable units covered by `range`.
    fn units(&self, range: SourceRange) -> Vec<Unit> {
        let sources = &self.ast.sources;
        let Some(main) = sources.main_file() else {
            return Vec::new();
        };

        if range.begin.file == range.end.file && range.begin.file != main {
            // Entirely inside one macro expansion: claim expansion offsets.
            if !sources.is_macro_id(range.begin) || sources.file_range(range).is_none() {
                return Vec::new();
            }
            return (range.begin.offset..range.end.offset)
                .map(|offset| (range.begin.file, offset))
                .collect();
        }

        let Some(span) = sources.file_range(range) else {
            return Vec::new();
        };
        let text = sources.main_text().as_bytes();
        (span.start..span.end)
            .filter(|&offset| {
                text.get(offset as usize)
                    .is_some_and(|b| !b.is_ascii_whitespace())
            })
            .filter(|&offset| !self.owned_by_macro(offset, span))
            .map(|offset| (main, offset))
            .collect()
    }

    /// A main-file byte inside a macro invocation belongs to the expansion,
    /// unless the claiming node itself lies within the invocation (a macro
    /// argument spelled in the file).
    fn owned_by_macro(&self, offset: u64, node_span: Span) -> bool {
        self.macro_spans.iter().any(|m| {
            m.start <= offset && offset < m.end && !(m.start <= node_span.start && node_span.end <= m.end)
        })
    }

    fn unit_selection(&self, (file, offset): Unit) -> Selection {
        let sources = &self.ast.sources;
        if Some(file) == sources.main_file() {
            return if self.selection.start <= offset && offset < self.selection.end {
                Selection::Complete
            } else {
                Selection::Unselected
            };
        }
        match sources.buffer(file) {
            Some(Buffer::Expansion { expansion, .. }) => match sources.file_range(*expansion) {
                Some(span) if self.selection.contains(&span) => Selection::Complete,
                Some(span) if self.selection.intersects(&span) => Selection::Partial,
                _ => Selection::Unselected,
            },
            _ => Selection::Unselected,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::AstBuilder;
    use crate::node::{BinaryOpKind, NodeKind};
    use crate::ty::QualType;

    /// `int x = (5 + 4) * 3;`-shaped tree over `int x = 5 + 4 * 3;`.
    fn example() -> (Ast, NodeId, NodeId) {
        let mut b = AstBuilder::new("void f() { int x = 5 + 4 * 3; }");
        let five = b.int_literal(b.span_of("5"));
        let four = b.int_literal(b.span_of("4"));
        let three = b.int_literal(b.span_of("3"));
        let sum = b.binary(BinaryOpKind::Add, five, four, QualType::int());
        let product = b.binary(BinaryOpKind::Mul, sum, three, QualType::int());
        let x = b.var("x", b.span_of("int x = 5 + 4 * 3"), Some(product), QualType::int());
        let stmt = b.decl_stmt(vec![x], b.span_of("int x = 5 + 4 * 3;"));
        let body = b.compound(vec![stmt], b.span_of("{ int x = 5 + 4 * 3; }"));
        let f = b.function("f", b.span_of("void f() { int x = 5 + 4 * 3; }"), vec![], Some(body));
        (b.finish(vec![f]), sum, product)
    }

    fn select<'a>(ast: &'a Ast, needle: &str) -> SelectionTree<'a> {
        let start = ast.sources.main_text().find(needle).unwrap() as u64;
        SelectionTree::new(ast, Span::new(start, start + needle.len() as u64))
    }

    mod classification {
        use super::*;

        #[test]
        fn operator_token_makes_binary_complete() {
            let (ast, sum, _) = example();
            let tree = select(&ast, "5 + 4");
            let common = tree.common_ancestor().unwrap();
            assert_eq!(tree.ast_node(common), sum);
            assert_eq!(tree.selected(common), Selection::Complete);
            assert_eq!(tree.children(common).len(), 2);
        }

        #[test]
        fn ancestors_with_unselected_tokens_are_kept_unselected() {
            let (ast, sum, product) = example();
            let tree = select(&ast, "5 + 4");
            let common = tree.common_ancestor().unwrap();
            let parent = tree.parent(common).unwrap();
            assert_eq!(tree.ast_node(parent), product);
            assert_eq!(tree.selected(parent), Selection::Unselected);
            assert_eq!(tree.children(parent), &[common]);
            assert_eq!(tree.ast_node(common), sum);
        }

        #[test]
        fn trailing_semicolon_selects_statement() {
            let (ast, sum, _) = example();
            let tree = select(&ast, "4 * 3;");
            let common = tree.common_ancestor().unwrap();
            // `;` is the only token the declaration statement owns.
            assert!(matches!(
                ast.kind(tree.ast_node(common)),
                NodeKind::DeclStmt { .. }
            ));
            assert_eq!(tree.selected(common), Selection::Complete);
            let sum_node = (0..tree.len() as u32)
                .map(SelectionNodeId)
                .find(|id| tree.ast_node(*id) == sum)
                .unwrap();
            assert_eq!(tree.selected(sum_node), Selection::Unselected);
        }

        #[test]
        fn partial_token_selection() {
            let mut b = AstBuilder::new("int g() { return 1000 + 2; }");
            let big = b.int_literal(b.span_of("1000"));
            let two = b.int_literal(b.span_of("2"));
            let sum = b.binary(BinaryOpKind::Add, big, two, QualType::int());
            let ret = b.return_stmt(Some(sum), b.span_of("return 1000 + 2;"));
            let body = b.compound(vec![ret], b.span_of("{ return 1000 + 2; }"));
            let g = b.function("g", b.span_of("int g() { return 1000 + 2; }"), vec![], Some(body));
            let ast = b.finish(vec![g]);

            let tree = select(&ast, "00");
            let common = tree.common_ancestor().unwrap();
            assert_eq!(tree.ast_node(common), big);
            assert_eq!(tree.selected(common), Selection::Partial);
        }

        #[test]
        fn whitespace_selection_selects_nothing() {
            let (ast, _, _) = example();
            let text = ast.sources.main_text();
            let space = text.find(" =").unwrap() as u64;
            let tree = SelectionTree::new(&ast, Span::new(space, space + 1));
            assert_eq!(tree.common_ancestor(), None);
            assert_eq!(tree.len(), 1);
        }

        #[test]
        fn caret_selects_adjacent_token() {
            let (ast, _, _) = example();
            let at = ast.sources.main_text().find('3').unwrap() as u64;
            let tree = SelectionTree::new(&ast, Span::empty_at(at));
            let common = tree.common_ancestor().unwrap();
            assert!(matches!(
                ast.kind(tree.ast_node(common)),
                NodeKind::Literal { .. }
            ));
            assert_eq!(tree.selection(), Span::empty_at(at));
        }
    }

    mod implicit_nodes {
        use super::*;

        fn with_cast() -> (Ast, NodeId, NodeId) {
            let mut b = AstBuilder::new("void f() { int a; int y = a; }");
            let a = b.var("a", b.span_of("int a"), None, QualType::int());
            let a_stmt = b.decl_stmt(vec![a], b.span_of("int a;"));
            let r = b.decl_ref(a, b.span_nth("a", 1));
            let cast = b.implicit_cast(r, QualType::int());
            let y = b.var("y", b.span_of("int y = a"), Some(cast), QualType::int());
            let y_stmt = b.decl_stmt(vec![y], b.span_of("int y = a;"));
            let body = b.compound(vec![a_stmt, y_stmt], b.span_of("{ int a; int y = a; }"));
            let f = b.function("f", b.span_of("void f() { int a; int y = a; }"), vec![], Some(body));
            (b.finish(vec![f]), r, cast)
        }

        #[test]
        fn outer_implicit_climbs_casts() {
            let (ast, r, cast) = with_cast();
            let at = ast.file_range(r).unwrap();
            let tree = SelectionTree::new(&ast, at);
            let common = tree.common_ancestor().unwrap();
            assert_eq!(tree.ast_node(common), r);
            let outer = tree.outer_implicit(common);
            assert_eq!(tree.ast_node(outer), cast);
            assert_eq!(tree.selected(outer), Selection::Unselected);
            assert_eq!(tree.ignore_implicit(outer), common);
        }
    }

    mod macros {
        use super::*;

        #[test]
        fn selecting_invocation_selects_expansion() {
            let mut b = AstBuilder::new("void f() { int v = SUM; }");
            let sum_span = b.span_of("SUM");
            let exp = b.expansion("SUM", sum_span);
            let a = b.add(
                crate::ast::Node::new(NodeKind::Literal {
                    lit: crate::node::LiteralKind::Integer,
                    spelling: "1".into(),
                })
                .with_range(SourceRange::in_buffer(exp, 0, 1))
                .with_type(QualType::int()),
            );
            let c = b.add(
                crate::ast::Node::new(NodeKind::Literal {
                    lit: crate::node::LiteralKind::Integer,
                    spelling: "2".into(),
                })
                .with_range(SourceRange::in_buffer(exp, 4, 5))
                .with_type(QualType::int()),
            );
            let plus = b.add(
                crate::ast::Node::new(NodeKind::Binary {
                    op: BinaryOpKind::Add,
                    lhs: a,
                    rhs: c,
                })
                .with_range(SourceRange::in_buffer(exp, 0, 5))
                .with_type(QualType::int()),
            );
            let v = b.var("v", b.span_of("int v = SUM"), Some(plus), QualType::int());
            let stmt = b.decl_stmt(vec![v], b.span_of("int v = SUM;"));
            let body = b.compound(vec![stmt], b.span_of("{ int v = SUM; }"));
            let f = b.function("f", b.span_of("void f() { int v = SUM; }"), vec![], Some(body));
            let ast = b.finish(vec![f]);

            let tree = SelectionTree::new(&ast, sum_span);
            let common = tree.common_ancestor().unwrap();
            assert_eq!(tree.ast_node(common), plus);
            assert_eq!(tree.selected(common), Selection::Complete);
        }
    }

    #[test]
    fn dump_marks_selection() {
        let (ast, _, _) = example();
        let tree = select(&ast, "5 + 4");
        let dump = tree.dump();
        assert!(dump.starts_with("  TranslationUnit"));
        assert!(dump.contains("* Binary"));
    }
}
