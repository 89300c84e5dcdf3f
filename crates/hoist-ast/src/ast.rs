// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The AST arena.
//!
//! An [`Ast`] owns every node of one translation unit in a flat `Vec`, keyed
//! by [`NodeId`]. Parent/child structure is expressed by ids inside
//! [`NodeKind`]; construction through [`Ast::from_parts`] checks that those ids
//! form a tree rooted at a `TranslationUnit`, so later traversals can index
//! without re-checking.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hoist_core::config::LanguageStandard;
use hoist_core::patch::Span;

use crate::node::{NodeId, NodeKind};
use crate::source::{SourceLocation, SourceManager, SourceRange};
use crate::ty::QualType;
use crate::walk;

/// Language options the translation unit was parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangOptions {
    pub standard: LanguageStandard,
}

impl LangOptions {
    pub fn new(standard: LanguageStandard) -> Self {
        LangOptions { standard }
    }

    /// C++11 or later.
    pub fn cplusplus11(&self) -> bool {
        self.standard.deduces_auto()
    }
}

impl Default for LangOptions {
    fn default() -> Self {
        LangOptions::new(LanguageStandard::Cxx17)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One node of the arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Source range; absent for nodes with no spelling (e.g. declarations from
    /// the preamble).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<SourceRange>,
    /// Preferred location of an expression (the operator of a binary
    /// expression, the member name of a member access). Defaults to the begin
    /// of `range`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<SourceLocation>,
    /// Static type of an expression or declared type of a declaration.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<QualType>,
    /// Written by the compiler, not the user (implicit casts, implicit `this`).
    #[serde(default, skip_serializing_if = "is_false")]
    pub implicit: bool,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            range: None,
            loc: None,
            ty: None,
            implicit: false,
        }
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_loc(mut self, loc: SourceLocation) -> Self {
        self.loc = Some(loc);
        self
    }

    pub fn with_type(mut self, ty: QualType) -> Self {
        self.ty = Some(ty);
        self
    }

    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }

    /// Expression location: `loc` if recorded, else the begin of the range.
    pub fn expr_loc(&self) -> Option<SourceLocation> {
        self.loc.or(self.range.map(|r| r.begin))
    }
}

/// Structural problems found while assembling an [`Ast`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("{from} refers to missing node {to}")]
    DanglingNode { from: NodeId, to: NodeId },

    #[error("root {0} is missing or not a translation unit")]
    BadRoot(NodeId),

    #[error("{child} has two parents: {first} and {second}")]
    SharedChild {
        child: NodeId,
        first: NodeId,
        second: NodeId,
    },

    #[error("range of {node} is outside its buffer")]
    RangeOutOfBounds { node: NodeId },

    #[error("invalid source buffers: {0}")]
    Sources(String),
}

/// A translation unit: nodes, buffers, and language options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ast {
    #[serde(default)]
    pub lang: LangOptions,
    pub sources: SourceManager,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    /// Assemble and validate an AST.
    pub fn from_parts(
        lang: LangOptions,
        sources: SourceManager,
        nodes: Vec<Node>,
        root: NodeId,
    ) -> Result<Self, AstError> {
        let ast = Ast {
            lang,
            sources,
            nodes,
            root,
        };
        ast.validate()?;
        Ok(ast)
    }

    /// Re-check the invariants `from_parts` establishes. Deserialized ASTs
    /// must pass through this before use.
    pub fn validate(&self) -> Result<(), AstError> {
        self.sources.validate().map_err(AstError::Sources)?;

        match self.nodes.get(self.root.index()) {
            Some(node) if matches!(node.kind, NodeKind::TranslationUnit { .. }) => {}
            _ => return Err(AstError::BadRoot(self.root)),
        }

        let mut parent: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId::new(index as u32);
            for child in walk::children(&node.kind) {
                if child.index() >= self.nodes.len() {
                    return Err(AstError::DanglingNode { from: id, to: child });
                }
                if child == self.root {
                    return Err(AstError::BadRoot(self.root));
                }
                if let Some(first) = parent[child.index()] {
                    return Err(AstError::SharedChild {
                        child,
                        first,
                        second: id,
                    });
                }
                parent[child.index()] = Some(id);
            }
            for target in walk::references(&node.kind) {
                if target.index() >= self.nodes.len() {
                    return Err(AstError::DanglingNode { from: id, to: target });
                }
            }
            if let Some(range) = node.range {
                for loc in [range.begin, range.end] {
                    if !self.location_in_bounds(loc) {
                        return Err(AstError::RangeOutOfBounds { node: id });
                    }
                }
            }
        }
        Ok(())
    }

    fn location_in_bounds(&self, loc: SourceLocation) -> bool {
        match self.sources.buffer(loc.file) {
            Some(crate::source::Buffer::File { text, .. }) => loc.offset as usize <= text.len(),
            Some(crate::source::Buffer::Expansion { .. }) => true,
            None => false,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node by id. Ids come from this arena, so indexing cannot fail for a
    /// validated AST.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        walk::children(self.kind(id))
    }

    /// Main-file byte range of a node.
    pub fn file_range(&self, id: NodeId) -> Option<Span> {
        self.sources.file_range(self.node(id).range?)
    }

    /// Main-file text of a node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.sources.text_of(self.file_range(id)?)
    }

    /// Skip implicit casts.
    pub fn ignore_imp_casts(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::ImplicitCast { sub } = self.kind(id) {
            id = *sub;
        }
        id
    }
}
