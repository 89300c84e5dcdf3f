// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! C-family AST model for hoist.
//!
//! This crate provides the frontend-independent view of a translation unit
//! that tweaks operate on:
//! - Source buffers, locations, and macro expansion mapping
//! - An arena of typed AST nodes with kind-dispatched traversal
//! - Selection trees mapping a byte range to the AST nodes it touches
//! - JSON snapshots, and a programmatic builder for tests (`test-util`)

pub mod ast;
#[cfg(any(test, feature = "test-util"))]
pub mod builder;
pub mod node;
pub mod selection;
pub mod snapshot;
pub mod source;
pub mod ty;
pub mod walk;

pub use ast::{Ast, AstError, LangOptions, Node};
pub use node::{NodeClass, NodeId, NodeKind};
pub use selection::{Selection, SelectionNode, SelectionNodeId, SelectionTree};
pub use snapshot::{load_snapshot, SnapshotError};
pub use source::{Buffer, SourceLocation, SourceManager, SourceRange};
pub use ty::{DefaultTypePrinter, QualType, TypeKind, TypePrinter};
