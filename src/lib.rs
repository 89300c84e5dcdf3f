//! Hoist: extract a selected subexpression into a local variable
//!
//! A refactoring engine for C, C++ and Objective-C that works over AST
//! snapshots exported by a compiler front end and produces minimal,
//! conflict-free edits.

// Core infrastructure - re-exported from hoist-core
pub use hoist_core::config;
pub use hoist_core::diff;
pub use hoist_core::error;
pub use hoist_core::output;
pub use hoist_core::patch;
pub use hoist_core::text;
pub use hoist_core::types;

// AST model and selection trees
pub use hoist_ast as ast;

// Tweaks
pub use hoist_cxx::{layers, ops, tweak, validation};

// Front door for the command line
pub mod cli;
