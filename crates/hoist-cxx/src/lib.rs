// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! C-family refactoring tweaks for hoist.
//!
//! This crate provides selection-driven code actions over a [`hoist_ast::Ast`].
//! It includes:
//! - The tweak trait and registry
//! - Analysis layers (references, operator chains, eligibility, insertion)
//! - Operations (extract subexpression to variable)
//! - Identifier validation

pub mod layers;
pub mod ops;
pub mod tweak;
pub mod validation;

pub use ops::extract_variable::{ExtractVariable, ExtractVariableError, ExtractionContext};
pub use ops::rewritten_main_text;
pub use tweak::{
    register_builtin_tweaks, Effect, Tweak, TweakError, TweakInputs, TweakKind, TweakRegistry,
};
pub use validation::{validate_identifier, ValidationError};
