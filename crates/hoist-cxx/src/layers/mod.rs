// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Analysis layers for C-family refactoring operations.
//!
//! Each layer answers one question about a selected expression and knows
//! nothing about edits:
//! - [`references`]: which declarations does it use?
//! - [`binary_op`]: is it part of an associative operator chain, and which
//!   characters did the user mean?
//! - [`eligibility`]: is it worth extracting at all?
//! - [`insertion`]: before which statement can a declaration go?

pub mod binary_op;
pub mod eligibility;
pub mod insertion;
pub mod references;

pub use binary_op::{binary_operator_range, ParsedBinaryOperator};
pub use eligibility::{child_expr_is_disallowed_stmt, eligible_for_extraction};
pub use insertion::{can_extract_outside, compute_insertion_point};
pub use references::collect_referenced_decls;
