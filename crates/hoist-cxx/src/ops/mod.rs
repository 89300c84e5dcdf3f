// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! C-family refactoring operations.
//!
//! Operations combine the analysis layers into tweaks that produce edits.

pub mod extract_variable;

use hoist_ast::Ast;
use hoist_core::error::HoistError;
use hoist_core::patch::{ApplyContext, ApplyResult};

use crate::tweak::Effect;

/// The main file of `ast` as it reads after `effect` is applied.
///
/// An effect without edits leaves the text unchanged.
pub fn rewritten_main_text(ast: &Ast, effect: &Effect) -> Result<String, HoistError> {
    let main = ast
        .sources
        .main_file()
        .ok_or_else(|| HoistError::invalid_snapshot("snapshot has no main file"))?;
    let original = ast.sources.main_text();
    let ctx = ApplyContext::single(main, original.as_bytes().to_vec());

    match effect.apply(&ctx) {
        ApplyResult::Success { mut modified_files } => match modified_files.remove(&main) {
            Some(bytes) => String::from_utf8(bytes)
                .map_err(|e| HoistError::internal(format!("edit produced invalid UTF-8: {}", e))),
            None => Ok(original.to_string()),
        },
        ApplyResult::Failed { conflicts } => {
            let message = conflicts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(HoistError::ApplyError {
                message,
                file: ast.sources.main_path().map(str::to_string),
            })
        }
    }
}
