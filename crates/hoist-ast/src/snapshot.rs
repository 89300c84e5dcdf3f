// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! JSON snapshots of parsed translation units.
//!
//! A snapshot is the serialized form of an [`Ast`]: language options, the
//! buffer table (main file text included), and the node arena. Frontends dump
//! one per translation unit; hoist reads it back and validates it before any
//! tweak runs.

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use hoist_core::error::HoistError;

use crate::ast::{Ast, AstError};

/// Failure to load a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent snapshot: {0}")]
    Invalid(#[from] AstError),
}

impl From<SnapshotError> for HoistError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Io { path, source } if source.kind() == io::ErrorKind::NotFound => {
                HoistError::file_not_found(path)
            }
            other => HoistError::invalid_snapshot(other.to_string()),
        }
    }
}

/// Parse and validate a snapshot.
pub fn from_json(json: &str) -> Result<Ast, SnapshotError> {
    let ast: Ast = serde_json::from_str(json)?;
    ast.validate()?;
    Ok(ast)
}

/// Serialize an AST as a snapshot.
pub fn to_json(ast: &Ast) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(ast)?)
}

/// Read a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Ast, SnapshotError> {
    let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let ast = from_json(&json)?;
    debug!(
        path = %path.display(),
        nodes = ast.len(),
        main = ast.sources.main_path().unwrap_or("<none>"),
        "loaded snapshot"
    );
    Ok(ast)
}
