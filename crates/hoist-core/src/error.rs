//! Error types and error code constants for hoist.
//!
//! `HoistError` is the single error type rendered by the CLI. Domain errors
//! (patch conflicts, snapshot decoding, tweak failures) are bridged into it
//! with `From` impls so callers can use `?` throughout.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (bad input from caller, malformed snapshot)
//! - `3`: Resolution errors (file not found, refactor not applicable)
//! - `4`: Apply errors (edit conflicts, stale content)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use crate::patch::Conflict;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, nothing to extract at the selection).
    ResolutionError = 3,
    /// Apply errors (conflicting edits, content changed under an anchor).
    ApplyError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum HoistError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid identifier for the new variable.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// The AST snapshot could not be decoded or is internally inconsistent.
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot { message: String },

    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// The requested tweak does not apply to the selection.
    #[error("{tweak} is not available for selection {selection}")]
    NotApplicable { tweak: String, selection: String },

    /// Failed to build or apply the edit set.
    #[error("apply error: {message}")]
    ApplyError {
        message: String,
        file: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&HoistError> for OutputErrorCode {
    fn from(err: &HoistError) -> Self {
        match err {
            HoistError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            HoistError::InvalidIdentifier { .. } => OutputErrorCode::InvalidArguments,
            HoistError::InvalidSnapshot { .. } => OutputErrorCode::InvalidArguments,
            HoistError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            HoistError::NotApplicable { .. } => OutputErrorCode::ResolutionError,
            HoistError::ApplyError { .. } => OutputErrorCode::ApplyError,
            HoistError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<HoistError> for OutputErrorCode {
    fn from(err: HoistError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl From<Conflict> for HoistError {
    fn from(conflict: Conflict) -> Self {
        HoistError::ApplyError {
            message: conflict.to_string(),
            file: None,
        }
    }
}

impl From<serde_json::Error> for HoistError {
    fn from(err: serde_json::Error) -> Self {
        HoistError::InvalidSnapshot {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl HoistError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        HoistError::InvalidArguments {
            message: message.into(),
            details: None,
        }
    }

    /// Create an invalid arguments error with JSON details.
    pub fn invalid_args_with_details(
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        HoistError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a snapshot error.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        HoistError::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        HoistError::FileNotFound { path: path.into() }
    }

    /// Create a not-applicable error for a tweak and a rendered selection.
    pub fn not_applicable(tweak: impl Into<String>, selection: impl Into<String>) -> Self {
        HoistError::NotApplicable {
            tweak: tweak.into(),
            selection: selection.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        HoistError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
