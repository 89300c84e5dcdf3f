//! JSON output types and serialization for CLI responses.
//!
//! These types form the machine-readable contract of the `hoist` binary.
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input produces the same output (edits are sorted)
//! 3. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{HoistError, OutputErrorCode};
use crate::patch::MaterializedPatch;
use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Types
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a HoistError.
    pub fn from_error(err: &HoistError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let details = match err {
            HoistError::InvalidArguments { details, .. } => details.clone(),
            HoistError::InvalidIdentifier { name, reason } => {
                Some(serde_json::json!({ "name": name, "reason": reason }))
            }
            HoistError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            HoistError::NotApplicable { tweak, selection } => {
                Some(serde_json::json!({ "tweak": tweak, "selection": selection }))
            }
            HoistError::ApplyError { file, .. } => {
                file.as_ref().map(|f| serde_json::json!({ "file": f }))
            }
            _ => None,
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a HoistError.
    pub fn from_error(err: &HoistError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Metadata of one registered tweak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweakInfo {
    /// Stable identifier (`ExtractVariable`).
    pub id: String,
    /// Menu title.
    pub title: String,
    /// Code action kind.
    pub kind: String,
}

/// Response for `hoist tweaks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweakListResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Registered tweaks, in registration order.
    pub tweaks: Vec<TweakInfo>,
}

impl TweakListResponse {
    pub fn new(tweaks: Vec<TweakInfo>) -> Self {
        TweakListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            tweaks,
        }
    }
}

/// Response for `hoist prepare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The tweak that was asked.
    pub tweak: String,
    /// Whether the tweak is offered for the selection.
    pub available: bool,
    /// The selection, resolved to a location in the main file.
    pub selection: Location,
}

impl PrepareResponse {
    pub fn new(tweak: impl Into<String>, available: bool, selection: Location) -> Self {
        PrepareResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            tweak: tweak.into(),
            available,
            selection,
        }
    }
}

/// Summary of an extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSummary {
    /// Name of the introduced variable.
    pub variable_name: String,
    /// Source text moved into the declaration.
    pub expression: String,
    /// Where the declaration was inserted.
    pub declaration: Location,
    /// Where the expression was replaced.
    pub replacement: Location,
}

/// Response for `hoist apply`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// The tweak that was applied.
    pub tweak: String,
    /// The edits and their unified diff.
    pub patch: MaterializedPatch,
    /// Human-oriented summary.
    pub summary: ExtractSummary,
}

impl ApplyResponse {
    pub fn new(tweak: impl Into<String>, patch: MaterializedPatch, summary: ExtractSummary) -> Self {
        ApplyResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            tweak: tweak.into(),
            patch,
            summary,
        }
    }
}

// ============================================================================
// Emit Helpers
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_response {
        use super::*;

        #[test]
        fn status_comes_first() {
            let resp = ErrorResponse::from_error(&HoistError::invalid_args("bad range"));
            let json = serde_json::to_string(&resp).unwrap();
            assert!(json.starts_with("{\"status\":\"error\""));
            assert!(json.contains("\"code\":2"));
        }

        #[test]
        fn not_applicable_carries_details() {
            let info = ErrorInfo::from_error(&HoistError::not_applicable("ExtractVariable", "[0, 3)"));
            assert_eq!(info.code, 3);
            assert_eq!(
                info.details,
                Some(serde_json::json!({ "tweak": "ExtractVariable", "selection": "[0, 3)" }))
            );
        }

        #[test]
        fn internal_error_has_no_details() {
            let info = ErrorInfo::from_error(&HoistError::internal("boom"));
            let json = serde_json::to_string(&info).unwrap();
            assert!(!json.contains("details"));
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn tweak_list_serializes_entries() {
            let resp = TweakListResponse::new(vec![TweakInfo {
                id: "ExtractVariable".to_string(),
                title: "Extract subexpression to variable".to_string(),
                kind: "refactor".to_string(),
            }]);
            let mut out = Vec::new();
            emit_response(&resp, &mut out).unwrap();
            let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
            assert_eq!(value["status"], "ok");
            assert_eq!(value["schema_version"], SCHEMA_VERSION);
            assert_eq!(value["tweaks"][0]["kind"], "refactor");
        }

        #[test]
        fn prepare_response_reports_availability() {
            let resp = PrepareResponse::new("ExtractVariable", false, Location::new("a.cpp", 1, 9));
            let value = serde_json::to_value(&resp).unwrap();
            assert_eq!(value["available"], false);
            assert_eq!(value["selection"]["col"], 9);
        }
    }
}
