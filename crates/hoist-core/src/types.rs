//! Common types shared between the error, output, and CLI layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::patch::Span;
use crate::text::{byte_offset_to_position, position_to_byte_offset_str};

// ============================================================================
// Location Type
// ============================================================================

/// Location in a source file.
///
/// - `file`: path as recorded in the snapshot
/// - `line`: 1-indexed line number
/// - `col`: 1-indexed column, UTF-8 bytes
/// - `byte_start` / `byte_end`: optional half-open byte range
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    /// File path.
    pub file: String,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, UTF-8 bytes).
    pub col: u32,
    /// Byte offset from file start (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_start: Option<u64>,
    /// Byte offset end, exclusive (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_end: Option<u64>,
}

impl Location {
    /// Create a new location without byte offsets.
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            byte_start: None,
            byte_end: None,
        }
    }

    /// Locate a span inside `content`, keeping the byte range.
    pub fn of_span(file: impl Into<String>, content: &[u8], span: Span) -> Self {
        let (line, col) = byte_offset_to_position(content, span.start as usize);
        Location {
            file: file.into(),
            line,
            col,
            byte_start: Some(span.start),
            byte_end: Some(span.end),
        }
    }

    /// Comparison key for deterministic sorting: (file, line, col).
    fn sort_key(&self) -> (&str, u32, u32) {
        (&self.file, self.line, self.col)
    }
}

impl PartialOrd for Location {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Location {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.col)
    }
}

// ============================================================================
// Selection Arguments
// ============================================================================

/// A user selection as typed on the command line.
///
/// - `start..end`: half-open byte offsets
/// - `line:col-line:col`: 1-indexed positions, columns in characters
/// - `line:col`: a caret (empty selection)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionArg {
    Bytes(Span),
    Positions {
        start: (u32, u32),
        end: (u32, u32),
    },
}

impl SelectionArg {
    /// Resolve the selection to a byte span within `content`.
    ///
    /// Returns `None` when the selection is inverted or past the end of content.
    pub fn resolve(&self, content: &str) -> Option<Span> {
        let (start, end) = match *self {
            SelectionArg::Bytes(span) => (span.start, span.end),
            SelectionArg::Positions { start, end } => (
                position_to_byte_offset_str(content, start.0, start.1) as u64,
                position_to_byte_offset_str(content, end.0, end.1) as u64,
            ),
        };
        (start <= end && end <= content.len() as u64).then(|| Span::new(start, end))
    }
}

fn parse_position(s: &str) -> Option<(u32, u32)> {
    let (line, col) = s.split_once(':')?;
    Some((line.trim().parse().ok()?, col.trim().parse().ok()?))
}

impl FromStr for SelectionArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some((start, end)) = s.split_once("..") {
            let start: u64 = start
                .trim()
                .parse()
                .map_err(|_| format!("invalid start offset in '{}'", s))?;
            let end: u64 = end
                .trim()
                .parse()
                .map_err(|_| format!("invalid end offset in '{}'", s))?;
            if start > end {
                return Err(format!("range '{}' ends before it starts", s));
            }
            return Ok(SelectionArg::Bytes(Span::new(start, end)));
        }

        let (start, end) = match s.split_once('-') {
            Some((a, b)) => (parse_position(a), parse_position(b)),
            None => {
                let caret = parse_position(s);
                (caret, caret)
            }
        };
        match (start, end) {
            (Some(start), Some(end)) => Ok(SelectionArg::Positions { start, end }),
            _ => Err(format!(
                "expected 'start..end' or 'line:col-line:col', got '{}'",
                s
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
