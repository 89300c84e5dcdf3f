//! Text position utilities for byte offset and line:column conversions.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Line/column values of 0 are treated as 1
//!
//! The byte-based family counts columns in bytes and is what the patch IR
//! uses. The `_str` family counts Unicode scalar values and is used for
//! positions typed by a user (`--at line:col`).

use crate::patch::Span;

// ============================================================================
// Byte-based Conversions (for &[u8])
// ============================================================================

/// Convert a byte offset to 1-indexed line and column.
///
/// Columns count bytes. If `offset` exceeds content length, returns the
/// position at end of content.
pub fn byte_offset_to_position(content: &[u8], offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for &byte in &content[..offset] {
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert 1-indexed line and column to byte offset.
///
/// Columns past the end of a line clamp to the line's newline. A line past
/// the end of content returns the content length.
pub fn position_to_byte_offset(content: &[u8], line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let Some(start) = line_start(content, line) else {
        return content.len();
    };
    let line_end = content[start..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|p| start + p)
        .unwrap_or(content.len());
    start + ((col as usize) - 1).min(line_end - start)
}

// ============================================================================
// Char-based Conversions (for &str)
// ============================================================================

/// Convert a byte offset to 1-indexed line and column (Unicode-aware).
pub fn byte_offset_to_position_str(content: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, ch) in content.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Convert 1-indexed line and column to byte offset (Unicode-aware).
pub fn position_to_byte_offset_str(content: &str, line: u32, col: u32) -> usize {
    let line = line.max(1);
    let col = col.max(1);

    let Some(start) = line_start(content.as_bytes(), line) else {
        return content.len();
    };
    let rest = &content[start..];
    let line_len = rest.find('\n').unwrap_or(rest.len());
    rest[..line_len]
        .char_indices()
        .nth((col - 1) as usize)
        .map(|(i, _)| start + i)
        .unwrap_or(start + line_len)
}

// ============================================================================
// Span and Line Utilities
// ============================================================================

/// Byte offset of the first byte of a 1-indexed line, if the line exists.
///
/// A trailing newline opens an (empty) final line.
fn line_start(content: &[u8], line: u32) -> Option<usize> {
    if line == 1 {
        return Some(0);
    }
    let mut current = 1u32;
    for (i, &byte) in content.iter().enumerate() {
        if byte == b'\n' {
            current += 1;
            if current == line {
                return Some(i + 1);
            }
        }
    }
    None
}

/// Get the line range spanned by a byte span as `(start_line, end_line)`.
pub fn span_to_line_range(content: &[u8], span: &Span) -> (u32, u32) {
    let (start_line, _) = byte_offset_to_position(content, span.start as usize);
    let last = span.end.saturating_sub(1).max(span.start);
    let (end_line, _) = byte_offset_to_position(content, last as usize);
    (start_line, end_line)
}

/// Extract the text content of a span from byte content.
///
/// Returns `None` if the span extends beyond content bounds.
pub fn extract_span<'a>(content: &'a [u8], span: &Span) -> Option<&'a [u8]> {
    content.get(span.as_range())
}

/// Extract the text content of a span as a string.
///
/// Returns `None` if the span is out of bounds or splits a UTF-8 sequence.
pub fn extract_span_str<'a>(content: &'a str, span: &Span) -> Option<&'a str> {
    content.get(span.as_range())
}

// ============================================================================
// Tests
// ============================================================================
