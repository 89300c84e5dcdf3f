// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Source buffers, locations, and macro expansion mapping.
//!
//! Every location names a buffer by [`FileId`]. A buffer is either a real file
//! or a macro expansion; an expansion records the range it replaces in its
//! parent buffer. Mapping a location to the file it ultimately came from walks
//! that chain of expansion ranges.
//!
//! ```text
//! #define SUM a + b
//! int x = SUM * 2;
//!         ^^^         expansion buffer 1, parent range [8, 11) in file 0
//! ```

use serde::{Deserialize, Serialize};

use hoist_core::patch::{FileId, Span};

/// A position in some buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: FileId,
    pub offset: u64,
}

impl SourceLocation {
    pub fn new(file: FileId, offset: u64) -> Self {
        SourceLocation { file, offset }
    }
}

/// A half-open range `[begin, end)`.
///
/// Both ends may sit in different buffers when a node straddles a macro
/// expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(begin: SourceLocation, end: SourceLocation) -> Self {
        SourceRange { begin, end }
    }

    /// A range entirely inside one buffer.
    pub fn in_buffer(file: FileId, start: u64, end: u64) -> Self {
        SourceRange {
            begin: SourceLocation::new(file, start),
            end: SourceLocation::new(file, end),
        }
    }

    /// A range in one buffer covering `span`.
    pub fn from_span(file: FileId, span: Span) -> Self {
        SourceRange::in_buffer(file, span.start, span.end)
    }
}

/// One entry of the buffer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Buffer {
    /// A real source file.
    File { path: String, text: String },
    /// The expansion of a macro, spliced over `expansion` in its parent.
    Expansion {
        macro_name: String,
        expansion: SourceRange,
    },
}

/// Which end of a range a location is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Begin,
    End,
}

/// Owner of all buffers of one translation unit.
///
/// The first file added is the main file; edits are only ever produced
/// against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceManager {
    buffers: Vec<Buffer>,
    main_file: Option<FileId>,
}

impl SourceManager {
    pub fn new() -> Self {
        SourceManager::default()
    }

    /// Register a real file. The first file registered becomes the main file.
    pub fn add_file(&mut self, path: impl Into<String>, text: impl Into<String>) -> FileId {
        let id = self.push(Buffer::File {
            path: path.into(),
            text: text.into(),
        });
        if self.main_file.is_none() {
            self.main_file = Some(id);
        }
        id
    }

    /// Register a macro expansion covering `expansion` in an existing buffer.
    pub fn add_expansion(&mut self, macro_name: impl Into<String>, expansion: SourceRange) -> FileId {
        self.push(Buffer::Expansion {
            macro_name: macro_name.into(),
            expansion,
        })
    }

    fn push(&mut self, buffer: Buffer) -> FileId {
        let id = FileId::new(self.buffers.len() as u32);
        self.buffers.push(buffer);
        id
    }

    pub fn buffer(&self, id: FileId) -> Option<&Buffer> {
        self.buffers.get(id.index())
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    pub fn main_file(&self) -> Option<FileId> {
        self.main_file
    }

    /// Path of the main file.
    pub fn main_path(&self) -> Option<&str> {
        match self.buffer(self.main_file?)? {
            Buffer::File { path, .. } => Some(path),
            Buffer::Expansion { .. } => None,
        }
    }

    /// Text of the main file (empty when no file was registered).
    pub fn main_text(&self) -> &str {
        self.main_file
            .and_then(|id| self.file_text(id))
            .unwrap_or_default()
    }

    /// Text of a real file.
    pub fn file_text(&self, id: FileId) -> Option<&str> {
        match self.buffer(id)? {
            Buffer::File { text, .. } => Some(text),
            Buffer::Expansion { .. } => None,
        }
    }

    /// The buffer a location points into.
    pub fn buffer_of(&self, loc: SourceLocation) -> FileId {
        loc.file
    }

    /// True when the location is inside a macro expansion.
    pub fn is_macro_id(&self, loc: SourceLocation) -> bool {
        matches!(self.buffer(loc.file), Some(Buffer::Expansion { .. }))
    }

    /// Map a begin location to a real file, through any expansions.
    pub fn file_location_begin(&self, loc: SourceLocation) -> Option<SourceLocation> {
        self.file_location(loc, Edge::Begin)
    }

    /// Map an end location to a real file, through any expansions.
    pub fn file_location_end(&self, loc: SourceLocation) -> Option<SourceLocation> {
        self.file_location(loc, Edge::End)
    }

    fn file_location(&self, mut loc: SourceLocation, edge: Edge) -> Option<SourceLocation> {
        // Each step moves to an earlier buffer, so the chain is bounded.
        for _ in 0..=self.buffers.len() {
            match self.buffer(loc.file)? {
                Buffer::File { .. } => return Some(loc),
                Buffer::Expansion { expansion, .. } => {
                    loc = match edge {
                        Edge::Begin => expansion.begin,
                        Edge::End => expansion.end,
                    };
                }
            }
        }
        None
    }

    /// Half-open byte range of `range` in the main file.
    ///
    /// Returns `None` when either end maps outside the main file, or when the
    /// mapped ends are inverted.
    pub fn file_range(&self, range: SourceRange) -> Option<Span> {
        let main = self.main_file?;
        let begin = self.file_location_begin(range.begin)?;
        let end = self.file_location_end(range.end)?;
        if begin.file != main || end.file != main || begin.offset > end.offset {
            return None;
        }
        Some(Span::new(begin.offset, end.offset))
    }

    /// Main-file text covered by `span`.
    pub fn text_of(&self, span: Span) -> Option<&str> {
        self.main_text().get(span.as_range())
    }

    /// Check internal consistency: every expansion maps to a real file and
    /// every real-file offset is within its buffer.
    pub fn validate(&self) -> Result<(), String> {
        if self.buffers.is_empty() {
            return Ok(());
        }
        match self.main_file {
            Some(id) if self.file_text(id).is_some() => {}
            _ => return Err("main file is not a registered file buffer".to_string()),
        }
        for (index, buffer) in self.buffers.iter().enumerate() {
            if let Buffer::Expansion {
                macro_name,
                expansion,
            } = buffer
            {
                for loc in [expansion.begin, expansion.end] {
                    if loc.file.index() >= index {
                        return Err(format!(
                            "expansion of {} refers to a later buffer {}",
                            macro_name, loc.file
                        ));
                    }
                }
                if self.file_range_any(*expansion).is_none() {
                    return Err(format!(
                        "expansion of {} does not map to a file range",
                        macro_name
                    ));
                }
            }
        }
        Ok(())
    }

    fn file_range_any(&self, range: SourceRange) -> Option<()> {
        let begin = self.file_location_begin(range.begin)?;
        let end = self.file_location_end(range.end)?;
        let len = self.file_text(begin.file)?.len() as u64;
        (begin.file == end.file && begin.offset <= end.offset && end.offset <= len).then_some(())
    }
}

// ============================================================================
// Tests
// ============================================================================
