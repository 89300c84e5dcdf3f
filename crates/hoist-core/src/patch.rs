//! Patch IR: anchored edits and the atomic edit set produced by a refactor.
//!
//! A refactor never mutates source text itself. It emits a [`PatchSet`]: a
//! group of [`Edit`]s that all target one buffer, are mutually
//! non-overlapping, and are applied all-or-nothing by the host.
//!
//! - [`PatchSet::try_add`] rejects an edit that conflicts with the set
//! - [`PatchSet::apply`] verifies anchors and rewrites buffers atomically
//! - [`PatchSet::materialize`] renders edits for JSON output and diffs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

use crate::diff::unified_diff as unified_diff_for;
use crate::text::byte_offset_to_position;

/// Hash type for content verification (SHA-256, stored as hex string for JSON compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes, returning hex-encoded string.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Core Types
// ============================================================================

/// Identifier of a source buffer.
///
/// Real files and macro expansion buffers share this id space; edits are only
/// ever anchored to real files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID.
    pub fn new(id: u32) -> Self {
        FileId(id)
    }

    /// Index into a buffer table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

/// Byte offsets into a buffer.
///
/// Spans are half-open intervals: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: u64,
    /// End byte offset (exclusive).
    pub end: u64,
}

impl Span {
    /// Create a new span.
    ///
    /// # Panics
    /// Panics if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(
            start <= end,
            "Span start ({}) must be <= end ({})",
            start,
            end
        );
        Span { start, end }
    }

    /// Zero-width span at `offset`.
    pub fn empty_at(offset: u64) -> Self {
        Span {
            start: offset,
            end: offset,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this span overlaps with another.
    ///
    /// Two spans overlap if they share any byte positions. Adjacent spans do
    /// NOT overlap, and an empty span only overlaps a span that strictly
    /// surrounds it.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Check if this span contains another span entirely.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Check if this span intersects another, counting touching empty spans.
    pub fn intersects(&self, other: &Span) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.start <= other.end && other.start <= self.end;
        }
        self.overlaps(other)
    }

    /// Byte range usable for slicing.
    pub fn as_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

// ============================================================================
// Anchor Model
// ============================================================================

/// How an edit finds and validates its target location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// Exact span with hash verification.
    ///
    /// The edit will only apply if the bytes at `span` hash to `expected_before_hash`.
    SpanExact {
        /// The exact byte range to edit.
        span: Span,
        /// SHA-256 hash of the bytes in `span` before the edit.
        expected_before_hash: ContentHash,
    },
}

impl Anchor {
    /// Create a SpanExact anchor from the buffer the span points into.
    ///
    /// Out-of-range spans hash as empty and fail later in [`Anchor::resolve`].
    pub fn span_exact(span: Span, buffer: &[u8]) -> Self {
        let bytes = buffer.get(span.as_range()).unwrap_or(&[]);
        Anchor::SpanExact {
            span,
            expected_before_hash: ContentHash::compute(bytes),
        }
    }

    /// Get the span for this anchor.
    pub fn span(&self) -> Span {
        match self {
            Anchor::SpanExact { span, .. } => *span,
        }
    }

    /// Resolve this anchor against the given buffer content.
    pub fn resolve(&self, content: &[u8]) -> AnchorResolution {
        match self {
            Anchor::SpanExact {
                span,
                expected_before_hash,
            } => {
                if span.end as usize > content.len() {
                    return AnchorResolution::OutOfBounds {
                        span: *span,
                        file_len: content.len() as u64,
                    };
                }

                let actual = ContentHash::compute(&content[span.as_range()]);
                if &actual != expected_before_hash {
                    return AnchorResolution::HashMismatch {
                        span: *span,
                        expected: expected_before_hash.clone(),
                        actual,
                    };
                }

                AnchorResolution::Resolved(*span)
            }
        }
    }
}

/// Result of attempting to resolve an anchor against file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorResolution {
    /// Anchor resolved successfully to a specific span.
    Resolved(Span),
    /// Content at span doesn't match the expected hash.
    HashMismatch {
        span: Span,
        expected: ContentHash,
        actual: ContentHash,
    },
    /// Span is out of bounds for the file content.
    OutOfBounds { span: Span, file_len: u64 },
}

// ============================================================================
// Conflict Detection
// ============================================================================

/// A detected overlap or invalidation that prevents an edit set from applying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Conflict {
    /// Two edits have overlapping spans in the same file.
    OverlappingSpans {
        file_id: FileId,
        edit1_span: Span,
        edit2_span: Span,
    },

    /// An edit targets a different buffer than the rest of the set.
    MixedBuffers { expected: FileId, actual: FileId },

    /// Anchor hash mismatch.
    AnchorHashMismatch {
        file_id: FileId,
        span: Span,
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Span is out of bounds for the file.
    SpanOutOfBounds {
        file_id: FileId,
        span: Span,
        file_len: u64,
    },

    /// File not found in context.
    FileMissing { file_id: FileId },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::OverlappingSpans {
                file_id,
                edit1_span,
                edit2_span,
            } => write!(
                f,
                "overlapping edits in {}: {} and {}",
                file_id, edit1_span, edit2_span
            ),
            Conflict::MixedBuffers { expected, actual } => {
                write!(f, "edit targets {} but the set is anchored to {}", actual, expected)
            }
            Conflict::AnchorHashMismatch { file_id, span, .. } => {
                write!(f, "content changed under edit at {} in {}", span, file_id)
            }
            Conflict::SpanOutOfBounds {
                file_id,
                span,
                file_len,
            } => write!(
                f,
                "edit span {} out of bounds for {} ({} bytes)",
                span, file_id, file_len
            ),
            Conflict::FileMissing { file_id } => write!(f, "no content for {}", file_id),
        }
    }
}

impl std::error::Error for Conflict {}

// ============================================================================
// Edit Operations
// ============================================================================

/// The kind of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Insert text at `anchor.span.start`.
    Insert,
    /// Delete the bytes in `anchor.span`.
    Delete,
    /// Replace the bytes in `anchor.span` with new text.
    Replace,
}

/// Optional labels for provenance tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditLabels {
    /// The tweak that generated this edit.
    pub tweak_id: Option<String>,
    /// Human-readable reason for the edit.
    pub reason: Option<String>,
}

/// A single atomic text change anchored in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// Stable identifier for ordering.
    pub id: u32,
    /// The file this edit applies to.
    pub file_id: FileId,
    /// The kind of operation.
    pub kind: EditKind,
    /// How to find/verify the target location.
    pub anchor: Anchor,
    /// The new text (empty for Delete).
    pub text: String,
    /// Optional provenance labels.
    pub labels: EditLabels,
}

impl Edit {
    /// Create an Insert edit.
    ///
    /// # Panics
    /// Panics if the anchor's span is not empty.
    pub fn insert(id: u32, file_id: FileId, anchor: Anchor, text: impl Into<String>) -> Self {
        let span = anchor.span();
        assert!(
            span.is_empty(),
            "Insert anchor span must be empty (start == end), got {:?}",
            span
        );
        Edit {
            id,
            file_id,
            kind: EditKind::Insert,
            anchor,
            text: text.into(),
            labels: EditLabels::default(),
        }
    }

    /// Create a Delete edit.
    ///
    /// # Panics
    /// Panics if the anchor's span is empty.
    pub fn delete(id: u32, file_id: FileId, anchor: Anchor) -> Self {
        let span = anchor.span();
        assert!(
            !span.is_empty(),
            "Delete anchor span must be non-empty (start != end), got {:?}",
            span
        );
        Edit {
            id,
            file_id,
            kind: EditKind::Delete,
            anchor,
            text: String::new(),
            labels: EditLabels::default(),
        }
    }

    /// Create a Replace edit.
    pub fn replace(id: u32, file_id: FileId, anchor: Anchor, text: impl Into<String>) -> Self {
        Edit {
            id,
            file_id,
            kind: EditKind::Replace,
            anchor,
            text: text.into(),
            labels: EditLabels::default(),
        }
    }

    /// Add labels to this edit.
    pub fn with_labels(mut self, labels: EditLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Get the anchor's span.
    pub fn span(&self) -> Span {
        self.anchor.span()
    }

    /// Text that ends up in the buffer after this edit.
    pub fn new_text(&self) -> &str {
        match self.kind {
            EditKind::Delete => "",
            EditKind::Insert | EditKind::Replace => &self.text,
        }
    }
}

// ============================================================================
// PatchSet
// ============================================================================

/// An ordered set of edits applied atomically.
///
/// Edits either all apply or none do. A set built through [`PatchSet::try_add`]
/// is guaranteed to be conflict-free and anchored to a single buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchSet {
    /// The edits, in insertion order.
    pub edits: Vec<Edit>,

    /// Mapping from FileId to file path (for materialization).
    pub file_paths: HashMap<FileId, String>,
}

impl PatchSet {
    /// Create a new empty PatchSet.
    pub fn new() -> Self {
        PatchSet::default()
    }

    /// Register a file path mapping.
    pub fn with_file_path(mut self, file_id: FileId, path: impl Into<String>) -> Self {
        self.file_paths.insert(file_id, path.into());
        self
    }

    /// Add an edit, rejecting it if it conflicts with an edit already in the set.
    ///
    /// The set is left unchanged when a conflict is reported.
    pub fn try_add(&mut self, edit: Edit) -> Result<(), Conflict> {
        if let Some(first) = self.edits.first() {
            if first.file_id != edit.file_id {
                return Err(Conflict::MixedBuffers {
                    expected: first.file_id,
                    actual: edit.file_id,
                });
            }
        }

        let span = edit.span();
        if let Some(existing) = self.edits.iter().find(|e| e.span().overlaps(&span)) {
            return Err(Conflict::OverlappingSpans {
                file_id: edit.file_id,
                edit1_span: existing.span(),
                edit2_span: span,
            });
        }

        self.edits.push(edit);
        Ok(())
    }

    /// Get the number of edits in this PatchSet.
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// The buffer every edit targets, if the set is non-empty and uniform.
    pub fn target_file(&self) -> Option<FileId> {
        let first = self.edits.first()?.file_id;
        self.edits
            .iter()
            .all(|e| e.file_id == first)
            .then_some(first)
    }

    /// Detect conflicts within this PatchSet.
    ///
    /// Returns a list of all detected conflicts. An empty list means no conflicts.
    #[must_use]
    pub fn detect_conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for i in 0..self.edits.len() {
            for j in (i + 1)..self.edits.len() {
                let (a, b) = (&self.edits[i], &self.edits[j]);
                if a.file_id != b.file_id {
                    continue;
                }
                if a.span().overlaps(&b.span()) {
                    conflicts.push(Conflict::OverlappingSpans {
                        file_id: a.file_id,
                        edit1_span: a.span(),
                        edit2_span: b.span(),
                    });
                }
            }
        }

        conflicts
    }
}

// ============================================================================
// Atomic Apply
// ============================================================================

/// Result of attempting to apply a PatchSet.
#[derive(Debug, Clone)]
pub enum ApplyResult {
    /// All edits applied successfully.
    Success {
        /// The new content for each modified file.
        modified_files: HashMap<FileId, Vec<u8>>,
    },

    /// Apply failed due to conflicts.
    Failed {
        /// The conflicts that prevented apply.
        conflicts: Vec<Conflict>,
    },
}

/// Context for applying a PatchSet.
#[derive(Debug, Clone, Default)]
pub struct ApplyContext {
    /// File contents, keyed by FileId.
    pub file_contents: HashMap<FileId, Vec<u8>>,
}

impl ApplyContext {
    /// Context holding a single buffer.
    pub fn single(file_id: FileId, content: impl Into<Vec<u8>>) -> Self {
        let mut file_contents = HashMap::new();
        file_contents.insert(file_id, content.into());
        ApplyContext { file_contents }
    }
}

impl PatchSet {
    /// Apply this PatchSet atomically.
    ///
    /// Either all edits apply successfully, or none do.
    ///
    /// # Ordering
    ///
    /// Edits are applied from the end of each buffer to the start so earlier
    /// spans stay valid. At equal start offsets a replacement is applied before
    /// an insertion, which leaves the inserted text in front of the
    /// replacement.
    #[must_use]
    pub fn apply(&self, ctx: &ApplyContext) -> ApplyResult {
        let mut conflicts = self.detect_conflicts();
        let mut resolved: HashMap<FileId, Vec<(Span, &Edit)>> = HashMap::new();

        for edit in &self.edits {
            let Some(content) = ctx.file_contents.get(&edit.file_id) else {
                conflicts.push(Conflict::FileMissing {
                    file_id: edit.file_id,
                });
                continue;
            };

            match edit.anchor.resolve(content) {
                AnchorResolution::Resolved(span) => {
                    resolved.entry(edit.file_id).or_default().push((span, edit));
                }
                AnchorResolution::HashMismatch {
                    span,
                    expected,
                    actual,
                } => conflicts.push(Conflict::AnchorHashMismatch {
                    file_id: edit.file_id,
                    span,
                    expected,
                    actual,
                }),
                AnchorResolution::OutOfBounds { span, file_len } => {
                    conflicts.push(Conflict::SpanOutOfBounds {
                        file_id: edit.file_id,
                        span,
                        file_len,
                    })
                }
            }
        }

        if !conflicts.is_empty() {
            return ApplyResult::Failed { conflicts };
        }

        let mut modified_files = HashMap::new();
        for (file_id, mut file_edits) in resolved {
            let Some(original) = ctx.file_contents.get(&file_id) else {
                continue;
            };
            modified_files.insert(file_id, splice_edits(original, &mut file_edits));
        }

        ApplyResult::Success { modified_files }
    }
}

/// Rewrite `original` with already-resolved edits, back to front.
fn splice_edits(original: &[u8], edits: &mut [(Span, &Edit)]) -> Vec<u8> {
    edits.sort_by(|a, b| {
        b.0.start
            .cmp(&a.0.start)
            .then_with(|| b.0.end.cmp(&a.0.end))
            .then_with(|| b.1.id.cmp(&a.1.id))
    });

    let mut content = original.to_vec();
    for (span, edit) in edits.iter() {
        content.splice(span.as_range(), edit.new_text().bytes());
    }
    content
}

// ============================================================================
// Patch Materialization
// ============================================================================

/// A single edit as it appears in output (for JSON serialization).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEdit {
    /// File path.
    pub file: String,
    /// Byte range being replaced.
    pub span: Span,
    /// Original text (for verification).
    pub old_text: String,
    /// Replacement text.
    pub new_text: String,
    /// 1-indexed line number (for display).
    pub line: u32,
    /// 1-indexed column (for display).
    pub col: u32,
}

/// Materialized patch output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterializedPatch {
    /// Individual edits (ordered by file, then span.start).
    pub edits: Vec<OutputEdit>,
    /// Unified diff of every touched buffer (files in path order).
    pub unified_diff: String,
}

impl PatchSet {
    /// Materialize this PatchSet to output format.
    ///
    /// Requires file contents to compute old_text and line/col positions.
    pub fn materialize(&self, file_contents: &HashMap<FileId, Vec<u8>>) -> MaterializedPatch {
        let mut sorted_edits: Vec<&Edit> = self.edits.iter().collect();
        sorted_edits.sort_by(|a, b| {
            let path_a = self.file_paths.get(&a.file_id).map(String::as_str);
            let path_b = self.file_paths.get(&b.file_id).map(String::as_str);
            path_a
                .cmp(&path_b)
                .then_with(|| a.span().start.cmp(&b.span().start))
                .then_with(|| a.span().end.cmp(&b.span().end))
        });

        let edits: Vec<OutputEdit> = sorted_edits
            .into_iter()
            .map(|edit| {
                let path = self
                    .file_paths
                    .get(&edit.file_id)
                    .cloned()
                    .unwrap_or_else(|| edit.file_id.to_string());
                let span = edit.span();

                let (old_text, line, col) = match file_contents.get(&edit.file_id) {
                    Some(content) => {
                        let old_bytes = content.get(span.as_range()).unwrap_or(&[]);
                        let (line, col) = byte_offset_to_position(content, span.start as usize);
                        (String::from_utf8_lossy(old_bytes).into_owned(), line, col)
                    }
                    None => (String::new(), 1, 1),
                };

                OutputEdit {
                    file: path,
                    span,
                    old_text,
                    new_text: edit.new_text().to_string(),
                    line,
                    col,
                }
            })
            .collect();

        let mut by_file: HashMap<FileId, Vec<(Span, &Edit)>> = HashMap::new();
        for edit in &self.edits {
            by_file
                .entry(edit.file_id)
                .or_default()
                .push((edit.span(), edit));
        }
        let mut files: Vec<(String, FileId)> = by_file
            .keys()
            .map(|id| {
                let path = self
                    .file_paths
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string());
                (path, *id)
            })
            .collect();
        files.sort();

        let mut unified_diff = String::new();
        for (path, file_id) in files {
            let (Some(content), Some(file_edits)) =
                (file_contents.get(&file_id), by_file.get_mut(&file_id))
            else {
                continue;
            };
            if file_edits
                .iter()
                .any(|(span, _)| span.end as usize > content.len())
            {
                continue;
            }
            let after = splice_edits(content, file_edits);
            unified_diff.push_str(&unified_diff_for(
                &path,
                &String::from_utf8_lossy(content),
                &String::from_utf8_lossy(&after),
            ));
        }

        MaterializedPatch {
            edits,
            unified_diff,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
