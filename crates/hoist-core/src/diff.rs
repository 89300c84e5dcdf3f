//! Unified diff generation utilities.
//!
//! Produces a single-hunk unified diff between the before and after text of
//! one buffer. Extraction edits touch a few neighbouring lines, so the changed
//! region is found by trimming the common leading and trailing lines.

/// Lines of unchanged context printed around the changed region.
pub const CONTEXT_LINES: usize = 3;

/// Generate a unified diff for one file.
///
/// Returns an empty string when `before` and `after` are identical.
pub fn unified_diff(path: &str, before: &str, after: &str) -> String {
    if before == after {
        return String::new();
    }

    let old: Vec<&str> = before.split_inclusive('\n').collect();
    let new: Vec<&str> = after.split_inclusive('\n').collect();

    let prefix = old
        .iter()
        .zip(new.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let ctx_start = prefix.saturating_sub(CONTEXT_LINES);
    let old_end = (old.len() - suffix + CONTEXT_LINES).min(old.len());
    let new_end = (new.len() - suffix + CONTEXT_LINES).min(new.len());

    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", path));
    diff.push_str(&format!("+++ b/{}\n", path));
    diff.push_str(&format!(
        "@@ -{} +{} @@\n",
        hunk_range(ctx_start, old_end - ctx_start),
        hunk_range(ctx_start, new_end - ctx_start)
    ));

    for line in &old[ctx_start..prefix] {
        push_line(&mut diff, ' ', line);
    }
    for line in &old[prefix..old.len() - suffix] {
        push_line(&mut diff, '-', line);
    }
    for line in &new[prefix..new.len() - suffix] {
        push_line(&mut diff, '+', line);
    }
    for line in &old[old.len() - suffix..old_end] {
        push_line(&mut diff, ' ', line);
    }

    diff
}

/// Format a hunk header range (`start,count`, 1-indexed; `start` is the line
/// before the hunk when `count` is zero).
fn hunk_range(start: usize, count: usize) -> String {
    if count == 0 {
        format!("{},0", start)
    } else {
        format!("{},{}", start + 1, count)
    }
}

fn push_line(diff: &mut String, marker: char, line: &str) {
    diff.push(marker);
    diff.push_str(line);
    if !line.ends_with('\n') {
        diff.push_str("\n\\ No newline at end of file\n");
    }
}

// ============================================================================
// Tests
// ============================================================================
