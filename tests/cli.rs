//! Integration tests for the CLI front door.
//!
//! Snapshots are built with `AstBuilder`, written to a temp dir, and run
//! through the same functions the `hoist` binary calls.

use std::path::{Path, PathBuf};

use hoist::ast::builder::AstBuilder;
use hoist::ast::node::BinaryOpKind;
use hoist::ast::snapshot::to_json;
use hoist::ast::QualType;
use hoist::cli::{run_apply, run_prepare, run_tweaks};
use hoist::config::{CliOverrides, LanguageStandard, ResolvedConfig};
use hoist::error::{HoistError, OutputErrorCode};
use hoist::patch::Span;
use hoist::types::SelectionArg;

const TWEAK: &str = "ExtractVariable";

const SOURCE: &str = "void f() {\n  int x = 5 + 4 * 3;\n}\n";

/// Write `void f() { int x = (5 + 4) * 3; }` as a snapshot under `dir`.
fn write_snapshot(dir: &Path) -> PathBuf {
    let mut b = AstBuilder::with_path("calc.cpp", SOURCE);
    let five = b.int_literal(b.span_of("5"));
    let four = b.int_literal(b.span_of("4"));
    let three = b.int_literal(b.span_of("3"));
    let sum = b.binary(BinaryOpKind::Add, five, four, QualType::int());
    let product = b.binary(BinaryOpKind::Mul, sum, three, QualType::int());
    let x = b.var("x", b.span_of("int x = 5 + 4 * 3"), Some(product), QualType::int());
    let stmt = b.decl_stmt(vec![x], b.span_of("int x = 5 + 4 * 3;"));
    let body = b.compound(vec![stmt], b.span_of("{\n  int x = 5 + 4 * 3;\n}"));
    let f = b.function("f", Span::new(0, SOURCE.trim_end().len() as u64), vec![], Some(body));
    let ast = b.finish(vec![f]);

    let path = dir.join("calc.json");
    std::fs::write(&path, to_json(&ast).unwrap()).unwrap();
    path
}

fn bytes_of(needle: &str) -> SelectionArg {
    let start = SOURCE.find(needle).unwrap() as u64;
    SelectionArg::Bytes(Span::new(start, start + needle.len() as u64))
}

/// Configuration with no environment, only the given flags.
fn config(overrides: CliOverrides) -> ResolvedConfig {
    ResolvedConfig::resolve_with_env(&overrides, |_| None)
}

fn defaults() -> ResolvedConfig {
    config(CliOverrides::default())
}

// ============================================================================
// tweaks
// ============================================================================

#[test]
fn tweaks_lists_builtin_tweak() {
    let response = run_tweaks();
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["tweaks"][0]["id"], TWEAK);
    assert_eq!(json["tweaks"][0]["kind"], "refactor");
}

// ============================================================================
// prepare
// ============================================================================

mod prepare {
    use super::*;

    #[test]
    fn available_for_sum_by_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let response = run_prepare(&snapshot, bytes_of("5 + 4"), TWEAK, &defaults()).unwrap();
        assert!(response.available);
        assert_eq!(response.selection.file, "calc.cpp");
        assert_eq!((response.selection.line, response.selection.col), (2, 11));
    }

    #[test]
    fn available_for_sum_by_positions() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let at: SelectionArg = "2:11-2:16".parse().unwrap();
        let response = run_prepare(&snapshot, at, TWEAK, &defaults()).unwrap();
        assert!(response.available);
    }

    #[test]
    fn caret_is_not_available() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let caret: SelectionArg = "2:11".parse().unwrap();
        let response = run_prepare(&snapshot, caret, TWEAK, &defaults()).unwrap();
        assert!(!response.available);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["available"], false);
    }

    #[test]
    fn unknown_tweak_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let err = run_prepare(&snapshot, bytes_of("5 + 4"), "Inline", &defaults()).unwrap_err();
        assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
    }
}

// ============================================================================
// apply
// ============================================================================

mod apply {
    use super::*;

    #[test]
    fn rewrites_and_summarizes() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let outcome = run_apply(&snapshot, bytes_of("5 + 4"), TWEAK, &defaults()).unwrap();
        assert_eq!(
            outcome.rewritten,
            "void f() {\n  auto placeholder = 5 + 4; int x = placeholder * 3;\n}\n"
        );

        let summary = &outcome.response.summary;
        assert_eq!(summary.variable_name, "placeholder");
        assert_eq!(summary.expression, "5 + 4");
        assert_eq!((summary.declaration.line, summary.declaration.col), (2, 3));
        assert_eq!((summary.replacement.line, summary.replacement.col), (2, 11));
        assert_eq!(outcome.response.patch.edits.len(), 2);
    }

    #[test]
    fn diff_shows_the_changed_line() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let outcome = run_apply(&snapshot, bytes_of("5 + 4"), TWEAK, &defaults()).unwrap();
        let diff = &outcome.response.patch.unified_diff;
        assert!(diff.contains("--- a/calc.cpp"));
        assert!(diff.contains("-  int x = 5 + 4 * 3;\n"));
        assert!(diff.contains("+  auto placeholder = 5 + 4; int x = placeholder * 3;\n"));
    }

    #[test]
    fn flags_choose_name_and_standard() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let config = config(CliOverrides {
            variable_name: Some("sum".to_string()),
            standard: Some(LanguageStandard::Cxx98),
        });
        let outcome = run_apply(&snapshot, bytes_of("5 + 4"), TWEAK, &config).unwrap();
        assert_eq!(
            outcome.rewritten,
            "void f() {\n  int sum = 5 + 4; int x = sum * 3;\n}\n"
        );
    }

    #[test]
    fn json_response_has_status_and_edits() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let outcome = run_apply(&snapshot, bytes_of("5 + 4"), TWEAK, &defaults()).unwrap();
        let json = serde_json::to_value(&outcome.response).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tweak"], TWEAK);
        assert_eq!(json["summary"]["expression"], "5 + 4");
        assert_eq!(json["patch"]["edits"][0]["file"], "calc.cpp");
    }
}

// ============================================================================
// errors
// ============================================================================

mod errors {
    use super::*;

    #[test]
    fn unavailable_apply_is_not_applicable() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let caret: SelectionArg = "2:11".parse().unwrap();
        let err = run_apply(&snapshot, caret, TWEAK, &defaults()).unwrap_err();
        assert!(matches!(err, HoistError::NotApplicable { .. }));
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn keyword_name_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let config = config(CliOverrides {
            variable_name: Some("while".to_string()),
            standard: None,
        });
        let err = run_apply(&snapshot, bytes_of("5 + 4"), TWEAK, &config).unwrap_err();
        assert!(matches!(err, HoistError::InvalidIdentifier { .. }));
        assert_eq!(err.error_code().code(), 2);
    }

    #[test]
    fn missing_snapshot_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        let err = run_prepare(&missing, bytes_of("5 + 4"), TWEAK, &defaults()).unwrap_err();
        assert!(matches!(err, HoistError::FileNotFound { .. }));
    }

    #[test]
    fn malformed_snapshot_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = run_prepare(&path, bytes_of("5 + 4"), TWEAK, &defaults()).unwrap_err();
        assert!(matches!(err, HoistError::InvalidSnapshot { .. }));
    }

    #[test]
    fn selection_past_end_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = write_snapshot(dir.path());

        let past_end = SelectionArg::Bytes(Span::new(0, 10_000));
        let err = run_prepare(&snapshot, past_end, TWEAK, &defaults()).unwrap_err();
        assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
    }
}
