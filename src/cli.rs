//! CLI front door.
//!
//! Provides the command-line helpers behind the `hoist` binary:
//! - `tweaks` - list registered tweaks
//! - `prepare` - report whether a tweak is available for a selection
//! - `apply` - compute the tweak's edits, diff, and rewritten buffer
//!
//! All functions return `Result<T, HoistError>` so the binary can turn any
//! failure into a JSON error response with a stable exit code.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info_span};

use hoist_ast::{load_snapshot, Ast, LangOptions};
use hoist_core::config::ResolvedConfig;
use hoist_core::error::HoistError;
use hoist_core::output::{ApplyResponse, ExtractSummary, PrepareResponse, TweakListResponse};
use hoist_core::patch::{EditKind, Span};
use hoist_core::types::{Location, SelectionArg};
use hoist_cxx::{rewritten_main_text, Tweak, TweakInputs, TweakRegistry};

/// Result of `apply`: the JSON response plus the rewritten main buffer.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub response: ApplyResponse,
    /// The main file as it reads after the edits.
    pub rewritten: String,
}

/// A loaded snapshot with the selection resolved against its main file.
struct Request {
    ast: Ast,
    selection: Span,
}

impl Request {
    fn load(snapshot: &Path, selection: SelectionArg) -> Result<Self, HoistError> {
        let ast = load_snapshot(snapshot)?;
        let selection = selection.resolve(ast.sources.main_text()).ok_or_else(|| {
            HoistError::invalid_args(format!(
                "selection is inverted or past the end of {}",
                main_path(&ast)
            ))
        })?;
        Ok(Request { ast, selection })
    }

    fn inputs(&self, config: &ResolvedConfig) -> TweakInputs<'_> {
        let mut inputs = TweakInputs::new(&self.ast, self.selection)
            .with_variable_name(config.variable_name.value.clone());
        if let Some(standard) = &config.standard {
            inputs = inputs.with_lang(LangOptions::new(standard.value));
        }
        inputs
    }

    fn location(&self, span: Span) -> Location {
        Location::of_span(
            main_path(&self.ast),
            self.ast.sources.main_text().as_bytes(),
            span,
        )
    }
}

fn main_path(ast: &Ast) -> &str {
    ast.sources.main_path().unwrap_or_default()
}

fn create_tweak(registry: &TweakRegistry, id: &str) -> Result<Box<dyn Tweak>, HoistError> {
    registry.create(id).ok_or_else(|| {
        HoistError::invalid_args_with_details(
            format!("unknown tweak '{}'", id),
            serde_json::json!({ "known": registry.ids() }),
        )
    })
}

/// List the tweaks registered with the builtin registry.
pub fn run_tweaks() -> TweakListResponse {
    TweakListResponse::new(TweakRegistry::with_builtins().infos())
}

/// Report whether `tweak_id` is available for `selection` in `snapshot`.
///
/// An unavailable tweak is a successful answer, not an error.
pub fn run_prepare(
    snapshot: &Path,
    selection: SelectionArg,
    tweak_id: &str,
    config: &ResolvedConfig,
) -> Result<PrepareResponse, HoistError> {
    let _span = info_span!("prepare", snapshot = %snapshot.display()).entered();
    let request = Request::load(snapshot, selection)?;
    let mut tweak = create_tweak(&TweakRegistry::with_builtins(), tweak_id)?;

    let inputs = request.inputs(config);
    let available = tweak.prepare(&inputs);
    debug!(tweak = tweak_id, available, selection = %request.selection, "prepared");

    Ok(PrepareResponse::new(
        tweak.id(),
        available,
        request.location(request.selection),
    ))
}

/// Prepare and apply `tweak_id` for `selection` in `snapshot`.
///
/// Fails with `NotApplicable` when the tweak is unavailable.
pub fn run_apply(
    snapshot: &Path,
    selection: SelectionArg,
    tweak_id: &str,
    config: &ResolvedConfig,
) -> Result<ApplyOutcome, HoistError> {
    let _span = info_span!("apply", snapshot = %snapshot.display()).entered();
    let request = Request::load(snapshot, selection)?;
    let mut tweak = create_tweak(&TweakRegistry::with_builtins(), tweak_id)?;

    let inputs = request.inputs(config);
    if !tweak.prepare(&inputs) {
        return Err(HoistError::not_applicable(
            tweak.id(),
            request.location(request.selection).to_string(),
        ));
    }
    let effect = tweak.apply(&inputs)?;
    let rewritten = rewritten_main_text(&request.ast, &effect)?;

    let text = request.ast.sources.main_text();
    let mut contents = HashMap::new();
    if let Some(main) = request.ast.sources.main_file() {
        contents.insert(main, text.as_bytes().to_vec());
    }
    let patch = effect.materialize(&contents);

    let span_of = |kind: EditKind| {
        effect
            .edits
            .iter()
            .find(|edit| edit.kind == kind)
            .map(|edit| edit.span())
            .ok_or_else(|| HoistError::internal(format!("{} produced no {:?} edit", tweak_id, kind)))
    };
    let declaration = span_of(EditKind::Insert)?;
    let replacement = span_of(EditKind::Replace)?;
    let summary = ExtractSummary {
        variable_name: inputs.variable_name.clone(),
        expression: text
            .get(replacement.as_range())
            .unwrap_or_default()
            .to_string(),
        declaration: request.location(declaration),
        replacement: request.location(replacement),
    };

    Ok(ApplyOutcome {
        response: ApplyResponse::new(tweak.id(), patch, summary),
        rewritten,
    })
}
