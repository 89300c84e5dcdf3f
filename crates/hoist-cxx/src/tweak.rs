// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tweaks: selection-driven code actions.
//!
//! A tweak is asked twice about a selection. [`Tweak::prepare`] is cheap and
//! decides whether the action is offered at all; [`Tweak::apply`] produces the
//! edits. A tweak may keep state computed in `prepare` for use in `apply`, so
//! both must be called with the same [`TweakInputs`].
//!
//! Tweaks are made available through a [`TweakRegistry`], populated at startup
//! by [`register_builtin_tweaks`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use hoist_ast::{Ast, LangOptions, SelectionTree};
use hoist_core::config::DEFAULT_VARIABLE_NAME;
use hoist_core::error::HoistError;
use hoist_core::output::TweakInfo;
use hoist_core::patch::{PatchSet, Span};

use crate::ops::extract_variable::{ExtractVariable, ExtractVariableError};

/// Category of a code action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TweakKind {
    Refactor,
    Info,
}

impl TweakKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TweakKind::Refactor => "refactor",
            TweakKind::Info => "info",
        }
    }
}

impl fmt::Display for TweakKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The edits a tweak produces: one patch set over the main file.
pub type Effect = PatchSet;

/// Everything a tweak sees of one request.
#[derive(Debug, Clone)]
pub struct TweakInputs<'a> {
    pub tree: SelectionTree<'a>,
    /// Language options in effect; may differ from the snapshot's when
    /// overridden by configuration.
    pub lang: LangOptions,
    /// Name for variables introduced by the tweak.
    pub variable_name: String,
}

impl<'a> TweakInputs<'a> {
    /// Inputs for `selection` over `ast`, with the AST's language options and
    /// the default variable name.
    pub fn new(ast: &'a Ast, selection: Span) -> Self {
        TweakInputs {
            tree: SelectionTree::new(ast, selection),
            lang: ast.lang,
            variable_name: DEFAULT_VARIABLE_NAME.to_string(),
        }
    }

    pub fn with_lang(mut self, lang: LangOptions) -> Self {
        self.lang = lang;
        self
    }

    pub fn with_variable_name(mut self, name: impl Into<String>) -> Self {
        self.variable_name = name.into();
        self
    }

    pub fn ast(&self) -> &'a Ast {
        self.tree.ast()
    }

    pub fn selection(&self) -> Span {
        self.tree.selection()
    }
}

/// Errors from [`Tweak::apply`].
#[derive(Debug, Error)]
pub enum TweakError {
    #[error(transparent)]
    ExtractVariable(#[from] ExtractVariableError),
}

impl From<TweakError> for HoistError {
    fn from(err: TweakError) -> Self {
        match err {
            TweakError::ExtractVariable(e) => e.into(),
        }
    }
}

/// A selection-driven code action.
pub trait Tweak {
    /// Stable identifier.
    fn id(&self) -> &'static str;

    /// Human-readable title shown to the user.
    fn title(&self) -> String;

    fn kind(&self) -> TweakKind;

    /// Whether the tweak is available for the selection. Must not have
    /// side effects beyond caching state for `apply`.
    fn prepare(&mut self, inputs: &TweakInputs<'_>) -> bool;

    /// Compute the edits. Only meaningful after `prepare` returned true for
    /// the same inputs.
    fn apply(&mut self, inputs: &TweakInputs<'_>) -> Result<Effect, TweakError>;

    fn info(&self) -> TweakInfo {
        TweakInfo {
            id: self.id().to_string(),
            title: self.title(),
            kind: self.kind().to_string(),
        }
    }
}

type TweakFactory = fn() -> Box<dyn Tweak>;

/// All tweaks known to the host.
#[derive(Default)]
pub struct TweakRegistry {
    factories: Vec<TweakFactory>,
}

impl fmt::Debug for TweakRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweakRegistry")
            .field("tweaks", &self.ids())
            .finish()
    }
}

impl TweakRegistry {
    pub fn new() -> Self {
        TweakRegistry::default()
    }

    /// Registry with every built-in tweak.
    pub fn with_builtins() -> Self {
        let mut registry = TweakRegistry::new();
        register_builtin_tweaks(&mut registry);
        registry
    }

    pub fn register(&mut self, factory: TweakFactory) {
        self.factories.push(factory);
    }

    /// Fresh instances of every registered tweak.
    pub fn all(&self) -> Vec<Box<dyn Tweak>> {
        self.factories.iter().map(|factory| factory()).collect()
    }

    /// Fresh instance of the tweak with `id`.
    pub fn create(&self, id: &str) -> Option<Box<dyn Tweak>> {
        self.all().into_iter().find(|tweak| tweak.id() == id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.all().iter().map(|tweak| tweak.id()).collect()
    }

    pub fn infos(&self) -> Vec<TweakInfo> {
        self.all().iter().map(|tweak| tweak.info()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Register the tweaks shipped with hoist.
pub fn register_builtin_tweaks(registry: &mut TweakRegistry) {
    registry.register(new_extract_variable);
}

fn new_extract_variable() -> Box<dyn Tweak> {
    Box::new(ExtractVariable::new())
}
