// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Extract subexpression to variable.
//!
//! ```text
//! int x = [[5 + 4]] * 3;
//! ```
//! becomes
//! ```text
//! auto placeholder = 5 + 4; int x = placeholder * 3;
//! ```
//!
//! The operation runs in two phases, as every tweak does:
//!
//! 1. `prepare`: pick the expression from the selection's common ancestor
//!    (retargeting a callee to its call), filter it for eligibility, find the
//!    statement to insert before, and infer the variable's type
//! 2. `apply`: build two edits in one patch set:
//!    - insert `<type> <name> = <expression>; ` before the insertion point
//!    - replace the expression with the name
//!
//! An expression statement (`[[f(1, 2)]];`) is moved into the declaration
//! entirely, leaving no dangling name behind.

use thiserror::Error;
use tracing::{debug, debug_span};

use hoist_ast::node::PropertyMessaging;
use hoist_ast::{
    Ast, DefaultTypePrinter, LangOptions, NodeId, NodeKind, QualType, SelectionNodeId,
    SelectionTree, TypePrinter,
};
use hoist_core::error::HoistError;
use hoist_core::patch::{Anchor, Conflict, Edit, EditLabels, PatchSet, Span};

use crate::layers::{
    binary_operator_range, collect_referenced_decls, compute_insertion_point,
    eligible_for_extraction,
};
use crate::tweak::{Effect, Tweak, TweakError, TweakInputs, TweakKind};
use crate::validation::{validate_identifier, ValidationError};

/// Tweak identifier.
pub const EXTRACT_VARIABLE_ID: &str = "ExtractVariable";

const DECLARATION_EDIT_ID: u32 = 1;
const REPLACEMENT_EDIT_ID: u32 = 2;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while applying the extraction.
#[derive(Debug, Error)]
pub enum ExtractVariableError {
    /// `apply` was called without a successful `prepare`.
    #[error("extract variable was not prepared for this selection")]
    NotPrepared,

    /// The expression or insertion point has no range in the main file.
    #[error("{what} cannot be mapped to the main file")]
    NoFileRange { what: &'static str },

    /// The edits could not be combined into one patch set.
    #[error("conflicting edits: {0}")]
    EditConflict(#[from] Conflict),

    /// Invalid variable name.
    #[error("invalid variable name: {0}")]
    InvalidName(#[from] ValidationError),
}

impl From<ExtractVariableError> for HoistError {
    fn from(err: ExtractVariableError) -> Self {
        match err {
            ExtractVariableError::NotPrepared => HoistError::not_applicable(
                EXTRACT_VARIABLE_ID,
                "(tweak was not prepared)",
            ),
            ExtractVariableError::NoFileRange { what } => {
                HoistError::internal(format!("{} cannot be mapped to the main file", what))
            }
            ExtractVariableError::EditConflict(conflict) => conflict.into(),
            ExtractVariableError::InvalidName(e) => e.into(),
        }
    }
}

/// Result type for extract-variable operations.
pub type ExtractVariableResult<T> = Result<T, ExtractVariableError>;

// ============================================================================
// Extraction Context
// ============================================================================

/// What is known about one extraction candidate.
///
/// The context stores ids into the selection tree it was computed from and
/// is only used with a tree built from the same AST and selection; see
/// [`ExtractionContext::built_from`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionContext {
    selection: Span,
    tree_len: usize,
    ast_len: usize,
    expr_node: SelectionNodeId,
    expr: NodeId,
    referenced_decls: Vec<NodeId>,
    insertion_point: Option<NodeId>,
    variable_type: Option<QualType>,
}

impl ExtractionContext {
    pub fn new(tree: &SelectionTree<'_>, node: SelectionNodeId, lang: LangOptions) -> Self {
        let ast = tree.ast();
        let expr = tree.ast_node(node);
        let referenced_decls = collect_referenced_decls(ast, expr);
        let insertion_point = compute_insertion_point(tree, node, &referenced_decls);
        let variable_type = compute_variable_type(ast, expr, lang);
        ExtractionContext {
            selection: tree.selection(),
            tree_len: tree.len(),
            ast_len: ast.len(),
            expr_node: node,
            expr,
            referenced_decls,
            insertion_point,
            variable_type,
        }
    }

    /// An insertion point was found and the type is known.
    pub fn is_extractable(&self) -> bool {
        self.insertion_point.is_some() && self.variable_type.is_some()
    }

    /// Whether `tree` is the tree this context was computed from: same
    /// selection over an AST of the same shape.
    pub fn built_from(&self, tree: &SelectionTree<'_>) -> bool {
        tree.selection() == self.selection
            && tree.len() == self.tree_len
            && tree.ast().len() == self.ast_len
            && tree.ast_node(self.expr_node) == self.expr
    }

    pub fn expr(&self) -> NodeId {
        self.expr
    }

    pub fn expr_node(&self) -> SelectionNodeId {
        self.expr_node
    }

    pub fn referenced_decls(&self) -> &[NodeId] {
        &self.referenced_decls
    }

    pub fn insertion_point(&self) -> Option<NodeId> {
        self.insertion_point
    }

    pub fn variable_type(&self) -> Option<&QualType> {
        self.variable_type.as_ref()
    }

    /// The main-file characters to extract: the part of an associative chain
    /// the user selected, else the whole expression.
    pub fn extraction_chars(&self, tree: &SelectionTree<'_>) -> Option<Span> {
        binary_operator_range(tree, self.expr_node).or_else(|| tree.ast().file_range(self.expr))
    }

    /// Replace `range` with `name`.
    pub fn replace_with_var(&self, ast: &Ast, range: Span, name: &str) -> ExtractVariableResult<Edit> {
        let main = main_file(ast)?;
        let anchor = Anchor::span_exact(range, ast.sources.main_text().as_bytes());
        Ok(Edit::replace(REPLACEMENT_EDIT_ID, main, anchor, name).with_labels(labels("use variable")))
    }

    /// Declare `name` initialized with the text of `range`, right before the
    /// insertion point.
    pub fn insert_declaration(
        &self,
        ast: &Ast,
        printer: &dyn TypePrinter,
        name: &str,
        range: Span,
        add_semicolon: bool,
    ) -> ExtractVariableResult<Edit> {
        let main = main_file(ast)?;
        let at = self
            .insertion_point
            .and_then(|point| ast.file_range(point))
            .ok_or(ExtractVariableError::NoFileRange {
                what: "insertion point",
            })?
            .start;
        let ty = self.variable_type.as_ref().ok_or(ExtractVariableError::NotPrepared)?;
        let code = ast.sources.text_of(range).ok_or(ExtractVariableError::NoFileRange {
            what: "extracted expression",
        })?;

        let mut text = format!("{} = {}", printer.print(ty, name), code);
        if add_semicolon {
            text.push_str("; ");
        }
        let anchor = Anchor::span_exact(Span::empty_at(at), ast.sources.main_text().as_bytes());
        Ok(Edit::insert(DECLARATION_EDIT_ID, main, anchor, text).with_labels(labels("declare variable")))
    }
}

fn main_file(ast: &Ast) -> ExtractVariableResult<hoist_core::patch::FileId> {
    ast.sources
        .main_file()
        .ok_or(ExtractVariableError::NoFileRange { what: "snapshot" })
}

fn labels(reason: &str) -> EditLabels {
    EditLabels {
        tweak_id: Some(EXTRACT_VARIABLE_ID.to_string()),
        reason: Some(reason.to_string()),
    }
}

/// Type of the new variable, or `None` when it cannot be spelled.
pub fn compute_variable_type(ast: &Ast, expr: NodeId, lang: LangOptions) -> Option<QualType> {
    if lang.cplusplus11() {
        return Some(QualType::auto_deduct());
    }

    let node = ast.node(expr);
    let mut ty = node.ty.clone()?;
    if ty.is_pseudo_object() {
        // Objective-C property access: the type of what the getter returns.
        ty = match &node.kind {
            NodeKind::PropertyRef {
                messaging: PropertyMessaging::Getter,
                property,
                getter,
                ..
            } => match (property, getter) {
                (Some(property), _) => ast.node(*property).ty.clone()?,
                (None, Some(getter)) => ast.node(*getter).ty.clone()?,
                (None, None) => return None,
            },
            _ => return None,
        };
    }
    ty.strip_outer_nullability();
    Some(ty)
}

// ============================================================================
// Target Selection
// ============================================================================

/// The call whose callee is the expression at `node`, if any.
pub fn get_call_expr(tree: &SelectionTree<'_>, node: SelectionNodeId) -> Option<SelectionNodeId> {
    let callee = tree.outer_implicit(node);
    let call = tree.parent(callee)?;
    let ast = tree.ast();
    let call_callee = match ast.kind(tree.ast_node(call)) {
        NodeKind::Call { callee, .. } | NodeKind::OperatorCall { callee, .. } => *callee,
        _ => return None,
    };
    (call_callee == tree.ast_node(callee)).then_some(call)
}

/// The node to extract for a selection whose common ancestor is `node`.
pub fn compute_extracted_expr(
    tree: &SelectionTree<'_>,
    node: SelectionNodeId,
) -> Option<SelectionNodeId> {
    let ast = tree.ast();
    let selected = ast.kind(tree.ast_node(node));
    if !selected.is_expr() {
        return None;
    }

    // Selecting a function name means the call.
    let mut target = node;
    if matches!(selected, NodeKind::DeclRef { .. } | NodeKind::Member { .. }) {
        if let Some(call) = get_call_expr(tree, node) {
            target = call;
        }
    }

    if let NodeKind::Binary {
        op: hoist_ast::node::BinaryOpKind::Assign,
        ..
    } = selected
    {
        return None;
    }

    eligible_for_extraction(tree, target).then_some(target)
}

// ============================================================================
// Tweak
// ============================================================================

/// The "Extract subexpression to variable" tweak.
#[derive(Debug, Default)]
pub struct ExtractVariable {
    target: Option<ExtractionContext>,
    printer: DefaultTypePrinter,
}

impl ExtractVariable {
    pub fn new() -> Self {
        ExtractVariable::default()
    }

    /// The context computed by the last successful `prepare`.
    pub fn target(&self) -> Option<&ExtractionContext> {
        self.target.as_ref()
    }
}

impl Tweak for ExtractVariable {
    fn id(&self) -> &'static str {
        EXTRACT_VARIABLE_ID
    }

    fn title(&self) -> String {
        "Extract subexpression to variable".to_string()
    }

    fn kind(&self) -> TweakKind {
        TweakKind::Refactor
    }

    fn prepare(&mut self, inputs: &TweakInputs<'_>) -> bool {
        let _span = debug_span!("prepare", tweak = EXTRACT_VARIABLE_ID).entered();
        self.target = None;

        let tree = &inputs.tree;
        if tree.selection().is_empty() {
            debug!("empty selection");
            return false;
        }
        let Some(ancestor) = tree.common_ancestor() else {
            debug!("selection has no common ancestor");
            return false;
        };
        let Some(node) = compute_extracted_expr(tree, ancestor) else {
            return false;
        };

        let ctx = ExtractionContext::new(tree, node, inputs.lang);
        if !ctx.is_extractable() {
            debug!(
                insertion_point = ?ctx.insertion_point(),
                has_type = ctx.variable_type().is_some(),
                "candidate is not extractable"
            );
            return false;
        }
        self.target = Some(ctx);
        true
    }

    fn apply(&mut self, inputs: &TweakInputs<'_>) -> Result<Effect, TweakError> {
        let _span = debug_span!("apply", tweak = EXTRACT_VARIABLE_ID).entered();
        let tree = &inputs.tree;
        let ctx = self
            .target
            .as_ref()
            .filter(|ctx| ctx.built_from(tree))
            .ok_or(ExtractVariableError::NotPrepared)?;
        let name = inputs.variable_name.as_str();
        validate_identifier(name).map_err(ExtractVariableError::from)?;

        let ast = tree.ast();
        let range = ctx.extraction_chars(tree).ok_or(ExtractVariableError::NoFileRange {
            what: "extracted expression",
        })?;

        // `[[f(1, 2)]];` moves the whole statement into the declaration.
        let outer = tree.outer_implicit(ctx.expr_node());
        let is_expr_stmt = tree
            .parent(outer)
            .is_some_and(|parent| matches!(ast.kind(tree.ast_node(parent)), NodeKind::Compound { .. }))
            && ast.file_range(tree.ast_node(outer)) == Some(range);

        let declaration = ctx.insert_declaration(ast, &self.printer, name, range, !is_expr_stmt)?;
        let replacement = ctx.replace_with_var(ast, range, if is_expr_stmt { "" } else { name })?;

        let main = main_file(ast)?;
        let mut effect = PatchSet::new();
        if let Some(path) = ast.sources.main_path() {
            effect = effect.with_file_path(main, path);
        }
        effect
            .try_add(declaration)
            .map_err(ExtractVariableError::from)?;
        effect
            .try_add(replacement)
            .map_err(ExtractVariableError::from)?;
        debug!(%range, expr_stmt = is_expr_stmt, "built extraction edits");
        Ok(effect)
    }
}
