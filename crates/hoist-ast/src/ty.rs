// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Static types attached to expressions and declarations, and how they are
//! rendered back into declarations.

use serde::{Deserialize, Serialize};

/// Coarse classification of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Void,
    Builtin,
    Pointer,
    Reference,
    Record,
    Function,
    /// Deduced `auto`.
    Auto,
    /// Placeholder type of an Objective-C property reference before the
    /// accessor is chosen.
    PseudoObject,
    Other,
}

/// Objective-C / Clang nullability qualifier on the outermost pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nullability {
    Nonnull,
    Nullable,
    Unspecified,
}

impl Nullability {
    pub fn keyword(self) -> &'static str {
        match self {
            Nullability::Nonnull => "_Nonnull",
            Nullability::Nullable => "_Nullable",
            Nullability::Unspecified => "_Null_unspecified",
        }
    }
}

/// A type as written by the frontend.
///
/// `spelling` excludes the outer nullability qualifier, which is kept apart so
/// it can be dropped when declaring a local.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualType {
    pub spelling: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullability: Option<Nullability>,
}

impl QualType {
    pub fn new(spelling: impl Into<String>, kind: TypeKind) -> Self {
        QualType {
            spelling: spelling.into(),
            kind,
            nullability: None,
        }
    }

    pub fn void() -> Self {
        QualType::new("void", TypeKind::Void)
    }

    pub fn builtin(spelling: impl Into<String>) -> Self {
        QualType::new(spelling, TypeKind::Builtin)
    }

    pub fn int() -> Self {
        QualType::builtin("int")
    }

    pub fn pointer(spelling: impl Into<String>) -> Self {
        QualType::new(spelling, TypeKind::Pointer)
    }

    pub fn record(spelling: impl Into<String>) -> Self {
        QualType::new(spelling, TypeKind::Record)
    }

    pub fn function(spelling: impl Into<String>) -> Self {
        QualType::new(spelling, TypeKind::Function)
    }

    pub fn pseudo_object() -> Self {
        QualType::new("<pseudo-object>", TypeKind::PseudoObject)
    }

    /// The type a local declared with `auto` gets.
    pub fn auto_deduct() -> Self {
        QualType::new("auto", TypeKind::Auto)
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = Some(nullability);
        self
    }

    pub fn is_void(&self) -> bool {
        self.kind == TypeKind::Void
    }

    pub fn is_pseudo_object(&self) -> bool {
        self.kind == TypeKind::PseudoObject
    }

    /// Drop the outermost nullability qualifier, if any.
    pub fn strip_outer_nullability(&mut self) -> Option<Nullability> {
        self.nullability.take()
    }
}

// ============================================================================
// Type Printing
// ============================================================================

/// Renders a type together with a declarator name, as in `int *p`.
pub trait TypePrinter {
    fn print(&self, ty: &QualType, name: &str) -> String;
}

/// Declarator printing for the type forms found in extracted expressions.
///
/// Pointer and reference spellings bind to the name (`int *p`, `S &r`);
/// everything else is separated by a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTypePrinter;

impl TypePrinter for DefaultTypePrinter {
    fn print(&self, ty: &QualType, name: &str) -> String {
        let mut out = ty.spelling.clone();
        if let Some(nullability) = ty.nullability {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            out.push_str(nullability.keyword());
        }
        if name.is_empty() {
            return out;
        }
        if !(out.ends_with('*') || out.ends_with('&')) {
            out.push(' ');
        }
        out.push_str(name);
        out
    }
}
