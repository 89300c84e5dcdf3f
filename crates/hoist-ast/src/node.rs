// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Node kinds of the C-family AST.
//!
//! The shapes follow what a Clang-style frontend produces: expressions are
//! statements (an expression used as a statement sits directly in its block),
//! implicit conversions are explicit `ImplicitCast` nodes, and overloaded
//! operators are calls whose callee is the operator function.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Node Identity
// ============================================================================

/// Index of a node in its [`Ast`](crate::Ast) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Broad syntactic category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Decl,
    /// Statements that are not expressions.
    Stmt,
    Expr,
    Type,
    Attr,
}

// ============================================================================
// Operators
// ============================================================================

/// Built-in binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOpKind {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    /// Bitwise `&`.
    And,
    Xor,
    /// Bitwise `|`.
    Or,
    LAnd,
    LOr,
    Assign,
    MulAssign,
    DivAssign,
    RemAssign,
    AddAssign,
    SubAssign,
    ShlAssign,
    ShrAssign,
    AndAssign,
    XorAssign,
    OrAssign,
    Comma,
}

impl BinaryOpKind {
    pub fn spelling(self) -> &'static str {
        match self {
            BinaryOpKind::Mul => "*",
            BinaryOpKind::Div => "/",
            BinaryOpKind::Rem => "%",
            BinaryOpKind::Add => "+",
            BinaryOpKind::Sub => "-",
            BinaryOpKind::Shl => "<<",
            BinaryOpKind::Shr => ">>",
            BinaryOpKind::Lt => "<",
            BinaryOpKind::Gt => ">",
            BinaryOpKind::Le => "<=",
            BinaryOpKind::Ge => ">=",
            BinaryOpKind::Eq => "==",
            BinaryOpKind::Ne => "!=",
            BinaryOpKind::And => "&",
            BinaryOpKind::Xor => "^",
            BinaryOpKind::Or => "|",
            BinaryOpKind::LAnd => "&&",
            BinaryOpKind::LOr => "||",
            BinaryOpKind::Assign => "=",
            BinaryOpKind::MulAssign => "*=",
            BinaryOpKind::DivAssign => "/=",
            BinaryOpKind::RemAssign => "%=",
            BinaryOpKind::AddAssign => "+=",
            BinaryOpKind::SubAssign => "-=",
            BinaryOpKind::ShlAssign => "<<=",
            BinaryOpKind::ShrAssign => ">>=",
            BinaryOpKind::AndAssign => "&=",
            BinaryOpKind::XorAssign => "^=",
            BinaryOpKind::OrAssign => "|=",
            BinaryOpKind::Comma => ",",
        }
    }

    /// Plain or compound assignment.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            BinaryOpKind::Assign
                | BinaryOpKind::MulAssign
                | BinaryOpKind::DivAssign
                | BinaryOpKind::RemAssign
                | BinaryOpKind::AddAssign
                | BinaryOpKind::SubAssign
                | BinaryOpKind::ShlAssign
                | BinaryOpKind::ShrAssign
                | BinaryOpKind::AndAssign
                | BinaryOpKind::XorAssign
                | BinaryOpKind::OrAssign
        )
    }
}

/// Built-in unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOpKind {
    PostInc,
    PostDec,
    PreInc,
    PreDec,
    AddrOf,
    Deref,
    Plus,
    Minus,
    Not,
    LNot,
}

impl UnaryOpKind {
    pub fn spelling(self) -> &'static str {
        match self {
            UnaryOpKind::PostInc | UnaryOpKind::PreInc => "++",
            UnaryOpKind::PostDec | UnaryOpKind::PreDec => "--",
            UnaryOpKind::AddrOf => "&",
            UnaryOpKind::Deref => "*",
            UnaryOpKind::Plus => "+",
            UnaryOpKind::Minus => "-",
            UnaryOpKind::Not => "~",
            UnaryOpKind::LNot => "!",
        }
    }
}

/// The operator an overloaded operator call invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "form", content = "op", rename_all = "snake_case")]
pub enum OverloadedOperator {
    Binary(BinaryOpKind),
    Unary(UnaryOpKind),
    /// `operator()`
    Call,
    /// `operator[]`
    Subscript,
    /// `operator->`
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    Integer,
    Floating,
    Char,
    String,
    Bool,
    Nullptr,
}

/// One entry of a closure's capture list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "capture", rename_all = "snake_case")]
pub enum LambdaCapture {
    /// `this` or `*this`.
    This,
    /// A variable captured by copy.
    ByCopy { var: NodeId },
    /// A variable captured by reference.
    ByRef { var: NodeId },
    /// `[name = init]`: `var` is the init-capture declaration (a child).
    Init { var: NodeId },
}

/// How an Objective-C property reference is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyMessaging {
    Getter,
    Setter,
}

// ============================================================================
// Node Kinds
// ============================================================================

/// The syntactic content of a node.
///
/// Fields holding [`NodeId`]s are either *children* (owned subtrees, listed by
/// [`children`](crate::walk::children)) or *references* to declarations
/// elsewhere in the tree (listed by [`references`](crate::walk::references)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    // ---- Declarations ----
    TranslationUnit {
        #[serde(default)]
        decls: Vec<NodeId>,
    },
    Function {
        name: String,
        #[serde(default)]
        params: Vec<NodeId>,
        #[serde(default)]
        body: Option<NodeId>,
        #[serde(default)]
        attrs: Vec<NodeId>,
        /// The synthesized `operator()` of a closure type.
        #[serde(default)]
        lambda_call_operator: bool,
    },
    Record {
        name: String,
        #[serde(default)]
        members: Vec<NodeId>,
    },
    Field {
        name: String,
        #[serde(default)]
        init: Option<NodeId>,
    },
    /// Objective-C `@property`.
    Property { name: String },
    Var {
        name: String,
        #[serde(default)]
        init: Option<NodeId>,
        /// Declared by a closure init-capture.
        #[serde(default)]
        init_capture: bool,
    },
    Param {
        name: String,
        #[serde(default)]
        default_arg: Option<NodeId>,
    },
    TemplateParam {
        name: String,
        #[serde(default)]
        default_arg: Option<NodeId>,
    },

    // ---- Statements ----
    Compound {
        #[serde(default)]
        body: Vec<NodeId>,
    },
    DeclStmt {
        decls: Vec<NodeId>,
    },
    Return {
        #[serde(default)]
        value: Option<NodeId>,
    },
    If {
        #[serde(default)]
        init: Option<NodeId>,
        cond: NodeId,
        then: NodeId,
        #[serde(default, rename = "else")]
        else_: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    Do {
        body: NodeId,
        cond: NodeId,
    },
    For {
        #[serde(default)]
        init: Option<NodeId>,
        #[serde(default)]
        cond: Option<NodeId>,
        #[serde(default)]
        inc: Option<NodeId>,
        body: NodeId,
    },
    RangeFor {
        var: NodeId,
        range_init: NodeId,
        body: NodeId,
    },
    Switch {
        #[serde(default)]
        init: Option<NodeId>,
        cond: NodeId,
        body: NodeId,
    },
    Case {
        value: NodeId,
        #[serde(default)]
        body: Option<NodeId>,
    },
    Default {
        #[serde(default)]
        body: Option<NodeId>,
    },
    Label {
        name: String,
        body: NodeId,
    },
    Attributed {
        attrs: Vec<NodeId>,
        sub: NodeId,
    },
    Break,
    Continue,
    Null,

    // ---- Expressions ----
    Literal {
        lit: LiteralKind,
        spelling: String,
    },
    DeclRef {
        decl: NodeId,
        name: String,
    },
    Member {
        base: NodeId,
        member: String,
        #[serde(default)]
        arrow: bool,
    },
    This,
    Call {
        callee: NodeId,
        #[serde(default)]
        args: Vec<NodeId>,
    },
    Binary {
        op: BinaryOpKind,
        lhs: NodeId,
        rhs: NodeId,
    },
    OperatorCall {
        op: OverloadedOperator,
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Unary {
        op: UnaryOpKind,
        sub: NodeId,
    },
    Paren {
        sub: NodeId,
    },
    ImplicitCast {
        sub: NodeId,
    },
    Conditional {
        cond: NodeId,
        then: NodeId,
        #[serde(rename = "else")]
        else_: NodeId,
    },
    Lambda {
        #[serde(default)]
        captures: Vec<LambdaCapture>,
        #[serde(default)]
        template_params: Vec<NodeId>,
        #[serde(default)]
        params: Vec<NodeId>,
        #[serde(default)]
        attrs: Vec<NodeId>,
        #[serde(default)]
        trailing_return: Option<NodeId>,
        #[serde(default)]
        requires_clause: Option<NodeId>,
        body: NodeId,
        call_operator: NodeId,
    },
    /// Objective-C property access (`obj.prop`).
    PropertyRef {
        #[serde(default)]
        base: Option<NodeId>,
        messaging: PropertyMessaging,
        /// Declared `@property`, for explicit properties.
        #[serde(default)]
        property: Option<NodeId>,
        /// Getter method, for implicit properties.
        #[serde(default)]
        getter: Option<NodeId>,
    },

    // ---- Types and attributes ----
    Decltype {
        operand: NodeId,
    },
    Attr {
        name: String,
        #[serde(default)]
        args: Vec<NodeId>,
    },
}

impl NodeKind {
    pub fn class(&self) -> NodeClass {
        match self {
            NodeKind::TranslationUnit { .. }
            | NodeKind::Function { .. }
            | NodeKind::Record { .. }
            | NodeKind::Field { .. }
            | NodeKind::Property { .. }
            | NodeKind::Var { .. }
            | NodeKind::Param { .. }
            | NodeKind::TemplateParam { .. } => NodeClass::Decl,

            NodeKind::Compound { .. }
            | NodeKind::DeclStmt { .. }
            | NodeKind::Return { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::Do { .. }
            | NodeKind::For { .. }
            | NodeKind::RangeFor { .. }
            | NodeKind::Switch { .. }
            | NodeKind::Case { .. }
            | NodeKind::Default { .. }
            | NodeKind::Label { .. }
            | NodeKind::Attributed { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Null => NodeClass::Stmt,

            NodeKind::Literal { .. }
            | NodeKind::DeclRef { .. }
            | NodeKind::Member { .. }
            | NodeKind::This
            | NodeKind::Call { .. }
            | NodeKind::Binary { .. }
            | NodeKind::OperatorCall { .. }
            | NodeKind::Unary { .. }
            | NodeKind::Paren { .. }
            | NodeKind::ImplicitCast { .. }
            | NodeKind::Conditional { .. }
            | NodeKind::Lambda { .. }
            | NodeKind::PropertyRef { .. } => NodeClass::Expr,

            NodeKind::Decltype { .. } => NodeClass::Type,
            NodeKind::Attr { .. } => NodeClass::Attr,
        }
    }

    pub fn is_expr(&self) -> bool {
        self.class() == NodeClass::Expr
    }

    /// Statements in the Clang sense: expressions count.
    pub fn is_stmt(&self) -> bool {
        matches!(self.class(), NodeClass::Stmt | NodeClass::Expr)
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit { .. } => "TranslationUnit",
            NodeKind::Function { .. } => "Function",
            NodeKind::Record { .. } => "Record",
            NodeKind::Field { .. } => "Field",
            NodeKind::Property { .. } => "Property",
            NodeKind::Var { .. } => "Var",
            NodeKind::Param { .. } => "Param",
            NodeKind::TemplateParam { .. } => "TemplateParam",
            NodeKind::Compound { .. } => "Compound",
            NodeKind::DeclStmt { .. } => "DeclStmt",
            NodeKind::Return { .. } => "Return",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::Do { .. } => "Do",
            NodeKind::For { .. } => "For",
            NodeKind::RangeFor { .. } => "RangeFor",
            NodeKind::Switch { .. } => "Switch",
            NodeKind::Case { .. } => "Case",
            NodeKind::Default { .. } => "Default",
            NodeKind::Label { .. } => "Label",
            NodeKind::Attributed { .. } => "Attributed",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::Null => "Null",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::DeclRef { .. } => "DeclRef",
            NodeKind::Member { .. } => "Member",
            NodeKind::This => "This",
            NodeKind::Call { .. } => "Call",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::OperatorCall { .. } => "OperatorCall",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Paren { .. } => "Paren",
            NodeKind::ImplicitCast { .. } => "ImplicitCast",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::PropertyRef { .. } => "PropertyRef",
            NodeKind::Decltype { .. } => "Decltype",
            NodeKind::Attr { .. } => "Attr",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expressions_are_statements() {
        let lit = NodeKind::Literal {
            lit: LiteralKind::Integer,
            spelling: "1".to_string(),
        };
        assert!(lit.is_expr());
        assert!(lit.is_stmt());
        assert!(NodeKind::Break.is_stmt());
        assert!(!NodeKind::Break.is_expr());
        assert!(!NodeKind::Property { name: "p".into() }.is_stmt());
    }

    #[test]
    fn assignment_kinds() {
        assert!(BinaryOpKind::Assign.is_assignment());
        assert!(BinaryOpKind::ShlAssign.is_assignment());
        assert!(!BinaryOpKind::Eq.is_assignment());
        assert!(!BinaryOpKind::LAnd.is_assignment());
    }

    #[test]
    fn kind_tag_round_trips_through_json() {
        let json = r#"{"kind":"binary","op":"add","lhs":1,"rhs":2}"#;
        let kind: NodeKind = serde_json::from_str(json).unwrap();
        assert_eq!(
            kind,
            NodeKind::Binary {
                op: BinaryOpKind::Add,
                lhs: NodeId(1),
                rhs: NodeId(2)
            }
        );
        let op: OverloadedOperator =
            serde_json::from_str(r#"{"form":"binary","op":"mul"}"#).unwrap();
        assert_eq!(op, OverloadedOperator::Binary(BinaryOpKind::Mul));
    }
}
