// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! End-to-end tests of the extract-variable tweak over built ASTs.

use hoist_ast::builder::{AstBuilder, LambdaParts};
use hoist_ast::node::{BinaryOpKind, LambdaCapture};
use hoist_ast::snapshot::to_json;
use hoist_ast::{load_snapshot, Ast, LangOptions, NodeId, QualType};
use hoist_core::config::LanguageStandard;
use hoist_core::patch::Span;
use hoist_cxx::{
    rewritten_main_text, ExtractVariable, ExtractVariableError, Tweak, TweakError, TweakInputs,
    TweakRegistry,
};

// ============================================================================
// Helpers
// ============================================================================

/// Wrap `stmts` in `f`'s body: the block runs from the first `{` to the last
/// `}` of the text, the function spans all of it.
fn function_body(b: &mut AstBuilder, params: Vec<NodeId>, stmts: Vec<NodeId>) -> Vec<NodeId> {
    let text = b.text().to_string();
    let open = text.find('{').unwrap() as u64;
    let close = text.rfind('}').unwrap() as u64 + 1;
    let body = b.compound(stmts, Span::new(open, close));
    let f = b.function("f", Span::new(0, text.len() as u64), params, Some(body));
    vec![f]
}

fn select(ast: &Ast, needle: &str) -> Span {
    let start = ast.sources.main_text().find(needle).unwrap() as u64;
    Span::new(start, start + needle.len() as u64)
}

/// Prepare and apply; `None` when the tweak is not offered.
fn extract(inputs: &TweakInputs<'_>) -> Option<String> {
    let mut tweak = ExtractVariable::new();
    if !tweak.prepare(inputs) {
        return None;
    }
    let effect = tweak.apply(inputs).unwrap();
    Some(rewritten_main_text(inputs.ast(), &effect).unwrap())
}

fn extract_at(ast: &Ast, needle: &str) -> Option<String> {
    extract(&TweakInputs::new(ast, select(ast, needle)))
}

/// `int x = 5 + 4 * 3;` parsed as `(5 + 4) * 3`.
fn product_of_sum() -> Ast {
    let mut b = AstBuilder::new("void f() { int x = 5 + 4 * 3; }");
    let five = b.int_literal(b.span_of("5"));
    let four = b.int_literal(b.span_of("4"));
    let three = b.int_literal(b.span_of("3"));
    let sum = b.binary(BinaryOpKind::Add, five, four, QualType::int());
    let product = b.binary(BinaryOpKind::Mul, sum, three, QualType::int());
    let x = b.var("x", b.span_of("int x = 5 + 4 * 3"), Some(product), QualType::int());
    let stmt = b.decl_stmt(vec![x], b.span_of("int x = 5 + 4 * 3;"));
    let decls = function_body(&mut b, vec![], vec![stmt]);
    b.finish(decls)
}

// ============================================================================
// Basic extraction
// ============================================================================

mod basic {
    use super::*;

    #[test]
    fn extracts_left_operand_of_product() {
        let ast = product_of_sum();
        assert_eq!(
            extract_at(&ast, "5 + 4").as_deref(),
            Some("void f() { auto placeholder = 5 + 4; int x = placeholder * 3; }")
        );
    }

    #[test]
    fn pre_cxx11_spells_the_type() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4"))
            .with_lang(LangOptions::new(LanguageStandard::Cxx98));
        assert_eq!(
            extract(&inputs).as_deref(),
            Some("void f() { int placeholder = 5 + 4; int x = placeholder * 3; }")
        );
    }

    #[test]
    fn configured_name_is_used() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4")).with_variable_name("total");
        assert_eq!(
            extract(&inputs).as_deref(),
            Some("void f() { auto total = 5 + 4; int x = total * 3; }")
        );
    }

    #[test]
    fn expression_statement_becomes_declaration() {
        let mut b = AstBuilder::new("void f() { h(1, 2); }");
        let h = b.declared_function("h", QualType::int());
        let callee = b.decl_ref(h, b.span_of("h"));
        let one = b.int_literal(b.span_of("1"));
        let two = b.int_literal(b.span_of("2"));
        let call = b.call(callee, vec![one, two], b.span_of("h(1, 2)"), QualType::int());
        let decls = function_body(&mut b, vec![], vec![call]);
        let ast = b.finish(decls);

        assert_eq!(
            extract_at(&ast, "h(1, 2)").as_deref(),
            Some("void f() { auto placeholder = h(1, 2); }")
        );
    }

    #[test]
    fn member_through_implicit_this_needs_more_than_the_name() {
        let mut b = AstBuilder::new("int f() { return m + 1; }");
        let at = b.span_of("m");
        let this = b.implicit_this(at.start, QualType::pointer("S *"));
        let member = b.member(this, "m", true, at, QualType::int());
        let member = b.implicit_cast(member, QualType::int());
        let one = b.int_literal(b.span_of("1"));
        let sum = b.binary(BinaryOpKind::Add, member, one, QualType::int());
        let ret = b.return_stmt(Some(sum), b.span_of("return m + 1;"));
        let decls = function_body(&mut b, vec![], vec![ret]);
        let ast = b.finish(decls);

        assert_eq!(extract_at(&ast, "m"), None);
        assert_eq!(
            extract_at(&ast, "m + 1").as_deref(),
            Some("int f() { auto placeholder = m + 1; return placeholder; }")
        );
    }

    #[test]
    fn member_through_explicit_this_is_extracted() {
        let mut b = AstBuilder::new("int f() { return this->m + 1; }");
        let this = b.this_expr(b.span_of("this"), QualType::pointer("S *"));
        let member = b.member(this, "m", true, b.span_of("this->m"), QualType::int());
        let member = b.implicit_cast(member, QualType::int());
        let one = b.int_literal(b.span_of("1"));
        let sum = b.binary(BinaryOpKind::Add, member, one, QualType::int());
        let ret = b.return_stmt(Some(sum), b.span_of("return this->m + 1;"));
        let decls = function_body(&mut b, vec![], vec![ret]);
        let ast = b.finish(decls);

        assert_eq!(
            extract_at(&ast, "this->m").as_deref(),
            Some("int f() { auto placeholder = this->m; return placeholder + 1; }")
        );
    }
}

// ============================================================================
// Not applicable
// ============================================================================

mod unavailable {
    use super::*;

    #[test]
    fn bare_variable_name() {
        let mut b = AstBuilder::new("void f(int a) { int y = a * 2; }");
        let a = b.param("a", b.span_of("int a"), None, QualType::int());
        let a_ref = b.decl_ref(a, b.span_nth("a", 1));
        let a_ref = b.implicit_cast(a_ref, QualType::int());
        let two = b.int_literal(b.span_of("2"));
        let product = b.binary(BinaryOpKind::Mul, a_ref, two, QualType::int());
        let y = b.var("y", b.span_of("int y = a * 2"), Some(product), QualType::int());
        let stmt = b.decl_stmt(vec![y], b.span_of("int y = a * 2;"));
        let decls = function_body(&mut b, vec![a], vec![stmt]);
        let ast = b.finish(decls);

        let at = select(&ast, "a * 2").start;
        let inputs = TweakInputs::new(&ast, Span::new(at, at + 1));
        let mut tweak = ExtractVariable::new();
        assert!(!tweak.prepare(&inputs));
        assert!(matches!(
            tweak.apply(&inputs),
            Err(TweakError::ExtractVariable(ExtractVariableError::NotPrepared))
        ));
    }

    #[test]
    fn whole_right_hand_side_of_assignment() {
        let mut b = AstBuilder::new("void f() { x = compute(); }");
        let x = b.declared_var("x", QualType::int());
        let compute = b.declared_function("compute", QualType::int());
        let lhs = b.decl_ref(x, b.span_of("x"));
        let callee = b.decl_ref(compute, b.span_of("compute"));
        let call = b.call(callee, vec![], b.span_of("compute()"), QualType::int());
        let assign = b.binary(BinaryOpKind::Assign, lhs, call, QualType::int());
        let decls = function_body(&mut b, vec![], vec![assign]);
        let ast = b.finish(decls);

        assert_eq!(extract_at(&ast, "compute()"), None);
        // Selecting the callee name retargets to the same call.
        assert_eq!(extract_at(&ast, "compute"), None);
    }

    #[test]
    fn void_call() {
        let mut b = AstBuilder::new("void f() { g(); }");
        let g = b.declared_function("g", QualType::void());
        let callee = b.decl_ref(g, b.span_of("g"));
        let call = b.call(callee, vec![], b.span_of("g()"), QualType::void());
        let decls = function_body(&mut b, vec![], vec![call]);
        let ast = b.finish(decls);

        assert_eq!(extract_at(&ast, "g()"), None);
    }

    #[test]
    fn empty_selection() {
        let ast = product_of_sum();
        let at = select(&ast, "5").start;
        let inputs = TweakInputs::new(&ast, Span::empty_at(at));
        assert!(!ExtractVariable::new().prepare(&inputs));
    }
}

// ============================================================================
// Associative chains
// ============================================================================

mod chains {
    use super::*;

    fn sum_of_four() -> Ast {
        let mut b = AstBuilder::new("void f(int a, int b, int c, int d) { int r = a + b + c + d; }");
        let mut params = Vec::new();
        for name in ["a", "b", "c", "d"] {
            let span = b.span_of(&format!("int {}", name));
            params.push(b.param(name, span, None, QualType::int()));
        }
        let base = b.text().find("a + b + c + d").unwrap() as u64;
        let mut operands = Vec::new();
        for (i, param) in params.iter().enumerate() {
            let at = base + 4 * i as u64;
            let r = b.decl_ref(*param, Span::new(at, at + 1));
            operands.push(b.implicit_cast(r, QualType::int()));
        }
        let mut chain = operands[0];
        for rhs in &operands[1..] {
            chain = b.binary(BinaryOpKind::Add, chain, *rhs, QualType::int());
        }
        let r = b.var("r", b.span_of("int r = a + b + c + d"), Some(chain), QualType::int());
        let stmt = b.decl_stmt(vec![r], b.span_of("int r = a + b + c + d;"));
        let decls = function_body(&mut b, params, vec![stmt]);
        b.finish(decls)
    }

    #[test]
    fn middle_operands() {
        let ast = sum_of_four();
        assert_eq!(
            extract_at(&ast, "b + c").as_deref(),
            Some("void f(int a, int b, int c, int d) { auto placeholder = b + c; int r = a + placeholder + d; }")
        );
    }

    #[test]
    fn trailing_operands() {
        let ast = sum_of_four();
        assert_eq!(
            extract_at(&ast, "c + d").as_deref(),
            Some("void f(int a, int b, int c, int d) { auto placeholder = c + d; int r = a + b + placeholder; }")
        );
    }
}

// ============================================================================
// Scope
// ============================================================================

mod scope {
    use super::*;

    #[test]
    fn for_init_variable_blocks_hoisting() {
        let mut b = AstBuilder::new("void f() { for (int k = 0; k < 3; ) g(k * 2); }");
        let zero = b.int_literal(b.span_of("0"));
        let k = b.var("k", b.span_of("int k = 0"), Some(zero), QualType::int());
        let init = b.decl_stmt(vec![k], b.span_of("int k = 0;"));
        let k1 = b.decl_ref(k, b.span_nth("k", 1));
        let k1 = b.implicit_cast(k1, QualType::int());
        let three = b.int_literal(b.span_of("3"));
        let cond = b.binary(BinaryOpKind::Lt, k1, three, QualType::builtin("bool"));
        let k2 = b.decl_ref(k, b.span_nth("k", 2));
        let k2 = b.implicit_cast(k2, QualType::int());
        let two = b.int_literal(b.span_of("2"));
        let product = b.binary(BinaryOpKind::Mul, k2, two, QualType::int());
        let g = b.declared_function("g", QualType::void());
        let callee = b.decl_ref(g, b.span_of("g"));
        let call = b.call(callee, vec![product], b.span_of("g(k * 2)"), QualType::void());
        let for_stmt = b.for_stmt(
            Some(init),
            Some(cond),
            None,
            call,
            b.span_of("for (int k = 0; k < 3; ) g(k * 2);"),
        );
        let decls = function_body(&mut b, vec![], vec![for_stmt]);
        let ast = b.finish(decls);

        assert_eq!(extract_at(&ast, "k * 2"), None);
    }

    #[test]
    fn if_init_variable_blocks_hoisting() {
        let mut b = AstBuilder::new("void f() { if (int k = 1; k) g(k * 2); }");
        let one = b.int_literal(b.span_of("1"));
        let k = b.var("k", b.span_of("int k = 1"), Some(one), QualType::int());
        let init = b.decl_stmt(vec![k], b.span_of("int k = 1;"));
        let cond = b.decl_ref(k, b.span_nth("k", 1));
        let cond = b.implicit_cast(cond, QualType::builtin("bool"));
        let k2 = b.decl_ref(k, b.span_nth("k", 2));
        let k2 = b.implicit_cast(k2, QualType::int());
        let two = b.int_literal(b.span_of("2"));
        let product = b.binary(BinaryOpKind::Mul, k2, two, QualType::int());
        let g = b.declared_function("g", QualType::void());
        let callee = b.decl_ref(g, b.span_of("g"));
        let call = b.call(callee, vec![product], b.span_of("g(k * 2)"), QualType::void());
        let if_stmt = b.if_stmt(
            Some(init),
            cond,
            call,
            None,
            b.span_of("if (int k = 1; k) g(k * 2);"),
        );
        let decls = function_body(&mut b, vec![], vec![if_stmt]);
        let ast = b.finish(decls);

        assert_eq!(extract_at(&ast, "k * 2"), None);
    }

    #[test]
    fn sibling_declarator_blocks_hoisting() {
        let mut b = AstBuilder::new("void f() { int k = 1, m = k * 2 + 1; }");
        let one = b.int_literal(b.span_nth("1", 0));
        let k = b.var("k", b.span_of("int k = 1"), Some(one), QualType::int());
        let k_ref = b.decl_ref(k, b.span_nth("k", 1));
        let k_ref = b.implicit_cast(k_ref, QualType::int());
        let two = b.int_literal(b.span_of("2"));
        let product = b.binary(BinaryOpKind::Mul, k_ref, two, QualType::int());
        let one = b.int_literal(b.span_nth("1", 1));
        let sum = b.binary(BinaryOpKind::Add, product, one, QualType::int());
        let m = b.var("m", b.span_of("m = k * 2 + 1"), Some(sum), QualType::int());
        let stmt = b.decl_stmt(vec![k, m], b.span_of("int k = 1, m = k * 2 + 1;"));
        let decls = function_body(&mut b, vec![], vec![stmt]);
        let ast = b.finish(decls);

        assert_eq!(extract_at(&ast, "k * 2"), None);
    }

    #[test]
    fn earlier_declaration_in_block_is_fine() {
        let mut b = AstBuilder::new("void f() { int k = 1; int m = k * 2 + 1; }");
        let one = b.int_literal(b.span_nth("1", 0));
        let k = b.var("k", b.span_of("int k = 1"), Some(one), QualType::int());
        let k_stmt = b.decl_stmt(vec![k], b.span_of("int k = 1;"));
        let k_ref = b.decl_ref(k, b.span_nth("k", 1));
        let k_ref = b.implicit_cast(k_ref, QualType::int());
        let two = b.int_literal(b.span_of("2"));
        let product = b.binary(BinaryOpKind::Mul, k_ref, two, QualType::int());
        let one = b.int_literal(b.span_nth("1", 1));
        let sum = b.binary(BinaryOpKind::Add, product, one, QualType::int());
        let m = b.var("m", b.span_of("int m = k * 2 + 1"), Some(sum), QualType::int());
        let m_stmt = b.decl_stmt(vec![m], b.span_of("int m = k * 2 + 1;"));
        let decls = function_body(&mut b, vec![], vec![k_stmt, m_stmt]);
        let ast = b.finish(decls);

        assert_eq!(
            extract_at(&ast, "k * 2").as_deref(),
            Some("void f() { int k = 1; auto placeholder = k * 2; int m = placeholder + 1; }")
        );
        // The whole initializer would only rename it.
        assert_eq!(extract_at(&ast, "k * 2 + 1"), None);
    }
}

// ============================================================================
// Lambdas
// ============================================================================

mod lambdas {
    use super::*;

    /// `g([] { return 1; })` as the only statement of `f`.
    fn lambda_argument() -> Ast {
        let mut b = AstBuilder::new("void f() { g([] { return 1; }); }");
        let one = b.int_literal(b.span_of("1"));
        let ret = b.return_stmt(Some(one), b.span_of("return 1;"));
        let body = b.compound(vec![ret], b.span_of("{ return 1; }"));
        let lambda = b.lambda(LambdaParts::new(body), b.span_of("[] { return 1; }"), QualType::record("(lambda)"));
        let g = b.declared_function("g", QualType::int());
        let callee = b.decl_ref(g, b.span_of("g"));
        let call = b.call(callee, vec![lambda], b.span_of("g([] { return 1; })"), QualType::int());
        let decls = function_body(&mut b, vec![], vec![call]);
        b.finish(decls)
    }

    #[test]
    fn capture_list_alone_is_not_enough() {
        let ast = lambda_argument();
        assert_eq!(extract_at(&ast, "[]"), None);
        assert_eq!(extract_at(&ast, "[] {"), None);
    }

    #[test]
    fn whole_lambda_argument() {
        let ast = lambda_argument();
        assert_eq!(
            extract_at(&ast, "[] { return 1; }").as_deref(),
            Some("void f() { auto placeholder = [] { return 1; }; g(placeholder); }")
        );
    }

    #[test]
    fn init_capture_initializer() {
        let mut b = AstBuilder::new("void f() { int a = 1; g([c = a + 1] { return c; }); }");
        let one = b.int_literal(b.span_nth("1", 0));
        let a = b.var("a", b.span_of("int a = 1"), Some(one), QualType::int());
        let a_stmt = b.decl_stmt(vec![a], b.span_of("int a = 1;"));

        let a_ref = b.decl_ref(a, b.span_nth("a", 1));
        let a_ref = b.implicit_cast(a_ref, QualType::int());
        let one = b.int_literal(b.span_nth("1", 1));
        let sum = b.binary(BinaryOpKind::Add, a_ref, one, QualType::int());
        let c = b.init_capture("c", b.span_of("c = a + 1"), sum, QualType::int());
        let c_ref = b.decl_ref(c, b.span_nth("c", 1));
        let ret = b.return_stmt(Some(c_ref), b.span_of("return c;"));
        let body = b.compound(vec![ret], b.span_of("{ return c; }"));
        let mut parts = LambdaParts::new(body);
        parts.captures = vec![LambdaCapture::Init { var: c }];
        let lambda = b.lambda(parts, b.span_of("[c = a + 1] { return c; }"), QualType::record("(lambda)"));

        let g = b.declared_function("g", QualType::int());
        let callee = b.decl_ref(g, b.span_of("g"));
        let call = b.call(
            callee,
            vec![lambda],
            b.span_of("g([c = a + 1] { return c; })"),
            QualType::int(),
        );
        let decls = function_body(&mut b, vec![], vec![a_stmt, call]);
        let ast = b.finish(decls);

        assert_eq!(
            extract_at(&ast, "a + 1").as_deref(),
            Some("void f() { int a = 1; auto placeholder = a + 1; g([c = placeholder] { return c; }); }")
        );
    }
}

// ============================================================================
// Tweak contract
// ============================================================================

mod contract {
    use super::*;

    #[test]
    fn prepare_is_repeatable() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4"));
        let mut tweak = ExtractVariable::new();
        assert!(tweak.prepare(&inputs));
        let first = tweak.apply(&inputs).unwrap();
        assert!(tweak.prepare(&inputs));
        let second = tweak.apply(&inputs).unwrap();
        assert_eq!(first.edits, second.edits);
    }

    #[test]
    fn apply_with_another_selection_is_refused() {
        let ast = product_of_sum();
        let mut tweak = ExtractVariable::new();
        assert!(tweak.prepare(&TweakInputs::new(&ast, select(&ast, "5 + 4"))));

        let elsewhere = TweakInputs::new(&ast, select(&ast, "void"));
        assert!(matches!(
            tweak.apply(&elsewhere),
            Err(TweakError::ExtractVariable(ExtractVariableError::NotPrepared))
        ));
    }

    #[test]
    fn edits_share_one_buffer_and_never_overlap() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4"));
        let mut tweak = ExtractVariable::new();
        assert!(tweak.prepare(&inputs));
        let effect = tweak.apply(&inputs).unwrap();
        assert_eq!(effect.edit_count(), 2);
        assert_eq!(effect.target_file(), ast.sources.main_file());
        assert!(effect.detect_conflicts().is_empty());
        for edit in &effect.edits {
            assert_eq!(edit.labels.tweak_id.as_deref(), Some("ExtractVariable"));
        }
    }

    #[test]
    fn apply_without_prepare_fails() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4"));
        assert!(matches!(
            ExtractVariable::new().apply(&inputs),
            Err(TweakError::ExtractVariable(ExtractVariableError::NotPrepared))
        ));
    }

    #[test]
    fn keyword_name_is_rejected() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4")).with_variable_name("int");
        let mut tweak = ExtractVariable::new();
        assert!(tweak.prepare(&inputs));
        assert!(matches!(
            tweak.apply(&inputs),
            Err(TweakError::ExtractVariable(ExtractVariableError::InvalidName(_)))
        ));
    }

    #[test]
    fn registry_instances_work_through_the_trait() {
        let ast = product_of_sum();
        let inputs = TweakInputs::new(&ast, select(&ast, "5 + 4"));
        let mut tweak = TweakRegistry::with_builtins().create("ExtractVariable").unwrap();
        assert!(tweak.prepare(&inputs));
        assert_eq!(tweak.apply(&inputs).unwrap().edit_count(), 2);
    }

    #[test]
    fn snapshot_round_trip_extracts_the_same() {
        let ast = product_of_sum();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ast.json");
        std::fs::write(&path, to_json(&ast).unwrap()).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded, ast);
        assert_eq!(extract_at(&loaded, "5 + 4"), extract_at(&ast, "5 + 4"));
    }
}
