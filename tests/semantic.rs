use aslc::{
    driver::{self, CompileError},
    parse::{ExprKind, StmtKind},
    semantic::{ErrorCategory, SemanticError},
    symtable::SymbolKind,
};

fn errors_in(source: &str) -> Vec<SemanticError> {
    let (_, compiler) = driver::check(source).expect("front end failed");
    compiler.errors.iter().map(|d| d.error.clone()).collect()
}

/// Wraps `body` in a `main` with a few variables of every shape.
fn errors_in_main(body: &str) -> Vec<SemanticError> {
    let source = format!(
        "func p(x: int)\nendfunc\n\
         func f(x: float): int\n  return 1;\nendfunc\n\
         func main()\n  var i, j: int\n  var r: float\n  var b: bool\n  var c: char\n  \
         var a: array[4] of int\n  var z: array[4] of int\n{body}endfunc\n"
    );
    errors_in(&source)
}

#[test]
fn valid_program_has_no_diagnostics() {
    let errors = errors_in_main(
        "  i := f(2) + j * 3;\n  r := i;\n  r := max(i, r, 2);\n  c := max(c, 'x');\n  \
         a := z;\n  a[i] := a[0] % 2;\n  b := not (i < j) or c == 'y';\n  p(i);\n  \
         for i in range(0, 10, 2) do\n    read a[i];\n  endfor\n  \
         while b do\n    write r;\n  endwhile\n  return;\n",
    );
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn duplicates_are_declaration_errors() {
    let (program, compiler) = driver::check(
        "func main()\n  var x: int\n  var x: float\nendfunc\n\
         func g(y: int, y: char)\nendfunc\n\
         func main()\nendfunc\n",
    )
    .expect("front end failed");

    let errors: Vec<_> = compiler.errors.iter().map(|d| d.error.clone()).collect();
    assert_eq!(
        errors,
        vec![
            SemanticError::DeclaredIdent("x".to_string()),
            SemanticError::DeclaredIdent("y".to_string()),
            SemanticError::DeclaredIdent("main".to_string()),
        ]
    );
    assert_eq!(compiler.errors.count(ErrorCategory::Declaration), 3);

    // the first declaration wins
    let scope = compiler
        .decorations
        .get_scope(program.functions[0].id)
        .unwrap();
    let x = compiler.symbols.scope(scope).unwrap().get("x").unwrap();
    assert_eq!(x.kind, SymbolKind::Variable);
    assert!(compiler.types.is_integer_ty(x.ty));

    // a rejected parameter still counts in the signature
    let g = compiler
        .decorations
        .get_type(program.functions[1].id)
        .unwrap();
    assert_eq!(compiler.types.num_of_parameters(g), 2);
}

#[test]
fn reference_errors() {
    assert_eq!(
        errors_in_main("  q := 1;\n"),
        vec![SemanticError::UndeclaredIdent("q".to_string())]
    );
    assert_eq!(
        errors_in_main("  i(3);\n"),
        vec![SemanticError::NotCallable("i".to_string())]
    );
    assert_eq!(
        errors_in_main("  i := j[0];\n"),
        vec![SemanticError::NonArrayInArrayAccess("j".to_string())]
    );
}

#[test]
fn undeclared_names_do_not_cascade() {
    assert_eq!(
        errors_in_main("  i := q + 1;\n  q := 'a';\n  if q then\n  endif\n  write -q;\n"),
        vec![
            SemanticError::UndeclaredIdent("q".to_string()),
            SemanticError::UndeclaredIdent("q".to_string()),
            SemanticError::UndeclaredIdent("q".to_string()),
            SemanticError::UndeclaredIdent("q".to_string()),
        ]
    );
    assert_eq!(
        errors_in_main("  i := q(1, 'a') * 2;\n  b := q < 3 and b;\n"),
        vec![
            SemanticError::UndeclaredIdent("q".to_string()),
            SemanticError::UndeclaredIdent("q".to_string()),
        ]
    );
}

#[test]
fn assignment_rules() {
    assert_eq!(
        errors_in_main("  i := r;\n"),
        vec![SemanticError::IncompatibleAssignment(
            "int".to_string(),
            "float".to_string()
        )]
    );
    assert_eq!(
        errors_in_main("  f := 3;\n"),
        vec![
            SemanticError::IncompatibleAssignment(
                "function<(float):int>".to_string(),
                "int".to_string()
            ),
            SemanticError::NonReferenceableLeftExpr,
        ]
    );
    assert_eq!(
        errors_in_main("  a[c] := 1;\n"),
        vec![SemanticError::NonIntegerIndexInArrayAccess]
    );
    assert!(errors_in_main("  r := i;\n  a := z;\n").is_empty());
}

#[test]
fn conditions_and_loops() {
    assert_eq!(
        errors_in_main("  if i then\n  endif\n  while r do\n  endwhile\n"),
        vec![
            SemanticError::BooleanRequired("if"),
            SemanticError::BooleanRequired("while"),
        ]
    );
    assert_eq!(
        errors_in_main("  for r in range(1, c) do\n  endfor\n"),
        vec![
            SemanticError::ForRequireIntegerVar,
            SemanticError::ForRequireIntegerExpr,
        ]
    );
    assert_eq!(
        errors_in_main(
            "  for i in range(1, 2, 3, 4) do\n  endfor\n  for j in range() do\n  endfor\n"
        ),
        vec![
            SemanticError::NumberOfRangeExpressions(4),
            SemanticError::NumberOfRangeExpressions(0),
        ]
    );
}

#[test]
fn read_and_write_need_basic_values() {
    assert_eq!(
        errors_in_main("  read a;\n  write z;\n"),
        vec![
            SemanticError::ReadWriteRequireBasic("read"),
            SemanticError::ReadWriteRequireBasic("write"),
        ]
    );
    assert_eq!(
        errors_in_main("  read f;\n"),
        vec![
            SemanticError::ReadWriteRequireBasic("read"),
            SemanticError::NonReferenceableExpression,
        ]
    );
    assert!(errors_in_main("  write \"done\\n\";\n").is_empty());
}

#[test]
fn return_must_match_the_function() {
    let errors = errors_in(
        "func f(): int\n  return;\nendfunc\n\
         func g(): float\n  return 1;\nendfunc\n\
         func h(): int\n  return 1.5;\nendfunc\n\
         func main()\n  return 1;\nendfunc\n",
    );
    assert_eq!(
        errors,
        vec![
            SemanticError::IncompatibleReturn,
            SemanticError::IncompatibleReturn,
            SemanticError::IncompatibleReturn,
        ]
    );
}

#[test]
fn call_checks() {
    assert_eq!(
        errors_in_main("  i := f(1, 2);\n"),
        vec![SemanticError::NumberOfParameters("f".to_string(), 1, 2)]
    );
    assert_eq!(
        errors_in_main("  i := f(c);\n"),
        vec![SemanticError::IncompatibleParameter(1, "f".to_string())]
    );
    assert_eq!(
        errors_in_main("  i := p(1);\n"),
        vec![SemanticError::IsNotFunction("p".to_string())]
    );
    // a call used as a statement may discard its value
    assert!(errors_in_main("  f(i);\n").is_empty());
}

#[test]
fn operator_checks() {
    assert_eq!(
        errors_in_main("  i := r % 2;\n  write 3.0 % 2;\n"),
        vec![
            SemanticError::IncompatibleOperator("%"),
            SemanticError::IncompatibleOperator("%"),
        ]
    );
    assert_eq!(
        errors_in_main("  b := b < b;\n  b := i and b;\n  b := not i;\n  i := -c;\n"),
        vec![
            SemanticError::IncompatibleOperator("<"),
            SemanticError::IncompatibleOperator("and"),
            SemanticError::IncompatibleOperator("not"),
            SemanticError::IncompatibleOperator("-"),
        ]
    );
    // a failed operand turns the whole expression into an error once
    assert_eq!(
        errors_in_main("  i := (c + 1) * 2;\n"),
        vec![SemanticError::IncompatibleOperator("+")]
    );
    assert!(errors_in_main("  b := b == true;\n  b := c != 'a';\n  r := i / 2.0;\n").is_empty());
}

#[test]
fn max_checks() {
    assert_eq!(
        errors_in_main("  i := max(i);\n"),
        vec![SemanticError::NumberOfMaxArguments(1)]
    );
    assert_eq!(
        errors_in_main("  i := max(i, c);\n"),
        vec![SemanticError::IncompatibleMaxArguments]
    );
    assert_eq!(
        errors_in_main("  i := max(i, r);\n"),
        vec![SemanticError::IncompatibleAssignment(
            "int".to_string(),
            "float".to_string()
        )]
    );
}

#[test]
fn missing_main_is_reported_once() {
    for source in [
        "func f()\nendfunc\n",
        "func main(x: int)\nendfunc\n",
        "func main(): int\n  return 0;\nendfunc\n",
    ] {
        let (_, compiler) = driver::check(source).expect("front end failed");
        assert_eq!(compiler.errors.len(), 1, "{source}");
        assert_eq!(compiler.errors.count(ErrorCategory::Structural), 1);
    }
}

#[test]
fn missing_main_follows_other_diagnostics() {
    let source = "func f()\n  var i: int\n  i := q;\n  i := 'a';\nendfunc\n";
    let (_, compiler) = driver::check(source).expect("front end failed");
    let errors: Vec<_> = compiler.errors.iter().map(|d| d.error.clone()).collect();
    assert_eq!(errors.len(), 3, "{errors:?}");
    assert_eq!(compiler.errors.count(ErrorCategory::Reference), 1);
    assert_eq!(compiler.errors.count(ErrorCategory::Type), 1);
    assert_eq!(compiler.errors.count(ErrorCategory::Structural), 1);
    assert_eq!(
        compiler.errors.iter().last().map(|d| d.category()),
        Some(ErrorCategory::Structural)
    );
}

#[test]
fn expressions_are_decorated() {
    let (program, compiler) = driver::check(
        "func main()\n  var v: array[3] of float\n  var i: int\n  v[i] := (i + 1) * 2;\nendfunc\n",
    )
    .expect("front end failed");
    assert!(compiler.errors.is_empty());

    let StmtKind::Assign { target, value } = &program.functions[0].body[0].kind else {
        panic!("expected assignment");
    };
    let decorations = &compiler.decorations;
    let types = &compiler.types;

    assert!(decorations.get_is_lvalue(target.id).unwrap());
    assert!(types.is_float_ty(decorations.get_type(target.id).unwrap()));
    assert!(types.is_integer_ty(decorations.get_type(value.id).unwrap()));
    assert!(!decorations.get_is_lvalue(value.id).unwrap());

    let ExprKind::Binary { lhs, .. } = &value.kind else {
        panic!("expected binary");
    };
    assert!(matches!(lhs.kind, ExprKind::Paren(_)));
    assert!(types.is_integer_ty(decorations.get_type(lhs.id).unwrap()));
}

#[test]
fn compile_refuses_programs_with_diagnostics() {
    let err = driver::compile("func main()\n  x := 1;\nendfunc\n").unwrap_err();
    let CompileError::Diagnostics(diagnostics) = err else {
        panic!("expected diagnostics, got {err:?}");
    };
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].category(), ErrorCategory::Reference);
    assert_eq!(driver::line_col("func main()\n  x := 1;\n", diagnostics[0].start), (2, 3));
}
