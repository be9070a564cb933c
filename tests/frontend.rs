use aslc::{
    driver,
    parse::{BasicType, BinaryOp, ExprKind, Literal, ParserError, StmtKind, TypeSpec, UnaryOp},
    tokenize::{TokenKind, TokenizerError, tokenize},
};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source)
        .expect("tokenize failed")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn keywords_win_over_identifiers() {
    assert_eq!(
        kinds("endif endifx while_ for"),
        vec![
            TokenKind::EndIf,
            TokenKind::Identifier("endifx".to_string()),
            TokenKind::Identifier("while_".to_string()),
            TokenKind::For,
        ]
    );
}

#[test]
fn comments_and_whitespace_are_skipped() {
    assert_eq!(
        kinds("x := 1; // trailing comment\n\ty"),
        vec![
            TokenKind::Identifier("x".to_string()),
            TokenKind::Assign,
            TokenKind::IntLiteral(1),
            TokenKind::Semicolon,
            TokenKind::Identifier("y".to_string()),
        ]
    );
}

#[test]
fn literals_keep_raw_escape_text() {
    assert_eq!(
        kinds(r#"'a' '\n' "a\nb\"c" 2.50 true"#),
        vec![
            TokenKind::CharLiteral("a".to_string()),
            TokenKind::CharLiteral("\\n".to_string()),
            TokenKind::StringLiteral("a\\nb\\\"c".to_string()),
            TokenKind::FloatLiteral(2.5),
            TokenKind::Bool(true),
        ]
    );
}

#[test]
fn operators_are_split_greedily() {
    assert_eq!(
        kinds("a<=b>=c!=d==e<f>g:=h"),
        vec![
            TokenKind::Identifier("a".to_string()),
            TokenKind::LessThanEqual,
            TokenKind::Identifier("b".to_string()),
            TokenKind::GreaterThanEqual,
            TokenKind::Identifier("c".to_string()),
            TokenKind::NotEqual,
            TokenKind::Identifier("d".to_string()),
            TokenKind::DoubleEqual,
            TokenKind::Identifier("e".to_string()),
            TokenKind::LessThan,
            TokenKind::Identifier("f".to_string()),
            TokenKind::GreaterThan,
            TokenKind::Identifier("g".to_string()),
            TokenKind::Assign,
            TokenKind::Identifier("h".to_string()),
        ]
    );
}

#[test]
fn unknown_characters_are_reported_with_position() {
    let err = tokenize("x := $").unwrap_err();
    assert_eq!(
        err,
        TokenizerError::UnexpectedInput {
            text: "$".to_string(),
            at: 5
        }
    );
}

fn single_expr(expr: &str) -> ExprKind {
    let source = format!("func main()\n  write {expr};\nendfunc\n");
    let program = driver::parse(&source).expect("parse failed");
    let stmt = program.functions[0].body[0].clone();
    match stmt.kind {
        StmtKind::Write(e) => e.kind,
        other => panic!("expected write, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let ExprKind::Binary { op, lhs, rhs } = single_expr("a + b * c") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Add);
    assert!(matches!(lhs.kind, ExprKind::Ident(_)));
    assert!(matches!(
        rhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn subtraction_is_left_associative() {
    let ExprKind::Binary { op, lhs, .. } = single_expr("a - b - c") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Sub);
    assert!(matches!(
        lhs.kind,
        ExprKind::Binary {
            op: BinaryOp::Sub,
            ..
        }
    ));
}

#[test]
fn logical_operators_bind_looser_than_comparisons() {
    let ExprKind::Binary { op, lhs, rhs } = single_expr("not a < b and c or d") else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Or);
    assert!(matches!(rhs.kind, ExprKind::Ident(_)));
    let ExprKind::Binary {
        op: BinaryOp::And,
        lhs: and_lhs,
        ..
    } = lhs.kind
    else {
        panic!("expected and");
    };
    // `not` is a prefix operator, so it applies to `a` only
    let ExprKind::Binary {
        op: BinaryOp::LessThan,
        lhs: cmp_lhs,
        ..
    } = and_lhs.kind
    else {
        panic!("expected comparison");
    };
    assert!(matches!(
        cmp_lhs.kind,
        ExprKind::Unary {
            op: UnaryOp::Not,
            ..
        }
    ));
}

#[test]
fn max_and_calls_parse_their_arguments() {
    let ExprKind::Max(args) = single_expr("max(1, f(2, 3), 4.5)") else {
        panic!("expected max");
    };
    assert_eq!(args.len(), 3);
    assert!(matches!(args[1].kind, ExprKind::Call(ref call) if call.args.len() == 2));
    assert!(matches!(
        args[2].kind,
        ExprKind::Literal(Literal::Float(x)) if x == 4.5
    ));
}

#[test]
fn declarations_and_signature() {
    let program = driver::parse(
        "func f(a: int, v: array[3] of char): float\n  var x, y: bool\n  return 1.0;\nendfunc\n",
    )
    .expect("parse failed");
    let f = &program.functions[0];
    assert_eq!(f.name.kind, "f");
    assert_eq!(f.params.len(), 2);
    assert_eq!(
        f.params[1].r#type.kind,
        TypeSpec::Array {
            size: 3,
            elem: BasicType::Char
        }
    );
    assert_eq!(
        f.return_type.as_ref().map(|t| t.kind),
        Some(TypeSpec::Basic(BasicType::Float))
    );
    assert_eq!(f.declarations[0].names.len(), 2);
}

#[test]
fn node_ids_are_unique() {
    let program = driver::parse("func main()\n  var x: int\n  x := 1 + 2 * 3;\nendfunc\n")
        .expect("parse failed");
    let StmtKind::Assign { target, value } = &program.functions[0].body[0].kind else {
        panic!("expected assignment");
    };
    let ExprKind::Binary { lhs, rhs, .. } = &value.kind else {
        panic!("expected binary");
    };
    let mut ids = vec![program.id, program.functions[0].id, target.id, value.id, lhs.id, rhs.id];
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 6);
}

#[test]
fn syntax_errors_are_fatal() {
    let err = driver::parse("func main()\n  x := ;\nendfunc\n").unwrap_err();
    assert!(matches!(
        err,
        driver::CompileError::Parse(ParserError::ExpectedPrimary(TokenKind::Semicolon))
    ));

    let err = driver::parse("func main()\n  var v: array[0] of int\nendfunc\n").unwrap_err();
    assert!(matches!(
        err,
        driver::CompileError::Parse(ParserError::InvalidArraySize(0))
    ));

    assert!(matches!(
        driver::parse("// nothing here\n").unwrap_err(),
        driver::CompileError::Parse(ParserError::EmptyProgram)
    ));
}

#[test]
fn printing_round_trips_through_the_parser() {
    let source = "func main()\n  var a, b: int\n  var f: float\n  \
                  if not (a < b) and a - (b - 1) == 2 then\n    write \"x\\n\";\n  else\n    \
                  f := -max(a, 2.5) * 3;\n  endif\n  \
                  for a in range(0, 10, 2) do\n    read b;\n  endfor\nendfunc\n";
    let program = driver::parse(source).expect("parse failed");
    assert_eq!(program.to_string(), source);
}

#[test]
fn float_literals_print_without_exponents() {
    let source = "func main()\n  var f: float\n  \
                  f := 100000000000000000000.0;\n  f := 0.0000001;\n  f := 2.0;\nendfunc\n";
    let program = driver::parse(source).expect("parse failed");
    assert_eq!(program.to_string(), source);
}

#[test]
fn overlong_float_literals_are_rejected() {
    let source = format!("x := {}.0;", "9".repeat(400));
    assert!(matches!(
        tokenize(&source).unwrap_err(),
        TokenizerError::InvalidFloat(_)
    ));
}
