// Builds random programs that pass type checking, printed back as source.
// Every function draws its names from a fixed environment so each generated
// expression has a known type.

pub mod display;

use quickcheck::{Arbitrary, Gen, empty_shrinker};

use crate::parse::{
    ArrayAccess, BasicType, BinaryOp, Call, Expr, ExprKind, Function, Ident, LeftExpr,
    LeftExprKind, Literal, Node, NodeId, Parameter, Program, Stmt, StmtKind, TypeAnnotation,
    TypeSpec, UnaryOp, VariableDecl,
};

const ARRAY_SIZE: usize = 5;
const MAX_DEPTH: usize = 3;

pub fn generate(size: usize) -> String {
    let mut qc_gen = Gen::new(size.max(1));
    let program = Program::arbitrary(&mut qc_gen);
    program.to_string()
}

impl Arbitrary for Program {
    fn arbitrary(g: &mut Gen) -> Self {
        Program {
            id: NodeId(0),
            functions: vec![gen_scale(g), gen_fill(g), gen_main(g)],
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        empty_shrinker()
    }
}

/// Names visible inside one generated function, grouped by type.
struct Env {
    ints: &'static [&'static str],
    floats: &'static [&'static str],
    bools: &'static [&'static str],
    chars: &'static [&'static str],
    array: Option<&'static str>,
    calls: bool,
}

const SCALE_ENV: Env = Env {
    ints: &["n"],
    floats: &["x", "t"],
    bools: &[],
    chars: &[],
    array: None,
    calls: false,
};

const FILL_ENV: Env = Env {
    ints: &["n", "j"],
    floats: &[],
    bools: &[],
    chars: &[],
    array: Some("v"),
    calls: false,
};

const MAIN_ENV: Env = Env {
    ints: &["i0", "i1", "k"],
    floats: &["f0"],
    bools: &["b0"],
    chars: &["c0"],
    array: Some("a0"),
    calls: true,
};

fn node<K>(kind: K) -> Node<K> {
    Node {
        id: NodeId(0),
        kind,
        start: 0,
        end: 0,
    }
}

fn ident(name: &str) -> Ident {
    node(name.to_string())
}

fn annotation(spec: TypeSpec) -> TypeAnnotation {
    node(spec)
}

fn var(names: &[&str], spec: TypeSpec) -> VariableDecl {
    VariableDecl {
        names: names.iter().map(|n| ident(n)).collect(),
        r#type: annotation(spec),
    }
}

fn param(name: &str, spec: TypeSpec) -> Parameter {
    Parameter {
        name: ident(name),
        r#type: annotation(spec),
    }
}

fn int_array() -> TypeSpec {
    TypeSpec::Array {
        size: ARRAY_SIZE,
        elem: BasicType::Int,
    }
}

fn function(
    name: &str,
    params: Vec<Parameter>,
    return_type: Option<BasicType>,
    declarations: Vec<VariableDecl>,
    body: Vec<Stmt>,
) -> Function {
    Function {
        id: NodeId(0),
        name: ident(name),
        params,
        return_type: return_type.map(|b| annotation(TypeSpec::Basic(b))),
        declarations,
        body,
        start: 0,
        end: 0,
    }
}

fn gen_scale(g: &mut Gen) -> Function {
    let env = &SCALE_ENV;
    let mut body = vec![assign("t", gen_expr(g, env, BasicType::Float, MAX_DEPTH))];
    body.extend(gen_stmts(g, env, 1));
    body.push(node(StmtKind::Return(Some(gen_expr(
        g,
        env,
        BasicType::Float,
        MAX_DEPTH,
    )))));
    function(
        "scale",
        vec![
            param("n", TypeSpec::Basic(BasicType::Int)),
            param("x", TypeSpec::Basic(BasicType::Float)),
        ],
        Some(BasicType::Float),
        vec![var(&["t"], TypeSpec::Basic(BasicType::Float))],
        body,
    )
}

fn gen_fill(g: &mut Gen) -> Function {
    let env = &FILL_ENV;
    let mut body = vec![node(StmtKind::For {
        control: ident("j"),
        range: vec![int_literal(ARRAY_SIZE as i64)],
        body: vec![node(StmtKind::Assign {
            target: node(LeftExprKind::ArrayAccess(ArrayAccess {
                base: ident("v"),
                index: Box::new(ident_expr("j")),
            })),
            value: gen_expr(g, env, BasicType::Int, MAX_DEPTH),
        })],
    })];
    body.extend(gen_stmts(g, env, 1));
    function(
        "fill",
        vec![
            param("v", int_array()),
            param("n", TypeSpec::Basic(BasicType::Int)),
        ],
        None,
        vec![var(&["j"], TypeSpec::Basic(BasicType::Int))],
        body,
    )
}

fn gen_main(g: &mut Gen) -> Function {
    let env = &MAIN_ENV;
    let mut body = vec![
        assign("i0", gen_expr(g, env, BasicType::Int, 1)),
        node(StmtKind::ProcCall(Call {
            callee: ident("fill"),
            args: vec![ident_expr("a0"), gen_expr(g, env, BasicType::Int, MAX_DEPTH)],
        })),
    ];
    body.extend(gen_stmts(g, env, 2));
    function(
        "main",
        vec![],
        None,
        vec![
            var(&["i0", "i1", "k"], TypeSpec::Basic(BasicType::Int)),
            var(&["f0"], TypeSpec::Basic(BasicType::Float)),
            var(&["b0"], TypeSpec::Basic(BasicType::Bool)),
            var(&["c0"], TypeSpec::Basic(BasicType::Char)),
            var(&["a0"], int_array()),
        ],
        body,
    )
}

fn pick(g: &mut Gen, n: usize) -> usize {
    usize::from(u8::arbitrary(g)) % n
}

fn pick_name(g: &mut Gen, names: &'static [&'static str]) -> Option<&'static str> {
    if names.is_empty() {
        None
    } else {
        Some(names[pick(g, names.len())])
    }
}

fn assign(name: &str, value: Expr) -> Stmt {
    node(StmtKind::Assign {
        target: node(LeftExprKind::Ident(ident(name))),
        value,
    })
}

fn gen_stmts(g: &mut Gen, env: &Env, depth: usize) -> Vec<Stmt> {
    let most = g.size().clamp(1, 6);
    let count = 1 + pick(g, most);
    (0..count).map(|_| gen_stmt(g, env, depth)).collect()
}

fn gen_stmt(g: &mut Gen, env: &Env, depth: usize) -> Stmt {
    let choices = if depth == 0 { 6 } else { 9 };
    match pick(g, choices) {
        0 => {
            let ty = random_basic(g);
            match target_of(g, env, ty) {
                Some(target) => node(StmtKind::Assign {
                    value: gen_expr(g, env, ty, MAX_DEPTH),
                    target,
                }),
                None => write_of(g, env, ty),
            }
        }
        1 => {
            let ty = random_basic(g);
            write_of(g, env, ty)
        }
        2 => node(StmtKind::WriteString(random_text(g))),
        3 => match pick_name(g, env.ints) {
            Some(name) => node(StmtKind::Read(node(LeftExprKind::Ident(ident(name))))),
            None => write_of(g, env, BasicType::Int),
        },
        4 => match env.array {
            Some(array) => node(StmtKind::Assign {
                target: node(LeftExprKind::ArrayAccess(ArrayAccess {
                    base: ident(array),
                    index: Box::new(gen_expr(g, env, BasicType::Int, 1)),
                })),
                value: gen_expr(g, env, BasicType::Int, MAX_DEPTH),
            }),
            None => write_of(g, env, BasicType::Float),
        },
        // `fill` is only called where `main`'s names are in scope
        5 if env.calls => node(StmtKind::ProcCall(Call {
            callee: ident("fill"),
            args: vec![ident_expr("a0"), gen_expr(g, env, BasicType::Int, 2)],
        })),
        5 => write_of(g, env, BasicType::Int),
        6 => node(StmtKind::If {
            condition: gen_expr(g, env, BasicType::Bool, 2),
            then_branch: gen_stmts(g, env, depth - 1),
            else_branch: if bool::arbitrary(g) {
                Some(gen_stmts(g, env, depth - 1))
            } else {
                None
            },
        }),
        7 => node(StmtKind::While {
            condition: gen_expr(g, env, BasicType::Bool, 2),
            body: gen_stmts(g, env, depth - 1),
        }),
        _ => {
            let control = pick_name(g, env.ints).unwrap_or("n");
            let count = 1 + pick(g, 3);
            node(StmtKind::For {
                control: ident(control),
                range: (0..count)
                    .map(|_| gen_expr(g, env, BasicType::Int, 1))
                    .collect(),
                body: gen_stmts(g, env, depth - 1),
            })
        }
    }
}

fn write_of(g: &mut Gen, env: &Env, ty: BasicType) -> Stmt {
    node(StmtKind::Write(gen_expr(g, env, ty, 2)))
}

fn target_of(g: &mut Gen, env: &Env, ty: BasicType) -> Option<LeftExpr> {
    let name = pick_name(g, names_of(env, ty))?;
    Some(node(LeftExprKind::Ident(ident(name))))
}

fn names_of(env: &Env, ty: BasicType) -> &'static [&'static str] {
    match ty {
        BasicType::Int => env.ints,
        BasicType::Float => env.floats,
        BasicType::Bool => env.bools,
        BasicType::Char => env.chars,
    }
}

fn random_basic(g: &mut Gen) -> BasicType {
    match pick(g, 4) {
        0 => BasicType::Int,
        1 => BasicType::Float,
        2 => BasicType::Bool,
        _ => BasicType::Char,
    }
}

fn random_text(g: &mut Gen) -> String {
    const PIECES: &[&str] = &["a", "b", "z", " ", "\\n", "\\t", "\\\"", "\\\\", "0"];
    let len = 1 + pick(g, 6);
    (0..len).map(|_| PIECES[pick(g, PIECES.len())]).collect()
}

fn random_char(g: &mut Gen) -> String {
    const CHARS: &[&str] = &["a", "q", "Z", "0", " ", "\\n", "\\t"];
    CHARS[pick(g, CHARS.len())].to_string()
}

fn int_literal(n: i64) -> Expr {
    node(ExprKind::Literal(Literal::Int(n)))
}

fn ident_expr(name: &str) -> Expr {
    node(ExprKind::Ident(ident(name)))
}

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
    node(ExprKind::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn unary(op: UnaryOp, operand: Expr) -> Expr {
    node(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

/// An expression of type `ty` built only from names in `env`.
fn gen_expr(g: &mut Gen, env: &Env, ty: BasicType, depth: usize) -> Expr {
    if depth == 0 || pick(g, 3) == 0 {
        return gen_leaf(g, env, ty);
    }
    let depth = depth - 1;
    match ty {
        BasicType::Int => match pick(g, 5) {
            0 => {
                let ops = [
                    BinaryOp::Add,
                    BinaryOp::Sub,
                    BinaryOp::Mul,
                    BinaryOp::Div,
                    BinaryOp::Mod,
                ];
                let op = ops[pick(g, ops.len())];
                binary(
                    op,
                    gen_expr(g, env, ty, depth),
                    gen_expr(g, env, ty, depth),
                )
            }
            1 => unary(UnaryOp::Minus, gen_expr(g, env, ty, depth)),
            2 => node(ExprKind::Paren(Box::new(gen_expr(g, env, ty, depth)))),
            3 => node(ExprKind::Max(vec![
                gen_expr(g, env, ty, depth),
                gen_expr(g, env, ty, depth),
            ])),
            _ => match env.array {
                Some(array) => node(ExprKind::ArrayAccess(ArrayAccess {
                    base: ident(array),
                    index: Box::new(gen_expr(g, env, ty, depth)),
                })),
                None => gen_leaf(g, env, ty),
            },
        },
        BasicType::Float => match pick(g, 4) {
            0 => {
                let ops = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::Div];
                let op = ops[pick(g, ops.len())];
                let (lhs, rhs) = match pick(g, 3) {
                    0 => (BasicType::Float, BasicType::Int),
                    1 => (BasicType::Int, BasicType::Float),
                    _ => (BasicType::Float, BasicType::Float),
                };
                binary(
                    op,
                    gen_expr(g, env, lhs, depth),
                    gen_expr(g, env, rhs, depth),
                )
            }
            1 => unary(UnaryOp::Minus, gen_expr(g, env, ty, depth)),
            2 => node(ExprKind::Max(vec![
                gen_expr(g, env, BasicType::Int, depth),
                gen_expr(g, env, ty, depth),
                gen_expr(g, env, BasicType::Int, depth),
            ])),
            _ if env.calls => {
                let factor = random_numeric(g);
                node(ExprKind::Call(Call {
                    callee: ident("scale"),
                    args: vec![
                        gen_expr(g, env, BasicType::Int, depth),
                        gen_expr(g, env, factor, depth),
                    ],
                }))
            }
            _ => gen_leaf(g, env, ty),
        },
        BasicType::Bool => match pick(g, 4) {
            0 => {
                let ops = [
                    BinaryOp::Equal,
                    BinaryOp::NotEqual,
                    BinaryOp::LessThan,
                    BinaryOp::LessThanEqual,
                    BinaryOp::GreaterThan,
                    BinaryOp::GreaterThanEqual,
                ];
                let op = ops[pick(g, ops.len())];
                let (lhs, rhs) = if pick(g, 4) == 0 {
                    (BasicType::Char, BasicType::Char)
                } else {
                    (random_numeric(g), random_numeric(g))
                };
                binary(
                    op,
                    gen_expr(g, env, lhs, depth),
                    gen_expr(g, env, rhs, depth),
                )
            }
            1 => {
                let op = if bool::arbitrary(g) {
                    BinaryOp::And
                } else {
                    BinaryOp::Or
                };
                binary(
                    op,
                    gen_expr(g, env, ty, depth),
                    gen_expr(g, env, ty, depth),
                )
            }
            2 => unary(UnaryOp::Not, gen_expr(g, env, ty, depth)),
            _ => node(ExprKind::Paren(Box::new(gen_expr(g, env, ty, depth)))),
        },
        BasicType::Char => {
            if bool::arbitrary(g) {
                node(ExprKind::Max(vec![
                    gen_expr(g, env, ty, depth),
                    gen_expr(g, env, ty, depth),
                ]))
            } else {
                gen_leaf(g, env, ty)
            }
        }
    }
}

fn random_numeric(g: &mut Gen) -> BasicType {
    if bool::arbitrary(g) {
        BasicType::Int
    } else {
        BasicType::Float
    }
}

fn gen_leaf(g: &mut Gen, env: &Env, ty: BasicType) -> Expr {
    if bool::arbitrary(g) {
        if let Some(name) = pick_name(g, names_of(env, ty)) {
            return ident_expr(name);
        }
    }
    let literal = match ty {
        BasicType::Int => Literal::Int(i64::from(u8::arbitrary(g))),
        BasicType::Float => {
            Literal::Float(f64::from(u8::arbitrary(g)) + pick(g, 100) as f64 / 100.0)
        }
        BasicType::Bool => Literal::Bool(bool::arbitrary(g)),
        BasicType::Char => Literal::Char(random_char(g)),
    };
    node(ExprKind::Literal(literal))
}
