use std::fmt;

use crate::parse::{
    BasicType, BinaryOp, Call, Expr, ExprKind, Function, LeftExprKind, Literal, Program, Stmt,
    StmtKind, TypeSpec, UnaryOp, float_text,
};

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, function) in self.functions.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {}(", self.name.kind)?;
        for (idx, param) in self.params.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name.kind, param.r#type.kind)?;
        }
        write!(f, ")")?;
        if let Some(ret) = &self.return_type {
            write!(f, ": {}", ret.kind)?;
        }
        writeln!(f)?;

        for decl in &self.declarations {
            let names = decl
                .names
                .iter()
                .map(|n| n.kind.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f, "  var {names}: {}", decl.r#type.kind)?;
        }
        write_stmts(f, &self.body, 1)?;
        writeln!(f, "endfunc")
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BasicType::Int => "int",
            BasicType::Float => "float",
            BasicType::Bool => "bool",
            BasicType::Char => "char",
        })
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSpec::Basic(basic) => write!(f, "{basic}"),
            TypeSpec::Array { size, elem } => write!(f, "array[{size}] of {elem}"),
        }
    }
}

fn write_stmts(f: &mut fmt::Formatter<'_>, stmts: &[Stmt], depth: usize) -> fmt::Result {
    for stmt in stmts {
        write_stmt(f, stmt, depth)?;
    }
    Ok(())
}

fn write_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            write!(f, "{pad}")?;
            match &target.kind {
                LeftExprKind::Ident(ident) => write!(f, "{}", ident.kind)?,
                LeftExprKind::ArrayAccess(access) => {
                    write!(f, "{}[{}]", access.base.kind, access.index)?
                }
            }
            writeln!(f, " := {value};")
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            writeln!(f, "{pad}if {condition} then")?;
            write_stmts(f, then_branch, depth + 1)?;
            if let Some(else_branch) = else_branch {
                writeln!(f, "{pad}else")?;
                write_stmts(f, else_branch, depth + 1)?;
            }
            writeln!(f, "{pad}endif")
        }
        StmtKind::While { condition, body } => {
            writeln!(f, "{pad}while {condition} do")?;
            write_stmts(f, body, depth + 1)?;
            writeln!(f, "{pad}endwhile")
        }
        StmtKind::For {
            control,
            range,
            body,
        } => {
            writeln!(
                f,
                "{pad}for {} in range({}) do",
                control.kind,
                comma_separated(range)
            )?;
            write_stmts(f, body, depth + 1)?;
            writeln!(f, "{pad}endfor")
        }
        StmtKind::ProcCall(call) => writeln!(f, "{pad}{call};"),
        StmtKind::Read(target) => match &target.kind {
            LeftExprKind::Ident(ident) => writeln!(f, "{pad}read {};", ident.kind),
            LeftExprKind::ArrayAccess(access) => {
                writeln!(f, "{pad}read {}[{}];", access.base.kind, access.index)
            }
        },
        StmtKind::Write(expr) => writeln!(f, "{pad}write {expr};"),
        StmtKind::WriteString(text) => writeln!(f, "{pad}write \"{text}\";"),
        StmtKind::Return(None) => writeln!(f, "{pad}return;"),
        StmtKind::Return(Some(expr)) => writeln!(f, "{pad}return {expr};"),
    }
}

fn comma_separated(exprs: &[Expr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.callee.kind, comma_separated(&self.args))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => f.write_str(&float_text(*x)),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Char(c) => write!(f, "'{c}'"),
        }
    }
}

fn precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => 1,
        BinaryOp::And => 2,
        op if op.is_relational() => 3,
        BinaryOp::Add | BinaryOp::Sub => 4,
        _ => 5,
    }
}

/// Binding strength of an expression as a whole; atoms bind tightest.
fn strength(expr: &Expr) -> u8 {
    match &expr.kind {
        ExprKind::Binary { op, .. } => precedence(*op),
        ExprKind::Unary { .. } => 6,
        _ => 7,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(literal) => write!(f, "{literal}"),
            ExprKind::Ident(ident) => f.write_str(&ident.kind),
            ExprKind::ArrayAccess(access) => write!(f, "{}[{}]", access.base.kind, access.index),
            ExprKind::Call(call) => write!(f, "{call}"),
            ExprKind::Paren(inner) => write!(f, "({inner})"),
            ExprKind::Unary { op, operand } => {
                match op {
                    UnaryOp::Not => write!(f, "not ")?,
                    UnaryOp::Plus | UnaryOp::Minus => write!(f, "{}", op.symbol())?,
                }
                write_operand(f, operand, strength(operand) < 6)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let prec = precedence(*op);
                write_operand(f, lhs, strength(lhs) < prec)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, rhs, strength(rhs) <= prec)
            }
            ExprKind::Max(args) => write!(f, "max({})", comma_separated(args)),
        }
    }
}
