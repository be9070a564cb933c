mod error;
mod types;

use tracing::debug;

pub use crate::tacky::{
    error::{IRError, IResult},
    types::{Instruction, InstructionList, Opcode, Program, Subroutine, Var},
};
use crate::{
    parse::{
        ArrayAccess, BinaryOp, Call, Expr, ExprKind, Function, LeftExpr, LeftExprKind, Literal,
        Program as AstProgram, Stmt, StmtKind, UnaryOp, float_text,
    },
    semantic::Decorations,
    symtable::SymTable,
    types::{TypeId, TypesMgr},
};

/// Name of the return slot a caller reserves for a non-void callee.
pub const RESULT_SLOT: &str = "_result";

/// Temporary and label numbering. Reset at the start of every function.
#[derive(Debug, Default)]
struct CodeCounters {
    tmp: usize,
    if_label: usize,
    while_label: usize,
}

impl CodeCounters {
    fn fresh_tmp(&mut self) -> String {
        self.tmp += 1;
        format!("%t{}", self.tmp)
    }

    fn fresh_if_label(&mut self) -> usize {
        self.if_label += 1;
        self.if_label
    }

    fn fresh_while_label(&mut self) -> usize {
        self.while_label += 1;
        self.while_label
    }
}

/// Storage a statement writes to.
enum Place {
    Scalar(String),
    Element { base: String, index: String },
}

/// Loop test of a `for`, chosen from the sign of its step.
enum StepDirection {
    Up,
    Down,
    /// Temporary holding `0 < step`.
    Unknown(String),
}

/// Value of an integer constant written with optional signs and parentheses.
fn constant_int(expr: &Expr) -> Option<i64> {
    match &expr.kind {
        ExprKind::Literal(Literal::Int(n)) => Some(*n),
        ExprKind::Paren(inner) => constant_int(inner),
        ExprKind::Unary {
            op: UnaryOp::Plus,
            operand,
        } => constant_int(operand),
        ExprKind::Unary {
            op: UnaryOp::Minus,
            operand,
        } => constant_int(operand)?.checked_neg(),
        _ => None,
    }
}

/// Lowers a type-checked program to three-address code. Must only run when
/// the checker logged no diagnostics.
pub struct TackyGen<'a> {
    types: &'a TypesMgr,
    symbols: &'a mut SymTable,
    decorations: &'a Decorations,
    counters: CodeCounters,
}

impl<'a> TackyGen<'a> {
    pub fn new(
        types: &'a TypesMgr,
        symbols: &'a mut SymTable,
        decorations: &'a Decorations,
    ) -> Self {
        Self {
            types,
            symbols,
            decorations,
            counters: CodeCounters::default(),
        }
    }

    pub fn codegen(&mut self, program: &AstProgram) -> IResult<Program> {
        let scope = self.decorations.get_scope(program.id)?;
        self.symbols.push_this_scope(scope)?;

        let mut subroutines = Vec::with_capacity(program.functions.len());
        for function in &program.functions {
            subroutines.push(self.gen_function(function)?);
        }

        self.symbols.pop_scope()?;
        Ok(Program { subroutines })
    }

    fn gen_function(&mut self, function: &Function) -> IResult<Subroutine> {
        let scope = self.decorations.get_scope(function.id)?;
        let ty = self.decorations.get_type(function.id)?;
        self.symbols.push_this_scope(scope)?;
        self.symbols.set_current_function_ty(ty);
        self.counters = CodeCounters::default();

        let mut params = Vec::with_capacity(function.params.len() + 1);
        if !self.types.is_void_function(ty) {
            params.push(RESULT_SLOT.to_string());
        }
        params.extend(function.params.iter().map(|p| p.name.kind.clone()));

        let mut vars = Vec::new();
        for decl in &function.declarations {
            let size = self
                .types
                .size_of(self.decorations.get_type(decl.r#type.id)?);
            vars.extend(decl.names.iter().map(|name| Var {
                name: name.kind.clone(),
                size,
            }));
        }

        let mut instructions = Vec::new();
        self.gen_stmts(&function.body, &mut instructions)?;

        if self.types.is_void_function(ty)
            && instructions.last().map(|i| i.opcode) != Some(Opcode::Return)
        {
            instructions.push(Instruction::op0(Opcode::Return));
        }

        debug!(
            function = %function.name.kind,
            instructions = instructions.len(),
            temporaries = self.counters.tmp,
            "generated"
        );

        self.symbols.pop_scope()?;
        Ok(Subroutine {
            name: function.name.kind.clone(),
            params,
            vars,
            instructions,
        })
    }

    fn gen_stmts(&mut self, stmts: &[Stmt], code: &mut InstructionList) -> IResult<()> {
        for stmt in stmts {
            self.gen_stmt(stmt, code)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &Stmt, code: &mut InstructionList) -> IResult<()> {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                let target_ty = self.decorations.get_type(target.id)?;
                if self.types.is_array_ty(target_ty) {
                    let LeftExprKind::Ident(dst) = &target.kind else {
                        return Err(IRError::BadArrayOperand("an indexed target"));
                    };
                    let size = self.types.array_size(target_ty);
                    self.gen_array_copy(&dst.kind, value, size, code)?;
                    return Ok(());
                }

                let value_ty = self.decorations.get_type(value.id)?;
                let place = self.gen_place(target, code)?;
                let src = self.gen_expr(value, code)?;
                let src = self.coerce(src, value_ty, target_ty, code);
                match place {
                    Place::Scalar(name) => code.push(Instruction::op2(Opcode::Load, name, src)),
                    Place::Element { base, index } => {
                        code.push(Instruction::op3(Opcode::XLoad, base, index, src))
                    }
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.gen_expr(condition, code)?;
                let n = self.counters.fresh_if_label();
                let end = format!("endif{n}");
                match else_branch {
                    None => {
                        code.push(Instruction::op2(Opcode::FJump, cond, &end));
                        self.gen_stmts(then_branch, code)?;
                    }
                    Some(else_branch) => {
                        let otherwise = format!("else{n}");
                        code.push(Instruction::op2(Opcode::FJump, cond, &otherwise));
                        self.gen_stmts(then_branch, code)?;
                        code.push(Instruction::op1(Opcode::UJump, &end));
                        code.push(Instruction::op1(Opcode::Label, otherwise));
                        self.gen_stmts(else_branch, code)?;
                    }
                }
                code.push(Instruction::op1(Opcode::Label, end));
            }
            StmtKind::While { condition, body } => {
                let n = self.counters.fresh_while_label();
                let start = format!("while{n}");
                let end = format!("endwhile{n}");
                code.push(Instruction::op1(Opcode::Label, &start));
                let cond = self.gen_expr(condition, code)?;
                code.push(Instruction::op2(Opcode::FJump, cond, &end));
                self.gen_stmts(body, code)?;
                code.push(Instruction::op1(Opcode::UJump, start));
                code.push(Instruction::op1(Opcode::Label, end));
            }
            StmtKind::For {
                control,
                range,
                body,
            } => self.gen_for(&control.kind, range, body, code)?,
            StmtKind::ProcCall(call) => {
                self.gen_call(call, false, code)?;
            }
            StmtKind::Read(target) => {
                let ty = self.decorations.get_type(target.id)?;
                let opcode = self.read_opcode(ty);
                match self.gen_place(target, code)? {
                    Place::Scalar(name) => code.push(Instruction::op1(opcode, name)),
                    Place::Element { base, index } => {
                        let tmp = self.counters.fresh_tmp();
                        code.push(Instruction::op1(opcode, &tmp));
                        code.push(Instruction::op3(Opcode::XLoad, base, index, tmp));
                    }
                }
            }
            StmtKind::Write(expr) => {
                let ty = self.decorations.get_type(expr.id)?;
                let value = self.gen_expr(expr, code)?;
                code.push(Instruction::op1(self.write_opcode(ty), value));
            }
            StmtKind::WriteString(text) => self.gen_write_string(text, code),
            StmtKind::Return(value) => {
                if let Some(expr) = value {
                    let function = self.symbols.current_function_ty()?;
                    let ret = self.types.func_return_type(function);
                    let expr_ty = self.decorations.get_type(expr.id)?;
                    let src = self.gen_expr(expr, code)?;
                    let src = self.coerce(src, expr_ty, ret, code);
                    code.push(Instruction::op2(Opcode::Load, RESULT_SLOT, src));
                }
                code.push(Instruction::op0(Opcode::Return));
            }
        }
        Ok(())
    }

    fn gen_place(&mut self, target: &LeftExpr, code: &mut InstructionList) -> IResult<Place> {
        Ok(match &target.kind {
            LeftExprKind::Ident(ident) => Place::Scalar(ident.kind.clone()),
            LeftExprKind::ArrayAccess(access) => {
                let (base, index) = self.gen_element(access, code)?;
                Place::Element { base, index }
            }
        })
    }

    /// Emits the index computation and returns the base address and index
    /// of an element.
    fn gen_element(
        &mut self,
        access: &ArrayAccess,
        code: &mut InstructionList,
    ) -> IResult<(String, String)> {
        let index = self.gen_expr(&access.index, code)?;
        let base = self.array_base(&access.base.kind, code);
        Ok((base, index))
    }

    /// Arrays received as parameters hold a reference that must be loaded
    /// before indexing; local arrays are addressed directly.
    fn array_base(&mut self, name: &str, code: &mut InstructionList) -> String {
        if self.symbols.is_parameter_class(name) {
            let tmp = self.counters.fresh_tmp();
            code.push(Instruction::op2(Opcode::Load, &tmp, name));
            tmp
        } else {
            name.to_string()
        }
    }

    fn gen_array_copy(
        &mut self,
        dst: &str,
        value: &Expr,
        size: usize,
        code: &mut InstructionList,
    ) -> IResult<()> {
        let src = match &value.kind {
            ExprKind::Ident(_) | ExprKind::Paren(_) => self.gen_expr(value, code)?,
            _ => return Err(IRError::BadArrayOperand("a computed value")),
        };
        let src_base = self.array_base(&src, code);
        let dst_base = self.array_base(dst, code);
        let index = self.counters.fresh_tmp();
        let elem = self.counters.fresh_tmp();
        for k in 0..size {
            code.push(Instruction::op2(Opcode::ILoad, &index, k.to_string()));
            code.push(Instruction::op3(Opcode::LoadX, &elem, &src_base, &index));
            code.push(Instruction::op3(Opcode::XLoad, &dst_base, &index, &elem));
        }
        Ok(())
    }

    fn gen_for(
        &mut self,
        control: &str,
        range: &[Expr],
        body: &[Stmt],
        code: &mut InstructionList,
    ) -> IResult<()> {
        let mut bounds = Vec::with_capacity(range.len());
        for expr in range {
            let value = self.gen_expr(expr, code)?;
            bounds.push(self.materialize(value, code));
        }
        let mut bounds = bounds.into_iter();
        let (start, end) = match (bounds.next(), bounds.next()) {
            (Some(end), None) => (self.immediate("0", code), end),
            (Some(start), Some(end)) => (start, end),
            _ => return Ok(()),
        };
        let step = match bounds.next() {
            Some(step) => step,
            None => self.immediate("1", code),
        };

        // A constant step fixes the loop test; any other step has its sign
        // tested once, before the loop.
        let direction = match range.get(2).map_or(Some(1), constant_int) {
            Some(k) if k > 0 => StepDirection::Up,
            Some(k) if k < 0 => StepDirection::Down,
            _ => {
                let zero = self.immediate("0", code);
                let up = self.counters.fresh_tmp();
                code.push(Instruction::op3(Opcode::Lt, &up, zero, &step));
                StepDirection::Unknown(up)
            }
        };

        let n = self.counters.fresh_while_label();
        let head = format!("for{n}");
        let exit = format!("endfor{n}");
        let cond = self.counters.fresh_tmp();

        code.push(Instruction::op2(Opcode::Load, control, start));
        code.push(Instruction::op1(Opcode::Label, &head));
        match direction {
            StepDirection::Up => code.push(Instruction::op3(Opcode::Lt, &cond, control, &end)),
            StepDirection::Down => code.push(Instruction::op3(Opcode::Lt, &cond, &end, control)),
            StepDirection::Unknown(up) => {
                let down = format!("fordown{n}");
                let test = format!("fortest{n}");
                code.push(Instruction::op2(Opcode::FJump, up, &down));
                code.push(Instruction::op3(Opcode::Lt, &cond, control, &end));
                code.push(Instruction::op1(Opcode::UJump, &test));
                code.push(Instruction::op1(Opcode::Label, down));
                code.push(Instruction::op3(Opcode::Lt, &cond, &end, control));
                code.push(Instruction::op1(Opcode::Label, test));
            }
        }
        code.push(Instruction::op2(Opcode::FJump, cond, &exit));
        self.gen_stmts(body, code)?;
        code.push(Instruction::op3(Opcode::Add, control, control, step));
        code.push(Instruction::op1(Opcode::UJump, head));
        code.push(Instruction::op1(Opcode::Label, exit));
        Ok(())
    }

    fn gen_write_string(&mut self, text: &str, code: &mut InstructionList) {
        let tmp = self.counters.fresh_tmp();
        let write_char = |code: &mut InstructionList, c: &str| {
            code.push(Instruction::op2(Opcode::ChLoad, &tmp, c));
            code.push(Instruction::op1(Opcode::WriteC, &tmp));
        };

        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\\' {
                write_char(code, c.encode_utf8(&mut [0; 4]));
                continue;
            }
            match chars.peek().copied() {
                Some('n') => {
                    chars.next();
                    code.push(Instruction::op0(Opcode::WriteLn));
                }
                Some(escaped @ ('t' | '"' | '\\')) => {
                    chars.next();
                    write_char(code, &format!("\\{escaped}"));
                }
                _ => write_char(code, "\\"),
            }
        }
    }

    /// Emits the code of an expression and returns the name holding its value.
    fn gen_expr(&mut self, expr: &Expr, code: &mut InstructionList) -> IResult<String> {
        match &expr.kind {
            ExprKind::Literal(literal) => {
                let tmp = self.counters.fresh_tmp();
                code.push(match literal {
                    Literal::Int(n) => Instruction::op2(Opcode::ILoad, &tmp, n.to_string()),
                    Literal::Bool(b) => {
                        Instruction::op2(Opcode::ILoad, &tmp, if *b { "1" } else { "0" })
                    }
                    Literal::Float(x) => Instruction::op2(Opcode::FLoad, &tmp, float_text(*x)),
                    Literal::Char(c) => Instruction::op2(Opcode::ChLoad, &tmp, c),
                });
                Ok(tmp)
            }
            ExprKind::Ident(ident) => Ok(ident.kind.clone()),
            ExprKind::ArrayAccess(access) => {
                let (base, index) = self.gen_element(access, code)?;
                let tmp = self.counters.fresh_tmp();
                code.push(Instruction::op3(Opcode::LoadX, &tmp, base, index));
                Ok(tmp)
            }
            ExprKind::Call(call) => self
                .gen_call(call, true, code)?
                .ok_or_else(|| IRError::NoValue(call.callee.kind.clone())),
            ExprKind::Paren(inner) => self.gen_expr(inner, code),
            ExprKind::Unary { op, operand } => {
                let value = self.gen_expr(operand, code)?;
                let opcode = match op {
                    UnaryOp::Plus => return Ok(value),
                    UnaryOp::Not => Opcode::Not,
                    UnaryOp::Minus if self.is_float(expr)? => Opcode::FNeg,
                    UnaryOp::Minus => Opcode::Neg,
                };
                let tmp = self.counters.fresh_tmp();
                code.push(Instruction::op2(opcode, &tmp, value));
                Ok(tmp)
            }
            ExprKind::Binary { op, lhs, rhs } => self.gen_binary(*op, lhs, rhs, code),
            ExprKind::Max(args) => self.gen_max(expr, args, code),
        }
    }

    fn gen_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        code: &mut InstructionList,
    ) -> IResult<String> {
        let a = self.gen_expr(lhs, code)?;
        let b = self.gen_expr(rhs, code)?;
        let (ta, tb) = (
            self.decorations.get_type(lhs.id)?,
            self.decorations.get_type(rhs.id)?,
        );
        let float = self.types.is_float_ty(ta) || self.types.is_float_ty(tb);
        let (a, b) = if float {
            (self.to_float(a, ta, code), self.to_float(b, tb, code))
        } else {
            (a, b)
        };

        let pick = |int, fl| if float { fl } else { int };
        let result = self.counters.fresh_tmp();
        match op {
            BinaryOp::Mod => {
                let quotient = self.counters.fresh_tmp();
                let product = self.counters.fresh_tmp();
                code.push(Instruction::op3(Opcode::Div, &quotient, &a, &b));
                code.push(Instruction::op3(Opcode::Mul, &product, &quotient, &b));
                code.push(Instruction::op3(Opcode::Sub, &result, &a, &product));
            }
            BinaryOp::NotEqual | BinaryOp::GreaterThan | BinaryOp::GreaterThanEqual => {
                let opcode = match op {
                    BinaryOp::NotEqual => pick(Opcode::Eq, Opcode::FEq),
                    BinaryOp::GreaterThan => pick(Opcode::Le, Opcode::FLe),
                    _ => pick(Opcode::Lt, Opcode::FLt),
                };
                code.push(Instruction::op3(opcode, &result, &a, &b));
                code.push(Instruction::op2(Opcode::Not, &result, &result));
            }
            _ => {
                let opcode = match op {
                    BinaryOp::Add => pick(Opcode::Add, Opcode::FAdd),
                    BinaryOp::Sub => pick(Opcode::Sub, Opcode::FSub),
                    BinaryOp::Mul => pick(Opcode::Mul, Opcode::FMul),
                    BinaryOp::Div => pick(Opcode::Div, Opcode::FDiv),
                    BinaryOp::Equal => pick(Opcode::Eq, Opcode::FEq),
                    BinaryOp::LessThan => pick(Opcode::Lt, Opcode::FLt),
                    BinaryOp::LessThanEqual => pick(Opcode::Le, Opcode::FLe),
                    BinaryOp::And => Opcode::And,
                    _ => Opcode::Or,
                };
                code.push(Instruction::op3(opcode, &result, a, b));
            }
        }
        Ok(result)
    }

    fn gen_max(
        &mut self,
        expr: &Expr,
        args: &[Expr],
        code: &mut InstructionList,
    ) -> IResult<String> {
        let ty = self.decorations.get_type(expr.id)?;
        let compare = if self.types.is_float_ty(ty) {
            Opcode::FLt
        } else {
            Opcode::Lt
        };
        let (first, rest) = args.split_first().ok_or(IRError::EmptyMax)?;

        let result = self.counters.fresh_tmp();
        let first_ty = self.decorations.get_type(first.id)?;
        let value = self.gen_expr(first, code)?;
        let value = self.coerce(value, first_ty, ty, code);
        code.push(Instruction::op2(Opcode::Load, &result, value));

        for arg in rest {
            let arg_ty = self.decorations.get_type(arg.id)?;
            let value = self.gen_expr(arg, code)?;
            let value = self.coerce(value, arg_ty, ty, code);
            let cond = self.counters.fresh_tmp();
            let skip = format!("endmax{}", self.counters.fresh_if_label());
            code.push(Instruction::op3(compare, &cond, &result, &value));
            code.push(Instruction::op2(Opcode::FJump, cond, &skip));
            code.push(Instruction::op2(Opcode::Load, &result, value));
            code.push(Instruction::op1(Opcode::Label, skip));
        }
        Ok(result)
    }

    /// Returns the temporary holding the call's value, if it has one and
    /// `as_value` asks for it.
    fn gen_call(
        &mut self,
        call: &Call,
        as_value: bool,
        code: &mut InstructionList,
    ) -> IResult<Option<String>> {
        let name = call.callee.kind.as_str();
        let callee = self
            .symbols
            .get_type(name)
            .ok_or_else(|| IRError::UnknownIdent(name.to_string()))?;
        if !self.types.is_function_ty(callee) {
            return Err(IRError::NotAFunction(name.to_string()));
        }
        let returns_value = !self.types.is_void_function(callee);
        if as_value && !returns_value {
            return Err(IRError::NoValue(name.to_string()));
        }

        if returns_value {
            code.push(Instruction::op0(Opcode::Push));
        }
        for (i, arg) in call.args.iter().enumerate() {
            let param = self
                .types
                .parameter_type(callee, i)
                .ok_or_else(|| IRError::TooManyArguments(name.to_string()))?;
            let arg_ty = self.decorations.get_type(arg.id)?;
            let value = self.gen_expr(arg, code)?;
            let pushed = if !self.types.is_array_ty(param) {
                self.coerce(value, arg_ty, param, code)
            } else if self.symbols.is_parameter_class(&value) {
                value
            } else {
                let tmp = self.counters.fresh_tmp();
                code.push(Instruction::op2(Opcode::ALoad, &tmp, value));
                tmp
            };
            code.push(Instruction::op1(Opcode::Push, pushed));
        }
        code.push(Instruction::op1(Opcode::Call, name));
        code.extend(call.args.iter().map(|_| Instruction::op0(Opcode::Pop)));

        if !returns_value {
            return Ok(None);
        }
        if as_value {
            let tmp = self.counters.fresh_tmp();
            code.push(Instruction::op1(Opcode::Pop, &tmp));
            Ok(Some(tmp))
        } else {
            code.push(Instruction::op0(Opcode::Pop));
            Ok(None)
        }
    }

    /// Inserts an integer to float conversion when `to` is Float and `from`
    /// is Integer; otherwise returns `value` untouched.
    fn coerce(
        &mut self,
        value: String,
        from: TypeId,
        to: TypeId,
        code: &mut InstructionList,
    ) -> String {
        if self.types.is_float_ty(to) {
            self.to_float(value, from, code)
        } else {
            value
        }
    }

    fn to_float(&mut self, value: String, from: TypeId, code: &mut InstructionList) -> String {
        if !self.types.is_integer_ty(from) {
            return value;
        }
        let tmp = self.counters.fresh_tmp();
        code.push(Instruction::op2(Opcode::Float, &tmp, value));
        tmp
    }

    /// Copies a named value into a fresh temporary so later writes to the
    /// variable do not affect it.
    fn materialize(&mut self, value: String, code: &mut InstructionList) -> String {
        if value.starts_with('%') {
            return value;
        }
        let tmp = self.counters.fresh_tmp();
        code.push(Instruction::op2(Opcode::Load, &tmp, value));
        tmp
    }

    fn immediate(&mut self, n: &str, code: &mut InstructionList) -> String {
        let tmp = self.counters.fresh_tmp();
        code.push(Instruction::op2(Opcode::ILoad, &tmp, n));
        tmp
    }

    fn is_float(&self, expr: &Expr) -> IResult<bool> {
        Ok(self
            .types
            .is_float_ty(self.decorations.get_type(expr.id)?))
    }

    fn read_opcode(&self, ty: TypeId) -> Opcode {
        if self.types.is_float_ty(ty) {
            Opcode::ReadF
        } else if self.types.is_character_ty(ty) {
            Opcode::ReadC
        } else {
            Opcode::ReadI
        }
    }

    fn write_opcode(&self, ty: TypeId) -> Opcode {
        if self.types.is_float_ty(ty) {
            Opcode::WriteF
        } else if self.types.is_character_ty(ty) {
            Opcode::WriteC
        } else {
            Opcode::WriteI
        }
    }
}
