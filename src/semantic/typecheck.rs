use tracing::debug;

use crate::{
    parse::{
        ArrayAccess, BinaryOp, Call, Expr, ExprKind, Function, Ident, LeftExpr, LeftExprKind,
        Literal, NodeId, Program, Stmt, StmtKind, UnaryOp,
    },
    semantic::{
        decorations::Decorations,
        diagnostics::{SemErrors, SemanticError},
        error::AResult,
    },
    symtable::SymTable,
    types::{TypeId, TypesMgr},
};

/// Second pass: synthesizes a type and an lvalue flag for every expression
/// and reports each rule violation once. An `Error` operand silences every
/// check that depends on it.
pub struct TypeChecker<'a> {
    types: &'a mut TypesMgr,
    symbols: &'a mut SymTable,
    decorations: &'a mut Decorations,
    errors: &'a mut SemErrors,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        types: &'a mut TypesMgr,
        symbols: &'a mut SymTable,
        decorations: &'a mut Decorations,
        errors: &'a mut SemErrors,
    ) -> Self {
        Self {
            types,
            symbols,
            decorations,
            errors,
        }
    }

    pub fn check_program(&mut self, program: &Program) -> AResult<()> {
        let scope = self.decorations.get_scope(program.id)?;
        self.symbols.push_this_scope(scope)?;

        for function in &program.functions {
            self.check_function(function)?;
        }

        if self.symbols.no_main_properly_declared(&*self.types) {
            self.errors
                .add(program.id, 0, 0, SemanticError::NoMainProperlyDeclared);
        }

        self.symbols.pop_scope()?;
        Ok(())
    }

    fn check_function(&mut self, function: &Function) -> AResult<()> {
        let scope = self.decorations.get_scope(function.id)?;
        let ty = self.decorations.get_type(function.id)?;
        self.symbols.push_this_scope(scope)?;
        self.symbols.set_current_function_ty(ty);

        let before = self.errors.len();
        self.check_stmts(&function.body)?;
        debug!(
            function = %function.name.kind,
            diagnostics = self.errors.len() - before,
            "type checked"
        );

        self.symbols.pop_scope()?;
        Ok(())
    }

    fn check_stmts(&mut self, stmts: &[Stmt]) -> AResult<()> {
        for stmt in stmts {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> AResult<()> {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                let (t1, lvalue) = self.check_left_expr(target)?;
                let t2 = self.check_expr(value)?;
                if !self.is_error(t1) && !self.is_error(t2) && !self.types.copyable_types(t1, t2)
                {
                    let error = SemanticError::IncompatibleAssignment(
                        self.types.to_string(t1),
                        self.types.to_string(t2),
                    );
                    self.errors.report(stmt, error);
                }
                if !self.is_error(t1) && !lvalue {
                    self.errors
                        .report(target, SemanticError::NonReferenceableLeftExpr);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if")?;
                self.check_stmts(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_stmts(else_branch)?;
                }
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while")?;
                self.check_stmts(body)?;
            }
            StmtKind::For {
                control,
                range,
                body,
            } => {
                let (tc, _) = self.check_ident(control);
                if !self.is_error(tc) && !self.types.is_integer_ty(tc) {
                    self.errors
                        .report(control, SemanticError::ForRequireIntegerVar);
                }
                if range.is_empty() || range.len() > 3 {
                    self.errors
                        .report(stmt, SemanticError::NumberOfRangeExpressions(range.len()));
                }
                for expr in range {
                    let t = self.check_expr(expr)?;
                    if !self.is_error(t) && !self.types.is_integer_ty(t) {
                        self.errors.report(expr, SemanticError::ForRequireIntegerExpr);
                    }
                }
                self.check_stmts(body)?;
            }
            StmtKind::ProcCall(call) => {
                self.check_call(call, false)?;
            }
            StmtKind::Read(target) => {
                let (t, lvalue) = self.check_left_expr(target)?;
                if !self.is_error(t) && !self.types.is_primitive_ty(t) {
                    self.errors
                        .report(target, SemanticError::ReadWriteRequireBasic("read"));
                }
                if !self.is_error(t) && !lvalue {
                    self.errors
                        .report(target, SemanticError::NonReferenceableExpression);
                }
            }
            StmtKind::Write(expr) => {
                let t = self.check_expr(expr)?;
                if !self.is_error(t) && !self.types.is_primitive_ty(t) {
                    self.errors
                        .report(expr, SemanticError::ReadWriteRequireBasic("write"));
                }
            }
            StmtKind::WriteString(_) => {}
            StmtKind::Return(value) => {
                let function = self.symbols.current_function_ty()?;
                let ret = self.types.func_return_type(function);
                match value {
                    None => {
                        if !self.types.is_void_ty(ret) {
                            self.errors.report(stmt, SemanticError::IncompatibleReturn);
                        }
                    }
                    Some(expr) => {
                        let t = self.check_expr(expr)?;
                        if !self.is_error(t) && !self.types.copyable_types(ret, t) {
                            self.errors.report(stmt, SemanticError::IncompatibleReturn);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn check_condition(&mut self, condition: &Expr, instruction: &'static str) -> AResult<()> {
        let t = self.check_expr(condition)?;
        if !self.is_error(t) && !self.types.is_boolean_ty(t) {
            self.errors
                .report(condition, SemanticError::BooleanRequired(instruction));
        }
        Ok(())
    }

    fn check_left_expr(&mut self, left: &LeftExpr) -> AResult<(TypeId, bool)> {
        let (ty, lvalue) = match &left.kind {
            LeftExprKind::Ident(ident) => self.check_ident(ident),
            LeftExprKind::ArrayAccess(access) => self.check_array_access(access)?,
        };
        self.decorate(left.id, ty, lvalue);
        Ok((ty, lvalue))
    }

    /// Checks an expression, records its attributes and returns its type.
    fn check_expr(&mut self, expr: &Expr) -> AResult<TypeId> {
        let (ty, lvalue) = match &expr.kind {
            ExprKind::Literal(literal) => {
                let ty = match literal {
                    Literal::Int(_) => self.types.create_integer_ty(),
                    Literal::Float(_) => self.types.create_float_ty(),
                    Literal::Bool(_) => self.types.create_boolean_ty(),
                    Literal::Char(_) => self.types.create_character_ty(),
                };
                (ty, false)
            }
            ExprKind::Ident(ident) => self.check_ident(ident),
            ExprKind::ArrayAccess(access) => self.check_array_access(access)?,
            ExprKind::Call(call) => (self.check_call(call, true)?, false),
            ExprKind::Paren(inner) => {
                let ty = self.check_expr(inner)?;
                (ty, self.decorations.get_is_lvalue(inner.id)?)
            }
            ExprKind::Unary { op, operand } => {
                let t = self.check_expr(operand)?;
                (self.check_unary(expr, *op, t), false)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let t1 = self.check_expr(lhs)?;
                let t2 = self.check_expr(rhs)?;
                (self.check_binary(expr, *op, t1, t2), false)
            }
            ExprKind::Max(args) => (self.check_max(expr, args)?, false),
        };
        self.decorate(expr.id, ty, lvalue);
        Ok(ty)
    }

    fn check_ident(&mut self, ident: &Ident) -> (TypeId, bool) {
        let name = ident.kind.as_str();
        let (ty, lvalue) = match self.symbols.get_type(name) {
            Some(ty) => (ty, !self.symbols.is_function_class(name)),
            None => {
                self.errors
                    .report(ident, SemanticError::UndeclaredIdent(name.to_string()));
                (self.types.create_error_ty(), true)
            }
        };
        self.decorate(ident.id, ty, lvalue);
        (ty, lvalue)
    }

    fn check_array_access(&mut self, access: &ArrayAccess) -> AResult<(TypeId, bool)> {
        let (base, _) = self.check_ident(&access.base);
        let index = self.check_expr(&access.index)?;

        let mut valid = !self.is_error(base);
        if valid && !self.types.is_array_ty(base) {
            self.errors.report(
                &access.base,
                SemanticError::NonArrayInArrayAccess(access.base.kind.clone()),
            );
            valid = false;
        }
        if !self.is_error(index) && !self.types.is_integer_ty(index) {
            self.errors
                .report(&*access.index, SemanticError::NonIntegerIndexInArrayAccess);
            valid = false;
        }

        if valid {
            Ok((self.types.array_elem_type(base), true))
        } else {
            Ok((self.types.create_error_ty(), false))
        }
    }

    fn check_call(&mut self, call: &Call, as_value: bool) -> AResult<TypeId> {
        let name = call.callee.kind.as_str();
        let (callee, _) = self.check_ident(&call.callee);
        let args = call
            .args
            .iter()
            .map(|arg| self.check_expr(arg))
            .collect::<AResult<Vec<_>>>()?;

        if self.is_error(callee) {
            return Ok(self.types.create_error_ty());
        }
        if !self.types.is_function_ty(callee) {
            self.errors
                .report(&call.callee, SemanticError::NotCallable(name.to_string()));
            return Ok(self.types.create_error_ty());
        }

        let expected = self.types.num_of_parameters(callee);
        if expected != args.len() {
            self.errors.report(
                &call.callee,
                SemanticError::NumberOfParameters(name.to_string(), expected, args.len()),
            );
        }
        for (i, (arg, ty)) in call.args.iter().zip(&args).enumerate() {
            let Some(param) = self.types.parameter_type(callee, i) else {
                break;
            };
            if !self.is_error(*ty) && !self.types.copyable_types(param, *ty) {
                self.errors.report(
                    arg,
                    SemanticError::IncompatibleParameter(i + 1, name.to_string()),
                );
            }
        }

        let ret = self.types.func_return_type(callee);
        if as_value && self.types.is_void_ty(ret) {
            self.errors
                .report(&call.callee, SemanticError::IsNotFunction(name.to_string()));
            return Ok(self.types.create_error_ty());
        }
        Ok(ret)
    }

    fn check_unary(&mut self, expr: &Expr, op: UnaryOp, t: TypeId) -> TypeId {
        match op {
            UnaryOp::Not => {
                if !self.is_error(t) && !self.types.is_boolean_ty(t) {
                    self.errors
                        .report(expr, SemanticError::IncompatibleOperator(op.symbol()));
                }
                self.types.create_boolean_ty()
            }
            UnaryOp::Plus | UnaryOp::Minus => {
                if self.is_error(t) || self.types.is_numeric_ty(t) {
                    t
                } else {
                    self.errors
                        .report(expr, SemanticError::IncompatibleOperator(op.symbol()));
                    self.types.create_error_ty()
                }
            }
        }
    }

    fn check_binary(&mut self, expr: &Expr, op: BinaryOp, t1: TypeId, t2: TypeId) -> TypeId {
        let operand_error = self.is_error(t1) || self.is_error(t2);

        if op.is_arithmetic() {
            if operand_error {
                return self.types.create_error_ty();
            }
            let valid = if op == BinaryOp::Mod {
                self.types.is_integer_ty(t1) && self.types.is_integer_ty(t2)
            } else {
                self.types.is_numeric_ty(t1) && self.types.is_numeric_ty(t2)
            };
            if !valid {
                self.errors
                    .report(expr, SemanticError::IncompatibleOperator(op.symbol()));
                return self.types.create_error_ty();
            }
            return if self.types.is_float_ty(t1) || self.types.is_float_ty(t2) {
                self.types.create_float_ty()
            } else {
                self.types.create_integer_ty()
            };
        }

        let valid = if op.is_relational() {
            self.types.comparable_types(t1, t2, op)
        } else {
            self.types.is_boolean_ty(t1) && self.types.is_boolean_ty(t2)
        };
        if !operand_error && !valid {
            self.errors
                .report(expr, SemanticError::IncompatibleOperator(op.symbol()));
        }
        self.types.create_boolean_ty()
    }

    fn check_max(&mut self, expr: &Expr, args: &[Expr]) -> AResult<TypeId> {
        let tys = args
            .iter()
            .map(|arg| self.check_expr(arg))
            .collect::<AResult<Vec<_>>>()?;

        if tys.len() < 2 {
            self.errors
                .report(expr, SemanticError::NumberOfMaxArguments(tys.len()));
            return Ok(self.types.create_error_ty());
        }
        if tys.iter().any(|t| self.is_error(*t)) {
            return Ok(self.types.create_error_ty());
        }

        if tys.iter().all(|t| self.types.is_numeric_ty(*t)) {
            if tys.iter().any(|t| self.types.is_float_ty(*t)) {
                Ok(self.types.create_float_ty())
            } else {
                Ok(self.types.create_integer_ty())
            }
        } else if tys.iter().all(|t| self.types.is_character_ty(*t)) {
            Ok(self.types.create_character_ty())
        } else {
            self.errors
                .report(expr, SemanticError::IncompatibleMaxArguments);
            Ok(self.types.create_error_ty())
        }
    }

    fn decorate(&mut self, node: NodeId, ty: TypeId, lvalue: bool) {
        self.decorations.put_type(node, ty);
        self.decorations.put_is_lvalue(node, lvalue);
    }

    fn is_error(&self, t: TypeId) -> bool {
        self.types.is_error_ty(t)
    }
}
