pub mod error;

use std::fmt;

pub use crate::parse::error::{PResult, ParserError};
use crate::tokenize::{Token, TokenKind};

/// Identity of a tree node. Assigned by the parser, unique within one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<Kind> {
    pub id: NodeId,
    pub kind: Kind,
    pub start: usize,
    pub end: usize,
}

pub type Expr = Node<ExprKind>;
pub type Stmt = Node<StmtKind>;
pub type Ident = Node<String>;
pub type LeftExpr = Node<LeftExprKind>;
pub type TypeAnnotation = Node<TypeSpec>;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: NodeId,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub id: NodeId,
    pub name: Ident,
    pub params: Vec<Parameter>,
    pub return_type: Option<TypeAnnotation>,
    pub declarations: Vec<VariableDecl>,
    pub body: Vec<Stmt>,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Ident,
    pub r#type: TypeAnnotation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub names: Vec<Ident>,
    pub r#type: TypeAnnotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicType {
    Int,
    Float,
    Bool,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    Basic(BasicType),
    Array { size: usize, elem: BasicType },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub base: Ident,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeftExprKind {
    Ident(Ident),
    ArrayAccess(ArrayAccess),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Assign {
        target: LeftExpr,
        value: Expr,
    },
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
    For {
        control: Ident,
        range: Vec<Expr>,
        body: Vec<Stmt>,
    },
    ProcCall(Call),
    Read(LeftExpr),
    Write(Expr),
    /// Raw literal text between the quotes; escapes are decoded by code generation.
    WriteString(String),
    Return(Option<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Raw text between the quotes, e.g. `a` or `\n`.
    Char(String),
}

/// Decimal text of a float in the `digits.digits` form the lexer reads back.
/// Never uses an exponent.
pub fn float_text(x: f64) -> String {
    let text = x.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Add | BinaryOp::Sub
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::LessThan
                | BinaryOp::LessThanEqual
                | BinaryOp::GreaterThan
                | BinaryOp::GreaterThanEqual
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::LessThan => "<",
            BinaryOp::LessThanEqual => "<=",
            BinaryOp::GreaterThan => ">",
            BinaryOp::GreaterThanEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Ident(Ident),
    ArrayAccess(ArrayAccess),
    Call(Call),
    Paren(Box<Expr>),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Max(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    index: usize,
    next_id: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            index: 0,
            next_id: 0,
        }
    }

    pub fn parse(&mut self) -> PResult<Program> {
        let id = self.fresh_id();
        let mut functions = Vec::new();
        while self.pos < self.tokens.len() {
            functions.push(self.function()?);
        }
        self.ensure_done()?;
        if functions.is_empty() {
            return Err(ParserError::EmptyProgram);
        }
        Ok(Program { id, functions })
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn node<K>(&mut self, kind: K, start: usize) -> Node<K> {
        Node {
            id: self.fresh_id(),
            kind,
            start,
            end: self.index,
        }
    }

    fn function(&mut self) -> PResult<Function> {
        let Token { start, .. } = self.peek()?;
        let id = self.fresh_id();
        self.expect(&TokenKind::Func)?;
        let name = self.ident()?;
        self.expect(&TokenKind::LParen)?;
        let params = self.parameters()?;
        self.expect(&TokenKind::RParen)?;

        let return_type = if matches!(self.peek_kind(), Some(TokenKind::Colon)) {
            self.advance()?;
            let Token { start, .. } = self.peek()?;
            let basic = self.basic_type()?;
            Some(self.node(TypeSpec::Basic(basic), start))
        } else {
            None
        };

        let declarations = self.declarations()?;
        let body = self.statements()?;
        self.expect(&TokenKind::EndFunc)?;

        Ok(Function {
            id,
            name,
            params,
            return_type,
            declarations,
            body,
            start,
            end: self.index,
        })
    }

    fn parameters(&mut self) -> PResult<Vec<Parameter>> {
        let mut params = Vec::new();
        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            return Ok(params);
        }
        loop {
            let name = self.ident()?;
            self.expect(&TokenKind::Colon)?;
            let r#type = self.type_annotation()?;
            params.push(Parameter { name, r#type });
            if matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                self.advance()?;
                continue;
            }
            break;
        }
        Ok(params)
    }

    fn declarations(&mut self) -> PResult<Vec<VariableDecl>> {
        let mut decls = Vec::new();
        while matches!(self.peek_kind(), Some(TokenKind::Var)) {
            self.advance()?;
            let mut names = vec![self.ident()?];
            while matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                self.advance()?;
                names.push(self.ident()?);
            }
            self.expect(&TokenKind::Colon)?;
            let r#type = self.type_annotation()?;
            decls.push(VariableDecl { names, r#type });
        }
        Ok(decls)
    }

    fn type_annotation(&mut self) -> PResult<TypeAnnotation> {
        let Token { start, .. } = self.peek()?;
        let spec = if matches!(self.peek_kind(), Some(TokenKind::Array)) {
            self.advance()?;
            self.expect(&TokenKind::LBracket)?;
            let size = match self.peek_kind() {
                Some(TokenKind::IntLiteral(n)) => {
                    self.advance()?;
                    if n <= 0 {
                        return Err(ParserError::InvalidArraySize(n));
                    }
                    usize::try_from(n).map_err(|_| ParserError::InvalidArraySize(n))?
                }
                other => {
                    return Err(ParserError::ExpectedToken(TokenKind::IntLiteral(0), other));
                }
            };
            self.expect(&TokenKind::RBracket)?;
            self.expect(&TokenKind::Of)?;
            let elem = self.basic_type()?;
            TypeSpec::Array { size, elem }
        } else {
            TypeSpec::Basic(self.basic_type()?)
        };
        Ok(self.node(spec, start))
    }

    fn basic_type(&mut self) -> PResult<BasicType> {
        let basic = match self.peek_kind() {
            Some(TokenKind::Int) => BasicType::Int,
            Some(TokenKind::Float) => BasicType::Float,
            Some(TokenKind::BoolType) => BasicType::Bool,
            Some(TokenKind::Char) => BasicType::Char,
            other => return Err(ParserError::ExpectedType(other)),
        };
        self.advance()?;
        Ok(basic)
    }

    fn statements(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while let Some(kind) = self.peek_kind() {
            if matches!(
                kind,
                TokenKind::EndFunc
                    | TokenKind::EndIf
                    | TokenKind::Else
                    | TokenKind::EndWhile
                    | TokenKind::EndFor
            ) {
                break;
            }
            stmts.push(self.stmt()?);
        }
        Ok(stmts)
    }

    fn stmt(&mut self) -> PResult<Stmt> {
        let token = self.peek()?;
        match token.kind.clone() {
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Read => {
                self.advance()?;
                let target = self.left_expr()?;
                self.expect(&TokenKind::Semicolon)?;
                Ok(self.node(StmtKind::Read(target), token.start))
            }
            TokenKind::Write => {
                self.advance()?;
                let kind = if let Some(TokenKind::StringLiteral(text)) = self.peek_kind() {
                    self.advance()?;
                    StmtKind::WriteString(text)
                } else {
                    StmtKind::Write(self.expr()?)
                };
                self.expect(&TokenKind::Semicolon)?;
                Ok(self.node(kind, token.start))
            }
            TokenKind::Return => {
                self.advance()?;
                let value = if matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(&TokenKind::Semicolon)?;
                Ok(self.node(StmtKind::Return(value), token.start))
            }
            TokenKind::Identifier(name) => {
                let kind = match self.peek_nth_kind(1) {
                    Some(TokenKind::LParen) => StmtKind::ProcCall(self.call()?),
                    Some(TokenKind::Assign | TokenKind::LBracket) => {
                        let target = self.left_expr()?;
                        self.expect(&TokenKind::Assign)?;
                        let value = self.expr()?;
                        StmtKind::Assign { target, value }
                    }
                    _ => return Err(ParserError::ExpectedAssignOrCall(name)),
                };
                self.expect(&TokenKind::Semicolon)?;
                Ok(self.node(kind, token.start))
            }
            other => Err(ParserError::ExpectedStatement(other)),
        }
    }

    fn if_stmt(&mut self) -> PResult<Stmt> {
        let Token { start, .. } = self.peek()?;
        self.advance()?; // if
        let condition = self.expr()?;
        self.expect(&TokenKind::Then)?;
        let then_branch = self.statements()?;
        let else_branch = if matches!(self.peek_kind(), Some(TokenKind::Else)) {
            self.advance()?;
            Some(self.statements()?)
        } else {
            None
        };
        self.expect(&TokenKind::EndIf)?;
        Ok(self.node(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            start,
        ))
    }

    fn while_stmt(&mut self) -> PResult<Stmt> {
        let Token { start, .. } = self.peek()?;
        self.advance()?;
        let condition = self.expr()?;
        self.expect(&TokenKind::Do)?;
        let body = self.statements()?;
        self.expect(&TokenKind::EndWhile)?;
        Ok(self.node(StmtKind::While { condition, body }, start))
    }

    fn for_stmt(&mut self) -> PResult<Stmt> {
        let Token { start, .. } = self.peek()?;
        self.advance()?;
        let control = self.ident()?;
        self.expect(&TokenKind::In)?;
        self.expect(&TokenKind::Range)?;
        self.expect(&TokenKind::LParen)?;
        let range = self.arguments()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Do)?;
        let body = self.statements()?;
        self.expect(&TokenKind::EndFor)?;
        Ok(self.node(
            StmtKind::For {
                control,
                range,
                body,
            },
            start,
        ))
    }

    fn left_expr(&mut self) -> PResult<LeftExpr> {
        let Token { start, .. } = self.peek()?;
        let base = self.ident()?;
        let kind = if matches!(self.peek_kind(), Some(TokenKind::LBracket)) {
            LeftExprKind::ArrayAccess(self.array_index(base)?)
        } else {
            LeftExprKind::Ident(base)
        };
        Ok(self.node(kind, start))
    }

    fn array_index(&mut self, base: Ident) -> PResult<ArrayAccess> {
        self.expect(&TokenKind::LBracket)?;
        let index = self.expr()?;
        self.expect(&TokenKind::RBracket)?;
        Ok(ArrayAccess {
            base,
            index: Box::new(index),
        })
    }

    fn call(&mut self) -> PResult<Call> {
        let callee = self.ident()?;
        self.expect(&TokenKind::LParen)?;
        let args = self.arguments()?;
        self.expect(&TokenKind::RParen)?;
        Ok(Call { callee, args })
    }

    fn expr(&mut self) -> PResult<Expr> {
        self.or()
    }

    fn or(&mut self) -> PResult<Expr> {
        let mut node = self.and()?;

        while matches!(self.peek_kind(), Some(TokenKind::Or)) {
            self.advance()?;
            let rhs = self.and()?;
            node = self.binary(BinaryOp::Or, node, rhs);
        }

        Ok(node)
    }

    fn and(&mut self) -> PResult<Expr> {
        let mut node = self.rel()?;

        while matches!(self.peek_kind(), Some(TokenKind::And)) {
            self.advance()?;
            let rhs = self.rel()?;
            node = self.binary(BinaryOp::And, node, rhs);
        }

        Ok(node)
    }

    fn rel(&mut self) -> PResult<Expr> {
        let mut node = self.add()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::DoubleEqual) => BinaryOp::Equal,
                Some(TokenKind::NotEqual) => BinaryOp::NotEqual,
                Some(TokenKind::LessThan) => BinaryOp::LessThan,
                Some(TokenKind::LessThanEqual) => BinaryOp::LessThanEqual,
                Some(TokenKind::GreaterThan) => BinaryOp::GreaterThan,
                Some(TokenKind::GreaterThanEqual) => BinaryOp::GreaterThanEqual,
                _ => break,
            };
            self.advance()?;
            let rhs = self.add()?;
            node = self.binary(op, node, rhs);
        }

        Ok(node)
    }

    fn add(&mut self) -> PResult<Expr> {
        let mut node = self.mul()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance()?;
            let rhs = self.mul()?;
            node = self.binary(op, node, rhs);
        }

        Ok(node)
    }

    fn mul(&mut self) -> PResult<Expr> {
        let mut node = self.unary()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.advance()?;
            let rhs = self.unary()?;
            node = self.binary(op, node, rhs);
        }

        Ok(node)
    }

    fn binary(&mut self, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        let start = lhs.start;
        self.node(
            ExprKind::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            start,
        )
    }

    fn unary(&mut self) -> PResult<Expr> {
        let Token { start, kind, .. } = self.peek()?;
        let op = match kind {
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Minus => UnaryOp::Minus,
            _ => return self.primary(),
        };
        self.advance()?;
        let operand = self.unary()?;
        Ok(self.node(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            start,
        ))
    }

    fn primary(&mut self) -> PResult<Expr> {
        let Token { start, kind, .. } = self.peek()?;

        let kind = match kind {
            TokenKind::IntLiteral(n) => {
                self.advance()?;
                ExprKind::Literal(Literal::Int(n))
            }
            TokenKind::FloatLiteral(x) => {
                self.advance()?;
                ExprKind::Literal(Literal::Float(x))
            }
            TokenKind::Bool(b) => {
                self.advance()?;
                ExprKind::Literal(Literal::Bool(b))
            }
            TokenKind::CharLiteral(c) => {
                self.advance()?;
                ExprKind::Literal(Literal::Char(c))
            }
            TokenKind::Max => {
                self.advance()?;
                self.expect(&TokenKind::LParen)?;
                let args = self.arguments()?;
                self.expect(&TokenKind::RParen)?;
                if args.is_empty() {
                    return Err(ParserError::ExpectedPrimary(TokenKind::RParen));
                }
                ExprKind::Max(args)
            }
            TokenKind::Identifier(_) => match self.peek_nth_kind(1) {
                Some(TokenKind::LParen) => ExprKind::Call(self.call()?),
                Some(TokenKind::LBracket) => {
                    let base = self.ident()?;
                    ExprKind::ArrayAccess(self.array_index(base)?)
                }
                _ => ExprKind::Ident(self.ident()?),
            },
            TokenKind::LParen => {
                self.advance()?;
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen)?;
                ExprKind::Paren(Box::new(inner))
            }
            other => return Err(ParserError::ExpectedPrimary(other)),
        };

        Ok(self.node(kind, start))
    }

    fn arguments(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();

        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            return Ok(args);
        }

        loop {
            args.push(self.expr()?);
            if matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                self.advance()?;
                continue;
            }
            break;
        }

        Ok(args)
    }

    fn ident(&mut self) -> PResult<Ident> {
        match self.peek_kind() {
            Some(TokenKind::Identifier(name)) => {
                let Token { start, .. } = self.peek()?;
                self.advance()?;
                Ok(self.node(name, start))
            }
            other => Err(ParserError::ExpectedIdentifier(other)),
        }
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek_nth_kind(0)
    }

    fn peek_nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind.clone())
    }

    fn peek(&self) -> PResult<Token> {
        self.tokens
            .get(self.pos)
            .cloned()
            .ok_or(ParserError::UnexpectedEof(""))
    }

    fn advance(&mut self) -> PResult<()> {
        if self.pos >= self.tokens.len() {
            return Err(ParserError::UnexpectedEof(""));
        }
        self.index = self.peek()?.end;
        self.pos += 1;
        Ok(())
    }

    fn expect(&mut self, kind: &TokenKind) -> PResult<()> {
        let found = self.peek_kind();
        if found.as_ref() != Some(kind) {
            return Err(ParserError::ExpectedToken(kind.clone(), found));
        }
        self.advance()
    }

    fn ensure_done(&self) -> PResult<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(ParserError::NotAtEnd(self.peek_kind()))
        }
    }
}
