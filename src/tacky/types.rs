use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    FAdd,
    FSub,
    FMul,
    FDiv,
    Neg,
    FNeg,
    And,
    Or,
    Not,
    Eq,
    FEq,
    Lt,
    FLt,
    Le,
    FLe,
    Float,
    ILoad,
    FLoad,
    ChLoad,
    Load,
    /// `LOADX dst base index`: indexed read.
    LoadX,
    /// `XLOAD base index src`: indexed write.
    XLoad,
    /// Address of a local array.
    ALoad,
    CLoad,
    Push,
    Pop,
    Call,
    Return,
    ReadI,
    ReadF,
    ReadC,
    WriteI,
    WriteF,
    WriteC,
    WriteLn,
    UJump,
    FJump,
    Label,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::FAdd => "FADD",
            Opcode::FSub => "FSUB",
            Opcode::FMul => "FMUL",
            Opcode::FDiv => "FDIV",
            Opcode::Neg => "NEG",
            Opcode::FNeg => "FNEG",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Eq => "EQ",
            Opcode::FEq => "FEQ",
            Opcode::Lt => "LT",
            Opcode::FLt => "FLT",
            Opcode::Le => "LE",
            Opcode::FLe => "FLE",
            Opcode::Float => "FLOAT",
            Opcode::ILoad => "ILOAD",
            Opcode::FLoad => "FLOAD",
            Opcode::ChLoad => "CHLOAD",
            Opcode::Load => "LOAD",
            Opcode::LoadX => "LOADX",
            Opcode::XLoad => "XLOAD",
            Opcode::ALoad => "ALOAD",
            Opcode::CLoad => "CLOAD",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::ReadI => "READI",
            Opcode::ReadF => "READF",
            Opcode::ReadC => "READC",
            Opcode::WriteI => "WRITEI",
            Opcode::WriteF => "WRITEF",
            Opcode::WriteC => "WRITEC",
            Opcode::WriteLn => "WRITELN",
            Opcode::UJump => "UJUMP",
            Opcode::FJump => "FJUMP",
            Opcode::Label => "LABEL",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<String>,
}

impl Instruction {
    pub fn op0(opcode: Opcode) -> Self {
        Self {
            opcode,
            operands: Vec::new(),
        }
    }

    pub fn op1(opcode: Opcode, a: impl Into<String>) -> Self {
        Self {
            opcode,
            operands: vec![a.into()],
        }
    }

    pub fn op2(opcode: Opcode, a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            opcode,
            operands: vec![a.into(), b.into()],
        }
    }

    pub fn op3(
        opcode: Opcode,
        a: impl Into<String>,
        b: impl Into<String>,
        c: impl Into<String>,
    ) -> Self {
        Self {
            opcode,
            operands: vec![a.into(), b.into(), c.into()],
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        Ok(())
    }
}

pub type InstructionList = Vec<Instruction>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Var {
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subroutine {
    pub name: String,
    pub params: Vec<String>,
    pub vars: Vec<Var>,
    pub instructions: InstructionList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub subroutines: Vec<Subroutine>,
}

impl Program {
    pub fn subroutine(&self, name: &str) -> Option<&Subroutine> {
        self.subroutines.iter().find(|s| s.name == name)
    }
}

impl fmt::Display for Subroutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "function {}", self.name)?;
        writeln!(f, "  params")?;
        for param in &self.params {
            writeln!(f, "    {param}")?;
        }
        writeln!(f, "  endparams")?;
        writeln!(f, "  vars")?;
        for var in &self.vars {
            writeln!(f, "    {} {}", var.name, var.size)?;
        }
        writeln!(f, "  endvars")?;
        for instruction in &self.instructions {
            writeln!(f, "    {instruction}")?;
        }
        writeln!(f, "endfunction")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, subroutine) in self.subroutines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{subroutine}")?;
        }
        Ok(())
    }
}
