use crate::frame::Label;

/// An abstract register. Temporaries are local to one activation: every call
/// starts with an empty temporary environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp(pub usize);

/// Source of fresh temporaries for one compilation.
#[derive(Debug, Default)]
pub struct TempGenerator {
    next: usize,
}

impl TempGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_temp(&mut self) -> Temp {
        let temp = Temp(self.next);
        self.next += 1;
        temp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Gt,
    Leq,
    Geq,
}

impl BinOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            BinOp::Add => "ADD",
            BinOp::Sub => "SUB",
            BinOp::Mul => "MUL",
            BinOp::Div => "DIV",
            BinOp::Mod => "MOD",
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Eq => "EQ",
            BinOp::Neq => "NEQ",
            BinOp::Lt => "LT",
            BinOp::Gt => "GT",
            BinOp::Leq => "LEQ",
            BinOp::Geq => "GEQ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrExpr {
    Binop {
        op: BinOp,
        lhs: Box<IrExpr>,
        rhs: Box<IrExpr>,
    },
    Call {
        label: Label,
        args: Vec<IrExpr>,
    },
    Const(i64),
    /// Statement executed for its effect, then an expression for the value.
    Eseq {
        stmt: Box<IrStmt>,
        expr: Box<IrExpr>,
    },
    Mem(Box<IrExpr>),
    Name(Label),
    Temp(Temp),
}

impl IrExpr {
    pub fn binop(op: BinOp, lhs: IrExpr, rhs: IrExpr) -> Self {
        IrExpr::Binop {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn mem(address: IrExpr) -> Self {
        IrExpr::Mem(Box::new(address))
    }

    pub fn eseq(stmt: IrStmt, expr: IrExpr) -> Self {
        IrExpr::Eseq {
            stmt: Box::new(stmt),
            expr: Box::new(expr),
        }
    }

    pub fn fp() -> Self {
        IrExpr::Name(Label::frame_pointer())
    }

    pub fn sp() -> Self {
        IrExpr::Name(Label::stack_pointer())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrStmt {
    CJump {
        condition: IrExpr,
        then_label: Label,
        else_label: Label,
    },
    Exp(IrExpr),
    Jump(Label),
    Label(Label),
    Move {
        dst: IrExpr,
        src: IrExpr,
    },
    Seq(Vec<IrStmt>),
}

impl IrStmt {
    pub fn mov(dst: IrExpr, src: IrExpr) -> Self {
        IrStmt::Move { dst, src }
    }

    pub fn cjump(condition: IrExpr, then_label: Label, else_label: Label) -> Self {
        IrStmt::CJump {
            condition,
            then_label,
            else_label,
        }
    }

    /// True for a sequence whose items are all plain (non-sequence)
    /// statements free of `ESEQ`.
    pub fn is_linear(&self) -> bool {
        match self {
            IrStmt::Seq(statements) => statements
                .iter()
                .all(|stmt| !matches!(stmt, IrStmt::Seq(_)) && !stmt.contains_eseq()),
            _ => false,
        }
    }

    fn contains_eseq(&self) -> bool {
        match self {
            IrStmt::CJump { condition, .. } => condition.contains_eseq(),
            IrStmt::Exp(expr) => expr.contains_eseq(),
            IrStmt::Jump(_) | IrStmt::Label(_) => false,
            IrStmt::Move { dst, src } => dst.contains_eseq() || src.contains_eseq(),
            IrStmt::Seq(statements) => statements.iter().any(IrStmt::contains_eseq),
        }
    }
}

impl IrExpr {
    fn contains_eseq(&self) -> bool {
        match self {
            IrExpr::Binop { lhs, rhs, .. } => lhs.contains_eseq() || rhs.contains_eseq(),
            IrExpr::Call { args, .. } => args.iter().any(IrExpr::contains_eseq),
            IrExpr::Eseq { .. } => true,
            IrExpr::Mem(address) => address.contains_eseq(),
            IrExpr::Const(_) | IrExpr::Name(_) | IrExpr::Temp(_) => false,
        }
    }
}
