use lachs::Span;

use super::{Definition, NodeId};

#[derive(Debug, Clone)]
pub enum Expression {
    Binary(Binary),
    Block(Block),
    Call(Call),
    For(For),
    IfThenElse(IfThenElse),
    Literal(Literal),
    Name(Name),
    Unary(Unary),
    While(While),
    Where(Where),
}

impl Expression {
    pub fn id(&self) -> NodeId {
        match self {
            Expression::Binary(node) => node.id,
            Expression::Block(node) => node.id,
            Expression::Call(node) => node.id,
            Expression::For(node) => node.id,
            Expression::IfThenElse(node) => node.id,
            Expression::Literal(node) => node.id,
            Expression::Name(node) => node.id,
            Expression::Unary(node) => node.id,
            Expression::While(node) => node.id,
            Expression::Where(node) => node.id,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Expression::Binary(node) => &node.position,
            Expression::Block(node) => &node.position,
            Expression::Call(node) => &node.position,
            Expression::For(node) => &node.position,
            Expression::IfThenElse(node) => &node.position,
            Expression::Literal(node) => &node.position,
            Expression::Name(node) => &node.position,
            Expression::Unary(node) => &node.position,
            Expression::While(node) => &node.position,
            Expression::Where(node) => &node.position,
        }
    }
}

/// Binary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    /// Array subscript `a[i]`
    Index,
    /// Assignment `a = b`, itself an expression yielding `a`
    Assign,
}

/// Unary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpKind {
    Plus,
    Minus,
    Not,
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub id: NodeId,
    pub op: BinOpKind,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub position: Span,
}

/// `{ e1; e2; ...; en }`, valued by its last expression
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub expressions: Vec<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Expression>,
    pub position: Span,
}

/// `for counter = low, high, step : body`
#[derive(Debug, Clone)]
pub struct For {
    pub id: NodeId,
    pub counter: Box<Expression>,
    pub low: Box<Expression>,
    pub high: Box<Expression>,
    pub step: Box<Expression>,
    pub body: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct IfThenElse {
    pub id: NodeId,
    pub condition: Box<Expression>,
    pub then_expr: Box<Expression>,
    pub else_expr: Option<Box<Expression>>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Int(i64),
    Log(bool),
    Str(String),
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub id: NodeId,
    pub value: LiteralValue,
    pub position: Span,
}

/// Reference to a variable or parameter
#[derive(Debug, Clone)]
pub struct Name {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub id: NodeId,
    pub op: UnaryOpKind,
    pub operand: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct While {
    pub id: NodeId,
    pub condition: Box<Expression>,
    pub body: Box<Expression>,
    pub position: Span,
}

/// `expr { where defs }`: definitions scoped to one expression
#[derive(Debug, Clone)]
pub struct Where {
    pub id: NodeId,
    pub definitions: Vec<Definition>,
    pub expr: Box<Expression>,
    pub position: Span,
}
