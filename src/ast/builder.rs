//! # Programmatic Front End
//!
//! Scanning, parsing, name resolution and type checking live outside this
//! crate. [`ProgramBuilder`] produces exactly what those stages would hand
//! over: a tree of nodes with unique [`NodeId`]s plus the node→definition
//! and node→type associations in [`Resolved`].
//!
//! There is no lookup by name. A reference to a variable takes the
//! definition handle itself, and a call takes the [`FunDecl`] of its callee,
//! so the associations are recorded at construction time. Functions are
//! declared before their body is built, which allows recursion.
//!
//! All methods take `&self`, so construction nests naturally:
//!
//! ```
//! use pins::ast::BinOpKind;
//! use pins::ast::builder::ProgramBuilder;
//! use pins::semantic::Type;
//!
//! let b = ProgramBuilder::new();
//! let main = b.declare_fun("main", vec![], Type::int());
//! let body = b.binary(BinOpKind::Add, b.int(41), b.int(1));
//! let def = b.define_fun(&main, body);
//! let (program, resolved) = b.finish(vec![def]);
//! assert_eq!(program.definitions.len(), 1);
//! assert!(resolved.type_of(main.id()).is_some());
//! ```

use std::cell::{Cell, RefCell};

use lachs::Span;

use crate::builtin::Builtin;
use crate::semantic::{Resolved, Type};

use super::*;

/// A function whose signature is known and whose body may still be missing.
#[derive(Debug, Clone)]
pub struct FunDecl {
    id: NodeId,
    name: String,
    params: Vec<Parameter>,
}

impl FunDecl {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param(&self, index: usize) -> &Parameter {
        &self.params[index]
    }
}

/// Anything a [`Name`] can refer to.
pub trait Binding {
    fn binding_id(&self) -> NodeId;
    fn binding_name(&self) -> &str;
}

impl Binding for VarDef {
    fn binding_id(&self) -> NodeId {
        self.id
    }

    fn binding_name(&self) -> &str {
        &self.name
    }
}

impl Binding for Parameter {
    fn binding_id(&self) -> NodeId {
        self.id
    }

    fn binding_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    next_id: Cell<usize>,
    resolved: RefCell<Resolved>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId(id)
    }

    fn set_type(&self, node: NodeId, ty: Type) {
        self.resolved.borrow_mut().set_type(node, ty);
    }

    fn type_of(&self, node: NodeId) -> Option<Type> {
        self.resolved.borrow().type_of(node).cloned()
    }

    fn bind(&self, node: NodeId, definition: NodeId) {
        self.resolved.borrow_mut().bind(node, definition);
    }

    /// Close the program and hand over the tree with its associations.
    pub fn finish(self, definitions: Vec<Definition>) -> (Program, Resolved) {
        let program = Program {
            definitions,
            position: Span::default(),
        };
        (program, self.resolved.into_inner())
    }

    // ---- definitions ----

    pub fn var(&self, name: &str, ty: Type) -> VarDef {
        let id = self.fresh();
        self.set_type(id, ty);
        VarDef {
            id,
            name: name.to_string(),
            position: Span::default(),
        }
    }

    pub fn param(&self, name: &str, ty: Type) -> Parameter {
        let id = self.fresh();
        self.set_type(id, ty);
        Parameter {
            id,
            name: name.to_string(),
            position: Span::default(),
        }
    }

    pub fn type_def(&self, name: &str, ty: Type) -> Definition {
        let id = self.fresh();
        self.set_type(id, ty);
        Definition::Type(TypeDef {
            id,
            name: name.to_string(),
            position: Span::default(),
        })
    }

    pub fn declare_fun(&self, name: &str, params: Vec<Parameter>, ret: Type) -> FunDecl {
        let id = self.fresh();
        let param_types = params
            .iter()
            .map(|param| self.type_of(param.id).unwrap_or_else(Type::void))
            .collect();
        self.set_type(id, Type::function(param_types, ret));
        FunDecl {
            id,
            name: name.to_string(),
            params,
        }
    }

    pub fn define_fun(&self, decl: &FunDecl, body: Expression) -> Definition {
        Definition::Fun(FunDef {
            id: decl.id,
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: Box::new(body),
            position: Span::default(),
        })
    }

    /// Declare and define a function that does not call itself.
    pub fn fun(
        &self,
        name: &str,
        params: Vec<Parameter>,
        ret: Type,
        body: impl FnOnce(&FunDecl) -> Expression,
    ) -> Definition {
        let decl = self.declare_fun(name, params, ret);
        let body = body(&decl);
        self.define_fun(&decl, body)
    }

    // ---- expressions ----

    fn literal(&self, value: LiteralValue, ty: Type) -> Expression {
        let id = self.fresh();
        self.set_type(id, ty);
        Expression::Literal(Literal {
            id,
            value,
            position: Span::default(),
        })
    }

    pub fn int(&self, value: i64) -> Expression {
        self.literal(LiteralValue::Int(value), Type::int())
    }

    pub fn log(&self, value: bool) -> Expression {
        self.literal(LiteralValue::Log(value), Type::log())
    }

    pub fn str(&self, value: &str) -> Expression {
        self.literal(LiteralValue::Str(value.to_string()), Type::str())
    }

    pub fn name(&self, definition: &impl Binding) -> Expression {
        let id = self.fresh();
        self.bind(id, definition.binding_id());
        if let Some(ty) = self.type_of(definition.binding_id()) {
            self.set_type(id, ty);
        }
        Expression::Name(Name {
            id,
            name: definition.binding_name().to_string(),
            position: Span::default(),
        })
    }

    pub fn binary(&self, op: BinOpKind, left: Expression, right: Expression) -> Expression {
        let id = self.fresh();
        let ty = match op {
            BinOpKind::Add | BinOpKind::Sub | BinOpKind::Mul | BinOpKind::Div | BinOpKind::Mod => {
                Some(Type::int())
            }
            BinOpKind::And
            | BinOpKind::Or
            | BinOpKind::Eq
            | BinOpKind::NotEq
            | BinOpKind::Lt
            | BinOpKind::Gt
            | BinOpKind::LtEq
            | BinOpKind::GtEq => Some(Type::log()),
            BinOpKind::Index => self
                .type_of(left.id())
                .and_then(|ty| ty.element().cloned()),
            BinOpKind::Assign => self.type_of(left.id()),
        };
        if let Some(ty) = ty {
            self.set_type(id, ty);
        }
        Expression::Binary(Binary {
            id,
            op,
            left: Box::new(left),
            right: Box::new(right),
            position: Span::default(),
        })
    }

    pub fn index(&self, base: Expression, index: Expression) -> Expression {
        self.binary(BinOpKind::Index, base, index)
    }

    pub fn assign(&self, target: Expression, value: Expression) -> Expression {
        self.binary(BinOpKind::Assign, target, value)
    }

    pub fn unary(&self, op: UnaryOpKind, operand: Expression) -> Expression {
        let id = self.fresh();
        let ty = match op {
            UnaryOpKind::Not => Type::log(),
            UnaryOpKind::Plus | UnaryOpKind::Minus => Type::int(),
        };
        self.set_type(id, ty);
        Expression::Unary(Unary {
            id,
            op,
            operand: Box::new(operand),
            position: Span::default(),
        })
    }

    pub fn call(&self, callee: &FunDecl, args: Vec<Expression>) -> Expression {
        let id = self.fresh();
        self.bind(id, callee.id);
        if let Some(ret) = self
            .type_of(callee.id)
            .and_then(|ty| ty.return_type().cloned())
        {
            self.set_type(id, ret);
        }
        Expression::Call(Call {
            id,
            name: callee.name.clone(),
            args,
            position: Span::default(),
        })
    }

    pub fn call_builtin(&self, builtin: Builtin, args: Vec<Expression>) -> Expression {
        let id = self.fresh();
        self.set_type(id, builtin.return_type());
        Expression::Call(Call {
            id,
            name: builtin.name().to_string(),
            args,
            position: Span::default(),
        })
    }

    pub fn block(&self, expressions: Vec<Expression>) -> Expression {
        let id = self.fresh();
        if let Some(ty) = expressions.last().and_then(|last| self.type_of(last.id())) {
            self.set_type(id, ty);
        }
        Expression::Block(Block {
            id,
            expressions,
            position: Span::default(),
        })
    }

    pub fn if_then(&self, condition: Expression, then_expr: Expression) -> Expression {
        self.if_node(condition, then_expr, None)
    }

    pub fn if_then_else(
        &self,
        condition: Expression,
        then_expr: Expression,
        else_expr: Expression,
    ) -> Expression {
        self.if_node(condition, then_expr, Some(else_expr))
    }

    fn if_node(
        &self,
        condition: Expression,
        then_expr: Expression,
        else_expr: Option<Expression>,
    ) -> Expression {
        let id = self.fresh();
        self.set_type(id, Type::void());
        Expression::IfThenElse(IfThenElse {
            id,
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: else_expr.map(Box::new),
            position: Span::default(),
        })
    }

    pub fn while_loop(&self, condition: Expression, body: Expression) -> Expression {
        let id = self.fresh();
        self.set_type(id, Type::void());
        Expression::While(While {
            id,
            condition: Box::new(condition),
            body: Box::new(body),
            position: Span::default(),
        })
    }

    pub fn for_loop(
        &self,
        counter: Expression,
        low: Expression,
        high: Expression,
        step: Expression,
        body: Expression,
    ) -> Expression {
        let id = self.fresh();
        self.set_type(id, Type::void());
        Expression::For(For {
            id,
            counter: Box::new(counter),
            low: Box::new(low),
            high: Box::new(high),
            step: Box::new(step),
            body: Box::new(body),
            position: Span::default(),
        })
    }

    pub fn where_(&self, expr: Expression, definitions: Vec<Definition>) -> Expression {
        let id = self.fresh();
        if let Some(ty) = self.type_of(expr.id()) {
            self.set_type(id, ty);
        }
        Expression::Where(Where {
            id,
            definitions,
            expr: Box::new(expr),
            position: Span::default(),
        })
    }
}
