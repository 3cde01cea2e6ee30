//! # Resolved Abstract Syntax Tree
//!
//! The tree handed over by the front end once names are resolved and types
//! are checked. Every node carries a [`NodeId`] that keys the associations
//! in [`crate::semantic::Resolved`] and the frame/access tables computed by
//! [`crate::frame`], plus a [`Span`] for diagnostics.
//!
//! ```text
//! Program
//!  └─ Definition*          (fun / var / typ)
//!      └─ FunDef
//!          ├─ Parameter*
//!          └─ Expression   (body; `where` nests further definitions)
//! ```

pub mod builder;
pub mod expression;

use lachs::Span;

pub use expression::*;

/// Identity of an AST node within one program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct Program {
    pub definitions: Vec<Definition>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub enum Definition {
    Fun(FunDef),
    Var(VarDef),
    Type(TypeDef),
}

impl Definition {
    pub fn id(&self) -> NodeId {
        match self {
            Definition::Fun(def) => def.id,
            Definition::Var(def) => def.id,
            Definition::Type(def) => def.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Definition::Fun(def) => &def.name,
            Definition::Var(def) => &def.name,
            Definition::Type(def) => &def.name,
        }
    }

    pub fn position(&self) -> &Span {
        match self {
            Definition::Fun(def) => &def.position,
            Definition::Var(def) => &def.position,
            Definition::Type(def) => &def.position,
        }
    }
}

/// Function definition: `fun name(params): type = body`
#[derive(Debug, Clone)]
pub struct FunDef {
    pub id: NodeId,
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Box<Expression>,
    pub position: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}

/// Variable definition: `var name: type`
#[derive(Debug, Clone)]
pub struct VarDef {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}

/// Type alias: `typ name: type`. Carries no storage.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub id: NodeId,
    pub name: String,
    pub position: Span,
}
