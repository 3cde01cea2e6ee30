//! # Front-end Results Consumed by the Back End
//!
//! Name resolution and type checking run before this crate. Their results
//! reach the back end as two associations keyed by [`NodeId`]:
//!
//! - **definitions**: every name and call node → the definition node it
//!   refers to (`VarDef`, `Parameter` or `FunDef`)
//! - **types**: every node that needs one → its resolved [`Type`]
//!
//! The back end never re-derives either map. A lookup miss is a defect in the
//! pipeline and is reported as a [`crate::error::CompileError`].

pub mod ty;

use std::collections::HashMap;

use crate::ast::NodeId;

pub use ty::{Atom, Type};

/// Node→definition and node→type associations produced by the front end.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    definitions: HashMap<NodeId, NodeId>,
    types: HashMap<NodeId, Type>,
}

impl Resolved {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, node: NodeId, definition: NodeId) {
        self.definitions.insert(node, definition);
    }

    pub fn set_type(&mut self, node: NodeId, ty: Type) {
        self.types.insert(node, ty);
    }

    pub fn definition(&self, node: NodeId) -> Option<NodeId> {
        self.definitions.get(&node).copied()
    }

    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.types.get(&node)
    }
}
