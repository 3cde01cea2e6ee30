//! # Tree IR
//!
//! Target of the code generator and input of the interpreter.
//!
//! - [`tree`] - expression and statement nodes, temporaries
//! - [`chunk`] - the units of generated output
//! - [`codegen`] - lowering of the resolved AST into chunks
//! - [`linearize`] - flattening of nested sequences into executable form
//!
//! Generation and linearization are separate stages. [`CodeGenerator`] emits
//! nested `SEQ`/`ESEQ` trees; [`linearize()`] turns every code chunk body into a
//! flat statement list. Only linear bodies are accepted by the interpreter.

pub mod chunk;
pub mod codegen;
mod fmt;
pub mod linearize;
pub mod tree;

pub use chunk::{Chunk, CodeChunk, DataChunk, GlobalChunk};
pub use codegen::{CodeGenerator, Lowered};
pub use linearize::{linearize, linearize_stmt};
pub use tree::{BinOp, IrExpr, IrStmt, Temp, TempGenerator};
