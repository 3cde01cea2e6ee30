use crate::frame::{Frame, GlobalAccess};

use super::tree::IrStmt;

/// One unit of generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Code(CodeChunk),
    Data(DataChunk),
    Global(GlobalChunk),
}

/// A function: its frame and its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeChunk {
    pub frame: Frame,
    pub body: IrStmt,
}

/// Literal data, e.g. the text of a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataChunk {
    pub global: GlobalAccess,
    pub data: String,
}

/// Storage for a user-declared global variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalChunk {
    pub global: GlobalAccess,
}
