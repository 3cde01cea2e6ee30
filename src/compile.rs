//! Pipeline driver: frame evaluation, IR generation and linearization over
//! one resolved program, and optionally running the result.

use std::fmt;
use std::io::Write;

use log::debug;

use crate::ast::Program;
use crate::config::MachineConfig;
use crate::error::CompileError;
use crate::frame::{FrameEvaluator, LabelGenerator};
use crate::interpreter::{Interpreter, RuntimeError};
use crate::ir::{linearize, Chunk, CodeGenerator, TempGenerator};
use crate::semantic::Resolved;

/// Compile a resolved program into linearized chunks.
///
/// Labels and temporaries are drawn from generators local to this call, so
/// compiling the same program twice yields identical output.
pub fn compile(program: &Program, resolved: &Resolved) -> Result<Vec<Chunk>, CompileError> {
    let mut labels = LabelGenerator::new();
    let mut temps = TempGenerator::new();

    let frames = FrameEvaluator::evaluate(program, resolved, &mut labels)?;
    let chunks = CodeGenerator::generate(program, resolved, &frames, &mut labels, &mut temps)?;
    let chunks = linearize(chunks, &mut temps)?;

    debug!(
        "compiled {} chunks using {} anonymous labels",
        chunks.len(),
        labels.issued()
    );
    Ok(chunks)
}

/// Failure of [`run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    Compile(CompileError),
    Runtime(RuntimeError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunError::Compile(error) => write!(f, "{}", error),
            RunError::Runtime(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for RunError {}

impl From<CompileError> for RunError {
    fn from(error: CompileError) -> Self {
        RunError::Compile(error)
    }
}

impl From<RuntimeError> for RunError {
    fn from(error: RuntimeError) -> Self {
        RunError::Runtime(error)
    }
}

/// Compile `program` and run its `main` function, printing to `output`.
pub fn run(
    program: &Program,
    resolved: &Resolved,
    config: &MachineConfig,
    output: &mut dyn Write,
) -> Result<i64, RunError> {
    let chunks = compile(program, resolved)?;
    let mut interpreter = Interpreter::new(&chunks, config)?.with_output(output);
    Ok(interpreter.run_main()?)
}
