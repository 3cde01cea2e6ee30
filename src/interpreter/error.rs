use std::fmt;

use crate::config::ConfigError;
use crate::frame::Label;

/// Fatal failure while executing generated code.
///
/// None of these are recoverable: they either point at a defect earlier in
/// the pipeline or at a program that exhausted the simulated machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A code chunk body that is not a flat statement sequence.
    Unlinearized { label: Label },
    InvalidMoveTarget { target: String },
    /// Call to a label that is neither a builtin nor a code chunk.
    NotCallable { label: Label },
    NotAnInteger { address: i64, found: String },
    NotAString { address: i64 },
    BuiltinArity {
        name: String,
        expected: usize,
        found: usize,
    },
    DivisionByZero,
    InvalidAddress { address: i64 },
    StackOverflow { stack_pointer: i64, static_top: i64 },
    OutOfMemory { requested: i64 },
    EmptyRange { low: i64, high: i64 },
    UnknownJumpTarget { label: Label },
    UnassignedTemp { temp: usize },
    UnknownLabel { label: Label },
    MissingEntry { label: Label },
    Output { message: String },
    Config(ConfigError),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Runtime error: ")?;
        match self {
            RuntimeError::Unlinearized { label } => {
                write!(f, "body of '{}' is not linearized", label)
            }
            RuntimeError::InvalidMoveTarget { target } => {
                write!(f, "cannot move into {}", target)
            }
            RuntimeError::NotCallable { label } => {
                write!(f, "'{}' is neither a builtin nor a function", label)
            }
            RuntimeError::NotAnInteger { address, found } => {
                write!(f, "expected an integer at address {}, found {}", address, found)
            }
            RuntimeError::NotAString { address } => {
                write!(f, "expected a string at address {}", address)
            }
            RuntimeError::BuiltinArity {
                name,
                expected,
                found,
            } => write!(
                f,
                "builtin '{}' expects {} arguments, got {}",
                name, expected, found
            ),
            RuntimeError::DivisionByZero => write!(f, "division by zero"),
            RuntimeError::InvalidAddress { address } => {
                write!(f, "invalid address {}", address)
            }
            RuntimeError::StackOverflow {
                stack_pointer,
                static_top,
            } => write!(
                f,
                "stack overflow: stack pointer {} below static data ending at {}",
                stack_pointer, static_top
            ),
            RuntimeError::OutOfMemory { requested } => {
                write!(f, "no room for {} bytes of static data", requested)
            }
            RuntimeError::EmptyRange { low, high } => {
                write!(f, "rand_int range [{}, {}) is empty", low, high)
            }
            RuntimeError::UnknownJumpTarget { label } => {
                write!(f, "jump to unknown label '{}'", label)
            }
            RuntimeError::UnassignedTemp { temp } => {
                write!(f, "temporary t{} read before assignment", temp)
            }
            RuntimeError::UnknownLabel { label } => write!(f, "unknown label '{}'", label),
            RuntimeError::MissingEntry { label } => {
                write!(f, "no code chunk labelled '{}'", label)
            }
            RuntimeError::Output { message } => write!(f, "output failed: {}", message),
            RuntimeError::Config(error) => write!(f, "{}", error),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<ConfigError> for RuntimeError {
    fn from(error: ConfigError) -> Self {
        RuntimeError::Config(error)
    }
}
