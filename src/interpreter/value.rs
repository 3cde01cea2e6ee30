use std::fmt;

/// Content of one memory word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Integers, booleans (0/1), addresses and frame pointers
    Int(i64),
    /// Payload of a data chunk
    Str(String),
    /// Entry of a code chunk, indexing the interpreter's routine table
    Code(usize),
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Str(text) => write!(f, "{:?}", text),
            Value::Code(index) => write!(f, "<code {}>", index),
        }
    }
}
