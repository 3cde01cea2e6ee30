use std::fmt;

use crate::config::WORD_SIZE;

/// Atomic type kinds of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Atom {
    Int,
    Log,
    Str,
    Void,
}

impl Atom {
    pub fn size_in_bytes(self) -> i64 {
        match self {
            Atom::Int | Atom::Log | Atom::Str => WORD_SIZE,
            Atom::Void => 0,
        }
    }
}

/// A resolved type, as computed by the type checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Atom(Atom),
    Array { len: i64, element: Box<Type> },
    Function { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    pub fn int() -> Self {
        Type::Atom(Atom::Int)
    }

    pub fn log() -> Self {
        Type::Atom(Atom::Log)
    }

    pub fn str() -> Self {
        Type::Atom(Atom::Str)
    }

    pub fn void() -> Self {
        Type::Atom(Atom::Void)
    }

    pub fn array(len: i64, element: Type) -> Self {
        Type::Array {
            len,
            element: Box::new(element),
        }
    }

    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Type::Function {
            params,
            ret: Box::new(ret),
        }
    }

    /// Storage needed for a variable of this type.
    pub fn size_in_bytes(&self) -> i64 {
        match self {
            Type::Atom(atom) => atom.size_in_bytes(),
            Type::Array { len, element } => len * element.size_in_bytes(),
            Type::Function { params, ret } => {
                ret.size_in_bytes() + params.iter().map(Type::size_as_param).sum::<i64>()
            }
        }
    }

    /// Storage needed for a parameter of this type. Aggregates are passed as
    /// a single word.
    pub fn size_as_param(&self) -> i64 {
        match self {
            Type::Atom(atom) => atom.size_in_bytes(),
            Type::Array { .. } | Type::Function { .. } => WORD_SIZE,
        }
    }

    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::Array { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Function { ret, .. } => Some(ret),
            _ => None,
        }
    }

    pub fn pretty(&self) -> String {
        match self {
            Type::Atom(Atom::Int) => "int".to_string(),
            Type::Atom(Atom::Log) => "log".to_string(),
            Type::Atom(Atom::Str) => "str".to_string(),
            Type::Atom(Atom::Void) => "void".to_string(),
            Type::Array { len, element } => format!("ARR({},{})", len, element.pretty()),
            Type::Function { params, ret } => {
                let params = params
                    .iter()
                    .map(Type::pretty)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({}) -> {}", params, ret.pretty())
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.pretty())
    }
}
