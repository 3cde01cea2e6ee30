//! Built-in functions implemented directly by the interpreter.
//!
//! Calls to these names bypass the general call machinery: the generator
//! targets a reserved named label and passes a constant static link, and the
//! interpreter dispatches on the label before looking anything up in memory.

use crate::semantic::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    PrintInt,
    PrintStr,
    PrintLog,
    RandInt,
    Seed,
}

impl Builtin {
    pub const ALL: [Builtin; 5] = [
        Builtin::PrintInt,
        Builtin::PrintStr,
        Builtin::PrintLog,
        Builtin::RandInt,
        Builtin::Seed,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| builtin.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::PrintInt => "print_int",
            Builtin::PrintStr => "print_str",
            Builtin::PrintLog => "print_log",
            Builtin::RandInt => "rand_int",
            Builtin::Seed => "seed",
        }
    }

    pub fn param_types(self) -> Vec<Type> {
        match self {
            Builtin::PrintInt | Builtin::Seed => vec![Type::int()],
            Builtin::PrintStr => vec![Type::str()],
            Builtin::PrintLog => vec![Type::log()],
            Builtin::RandInt => vec![Type::int(), Type::int()],
        }
    }

    /// Number of source-level arguments. Generated calls pass one more: the
    /// static link in front.
    pub fn arity(self) -> usize {
        self.param_types().len()
    }

    pub fn return_type(self) -> Type {
        match self {
            Builtin::PrintInt | Builtin::RandInt => Type::int(),
            Builtin::PrintStr => Type::str(),
            Builtin::PrintLog => Type::log(),
            Builtin::Seed => Type::void(),
        }
    }
}
