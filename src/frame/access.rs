use super::label::Label;

/// Storage with a fixed, statically known address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalAccess {
    pub size: i64,
    pub label: Label,
}

/// Storage inside an activation record, addressed relative to the frame
/// pointer of the function at `static_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackAccess {
    pub size: i64,
    pub offset: i64,
    pub static_level: usize,
}

/// Where a variable or parameter lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Global(GlobalAccess),
    Local(StackAccess),
    Parameter(StackAccess),
}

impl Access {
    pub fn size(&self) -> i64 {
        match self {
            Access::Global(global) => global.size,
            Access::Local(stack) | Access::Parameter(stack) => stack.size,
        }
    }

    pub fn stack(&self) -> Option<&StackAccess> {
        match self {
            Access::Global(_) => None,
            Access::Local(stack) | Access::Parameter(stack) => Some(stack),
        }
    }
}
