use crate::config::WORD_SIZE;

use super::label::Label;

/// Activation record layout of one function.
///
/// [`Frame::size`] counts only what the callee reserves below FP. The
/// incoming parameters (`parameters_size`) live in the caller's outgoing
/// argument area and are sized there.
///
/// ```text
///  higher addresses
///  ┌──────────────────────┐
///  │ incoming arguments   │  FP + 4 ...      (caller's outgoing area)
///  │ static link / result │  FP + 0
///  ├──────────────────────┤  ← FP
///  │ locals               │  FP - locals_size .. FP
///  │ saved FP (old FP)    │  FP - old_fp_offset
///  │ return address       │
///  │ outgoing arguments   │  SP .. SP + arguments_size
///  └──────────────────────┘  ← SP = FP - size
///  lower addresses
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub label: Label,
    /// Nesting depth of the definition: 1 for top-level functions.
    pub static_level: usize,
    /// Incoming parameters, including the static link.
    pub parameters_size: i64,
    pub locals_size: i64,
    /// Largest outgoing argument block of any call in the body.
    pub arguments_size: i64,
}

impl Frame {
    /// Distance from FP down to the saved caller frame pointer.
    pub fn old_fp_offset(&self) -> i64 {
        self.locals_size + WORD_SIZE
    }

    /// Total size of the frame: locals, saved FP, return address and the
    /// outgoing argument area.
    pub fn size(&self) -> i64 {
        self.locals_size + 2 * WORD_SIZE + self.arguments_size
    }
}

/// Accumulates offsets while one function is analyzed.
///
/// Consumed by [`FrameBuilder::build`], so a builder cannot be finalized
/// twice or extended after its frame exists.
#[derive(Debug)]
pub struct FrameBuilder {
    label: Label,
    static_level: usize,
    parameters_size: i64,
    locals_size: i64,
    arguments_size: i64,
}

impl FrameBuilder {
    pub fn new(label: Label, static_level: usize) -> Self {
        Self {
            label,
            static_level,
            parameters_size: 0,
            locals_size: 0,
            arguments_size: 0,
        }
    }

    pub fn static_level(&self) -> usize {
        self.static_level
    }

    /// Reserve the next incoming parameter slot and return its offset from FP.
    pub fn add_parameter(&mut self, size: i64) -> i64 {
        let offset = self.parameters_size;
        self.parameters_size += size;
        offset
    }

    /// Reserve space for a local below the previous ones and return its
    /// (negative) offset from FP.
    pub fn add_local(&mut self, size: i64) -> i64 {
        self.locals_size += size;
        -self.locals_size
    }

    /// Grow the outgoing argument area to fit a call needing `size` bytes.
    pub fn add_call(&mut self, size: i64) {
        self.arguments_size = self.arguments_size.max(size);
    }

    pub fn build(self) -> Frame {
        Frame {
            label: self.label,
            static_level: self.static_level,
            parameters_size: self.parameters_size,
            locals_size: self.locals_size,
            arguments_size: self.arguments_size,
        }
    }
}
