//! # Activation Records
//!
//! Passive layout data ([`Frame`], [`Access`], [`Label`]) and the pass that
//! computes it ([`FrameEvaluator`]).
//!
//! Layout decisions made here fix the addressing code the IR generator emits
//! and the call protocol the interpreter follows:
//!
//! - every function gets its own frame; top-level functions are labelled by
//!   name at static level 1, nested ones get an anonymous label at
//!   `enclosing depth + 1`
//! - the first incoming parameter slot (`FP + 0`) holds the static link
//! - variables defined outside any function are globals addressed by label

pub mod access;
pub mod evaluator;
pub mod label;
pub mod layout;

pub use access::{Access, GlobalAccess, StackAccess};
pub use evaluator::{BuilderStack, FrameEvaluator, FrameTable};
pub use label::{Label, LabelGenerator};
pub use layout::{Frame, FrameBuilder};
