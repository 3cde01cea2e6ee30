//! # Pins - Back End of a Small Imperative Language
//!
//! This crate takes a name-resolved, type-checked program of the PINS
//! language (integers, booleans, strings, arrays, nested functions, `where`
//! blocks, `if`/`while`/`for`) and runs it on a simulated machine. The
//! scanner, parser, name resolver and type checker are not part of this
//! crate; [`ast::builder::ProgramBuilder`] constructs their output directly.
//!
//! ## Architecture Overview
//!
//! The back end consists of the following stages:
//!
//! 1. **Frame evaluation** (`frame`) - Lays out one activation record per function
//!    and decides where every variable and parameter lives
//! 2. **IR generation** (`ir::codegen`) - Lowers the AST into a tree IR, one code
//!    chunk per function plus data chunks for strings and global chunks for
//!    top-level variables
//! 3. **Linearization** (`ir::linearize`) - Flattens nested sequences so every
//!    function body is a single list of statements
//! 4. **Interpreter** (`interpreter`) - Executes the chunks on a word-addressed
//!    memory with frame and stack pointers
//!
//! ## Pipeline Flow
//!
//! ```text
//! Resolved AST (ast::Program + semantic::Resolved)
//!     ↓
//! [Frame Evaluator] → frame::FrameTable
//!     ↓
//! [Code Generator] → Vec<ir::Chunk> (nested SEQ/ESEQ)
//!     ↓
//! [Linearizer] → Vec<ir::Chunk> (flat bodies)
//!     ↓
//! [Interpreter] → result of main, printed output
//! ```
//!
//! [`compile::compile`] runs the first three stages and [`compile::run`] all
//! four.
//!
//! ## Key Design Decisions
//!
//! ### Static Links
//! Functions nest arbitrarily. Every call passes a hidden first argument, the
//! frame pointer of the callee's lexically enclosing function, and accesses to
//! outer variables follow this chain. Built-ins and top-level functions get a
//! zero static link.
//!
//! ### Shared Word Size
//! [`config::WORD_SIZE`] is the one constant used by type sizes, frame
//! layout, code generation and the interpreter.
//!
//! ### Booleans as Integers
//! `log` values are `0` and `1`. Logical negation is computed arithmetically
//! as `(x - 1) * -1`.
//!
//! ### Internal Errors Abort
//! The front end has already validated the program, so a missing frame,
//! access or type is a defect in the pipeline and reported as a
//! [`error::CompileError`] with the offending position. Nothing falls back to
//! a default.
//!
//! ## Module Structure
//!
//! - [`ast`] - Resolved AST and the programmatic builder
//! - [`semantic`] - Types and the node→definition / node→type associations
//! - [`builtin`] - Reserved built-in functions
//! - [`config`] - Word size and machine configuration
//! - [`frame`] - Frames, accesses, labels and the frame evaluator
//! - [`ir`] - Tree IR, code generation and linearization
//! - [`interpreter`] - Simulated machine
//! - [`compile`] - Pipeline driver
//! - [`error`] - Compile-time internal errors
//!
//! ## Example Program
//!
//! ```pins
//! fun fact(n: int): int = if n <= 1 then 1 else n * fact(n - 1)
//! fun main(): int = print_int(fact(5))
//! ```
//!
//! Built with the builder and run:
//!
//! ```
//! use pins::ast::builder::ProgramBuilder;
//! use pins::ast::BinOpKind;
//! use pins::builtin::Builtin;
//! use pins::config::MachineConfig;
//! use pins::semantic::Type;
//!
//! let b = ProgramBuilder::new();
//! let main = b.fun("main", vec![], Type::int(), |_| {
//!     b.call_builtin(Builtin::PrintInt, vec![b.binary(BinOpKind::Mul, b.int(6), b.int(7))])
//! });
//! let (program, resolved) = b.finish(vec![main]);
//!
//! let mut out = Vec::new();
//! let result = pins::compile::run(&program, &resolved, &MachineConfig::default(), &mut out).unwrap();
//! assert_eq!(result, 42);
//! assert_eq!(String::from_utf8(out).unwrap(), "42\n");
//! ```

pub mod ast;
pub mod builtin;
pub mod compile;
pub mod config;
pub mod error;
pub mod frame;
pub mod interpreter;
pub mod ir;
pub mod semantic;
