//! # Tree IR Interpreter
//!
//! Executes linearized chunks on a simulated word-addressed [`Memory`] with
//! two pseudo-registers, the frame pointer and the stack pointer. Both are
//! registered as the labels `{FP}` and `{SP}`, so the IR reads them like any
//! other named location and they are re-registered on every call and return.
//!
//! ## Call protocol
//!
//! The caller evaluates every argument, then stores them into successive
//! words starting at its stack pointer (the static link first). The callee
//! then
//!
//! 1. saves the caller's frame pointer at `SP - old_fp_offset`
//! 2. sets `FP = SP` and moves `SP` down by the frame size
//! 3. runs its flat statement list with a fresh set of temporaries
//! 4. restores `SP = FP` and `FP` from the saved slot
//!
//! and the caller reads the result from the word at its stack pointer.
//!
//! Source-level recursion maps to host recursion; deep recursion can exhaust
//! the host stack.

mod error;
mod memory;
mod value;

pub use error::RuntimeError;
pub use memory::Memory;
pub use value::Value;

use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::builtin::Builtin;
use crate::config::{MachineConfig, WORD_SIZE};
use crate::frame::{Frame, Label};
use crate::ir::{BinOp, Chunk, IrExpr, IrStmt, Temp};

/// A code chunk prepared for execution.
#[derive(Debug)]
struct Routine {
    frame: Frame,
    statements: Vec<IrStmt>,
    /// Label → statement index. `None` when the body is not linear.
    jumps: Option<HashMap<Label, usize>>,
}

impl Routine {
    fn new(frame: Frame, body: IrStmt) -> Self {
        let linear = body.is_linear();
        let statements = match body {
            IrStmt::Seq(statements) => statements,
            other => vec![other],
        };
        let jumps = linear.then(|| {
            statements
                .iter()
                .enumerate()
                .filter_map(|(index, stmt)| match stmt {
                    IrStmt::Label(label) => Some((label.clone(), index)),
                    _ => None,
                })
                .collect()
        });
        Self {
            frame,
            statements,
            jumps,
        }
    }
}

type Temps = HashMap<Temp, i64>;

pub struct Interpreter<'out> {
    memory: Memory,
    routines: Vec<Rc<Routine>>,
    output: Option<&'out mut dyn Write>,
    rng: StdRng,
    fp: i64,
    sp: i64,
}

impl<'out> Interpreter<'out> {
    /// Lay out `chunks` in the static area and place the stack at the top of
    /// memory. Output is suppressed until [`Interpreter::with_output`].
    pub fn new(chunks: &[Chunk], config: &MachineConfig) -> Result<Self, RuntimeError> {
        config.validate()?;

        let mut memory = Memory::new(config.memory_size);
        let mut routines = Vec::new();

        for chunk in chunks {
            match chunk {
                Chunk::Code(code) => {
                    let address = memory.allocate_static(WORD_SIZE)?;
                    memory.store(address, Value::Code(routines.len()))?;
                    memory.register_label(code.frame.label.clone(), address);
                    routines.push(Rc::new(Routine::new(code.frame.clone(), code.body.clone())));
                }
                Chunk::Data(data) => {
                    let address = memory.allocate_static(data.global.size)?;
                    memory.store(address, Value::Str(data.data.clone()))?;
                    memory.register_label(data.global.label.clone(), address);
                }
                Chunk::Global(global) => {
                    let address = memory.allocate_static(global.global.size)?;
                    memory.register_label(global.global.label.clone(), address);
                }
            }
        }
        debug!(
            "static area: {} chunks, {} bytes",
            chunks.len(),
            memory.static_top()
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let top = memory.size() - WORD_SIZE;
        let mut interpreter = Self {
            memory,
            routines,
            output: None,
            rng,
            fp: top,
            sp: top,
        };
        interpreter.register_pointers();
        Ok(interpreter)
    }

    /// Send print builtins to `output`.
    pub fn with_output(mut self, output: &'out mut dyn Write) -> Self {
        self.output = Some(output);
        self
    }

    /// Run the `main` chunk and return its result.
    pub fn run_main(&mut self) -> Result<i64, RuntimeError> {
        self.interpret(&Label::named("main"))
    }

    /// Run the code chunk labelled `entry` with a zero static link.
    pub fn interpret(&mut self, entry: &Label) -> Result<i64, RuntimeError> {
        let routine = self
            .routine(entry)
            .ok_or_else(|| RuntimeError::MissingEntry {
                label: entry.clone(),
            })?;
        debug!("entering {}", entry);
        self.memory.store(self.sp, Value::Int(0))?;
        self.invoke(&routine)?;
        self.memory.load_int(self.sp)
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn frame_pointer(&self) -> i64 {
        self.fp
    }

    pub fn stack_pointer(&self) -> i64 {
        self.sp
    }

    fn routine(&self, label: &Label) -> Option<Rc<Routine>> {
        let address = self.memory.address(label)?;
        match self.memory.load(address).ok()? {
            Value::Code(index) => self.routines.get(*index).cloned(),
            _ => None,
        }
    }

    fn register_pointers(&mut self) {
        self.memory.register_label(Label::frame_pointer(), self.fp);
        self.memory.register_label(Label::stack_pointer(), self.sp);
    }

    fn invoke(&mut self, routine: &Routine) -> Result<(), RuntimeError> {
        let frame = &routine.frame;
        let jumps = routine
            .jumps
            .as_ref()
            .ok_or_else(|| RuntimeError::Unlinearized {
                label: frame.label.clone(),
            })?;

        let stack_pointer = self.sp - frame.size();
        if stack_pointer < self.memory.static_top() {
            return Err(RuntimeError::StackOverflow {
                stack_pointer,
                static_top: self.memory.static_top(),
            });
        }
        self.memory
            .store(self.sp - frame.old_fp_offset(), Value::Int(self.fp))?;
        self.fp = self.sp;
        self.sp = stack_pointer;
        self.register_pointers();
        trace!("call {}: fp={} sp={}", frame.label, self.fp, self.sp);

        let mut temps = Temps::new();
        let mut pc = 0;
        while let Some(stmt) = routine.statements.get(pc) {
            pc = match self.execute(stmt, &mut temps)? {
                Some(target) => *jumps
                    .get(&target)
                    .ok_or(RuntimeError::UnknownJumpTarget { label: target })?,
                None => pc + 1,
            };
        }

        self.sp = self.fp;
        self.fp = self.memory.load_int(self.fp - frame.old_fp_offset())?;
        self.register_pointers();
        trace!("return {}: fp={} sp={}", frame.label, self.fp, self.sp);
        Ok(())
    }

    /// Execute one statement, returning the label to continue at, if any.
    fn execute(&mut self, stmt: &IrStmt, temps: &mut Temps) -> Result<Option<Label>, RuntimeError> {
        match stmt {
            IrStmt::CJump {
                condition,
                then_label,
                else_label,
            } => {
                let target = if self.eval(condition, temps)? != 0 {
                    then_label
                } else {
                    else_label
                };
                Ok(Some(target.clone()))
            }
            IrStmt::Jump(label) => Ok(Some(label.clone())),
            IrStmt::Label(_) => Ok(None),
            IrStmt::Exp(expr) => {
                self.eval(expr, temps)?;
                Ok(None)
            }
            IrStmt::Move { dst, src } => {
                match dst {
                    IrExpr::Temp(temp) => {
                        let value = self.eval(src, temps)?;
                        temps.insert(*temp, value);
                    }
                    // the destination address is evaluated before the source
                    IrExpr::Mem(address) => {
                        let address = self.eval(address, temps)?;
                        let value = self.eval(src, temps)?;
                        self.memory.store(address, Value::Int(value))?;
                    }
                    other => {
                        return Err(RuntimeError::InvalidMoveTarget {
                            target: format!("{:?}", other),
                        })
                    }
                }
                Ok(None)
            }
            IrStmt::Seq(_) => Err(RuntimeError::Unlinearized {
                label: Label::named("SEQ"),
            }),
        }
    }

    fn eval(&mut self, expr: &IrExpr, temps: &mut Temps) -> Result<i64, RuntimeError> {
        match expr {
            IrExpr::Const(value) => Ok(*value),
            IrExpr::Name(label) => self
                .memory
                .address(label)
                .ok_or_else(|| RuntimeError::UnknownLabel {
                    label: label.clone(),
                }),
            IrExpr::Temp(temp) => temps
                .get(temp)
                .copied()
                .ok_or(RuntimeError::UnassignedTemp { temp: temp.0 }),
            IrExpr::Mem(address) => {
                let address = self.eval(address, temps)?;
                self.memory.load_int(address)
            }
            IrExpr::Binop { op, lhs, rhs } => {
                let lhs = self.eval(lhs, temps)?;
                let rhs = self.eval(rhs, temps)?;
                binop(*op, lhs, rhs)
            }
            IrExpr::Call { label, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg, temps)?);
                }
                self.call(label, values)
            }
            IrExpr::Eseq { .. } => Err(RuntimeError::Unlinearized {
                label: Label::named("ESEQ"),
            }),
        }
    }

    fn call(&mut self, label: &Label, args: Vec<i64>) -> Result<i64, RuntimeError> {
        if let Label::Named(name) = label {
            if let Some(builtin) = Builtin::from_name(name) {
                return self.builtin(builtin, &args);
            }
        }

        let routine = self
            .routine(label)
            .ok_or_else(|| RuntimeError::NotCallable {
                label: label.clone(),
            })?;
        for (index, value) in args.into_iter().enumerate() {
            self.memory
                .store(self.sp + index as i64 * WORD_SIZE, Value::Int(value))?;
        }
        self.invoke(&routine)?;
        self.memory.load_int(self.sp)
    }

    fn builtin(&mut self, builtin: Builtin, args: &[i64]) -> Result<i64, RuntimeError> {
        // args[0] is the static link
        let expected = builtin.arity() + 1;
        if args.len() != expected {
            return Err(RuntimeError::BuiltinArity {
                name: builtin.name().to_string(),
                expected: builtin.arity(),
                found: args.len().saturating_sub(1),
            });
        }

        match builtin {
            Builtin::PrintInt => {
                self.print(&args[1].to_string())?;
                Ok(args[1])
            }
            Builtin::PrintStr => {
                let text = match self.memory.load(args[1])? {
                    Value::Str(text) => format!("\"{}\"", text),
                    _ => return Err(RuntimeError::NotAString { address: args[1] }),
                };
                self.print(&text)?;
                Ok(args[1])
            }
            Builtin::PrintLog => {
                self.print(if args[1] != 0 { "true" } else { "false" })?;
                Ok(args[1])
            }
            Builtin::RandInt => {
                let (low, high) = (args[1], args[2]);
                if low >= high {
                    return Err(RuntimeError::EmptyRange { low, high });
                }
                Ok(self.rng.gen_range(low..high))
            }
            Builtin::Seed => {
                self.rng = StdRng::seed_from_u64(args[1] as u64);
                Ok(0)
            }
        }
    }

    fn print(&mut self, line: &str) -> Result<(), RuntimeError> {
        if let Some(output) = self.output.as_mut() {
            writeln!(output, "{}", line).map_err(|error| RuntimeError::Output {
                message: error.to_string(),
            })?;
        }
        Ok(())
    }
}

fn binop(op: BinOp, lhs: i64, rhs: i64) -> Result<i64, RuntimeError> {
    let truth = |value: bool| i64::from(value);
    Ok(match op {
        BinOp::Add => lhs.wrapping_add(rhs),
        BinOp::Sub => lhs.wrapping_sub(rhs),
        BinOp::Mul => lhs.wrapping_mul(rhs),
        BinOp::Div => {
            if rhs == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            lhs.wrapping_div(rhs)
        }
        BinOp::Mod => {
            if rhs == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            lhs.wrapping_rem(rhs)
        }
        BinOp::And => truth(lhs != 0 && rhs != 0),
        BinOp::Or => truth(lhs != 0 || rhs != 0),
        BinOp::Eq => truth(lhs == rhs),
        BinOp::Neq => truth(lhs != rhs),
        BinOp::Lt => truth(lhs < rhs),
        BinOp::Gt => truth(lhs > rhs),
        BinOp::Leq => truth(lhs <= rhs),
        BinOp::Geq => truth(lhs >= rhs),
    })
}
