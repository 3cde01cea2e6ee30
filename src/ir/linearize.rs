//! # Linearization
//!
//! Brings generated IR into the flat form the interpreter executes: every
//! code chunk body becomes one `SEQ` of plain statements, and no `ESEQ`
//! survives anywhere.
//!
//! The pass walks statements in execution order and appends to an output
//! list. An `ESEQ` inside an expression emits its statement first and is
//! replaced by its value. When an operand further right emits statements,
//! the operands to its left have already been evaluated in source
//! order, so their values are spilled into fresh temporaries before
//! those statements run. Constants, names and temporaries are never spilled.

use log::debug;

use crate::error::CompileError;

use super::chunk::{Chunk, CodeChunk};
use super::tree::{IrExpr, IrStmt, TempGenerator};

/// Linearize every code chunk. Data and global chunks pass through.
pub fn linearize(chunks: Vec<Chunk>, temps: &mut TempGenerator) -> Result<Vec<Chunk>, CompileError> {
    let mut linearized = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        let chunk = match chunk {
            Chunk::Code(CodeChunk { frame, body }) => {
                let statements = linearize_stmt(body, temps)?;
                debug!("linearized {}: {} statements", frame.label, statements.len());
                Chunk::Code(CodeChunk {
                    frame,
                    body: IrStmt::Seq(statements),
                })
            }
            other => other,
        };
        linearized.push(chunk);
    }
    Ok(linearized)
}

/// Flatten a single statement into a list of plain statements.
pub fn linearize_stmt(stmt: IrStmt, temps: &mut TempGenerator) -> Result<Vec<IrStmt>, CompileError> {
    let mut linearizer = Linearizer { temps };
    let mut out = Vec::new();
    linearizer.stmt(stmt, &mut out)?;
    Ok(out)
}

struct Linearizer<'a> {
    temps: &'a mut TempGenerator,
}

impl Linearizer<'_> {
    fn stmt(&mut self, stmt: IrStmt, out: &mut Vec<IrStmt>) -> Result<(), CompileError> {
        match stmt {
            IrStmt::Seq(statements) => {
                for stmt in statements {
                    self.stmt(stmt, out)?;
                }
            }
            IrStmt::Label(_) | IrStmt::Jump(_) => out.push(stmt),
            IrStmt::CJump {
                condition,
                then_label,
                else_label,
            } => {
                let condition = self.expr(condition, out)?;
                out.push(IrStmt::cjump(condition, then_label, else_label));
            }
            IrStmt::Exp(expr) => {
                let expr = self.expr(expr, out)?;
                if !discardable(&expr) {
                    out.push(IrStmt::Exp(expr));
                }
            }
            IrStmt::Move { dst, src } => self.mov(dst, src, out)?,
        }
        Ok(())
    }

    fn mov(&mut self, dst: IrExpr, src: IrExpr, out: &mut Vec<IrStmt>) -> Result<(), CompileError> {
        match dst {
            IrExpr::Temp(temp) => {
                let src = self.expr(src, out)?;
                out.push(IrStmt::mov(IrExpr::Temp(temp), src));
            }
            IrExpr::Mem(address) => {
                let mut operands = self.sequence(vec![*address, src], out)?;
                let src = operands.pop();
                let address = operands.pop();
                match (address, src) {
                    (Some(address), Some(src)) => out.push(IrStmt::mov(IrExpr::mem(address), src)),
                    _ => {
                        return Err(CompileError::Unlinearizable {
                            what: "move with missing operands".to_string(),
                        })
                    }
                }
            }
            IrExpr::Eseq { stmt, expr } => {
                self.stmt(*stmt, out)?;
                self.mov(*expr, src, out)?;
            }
            other => {
                return Err(CompileError::Unlinearizable {
                    what: format!("move into {:?}", other),
                })
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: IrExpr, out: &mut Vec<IrStmt>) -> Result<IrExpr, CompileError> {
        match expr {
            IrExpr::Eseq { stmt, expr } => {
                self.stmt(*stmt, out)?;
                self.expr(*expr, out)
            }
            IrExpr::Binop { op, lhs, rhs } => {
                let mut operands = self.sequence(vec![*lhs, *rhs], out)?;
                let rhs = operands.pop();
                let lhs = operands.pop();
                match (lhs, rhs) {
                    (Some(lhs), Some(rhs)) => Ok(IrExpr::binop(op, lhs, rhs)),
                    _ => Err(CompileError::Unlinearizable {
                        what: format!("{} with missing operands", op.mnemonic()),
                    }),
                }
            }
            IrExpr::Mem(address) => Ok(IrExpr::mem(self.expr(*address, out)?)),
            IrExpr::Call { label, args } => {
                let args = self.sequence(args, out)?;
                Ok(IrExpr::Call { label, args })
            }
            IrExpr::Const(_) | IrExpr::Name(_) | IrExpr::Temp(_) => Ok(expr),
        }
    }

    /// Linearize operands that are evaluated left to right.
    fn sequence(
        &mut self,
        operands: Vec<IrExpr>,
        out: &mut Vec<IrStmt>,
    ) -> Result<Vec<IrExpr>, CompileError> {
        let mut values: Vec<IrExpr> = Vec::with_capacity(operands.len());
        for operand in operands {
            let mut pending = Vec::new();
            let value = self.expr(operand, &mut pending)?;
            if !pending.is_empty() {
                for earlier in values.iter_mut().filter(|value| !commutes(value)) {
                    let temp = IrExpr::Temp(self.temps.next_temp());
                    let spilled = std::mem::replace(earlier, temp.clone());
                    out.push(IrStmt::mov(temp, spilled));
                }
                out.append(&mut pending);
            }
            values.push(value);
        }
        Ok(values)
    }
}

/// Expressions whose value no statement can change.
fn commutes(expr: &IrExpr) -> bool {
    matches!(expr, IrExpr::Const(_) | IrExpr::Name(_) | IrExpr::Temp(_))
}

/// Expression statements with no effect: plain values and a reload of a
/// cell whose address sits in a temporary.
fn discardable(expr: &IrExpr) -> bool {
    match expr {
        IrExpr::Mem(address) => matches!(**address, IrExpr::Temp(_)),
        other => commutes(other),
    }
}
