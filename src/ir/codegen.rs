//! # IR Generation
//!
//! Second pass over the resolved AST. Every expression node lowers to either
//! an IR expression or, for control flow, an IR statement; every function
//! definition becomes a [`CodeChunk`], every string literal a [`DataChunk`]
//! and every global variable a [`GlobalChunk`].
//!
//! ## Static links
//!
//! The generator tracks the static level of the body being lowered. A
//! variable owned by level `L`, referenced at level `S`, is reached by
//! following `S - L` static links from the frame pointer before adding its
//! offset. A call passes the static link the callee expects:
//!
//! | callee level `C`        | static link            |
//! |-------------------------|------------------------|
//! | `C <= 1` or builtin     | `CONST 0`              |
//! | `C > S` (nested in us)  | `FP`                   |
//! | otherwise               | `S - C + 1` loads from `FP` |
//!
//! The output still contains nested `SEQ`/`ESEQ` nodes; see
//! [`crate::ir::linearize`] for the pass that flattens it.

use log::debug;

use crate::ast::*;
use crate::builtin::Builtin;
use crate::config::WORD_SIZE;
use crate::error::CompileError;
use crate::frame::{Access, FrameTable, GlobalAccess, Label, LabelGenerator};
use crate::semantic::Resolved;

use super::chunk::{Chunk, CodeChunk, DataChunk, GlobalChunk};
use super::tree::{BinOp, IrExpr, IrStmt, TempGenerator};

/// Result of lowering one AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lowered {
    Expr(IrExpr),
    Stmt(IrStmt),
}

impl Lowered {
    fn into_stmt(self) -> IrStmt {
        match self {
            Lowered::Expr(expr) => IrStmt::Exp(expr),
            Lowered::Stmt(stmt) => stmt,
        }
    }
}

pub struct CodeGenerator<'a> {
    resolved: &'a Resolved,
    frames: &'a FrameTable,
    labels: &'a mut LabelGenerator,
    temps: &'a mut TempGenerator,
    chunks: Vec<Chunk>,
    static_level: usize,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(
        resolved: &'a Resolved,
        frames: &'a FrameTable,
        labels: &'a mut LabelGenerator,
        temps: &'a mut TempGenerator,
    ) -> Self {
        Self {
            resolved,
            frames,
            labels,
            temps,
            chunks: Vec::new(),
            static_level: 0,
        }
    }

    /// Generate the chunks of a whole program.
    pub fn generate(
        program: &Program,
        resolved: &'a Resolved,
        frames: &'a FrameTable,
        labels: &'a mut LabelGenerator,
        temps: &'a mut TempGenerator,
    ) -> Result<Vec<Chunk>, CompileError> {
        let mut generator = Self::new(resolved, frames, labels, temps);
        generator.definitions(&program.definitions)?;
        debug!("generated {} chunks", generator.chunks.len());
        Ok(generator.chunks)
    }

    fn definitions(&mut self, definitions: &[Definition]) -> Result<(), CompileError> {
        for definition in definitions {
            match definition {
                Definition::Fun(fun) => self.fun_def(fun)?,
                Definition::Var(var) => self.var_def(var)?,
                Definition::Type(_) => {}
            }
        }
        Ok(())
    }

    fn fun_def(&mut self, fun: &FunDef) -> Result<(), CompileError> {
        self.static_level += 1;
        let body = self.lower(&fun.body);
        self.static_level -= 1;
        let body = expect_expr(body?, "function body", fun.body.position())?;

        let frame = self
            .frames
            .frame(fun.id)
            .ok_or_else(|| CompileError::missing_frame(&fun.name, &fun.position))?;

        // The result lands in the static link slot, where the caller reads it.
        let body = IrStmt::mov(IrExpr::mem(IrExpr::fp()), body);
        self.chunks.push(Chunk::Code(CodeChunk {
            frame: frame.clone(),
            body,
        }));
        Ok(())
    }

    fn var_def(&mut self, var: &VarDef) -> Result<(), CompileError> {
        let access = self
            .frames
            .access(var.id)
            .ok_or_else(|| CompileError::missing_access(&var.name, &var.position))?;
        if let Access::Global(global) = access {
            self.chunks.push(Chunk::Global(GlobalChunk {
                global: global.clone(),
            }));
        }
        Ok(())
    }

    /// Lower an expression node.
    pub fn lower(&mut self, expression: &Expression) -> Result<Lowered, CompileError> {
        match expression {
            Expression::Binary(binary) => self.binary(binary),
            Expression::Block(block) => self.block(block),
            Expression::Call(call) => self.call(call),
            Expression::For(for_loop) => self.for_loop(for_loop),
            Expression::IfThenElse(if_then_else) => self.if_then_else(if_then_else),
            Expression::Literal(literal) => Ok(Lowered::Expr(self.literal(literal))),
            Expression::Name(name) => self.name(name).map(Lowered::Expr),
            Expression::Unary(unary) => self.unary(unary),
            Expression::While(while_loop) => self.while_loop(while_loop),
            Expression::Where(where_expr) => {
                self.definitions(&where_expr.definitions)?;
                let expr = self.lower_expr(&where_expr.expr, "where expression")?;
                Ok(Lowered::Expr(expr))
            }
        }
    }

    fn lower_expr(&mut self, expression: &Expression, what: &str) -> Result<IrExpr, CompileError> {
        let lowered = self.lower(expression)?;
        expect_expr(lowered, what, expression.position())
    }

    fn lower_stmt(&mut self, expression: &Expression) -> Result<IrStmt, CompileError> {
        Ok(self.lower(expression)?.into_stmt())
    }

    fn binary(&mut self, binary: &Binary) -> Result<Lowered, CompileError> {
        let left = self.lower_expr(&binary.left, "left operand")?;
        let right = self.lower_expr(&binary.right, "right operand")?;

        let expr = match binary.op {
            BinOpKind::Index => {
                let element_size = self
                    .resolved
                    .type_of(binary.id)
                    .ok_or_else(|| CompileError::missing_type("array element", &binary.position))?
                    .size_in_bytes();
                // a dereferenced base is already an address
                let base = match left {
                    IrExpr::Mem(address) => *address,
                    other => other,
                };
                let offset = IrExpr::binop(BinOp::Mul, right, IrExpr::Const(element_size));
                IrExpr::mem(IrExpr::binop(BinOp::Add, base, offset))
            }
            BinOpKind::Assign => self.assign(left, right),
            op => IrExpr::binop(operator(op), left, right),
        };
        Ok(Lowered::Expr(expr))
    }

    /// `ESEQ(MOVE(target, value), target)`. A target address with side
    /// effects is computed once into a temporary before the value.
    fn assign(&mut self, target: IrExpr, value: IrExpr) -> IrExpr {
        match target {
            IrExpr::Mem(address) if !is_pure(&address) => {
                let temp = IrExpr::Temp(self.temps.next_temp());
                let cell = IrExpr::mem(temp.clone());
                IrExpr::eseq(
                    IrStmt::Seq(vec![
                        IrStmt::mov(temp, *address),
                        IrStmt::mov(cell.clone(), value),
                    ]),
                    cell,
                )
            }
            target => IrExpr::eseq(IrStmt::mov(target.clone(), value), target),
        }
    }

    fn block(&mut self, block: &Block) -> Result<Lowered, CompileError> {
        let mut lowered = Vec::with_capacity(block.expressions.len());
        for expression in &block.expressions {
            lowered.push(self.lower(expression)?);
        }

        match lowered.pop() {
            Some(Lowered::Expr(value)) => {
                let statements = lowered.into_iter().map(Lowered::into_stmt).collect();
                Ok(Lowered::Expr(IrExpr::eseq(IrStmt::Seq(statements), value)))
            }
            Some(Lowered::Stmt(_)) => {
                let last = block
                    .expressions
                    .last()
                    .map(Expression::position)
                    .unwrap_or(&block.position);
                Err(CompileError::expected_expression("last block item", last))
            }
            None => Err(CompileError::EmptyBlock {
                span: block.position.clone(),
            }),
        }
    }

    fn call(&mut self, call: &Call) -> Result<Lowered, CompileError> {
        let (label, callee_level, save_fp) = match Builtin::from_name(&call.name) {
            Some(builtin) => (Label::named(builtin.name()), 1, None),
            None => {
                let definition = self
                    .resolved
                    .definition(call.id)
                    .ok_or_else(|| CompileError::missing_definition(&call.name, &call.position))?;
                let frame = self
                    .frames
                    .frame(definition)
                    .ok_or_else(|| CompileError::missing_frame(&call.name, &call.position))?;
                // store our FP into the callee's old FP slot
                let save_fp = IrStmt::mov(
                    IrExpr::mem(IrExpr::binop(
                        BinOp::Sub,
                        IrExpr::sp(),
                        IrExpr::Const(frame.old_fp_offset()),
                    )),
                    IrExpr::fp(),
                );
                (frame.label.clone(), frame.static_level, Some(save_fp))
            }
        };

        let mut args = Vec::with_capacity(call.args.len() + 1);
        args.push(self.static_link(callee_level));
        for arg in &call.args {
            args.push(self.lower_expr(arg, "call argument")?);
        }

        let prelude = save_fp.unwrap_or_else(|| IrStmt::Seq(Vec::new()));
        Ok(Lowered::Expr(IrExpr::eseq(
            prelude,
            IrExpr::Call { label, args },
        )))
    }

    /// Static link passed to a callee defined at `callee_level`.
    fn static_link(&self, callee_level: usize) -> IrExpr {
        if callee_level <= 1 {
            IrExpr::Const(0)
        } else if callee_level > self.static_level {
            IrExpr::fp()
        } else {
            follow_static_links(self.static_level - callee_level + 1)
        }
    }

    fn for_loop(&mut self, for_loop: &For) -> Result<Lowered, CompileError> {
        if !matches!(*for_loop.counter, Expression::Name(_)) {
            return Err(CompileError::InvalidCounter {
                span: for_loop.counter.position().clone(),
            });
        }
        let counter = self.lower_expr(&for_loop.counter, "for counter")?;
        let low = self.lower_expr(&for_loop.low, "for lower bound")?;
        let high = self.lower_expr(&for_loop.high, "for upper bound")?;
        let step = self.lower_expr(&for_loop.step, "for step")?;
        let body = self.lower_stmt(&for_loop.body)?;

        let body_label = self.labels.next_anonymous();
        let end_label = self.labels.next_anonymous();
        let condition_label = self.labels.next_anonymous();
        let high_temp = IrExpr::Temp(self.temps.next_temp());
        let step_temp = IrExpr::Temp(self.temps.next_temp());

        Ok(Lowered::Stmt(IrStmt::Seq(vec![
            IrStmt::mov(counter.clone(), low),
            IrStmt::mov(high_temp.clone(), high),
            IrStmt::mov(step_temp.clone(), step),
            IrStmt::Label(condition_label.clone()),
            IrStmt::cjump(
                IrExpr::binop(BinOp::Lt, counter.clone(), high_temp),
                body_label.clone(),
                end_label.clone(),
            ),
            IrStmt::Label(body_label),
            body,
            IrStmt::mov(
                counter.clone(),
                IrExpr::binop(BinOp::Add, counter, step_temp),
            ),
            IrStmt::Jump(condition_label),
            IrStmt::Label(end_label),
        ])))
    }

    fn if_then_else(&mut self, if_then_else: &IfThenElse) -> Result<Lowered, CompileError> {
        let condition = self.lower_expr(&if_then_else.condition, "if condition")?;
        let then_branch = self.lower_stmt(&if_then_else.then_expr)?;
        let else_branch = match &if_then_else.else_expr {
            Some(else_expr) => Some(self.lower_stmt(else_expr)?),
            None => None,
        };

        let then_label = self.labels.next_anonymous();
        let else_label = self.labels.next_anonymous();
        let end_label = self.labels.next_anonymous();

        let mut statements = Vec::new();
        let false_target = if else_branch.is_some() {
            else_label.clone()
        } else {
            end_label.clone()
        };
        statements.push(IrStmt::cjump(condition, then_label.clone(), false_target));
        statements.push(IrStmt::Label(then_label));
        statements.push(then_branch);
        statements.push(IrStmt::Jump(end_label.clone()));
        if let Some(else_branch) = else_branch {
            statements.push(IrStmt::Label(else_label));
            statements.push(else_branch);
            statements.push(IrStmt::Jump(end_label.clone()));
        }
        statements.push(IrStmt::Label(end_label));

        Ok(Lowered::Stmt(IrStmt::Seq(statements)))
    }

    fn while_loop(&mut self, while_loop: &While) -> Result<Lowered, CompileError> {
        let condition = self.lower_expr(&while_loop.condition, "while condition")?;
        let body = self.lower_stmt(&while_loop.body)?;

        let condition_label = self.labels.next_anonymous();
        let body_label = self.labels.next_anonymous();
        let end_label = self.labels.next_anonymous();

        Ok(Lowered::Stmt(IrStmt::Seq(vec![
            IrStmt::Label(condition_label.clone()),
            IrStmt::cjump(condition, body_label.clone(), end_label.clone()),
            IrStmt::Label(body_label),
            body,
            IrStmt::Jump(condition_label),
            IrStmt::Label(end_label),
        ])))
    }

    fn literal(&mut self, literal: &Literal) -> IrExpr {
        match &literal.value {
            LiteralValue::Int(value) => IrExpr::Const(*value),
            LiteralValue::Log(value) => IrExpr::Const(i64::from(*value)),
            LiteralValue::Str(text) => {
                let label = self.labels.next_anonymous();
                self.chunks.push(Chunk::Data(DataChunk {
                    global: GlobalAccess {
                        size: WORD_SIZE,
                        label: label.clone(),
                    },
                    data: text.clone(),
                }));
                IrExpr::Name(label)
            }
        }
    }

    fn name(&mut self, name: &Name) -> Result<IrExpr, CompileError> {
        let definition = self
            .resolved
            .definition(name.id)
            .ok_or_else(|| CompileError::missing_definition(&name.name, &name.position))?;
        let access = self
            .frames
            .access(definition)
            .ok_or_else(|| CompileError::missing_access(&name.name, &name.position))?;

        match access {
            Access::Global(global) => Ok(IrExpr::mem(IrExpr::Name(global.label.clone()))),
            Access::Local(stack) | Access::Parameter(stack) => {
                let hops = self
                    .static_level
                    .checked_sub(stack.static_level)
                    .ok_or_else(|| CompileError::unexpected_definition(&name.name, &name.position))?;
                let frame = follow_static_links(hops);
                Ok(IrExpr::mem(IrExpr::binop(
                    BinOp::Add,
                    frame,
                    IrExpr::Const(stack.offset),
                )))
            }
        }
    }

    fn unary(&mut self, unary: &Unary) -> Result<Lowered, CompileError> {
        let operand = self.lower_expr(&unary.operand, "unary operand")?;
        let expr = match unary.op {
            UnaryOpKind::Plus => operand,
            UnaryOpKind::Minus => IrExpr::binop(BinOp::Sub, IrExpr::Const(0), operand),
            // 0/1 encoding: (x - 1) * -1
            UnaryOpKind::Not => IrExpr::binop(
                BinOp::Mul,
                IrExpr::binop(BinOp::Sub, operand, IrExpr::Const(1)),
                IrExpr::Const(-1),
            ),
        };
        Ok(Lowered::Expr(expr))
    }
}

/// Frame pointer of the frame `hops` static links above the current one.
fn follow_static_links(hops: usize) -> IrExpr {
    (0..hops).fold(IrExpr::fp(), |frame, _| IrExpr::mem(frame))
}

/// Address arithmetic over constants, names and temporaries only.
fn is_pure(expr: &IrExpr) -> bool {
    match expr {
        IrExpr::Const(_) | IrExpr::Name(_) | IrExpr::Temp(_) => true,
        IrExpr::Binop { lhs, rhs, .. } => is_pure(lhs) && is_pure(rhs),
        _ => false,
    }
}

fn expect_expr(
    lowered: Lowered,
    what: &str,
    position: &lachs::Span,
) -> Result<IrExpr, CompileError> {
    match lowered {
        Lowered::Expr(expr) => Ok(expr),
        Lowered::Stmt(_) => Err(CompileError::expected_expression(what, position)),
    }
}

fn operator(op: BinOpKind) -> BinOp {
    match op {
        BinOpKind::Add => BinOp::Add,
        BinOpKind::Sub => BinOp::Sub,
        BinOpKind::Mul => BinOp::Mul,
        BinOpKind::Div => BinOp::Div,
        BinOpKind::Mod => BinOp::Mod,
        BinOpKind::And => BinOp::And,
        BinOpKind::Or => BinOp::Or,
        BinOpKind::Eq => BinOp::Eq,
        BinOpKind::NotEq => BinOp::Neq,
        BinOpKind::Lt => BinOp::Lt,
        BinOpKind::Gt => BinOp::Gt,
        BinOpKind::LtEq => BinOp::Leq,
        BinOpKind::GtEq => BinOp::Geq,
        BinOpKind::Index | BinOpKind::Assign => {
            unreachable!("index and assignment are lowered separately")
        }
    }
}
