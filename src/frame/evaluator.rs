//! Frame evaluation: one pass over the resolved AST assigning a [`Frame`] to
//! every function definition and an [`Access`] to every variable and
//! parameter definition.
//!
//! The stack of in-progress [`FrameBuilder`]s is threaded through the
//! traversal as an explicit argument. An empty stack means the traversal is
//! at the top level of the program.

use std::collections::HashMap;

use log::debug;

use crate::ast::*;
use crate::config::WORD_SIZE;
use crate::error::CompileError;
use crate::semantic::Resolved;

use super::access::{Access, GlobalAccess, StackAccess};
use super::label::{Label, LabelGenerator};
use super::layout::{Frame, FrameBuilder};

/// Builders of the functions lexically enclosing the current node, innermost last.
pub type BuilderStack = Vec<FrameBuilder>;

/// Frames keyed by function definition, accesses keyed by variable or
/// parameter definition.
#[derive(Debug, Clone, Default)]
pub struct FrameTable {
    frames: HashMap<NodeId, Frame>,
    accesses: HashMap<NodeId, Access>,
}

impl FrameTable {
    pub fn frame(&self, definition: NodeId) -> Option<&Frame> {
        self.frames.get(&definition)
    }

    pub fn access(&self, definition: NodeId) -> Option<&Access> {
        self.accesses.get(&definition)
    }

    pub fn accesses(&self) -> impl Iterator<Item = (&NodeId, &Access)> {
        self.accesses.iter()
    }
}

pub struct FrameEvaluator<'a> {
    resolved: &'a Resolved,
    labels: &'a mut LabelGenerator,
    table: FrameTable,
}

impl<'a> FrameEvaluator<'a> {
    pub fn new(resolved: &'a Resolved, labels: &'a mut LabelGenerator) -> Self {
        Self {
            resolved,
            labels,
            table: FrameTable::default(),
        }
    }

    /// Lay out every frame and access of `program`.
    pub fn evaluate(
        program: &Program,
        resolved: &'a Resolved,
        labels: &'a mut LabelGenerator,
    ) -> Result<FrameTable, CompileError> {
        let mut evaluator = Self::new(resolved, labels);
        let mut builders = BuilderStack::new();
        evaluator.definitions(&program.definitions, &mut builders)?;
        debug!(
            "frame evaluation done: {} frames, {} accesses",
            evaluator.table.frames.len(),
            evaluator.table.accesses.len()
        );
        Ok(evaluator.table)
    }

    /// Evaluate a single definition with the given enclosing builders, e.g.
    /// a nested subtree in isolation.
    pub fn definition(
        &mut self,
        definition: &Definition,
        builders: &mut BuilderStack,
    ) -> Result<(), CompileError> {
        match definition {
            Definition::Fun(fun) => self.fun_def(fun, builders),
            Definition::Var(var) => self.var_def(var, builders),
            Definition::Type(_) => Ok(()),
        }
    }

    pub fn finish(self) -> FrameTable {
        self.table
    }

    fn definitions(
        &mut self,
        definitions: &[Definition],
        builders: &mut BuilderStack,
    ) -> Result<(), CompileError> {
        for definition in definitions {
            self.definition(definition, builders)?;
        }
        Ok(())
    }

    fn fun_def(&mut self, fun: &FunDef, builders: &mut BuilderStack) -> Result<(), CompileError> {
        let mut builder = if builders.is_empty() {
            FrameBuilder::new(Label::named(&fun.name), 1)
        } else {
            FrameBuilder::new(self.labels.next_anonymous(), builders.len() + 1)
        };
        // static link
        builder.add_parameter(WORD_SIZE);
        builders.push(builder);

        for param in &fun.params {
            self.parameter(param, builders)?;
        }
        self.expression(&fun.body, builders)?;

        let frame = builders
            .pop()
            .ok_or_else(|| CompileError::missing_frame(&fun.name, &fun.position))?
            .build();
        debug!(
            "frame for '{}': label {}, level {}, size {}",
            fun.name,
            frame.label,
            frame.static_level,
            frame.size()
        );
        self.table.frames.insert(fun.id, frame);
        Ok(())
    }

    fn parameter(
        &mut self,
        param: &Parameter,
        builders: &mut BuilderStack,
    ) -> Result<(), CompileError> {
        let ty = self
            .resolved
            .type_of(param.id)
            .ok_or_else(|| CompileError::missing_type(format!("parameter '{}'", param.name), &param.position))?;
        let builder = builders
            .last_mut()
            .ok_or_else(|| CompileError::unexpected_definition(&param.name, &param.position))?;

        let size = ty.size_as_param();
        let offset = builder.add_parameter(size);
        self.table.accesses.insert(
            param.id,
            Access::Parameter(StackAccess {
                size,
                offset,
                static_level: builder.static_level(),
            }),
        );
        Ok(())
    }

    fn var_def(&mut self, var: &VarDef, builders: &mut BuilderStack) -> Result<(), CompileError> {
        let ty = self
            .resolved
            .type_of(var.id)
            .ok_or_else(|| CompileError::missing_type(format!("variable '{}'", var.name), &var.position))?;
        let size = ty.size_in_bytes();

        let access = match builders.last_mut() {
            None => Access::Global(GlobalAccess {
                size,
                label: Label::named(&var.name),
            }),
            Some(builder) => Access::Local(StackAccess {
                size,
                offset: builder.add_local(size),
                static_level: builder.static_level(),
            }),
        };
        self.table.accesses.insert(var.id, access);
        Ok(())
    }

    fn expression(
        &mut self,
        expression: &Expression,
        builders: &mut BuilderStack,
    ) -> Result<(), CompileError> {
        match expression {
            Expression::Call(call) => {
                let builder = builders.last_mut().ok_or_else(|| {
                    CompileError::CallOutsideFunction {
                        name: call.name.clone(),
                        span: call.position.clone(),
                    }
                })?;
                builder.add_call(WORD_SIZE * call.args.len() as i64 + WORD_SIZE);
                for arg in &call.args {
                    self.expression(arg, builders)?;
                }
                Ok(())
            }
            Expression::Binary(binary) => {
                self.expression(&binary.left, builders)?;
                self.expression(&binary.right, builders)
            }
            Expression::Block(block) => {
                for expression in &block.expressions {
                    self.expression(expression, builders)?;
                }
                Ok(())
            }
            Expression::For(for_loop) => {
                self.expression(&for_loop.counter, builders)?;
                self.expression(&for_loop.low, builders)?;
                self.expression(&for_loop.high, builders)?;
                self.expression(&for_loop.step, builders)?;
                self.expression(&for_loop.body, builders)
            }
            Expression::IfThenElse(if_then_else) => {
                self.expression(&if_then_else.condition, builders)?;
                self.expression(&if_then_else.then_expr, builders)?;
                if let Some(else_expr) = &if_then_else.else_expr {
                    self.expression(else_expr, builders)?;
                }
                Ok(())
            }
            Expression::Unary(unary) => self.expression(&unary.operand, builders),
            Expression::While(while_loop) => {
                self.expression(&while_loop.condition, builders)?;
                self.expression(&while_loop.body, builders)
            }
            Expression::Where(where_expr) => {
                self.definitions(&where_expr.definitions, builders)?;
                self.expression(&where_expr.expr, builders)
            }
            Expression::Literal(_) | Expression::Name(_) => Ok(()),
        }
    }
}
