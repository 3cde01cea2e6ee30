//! Pretty printer for the tree IR.
//!
//! Nested nodes print as an indented tree, one node per line:
//!
//! ```text
//! MOVE
//!   MEM
//!     NAME {FP}
//!   BINOP ADD
//!     CONST 1
//!     CONST 2
//! ```

use std::fmt::{self, Display};

use super::chunk::Chunk;
use super::tree::{IrExpr, IrStmt};

const INDENT: &str = "  ";

struct Formatter {
    buffer: String,
    indent_level: usize,
}

impl Formatter {
    fn new() -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
        }
    }

    fn indent(&mut self) {
        self.indent_level += 1;
    }

    fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    fn finish(self) -> String {
        self.buffer
    }
}

fn format_expr(expr: &IrExpr, f: &mut Formatter) {
    match expr {
        IrExpr::Binop { op, lhs, rhs } => {
            f.line(&format!("BINOP {}", op.mnemonic()));
            f.indent();
            format_expr(lhs, f);
            format_expr(rhs, f);
            f.dedent();
        }
        IrExpr::Call { label, args } => {
            f.line(&format!("CALL {}", label));
            f.indent();
            for arg in args {
                format_expr(arg, f);
            }
            f.dedent();
        }
        IrExpr::Const(value) => f.line(&format!("CONST {}", value)),
        IrExpr::Eseq { stmt, expr } => {
            f.line("ESEQ");
            f.indent();
            format_stmt(stmt, f);
            format_expr(expr, f);
            f.dedent();
        }
        IrExpr::Mem(address) => {
            f.line("MEM");
            f.indent();
            format_expr(address, f);
            f.dedent();
        }
        IrExpr::Name(label) => f.line(&format!("NAME {}", label)),
        IrExpr::Temp(temp) => f.line(&format!("TEMP t{}", temp.0)),
    }
}

fn format_stmt(stmt: &IrStmt, f: &mut Formatter) {
    match stmt {
        IrStmt::CJump {
            condition,
            then_label,
            else_label,
        } => {
            f.line(&format!("CJUMP {} {}", then_label, else_label));
            f.indent();
            format_expr(condition, f);
            f.dedent();
        }
        IrStmt::Exp(expr) => {
            f.line("EXP");
            f.indent();
            format_expr(expr, f);
            f.dedent();
        }
        IrStmt::Jump(label) => f.line(&format!("JUMP {}", label)),
        IrStmt::Label(label) => f.line(&format!("LABEL {}", label)),
        IrStmt::Move { dst, src } => {
            f.line("MOVE");
            f.indent();
            format_expr(dst, f);
            format_expr(src, f);
            f.dedent();
        }
        IrStmt::Seq(statements) => {
            f.line("SEQ");
            f.indent();
            for stmt in statements {
                format_stmt(stmt, f);
            }
            f.dedent();
        }
    }
}

impl Display for IrExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_expr(self, &mut formatter);
        write!(f, "{}", formatter.finish().trim_end())
    }
}

impl Display for IrStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        format_stmt(self, &mut formatter);
        write!(f, "{}", formatter.finish().trim_end())
    }
}

impl Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formatter = Formatter::new();
        match self {
            Chunk::Code(code) => {
                formatter.line(&format!(
                    "CODE {} (level {}, size {}, old fp at -{})",
                    code.frame.label,
                    code.frame.static_level,
                    code.frame.size(),
                    code.frame.old_fp_offset()
                ));
                formatter.indent();
                format_stmt(&code.body, &mut formatter);
            }
            Chunk::Data(data) => {
                formatter.line(&format!(
                    "DATA {} (size {}) {:?}",
                    data.global.label, data.global.size, data.data
                ));
            }
            Chunk::Global(global) => {
                formatter.line(&format!(
                    "GLOBAL {} (size {})",
                    global.global.label, global.global.size
                ));
            }
        }
        write!(f, "{}", formatter.finish().trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::tree::BinOp;

    #[test]
    fn prints_nested_tree() {
        let stmt = IrStmt::mov(
            IrExpr::mem(IrExpr::fp()),
            IrExpr::binop(BinOp::Add, IrExpr::Const(1), IrExpr::Const(2)),
        );
        assert_eq!(
            stmt.to_string(),
            "MOVE\n  MEM\n    NAME {FP}\n  BINOP ADD\n    CONST 1\n    CONST 2"
        );
    }
}
