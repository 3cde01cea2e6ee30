use pins::ast::builder::ProgramBuilder;
use pins::ast::{BinOpKind, Definition};
use pins::builtin::Builtin;
use pins::compile::compile;
use pins::config::WORD_SIZE;
use pins::error::CompileError;
use pins::frame::{FrameBuilder, Label};
use pins::ir::{
    linearize, linearize_stmt, BinOp, Chunk, CodeChunk, IrExpr, IrStmt, Temp, TempGenerator,
};
use pins::semantic::Type;

fn call(name: &str, args: Vec<IrExpr>) -> IrExpr {
    IrExpr::Call {
        label: Label::named(name),
        args,
    }
}

fn print(value: i64) -> IrStmt {
    IrStmt::Exp(call("print_int", vec![IrExpr::Const(0), IrExpr::Const(value)]))
}

#[test]
fn nested_sequences_flatten_in_order() {
    let mut temps = TempGenerator::new();
    let stmt = IrStmt::Seq(vec![
        print(1),
        IrStmt::Seq(vec![print(2), IrStmt::Seq(vec![print(3)])]),
        print(4),
    ]);

    let flat = linearize_stmt(stmt, &mut temps).unwrap();
    assert_eq!(flat, vec![print(1), print(2), print(3), print(4)]);
}

#[test]
fn eseq_statement_is_hoisted_before_its_use() {
    let mut temps = TempGenerator::new();
    let x = IrExpr::Temp(Temp(50));
    let stmt = IrStmt::mov(
        x.clone(),
        IrExpr::eseq(print(1), IrExpr::Const(9)),
    );

    let flat = linearize_stmt(stmt, &mut temps).unwrap();
    assert_eq!(flat, vec![print(1), IrStmt::mov(x, IrExpr::Const(9))]);
}

#[test]
fn constants_are_not_spilled() {
    let mut temps = TempGenerator::new();
    let expr = IrExpr::binop(
        BinOp::Add,
        IrExpr::Const(1),
        IrExpr::eseq(print(2), IrExpr::Const(3)),
    );

    let flat = linearize_stmt(IrStmt::Exp(call("f", vec![expr])), &mut temps).unwrap();
    assert_eq!(
        flat,
        vec![
            print(2),
            IrStmt::Exp(call(
                "f",
                vec![IrExpr::binop(BinOp::Add, IrExpr::Const(1), IrExpr::Const(3))]
            )),
        ]
    );
}

#[test]
fn earlier_arguments_are_spilled_before_later_side_effects() {
    let mut temps = TempGenerator::new();
    let cell = IrExpr::mem(IrExpr::fp());
    let first = call("f", vec![]);
    let second = IrExpr::eseq(IrStmt::mov(cell.clone(), IrExpr::Const(1)), cell.clone());

    let flat = linearize_stmt(
        IrStmt::Exp(call("g", vec![first.clone(), cell.clone(), second])),
        &mut temps,
    )
    .unwrap();

    assert_eq!(
        flat,
        vec![
            IrStmt::mov(IrExpr::Temp(Temp(0)), first),
            IrStmt::mov(IrExpr::Temp(Temp(1)), cell.clone()),
            IrStmt::mov(cell.clone(), IrExpr::Const(1)),
            IrStmt::Exp(call(
                "g",
                vec![IrExpr::Temp(Temp(0)), IrExpr::Temp(Temp(1)), cell]
            )),
        ]
    );
}

#[test]
fn move_into_eseq_runs_statement_first() {
    let mut temps = TempGenerator::new();
    let cell = IrExpr::mem(IrExpr::Name(Label::named("g")));
    let stmt = IrStmt::mov(IrExpr::eseq(print(1), cell.clone()), IrExpr::Const(5));

    let flat = linearize_stmt(stmt, &mut temps).unwrap();
    assert_eq!(flat, vec![print(1), IrStmt::mov(cell, IrExpr::Const(5))]);
}

#[test]
fn move_into_constant_cannot_be_linearized() {
    let mut temps = TempGenerator::new();
    let error =
        linearize_stmt(IrStmt::mov(IrExpr::Const(1), IrExpr::Const(2)), &mut temps).unwrap_err();
    assert!(matches!(error, CompileError::Unlinearizable { .. }));
}

#[test]
fn only_code_chunks_change() {
    let mut builder = FrameBuilder::new(Label::named("main"), 1);
    builder.add_parameter(WORD_SIZE);
    let frame = builder.build();
    let body = IrStmt::mov(
        IrExpr::mem(IrExpr::fp()),
        IrExpr::eseq(IrStmt::Seq(vec![print(1)]), IrExpr::Const(0)),
    );
    let global = Chunk::Global(pins::ir::GlobalChunk {
        global: pins::frame::GlobalAccess {
            size: WORD_SIZE,
            label: Label::named("g"),
        },
    });

    let mut temps = TempGenerator::new();
    let chunks = linearize(
        vec![Chunk::Code(CodeChunk { frame, body }), global.clone()],
        &mut temps,
    )
    .unwrap();

    assert_eq!(chunks[1], global);
    match &chunks[0] {
        Chunk::Code(code) => {
            assert!(code.body.is_linear());
            assert_eq!(
                code.body,
                IrStmt::Seq(vec![
                    print(1),
                    IrStmt::mov(IrExpr::mem(IrExpr::fp()), IrExpr::Const(0)),
                ])
            );
        }
        other => panic!("expected code chunk, got {:?}", other),
    }
}

#[test]
fn compiled_programs_are_linear() {
    let b = ProgramBuilder::new();
    let twice = b.declare_fun("twice", vec![b.param("x", Type::int())], Type::int());
    let twice_body = b.binary(BinOpKind::Mul, b.name(twice.param(0)), b.int(2));
    let twice_def = b.define_fun(&twice, twice_body);
    let main = b.fun("main", vec![], Type::int(), |_| {
        let x = b.var("x", Type::int());
        let body = b.block(vec![
            b.assign(
                b.name(&x),
                b.binary(
                    BinOpKind::Add,
                    b.call(&twice, vec![b.int(1)]),
                    b.call(&twice, vec![b.call(&twice, vec![b.int(2)])]),
                ),
            ),
            b.if_then_else(
                b.binary(BinOpKind::Gt, b.name(&x), b.int(5)),
                b.call_builtin(Builtin::PrintInt, vec![b.name(&x)]),
                b.call_builtin(Builtin::PrintInt, vec![b.int(0)]),
            ),
            b.name(&x),
        ]);
        b.where_(body, vec![Definition::Var(x)])
    });
    let (program, resolved) = b.finish(vec![twice_def, main]);

    let chunks = compile(&program, &resolved).unwrap();
    for chunk in &chunks {
        if let Chunk::Code(code) = chunk {
            assert!(code.body.is_linear(), "{} is not linear:\n{}", code.frame.label, code.body);
        }
    }
}

#[test]
fn pretty_printer_shows_flat_body() {
    let mut temps = TempGenerator::new();
    let flat = linearize_stmt(
        IrStmt::Seq(vec![IrStmt::Label(Label::Anonymous(3)), IrStmt::Jump(Label::Anonymous(3))]),
        &mut temps,
    )
    .unwrap();
    let text = IrStmt::Seq(flat).to_string();
    assert_eq!(text, "SEQ\n  LABEL L3\n  JUMP L3");
}
