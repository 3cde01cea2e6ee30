use std::env;
use std::io;

use anyhow::{bail, Context};
use pins::ast::builder::ProgramBuilder;
use pins::ast::{BinOpKind, Definition, Program};
use pins::builtin::Builtin;
use pins::compile::compile;
use pins::config::MachineConfig;
use pins::interpreter::Interpreter;
use pins::semantic::{Resolved, Type};

/// ```pins
/// var total: int
///
/// fun fact(n: int): int = {
///     if n <= 1 then r = 1 else r = n * fact(n - 1);
///     r
/// } where { var r: int }
///
/// fun main(): int = {
///     print_str("factorials");
///     for i = 1, 6, 1: total = total + print_int(fact(i));
///     scaled(total)
/// } where {
///     var i: int
///     fun scaled(x: int): int = x * i
/// }
/// ```
fn demo() -> (Program, Resolved) {
    let b = ProgramBuilder::new();

    let total = b.var("total", Type::int());

    let fact = b.declare_fun("fact", vec![b.param("n", Type::int())], Type::int());
    let fact_body = {
        let n = fact.param(0);
        let r = b.var("r", Type::int());
        let body = b.block(vec![
            b.if_then_else(
                b.binary(BinOpKind::LtEq, b.name(n), b.int(1)),
                b.assign(b.name(&r), b.int(1)),
                b.assign(
                    b.name(&r),
                    b.binary(
                        BinOpKind::Mul,
                        b.name(n),
                        b.call(&fact, vec![b.binary(BinOpKind::Sub, b.name(n), b.int(1))]),
                    ),
                ),
            ),
            b.name(&r),
        ]);
        b.where_(body, vec![Definition::Var(r)])
    };
    let fact_def = b.define_fun(&fact, fact_body);

    let main = b.fun("main", vec![], Type::int(), |_| {
        let i = b.var("i", Type::int());
        let x = b.param("x", Type::int());
        let scaled = b.declare_fun("scaled", vec![x], Type::int());
        let scaled_body = b.binary(BinOpKind::Mul, b.name(scaled.param(0)), b.name(&i));

        let body = b.block(vec![
            b.call_builtin(Builtin::PrintStr, vec![b.str("factorials")]),
            b.for_loop(
                b.name(&i),
                b.int(1),
                b.int(6),
                b.int(1),
                b.assign(
                    b.name(&total),
                    b.binary(
                        BinOpKind::Add,
                        b.name(&total),
                        b.call_builtin(Builtin::PrintInt, vec![b.call(&fact, vec![b.name(&i)])]),
                    ),
                ),
            ),
            b.call(&scaled, vec![b.name(&total)]),
        ]);
        let scaled = b.define_fun(&scaled, scaled_body);
        b.where_(body, vec![Definition::Var(i), scaled])
    });

    b.finish(vec![Definition::Var(total), fact_def, main])
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = MachineConfig::default();
    let mut dump_ir = false;
    let mut positional = 0;

    for arg in env::args().skip(1) {
        if arg == "--dump-ir" {
            dump_ir = true;
            continue;
        }
        match positional {
            0 => {
                let memory_size = arg
                    .parse::<i64>()
                    .with_context(|| format!("invalid memory size '{}'", arg))?;
                config = config.with_memory_size(memory_size);
            }
            1 => {
                let seed = arg
                    .parse::<u64>()
                    .with_context(|| format!("invalid seed '{}'", arg))?;
                config = config.with_seed(seed);
            }
            _ => bail!("usage: pins [memory_size] [seed] [--dump-ir]"),
        }
        positional += 1;
    }

    let (program, resolved) = demo();
    let chunks = compile(&program, &resolved)?;

    if dump_ir {
        for chunk in &chunks {
            println!("{}\n", chunk);
        }
    }

    let mut stdout = io::stdout();
    let result = Interpreter::new(&chunks, &config)?
        .with_output(&mut stdout)
        .run_main()?;
    println!("main returned {}", result);

    Ok(())
}
