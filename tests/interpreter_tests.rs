use pins::config::{ConfigError, MachineConfig, WORD_SIZE};
use pins::frame::{Frame, FrameBuilder, GlobalAccess, Label};
use pins::interpreter::{Interpreter, RuntimeError, Value};
use pins::ir::{BinOp, Chunk, CodeChunk, DataChunk, GlobalChunk, IrExpr, IrStmt, Temp};

fn make_frame(name: &str, arguments_size: i64) -> Frame {
    let mut builder = FrameBuilder::new(Label::named(name), 1);
    builder.add_parameter(WORD_SIZE);
    builder.add_call(arguments_size);
    builder.build()
}

fn make_code(name: &str, arguments_size: i64, statements: Vec<IrStmt>) -> Chunk {
    Chunk::Code(CodeChunk {
        frame: make_frame(name, arguments_size),
        body: IrStmt::Seq(statements),
    })
}

fn ret(value: IrExpr) -> IrStmt {
    IrStmt::mov(IrExpr::mem(IrExpr::fp()), value)
}

fn call(name: &str, args: Vec<IrExpr>) -> IrExpr {
    IrExpr::Call {
        label: Label::named(name),
        args,
    }
}

fn run(chunks: &[Chunk]) -> Result<i64, RuntimeError> {
    Interpreter::new(chunks, &MachineConfig::default().with_seed(1))?.run_main()
}

fn run_with_output(chunks: &[Chunk]) -> (Result<i64, RuntimeError>, String) {
    let mut out = Vec::new();
    let result = Interpreter::new(chunks, &MachineConfig::default().with_seed(1))
        .and_then(|interpreter| interpreter.with_output(&mut out).run_main());
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn interpret_returns_value_of_return_slot() {
    let chunks = [make_code("main", 0, vec![ret(IrExpr::Const(42))])];
    assert_eq!(run(&chunks), Ok(42));
}

#[test]
fn pointers_are_restored_after_the_run() {
    let chunks = [
        make_code("f", 0, vec![ret(IrExpr::Const(1))]),
        make_code(
            "main",
            WORD_SIZE,
            vec![ret(call("f", vec![IrExpr::Const(0)]))],
        ),
    ];
    let config = MachineConfig::default().with_memory_size(128 * WORD_SIZE);
    let mut interpreter = Interpreter::new(&chunks, &config).unwrap();
    let top = 127 * WORD_SIZE;
    assert_eq!(interpreter.frame_pointer(), top);
    assert_eq!(interpreter.stack_pointer(), top);

    assert_eq!(interpreter.run_main(), Ok(1));
    assert_eq!(interpreter.frame_pointer(), top);
    assert_eq!(interpreter.stack_pointer(), top);
}

#[test]
fn arguments_land_above_callee_frame_pointer() {
    // f returns its second argument (first after the static link)
    let f_body = vec![ret(IrExpr::mem(IrExpr::binop(
        BinOp::Add,
        IrExpr::fp(),
        IrExpr::Const(WORD_SIZE),
    )))];
    let chunks = [
        make_code("f", 0, f_body),
        make_code(
            "main",
            2 * WORD_SIZE,
            vec![ret(call("f", vec![IrExpr::Const(0), IrExpr::Const(17)]))],
        ),
    ];
    assert_eq!(run(&chunks), Ok(17));
}

#[test]
fn temporaries_are_local_to_each_call() {
    // f reads t0 without assigning it; main's t0 must not leak in
    let chunks = [
        make_code("f", 0, vec![ret(IrExpr::Temp(Temp(0)))]),
        make_code(
            "main",
            WORD_SIZE,
            vec![
                IrStmt::mov(IrExpr::Temp(Temp(0)), IrExpr::Const(3)),
                ret(call("f", vec![IrExpr::Const(0)])),
            ],
        ),
    ];
    assert_eq!(run(&chunks), Err(RuntimeError::UnassignedTemp { temp: 0 }));
}

#[test]
fn jumps_skip_to_their_label() {
    let skip = Label::Anonymous(0);
    let chunks = [make_code(
        "main",
        0,
        vec![
            ret(IrExpr::Const(1)),
            IrStmt::Jump(skip.clone()),
            ret(IrExpr::Const(2)),
            IrStmt::Label(skip),
        ],
    )];
    assert_eq!(run(&chunks), Ok(1));
}

#[test]
fn conditional_jump_takes_else_branch_on_zero() {
    let (yes, no, end) = (Label::Anonymous(0), Label::Anonymous(1), Label::Anonymous(2));
    let chunks = [make_code(
        "main",
        0,
        vec![
            IrStmt::cjump(IrExpr::Const(0), yes.clone(), no.clone()),
            IrStmt::Label(yes),
            ret(IrExpr::Const(1)),
            IrStmt::Jump(end.clone()),
            IrStmt::Label(no),
            ret(IrExpr::Const(2)),
            IrStmt::Label(end),
        ],
    )];
    assert_eq!(run(&chunks), Ok(2));
}

#[test]
fn globals_and_data_resolve_through_labels() {
    let g = Label::named("g");
    let text = Label::Anonymous(0);
    let chunks = [
        Chunk::Global(GlobalChunk {
            global: GlobalAccess {
                size: WORD_SIZE,
                label: g.clone(),
            },
        }),
        Chunk::Data(DataChunk {
            global: GlobalAccess {
                size: WORD_SIZE,
                label: text.clone(),
            },
            data: "hi".to_string(),
        }),
        make_code(
            "main",
            2 * WORD_SIZE,
            vec![
                IrStmt::mov(IrExpr::mem(IrExpr::Name(g.clone())), IrExpr::Const(5)),
                IrStmt::Exp(call(
                    "print_str",
                    vec![IrExpr::Const(0), IrExpr::Name(text.clone())],
                )),
                ret(IrExpr::mem(IrExpr::Name(g.clone()))),
            ],
        ),
    ];

    let config = MachineConfig::default();
    let mut out = Vec::new();
    let mut interpreter = Interpreter::new(&chunks, &config).unwrap().with_output(&mut out);
    assert_eq!(interpreter.run_main(), Ok(5));

    let memory = interpreter.memory();
    let g_address = memory.address(&g).unwrap();
    let text_address = memory.address(&text).unwrap();
    assert!(g_address >= WORD_SIZE);
    assert_ne!(g_address, text_address);
    assert_eq!(memory.load_label(&text), Ok(&Value::Str("hi".to_string())));
    drop(interpreter);
    assert_eq!(String::from_utf8(out).unwrap(), "\"hi\"\n");
}

#[test]
fn unlinearized_body_is_rejected() {
    let chunks = [Chunk::Code(CodeChunk {
        frame: make_frame("main", 0),
        body: IrStmt::Seq(vec![ret(IrExpr::eseq(
            IrStmt::Seq(vec![]),
            IrExpr::Const(1),
        ))]),
    })];
    assert_eq!(
        run(&chunks),
        Err(RuntimeError::Unlinearized {
            label: Label::named("main")
        })
    );
}

#[test]
fn move_into_constant_is_rejected() {
    let chunks = [make_code(
        "main",
        0,
        vec![IrStmt::mov(IrExpr::Const(1), IrExpr::Const(2))],
    )];
    assert!(matches!(
        run(&chunks),
        Err(RuntimeError::InvalidMoveTarget { .. })
    ));
}

#[test]
fn call_to_unknown_label_fails() {
    let chunks = [make_code(
        "main",
        WORD_SIZE,
        vec![ret(call("nowhere", vec![IrExpr::Const(0)]))],
    )];
    assert_eq!(
        run(&chunks),
        Err(RuntimeError::NotCallable {
            label: Label::named("nowhere")
        })
    );
}

#[test]
fn call_to_data_label_fails() {
    let text = Label::Anonymous(7);
    let chunks = [
        Chunk::Data(DataChunk {
            global: GlobalAccess {
                size: WORD_SIZE,
                label: text.clone(),
            },
            data: "not code".to_string(),
        }),
        make_code(
            "main",
            WORD_SIZE,
            vec![ret(IrExpr::Call {
                label: text.clone(),
                args: vec![IrExpr::Const(0)],
            })],
        ),
    ];
    assert_eq!(run(&chunks), Err(RuntimeError::NotCallable { label: text }));
}

#[test]
fn builtin_arity_is_checked() {
    let chunks = [make_code(
        "main",
        WORD_SIZE,
        vec![ret(call("print_int", vec![IrExpr::Const(0)]))],
    )];
    assert_eq!(
        run(&chunks),
        Err(RuntimeError::BuiltinArity {
            name: "print_int".to_string(),
            expected: 1,
            found: 0,
        })
    );
}

#[test]
fn print_log_writes_words() {
    let chunks = [make_code(
        "main",
        2 * WORD_SIZE,
        vec![
            IrStmt::Exp(call("print_log", vec![IrExpr::Const(0), IrExpr::Const(1)])),
            IrStmt::Exp(call("print_log", vec![IrExpr::Const(0), IrExpr::Const(0)])),
            ret(IrExpr::Const(0)),
        ],
    )];
    let (result, out) = run_with_output(&chunks);
    assert_eq!(result, Ok(0));
    assert_eq!(out, "true\nfalse\n");
}

#[test]
fn print_str_requires_a_string() {
    let chunks = [make_code(
        "main",
        2 * WORD_SIZE,
        vec![ret(call(
            "print_str",
            vec![IrExpr::Const(0), IrExpr::Const(WORD_SIZE)],
        ))],
    )];
    // address WORD_SIZE holds the code entry of main
    assert_eq!(
        run(&chunks),
        Err(RuntimeError::NotAString { address: WORD_SIZE })
    );
}

#[test]
fn loading_code_as_integer_fails() {
    let chunks = [make_code(
        "main",
        0,
        vec![ret(IrExpr::mem(IrExpr::Name(Label::named("main"))))],
    )];
    assert!(matches!(
        run(&chunks),
        Err(RuntimeError::NotAnInteger { .. })
    ));
}

#[test]
fn unaligned_access_fails() {
    let chunks = [make_code(
        "main",
        0,
        vec![ret(IrExpr::mem(IrExpr::binop(
            BinOp::Add,
            IrExpr::fp(),
            IrExpr::Const(1),
        )))],
    )];
    assert!(matches!(
        run(&chunks),
        Err(RuntimeError::InvalidAddress { .. })
    ));
}

#[test]
fn rand_int_stays_in_range_and_follows_seed() {
    let body = |low: i64, high: i64| {
        vec![ret(call(
            "rand_int",
            vec![IrExpr::Const(0), IrExpr::Const(low), IrExpr::Const(high)],
        ))]
    };
    let chunks = [make_code("main", 3 * WORD_SIZE, body(-5, 5))];

    let config = MachineConfig::default().with_seed(99);
    let first = Interpreter::new(&chunks, &config).unwrap().run_main().unwrap();
    let second = Interpreter::new(&chunks, &config).unwrap().run_main().unwrap();
    assert_eq!(first, second);
    assert!((-5..5).contains(&first));

    let empty = [make_code("main", 3 * WORD_SIZE, body(3, 3))];
    assert_eq!(
        run(&empty),
        Err(RuntimeError::EmptyRange { low: 3, high: 3 })
    );
}

#[test]
fn seed_reseeds_the_random_source() {
    let draw = || call(
        "rand_int",
        vec![IrExpr::Const(0), IrExpr::Const(0), IrExpr::Const(1_000_000)],
    );
    let chunks = [make_code(
        "main",
        3 * WORD_SIZE,
        vec![
            IrStmt::Exp(call("seed", vec![IrExpr::Const(0), IrExpr::Const(5)])),
            IrStmt::mov(IrExpr::Temp(Temp(0)), draw()),
            IrStmt::Exp(call("seed", vec![IrExpr::Const(0), IrExpr::Const(5)])),
            IrStmt::mov(IrExpr::Temp(Temp(1)), draw()),
            ret(IrExpr::binop(
                BinOp::Eq,
                IrExpr::Temp(Temp(0)),
                IrExpr::Temp(Temp(1)),
            )),
        ],
    )];
    assert_eq!(run(&chunks), Ok(1));
}

#[test]
fn missing_entry_is_reported() {
    let chunks = [make_code("helper", 0, vec![ret(IrExpr::Const(0))])];
    assert_eq!(
        run(&chunks),
        Err(RuntimeError::MissingEntry {
            label: Label::named("main")
        })
    );

    let mut interpreter = Interpreter::new(&chunks, &MachineConfig::default()).unwrap();
    assert_eq!(interpreter.interpret(&Label::named("helper")), Ok(0));
}

#[test]
fn invalid_memory_size_is_rejected() {
    let config = MachineConfig::default().with_memory_size(10);
    let error = Interpreter::new(&[], &config).err().unwrap();
    assert_eq!(
        error,
        RuntimeError::Config(ConfigError::InvalidMemorySize { memory_size: 10 })
    );
}

#[test]
fn oversized_memory_is_rejected_before_allocation() {
    let config = MachineConfig::default().with_memory_size(i64::MAX & !3);
    let error = Interpreter::new(&[], &config).err().unwrap();
    assert!(matches!(
        error,
        RuntimeError::Config(ConfigError::MemoryTooLarge { .. })
    ));
}

#[test]
fn static_data_must_fit_in_memory() {
    let chunks = [Chunk::Global(GlobalChunk {
        global: GlobalAccess {
            size: 100 * WORD_SIZE,
            label: Label::named("big"),
        },
    })];
    let config = MachineConfig::default().with_memory_size(16 * WORD_SIZE);
    assert!(matches!(
        Interpreter::new(&chunks, &config).err(),
        Some(RuntimeError::OutOfMemory { .. })
    ));
}

#[test]
fn error_messages_are_prefixed() {
    let error = RuntimeError::DivisionByZero;
    assert_eq!(error.to_string(), "Runtime error: division by zero");
}

#[test]
fn move_evaluates_destination_before_source() {
    let table = Label::named("table");
    let print = |value| call("print_int", vec![IrExpr::Const(0), IrExpr::Const(value)]);
    let chunks = [
        Chunk::Global(GlobalChunk {
            global: GlobalAccess {
                size: 4 * WORD_SIZE,
                label: table.clone(),
            },
        }),
        make_code(
            "main",
            2 * WORD_SIZE,
            vec![
                IrStmt::mov(
                    IrExpr::mem(IrExpr::binop(
                        BinOp::Add,
                        IrExpr::Name(table),
                        IrExpr::binop(BinOp::Mul, print(1), IrExpr::Const(WORD_SIZE)),
                    )),
                    print(2),
                ),
                ret(IrExpr::Const(0)),
            ],
        ),
    ];

    let (result, output) = run_with_output(&chunks);
    assert_eq!(result, Ok(0));
    assert_eq!(output, "1\n2\n");
}
