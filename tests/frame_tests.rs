use lachs::Span;
use pins::ast::builder::ProgramBuilder;
use pins::ast::{Definition, NodeId, Program, VarDef};
use pins::config::WORD_SIZE;
use pins::error::CompileError;
use pins::frame::{
    Access, BuilderStack, FrameBuilder, FrameEvaluator, FrameTable, Label, LabelGenerator,
};
use pins::semantic::{Resolved, Type};

fn evaluate(program: &Program, resolved: &Resolved) -> FrameTable {
    let mut labels = LabelGenerator::new();
    FrameEvaluator::evaluate(program, resolved, &mut labels).expect("frame evaluation failed")
}

fn fun_id(definition: &Definition) -> NodeId {
    match definition {
        Definition::Fun(fun) => fun.id,
        other => panic!("expected function, got {:?}", other),
    }
}

fn stack_range(table: &FrameTable, definition: NodeId) -> (i64, i64) {
    let access = table.access(definition).expect("missing access");
    let stack = access.stack().expect("expected stack access");
    (stack.offset, stack.offset + stack.size)
}

#[test]
fn top_level_function_gets_named_frame_at_level_one() {
    let b = ProgramBuilder::new();
    let x = b.param("x", Type::int());
    let y = b.param("y", Type::log());
    let f = b.fun("f", vec![x.clone(), y.clone()], Type::int(), |_| b.int(0));
    let f_id = fun_id(&f);
    let (program, resolved) = b.finish(vec![f]);

    let table = evaluate(&program, &resolved);
    let frame = table.frame(f_id).unwrap();
    assert_eq!(frame.label, Label::named("f"));
    assert_eq!(frame.static_level, 1);
    // static link + two parameters
    assert_eq!(frame.parameters_size, 3 * WORD_SIZE);

    assert_eq!(stack_range(&table, x.id), (WORD_SIZE, 2 * WORD_SIZE));
    assert_eq!(stack_range(&table, y.id), (2 * WORD_SIZE, 3 * WORD_SIZE));
    assert!(matches!(table.access(x.id), Some(Access::Parameter(_))));
}

#[test]
fn nested_function_gets_anonymous_frame_one_level_deeper() {
    let b = ProgramBuilder::new();
    let inner = b.declare_fun("inner", vec![], Type::int());
    let inner_id = inner.id();
    let inner_def = b.define_fun(&inner, b.int(1));
    let main = b.fun("main", vec![], Type::int(), |_| {
        b.where_(b.call(&inner, vec![]), vec![inner_def])
    });
    let main_id = fun_id(&main);
    let (program, resolved) = b.finish(vec![main]);

    let table = evaluate(&program, &resolved);
    let inner = table.frame(inner_id).unwrap();
    assert!(matches!(inner.label, Label::Anonymous(_)));
    assert_eq!(inner.static_level, 2);
    assert_eq!(table.frame(main_id).unwrap().static_level, 1);
}

#[test]
fn locals_and_parameters_never_overlap() {
    let b = ProgramBuilder::new();
    let p = b.param("p", Type::int());
    let q = b.param("q", Type::array(4, Type::int()));
    let a = b.var("a", Type::int());
    let arr = b.var("arr", Type::array(3, Type::int()));
    let c = b.var("c", Type::log());
    let ids = [p.id, q.id, a.id, arr.id, c.id];
    let f = b.fun("f", vec![p, q], Type::int(), |_| {
        b.where_(
            b.int(0),
            vec![Definition::Var(a), Definition::Var(arr), Definition::Var(c)],
        )
    });
    let (program, resolved) = b.finish(vec![f]);

    let table = evaluate(&program, &resolved);
    let mut ranges: Vec<(i64, i64)> = ids.iter().map(|id| stack_range(&table, *id)).collect();
    // the static link occupies [0, WORD_SIZE)
    ranges.push((0, WORD_SIZE));
    ranges.sort();
    for pair in ranges.windows(2) {
        assert!(pair[0].1 <= pair[1].0, "overlap between {:?}", pair);
    }
}

#[test]
fn arrays_are_passed_as_one_word() {
    let b = ProgramBuilder::new();
    let q = b.param("q", Type::array(4, Type::int()));
    let f = b.fun("f", vec![q.clone()], Type::int(), |_| b.int(0));
    let (program, resolved) = b.finish(vec![f]);

    let table = evaluate(&program, &resolved);
    assert_eq!(table.access(q.id).unwrap().size(), WORD_SIZE);
}

#[test]
fn local_array_reserves_its_full_size() {
    let b = ProgramBuilder::new();
    let arr = b.var("arr", Type::array(3, Type::int()));
    let arr_id = arr.id;
    let f = b.fun("f", vec![], Type::int(), |_| {
        b.where_(b.int(0), vec![Definition::Var(arr)])
    });
    let f_id = fun_id(&f);
    let (program, resolved) = b.finish(vec![f]);

    let table = evaluate(&program, &resolved);
    assert_eq!(stack_range(&table, arr_id), (-3 * WORD_SIZE, 0));
    let frame = table.frame(f_id).unwrap();
    assert_eq!(frame.locals_size, 3 * WORD_SIZE);
    assert_eq!(frame.old_fp_offset(), 4 * WORD_SIZE);
}

#[test]
fn calls_size_the_outgoing_argument_area() {
    let b = ProgramBuilder::new();
    let g = b.declare_fun(
        "g",
        vec![b.param("a", Type::int()), b.param("b", Type::int())],
        Type::int(),
    );
    let g_def = b.define_fun(&g, b.int(0));
    let h = b.declare_fun("h", vec![], Type::int());
    let h_def = b.define_fun(&h, b.int(0));
    let main = b.fun("main", vec![], Type::int(), |_| {
        b.block(vec![
            b.call(&h, vec![]),
            b.call(&g, vec![b.int(1), b.int(2)]),
        ])
    });
    let main_id = fun_id(&main);
    let (program, resolved) = b.finish(vec![g_def, h_def, main]);

    let table = evaluate(&program, &resolved);
    let frame = table.frame(main_id).unwrap();
    assert_eq!(frame.arguments_size, 3 * WORD_SIZE);
    assert_eq!(frame.size(), 2 * WORD_SIZE + 3 * WORD_SIZE);
}

#[test]
fn calls_in_nested_functions_size_their_own_frame() {
    let b = ProgramBuilder::new();
    let inner = b.declare_fun("inner", vec![], Type::int());
    let inner_id = inner.id();
    let inner_def = b.define_fun(
        &inner,
        b.call_builtin(pins::builtin::Builtin::RandInt, vec![b.int(0), b.int(9)]),
    );
    let main = b.fun("main", vec![], Type::int(), |_| b.where_(b.int(0), vec![inner_def]));
    let main_id = fun_id(&main);
    let (program, resolved) = b.finish(vec![main]);

    let table = evaluate(&program, &resolved);
    assert_eq!(table.frame(inner_id).unwrap().arguments_size, 3 * WORD_SIZE);
    assert_eq!(table.frame(main_id).unwrap().arguments_size, 0);
}

#[test]
fn top_level_variables_are_globals() {
    let b = ProgramBuilder::new();
    let g = b.var("counter", Type::array(2, Type::int()));
    let g_id = g.id;
    let (program, resolved) = b.finish(vec![Definition::Var(g)]);

    let table = evaluate(&program, &resolved);
    match table.access(g_id) {
        Some(Access::Global(global)) => {
            assert_eq!(global.label, Label::named("counter"));
            assert_eq!(global.size, 2 * WORD_SIZE);
        }
        other => panic!("expected global access, got {:?}", other),
    }
}

#[test]
fn type_definitions_take_no_space() {
    let b = ProgramBuilder::new();
    let alias = b.type_def("row", Type::array(8, Type::int()));
    let alias_id = alias.id();
    let (program, resolved) = b.finish(vec![alias]);

    let table = evaluate(&program, &resolved);
    assert!(table.access(alias_id).is_none());
    assert_eq!(table.accesses().count(), 0);
}

#[test]
fn missing_type_aborts() {
    let var = VarDef {
        id: NodeId(42),
        name: "ghost".to_string(),
        position: Span::default(),
    };
    let program = Program {
        definitions: vec![Definition::Var(var)],
        position: Span::default(),
    };
    let mut labels = LabelGenerator::new();

    let error = FrameEvaluator::evaluate(&program, &Resolved::new(), &mut labels).unwrap_err();
    assert!(matches!(error, CompileError::MissingType { .. }));
}

#[test]
fn subtree_evaluates_under_given_builders() {
    let b = ProgramBuilder::new();
    let local = b.var("local", Type::int());
    let local_id = local.id;
    let nested = b.fun("nested", vec![], Type::int(), |_| b.int(0));
    let nested_id = fun_id(&nested);
    let (_, resolved) = b.finish(vec![]);

    let mut labels = LabelGenerator::new();
    let mut evaluator = FrameEvaluator::new(&resolved, &mut labels);
    let mut builders = BuilderStack::new();
    builders.push(FrameBuilder::new(Label::named("outer"), 1));

    evaluator
        .definition(&Definition::Var(local), &mut builders)
        .unwrap();
    evaluator.definition(&nested, &mut builders).unwrap();
    let table = evaluator.finish();

    assert_eq!(builders.len(), 1);
    assert!(matches!(table.access(local_id), Some(Access::Local(stack)) if stack.static_level == 1));
    assert_eq!(table.frame(nested_id).unwrap().static_level, 2);
}

#[test]
fn label_order_is_deterministic() {
    let build = || {
        let b = ProgramBuilder::new();
        let first = b.declare_fun("first", vec![], Type::int());
        let first_def = b.define_fun(&first, b.int(1));
        let second = b.declare_fun("second", vec![], Type::int());
        let second_def = b.define_fun(&second, b.int(2));
        let main = b.fun("main", vec![], Type::int(), |_| {
            b.where_(b.int(0), vec![first_def, second_def])
        });
        (b.finish(vec![main]), first.id(), second.id())
    };

    let ((program, resolved), first, second) = build();
    let table = evaluate(&program, &resolved);
    assert_eq!(table.frame(first).unwrap().label, Label::Anonymous(0));
    assert_eq!(table.frame(second).unwrap().label, Label::Anonymous(1));

    let ((program, resolved), first_again, _) = build();
    assert_eq!(
        evaluate(&program, &resolved).frame(first_again).unwrap().label,
        Label::Anonymous(0)
    );
}

#[test]
fn frame_size_excludes_incoming_parameters() {
    let b = ProgramBuilder::new();
    let f = b.fun(
        "f",
        vec![b.param("a", Type::int()), b.param("b", Type::int())],
        Type::int(),
        |_| b.int(0),
    );
    let f_id = fun_id(&f);
    let (program, resolved) = b.finish(vec![f]);

    let table = evaluate(&program, &resolved);
    let frame = table.frame(f_id).unwrap();
    assert_eq!(frame.parameters_size, 3 * WORD_SIZE);
    assert_eq!(frame.size(), 2 * WORD_SIZE);
}
