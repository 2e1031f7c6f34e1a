use std::collections::BTreeMap;
use std::rc::Rc;

use tessera_interpret::{
    Arg, Context, EvalError, Evaluator, Func, IntRanger, Object, ParamKind, SafeString, Scope,
    SeqRanger, Value,
};
use tessera_parse::{parse_source, parse_source_in_code_mode};

fn eval_code(src: &str, scope: &Scope) -> Result<Value, EvalError> {
    let prog = parse_source_in_code_mode(src).expect("program should parse");
    Evaluator::new().eval(&prog, scope)
}

fn eval_ok(src: &str, scope: &Scope) -> Value {
    eval_code(src, scope).expect("evaluation should succeed")
}

fn eval_err(src: &str, scope: &Scope) -> EvalError {
    eval_code(src, scope).expect_err("evaluation should fail")
}

fn int_arg(args: &[Arg], i: usize) -> i64 {
    match &args[i] {
        Arg::Value(Value::Int(v)) => *v,
        other => panic!("expected int argument, got {other:?}"),
    }
}

fn range_func() -> Func {
    Func::new([ParamKind::Int, ParamKind::Int], |args| {
        let r = IntRanger::new(int_arg(&args, 0), int_arg(&args, 1))?;
        Ok(Value::ranger(r))
    })
}

#[derive(Debug)]
struct MockObject {
    field: i64,
    nested: Option<Rc<MockObject>>,
}

impl MockObject {
    fn new(field: i64) -> Self {
        Self {
            field,
            nested: None,
        }
    }
}

impl Object for MockObject {
    fn type_name(&self) -> &'static str {
        "MockObject"
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "field" => Some(Value::Int(self.field)),
            "nested" => match &self.nested {
                Some(o) => Some(Value::Object(o.clone())),
                None => None,
            },
            _ => None,
        }
    }

    fn method(&self, name: &str) -> Option<Func> {
        match name {
            "five" => Some(Func::new([], |_| Ok(Value::Int(5)))),
            "double" => Some(Func::new([ParamKind::Int], |args| {
                Ok(Value::Int(int_arg(&args, 0) * 2))
            })),
            "sum" => Some(Func::new([ParamKind::Int, ParamKind::Int], |args| {
                Ok(Value::Int(int_arg(&args, 0) + int_arg(&args, 1)))
            })),
            "sum_with_map" => Some(Func::new([ParamKind::Map], |args| {
                let Arg::Value(Value::Map(m)) = &args[0] else {
                    panic!("expected map argument");
                };
                let x = m.get("x").and_then(Value::as_int).unwrap_or(0);
                let y = m.get("y").and_then(Value::as_int).unwrap_or(0);
                Ok(Value::Int(x + y))
            })),
            _ => None,
        }
    }
}

#[test]
fn int_expressions() {
    let cases: &[(&str, i64)] = &[
        ("0", 0),
        ("5", 5),
        ("12", 12),
        ("1000", 1000),
        ("-5", -5),
        ("-12", -12),
        ("-1234", -1234),
        ("1 + 2 * 3", 7),
        ("1 + (2 * 3)", 7),
        ("(1 + 2) * 3", 9),
        ("29 % 5", 4),
        ("29 - 5", 24),
        ("29 / 5", 5),
    ];

    for (src, expected) in cases {
        assert_eq!(eval_ok(src, &Scope::new()), Value::Int(*expected), "src: {src}");
    }
}

#[test]
fn arithmetic_wraps_silently() {
    let scope = Scope::new();
    scope.set("max", i64::MAX);
    scope.set("min", i64::MIN);

    assert_eq!(eval_ok("max + 1", &scope), Value::Int(i64::MIN));
    assert_eq!(eval_ok("min - 1", &scope), Value::Int(i64::MAX));
    assert_eq!(eval_ok("min / -1", &scope), Value::Int(i64::MIN));
    assert_eq!(eval_ok("-min", &scope), Value::Int(i64::MIN));
}

#[test]
fn bool_expressions() {
    let cases: &[(&str, bool)] = &[
        ("true", true),
        ("false", false),
        ("!true", false),
        ("!false", true),
        ("!!true", true),
        ("!!false", false),
        ("true == true", true),
        ("true == false", false),
        ("!true == true", false),
        ("false == !false", false),
        ("true != true", false),
        ("true != false", true),
        ("true != !false", false),
        ("!!true != !!!false", false),
        ("5 == 5", true),
        ("5 == 6", false),
        ("5 != 5", false),
        ("5 != 6", true),
        ("5 < 6", true),
        ("5 > 6", false),
        ("6 < 5", false),
        ("6 > 5", true),
        ("5 <= 6", true),
        ("5 >= 6", false),
        ("6 <= 5", false),
        ("6 >= 5", true),
        ("5 <= 5", true),
        ("5 >= 5", true),
        (r#""x" == "x""#, true),
        (r#""x" == "y""#, false),
        (r#""x" != "x""#, false),
        (r#""x" != "y""#, true),
        ("true || false", true),
        ("false || false", false),
        ("true && true", true),
        ("true && false", false),
    ];

    for (src, expected) in cases {
        assert_eq!(eval_ok(src, &Scope::new()), Value::Bool(*expected), "src: {src}");
    }
}

#[test]
fn boolean_operators_short_circuit() {
    // the right side would be an unknown-identifier error if evaluated
    let scope = Scope::new();
    assert_eq!(eval_ok("false && missing", &scope), Value::Bool(false));
    assert_eq!(eval_ok("true || missing", &scope), Value::Bool(true));

    assert!(eval_code("true && missing", &scope).is_err());
    assert!(eval_code("false || missing", &scope).is_err());
}

#[test]
fn string_expressions() {
    let cases: &[(&str, &str)] = &[
        (r#""x""#, "x"),
        (r#""x" + "y""#, "xy"),
        (r#""x" + "y" + "z""#, "xyz"),
        (r#""" + "y""#, "y"),
        (r#""x" + """#, "x"),
    ];

    for (src, expected) in cases {
        assert_eq!(
            eval_ok(src, &Scope::new()),
            Value::Str((*expected).to_string()),
            "src: {src}"
        );
    }
}

#[test]
fn safe_strings_count_as_strings_in_infix_expressions() {
    let scope = Scope::new();
    scope.set("s", SafeString::new("abc"));

    assert_eq!(eval_ok(r#"s == "abc""#, &scope), Value::Bool(true));
    // operating on a safe string yields a plain string
    assert_eq!(
        eval_ok(r#"s + "d""#, &scope),
        Value::Str("abcd".to_string())
    );
}

#[test]
fn if_expressions() {
    let cases: &[(&str, Value)] = &[
        ("if 2 < 3 5 end", Value::Int(5)),
        ("if 2 < 3 5 else 7 end", Value::Int(5)),
        ("if 2 > 3 5 else 7 end", Value::Int(7)),
        (r#"if true "x" end"#, Value::Str("x".to_string())),
        (r#"if false "x" end"#, Value::Nil),
        (
            "if 1 > 2\n 10\nelseif 1 > 3\n 20\nelseif 1 > 4\n 30\nelseif 1 > 5\n 40\nelse\n 50\nend",
            Value::Int(50),
        ),
        (
            "if 1 > 2\n 10\nelseif 1 > 3\n 20\nelseif 1 < 4\n 30\nelseif 1 > 5\n 40\nelse\n 50\nend",
            Value::Int(30),
        ),
        (
            "if 1 > 2\n if 3 > 4\n 10\n else\n 20\n end\nelseif 5 < 6\n if 7 > 8\n 30\n else\n 40\n end\nend",
            Value::Int(40),
        ),
    ];

    for (src, expected) in cases {
        assert_eq!(&eval_ok(src, &Scope::new()), expected, "src: {src}");
    }
}

#[test]
fn if_condition_must_be_bool() {
    let err = eval_err("if 1 2 end", &Scope::new());
    assert!(
        err.message()
            .contains("condition expression type in if expression is not bool"),
        "{err}"
    );
}

#[test]
fn let_statements() {
    let cases: &[(&str, Value)] = &[
        ("let x = 5", Value::Int(5)),
        ("let x = true", Value::Bool(true)),
        (r#"let x = "y""#, Value::Str("y".to_string())),
        ("let x = if 1 < 2 10 else 20 end", Value::Int(10)),
        ("let x = if 1 > 2 10 else 20 end", Value::Int(20)),
        ("let x = m.field", Value::Int(5)),
        ("let x = m.sum(3, 6)", Value::Int(9)),
    ];

    for (src, expected) in cases {
        let scope = Scope::new();
        scope.set("m", Value::object(MockObject::new(5)));

        let result = eval_ok(src, &scope);
        assert_eq!(result, Value::Nil, "let returns nil, src: {src}");
        assert_eq!(&scope.value("x").expect("x bound"), expected, "src: {src}");
    }
}

#[test]
fn ident_expressions() {
    let scope = Scope::new();
    scope.set("x", 5);
    scope.set("y", 6);
    assert_eq!(eval_ok("x + y", &scope), Value::Int(11));

    let scope = Scope::new();
    scope.set("x", "a");
    scope.set("y", "b");
    assert_eq!(eval_ok("x + y", &scope), Value::Str("ab".to_string()));

    let scope = Scope::new();
    assert_eq!(
        eval_ok("let x = 5\nlet y = 6\nx + y", &scope),
        Value::Int(11)
    );
}

#[test]
fn unknown_identifier_is_an_error() {
    let err = eval_err("missing", &Scope::new());
    assert!(
        err.message().contains("identifier not found in scope: missing"),
        "{err}"
    );
    assert!(!err.is_host());
}

#[test]
fn field_expressions_on_maps() {
    let scope = Scope::new();
    let mut inner = BTreeMap::new();
    inner.insert("y".to_string(), Value::Int(5));
    scope.set("x", Value::Map(inner));

    assert_eq!(eval_ok("x.y", &scope), Value::Int(5));
    assert_eq!(eval_ok(r#"x["y"]"#, &scope), Value::Int(5));

    let scope = Scope::new();
    let mut z = BTreeMap::new();
    z.insert("z".to_string(), Value::Int(5));
    let mut y = BTreeMap::new();
    y.insert("y".to_string(), Value::Map(z));
    scope.set("x", Value::Map(y));

    assert_eq!(eval_ok("x.y.z", &scope), Value::Int(5));
}

#[test]
fn field_expressions_on_objects() {
    let scope = Scope::new();
    scope.set("x", Value::object(MockObject::new(5)));
    assert_eq!(eval_ok("x.field", &scope), Value::Int(5));

    let scope = Scope::new();
    let mut outer = MockObject::new(0);
    outer.nested = Some(Rc::new(MockObject::new(5)));
    scope.set("x", Value::object(outer));
    assert_eq!(eval_ok("x.nested.field", &scope), Value::Int(5));
}

#[test]
fn field_lookup_failures() {
    let scope = Scope::new();
    scope.set("m", Value::Map(BTreeMap::new()));
    let err = eval_err("m.missing", &scope);
    assert!(err.message().contains("key not found in map: missing"), "{err}");

    scope.set("o", Value::object(MockObject::new(1)));
    let err = eval_err("o.missing", &scope);
    assert!(
        err.message()
            .contains("field or function not found in object of type MockObject: missing"),
        "{err}"
    );

    scope.set("i", 5);
    let err = eval_err("i.missing", &scope);
    assert!(
        err.message()
            .contains("field or function not found in object of type int: missing"),
        "{err}"
    );

    scope.set("n", Value::Nil);
    let err = eval_err("n.missing", &scope);
    assert!(
        err.message()
            .contains("cannot get field or function 'missing' from nil object"),
        "{err}"
    );
}

#[test]
fn field_index_must_be_a_string() {
    let scope = Scope::new();
    scope.set("m", Value::Map(BTreeMap::new()));
    let err = eval_err("m[5]", &scope);
    assert!(
        err.message()
            .contains("type of index expression in field expression is not string: int"),
        "{err}"
    );
}

#[test]
fn call_expressions() {
    let scope = Scope::new();
    scope.set("x", Value::object(MockObject::new(0)));
    scope.set(
        "foo",
        Func::new([ParamKind::Int, ParamKind::Int], |args| {
            Ok(Value::Int(int_arg(&args, 0) * int_arg(&args, 1)))
        }),
    );

    assert_eq!(eval_ok("x.five()", &scope), Value::Int(5));
    assert_eq!(eval_ok("x.double(21)", &scope), Value::Int(42));
    assert_eq!(eval_ok("x.sum(6, 7)", &scope), Value::Int(13));
    assert_eq!(
        eval_ok("x.sum_with_map({\n \"x\": 10,\n \"y\": 20\n})", &scope),
        Value::Int(30)
    );
    assert_eq!(eval_ok("foo(3, 4)", &scope), Value::Int(12));
    assert_eq!(eval_ok("let x = foo\nx(3, 4)", &scope), Value::Int(12));
}

#[test]
fn call_rejects_non_functions_and_bad_arity() {
    let scope = Scope::new();
    scope.set("x", 5);
    let err = eval_err("x()", &scope);
    assert!(
        err.message()
            .contains("callee expression in call expression is not a function: int"),
        "{err}"
    );

    scope.set("f", Func::new([ParamKind::Int], |_| Ok(Value::Nil)));
    let err = eval_err("f(1, 2)", &scope);
    assert!(err.message().contains("too many arguments for function call"), "{err}");
}

#[test]
fn call_converts_arguments_to_declared_kinds() {
    let scope = Scope::new();
    scope.set(
        "f",
        Func::new([ParamKind::Str], |args| match &args[0] {
            Arg::Value(Value::Str(s)) => Ok(Value::Int(s.len() as i64)),
            other => panic!("expected a string argument, got {other:?}"),
        }),
    );

    assert_eq!(eval_ok(r#"f("abcd")"#, &scope), Value::Int(4));
    // nil converts to the parameter's zero value
    assert_eq!(eval_ok("f(nil)", &scope), Value::Int(0));

    let err = eval_err("f(5)", &scope);
    assert!(
        err.message()
            .contains("cannot convert argument of type int to required type string"),
        "{err}"
    );
}

#[test]
fn unresolved_extra_arguments_name_the_parameter() {
    let scope = Scope::new();
    scope.set(
        "f",
        Func::new([ParamKind::Int, ParamKind::Context], |args| {
            Ok(Value::Int(int_arg(&args, 0)))
        }),
    );

    let err = eval_err("f(1)", &scope);
    assert!(
        err.message()
            .contains("cannot resolve argument #2 for function call: context"),
        "{err}"
    );
}

#[test]
fn argument_resolvers_fill_missing_parameters_in_order() {
    let scope = Scope::new();
    scope.set(
        "ctx_value",
        Func::new([ParamKind::Int, ParamKind::Context], |args| {
            let Arg::Context(ctx) = &args[1] else {
                panic!("expected context argument");
            };
            let base = ctx.get::<i64>().copied().unwrap_or(0);
            Ok(Value::Int(base + int_arg(&args, 0)))
        }),
    );

    let prog = parse_source_in_code_mode("ctx_value(2)").unwrap();

    let ctx = Context::new(40i64);
    // first resolver declines, second provides the context
    let mut ev = Evaluator::new()
        .with_argument_resolver(|_| Ok(None))
        .with_argument_resolver(move |kind| {
            Ok(match kind {
                ParamKind::Context => Some(Arg::Context(ctx.clone())),
                _ => None,
            })
        });

    assert_eq!(ev.eval(&prog, &scope).unwrap(), Value::Int(42));
}

#[test]
fn scope_resolver_hands_out_the_evaluation_scope() {
    let scope = Scope::new();
    scope.set("flag", true);
    scope.set(
        "has",
        Func::new([ParamKind::Str, ParamKind::Scope], |args| {
            let name = match &args[0] {
                Arg::Value(Value::Str(s)) => s.clone(),
                other => panic!("expected string argument, got {other:?}"),
            };
            let Arg::Scope(s) = &args[1] else {
                panic!("expected scope argument");
            };
            Ok(Value::Bool(s.has_value(&name)))
        }),
    );

    let resolver_scope = scope.clone();
    let mut ev = Evaluator::new().with_argument_resolver(move |kind| {
        Ok(match kind {
            ParamKind::Scope => Some(Arg::Scope(resolver_scope.clone())),
            _ => None,
        })
    });

    let prog = parse_source_in_code_mode(r#"has("flag")"#).unwrap();
    assert_eq!(ev.eval(&prog, &scope).unwrap(), Value::Bool(true));

    let prog = parse_source_in_code_mode(r#"has("missing")"#).unwrap();
    assert_eq!(ev.eval(&prog, &scope).unwrap(), Value::Bool(false));
}

#[test]
fn host_errors_abort_with_the_call_position() {
    let scope = Scope::new();
    scope.set(
        "fail",
        Func::new([], |_| Err(miette::miette!("database exploded"))),
    );

    let err = eval_err("1 + 2\n  fail()", &scope);
    assert!(err.is_host());
    assert!(err.message().contains("database exploded"), "{err}");
    assert_eq!((err.line(), err.column()), (2, 3));
    assert!(err.to_string().starts_with("host error at line 2, column 3"));
}

#[test]
fn for_statements_mutate_enclosing_bindings() {
    let cases: &[(&str, i64)] = &[
        (
            "let x = 10\nfor i in range(1, 6)\n let x = x + 1\nend\nfor i in range(11, 16)\n let x = x + 2\nend",
            25,
        ),
        (
            "let x = 10\nfor i in range(1, 3)\n for j in range(1, 11)\n  let x = x + 1\n end\nend",
            30,
        ),
        (
            "let x = 10\nfor i in range(1, 3)\n for j in range(1, 11)\n  let x = x + 1\n  if j == 5\n   break\n  end\n  let x = x + 1\n end\nend",
            28,
        ),
        (
            "let x = 10\nfor i in range(1, 3)\n for j in range(1, 11)\n  let x = x + 1\n  if j >= 5\n   continue\n  end\n  let x = x + 1\n end\nend",
            38,
        ),
    ];

    for (src, expected) in cases {
        let scope = Scope::new();
        scope.set("range", range_func());

        eval_ok(src, &scope);
        assert_eq!(
            scope.value("x").expect("x bound"),
            Value::Int(*expected),
            "src: {src}"
        );
    }
}

#[test]
fn for_loop_runs_once_per_ranger_step() {
    let scope = Scope::new();
    scope.set(
        "items",
        Func::new([], |_| {
            Ok(Value::ranger(SeqRanger::new(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ])))
        }),
    );

    let v = eval_ok("for i in items()\n i * 10\nend", &scope);
    assert_eq!(
        v,
        Value::Seq(vec![Value::Int(10), Value::Int(20), Value::Int(30)])
    );
}

#[test]
fn for_loop_binds_the_status_identifier() {
    let scope = Scope::new();
    scope.set("range", range_func());

    let v = eval_ok("for i, st in range(0, 3)\n st.index\nend", &scope);
    assert_eq!(v, Value::Seq(vec![Value::Int(0), Value::Int(1), Value::Int(2)]));

    let v = eval_ok("for i, st in range(0, 3)\n st.hasMore\nend", &scope);
    assert_eq!(
        v,
        Value::Seq(vec![Value::Bool(true), Value::Bool(true), Value::Bool(false)])
    );
}

#[test]
fn for_identifiers_must_not_shadow_existing_bindings() {
    let scope = Scope::new();
    scope.set("range", range_func());
    scope.set("i", 1);

    let err = eval_err("for i in range(1, 3)\n i\nend", &scope);
    assert!(
        err.message()
            .contains("identifier in for statement already in use: i"),
        "{err}"
    );

    let scope = Scope::new();
    scope.set("range", range_func());
    scope.set("st", 1);

    let err = eval_err("for i, st in range(1, 3)\n i\nend", &scope);
    assert!(
        err.message()
            .contains("status identifier in for statement already in use: st"),
        "{err}"
    );
}

#[test]
fn for_rejects_using_the_same_identifier_twice() {
    let scope = Scope::new();
    scope.set("range", range_func());

    let err = eval_err("for i, i in range(1, 3)\n i\nend", &scope);
    assert!(
        err.message()
            .contains("status identifier in for statement already in use: i"),
        "{err}"
    );
}

#[test]
fn for_requires_a_ranger() {
    let scope = Scope::new();
    scope.set("xs", 5);
    let err = eval_err("for i in xs\n i\nend", &scope);
    assert!(
        err.message()
            .contains("range expression in for statement did not produce a ranger: int"),
        "{err}"
    );
}

#[test]
fn break_and_continue_outside_a_loop_are_errors() {
    let err = eval_err("break", &Scope::new());
    assert!(err.message().contains("break outside of loop"), "{err}");

    let err = eval_err("continue", &Scope::new());
    assert!(err.message().contains("continue outside of loop"), "{err}");
}

#[test]
fn capture_expressions_collect_all_statement_values() {
    let scope = Scope::new();
    eval_ok(
        "let x = capture\n \"a\"\n \"b\"\n \"c\"\n 1 + 2\n true\nend",
        &scope,
    );

    assert_eq!(
        scope.value("x").expect("x bound"),
        Value::Seq(vec![
            Value::Str("a".to_string()),
            Value::Str("b".to_string()),
            Value::Str("c".to_string()),
            Value::Int(3),
            Value::Bool(true),
        ])
    );
}

#[test]
fn capture_collapses_empty_and_single_blocks() {
    let scope = Scope::new();
    assert_eq!(eval_ok("capture\nend", &scope), Value::Nil);
    assert_eq!(eval_ok("capture\n 42\nend", &scope), Value::Int(42));
}

#[test]
fn literal_text_flows_through_the_capture() {
    let prog = parse_source("<% let x = capture\n%>foo <% \"bar\" %> baz<%\nend\n%>").unwrap();

    let scope = Scope::new();
    Evaluator::new().eval(&prog, &scope).unwrap();

    assert_eq!(
        scope.value("x").expect("x bound"),
        Value::Seq(vec![
            Value::Str("foo ".to_string()),
            Value::Str("bar".to_string()),
            Value::Str(" baz".to_string()),
        ])
    );
}

#[test]
fn literal_stringer_wraps_literal_text() {
    let prog = parse_source("<% capture %>a<% 1 %>b<% end %>").unwrap();

    let scope = Scope::new();
    let mut ev =
        Evaluator::new().with_literal_stringer(|s| Ok(Value::Safe(SafeString::new(s))));

    let v = ev.eval(&prog, &scope).unwrap();
    assert_eq!(
        v,
        Value::Seq(vec![
            Value::Safe(SafeString::new("a")),
            Value::Int(1),
            Value::Safe(SafeString::new("b")),
        ])
    );
}

#[test]
fn literal_only_source_round_trips_with_the_default_stringer() {
    let src = "plain text, no code at all\nsecond line";
    let prog = parse_source(src).unwrap();

    let v = Evaluator::new().eval(&prog, &Scope::new()).unwrap();
    assert_eq!(v, Value::Str(src.to_string()));
}

#[test]
fn hash_expressions_evaluate_to_maps() {
    let scope = Scope::new();
    let v = eval_ok(r#"let h = { "a": 1, "b": 2 }
h["a"] + h["b"]"#, &scope);
    assert_eq!(v, Value::Int(3));

    let v = eval_ok(r#"{ "k": 42 }"#, &scope);
    let m = v.as_map().expect("map value");
    assert_eq!(m.len(), 1);
    assert_eq!(m.get("k"), Some(&Value::Int(42)));
}

#[test]
fn hash_entries_evaluate_in_source_order() {
    use std::cell::RefCell;

    let calls = Rc::new(RefCell::new(Vec::new()));

    let scope = Scope::new();
    let recorder = calls.clone();
    scope.set(
        "mark",
        Func::new([ParamKind::Int], move |args| {
            let n = int_arg(&args, 0);
            recorder.borrow_mut().push(n);
            Ok(Value::Int(n))
        }),
    );

    // keys are deliberately out of sorted order
    eval_ok(r#"{ "b": mark(1), "a": mark(2) }"#, &scope);
    assert_eq!(*calls.borrow(), vec![1, 2]);
}

#[test]
fn division_by_zero_is_an_error_at_the_operator() {
    let err = eval_err("1 / 0", &Scope::new());
    assert!(err.message().contains("division by zero"), "{err}");
    assert_eq!((err.line(), err.column()), (1, 1));

    let err = eval_err("1 % 0", &Scope::new());
    assert!(err.message().contains("division by zero"), "{err}");
}

#[test]
fn prefix_and_infix_type_mismatches_are_errors() {
    let err = eval_err("-true", &Scope::new());
    assert!(
        err.message()
            .contains("incompatible expression type for '-' prefix expression: bool"),
        "{err}"
    );

    let err = eval_err("!5", &Scope::new());
    assert!(
        err.message()
            .contains("incompatible expression type for '!' prefix expression: int"),
        "{err}"
    );

    let err = eval_err(r#"1 + "x""#, &Scope::new());
    assert!(
        err.message()
            .contains("cannot handle expression types in '+' infix expression: int vs string"),
        "{err}"
    );

    let err = eval_err(r#""x" - "y""#, &Scope::new());
    assert!(
        err.message()
            .contains("unexpected operator in string infix expression: -"),
        "{err}"
    );
}

#[test]
fn empty_program_evaluates_to_nil() {
    assert_eq!(eval_ok("", &Scope::new()), Value::Nil);
}
