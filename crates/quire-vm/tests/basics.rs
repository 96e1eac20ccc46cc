use quire_builtins::{ErrorCode, Rational, Value};
use quire_parser::parse;
use quire_vm::{evaluate, Environment};

fn run(input: &str) -> Result<Value, quire_builtins::LangError> {
    let (_, program) = parse(input, true).unwrap();
    evaluate(&program, &Environment::new(), false)
}

fn num(n: i64) -> Value {
    Value::Num(Rational::from_i64(n))
}

#[test]
fn arithmetic_and_precedence() {
    assert_eq!(run("2 + 3 \u{00d7} 4").unwrap(), num(14));
    assert_eq!(run("(2 + 3) \u{00d7} 4").unwrap(), num(20));
    assert_eq!(run("2^10").unwrap(), num(1024));
    assert_eq!(run("-2^2").unwrap(), num(-4));
    assert_eq!(
        run("1/3 + 1/6").unwrap(),
        Value::Num(Rational::new(1.into(), 2.into()).unwrap())
    );
}

#[test]
fn postfix_operators() {
    assert_eq!(run("5!").unwrap(), num(120));
    assert_eq!(run("50% \u{00d7} 10").unwrap(), num(5));
    assert_eq!(run("\u{221a}16").unwrap(), num(4));
}

#[test]
fn division_by_zero_is_reported_not_recovered() {
    let err = run("1/0").unwrap_err();
    assert_eq!(err.code, ErrorCode::DivideByZero);
    assert_eq!(err.code.as_str(), "DIV_ZERO");
}

#[test]
fn chained_comparisons_short_circuit() {
    assert_eq!(run("1 < 2 < 3").unwrap(), Value::Bool(true));
    assert_eq!(run("3 < 2 < 5").unwrap(), Value::Bool(false));
    assert_eq!(run("1 < 2 < 3 < 4").unwrap(), Value::Bool(true));
    assert_eq!(run("1 \u{2264} 1 < 2").unwrap(), Value::Bool(true));
}

#[test]
fn lazy_cases_never_run_the_untaken_branch() {
    // The first branch divides by zero; it is never selected, so the
    // error never surfaces.
    assert_eq!(run("{1/0 if false; 5 otherwise}").unwrap(), num(5));
    assert_eq!(run("{7 if true; 1/0 otherwise}").unwrap(), num(7));
}

#[test]
fn cases_select_the_first_true_condition() {
    let env = Environment::from([("x".to_string(), num(75))]);
    let (_, program) =
        parse("{1 if x > 90; 2 if x > 50; 3 otherwise}", true).unwrap();
    assert_eq!(evaluate(&program, &env, false).unwrap(), num(2));
}

#[test]
fn variables_resolve_from_the_environment() {
    let env = Environment::from([("a".to_string(), num(6))]);
    let (_, program) = parse("2a + 1", true).unwrap();
    assert_eq!(evaluate(&program, &env, false).unwrap(), num(13));

    let err = evaluate(&parse("b + 1", true).unwrap().1, &env, false).unwrap_err();
    assert_eq!(err.code, ErrorCode::UndefinedVariable);
}

#[test]
fn named_constants_yield_to_environment_entries() {
    let empty = Environment::new();
    let pi = evaluate(&parse("pi", true).unwrap().1, &empty, false).unwrap();
    match pi {
        Value::Num(r) => assert!((r.to_f64() - std::f64::consts::PI).abs() < 1e-15),
        other => panic!("expected a number, got {other:?}"),
    }
    let shadowed = Environment::from([("pi".to_string(), num(3))]);
    assert_eq!(
        evaluate(&parse("pi", true).unwrap().1, &shadowed, false).unwrap(),
        num(3)
    );
}

#[test]
fn matrices_build_and_index() {
    assert_eq!(run("(1, 2; 3, 4)[2, 1]").unwrap(), num(3));
    assert_eq!(run("(5, 6, 7)[3]").unwrap(), num(7));
    let err = run("(5, 6, 7)[4]").unwrap_err();
    assert_eq!(err.code, ErrorCode::BadIndex);
}

#[test]
fn bracketed_ranges_expand_to_vectors() {
    assert_eq!(run("sum([1..5])").unwrap(), num(15));
    assert_eq!(run("[1..5][2]").unwrap(), num(2));
}

#[test]
fn strings_concatenate_and_index() {
    assert_eq!(
        run("\"cal\" & \"culate\"").unwrap(),
        Value::Str("calculate".to_string())
    );
    assert_eq!(run("\"quire\"[2]").unwrap(), Value::Str("u".to_string()));
}

#[test]
fn map_literals_and_access() {
    assert_eq!(run("{a: 1, b: 2}[\"b\"]").unwrap(), num(2));
}

#[test]
fn dot_product_through_the_full_pipeline() {
    assert_eq!(run("(1, 2, 3) \u{00b7} (4, 5, 6)").unwrap(), num(32));
}

#[test]
fn absolute_value_bars() {
    assert_eq!(run("|3 - 5|").unwrap(), num(2));
}

#[test]
fn builtin_calls_evaluate() {
    assert_eq!(run("max(3, 1, 2)").unwrap(), num(3));
    assert_eq!(run("gcd(12, 18)").unwrap(), num(6));
    assert_eq!(run("sin\u{00b2}(0) + 1").unwrap(), num(1));
}

#[test]
fn tables_build_from_vectors() {
    assert_eq!(
        run("table(\"w\", (1, 2, 3), \"h\", (4, 5, 6))[\"h\"][3]").unwrap(),
        num(6)
    );
}

#[test]
fn inline_table_literals_index_by_column() {
    let program = parse(
        "``name, width\nbeam, 0.2\nslab, 6``[\"width\"][1]",
        true,
    )
    .unwrap()
    .1;
    let result = evaluate(&program, &Environment::new(), false).unwrap();
    assert_eq!(
        result,
        Value::Num(Rational::new(1.into(), 5.into()).unwrap())
    );
}

#[test]
fn errors_propagate_without_partial_results() {
    // The inner failure surfaces as-is; no partial sum is produced.
    let err = run("1 + gcd(12)").unwrap_err();
    assert_eq!(err.code, ErrorCode::WrongArity);
    let err = run("1 + 2/0 + 3").unwrap_err();
    assert_eq!(err.code, ErrorCode::DivideByZero);
}
