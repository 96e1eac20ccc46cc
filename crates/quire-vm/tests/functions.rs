use quire_builtins::{ErrorCode, Rational, Value};
use quire_parser::{parse, parse_function_def};
use quire_vm::{evaluate, run_user_function, Environment};

fn num(n: i64) -> Value {
    Value::Num(Rational::from_i64(n))
}

#[test]
fn while_loop_accumulates() {
    let func = parse_function_def(
        "function sumto(n)\n\
         total = 0\n\
         i = 1\n\
         while i <= n\n\
         total = total + i\n\
         i = i + 1\n\
         end\n\
         return total\n\
         end",
    )
    .unwrap();
    assert_eq!(run_user_function(&func, &[num(10)], false).unwrap(), num(55));
    assert_eq!(run_user_function(&func, &[num(0)], false).unwrap(), num(0));
}

#[test]
fn for_loop_iterates_ranges_and_vectors() {
    let func = parse_function_def(
        "function total(v)\n\
         acc = 0\n\
         for x in v\n\
         acc = acc + x\n\
         end\n\
         return acc\n\
         end",
    )
    .unwrap();
    let range = evaluate(
        &parse("1..4", true).unwrap().1,
        &Environment::new(),
        false,
    )
    .unwrap();
    assert_eq!(run_user_function(&func, &[range], false).unwrap(), num(10));

    let vector = evaluate(
        &parse("(2, 4, 6)", true).unwrap().1,
        &Environment::new(),
        false,
    )
    .unwrap();
    assert_eq!(run_user_function(&func, &[vector], false).unwrap(), num(12));
}

#[test]
fn for_loop_iterates_text_by_character() {
    let func = parse_function_def(
        "function chars(s)\n\
         n = 0\n\
         for c in s\n\
         n = n + 1\n\
         end\n\
         return n\n\
         end",
    )
    .unwrap();
    let arg = Value::Str("ab\u{1d49c}c".to_string());
    // The astral-plane letter counts once.
    assert_eq!(run_user_function(&func, &[arg], false).unwrap(), num(4));
}

#[test]
fn break_jumps_past_the_nearest_loop() {
    let func = parse_function_def(
        "function firstover(v, limit)\n\
         found = 0\n\
         for x in v\n\
         if x > limit\n\
         found = x\n\
         break\n\
         end\n\
         end\n\
         return found\n\
         end",
    )
    .unwrap();
    let vector = evaluate(
        &parse("(1, 8, 3, 9)", true).unwrap().1,
        &Environment::new(),
        false,
    )
    .unwrap();
    assert_eq!(
        run_user_function(&func, &[vector, num(5)], false).unwrap(),
        num(8)
    );
}

#[test]
fn if_else_chains_pick_one_branch() {
    let func = parse_function_def(
        "function grade(x)\n\
         if x >= 90\n\
         g = \"A\"\n\
         else if x >= 80\n\
         g = \"B\"\n\
         else\n\
         g = \"C\"\n\
         end\n\
         return g\n\
         end",
    )
    .unwrap();
    assert_eq!(
        run_user_function(&func, &[num(95)], false).unwrap(),
        Value::Str("A".to_string())
    );
    assert_eq!(
        run_user_function(&func, &[num(85)], false).unwrap(),
        Value::Str("B".to_string())
    );
    assert_eq!(
        run_user_function(&func, &[num(40)], false).unwrap(),
        Value::Str("C".to_string())
    );
}

#[test]
fn nested_loops_break_only_the_inner_one() {
    let func = parse_function_def(
        "function pairs(n)\n\
         count = 0\n\
         for i in 1..n\n\
         for j in 1..n\n\
         if j > i\n\
         break\n\
         end\n\
         count = count + 1\n\
         end\n\
         end\n\
         return count\n\
         end",
    )
    .unwrap();
    // For n = 3: inner loop runs i times per outer pass.
    assert_eq!(run_user_function(&func, &[num(3)], false).unwrap(), num(6));
}

#[test]
fn functions_call_functions_and_recurse() {
    let fact = parse_function_def(
        "function fact(n)\n\
         if n <= 1\n\
         return 1\n\
         end\n\
         return n \u{00d7} fact(n - 1)\n\
         end",
    )
    .unwrap();
    assert_eq!(run_user_function(&fact, &[num(6)], false).unwrap(), num(720));
}

#[test]
fn runaway_recursion_hits_the_depth_guard() {
    let func = parse_function_def(
        "function forever(n)\n\
         return forever(n + 1)\n\
         end",
    )
    .unwrap();
    let err = run_user_function(&func, &[num(0)], false).unwrap_err();
    assert_eq!(err.code, ErrorCode::RecursionDepth);
}

#[test]
fn raise_terminates_with_the_given_message() {
    let func = parse_function_def(
        "function checked(n)\n\
         if n < 0\n\
         raise \"negative input\"\n\
         end\n\
         return n\n\
         end",
    )
    .unwrap();
    assert_eq!(run_user_function(&func, &[num(3)], false).unwrap(), num(3));
    let err = run_user_function(&func, &[num(-3)], false).unwrap_err();
    assert_eq!(err.code, ErrorCode::Raised);
    assert_eq!(err.message(), "negative input");
}

#[test]
fn user_functions_are_callable_from_expressions() {
    let func = parse_function_def(
        "function double(x)\n\
         return 2x\n\
         end",
    )
    .unwrap();
    let env = Environment::from([(
        "double".to_string(),
        Value::Func(Box::new(func)),
    )]);
    let (_, program) = parse("double(4) + 1", true).unwrap();
    assert_eq!(evaluate(&program, &env, false).unwrap(), num(9));
}

#[test]
fn multiple_assignment_unpacks_vectors() {
    let func = parse_function_def(
        "function swap(a, b)\n\
         x, y = (b, a)\n\
         return x - y\n\
         end",
    )
    .unwrap();
    assert_eq!(
        run_user_function(&func, &[num(2), num(7)], false).unwrap(),
        num(5)
    );
}

#[test]
fn wrong_arity_is_reported() {
    let func = parse_function_def(
        "function double(x)\n\
         return 2x\n\
         end",
    )
    .unwrap();
    let err = run_user_function(&func, &[num(1), num(2)], false).unwrap_err();
    assert_eq!(err.code, ErrorCode::WrongArity);
}
