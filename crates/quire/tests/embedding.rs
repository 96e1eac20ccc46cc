//! The embedding surface end to end: lex → parse → evaluate, plus
//! direct user-function execution: the four entry points a host
//! editor consumes.

use quire::{
    evaluate, lex, parse, parse_function_def, run_user_function, Environment, Rational, Token,
    Value,
};

fn num(n: i64) -> Value {
    Value::Num(Rational::from_i64(n))
}

#[test]
fn lex_parse_evaluate_pipeline() {
    // Incremental lexing, as the editor does while the author types.
    let first = lex("2 + 2", false).unwrap();
    assert_eq!(first.token, Token::Num);

    let (render, program) = parse("2 + 3 \u{00d7} 4", true).unwrap();
    assert!(render.contains('\u{00d7}'));
    let result = evaluate(&program, &Environment::new(), false).unwrap();
    assert_eq!(result, num(14));
}

#[test]
fn render_mode_feeds_the_typesetter_only() {
    let (render, program) = parse("\u{221a}2 x", false).unwrap();
    assert!(!render.is_empty());
    assert!(program.is_empty());
}

#[test]
fn environment_is_caller_owned_and_untouched() {
    let env = Environment::from([("a".to_string(), num(21))]);
    let (_, program) = parse("2a", true).unwrap();
    assert_eq!(evaluate(&program, &env, false).unwrap(), num(42));
    // Still exactly what the caller put in.
    assert_eq!(env.len(), 1);
    assert_eq!(env.get("a"), Some(&num(21)));
}

#[test]
fn user_functions_run_directly() {
    let func = parse_function_def(
        "function hypotenuse(a, b)\n\
         return \u{221a}(a^2 + b^2)\n\
         end",
    )
    .unwrap();
    assert_eq!(
        run_user_function(&func, &[num(3), num(4)], false).unwrap(),
        num(5)
    );
}

#[test]
fn unit_aware_evaluation_is_a_mode_switch() {
    let (_, program) = parse("'1 km' + '500 m'", true).unwrap();
    let aware = evaluate(&program, &Environment::new(), true).unwrap();
    assert_eq!(aware.to_string(), "3/2 km");
    let plain = evaluate(&program, &Environment::new(), false).unwrap();
    assert_eq!(plain, num(501));
}

#[test]
fn failures_arrive_as_templated_messages() {
    let (_, program) = parse("undefined_name + 1", true).unwrap();
    let err = evaluate(&program, &Environment::new(), false).unwrap_err();
    assert!(err.message().contains("undefined_name"));
    assert_eq!(err.code.as_str(), "UNDEFINED_VAR");
}
