use std::str::FromStr;

use quire_builtins::{ErrorCode, Rational, Value};
use quire_parser::parse;
use quire_vm::{evaluate, Environment};

fn run_with_units(input: &str) -> Result<Value, quire_builtins::LangError> {
    let (_, program) = parse(input, true).unwrap();
    evaluate(&program, &Environment::new(), true)
}

fn run_plain(input: &str) -> Result<Value, quire_builtins::LangError> {
    let (_, program) = parse(input, true).unwrap();
    evaluate(&program, &Environment::new(), false)
}

fn base_value(v: &Value) -> Rational {
    match v {
        Value::Quantity(q) => match &q.value {
            Value::Num(r) => r.clone(),
            other => panic!("expected a numeric payload, got {other:?}"),
        },
        Value::Num(r) => r.clone(),
        other => panic!("expected a quantity, got {other:?}"),
    }
}

#[test]
fn incompatible_addition_fails_at_the_point_of_violation() {
    let err = run_with_units("'3 m' + '2 s'").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnitAdd);
    assert_eq!(err.code.as_str(), "UNIT_ADD");
}

#[test]
fn the_same_expression_ignores_units_when_not_unit_aware() {
    assert_eq!(
        run_plain("'3 m' + '2 s'").unwrap(),
        Value::Num(Rational::from_i64(5))
    );
}

#[test]
fn compatible_units_convert_through_base() {
    let result = run_with_units("'2 m' + '300 cm'").unwrap();
    assert_eq!(base_value(&result), Rational::from_i64(5));
    // The display unit comes from the left operand.
    match result {
        Value::Quantity(q) => assert_eq!(q.unit.name, "m"),
        other => panic!("expected a quantity, got {other:?}"),
    }
}

#[test]
fn multiplication_adds_exponent_vectors() {
    let result = run_with_units("'3 m' \u{00d7} '2 s'").unwrap();
    match &result {
        Value::Quantity(q) => {
            assert_eq!(q.unit.dims.0, [1, 0, 1, 0, 0, 0, 0, 0]);
            assert_eq!(base_value(&result), Rational::from_i64(6));
        }
        other => panic!("expected a quantity, got {other:?}"),
    }
}

#[test]
fn division_cancels_dimensions_entirely() {
    // m/m is dimensionless and unwraps to a plain number.
    let result = run_with_units("'6 m' / '2 m'").unwrap();
    assert_eq!(result, Value::Num(Rational::from_i64(3)));
}

#[test]
fn power_scales_the_exponent_vector() {
    let result = run_with_units("('2 m')^3").unwrap();
    match &result {
        Value::Quantity(q) => {
            assert_eq!(q.unit.dims.0, [3, 0, 0, 0, 0, 0, 0, 0]);
            assert_eq!(base_value(&result), Rational::from_i64(8));
        }
        other => panic!("expected a quantity, got {other:?}"),
    }
}

#[test]
fn fractional_power_of_a_quantity_is_rejected() {
    let err = run_with_units("('4 m')^0.5").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnitPower);
}

#[test]
fn comparisons_check_dimensions() {
    let err = run_with_units("'3 m' < '2 s'").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnitCompare);
    assert_eq!(
        run_with_units("'3 m' < '2 km'").unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn result_unit_conversion_changes_display_only() {
    // Apply a display unit to an existing quantity.
    let result = run_with_units("'2 m' 'cm'").unwrap();
    match &result {
        Value::Quantity(q) => {
            assert_eq!(q.unit.name, "cm");
            // Payload stays in base units.
            assert_eq!(base_value(&result), Rational::from_i64(2));
        }
        other => panic!("expected a quantity, got {other:?}"),
    }
    assert_eq!(result.to_string(), "200 cm");
}

#[test]
fn incompatible_result_unit_is_rejected() {
    let err = run_with_units("'2 m' 's'").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnitResult);
}

#[test]
fn temperature_gauge_applies_on_entry() {
    let result = run_with_units("'100 \u{00b0}C'").unwrap();
    assert_eq!(base_value(&result), Rational::from_str("373.15").unwrap());
}

#[test]
fn environment_quantities_resolve_per_mode() {
    let quantity = run_with_units("'3 ft'").unwrap();
    let env = Environment::from([("len".to_string(), quantity)]);

    // Unit-aware: base-unit payload flows through.
    let (_, program) = parse("len + '1 ft'", true).unwrap();
    let sum = evaluate(&program, &env, true).unwrap();
    assert_eq!(base_value(&sum), Rational::from_str("1.2192").unwrap());

    // Plain: the author's number comes back out.
    let (_, program) = parse("len + 1", true).unwrap();
    assert_eq!(
        evaluate(&program, &env, false).unwrap(),
        Value::Num(Rational::from_i64(4))
    );
}

#[test]
fn appending_incompatible_quantities_fails() {
    let err = run_with_units("'3 m' & '2 s'").unwrap_err();
    assert_eq!(err.code, ErrorCode::UnitAppend);
}
