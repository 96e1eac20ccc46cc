use std::str::FromStr;

use quire_builtins::{ErrorCode, Rational};
use quire_units::{clear_exchange_rates, lookup_single, resolve, set_exchange_rates};

#[test]
fn base_units_resolve_with_unit_factors() {
    let m = resolve("m").unwrap();
    assert_eq!(m.factor, Rational::one());
    assert_eq!(m.dims.0, [1, 0, 0, 0, 0, 0, 0, 0]);
    let n = resolve("N").unwrap();
    assert_eq!(n.dims.0, [1, 1, -2, 0, 0, 0, 0, 0]);
}

#[test]
fn symbol_prefixes_scale_si_symbols() {
    let km = resolve("km").unwrap();
    assert_eq!(km.factor, Rational::from_i64(1000));
    let mm = resolve("mm").unwrap();
    assert_eq!(mm.factor, Rational::new(1.into(), 1000.into()).unwrap());
    // "min" is an exact table hit, not milli-"in".
    let min = resolve("min").unwrap();
    assert_eq!(min.factor, Rational::from_i64(60));
}

#[test]
fn word_prefixes_apply_to_word_forms_first() {
    let km = resolve("kilometer").unwrap();
    assert_eq!(km.factor, Rational::from_i64(1000));
    let micro = resolve("microsecond").unwrap();
    assert_eq!(
        micro.factor,
        Rational::new(1.into(), 1_000_000.into()).unwrap()
    );
}

#[test]
fn prefixes_do_not_apply_to_non_si_units() {
    assert!(resolve("kft").is_err());
}

#[test]
fn compound_expressions_compose_factors_and_exponents() {
    let unit = resolve("N\u{00b7}m/s\u{00b2}").unwrap();
    assert_eq!(unit.dims.0, [2, 1, -4, 0, 0, 0, 0, 0]);
    let speed = resolve("km/h").unwrap();
    assert_eq!(speed.dims.0, [1, 0, -1, 0, 0, 0, 0, 0]);
    assert_eq!(
        speed.factor,
        Rational::new(5.into(), 18.into()).unwrap()
    );
    let density = resolve("kg/m^3").unwrap();
    assert_eq!(density.dims.0, [-3, 1, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn unit_round_trip_is_exact_for_rational_factors() {
    for name in ["ft", "psi", "torr", "\u{00b0}C", "\u{00b0}F", "kWh"] {
        let unit = resolve(name).unwrap();
        let x = Rational::from_str("3.5").unwrap();
        let back = unit.from_base(&unit.to_base(&x)).unwrap();
        assert_eq!(back, x, "round trip failed for {name}");
    }
}

#[test]
fn temperature_gauges_offset_the_scale() {
    let celsius = resolve("\u{00b0}C").unwrap();
    assert_eq!(
        celsius.to_base(&Rational::from_i64(100)),
        Rational::from_str("373.15").unwrap()
    );
    let fahrenheit = resolve("\u{00b0}F").unwrap();
    assert_eq!(
        fahrenheit.to_base(&Rational::from_i64(32)),
        Rational::from_str("273.15").unwrap()
    );
}

#[test]
fn incompatible_dimensions_are_detected() {
    let m = resolve("m").unwrap();
    let s = resolve("s").unwrap();
    assert!(!quire_units::compatible(&m, &s));
    let ft = resolve("ft").unwrap();
    assert!(quire_units::compatible(&m, &ft));
}

#[test]
fn unknown_unit_is_a_bad_name() {
    let err = resolve("furlongs_per_firkin").unwrap_err();
    assert_eq!(err.code, ErrorCode::BadUnitName);
}

#[test]
fn currency_without_a_rate_is_a_hard_failure() {
    clear_exchange_rates();
    let err = resolve("KRW").unwrap_err();
    assert_eq!(err.code, ErrorCode::CurrencyUndefined);

    // A host-supplied rate makes it resolvable.
    set_exchange_rates(r#"{"KRW": 1350.0}"#).unwrap();
    let krw = resolve("KRW").unwrap();
    assert_eq!(krw.dims.0, [0, 0, 0, 0, 0, 0, 0, 1]);
    assert!(!krw.factor.is_zero());
    clear_exchange_rates();
}

#[test]
fn static_currency_fallback_applies_without_overrides() {
    clear_exchange_rates();
    let eur = lookup_single("EUR").unwrap().unwrap();
    assert_eq!(eur.factor, Rational::from_str("1.08").unwrap());
}
