use std::str::FromStr;

use num_bigint::BigInt;
use quire_builtins::{Complex, ErrorCode, PowOutcome, Rational};

#[test]
fn normalize_reduces_and_keeps_denominator_positive() {
    let r = Rational::new(BigInt::from(6), BigInt::from(-4)).unwrap();
    let n = r.normalize();
    assert_eq!(n.numer(), &BigInt::from(-3));
    assert_eq!(n.denom(), &BigInt::from(2));
}

#[test]
fn arithmetic_defers_normalization() {
    let half = Rational::new(BigInt::from(2), BigInt::from(4)).unwrap();
    let quarter = Rational::new(BigInt::from(2), BigInt::from(8)).unwrap();
    let sum = &half + &quarter;
    // Un-normalized internally, but equal to 3/4.
    assert_eq!(sum, Rational::new(BigInt::from(3), BigInt::from(4)).unwrap());
    let n = sum.normalize();
    assert_eq!(n.numer(), &BigInt::from(3));
    assert_eq!(n.denom(), &BigInt::from(4));
}

#[test]
fn literal_forms_round_trip() {
    assert_eq!(
        Rational::from_str("0.5").unwrap(),
        Rational::new(1.into(), 2.into()).unwrap()
    );
    assert_eq!(
        Rational::from_str("2.5e2").unwrap(),
        Rational::from_i64(250)
    );
    assert_eq!(
        Rational::from_str("2.5e-1").unwrap(),
        Rational::new(1.into(), 4.into()).unwrap()
    );
    assert_eq!(Rational::from_str("0x1F").unwrap(), Rational::from_i64(31));
    assert_eq!(
        Rational::from_str("2 3/8").unwrap(),
        Rational::new(19.into(), 8.into()).unwrap()
    );
    assert_eq!(
        Rational::from_str("12.5%").unwrap(),
        Rational::new(1.into(), 8.into()).unwrap()
    );
    assert_eq!(Rational::from_str("-7/2").unwrap(), Rational::new((-7).into(), 2.into()).unwrap());
}

#[test]
fn bad_literal_is_reported() {
    let err = Rational::from_str("12..5").unwrap_err();
    assert_eq!(err.code, ErrorCode::BadLiteral);
}

#[test]
fn fixed_point_display_rounds_half_away_from_zero() {
    let third = Rational::new(1.into(), 3.into()).unwrap();
    assert_eq!(third.to_string_fixed(4), "0.3333");
    let r = Rational::from_str("2.675").unwrap();
    assert_eq!(r.to_string_fixed(2), "2.68");
    let neg = Rational::from_str("-2.5").unwrap();
    assert_eq!(neg.to_string_fixed(0), "-3");
}

#[test]
fn display_round_trip() {
    let r = Rational::from_str("1.25").unwrap();
    assert_eq!(Rational::from_str(&r.to_string()).unwrap(), r);
}

#[test]
fn significant_digit_strings_round_trip_through_rounding() {
    let third = Rational::new(1.into(), 3.into()).unwrap();
    assert_eq!(third.to_string_significant(3), "0.333");
    let big = Rational::from_str("12345.678").unwrap();
    assert_eq!(big.to_string_significant(4), "12346");
    // Parsing the rounded string reproduces the rounded value exactly.
    let rounded = Rational::from_str(&third.to_string_fixed(4)).unwrap();
    assert_eq!(rounded, Rational::from_str("0.3333").unwrap());
}

#[test]
fn division_by_zero_is_a_typed_error() {
    let one = Rational::one();
    let zero = Rational::zero();
    assert_eq!(
        one.checked_div(&zero).unwrap_err().code,
        ErrorCode::DivideByZero
    );
    assert!(Rational::new(1.into(), 0.into()).is_err());
}

#[test]
fn integer_powers_are_exact() {
    let two = Rational::from_i64(2);
    match two.pow(&Rational::from_i64(10)).unwrap() {
        PowOutcome::Real(r) => assert_eq!(r, Rational::from_i64(1024)),
        PowOutcome::Cplx(_) => panic!("expected a real result"),
    }
    match two.pow(&Rational::from_i64(-2)).unwrap() {
        PowOutcome::Real(r) => {
            assert_eq!(r, Rational::new(1.into(), 4.into()).unwrap())
        }
        PowOutcome::Cplx(_) => panic!("expected a real result"),
    }
}

#[test]
fn negative_base_odd_denominator_takes_the_real_root() {
    // Known-approximate region: the float fallback supplies the
    // magnitude, the numerator parity supplies the sign.
    let base = Rational::from_i64(-8);
    let third = Rational::new(1.into(), 3.into()).unwrap();
    match base.pow(&third).unwrap() {
        PowOutcome::Real(r) => assert!((r.to_f64() + 2.0).abs() < 1e-9),
        PowOutcome::Cplx(_) => panic!("odd denominator must stay real"),
    }
}

#[test]
fn negative_base_even_denominator_goes_complex() {
    let base = Rational::from_i64(-4);
    let half = Rational::new(1.into(), 2.into()).unwrap();
    match base.pow(&half).unwrap() {
        PowOutcome::Cplx(c) => {
            assert!((c.im.to_f64() - 2.0).abs() < 1e-9);
        }
        PowOutcome::Real(_) => panic!("even denominator must go complex"),
    }
}

#[test]
fn sqrt_is_exact_for_perfect_squares() {
    let r = Rational::new(9.into(), 16.into()).unwrap();
    match r.sqrt().unwrap() {
        PowOutcome::Real(x) => {
            assert_eq!(x, Rational::new(3.into(), 4.into()).unwrap())
        }
        PowOutcome::Cplx(_) => panic!("expected a real root"),
    }
    match Rational::from_i64(-4).sqrt().unwrap() {
        PowOutcome::Cplx(c) => {
            assert!(c.re.is_zero());
            assert_eq!(c.im, Rational::from_i64(2));
        }
        PowOutcome::Real(_) => panic!("expected an imaginary root"),
    }
}

#[test]
fn factorial_table_and_gamma() {
    assert_eq!(
        Rational::from_i64(5).factorial().unwrap(),
        Rational::from_i64(120)
    );
    assert_eq!(Rational::zero().factorial().unwrap(), Rational::one());
    // 100! ends the exact table; spot-check a known leading digit run.
    let big = Rational::from_i64(100).factorial().unwrap();
    assert!(big.to_string().starts_with("93326215443944152681"));
    // Non-integer arguments go through Lanczos: (1/2)! = gamma(3/2).
    let half = Rational::new(1.into(), 2.into()).unwrap();
    let g = half.factorial().unwrap().to_f64();
    assert!((g - 0.886_226_925_452_758).abs() < 1e-12);
}

#[test]
fn modulo_follows_the_dividend_sign() {
    let a = Rational::from_i64(7);
    let b = Rational::from_i64(3);
    assert_eq!(a.modulo(&b).unwrap(), Rational::from_i64(1));
    let neg = Rational::from_i64(-7);
    assert_eq!(neg.modulo(&b).unwrap(), Rational::from_i64(-1));
}

#[test]
fn complex_arithmetic_and_snap() {
    let a = Complex::new(Rational::from_i64(1), Rational::from_i64(2));
    let b = Complex::new(Rational::from_i64(3), Rational::from_i64(-1));
    let product = a.mul(&b);
    assert_eq!(product.re, Rational::from_i64(5));
    assert_eq!(product.im, Rational::from_i64(5));

    let snapped = Complex::from_c64(num_complex::Complex64::new(2.0, 1e-16)).unwrap();
    assert!(snapped.is_real());
    assert_eq!(snapped.re, Rational::from_i64(2));
}

#[test]
fn complex_magnitude_exact_on_pythagorean_pairs() {
    let z = Complex::new(Rational::from_i64(3), Rational::from_i64(4));
    assert_eq!(z.magnitude().unwrap(), Rational::from_i64(5));
}
