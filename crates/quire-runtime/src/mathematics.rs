//! Builtin mathematical functions.
//!
//! Trigonometric, logarithmic, and exponential results are computed
//! in double precision and reconstructed as rationals; everything
//! closed-form (abs, round, gcd, binom, aggregation) stays exact.

use quire_builtins::{Complex, ErrorCode, LangError, Rational, Value};
use quire_macros::runtime_builtin;

use crate::unary;

/// Apply a real function with a complex fallback, element-wise over
/// matrices.
fn apply_numeric(
    x: &Value,
    name: &str,
    real: fn(f64) -> f64,
    complex: fn(num_complex::Complex64) -> num_complex::Complex64,
) -> Result<Value, LangError> {
    match x.payload() {
        Value::Num(r) => {
            let y = real(r.to_f64());
            if y.is_nan() {
                // Out of the real domain; try the complex branch.
                let c = Complex::from_rational(r.clone()).map_c64(complex)?;
                Ok(Value::from(c))
            } else {
                Ok(Value::Num(Rational::from_f64(y)?))
            }
        }
        Value::Complex(c) => Ok(Value::from(c.map_c64(complex)?)),
        Value::Matrix(m) => Ok(Value::Matrix(
            m.map(|v| apply_numeric(v, name, real, complex))?,
        )),
        _ => Err(LangError::with_detail(
            ErrorCode::BadType,
            format!("{name} expects a number"),
        )),
    }
}

#[runtime_builtin(name = "sin")]
fn sin_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "sin", f64::sin, |z| z.sin())
}

#[runtime_builtin(name = "cos")]
fn cos_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "cos", f64::cos, |z| z.cos())
}

#[runtime_builtin(name = "tan")]
fn tan_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "tan", f64::tan, |z| z.tan())
}

#[runtime_builtin(name = "asin")]
fn asin_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "asin", f64::asin, |z| z.asin())
}

#[runtime_builtin(name = "acos")]
fn acos_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "acos", f64::acos, |z| z.acos())
}

#[runtime_builtin(name = "atan")]
fn atan_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "atan", f64::atan, |z| z.atan())
}

#[runtime_builtin(name = "atan2")]
fn atan2_builtin(y: Rational, x: Rational) -> Result<Value, LangError> {
    Ok(Value::Num(Rational::from_f64(y.to_f64().atan2(x.to_f64()))?))
}

#[runtime_builtin(name = "sinh")]
fn sinh_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "sinh", f64::sinh, |z| z.sinh())
}

#[runtime_builtin(name = "cosh")]
fn cosh_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "cosh", f64::cosh, |z| z.cosh())
}

#[runtime_builtin(name = "tanh")]
fn tanh_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "tanh", f64::tanh, |z| z.tanh())
}

#[runtime_builtin(name = "exp")]
fn exp_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "exp", f64::exp, |z| z.exp())
}

#[runtime_builtin(name = "ln")]
fn ln_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "ln", f64::ln, |z| z.ln())
}

/// `log` is the common (base-10) logarithm.
#[runtime_builtin(name = "log")]
fn log_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "log", f64::log10, |z| z.log(10.0))
}

#[runtime_builtin(name = "log10")]
fn log10_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "log10", f64::log10, |z| z.log(10.0))
}

#[runtime_builtin(name = "log2")]
fn log2_builtin(x: Value) -> Result<Value, LangError> {
    apply_numeric(&x, "log2", f64::log2, |z| z.log(2.0))
}

#[runtime_builtin(name = "sqrt")]
fn sqrt_builtin(x: Value) -> Result<Value, LangError> {
    unary::square_root(&x)
}

#[runtime_builtin(name = "abs")]
fn abs_builtin(x: Value) -> Result<Value, LangError> {
    unary::absolute(&x)
}

#[runtime_builtin(name = "round")]
fn round_builtin(x: Value) -> Result<Value, LangError> {
    match x.payload() {
        Value::Num(r) => Ok(Value::Num(Rational::from_integer(r.round()))),
        Value::Matrix(m) => Ok(Value::Matrix(m.map(|v| round_builtin(v.clone()))?)),
        _ => Err(LangError::with_detail(ErrorCode::BadType, "round expects a number")),
    }
}

#[runtime_builtin(name = "floor")]
fn floor_builtin(x: Value) -> Result<Value, LangError> {
    match x.payload() {
        Value::Num(r) => Ok(Value::Num(Rational::from_integer(r.floor()))),
        Value::Matrix(m) => Ok(Value::Matrix(m.map(|v| floor_builtin(v.clone()))?)),
        _ => Err(LangError::with_detail(ErrorCode::BadType, "floor expects a number")),
    }
}

#[runtime_builtin(name = "ceil")]
fn ceil_builtin(x: Value) -> Result<Value, LangError> {
    match x.payload() {
        Value::Num(r) => Ok(Value::Num(Rational::from_integer(r.ceil()))),
        Value::Matrix(m) => Ok(Value::Matrix(m.map(|v| ceil_builtin(v.clone()))?)),
        _ => Err(LangError::with_detail(ErrorCode::BadType, "ceil expects a number")),
    }
}

#[runtime_builtin(name = "sign")]
fn sign_builtin(x: Rational) -> Result<Value, LangError> {
    let s = if x.is_zero() {
        0
    } else if x.is_negative() {
        -1
    } else {
        1
    };
    Ok(Value::Num(Rational::from_i64(s)))
}

#[runtime_builtin(name = "gcd")]
fn gcd_builtin(a: Rational, b: Rational) -> Result<Value, LangError> {
    Ok(Value::Num(a.gcd(&b)?))
}

/// Binomial coefficient n over k.
#[runtime_builtin(name = "binom")]
fn binom_builtin(n: Rational, k: Rational) -> Result<Value, LangError> {
    let num = n.factorial()?;
    let den = &k.factorial()? * &(&n - &k).factorial()?;
    Ok(Value::Num(num.checked_div(&den)?))
}

#[runtime_builtin(name = "length")]
fn length_builtin(x: Value) -> Result<Value, LangError> {
    let n = match x.payload() {
        Value::Str(s) => s.chars().count(),
        Value::Matrix(m) => m.len(),
        Value::Range(r) => r.len(),
        Value::Map(m) => m.len(),
        Value::Table(t) => t.num_rows(),
        Value::Tuple(items) => items.len(),
        _ => 1,
    };
    Ok(Value::Num(Rational::from_i64(n as i64)))
}

#[runtime_builtin(name = "count")]
fn count_builtin(x: Value) -> Result<Value, LangError> {
    length_builtin(x)
}

#[runtime_builtin(name = "transpose")]
fn transpose_builtin(x: Value) -> Result<Value, LangError> {
    unary::transpose(&x)
}

/// Collect the numbers an aggregation runs over: a single vector
/// argument aggregates its elements, several arguments aggregate the
/// argument list.
fn aggregation_operands(args: &[Value]) -> Result<Vec<Value>, LangError> {
    if args.len() == 1 {
        unary::vector_elements(&args[0])
    } else {
        Ok(args.to_vec())
    }
}

#[runtime_builtin(name = "sum")]
fn sum_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    let items = aggregation_operands(&args)?;
    let mut acc = Value::Num(Rational::zero());
    for item in &items {
        acc = crate::binary::add(&acc, item)?;
    }
    Ok(acc)
}

#[runtime_builtin(name = "product")]
fn product_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    let items = aggregation_operands(&args)?;
    let mut acc = Value::Num(Rational::one());
    for item in &items {
        acc = crate::binary::multiply(&acc, item)?;
    }
    Ok(acc)
}

#[runtime_builtin(name = "mean")]
fn mean_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    let items = aggregation_operands(&args)?;
    if items.is_empty() {
        return Err(LangError::with_detail(
            ErrorCode::BadType,
            "mean of an empty collection",
        ));
    }
    let mut acc = Value::Num(Rational::zero());
    for item in &items {
        acc = crate::binary::add(&acc, item)?;
    }
    crate::binary::divide(&acc, &Value::Num(Rational::from_i64(items.len() as i64)))
}

fn extremum(args: &[Value], want_max: bool) -> Result<Value, LangError> {
    let items = aggregation_operands(args)?;
    let mut best: Option<Value> = None;
    for item in &items {
        best = match best {
            None => Some(item.clone()),
            Some(current) => {
                let op = if want_max { ">" } else { "<" };
                let wins = crate::comparison::compare(op, item, &current)?.as_bool()?;
                Some(if wins { item.clone() } else { current })
            }
        };
    }
    best.ok_or_else(|| {
        LangError::with_detail(ErrorCode::BadType, "extremum of an empty collection")
    })
}

#[runtime_builtin(name = "max")]
fn max_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    extremum(&args, true)
}

#[runtime_builtin(name = "min")]
fn min_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    extremum(&args, false)
}

/// Map construction from alternating key/value arguments; this is the
/// target of the `{key: value, …}` literal.
#[runtime_builtin(name = "map")]
fn map_builtin(args: Vec<Value>) -> Result<Value, LangError> {
    crate::binary::build_map(&args)
}

/// Root with an explicit index: root(3, x) is the cube root.
#[runtime_builtin(name = "root")]
fn root_builtin(n: Rational, x: Value) -> Result<Value, LangError> {
    let exponent = Value::Num(Rational::one().checked_div(&n)?);
    crate::binary::power(&x, &exponent)
}

/// Exact rational from a float-looking string; the numeric-tower
/// literal grammar (decimal, scientific, hex, percent, fraction).
#[runtime_builtin(name = "rational")]
fn rational_builtin(text: String) -> Result<Value, LangError> {
    use std::str::FromStr;
    Ok(Value::Num(Rational::from_str(&text)?))
}

#[runtime_builtin(name = "re")]
fn re_builtin(x: Value) -> Result<Value, LangError> {
    match x.payload() {
        Value::Complex(c) => Ok(Value::Num(c.re.clone())),
        Value::Num(r) => Ok(Value::Num(r.clone())),
        _ => Err(LangError::with_detail(ErrorCode::BadType, "re expects a number")),
    }
}

#[runtime_builtin(name = "im")]
fn im_builtin(x: Value) -> Result<Value, LangError> {
    match x.payload() {
        Value::Complex(c) => Ok(Value::Num(c.im.clone())),
        Value::Num(_) => Ok(Value::Num(Rational::zero())),
        _ => Err(LangError::with_detail(ErrorCode::BadType, "im expects a number")),
    }
}

#[runtime_builtin(name = "conj")]
fn conj_builtin(x: Value) -> Result<Value, LangError> {
    match x.payload() {
        Value::Complex(c) => Ok(Value::from(c.conj())),
        Value::Num(r) => Ok(Value::Num(r.clone())),
        _ => Err(LangError::with_detail(ErrorCode::BadType, "conj expects a number")),
    }
}

