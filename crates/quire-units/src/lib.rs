//! Unit resolution: name → `UnitDescriptor`.
//!
//! Lookup order: exact table hit, then an SI prefix split (word form
//! first, then symbol form), then the compound-expression compiler.
//! Currencies resolve through the host-supplied exchange-rate
//! override when one has been set, falling back to the static table;
//! a money unit with no defined rate is a hard failure.

mod compound;
pub mod tables;

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use num_bigint::BigInt;
use num_traits::Pow;
use once_cell::sync::Lazy;

use quire_builtins::{Dimensions, ErrorCode, LangError, Rational, UnitDescriptor};

use tables::{UnitRow, SYMBOL_PREFIXES, UNITS, WORD_PREFIXES};

static UNIT_INDEX: Lazy<HashMap<&'static str, &'static UnitRow>> = Lazy::new(|| {
    let mut index = HashMap::with_capacity(UNITS.len());
    for row in UNITS {
        index.insert(row.0, row);
    }
    index
});

static EXCHANGE_RATES: OnceLock<Mutex<HashMap<String, Rational>>> = OnceLock::new();

fn exchange_rates() -> &'static Mutex<HashMap<String, Rational>> {
    EXCHANGE_RATES.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Install host-fetched exchange rates. The payload is a JSON object
/// mapping currency codes to the number of currency units per one
/// base-currency unit, e.g. `{"EUR": 0.92, "JPY": 148.3}`.
pub fn set_exchange_rates(json: &str) -> Result<(), LangError> {
    let parsed: HashMap<String, f64> = serde_json::from_str(json)
        .map_err(|e| LangError::with_detail(ErrorCode::BadLiteral, e.to_string()))?;
    let mut rates = exchange_rates().lock().unwrap();
    for (code, rate) in parsed {
        rates.insert(code, Rational::from_f64(rate)?);
    }
    log::info!("exchange-rate override now covers {} currencies", rates.len());
    Ok(())
}

/// Drop all host-supplied rates (used between calculations in tests).
pub fn clear_exchange_rates() {
    exchange_rates().lock().unwrap().clear();
}

fn override_rate(code: &str) -> Option<Rational> {
    exchange_rates().lock().unwrap().get(code).cloned()
}

fn pow10(power: i32) -> Rational {
    let scale = BigInt::from(10).pow(power.unsigned_abs());
    if power >= 0 {
        Rational::from_integer(scale)
    } else {
        // Denominator is a positive power of ten; the constructor
        // cannot fail.
        Rational::new(BigInt::from(1), scale).unwrap_or_else(|_| Rational::one())
    }
}

fn descriptor_from_row(row: &UnitRow) -> Result<UnitDescriptor, LangError> {
    let (name, num, den, gauge, kind, exps) = row;
    let mut factor =
        Rational::from_str(num)?.checked_div(&Rational::from_str(den)?)?;
    // Currency rows route through the live override map.
    if kind.len() == 3 && kind.chars().all(|c| c.is_ascii_uppercase()) {
        match override_rate(kind) {
            Some(rate) if !rate.is_zero() => {
                factor = rate.recip()?;
            }
            Some(_) => return Err(LangError::with_detail(ErrorCode::CurrencyUndefined, *kind)),
            None => {
                if factor.is_zero() {
                    return Err(LangError::with_detail(ErrorCode::CurrencyUndefined, *kind));
                }
                log::debug!("currency {kind} resolved from the static fallback table");
            }
        }
    }
    Ok(UnitDescriptor {
        name: (*name).to_string(),
        factor,
        gauge: Rational::from_str(gauge)?,
        dims: Dimensions(*exps),
    })
}

/// Resolve one unit name, including SI-prefixed forms.
/// `Ok(None)` means the name is simply unknown; errors are hard
/// failures (an undefined currency).
pub fn lookup_single(name: &str) -> Result<Option<UnitDescriptor>, LangError> {
    if let Some(row) = UNIT_INDEX.get(name) {
        return descriptor_from_row(row).map(Some);
    }
    // Word prefixes apply to siWord units, tried before the
    // single-character symbol forms.
    for (prefix, power) in WORD_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            if let Some(row) = UNIT_INDEX.get(rest) {
                if row.4 == "siWord" {
                    let mut unit = descriptor_from_row(row)?;
                    unit.name = name.to_string();
                    unit.factor = &unit.factor * &pow10(*power);
                    return Ok(Some(unit));
                }
            }
        }
    }
    for (prefix, power) in SYMBOL_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            if let Some(row) = UNIT_INDEX.get(rest) {
                if row.4 == "siSymbol" {
                    let mut unit = descriptor_from_row(row)?;
                    unit.name = name.to_string();
                    unit.factor = &unit.factor * &pow10(*power);
                    return Ok(Some(unit));
                }
            }
        }
    }
    Ok(None)
}

/// Resolve a unit name or compound unit expression to a descriptor.
pub fn resolve(expr: &str) -> Result<UnitDescriptor, LangError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Ok(UnitDescriptor::unitless());
    }
    if !expr.contains([' ', '/', '^', '*', '\u{00b7}'])
        && !expr.chars().any(is_superscript)
    {
        return match lookup_single(expr)? {
            Some(unit) => Ok(unit),
            None => Err(LangError::with_detail(ErrorCode::BadUnitName, expr)),
        };
    }
    compound::compile(expr)
}

fn is_superscript(c: char) -> bool {
    matches!(
        c,
        '\u{2070}'
            | '\u{00b9}'
            | '\u{00b2}'
            | '\u{00b3}'
            | '\u{2074}'..='\u{2079}'
            | '\u{207b}'
    )
}

/// Dimensional compatibility: element-wise equal exponent vectors.
pub fn compatible(a: &UnitDescriptor, b: &UnitDescriptor) -> bool {
    a.dims.compatible(&b.dims)
}
