//! Static unit data.
//!
//! Each entry is (name, factor-numerator, factor-denominator, gauge,
//! kind, exponents). Factor strings are decimal strings combined as
//! numerator/denominator at resolution time; exponents follow the
//! base-dimension order [length, mass, time, current, temperature,
//! amount, luminous intensity, money]. `kind` is `siSymbol` or
//! `siWord` for prefixable entries, a 3-letter ISO code for
//! currencies, or empty.

pub type UnitRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    [i8; 8],
);

const L: [i8; 8] = [1, 0, 0, 0, 0, 0, 0, 0];
const M: [i8; 8] = [0, 1, 0, 0, 0, 0, 0, 0];
const T: [i8; 8] = [0, 0, 1, 0, 0, 0, 0, 0];
const I: [i8; 8] = [0, 0, 0, 1, 0, 0, 0, 0];
const TH: [i8; 8] = [0, 0, 0, 0, 1, 0, 0, 0];
const N_SUB: [i8; 8] = [0, 0, 0, 0, 0, 1, 0, 0];
const J_LUM: [i8; 8] = [0, 0, 0, 0, 0, 0, 1, 0];
const CCY: [i8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];
const NONE: [i8; 8] = [0; 8];

const AREA: [i8; 8] = [2, 0, 0, 0, 0, 0, 0, 0];
const VOLUME: [i8; 8] = [3, 0, 0, 0, 0, 0, 0, 0];
const SPEED: [i8; 8] = [1, 0, -1, 0, 0, 0, 0, 0];
const ACCEL: [i8; 8] = [1, 0, -2, 0, 0, 0, 0, 0];
const FORCE: [i8; 8] = [1, 1, -2, 0, 0, 0, 0, 0];
const PRESSURE: [i8; 8] = [-1, 1, -2, 0, 0, 0, 0, 0];
const ENERGY: [i8; 8] = [2, 1, -2, 0, 0, 0, 0, 0];
const POWER: [i8; 8] = [2, 1, -3, 0, 0, 0, 0, 0];
const CHARGE: [i8; 8] = [0, 0, 1, 1, 0, 0, 0, 0];
const VOLTAGE: [i8; 8] = [2, 1, -3, -1, 0, 0, 0, 0];
const RESISTANCE: [i8; 8] = [2, 1, -3, -2, 0, 0, 0, 0];
const CONDUCTANCE: [i8; 8] = [-2, -1, 3, 2, 0, 0, 0, 0];
const CAPACITANCE: [i8; 8] = [-2, -1, 4, 2, 0, 0, 0, 0];
const INDUCTANCE: [i8; 8] = [2, 1, -2, -2, 0, 0, 0, 0];
const MAG_FLUX: [i8; 8] = [2, 1, -2, -1, 0, 0, 0, 0];
const MAG_DENSITY: [i8; 8] = [0, 1, -2, -1, 0, 0, 0, 0];
const FREQUENCY: [i8; 8] = [0, 0, -1, 0, 0, 0, 0, 0];
const ILLUMINANCE: [i8; 8] = [-2, 0, 0, 0, 0, 0, 1, 0];

pub const UNITS: &[UnitRow] = &[
    // Length
    ("m", "1", "1", "0", "siSymbol", L),
    ("meter", "1", "1", "0", "siWord", L),
    ("metre", "1", "1", "0", "siWord", L),
    ("ft", "0.3048", "1", "0", "", L),
    ("foot", "0.3048", "1", "0", "", L),
    ("feet", "0.3048", "1", "0", "", L),
    ("in", "0.0254", "1", "0", "", L),
    ("inch", "0.0254", "1", "0", "", L),
    ("yd", "0.9144", "1", "0", "", L),
    ("yard", "0.9144", "1", "0", "", L),
    ("mi", "1609.344", "1", "0", "", L),
    ("mile", "1609.344", "1", "0", "", L),
    ("nmi", "1852", "1", "0", "", L),
    ("mil", "0.0000254", "1", "0", "", L),
    ("furlong", "201.168", "1", "0", "", L),
    ("fathom", "1.8288", "1", "0", "", L),
    ("hand", "0.1016", "1", "0", "", L),
    ("\u{00c5}", "0.0000000001", "1", "0", "", L),
    ("angstrom", "0.0000000001", "1", "0", "", L),
    ("AU", "149597870700", "1", "0", "", L),
    ("ly", "9460730472580800", "1", "0", "", L),
    ("pc", "30856775814913673", "1", "0", "", L),
    // Mass (base: kilogram; the gram carries the 1/1000)
    ("kg", "1", "1", "0", "", M),
    ("g", "1", "1000", "0", "siSymbol", M),
    ("gram", "1", "1000", "0", "siWord", M),
    ("lb", "0.45359237", "1", "0", "", M),
    ("lbm", "0.45359237", "1", "0", "", M),
    ("pound", "0.45359237", "1", "0", "", M),
    ("oz", "0.028349523125", "1", "0", "", M),
    ("slug", "14.59390294", "1", "0", "", M),
    ("ton", "907.18474", "1", "0", "", M),
    ("tonne", "1000", "1", "0", "", M),
    ("t", "1000", "1", "0", "", M),
    ("stone", "6.35029318", "1", "0", "", M),
    ("grain", "0.00006479891", "1", "0", "", M),
    ("carat", "0.0002", "1", "0", "", M),
    // Time
    ("s", "1", "1", "0", "siSymbol", T),
    ("sec", "1", "1", "0", "", T),
    ("second", "1", "1", "0", "siWord", T),
    ("min", "60", "1", "0", "", T),
    ("minute", "60", "1", "0", "", T),
    ("h", "3600", "1", "0", "", T),
    ("hr", "3600", "1", "0", "", T),
    ("hour", "3600", "1", "0", "", T),
    ("day", "86400", "1", "0", "", T),
    ("d", "86400", "1", "0", "", T),
    ("week", "604800", "1", "0", "", T),
    ("fortnight", "1209600", "1", "0", "", T),
    ("yr", "31556952", "1", "0", "", T),
    ("year", "31556952", "1", "0", "", T),
    // Electric current
    ("A", "1", "1", "0", "siSymbol", I),
    ("amp", "1", "1", "0", "", I),
    ("ampere", "1", "1", "0", "siWord", I),
    // Temperature
    ("K", "1", "1", "0", "siSymbol", TH),
    ("kelvin", "1", "1", "0", "siWord", TH),
    ("\u{00b0}C", "1", "1", "273.15", "", TH),
    ("celsius", "1", "1", "273.15", "", TH),
    ("\u{00b0}F", "5", "9", "459.67", "", TH),
    ("fahrenheit", "5", "9", "459.67", "", TH),
    ("\u{00b0}R", "5", "9", "0", "", TH),
    ("rankine", "5", "9", "0", "", TH),
    // Amount of substance
    ("mol", "1", "1", "0", "siSymbol", N_SUB),
    ("mole", "1", "1", "0", "siWord", N_SUB),
    // Luminous intensity
    ("cd", "1", "1", "0", "siSymbol", J_LUM),
    ("candela", "1", "1", "0", "siWord", J_LUM),
    ("lm", "1", "1", "0", "siSymbol", J_LUM),
    ("lumen", "1", "1", "0", "siWord", J_LUM),
    ("lx", "1", "1", "0", "siSymbol", ILLUMINANCE),
    ("lux", "1", "1", "0", "siWord", ILLUMINANCE),
    // Angle and other dimensionless measures
    ("rad", "1", "1", "0", "", NONE),
    ("sr", "1", "1", "0", "", NONE),
    ("\u{00b0}", "0.017453292519943295", "1", "0", "", NONE),
    ("deg", "0.017453292519943295", "1", "0", "", NONE),
    ("grad", "0.015707963267948966", "1", "0", "", NONE),
    ("rev", "6.283185307179586", "1", "0", "", NONE),
    ("ppm", "0.000001", "1", "0", "", NONE),
    ("ppb", "0.000000001", "1", "0", "", NONE),
    // Area
    ("ha", "10000", "1", "0", "", AREA),
    ("hectare", "10000", "1", "0", "", AREA),
    ("acre", "4046.8564224", "1", "0", "", AREA),
    ("barn", "0.0000000000000000000000000001", "1", "0", "", AREA),
    // Volume
    ("L", "0.001", "1", "0", "siSymbol", VOLUME),
    ("liter", "0.001", "1", "0", "siWord", VOLUME),
    ("litre", "0.001", "1", "0", "siWord", VOLUME),
    ("gal", "0.003785411784", "1", "0", "", VOLUME),
    ("gallon", "0.003785411784", "1", "0", "", VOLUME),
    ("qt", "0.000946352946", "1", "0", "", VOLUME),
    ("quart", "0.000946352946", "1", "0", "", VOLUME),
    ("pint", "0.000473176473", "1", "0", "", VOLUME),
    ("cup", "0.0002365882365", "1", "0", "", VOLUME),
    ("floz", "0.0000295735295625", "1", "0", "", VOLUME),
    ("bbl", "0.158987294928", "1", "0", "", VOLUME),
    ("barrel", "0.158987294928", "1", "0", "", VOLUME),
    // Speed and acceleration
    ("mph", "0.44704", "1", "0", "", SPEED),
    ("kn", "1852", "3600", "0", "", SPEED),
    ("knot", "1852", "3600", "0", "", SPEED),
    ("gee", "9.80665", "1", "0", "", ACCEL),
    // Force
    ("N", "1", "1", "0", "siSymbol", FORCE),
    ("newton", "1", "1", "0", "siWord", FORCE),
    ("lbf", "4.4482216152605", "1", "0", "", FORCE),
    ("kip", "4448.2216152605", "1", "0", "", FORCE),
    ("dyn", "0.00001", "1", "0", "", FORCE),
    ("kgf", "9.80665", "1", "0", "", FORCE),
    // Pressure
    ("Pa", "1", "1", "0", "siSymbol", PRESSURE),
    ("pascal", "1", "1", "0", "siWord", PRESSURE),
    ("bar", "100000", "1", "0", "siSymbol", PRESSURE),
    ("atm", "101325", "1", "0", "", PRESSURE),
    ("psi", "6894.757293168361", "1", "0", "", PRESSURE),
    ("psf", "47.880259889635", "1", "0", "", PRESSURE),
    ("torr", "101325", "760", "0", "", PRESSURE),
    ("mmHg", "133.322387415", "1", "0", "", PRESSURE),
    ("inHg", "3386.388640341", "1", "0", "", PRESSURE),
    // Energy
    ("J", "1", "1", "0", "siSymbol", ENERGY),
    ("joule", "1", "1", "0", "siWord", ENERGY),
    ("cal", "4.184", "1", "0", "siSymbol", ENERGY),
    ("calorie", "4.184", "1", "0", "siWord", ENERGY),
    ("BTU", "1055.05585262", "1", "0", "", ENERGY),
    ("Wh", "3600", "1", "0", "siSymbol", ENERGY),
    ("eV", "0.0000000000000000001602176634", "1", "0", "siSymbol", ENERGY),
    ("erg", "0.0000001", "1", "0", "", ENERGY),
    // Power
    ("W", "1", "1", "0", "siSymbol", POWER),
    ("watt", "1", "1", "0", "siWord", POWER),
    ("hp", "745.69987158227022", "1", "0", "", POWER),
    // Electrical
    ("C", "1", "1", "0", "siSymbol", CHARGE),
    ("coulomb", "1", "1", "0", "siWord", CHARGE),
    ("Ah", "3600", "1", "0", "siSymbol", CHARGE),
    ("V", "1", "1", "0", "siSymbol", VOLTAGE),
    ("volt", "1", "1", "0", "siWord", VOLTAGE),
    ("\u{03a9}", "1", "1", "0", "siSymbol", RESISTANCE),
    ("ohm", "1", "1", "0", "siWord", RESISTANCE),
    ("S", "1", "1", "0", "siSymbol", CONDUCTANCE),
    ("siemens", "1", "1", "0", "siWord", CONDUCTANCE),
    ("F", "1", "1", "0", "siSymbol", CAPACITANCE),
    ("farad", "1", "1", "0", "siWord", CAPACITANCE),
    ("H", "1", "1", "0", "siSymbol", INDUCTANCE),
    ("henry", "1", "1", "0", "siWord", INDUCTANCE),
    ("Wb", "1", "1", "0", "siSymbol", MAG_FLUX),
    ("weber", "1", "1", "0", "siWord", MAG_FLUX),
    ("T", "1", "1", "0", "siSymbol", MAG_DENSITY),
    ("tesla", "1", "1", "0", "siWord", MAG_DENSITY),
    ("Hz", "1", "1", "0", "siSymbol", FREQUENCY),
    ("hertz", "1", "1", "0", "siWord", FREQUENCY),
    // Currency. The static factors are fallbacks; a live exchange-rate
    // override, when the host supplies one, takes precedence.
    ("USD", "1", "1", "0", "USD", CCY),
    ("$", "1", "1", "0", "USD", CCY),
    ("EUR", "1.08", "1", "0", "EUR", CCY),
    ("\u{20ac}", "1.08", "1", "0", "EUR", CCY),
    ("GBP", "1.27", "1", "0", "GBP", CCY),
    ("\u{00a3}", "1.27", "1", "0", "GBP", CCY),
    ("JPY", "0.0067", "1", "0", "JPY", CCY),
    ("\u{00a5}", "0.0067", "1", "0", "JPY", CCY),
    ("CAD", "0.73", "1", "0", "CAD", CCY),
    ("AUD", "0.66", "1", "0", "AUD", CCY),
    ("CHF", "1.13", "1", "0", "CHF", CCY),
    ("CNY", "0.14", "1", "0", "CNY", CCY),
    ("INR", "0.012", "1", "0", "INR", CCY),
    ("MXN", "0.053", "1", "0", "MXN", CCY),
    // Listed but with no static rate: usable only when the host
    // supplies a live exchange rate.
    ("KRW", "0", "1", "0", "KRW", CCY),
    ("BRL", "0", "1", "0", "BRL", CCY),
];

pub type PrefixRow = (&'static str, i32);

/// SI prefixes in word form, applied to `siWord` units.
/// The number is the power of ten.
pub const WORD_PREFIXES: &[PrefixRow] = &[
    ("yotta", 24),
    ("zetta", 21),
    ("exa", 18),
    ("peta", 15),
    ("tera", 12),
    ("giga", 9),
    ("mega", 6),
    ("kilo", 3),
    ("hecto", 2),
    ("deka", 1),
    ("deca", 1),
    ("deci", -1),
    ("centi", -2),
    ("milli", -3),
    ("micro", -6),
    ("nano", -9),
    ("pico", -12),
    ("femto", -15),
    ("atto", -18),
    ("zepto", -21),
    ("yocto", -24),
];

/// SI prefixes in symbol form, applied to `siSymbol` units.
/// Longer symbols first so that "da" wins over "d".
pub const SYMBOL_PREFIXES: &[PrefixRow] = &[
    ("da", 1),
    ("\u{00b5}", -6),
    ("\u{03bc}", -6),
    ("Y", 24),
    ("Z", 21),
    ("E", 18),
    ("P", 15),
    ("T", 12),
    ("G", 9),
    ("M", 6),
    ("k", 3),
    ("h", 2),
    ("d", -1),
    ("c", -2),
    ("m", -3),
    ("u", -6),
    ("n", -9),
    ("p", -12),
    ("f", -15),
    ("a", -18),
    ("z", -21),
    ("y", -24),
];
