use std::fmt;

/// Short, stable identifiers for every failure the engine can produce.
/// The user-visible message is built from the template table below;
/// hosts key their own localization off `as_str()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadIndex,
    BadLiteral,
    BadProgram,
    BadRoot,
    BadType,
    BadUnitName,
    CurrencyUndefined,
    DivideByZero,
    MismatchedElementCount,
    NoOperator,
    NotIterable,
    Raised,
    RecursionDepth,
    StackUnderflow,
    UndefinedVariable,
    UnitAdd,
    UnitAppend,
    UnitCompare,
    UnitPower,
    UnitResult,
    UnknownFunction,
    WrongArity,
    ZeroStep,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadIndex => "BAD_INDEX",
            ErrorCode::BadLiteral => "BAD_LITERAL",
            ErrorCode::BadProgram => "BAD_PROGRAM",
            ErrorCode::BadRoot => "BAD_ROOT",
            ErrorCode::BadType => "BAD_TYPE",
            ErrorCode::BadUnitName => "BAD_UNIT_NAME",
            ErrorCode::CurrencyUndefined => "CURRENCY_UNDEFINED",
            ErrorCode::DivideByZero => "DIV_ZERO",
            ErrorCode::MismatchedElementCount => "MISMATCHED_COUNT",
            ErrorCode::NoOperator => "NO_OPERATOR",
            ErrorCode::NotIterable => "NOT_ITERABLE",
            ErrorCode::Raised => "RAISED",
            ErrorCode::RecursionDepth => "RECURSION_DEPTH",
            ErrorCode::StackUnderflow => "STACK_UNDERFLOW",
            ErrorCode::UndefinedVariable => "UNDEFINED_VAR",
            ErrorCode::UnitAdd => "UNIT_ADD",
            ErrorCode::UnitAppend => "UNIT_APPEND",
            ErrorCode::UnitCompare => "UNIT_COMPARE",
            ErrorCode::UnitPower => "UNIT_POWER",
            ErrorCode::UnitResult => "UNIT_RESULT",
            ErrorCode::UnknownFunction => "UNKNOWN_FUNCTION",
            ErrorCode::WrongArity => "WRONG_ARITY",
            ErrorCode::ZeroStep => "ZERO_STEP",
        }
    }

    /// Message template. A `{}` marks where the optional detail is
    /// inserted; templates without a `{}` ignore the detail.
    fn template(&self) -> &'static str {
        match self {
            ErrorCode::BadIndex => "Index out of bounds: {}",
            ErrorCode::BadLiteral => "Unable to parse the literal \u{201c}{}\u{201d}",
            ErrorCode::BadProgram => "Malformed calculation program near \u{201c}{}\u{201d}",
            ErrorCode::BadRoot => "Non-real root of a negative number: {}",
            ErrorCode::BadType => "Wrong type of argument: {}",
            ErrorCode::BadUnitName => "Unrecognized unit name \u{201c}{}\u{201d}",
            ErrorCode::CurrencyUndefined => "No exchange rate is defined for currency \u{201c}{}\u{201d}",
            ErrorCode::DivideByZero => "Division by zero",
            ErrorCode::MismatchedElementCount => "Mismatched element counts: {}",
            ErrorCode::NoOperator => "No operator implementation for these operand shapes: {}",
            ErrorCode::NotIterable => "Cannot iterate over a value of this type: {}",
            ErrorCode::Raised => "{}",
            ErrorCode::RecursionDepth => "Recursion depth limit exceeded in function {}",
            ErrorCode::StackUnderflow => "Calculation stack underflow near \u{201c}{}\u{201d}",
            ErrorCode::UndefinedVariable => "Variable \u{201c}{}\u{201d} is not defined",
            ErrorCode::UnitAdd => "Adding or subtracting quantities with incompatible units",
            ErrorCode::UnitAppend => "Appending quantities with incompatible units",
            ErrorCode::UnitCompare => "Comparing quantities with incompatible units",
            ErrorCode::UnitPower => "Exponent of a quantity must be a unit-less integer",
            ErrorCode::UnitResult => "The result units are not compatible with \u{201c}{}\u{201d}",
            ErrorCode::UnknownFunction => "Unknown function \u{201c}{}\u{201d}",
            ErrorCode::WrongArity => "Wrong number of arguments to {}",
            ErrorCode::ZeroStep => "A range step of zero never terminates",
        }
    }
}

/// A failure value. Everything fallible in the engine returns
/// `Result<_, LangError>` and stops at the first error; the embedding
/// boundary renders the templated message in place of a result.
#[derive(Debug, Clone, PartialEq)]
pub struct LangError {
    pub code: ErrorCode,
    pub detail: Option<String>,
}

impl LangError {
    pub fn new(code: ErrorCode) -> Self {
        LangError { code, detail: None }
    }

    pub fn with_detail(code: ErrorCode, detail: impl Into<String>) -> Self {
        LangError {
            code,
            detail: Some(detail.into()),
        }
    }

    pub fn message(&self) -> String {
        let template = self.code.template();
        match (&self.detail, template.find("{}")) {
            (Some(detail), Some(pos)) => {
                let mut msg = String::with_capacity(template.len() + detail.len());
                msg.push_str(&template[..pos]);
                msg.push_str(detail);
                msg.push_str(&template[pos + 2..]);
                msg
            }
            (None, Some(pos)) => {
                // No detail supplied; drop the placeholder.
                let mut msg = String::from(&template[..pos]);
                msg.push_str(&template[pos + 2..]);
                msg.trim_end().to_string()
            }
            _ => template.to_string(),
        }
    }
}

impl fmt::Display for LangError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for LangError {}

impl From<LangError> for String {
    fn from(e: LangError) -> Self {
        e.message()
    }
}
