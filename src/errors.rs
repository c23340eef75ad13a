use std::fmt;
use thiserror::Error;

/// Failure raised by the numeric library. Every variant carries the message shown to the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Division by zero is undefined")]
    DivisionByZero,
    #[error("Argument not defined for zero")]
    ArgumentOfZero,
    #[error("Logarithm of zero is undefined")]
    LogarithmOfZero,
    #[error("The zeroth root of a number is undefined")]
    ZerothRoot,
    #[error("The power of zero is undefined for a negative exponent")]
    NegativePowerOfZero,
    #[error("Factorial is only defined for non-negative real numbers")]
    FactorialDomain,
    #[error("Modulus division is only defined for integers")]
    ModulusNonInteger,
    #[error("No modular inverse exists for the base")]
    NotInvertible,
    #[error("The error function is only defined for real numbers")]
    ErfDomain,
    #[error("The Riemann zeta function is only defined for real numbers ≠1")]
    ZetaDomain,
    #[error("Tangent is undefined for angles that are multiples of π (180°) from π∕2 (90°)")]
    UndefinedTangent,
    #[error("Inverse sine is undefined for values outside [-1, 1]")]
    InverseSineDomain,
    #[error("Inverse cosine is undefined for values outside [-1, 1]")]
    InverseCosineDomain,
    #[error("Arctangent function is undefined for values i and -i")]
    InverseTangentDomain,
    #[error("Inverse hyperbolic cosine is undefined for values less than one")]
    InverseHyperbolicCosineDomain,
    #[error("Inverse hyperbolic tangent is undefined for values outside (-1, 1)")]
    InverseHyperbolicTangentDomain,
    #[error("Boolean {0} is only defined for positive integers")]
    BooleanDomain(&'static str),
    #[error("Shift is only possible on integer values")]
    ShiftNonInteger,
    #[error("Factorization is only possible on integers")]
    FactorizeNonInteger,
    #[error("Overflow: the result does not fit in {0} bits")]
    Overflow(u32),
    #[error("Failed to parse '{0}' as a number")]
    Parse(String),
    #[error("Number of periods must be positive")]
    InvalidPeriod,
}

/// Coarse classification of a failure, the code a caller switches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// operation is undefined for the given input
    Domain,
    /// malformed numeric literal
    Parse,
    /// the expression text does not follow the grammar
    Syntax,
    UnknownVariable,
    UnknownFunction,
    UnknownConversion,
    /// bitwise operand does not fit the configured word length
    Overflow,
    /// non-positive period count in a financial formula
    InvalidPeriod,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ErrorKind::Domain => "domain error",
            ErrorKind::Parse => "parse error",
            ErrorKind::Syntax => "syntax error",
            ErrorKind::UnknownVariable => "unknown variable",
            ErrorKind::UnknownFunction => "unknown function",
            ErrorKind::UnknownConversion => "unknown conversion",
            ErrorKind::Overflow => "overflow",
            ErrorKind::InvalidPeriod => "invalid period",
        };
        write!(f, "{}", s)
    }
}

impl MathError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MathError::Parse(..) => ErrorKind::Parse,
            MathError::Overflow(..) => ErrorKind::Overflow,
            MathError::InvalidPeriod => ErrorKind::InvalidPeriod,
            _ => ErrorKind::Domain,
        }
    }
}

/// Error returned by the expression evaluator: the error code, the token that
/// caused it (if any) and a human readable message
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct EvalError {
    pub kind: ErrorKind,
    pub token: Option<String>,
    pub message: String,
}

impl EvalError {
    pub fn new(kind: ErrorKind, token: Option<&str>, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            token: token.map(|t| t.to_string()),
            message: message.into(),
        }
    }

    pub fn unknown_variable(name: &str) -> Self {
        EvalError::new(ErrorKind::UnknownVariable, Some(name), format!("Unknown variable '{}'", name))
    }

    pub fn unknown_function(name: &str) -> Self {
        EvalError::new(ErrorKind::UnknownFunction, Some(name), format!("Function '{}' is not defined", name))
    }

    pub fn unknown_conversion(from: &str, to: &str) -> Self {
        EvalError::new(
            ErrorKind::UnknownConversion,
            Some(from),
            format!("Unknown conversion from '{}' to '{}'", from, to),
        )
    }

    pub fn syntax(text: &str) -> Self {
        EvalError::new(ErrorKind::Syntax, None, format!("Failed to parse expression: {}", text))
    }

    /// attaches the offending token unless one is already recorded
    pub fn with_token(mut self, token: &str) -> Self {
        if self.token.is_none() {
            self.token = Some(token.to_string());
        }
        self
    }
}

impl From<MathError> for EvalError {
    fn from(e: MathError) -> Self {
        EvalError {
            kind: e.kind(),
            token: None,
            message: e.to_string(),
        }
    }
}

/// Per-call record of non-fatal notices. Operations that report a problem
/// but still produce a value (declining balance with a bad period count)
/// write here instead of failing
#[derive(Debug, Default, Clone)]
pub struct StatusChannel {
    last: Option<MathError>,
}

impl StatusChannel {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn record(&mut self, err: MathError) {
        tracing::warn!(error = %err, "status recorded");
        self.last = Some(err);
    }

    pub fn last(&self) -> Option<&MathError> {
        self.last.as_ref()
    }

    pub fn take(&mut self) -> Option<MathError> {
        self.last.take()
    }

    pub fn clear(&mut self) {
        self.last = None;
    }

    pub fn is_ok(&self) -> bool {
        self.last.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(MathError::DivisionByZero.kind(), ErrorKind::Domain);
        assert_eq!(MathError::Parse("x".to_string()).kind(), ErrorKind::Parse);
        assert_eq!(MathError::Overflow(8).kind(), ErrorKind::Overflow);
        assert_eq!(MathError::InvalidPeriod.kind(), ErrorKind::InvalidPeriod);
    }

    #[test]
    fn test_messages() {
        assert_eq!(MathError::BooleanDomain("AND").to_string(), "Boolean AND is only defined for positive integers");
        let e: EvalError = MathError::DivisionByZero.into();
        assert_eq!(e.kind, ErrorKind::Domain);
        assert_eq!(e.message, "Division by zero is undefined");
        let e = e.with_token("/").with_token("x");
        assert_eq!(e.token.as_deref(), Some("/"));
    }

    #[test]
    fn test_status() {
        let mut st = StatusChannel::new();
        assert!(st.is_ok());
        st.record(MathError::InvalidPeriod);
        assert_eq!(st.last(), Some(&MathError::InvalidPeriod));
        assert_eq!(st.take(), Some(MathError::InvalidPeriod));
        assert!(st.is_ok());
    }
}
