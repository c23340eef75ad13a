use std::collections::HashMap;

use crate::convert::subscript_to_i64;
use crate::errors::*;
use crate::parse;
use crate::tree::*;
use crate::trig::AngleUnit;
use crate::value::*;

/// Name of the variable holding the result of the last successful evaluation
pub const LAST_RESULT: &str = "ans";

/// Functions known to every workspace. `logₙ` with any subscript base is
/// accepted as well
pub const STD_FUNCS: [&str; 41] = [
    "sin", "cos", "tan", "sin⁻¹", "cos⁻¹", "tan⁻¹", "asin", "acos", "atan", "sinh", "cosh", "tanh", "sinh⁻¹",
    "cosh⁻¹", "tanh⁻¹", "asinh", "acosh", "atanh", "ln", "log", "exp", "sqrt", "abs", "sgn", "arg", "conj", "re",
    "im", "int", "frac", "floor", "ceil", "round", "erf", "zeta", "ones", "twos", "not", "cbrt", "fact", "neg",
];

/// `logₙ` base, `None` for other names
fn log_base(name: &str) -> Option<i64> {
    name.strip_prefix("log").filter(|s| !s.is_empty()).and_then(subscript_to_i64)
}

fn angle_unit(name: &str) -> Option<AngleUnit> {
    match name.to_lowercase().as_str() {
        "radians" | "radian" | "rad" => Some(AngleUnit::Radians),
        "degrees" | "degree" | "deg" => Some(AngleUnit::Degrees),
        "gradians" | "gradian" | "grad" | "gon" => Some(AngleUnit::Gradians),
        _ => None,
    }
}

/// Applies a built-in function, `Ok(None)` if the name is not one
pub fn call_function(name: &str, x: &Value, options: &EvalOptions) -> MathResult<Option<Value>> {
    let unit = options.angle_units;
    let wordlen = options.wordlen;
    let name = name.to_lowercase();
    let v = match name.as_str() {
        "sin" => x.sin(unit),
        "cos" => x.cos(unit),
        "tan" => x.tan(unit)?,
        "sin⁻¹" | "asin" => x.asin(unit)?,
        "cos⁻¹" | "acos" => x.acos(unit)?,
        "tan⁻¹" | "atan" => x.atan(unit)?,
        "sinh" => x.sinh(),
        "cosh" => x.cosh(),
        "tanh" => x.tanh(),
        "sinh⁻¹" | "asinh" => x.asinh(),
        "cosh⁻¹" | "acosh" => x.acosh()?,
        "tanh⁻¹" | "atanh" => x.atanh()?,
        "ln" => x.ln()?,
        "log" => x.logarithm(&x.context().integer(10))?,
        "exp" => x.exp(),
        "sqrt" => x.sqrt()?,
        "cbrt" => x.root(3)?,
        "abs" => x.abs(),
        "sgn" => x.sgn(),
        "arg" => x.arg(unit)?,
        "conj" => x.conjugate(),
        "re" => x.real_component(),
        "im" => x.imaginary_component(),
        "int" => x.integer_component(),
        "frac" => x.fractional_component(),
        "floor" => x.floor(),
        "ceil" => x.ceiling(),
        "round" => x.round(),
        "erf" => x.erf()?,
        "zeta" => x.zeta()?,
        "fact" => x.factorial()?,
        "neg" => x.negate(),
        "ones" => x.ones_complement(wordlen)?,
        "twos" => x.twos_complement(wordlen)?,
        "not" => x.not(wordlen)?,
        _ => match log_base(&name) {
            Some(base) => x.logarithm(&x.context().integer(base))?,
            None => return Ok(None),
        },
    };
    Ok(Some(v))
}

/// Variables, constants and built-in functions for the evaluator. Keeps the
/// result of the last successful evaluation in `ans`
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    variables: HashMap<String, Value>,
    options: EvalOptions,
}

impl Workspace {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Workspace {
            variables: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: EvalOptions) {
        self.options = options;
    }

    /// Returns a constant value by its name. Name is caseinsensitive
    pub fn constant(&self, name: &str) -> Option<Value> {
        let ctx = self.options.context;
        match name.to_lowercase().as_str() {
            "e" => Some(ctx.eulers()),
            "pi" | "π" => Some(ctx.pi()),
            "i" => Some(ctx.i()),
            "phi" | "φ" => {
                let five = ctx.integer(5).sqrt().ok()?;
                five.addition(&ctx.integer(1)).divide(&ctx.integer(2)).ok()
            }
            _ => None,
        }
    }

    /// Returns a user variable by its name. Name is caseinsensitive
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(&name.to_lowercase()).cloned()
    }

    /// Creates a new variable or replaces the value of an existing one.
    /// The name is not validated
    pub fn add_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_lowercase(), value);
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Value> {
        self.variables.remove(&name.to_lowercase())
    }

    /// Returns the result of the last successful evaluation
    pub fn result(&self) -> Option<Value> {
        self.variable(LAST_RESULT)
    }

    /// Check if variable name is valid:
    /// - starts with a letter, then letters, digits, underscores or subscript digits
    /// - does not conflict with any constant, function or `ans`
    pub fn validate_name(&self, name: &str) -> Result<(), &'static str> {
        let name = name.to_lowercase();
        if !name.chars().next().is_some_and(char::is_alphabetic) {
            return Err("Variable name must start with a letter");
        }
        let valid = |c: char| c.is_alphabetic() || c.is_ascii_digit() || c == '_' || ('₀'..='₉').contains(&c);
        if !name.chars().all(valid) {
            return Err("Variable name must contain only letters, digits, and underscore");
        }
        if self.constant(&name).is_some() {
            return Err("Cannot assign a new value to a constant");
        }
        if name == LAST_RESULT {
            return Err("The name is reserved for an internal variable");
        }
        if STD_FUNCS.contains(&name.as_str()) || log_base(&name).is_some() {
            return Err("Function name cannot be used as a variable");
        }
        Ok(())
    }

    /// Evaluates an expression with the workspace options and stores a
    /// successful result in `ans`
    pub fn evaluate(&mut self, expr: &str) -> EvalResult {
        let options = self.options;
        let res = parse::evaluate(expr, &options, self);
        if let Ok(ref v) = res {
            self.add_variable(LAST_RESULT, v.clone());
        }
        res
    }
}

impl Resolver for Workspace {
    fn variable(&self, name: &str) -> Option<Value> {
        self.constant(name).or_else(|| Workspace::variable(self, name))
    }

    fn set_variable(&mut self, name: &str, value: &Value) -> Result<(), EvalError> {
        self.validate_name(name)
            .map_err(|msg| EvalError::new(ErrorKind::Syntax, Some(name), msg))?;
        self.add_variable(name, value.clone());
        Ok(())
    }

    fn function(&self, name: &str, argument: &Value, options: &EvalOptions) -> MathResult<Option<Value>> {
        call_function(name, argument, options)
    }

    /// angle units only: `90 degrees in radians`
    fn convert(&self, value: &Value, from: &str, to: &str) -> Option<Value> {
        let (from, to) = (angle_unit(from)?, angle_unit(to)?);
        Some(to.from_radians(&from.to_radians(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(v: &EvalResult, f: f64) -> bool {
        match v {
            Ok(v) => !v.is_complex() && (v.to_f64() - f).abs() < 1e-12,
            Err(..) => false,
        }
    }

    fn int(i: i64) -> Value {
        Context::default().integer(i)
    }

    #[test]
    fn test_expr() {
        let mut state = Workspace::new();
        assert_eq!(state.evaluate("2+3"), Ok(int(5)));
        assert_eq!(state.result(), Some(int(5)));
        assert_eq!(state.evaluate("(3+2)(4-9)"), Ok(int(-25)));
        assert_eq!(state.evaluate("ans × 2"), Ok(int(-50)));
        assert!(close(&state.evaluate("(3+9)sin(1)"), 12.0 * 1.0f64.sin()));
        assert!(close(&state.evaluate("2π"), 2.0 * std::f64::consts::PI));
        assert!(close(&state.evaluate("ln(e)"), 1.0));
        assert!(close(&state.evaluate("sin²(1) + cos²(1)"), 1.0));
        assert!(close(&state.evaluate("sin⁻¹(1)"), std::f64::consts::FRAC_PI_2));
        assert!(close(&state.evaluate("log₂(8)"), 3.0));
        assert!(close(&state.evaluate("log(1000)"), 3.0));
        assert!(close(&state.evaluate("phi"), 1.618_033_988_749_895));
        assert_eq!(state.evaluate("10+5!/10"), Ok(int(22)));
    }

    #[test]
    fn test_complex() {
        let mut state = Workspace::new();
        let v = state.evaluate("(3+4i)(3-4i)").unwrap();
        assert_eq!(v, int(25));
        let v = state.evaluate("sqrt(-4)").unwrap();
        assert!(v.is_complex());
        assert!(v.real().to_f64().abs() < 1e-12);
        assert!((v.imag().to_f64() - 2.0).abs() < 1e-12);
        assert_eq!(state.evaluate("im(2 + 3i)"), Ok(int(3)));
        assert_eq!(state.evaluate("abs(3 + 4i)"), Ok(int(5)));
        assert_eq!(state.evaluate("re(conj(2 + 3i))"), Ok(int(2)));
    }

    #[test]
    fn test_variables() {
        let mut state = Workspace::new();
        assert_eq!(state.evaluate("x = 2"), Ok(int(2)));
        assert_eq!(state.evaluate("y = 3"), Ok(int(3)));
        assert_eq!(state.evaluate("2x + y"), Ok(int(7)));
        assert_eq!(state.evaluate("xy"), Ok(int(6)));
        assert_eq!(state.evaluate("xy²"), Ok(int(18)));
        assert_eq!(state.evaluate("X"), Ok(int(2)));
        let e = state.evaluate("xz").unwrap_err();
        assert_eq!(e.kind, ErrorKind::UnknownVariable);
        assert_eq!(e.token.as_deref(), Some("xz"));
        // a failed evaluation keeps the previous result
        assert_eq!(state.result(), Some(int(2)));

        assert_eq!(state.evaluate("pi = 3").unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(state.evaluate("ans = 3").unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(state.evaluate("sin = 3").unwrap_err().kind, ErrorKind::Syntax);
        assert_eq!(state.remove_variable("x"), Some(int(2)));
        assert!(state.variable("x").is_none());
    }

    #[test]
    fn test_validate_name() {
        let state = Workspace::new();
        assert!(state.validate_name("rate_2").is_ok());
        assert!(state.validate_name("x₁").is_ok());
        assert!(state.validate_name("2x").is_err());
        assert!(state.validate_name("a-b").is_err());
        assert!(state.validate_name("E").is_err());
        assert!(state.validate_name("ans").is_err());
        assert!(state.validate_name("log₂").is_err());
        assert!(state.validate_name("tanh⁻¹").is_err());
    }

    #[test]
    fn test_angles() {
        let mut state = Workspace::with_options(EvalOptions::new().with_angle_units(AngleUnit::Degrees));
        assert!(close(&state.evaluate("sin(30)"), 0.5));
        assert!(close(&state.evaluate("atan(1)"), 45.0));
        assert_eq!(state.evaluate("tan(90)").unwrap_err().kind, ErrorKind::Domain);
        assert!(close(&state.evaluate("180 degrees in radians"), std::f64::consts::PI));
        assert!(close(&state.evaluate("200 grad to deg"), 180.0));
        assert_eq!(state.evaluate("1 m in ft").unwrap_err().kind, ErrorKind::UnknownConversion);
        state.set_options(EvalOptions::new());
        assert!(close(&state.evaluate("cos(π)"), -1.0));
        assert_eq!(state.options().angle_units, AngleUnit::Radians);
    }

    #[test]
    fn test_domain_errors() {
        let mut state = Workspace::new();
        for expr in ["asin(2)", "(-1)!", "ln(0)", "1/0", "0^-1", "zeta(1)", "acosh(0)", "5 mod 0"] {
            let e = state.evaluate(expr).unwrap_err();
            assert_eq!(e.kind, ErrorKind::Domain, "{}", expr);
        }
        let e = state.evaluate("ln(0)").unwrap_err();
        assert_eq!(e.token.as_deref(), Some("ln"));
        assert_eq!(e.message, MathError::LogarithmOfZero.to_string());
    }

    #[test]
    fn test_words() {
        let mut state = Workspace::with_options(EvalOptions::new().with_wordlen(8));
        assert_eq!(state.evaluate("not(5)"), Ok(int(250)));
        assert_eq!(state.evaluate("ones(5)"), Ok(int(250)));
        assert_eq!(state.evaluate("twos(5)"), Ok(int(251)));
        assert_eq!(state.evaluate("not 256").unwrap_err().kind, ErrorKind::Overflow);
        assert_eq!(state.evaluate("ones(300)").unwrap_err().kind, ErrorKind::Overflow);
        assert_eq!(state.evaluate("twos(300)").unwrap_err().kind, ErrorKind::Overflow);
    }
}
