use rug::float::Constant;
use rug::ops::Pow;
use rug::{Complex, Float, Integer, Rational};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::errors::*;

/// Working precision in bits used when nothing else is configured
pub const DEFAULT_PRECISION: u32 = 1000;

/// Result of a numeric operation: either a value or the reason it is undefined
pub type MathResult<T = Value> = Result<T, MathError>;

/// Numeric context: holds the working precision and creates values with it.
/// Values created by different contexts may be mixed: an operation uses the
/// precision of its left operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Context {
    precision: u32,
}

impl Default for Context {
    fn default() -> Context {
        Context {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl Context {
    /// Creates a context with the given precision in bits. The precision is
    /// clamped to the range supported by MPFR
    pub fn new(precision: u32) -> Self {
        let precision = precision.clamp(rug::float::prec_min(), rug::float::prec_max());
        Context { precision }
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    pub fn zero(&self) -> Value {
        Value(Complex::new(self.precision))
    }

    pub fn integer(&self, i: i64) -> Value {
        Value(Complex::with_val(self.precision, i))
    }

    pub fn unsigned(&self, u: u64) -> Value {
        Value(Complex::with_val(self.precision, u))
    }

    pub fn from_integer(&self, i: &Integer) -> Value {
        Value(Complex::with_val(self.precision, i))
    }

    pub fn from_rational(&self, r: &Rational) -> Value {
        Value(Complex::with_val(self.precision, r))
    }

    /// Creates `numerator/denominator`
    pub fn fraction(&self, numerator: i64, denominator: i64) -> MathResult {
        if denominator == 0 {
            return Err(MathError::DivisionByZero);
        }
        Ok(self.from_rational(&Rational::from((numerator, denominator))))
    }

    pub fn float(&self, f: f64) -> Value {
        Value(Complex::with_val(self.precision, f))
    }

    pub fn complex(&self, re: f64, im: f64) -> Value {
        Value(Complex::with_val(self.precision, (re, im)))
    }

    pub fn from_parts(&self, re: &Float, im: &Float) -> Value {
        Value(Complex::with_val(self.precision, (re, im)))
    }

    pub fn pi(&self) -> Value {
        let pi = Float::with_val(self.precision, Constant::Pi);
        Value(Complex::with_val(self.precision, pi))
    }

    /// Euler's number `e`
    pub fn eulers(&self) -> Value {
        let e = Float::with_val(self.precision, 1).exp();
        Value(Complex::with_val(self.precision, e))
    }

    /// The imaginary unit
    pub fn i(&self) -> Value {
        Value(Complex::with_val(self.precision, (0, 1)))
    }

    /// Parses a number written in `base` (a subscript suffix overrides it)
    pub fn parse(&self, text: &str, base: u32) -> MathResult {
        crate::convert::parse(text, base, self)
    }
}

/// Arbitrary precision complex number. A value with zero imaginary part is
/// treated as real by comparisons, rounding and range checks
#[derive(Clone, PartialEq)]
pub struct Value(Complex);

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Value({})", self)
    }
}

const DISPLAY_DIGITS: usize = 32;

fn format_float(g: &Float) -> String {
    if g.is_integer() {
        if let Some(i) = g.to_integer() {
            return i.to_string();
        }
    }
    let s = g.to_string_radix(10, Some(DISPLAY_DIGITS));
    // strip trailing zeroes of the mantissa: 1.2500000e0 -> 1.25
    let (mant, exp) = s.split_at(s.find('e').unwrap_or(s.len()));
    let mant = if mant.contains('.') {
        mant.trim_end_matches('0').trim_end_matches('.')
    } else {
        mant
    };
    if exp.is_empty() || exp == "e0" {
        mant.to_string()
    } else {
        format!("{}{}", mant, exp)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let re = format_float(self.0.real());
        if !self.is_complex() {
            return write!(f, "{}", re);
        }
        let im = self.0.imag();
        if im.is_sign_negative() {
            write!(f, "{}-{}i", re, format_float(&Float::with_val(im.prec(), im.abs_ref())))
        } else {
            write!(f, "{}+{}i", re, format_float(im))
        }
    }
}

macro_rules! binary_op {
    ($tr: ident, $id: ident, $method: ident) => {
        impl<'a> $tr<&'a Value> for &'a Value {
            type Output = Value;
            fn $id(self, rhs: &'a Value) -> Value {
                self.$method(rhs)
            }
        }
    };
}

binary_op!(Add, add, addition);
binary_op!(Sub, sub, subtract);
binary_op!(Mul, mul, multiply);

impl Neg for &Value {
    type Output = Value;
    fn neg(self) -> Value {
        self.negate()
    }
}

/// `base^exp mod m` by square-and-multiply. `exp` must not be negative, `m`
/// must not be zero. The result has the sign of `m`
pub(crate) fn pow_mod(base: Integer, mut exp: Integer, m: &Integer) -> Integer {
    let reduce = |x: Integer| x.div_rem_floor(m.clone()).1;
    let mut base = reduce(base);
    let mut result = reduce(Integer::from(1));
    while exp.cmp0() == Ordering::Greater {
        if exp.is_odd() {
            result = reduce(result * &base);
        }
        base = reduce(Integer::from(base.square_ref()));
        exp >>= 1;
    }
    result
}

impl Value {
    pub fn from_complex(c: Complex) -> Value {
        Value(c)
    }

    pub fn as_complex(&self) -> &Complex {
        &self.0
    }

    pub fn into_complex(self) -> Complex {
        self.0
    }

    pub fn precision(&self) -> u32 {
        self.0.prec().0
    }

    pub fn context(&self) -> Context {
        Context::new(self.precision())
    }

    pub fn real(&self) -> &Float {
        self.0.real()
    }

    pub fn imag(&self) -> &Float {
        self.0.imag()
    }

    /// builds a real value from a float keeping this value's precision
    pub(crate) fn real_value(&self, f: Float) -> Value {
        Value(Complex::with_val(self.precision(), (f, 0)))
    }

    pub(crate) fn int_value(&self, i: &Integer) -> Value {
        Value(Complex::with_val(self.precision(), i))
    }

    pub fn addition(&self, rhs: &Value) -> Value {
        Value(self.0.clone() + &rhs.0)
    }

    pub fn subtract(&self, rhs: &Value) -> Value {
        Value(self.0.clone() - &rhs.0)
    }

    pub fn multiply(&self, rhs: &Value) -> Value {
        Value(self.0.clone() * &rhs.0)
    }

    pub fn divide(&self, rhs: &Value) -> MathResult {
        if rhs.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        Ok(Value(self.0.clone() / &rhs.0))
    }

    pub fn negate(&self) -> Value {
        Value(-self.0.clone())
    }

    pub fn reciprocal(&self) -> MathResult {
        if self.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        Ok(Value(self.0.clone().recip()))
    }

    /// Absolute value (modulus for complex numbers)
    pub fn abs(&self) -> Value {
        Value(self.0.clone().abs())
    }

    /// Sign of the real part: -1, 0 or 1
    pub fn sgn(&self) -> Value {
        let s = match self.0.real().cmp0() {
            Some(Ordering::Less) => -1,
            Some(Ordering::Greater) => 1,
            _ => 0,
        };
        Value(Complex::with_val(self.precision(), s))
    }

    pub fn conjugate(&self) -> Value {
        Value(self.0.clone().conj())
    }

    pub fn real_component(&self) -> Value {
        self.real_value(self.0.real().clone())
    }

    pub fn imaginary_component(&self) -> Value {
        self.real_value(self.0.imag().clone())
    }

    /// Both components are exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.real().is_zero() && self.0.imag().is_zero()
    }

    /// Real part is negative
    pub fn is_negative(&self) -> bool {
        self.0.real().cmp0() == Some(Ordering::Less)
    }

    /// Imaginary part is non-zero
    pub fn is_complex(&self) -> bool {
        !self.0.imag().is_zero()
    }

    pub fn is_integer(&self) -> bool {
        !self.is_complex() && self.0.real().is_integer()
    }

    /// Integer greater than or equal to zero
    pub fn is_positive_integer(&self) -> bool {
        self.is_integer() && !self.is_negative()
    }

    /// Integer greater than zero
    pub fn is_natural(&self) -> bool {
        self.is_integer() && self.0.real().cmp0() == Some(Ordering::Greater)
    }

    /// Compares real parts only. NaN compares equal to everything
    pub fn compare(&self, rhs: &Value) -> Ordering {
        self.0.real().partial_cmp(rhs.0.real()).unwrap_or(Ordering::Equal)
    }

    pub fn is_equal(&self, rhs: &Value) -> bool {
        self.compare(rhs) == Ordering::Equal
    }

    pub fn is_less_than(&self, rhs: &Value) -> bool {
        self.compare(rhs) == Ordering::Less
    }

    pub fn is_less_equal(&self, rhs: &Value) -> bool {
        self.compare(rhs) != Ordering::Greater
    }

    pub fn is_greater_than(&self, rhs: &Value) -> bool {
        self.compare(rhs) == Ordering::Greater
    }

    pub fn is_greater_equal(&self, rhs: &Value) -> bool {
        self.compare(rhs) != Ordering::Less
    }

    pub fn floor(&self) -> Value {
        self.real_value(self.0.real().clone().floor())
    }

    pub fn ceiling(&self) -> Value {
        self.real_value(self.0.real().clone().ceil())
    }

    pub fn round(&self) -> Value {
        self.real_value(self.0.real().clone().round())
    }

    /// Integer part, rounded towards zero
    pub fn integer_component(&self) -> Value {
        self.real_value(self.0.real().clone().trunc())
    }

    /// `x - trunc(x)`
    pub fn fractional_component(&self) -> Value {
        self.real_value(self.0.real().clone().fract())
    }

    /// `x - floor(x)`, always in [0, 1)
    pub fn fractional_part(&self) -> Value {
        let re = self.0.real();
        let fl = Float::with_val(re.prec(), re.floor_ref());
        self.real_value(re.clone() - fl)
    }

    /// Natural logarithm. A negative real argument gives `ln|x| + πi`
    pub fn ln(&self) -> MathResult {
        if self.is_zero() {
            return Err(MathError::LogarithmOfZero);
        }
        let mut res = self.0.clone().ln();
        if !self.is_complex() && self.is_negative() {
            res.mut_imag().abs_mut();
        }
        Ok(Value(res))
    }

    /// Logarithm with an arbitrary base: `ln(x) / ln(base)`
    pub fn logarithm(&self, base: &Value) -> MathResult {
        let num = self.ln()?;
        let den = base.ln()?;
        num.divide(&den)
    }

    pub fn exp(&self) -> Value {
        Value(self.0.clone().exp())
    }

    /// If the real part is within the precision tolerance of an integer,
    /// returns that integer. Used to recognize `1/3` as a cube root exponent
    pub(crate) fn nearest_integer(&self) -> Option<Integer> {
        if self.is_complex() {
            return None;
        }
        let prec = self.precision();
        let re = self.0.real();
        let rounded = Float::with_val(prec, re.round_ref());
        let diff = Float::with_val(prec, re - &rounded).abs();
        let mut scale = Float::with_val(prec, rounded.abs_ref());
        if scale < 1 {
            scale = Float::with_val(prec, 1);
        }
        let tolerance = (Float::with_val(prec, 1) >> prec.saturating_sub(16)) * scale;
        if diff > tolerance {
            return None;
        }
        rounded.to_integer()
    }

    /// `x^y`. A real non-integer exponent whose reciprocal is an integer `n`
    /// is evaluated as the n-th root, which keeps `8^(1/3)` exactly 2
    pub fn power(&self, y: &Value) -> MathResult {
        if self.is_zero() && y.is_negative() {
            return Err(MathError::NegativePowerOfZero);
        }
        if y.is_integer() {
            if let Some(n) = y.to_integer() {
                return self.power_integer(&n);
            }
        }
        if !self.is_complex() && !y.is_complex() && !y.is_zero() {
            let n = y.reciprocal()?.nearest_integer().and_then(|n| n.to_i64());
            if let Some(n) = n.filter(|n| *n != 0) {
                return self.root(n);
            }
        }
        Ok(Value(self.0.clone().pow(&y.0)))
    }

    /// `x^n` for an integer exponent
    pub fn power_integer(&self, n: &Integer) -> MathResult {
        if self.is_zero() && n.cmp0() == Ordering::Less {
            return Err(MathError::NegativePowerOfZero);
        }
        Ok(Value(self.0.clone().pow(n)))
    }

    /// n-th root. A negative `n` gives the reciprocal of the |n|-th root.
    /// Odd roots of negative reals stay real, even roots become complex
    pub fn root(&self, n: i64) -> MathResult {
        if n == 0 {
            return Err(MathError::ZerothRoot);
        }
        let prec = self.precision();
        let p = n.unsigned_abs();
        let real_root = !self.is_complex() && (!self.is_negative() || p % 2 == 1);
        let res = match u32::try_from(p) {
            Ok(k) if real_root => self.real_value(self.0.real().clone().root(k)),
            _ => {
                let exponent = Complex::with_val(prec, p).recip();
                Value(self.0.clone().pow(&exponent))
            }
        };
        if n < 0 {
            res.reciprocal()
        } else {
            Ok(res)
        }
    }

    pub fn sqrt(&self) -> MathResult {
        self.root(2)
    }

    /// `x!` for natural numbers, `Γ(x+1)` for positive non-integers
    pub fn factorial(&self) -> MathResult {
        if self.is_complex() || self.is_negative() {
            return Err(MathError::FactorialDomain);
        }
        let prec = self.precision();
        if self.is_zero() {
            return Ok(self.real_value(Float::with_val(prec, 1)));
        }
        if self.is_integer() {
            if let Some(n) = self.to_u32() {
                return Ok(self.real_value(Float::with_val(prec, Float::factorial(n))));
            }
        }
        let shifted = Float::with_val(prec, self.0.real() + 1u32);
        Ok(self.real_value(shifted.gamma()))
    }

    /// Gauss error function, real arguments only
    pub fn erf(&self) -> MathResult {
        if self.is_complex() {
            return Err(MathError::ErfDomain);
        }
        Ok(self.real_value(self.0.real().clone().erf()))
    }

    /// Riemann zeta function, real arguments other than 1
    pub fn zeta(&self) -> MathResult {
        if self.is_complex() || *self.0.real() == 1 {
            return Err(MathError::ZetaDomain);
        }
        Ok(self.real_value(self.0.real().clone().zeta()))
    }

    /// Floored remainder: the result has the sign of the divisor
    pub fn modulus_divide(&self, y: &Value) -> MathResult {
        let (a, b) = match (self.integer_operand(), y.integer_operand()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(MathError::ModulusNonInteger),
        };
        if b.cmp0() == Ordering::Equal {
            return Err(MathError::DivisionByZero);
        }
        let mut r = Integer::from(&a % &b);
        if r.cmp0() != Ordering::Equal && r.cmp0() != b.cmp0() {
            r += &b;
        }
        Ok(self.int_value(&r))
    }

    /// `base^exponent mod modulus` by repeated squaring. A negative exponent
    /// uses the modular inverse of the base
    pub fn modular_exponentiation(&self, exponent: &Value, modulus: &Value) -> MathResult {
        let (mut base, mut exp, m) = match (self.integer_operand(), exponent.integer_operand(), modulus.integer_operand()) {
            (Some(b), Some(e), Some(m)) => (b, e, m),
            _ => return Err(MathError::ModulusNonInteger),
        };
        if m.cmp0() == Ordering::Equal {
            return Err(MathError::DivisionByZero);
        }
        if exp.cmp0() == Ordering::Less {
            base = base.invert(&m).map_err(|_| MathError::NotInvertible)?;
            exp = -exp;
        }
        Ok(self.int_value(&pow_mod(base, exp, &m)))
    }

    /// the real part as an exact integer when the value is a real integer
    pub(crate) fn integer_operand(&self) -> Option<Integer> {
        if self.is_integer() {
            self.0.real().to_integer()
        } else {
            None
        }
    }

    /// Real part rounded towards zero
    pub fn to_integer(&self) -> Option<Integer> {
        self.0.real().clone().trunc().to_integer()
    }

    pub fn to_f64(&self) -> f64 {
        self.0.real().to_f64()
    }

    pub fn to_i64(&self) -> Option<i64> {
        self.to_integer().and_then(|i| i.to_i64())
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.to_integer().and_then(|i| i.to_u64())
    }

    pub fn to_u32(&self) -> Option<u32> {
        self.to_integer().and_then(|i| i.to_u32())
    }
}
