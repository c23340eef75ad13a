//! Financial formulas.
//!
//! Every formula is a direct transcription and keeps the order of operations
//! of its textbook definition, so results agree digit for digit with other
//! calculators working at the same precision.

use std::fmt;
use std::str::FromStr;

use crate::errors::*;
use crate::value::*;

fn one(x: &Value) -> Value {
    x.context().integer(1)
}

/// Compounding term: number of periods for `pv` to grow to `fv`.
///
/// `ln(fv / pv) / ln(1 + pint)`
pub fn ctrm(pint: &Value, fv: &Value, pv: &Value) -> MathResult {
    let growth = fv.divide(pv)?.ln()?;
    let rate = pint.addition(&one(pint)).ln()?;
    growth.divide(&rate)
}

/// Double declining balance depreciation for the given period.
///
/// A period count below one is reported on `status` and gives zero
pub fn ddb(cost: &Value, life: &Value, period: &Value, status: &mut StatusChannel) -> MathResult {
    let ctx = cost.context();
    let len = period.to_i64().unwrap_or(0);
    if len <= 0 {
        status.record(MathError::InvalidPeriod);
        return Ok(ctx.zero());
    }

    let two = ctx.integer(2);
    let mut bv = ctx.zero();
    let mut t = ctx.zero();
    for _ in 0..len {
        t = cost.subtract(&bv).multiply(&two).divide(life)?;
        bv = bv.addition(&t);
    }
    Ok(t)
}

/// Future value of a series of payments.
///
/// `pmt * ((1 + pint)^n - 1) / pint`
pub fn fv(pmt: &Value, pint: &Value, n: &Value) -> MathResult {
    let growth = pint.addition(&one(pint)).power(n)?.subtract(&one(pint));
    pmt.multiply(&growth).divide(pint)
}

/// Gross profit margin: price that gives `margin` on `cost`.
///
/// `cost / (1 - margin)`
pub fn gpm(cost: &Value, margin: &Value) -> MathResult {
    cost.divide(&one(margin).subtract(margin))
}

/// Periodic payment of a loan.
///
/// `prin * (pint / (1 - (pint + 1)^-n))`
pub fn pmt(prin: &Value, pint: &Value, n: &Value) -> MathResult {
    let discount = pint.addition(&one(pint)).power(&n.negate())?;
    let factor = pint.divide(&discount.negate().addition(&one(pint)))?;
    Ok(prin.multiply(&factor))
}

/// Present value of a series of payments.
///
/// `pmt * ((1 - (1 + pint)^-n) / pint)`
pub fn pv(pmt: &Value, pint: &Value, n: &Value) -> MathResult {
    let discount = pint.addition(&one(pint)).power(&n.negate())?;
    let factor = discount.negate().addition(&one(pint)).divide(pint)?;
    Ok(pmt.multiply(&factor))
}

/// Periodic interest rate that grows `pv` to `fv` in `n` periods.
///
/// `(fv / pv)^(1 / n) - 1`
pub fn rate(fv: &Value, pv: &Value, n: &Value) -> MathResult {
    let exponent = one(n).divide(n)?;
    Ok(fv.divide(pv)?.power(&exponent)?.subtract(&one(n)))
}

/// Straight line depreciation.
///
/// `(cost - salvage) / life`
pub fn sln(cost: &Value, salvage: &Value, life: &Value) -> MathResult {
    cost.subtract(salvage).divide(life)
}

/// Sum of the years' digits depreciation.
///
/// `(cost - salvage) * ((life - period + 1) / (life * (life + 1) / 2))`
pub fn syd(cost: &Value, salvage: &Value, life: &Value, period: &Value) -> MathResult {
    let ctx = life.context();
    let remaining = life.subtract(period).addition(&ctx.integer(1));
    let digits = life.multiply(&life.addition(&ctx.integer(1))).divide(&ctx.integer(2))?;
    let fraction = remaining.divide(&digits)?;
    Ok(cost.subtract(salvage).multiply(&fraction))
}

/// Number of payments needed to reach a future value.
///
/// `ln(1 + fv * pint / pmt) / ln(1 + pint)`
pub fn term(pmt: &Value, fv: &Value, pint: &Value) -> MathResult {
    let rate = pint.addition(&one(pint)).ln()?;
    let growth = fv.multiply(pint).divide(pmt)?.addition(&one(pint)).ln()?;
    growth.divide(&rate)
}

/// Financial formulas by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialFunction {
    Ctrm,
    Ddb,
    Fv,
    Gpm,
    Pmt,
    Pv,
    Rate,
    Sln,
    Syd,
    Term,
}

impl FinancialFunction {
    /// Number of arguments the formula takes
    pub fn arity(self) -> usize {
        match self {
            FinancialFunction::Gpm => 2,
            FinancialFunction::Syd => 4,
            _ => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FinancialFunction::Ctrm => "ctrm",
            FinancialFunction::Ddb => "ddb",
            FinancialFunction::Fv => "fv",
            FinancialFunction::Gpm => "gpm",
            FinancialFunction::Pmt => "pmt",
            FinancialFunction::Pv => "pv",
            FinancialFunction::Rate => "rate",
            FinancialFunction::Sln => "sln",
            FinancialFunction::Syd => "syd",
            FinancialFunction::Term => "term",
        }
    }
}

impl fmt::Display for FinancialFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FinancialFunction {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ctrm" => Ok(FinancialFunction::Ctrm),
            "ddb" => Ok(FinancialFunction::Ddb),
            "fv" => Ok(FinancialFunction::Fv),
            "gpm" => Ok(FinancialFunction::Gpm),
            "pmt" => Ok(FinancialFunction::Pmt),
            "pv" => Ok(FinancialFunction::Pv),
            "rate" => Ok(FinancialFunction::Rate),
            "sln" => Ok(FinancialFunction::Sln),
            "syd" => Ok(FinancialFunction::Syd),
            "term" => Ok(FinancialFunction::Term),
            _ => Err(EvalError::unknown_function(s)),
        }
    }
}

/// Runs a formula over `args`, which must hold exactly as many values as
/// the formula takes
pub fn calculate(func: FinancialFunction, args: &[Value], status: &mut StatusChannel) -> Result<Value, EvalError> {
    if args.len() != func.arity() {
        return Err(EvalError::new(
            ErrorKind::Syntax,
            Some(func.name()),
            format!("Function '{}' requires {} arguments", func, func.arity()),
        ));
    }
    let a = args;
    let res = match func {
        FinancialFunction::Ctrm => ctrm(&a[0], &a[1], &a[2]),
        FinancialFunction::Ddb => ddb(&a[0], &a[1], &a[2], status),
        FinancialFunction::Fv => fv(&a[0], &a[1], &a[2]),
        FinancialFunction::Gpm => gpm(&a[0], &a[1]),
        FinancialFunction::Pmt => pmt(&a[0], &a[1], &a[2]),
        FinancialFunction::Pv => pv(&a[0], &a[1], &a[2]),
        FinancialFunction::Rate => rate(&a[0], &a[1], &a[2]),
        FinancialFunction::Sln => sln(&a[0], &a[1], &a[2]),
        FinancialFunction::Syd => syd(&a[0], &a[1], &a[2], &a[3]),
        FinancialFunction::Term => term(&a[0], &a[1], &a[2]),
    };
    res.map_err(|e| EvalError::from(e).with_token(func.name()))
}
