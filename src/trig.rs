use rug::float::Constant;
use rug::{Complex, Float};

use crate::errors::*;
use crate::value::*;

/// Unit in which real angles are given to and returned from trigonometric functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
    Gradians,
}

impl AngleUnit {
    /// number of units in a half turn, `None` for radians
    fn half_turn(self) -> Option<u32> {
        match self {
            AngleUnit::Radians => None,
            AngleUnit::Degrees => Some(180),
            AngleUnit::Gradians => Some(200),
        }
    }

    pub fn to_radians(self, x: &Value) -> Value {
        match self.half_turn() {
            None => x.clone(),
            Some(n) => {
                let prec = x.precision();
                let scale = Float::with_val(prec, Constant::Pi) / n;
                Value::from_complex(x.as_complex().clone() * scale)
            }
        }
    }

    pub fn from_radians(self, x: &Value) -> Value {
        match self.half_turn() {
            None => x.clone(),
            Some(n) => {
                let prec = x.precision();
                let scale = Float::with_val(prec, n) / Float::with_val(prec, Constant::Pi);
                Value::from_complex(x.as_complex().clone() * scale)
            }
        }
    }
}

impl Context {
    /// Creates a value from its modulus and argument
    pub fn polar(&self, r: &Value, theta: &Value, unit: AngleUnit) -> Value {
        let i_theta = unit.to_radians(theta).multiply(&self.i());
        r.multiply(&i_theta.exp())
    }
}

/// real inputs are converted from `unit`, complex ones are used as is
fn angle_argument(x: &Value, unit: AngleUnit) -> Complex {
    if x.is_complex() {
        x.as_complex().clone()
    } else {
        unit.to_radians(x).into_complex()
    }
}

/// real results are converted to `unit`
fn angle_result(z: Complex, unit: AngleUnit) -> Value {
    let z = Value::from_complex(z);
    if z.is_complex() {
        z
    } else {
        unit.from_radians(&z)
    }
}

fn outside_unit_range(x: &Value) -> bool {
    let ctx = x.context();
    x.is_greater_than(&ctx.integer(1)) || x.is_less_than(&ctx.integer(-1))
}

impl Value {
    /// Complex argument. Negative reals give +π rather than -π
    pub fn arg(&self, unit: AngleUnit) -> MathResult {
        if self.is_zero() {
            return Err(MathError::ArgumentOfZero);
        }
        let prec = self.precision();
        let a = Float::with_val(prec, self.as_complex().arg_ref());
        let mut z = unit.from_radians(&self.real_value(a));
        if !self.is_complex() && self.is_negative() {
            z = z.abs();
        }
        Ok(z)
    }

    pub fn sin(&self, unit: AngleUnit) -> Value {
        Value::from_complex(angle_argument(self, unit).sin())
    }

    pub fn cos(&self, unit: AngleUnit) -> Value {
        Value::from_complex(angle_argument(self, unit).cos())
    }

    pub fn tan(&self, unit: AngleUnit) -> MathResult {
        let ctx = self.context();
        let pi = ctx.pi();
        let half_pi = pi.divide(&ctx.integer(2))?;
        let turns = unit.to_radians(self).subtract(&half_pi).divide(&pi)?;
        if turns.nearest_integer().is_some() {
            return Err(MathError::UndefinedTangent);
        }
        Ok(Value::from_complex(angle_argument(self, unit).tan()))
    }

    pub fn asin(&self, unit: AngleUnit) -> MathResult {
        if outside_unit_range(self) {
            return Err(MathError::InverseSineDomain);
        }
        Ok(angle_result(self.as_complex().clone().asin(), unit))
    }

    pub fn acos(&self, unit: AngleUnit) -> MathResult {
        if outside_unit_range(self) {
            return Err(MathError::InverseCosineDomain);
        }
        Ok(angle_result(self.as_complex().clone().acos(), unit))
    }

    pub fn atan(&self, unit: AngleUnit) -> MathResult {
        let i = self.context().i();
        if *self == i || *self == i.negate() {
            return Err(MathError::InverseTangentDomain);
        }
        Ok(angle_result(self.as_complex().clone().atan(), unit))
    }

    pub fn sinh(&self) -> Value {
        Value::from_complex(self.as_complex().clone().sinh())
    }

    pub fn cosh(&self) -> Value {
        Value::from_complex(self.as_complex().clone().cosh())
    }

    pub fn tanh(&self) -> Value {
        Value::from_complex(self.as_complex().clone().tanh())
    }

    pub fn asinh(&self) -> Value {
        Value::from_complex(self.as_complex().clone().asinh())
    }

    pub fn acosh(&self) -> MathResult {
        if self.is_less_than(&self.context().integer(1)) {
            return Err(MathError::InverseHyperbolicCosineDomain);
        }
        Ok(Value::from_complex(self.as_complex().clone().acosh()))
    }

    pub fn atanh(&self) -> MathResult {
        let ctx = self.context();
        if self.is_greater_equal(&ctx.integer(1)) || self.is_less_equal(&ctx.integer(-1)) {
            return Err(MathError::InverseHyperbolicTangentDomain);
        }
        Ok(Value::from_complex(self.as_complex().clone().atanh()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new(200)
    }

    fn close(a: &Value, b: &Value) -> bool {
        a.subtract(b).abs().to_f64() < 1e-40
    }

    #[test]
    fn test_units() {
        let c = ctx();
        let d = AngleUnit::Degrees.to_radians(&c.integer(180));
        assert!(close(&d, &c.pi()));
        let g = AngleUnit::Gradians.from_radians(&c.pi());
        assert!(close(&g, &c.integer(200)));
        assert_eq!(AngleUnit::Radians.to_radians(&c.integer(3)), c.integer(3));
        assert_eq!(AngleUnit::default(), AngleUnit::Radians);
    }

    #[test]
    fn test_sin_cos() {
        let c = ctx();
        assert!(close(&c.integer(30).sin(AngleUnit::Degrees), &c.float(0.5)));
        assert!(close(&c.integer(100).cos(AngleUnit::Gradians), &c.zero()));
        assert!(close(&c.zero().sin(AngleUnit::Radians), &c.zero()));
        // complex arguments ignore the unit
        let z = c.complex(0.0, 1.0);
        assert_eq!(z.sin(AngleUnit::Degrees), z.sin(AngleUnit::Radians));
    }

    #[test]
    fn test_tan() {
        let c = ctx();
        assert_eq!(c.integer(90).tan(AngleUnit::Degrees), Err(MathError::UndefinedTangent));
        assert_eq!(c.integer(-270).tan(AngleUnit::Degrees), Err(MathError::UndefinedTangent));
        assert_eq!(c.integer(300).tan(AngleUnit::Gradians), Err(MathError::UndefinedTangent));
        let t = c.integer(45).tan(AngleUnit::Degrees).unwrap();
        assert!(close(&t, &c.integer(1)));
    }

    #[test]
    fn test_inverse() {
        let c = ctx();
        assert_eq!(c.integer(2).asin(AngleUnit::Radians), Err(MathError::InverseSineDomain));
        assert_eq!(c.integer(-2).acos(AngleUnit::Radians), Err(MathError::InverseCosineDomain));
        let a = c.integer(1).asin(AngleUnit::Degrees).unwrap();
        assert!(close(&a, &c.integer(90)));
        let a = c.integer(-1).acos(AngleUnit::Gradians).unwrap();
        assert!(close(&a, &c.integer(200)));
        assert_eq!(c.i().atan(AngleUnit::Radians), Err(MathError::InverseTangentDomain));
        assert_eq!(c.i().negate().atan(AngleUnit::Radians), Err(MathError::InverseTangentDomain));
        let a = c.integer(1).atan(AngleUnit::Degrees).unwrap();
        assert!(close(&a, &c.integer(45)));
    }

    #[test]
    fn test_hyperbolic() {
        let c = ctx();
        assert_eq!(c.zero().acosh(), Err(MathError::InverseHyperbolicCosineDomain));
        assert_eq!(c.integer(1).acosh(), Ok(c.zero()));
        assert_eq!(c.integer(1).atanh(), Err(MathError::InverseHyperbolicTangentDomain));
        assert_eq!(c.integer(-1).atanh(), Err(MathError::InverseHyperbolicTangentDomain));
        let x = c.float(0.5);
        assert!(close(&x.tanh().atanh().unwrap(), &x));
        assert!(close(&x.sinh().asinh(), &x));
        assert!(close(&c.zero().cosh(), &c.integer(1)));
    }

    #[test]
    fn test_arg() {
        let c = ctx();
        assert_eq!(c.zero().arg(AngleUnit::Radians), Err(MathError::ArgumentOfZero));
        assert!(close(&c.integer(-1).arg(AngleUnit::Radians).unwrap(), &c.pi()));
        let a = c.complex(-1.0, -0.0).arg(AngleUnit::Degrees).unwrap();
        assert!(close(&a, &c.integer(180)));
        let a = c.complex(0.0, 1.0).arg(AngleUnit::Degrees).unwrap();
        assert!(close(&a, &c.integer(90)));
    }

    #[test]
    fn test_polar() {
        let c = ctx();
        let z = c.polar(&c.integer(2), &c.integer(90), AngleUnit::Degrees);
        assert!(close(&z, &c.complex(0.0, 2.0)));
    }
}
