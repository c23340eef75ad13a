use rug::Integer;

use crate::errors::*;
use crate::value::*;

/// all ones in the lowest `wordlen` bits
fn mask(wordlen: u32) -> Integer {
    (Integer::from(1) << wordlen) - 1u32
}

/// bitwise operands are non-negative integers
fn word_operand(x: &Value, op: &'static str) -> MathResult<Integer> {
    if !x.is_positive_integer() {
        return Err(MathError::BooleanDomain(op));
    }
    x.integer_operand().ok_or(MathError::BooleanDomain(op))
}

impl Value {
    /// Checks whether the value does not fit in a word of `wordlen` bits
    pub fn is_overflow(&self, wordlen: u32) -> bool {
        match self.to_integer() {
            Some(i) => i.abs() > mask(wordlen),
            None => true,
        }
    }

    pub fn and(&self, y: &Value) -> MathResult {
        let a = word_operand(self, "AND")?;
        let b = word_operand(y, "AND")?;
        Ok(self.int_value(&(a & b)))
    }

    pub fn or(&self, y: &Value) -> MathResult {
        let a = word_operand(self, "OR")?;
        let b = word_operand(y, "OR")?;
        Ok(self.int_value(&(a | b)))
    }

    pub fn xor(&self, y: &Value) -> MathResult {
        let a = word_operand(self, "XOR")?;
        let b = word_operand(y, "XOR")?;
        Ok(self.int_value(&(a ^ b)))
    }

    /// Inverts the lowest `wordlen` bits
    pub fn not(&self, wordlen: u32) -> MathResult {
        let a = word_operand(self, "NOT")?;
        if self.is_overflow(wordlen) {
            return Err(MathError::Overflow(wordlen));
        }
        Ok(self.int_value(&(a ^ mask(wordlen))))
    }

    pub fn xnor(&self, y: &Value, wordlen: u32) -> MathResult {
        self.xor(y)?.not(wordlen)
    }

    pub fn ones_complement(&self, wordlen: u32) -> MathResult {
        let a = word_operand(self, "ONES")?;
        if self.is_overflow(wordlen) {
            return Err(MathError::Overflow(wordlen));
        }
        Ok(self.int_value(&(a ^ mask(wordlen))))
    }

    /// Ones' complement plus one, truncated to the word
    pub fn twos_complement(&self, wordlen: u32) -> MathResult {
        let a = word_operand(self, "TWOS")?;
        if self.is_overflow(wordlen) {
            return Err(MathError::Overflow(wordlen));
        }
        let mut i = a ^ mask(wordlen);
        i += 1;
        i &= mask(wordlen);
        Ok(self.int_value(&i))
    }

    /// Multiplies by `2^count`. A negative count divides and rounds down,
    /// which requires an integer
    pub fn shift(&self, count: i32) -> MathResult {
        if count >= 0 {
            return Ok(Value::from_complex(self.as_complex().clone() << count.unsigned_abs()));
        }
        let i = self.integer_operand().ok_or(MathError::ShiftNonInteger)?;
        Ok(self.int_value(&(i >> count.unsigned_abs())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> Context {
        Context::new(128)
    }

    #[test]
    fn test_overflow() {
        let c = ctx();
        assert!(!c.integer(255).is_overflow(8));
        assert!(c.integer(256).is_overflow(8));
        assert!(!c.unsigned(u64::MAX).is_overflow(64));
        assert!(c.integer(1).is_overflow(0));
    }

    #[test]
    fn test_logic() {
        let c = ctx();
        let a = c.integer(0b1100);
        let b = c.integer(0b1010);
        assert_eq!(a.and(&b), Ok(c.integer(0b1000)));
        assert_eq!(a.or(&b), Ok(c.integer(0b1110)));
        assert_eq!(a.xor(&b), Ok(c.integer(0b0110)));
        assert_eq!(a.xnor(&b, 4), Ok(c.integer(0b1001)));
        assert_eq!(c.integer(-1).and(&b), Err(MathError::BooleanDomain("AND")));
        assert_eq!(c.float(1.5).or(&b), Err(MathError::BooleanDomain("OR")));
    }

    #[test]
    fn test_not() {
        let c = ctx();
        assert_eq!(c.integer(0).not(8), Ok(c.integer(255)));
        assert_eq!(c.integer(0x0f).not(8), Ok(c.integer(0xf0)));
        assert_eq!(c.integer(256).not(8), Err(MathError::Overflow(8)));
        assert_eq!(c.integer(-3).not(8), Err(MathError::BooleanDomain("NOT")));
    }

    #[test]
    fn test_complements() {
        let c = ctx();
        assert_eq!(c.integer(5).ones_complement(8), Ok(c.integer(250)));
        assert_eq!(c.integer(5).twos_complement(8), Ok(c.integer(251)));
        assert_eq!(c.integer(0).twos_complement(8), Ok(c.integer(0)));
        assert_eq!(c.integer(1).twos_complement(16), Ok(c.integer(0xffff)));
        assert_eq!(c.integer(255).twos_complement(8), Ok(c.integer(1)));
    }

    #[test]
    fn test_complements_out_of_word() {
        let c = ctx();
        assert_eq!(c.integer(300).ones_complement(8), Err(MathError::Overflow(8)));
        assert_eq!(c.integer(300).twos_complement(8), Err(MathError::Overflow(8)));
        assert_eq!(c.integer(256).ones_complement(8), Err(MathError::Overflow(8)));
        assert_eq!(c.integer(-1).ones_complement(8), Err(MathError::BooleanDomain("ONES")));
        assert_eq!(c.float(2.5).twos_complement(8), Err(MathError::BooleanDomain("TWOS")));
        assert_eq!(
            MathError::BooleanDomain("TWOS").to_string(),
            "Boolean TWOS is only defined for positive integers"
        );
    }

    #[test]
    fn test_shift() {
        let c = ctx();
        assert_eq!(c.integer(3).shift(4), Ok(c.integer(48)));
        assert_eq!(c.float(1.5).shift(1), Ok(c.integer(3)));
        assert_eq!(c.integer(48).shift(-4), Ok(c.integer(3)));
        assert_eq!(c.integer(7).shift(-1), Ok(c.integer(3)));
        assert_eq!(c.integer(-7).shift(-1), Ok(c.integer(-4)));
        assert_eq!(c.float(7.5).shift(-1), Err(MathError::ShiftNonInteger));
    }
}
