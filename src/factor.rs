use rug::Integer;
use std::cmp::Ordering;

use crate::errors::*;
use crate::value::*;

/// Miller-Rabin rounds used by factorization. The chance of a composite
/// passing is at most 4^-rounds
pub const MILLER_RABIN_ROUNDS: u32 = 50;

/// Number of odd candidates tried by trial division before switching to
/// Pollard's rho for values wider than 64 bits
pub const TRIAL_DIVISION_LIMIT: u32 = 10_000;

/// Miller-Rabin test with bases 2, 3, .., rounds+1
pub fn is_probable_prime(n: &Integer, rounds: u32) -> bool {
    if *n < 2 {
        return false;
    }
    if *n < 4 {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n - 1 = 2^l * q, q is odd
    let n_minus_one = Integer::from(n - 1u32);
    let l = n_minus_one.find_one(0).unwrap_or(0);
    let q = Integer::from(&n_minus_one >> l);

    'witness: for a in 2..rounds.saturating_add(2) {
        let a = Integer::from(a);
        if a >= n_minus_one {
            break;
        }
        let mut x = pow_mod(a, q.clone(), n);
        if x == 1 || x == n_minus_one {
            continue;
        }
        for _ in 1..l {
            x = Integer::from(x.square_ref()) % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Finds a non-trivial divisor of the odd composite `n` with the sequence
/// `x <- x^2 + 1 mod n`, moving to the next seed when a cycle gives `n` itself
pub fn pollard_rho(n: &Integer, seed: u32) -> Integer {
    if n.is_even() {
        return Integer::from(2);
    }
    if n.is_perfect_square() {
        return Integer::from(n.sqrt_ref());
    }
    let step = |x: &Integer| (Integer::from(x.square_ref()) + 1u32) % n;

    let mut seed = seed;
    loop {
        let mut x = Integer::from(seed);
        let mut y = Integer::from(seed);
        loop {
            x = step(&x);
            y = step(&step(&y));
            let d = Integer::from(&x - &y).abs().gcd(n);
            if d == *n {
                break;
            }
            if d != 1 {
                return d;
            }
        }
        tracing::trace!(%n, seed, "pollard rho cycle, retrying");
        seed += 1;
    }
}

/// trial division for values that fit a machine word
fn factorize_u64(mut n: u64) -> Vec<u64> {
    let mut factors = Vec::new();
    while n % 2 == 0 {
        n /= 2;
        factors.push(2);
    }

    let mut divisor = 3u64;
    while divisor <= n / divisor {
        while n % divisor == 0 {
            n /= divisor;
            factors.push(divisor);
        }
        divisor += 2;
    }

    if n > 1 {
        factors.push(n);
    }
    factors
}

fn factorize_big(mut value: Integer) -> Vec<Integer> {
    let mut factors = Vec::new();
    while value.is_even() {
        value >>= 1;
        factors.push(Integer::from(2));
    }

    let mut divisor = Integer::from(3);
    let mut tried = 0;
    while tried < TRIAL_DIVISION_LIMIT && Integer::from(divisor.square_ref()) <= value {
        if value.is_divisible(&divisor) {
            value /= &divisor;
            factors.push(divisor.clone());
        } else {
            divisor += 2;
            tried += 1;
        }
    }
    tracing::trace!(found = factors.len(), %value, "trial division finished");

    while value > 1 && !is_probable_prime(&value, MILLER_RABIN_ROUNDS) {
        let mut d = pollard_rho(&value, 2);
        while !is_probable_prime(&d, MILLER_RABIN_ROUNDS) {
            d = pollard_rho(&d, 2);
        }
        while value.is_divisible(&d) {
            value /= &d;
            factors.push(d.clone());
        }
    }

    if value > 1 {
        factors.push(value);
    }
    factors
}

impl Value {
    /// Splits an integer into prime factors. The sign of a negative value is
    /// carried by the first factor. Zero and ±1 are returned as they are
    pub fn factorize(&self) -> MathResult<Vec<Value>> {
        let n = self.integer_operand().ok_or(MathError::FactorizeNonInteger)?;
        let value = n.clone().abs();
        if value <= 1 {
            return Ok(vec![self.clone()]);
        }

        let mut factors: Vec<Value> = match value.to_u64() {
            Some(u) => factorize_u64(u).into_iter().map(|f| self.int_value(&Integer::from(f))).collect(),
            None => factorize_big(value).iter().map(|f| self.int_value(f)).collect(),
        };
        if n.cmp0() == Ordering::Less {
            if let Some(first) = factors.first_mut() {
                *first = first.negate();
            }
        }
        Ok(factors)
    }
}
