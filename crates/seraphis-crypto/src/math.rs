//! Scalar and integer helpers shared by the proofs and the reference set code.

use curve25519_dalek::scalar::Scalar;

use crate::CryptoError;

// ─── Integer helpers ────────────────────────────────────────────────────────

/// base^exp, or None on overflow.
pub fn uint_pow(base: u64, exp: u32) -> Option<u64> {
    base.checked_pow(exp)
}

/// a mod n, where n == 0 means 2^64.
pub fn mod_u64(a: u64, n: u64) -> u64 {
    if n == 0 {
        a
    } else {
        a % n
    }
}

/// (a + b) mod n, where n == 0 means 2^64.
pub fn mod_add(a: u64, b: u64, n: u64) -> u64 {
    if n == 0 {
        return a.wrapping_add(b);
    }
    ((a as u128 + b as u128) % n as u128) as u64
}

/// (a - b) mod n, where n == 0 means 2^64.
pub fn mod_sub(a: u64, b: u64, n: u64) -> u64 {
    if n == 0 {
        return a.wrapping_sub(b);
    }
    let a = a % n;
    let b = b % n;
    if a >= b {
        a - b
    } else {
        n - (b - a)
    }
}

/// a - b, floored at `min`.
pub fn saturating_sub(a: u64, b: u64, min: u64) -> u64 {
    a.checked_sub(b).map_or(min, |v| v.max(min))
}

/// a + b, capped at `max`.
pub fn saturating_add(a: u64, b: u64, max: u64) -> u64 {
    a.checked_add(b).map_or(max, |v| v.min(max))
}

/// Clamp `a` into [min, max]; if the range is inverted the result is `min`.
pub fn clamp(a: u64, min: u64, max: u64) -> u64 {
    if a < min {
        min
    } else if a > max {
        max.max(min)
    } else {
        a
    }
}

/// Little-endian base-n decomposition of `value` into exactly `size` digits.
pub fn decompose(value: usize, base: usize, size: usize) -> Vec<usize> {
    let mut digits = Vec::with_capacity(size);
    let mut v = value;
    for _ in 0..size {
        digits.push(v % base);
        v /= base;
    }
    digits
}

// ─── Scalar helpers ─────────────────────────────────────────────────────────

pub fn kronecker_delta(x: usize, y: usize) -> Scalar {
    if x == y {
        Scalar::ONE
    } else {
        Scalar::ZERO
    }
}

/// Multiply polynomial `x` (coefficient vector) by the degree-1 polynomial `y`,
/// keeping the first `m + 1` coefficients.
pub fn convolve(x: &[Scalar], y: &[Scalar; 2], m: usize) -> Vec<Scalar> {
    let mut result = vec![Scalar::ZERO; m + 1];
    for (i, xi) in x.iter().enumerate() {
        for (j, yj) in y.iter().enumerate() {
            if i + j < result.len() {
                result[i + j] += xi * yj;
            }
        }
    }
    result
}

/// [1, s, s^2, ..., s^(count-1)], optionally negated.
pub fn powers_of_scalar(s: &Scalar, count: usize, negate: bool) -> Vec<Scalar> {
    let mut powers = Vec::with_capacity(count);
    let mut p = if negate { -Scalar::ONE } else { Scalar::ONE };
    for _ in 0..count {
        powers.push(p);
        p *= s;
    }
    powers
}

pub fn scalar_pow(base: &Scalar, exp: usize) -> Scalar {
    let mut result = Scalar::ONE;
    let mut b = *base;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result *= b;
        }
        b *= b;
        e >>= 1;
    }
    result
}

/// Montgomery batch inversion. Fails if any input is zero.
pub fn batch_invert(scalars: &[Scalar]) -> Result<Vec<Scalar>, CryptoError> {
    if scalars.iter().any(|s| *s == Scalar::ZERO) {
        return Err(CryptoError::InvalidScalar("cannot invert zero".into()));
    }
    if scalars.is_empty() {
        return Ok(Vec::new());
    }

    let n = scalars.len();
    let mut products = Vec::with_capacity(n);
    let mut acc = scalars[0];
    products.push(acc);
    for s in &scalars[1..] {
        acc *= s;
        products.push(acc);
    }

    let mut inv = acc.invert();
    let mut result = vec![Scalar::ZERO; n];
    for i in (1..n).rev() {
        result[i] = products[i - 1] * inv;
        inv *= scalars[i];
    }
    result[0] = inv;

    Ok(result)
}
