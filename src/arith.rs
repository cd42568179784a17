//! Shared integer arithmetic helpers.
//!
//! Everything here operates on plain machine words or `num-bigint` values;
//! ring-aware arithmetic lives in `base_ring`.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

/// Multiplies two residues without overflowing, widening through u128.
#[inline]
pub fn mod_mul_u64(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

#[inline]
pub fn mod_add_u64(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 + b as u128) % m as u128) as u64
}

/// `a - b mod m` for residues already reduced below `m`.
#[inline]
pub fn mod_sub_u64(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 + (m - b) as u128) % m as u128) as u64
}

/// Computes `base^exp mod m` by square and multiply.
pub fn mod_pow_u64(mut base: u64, mut exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let mut acc = 1u64;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = mod_mul_u64(acc, base, m);
        }
        base = mod_mul_u64(base, base, m);
        exp >>= 1;
    }
    acc
}

/// Extended Euclidean algorithm: returns `(g, x, y)` with `a*x + b*y = g`.
pub fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    if a == 0 {
        return (b, 0, 1);
    }
    let (g, x, y) = extended_gcd(b % a, a);
    (g, y - (b / a) * x, x)
}

/// Inverse of `a` modulo `m`, if `gcd(a, m) = 1`.
pub fn mod_inverse_u64(a: u64, m: u64) -> Option<u64> {
    let (g, x, _) = extended_gcd(a as i128, m as i128);
    if g != 1 {
        return None;
    }
    let m = m as i128;
    Some(((x % m + m) % m) as u64)
}

/// Deterministic Miller-Rabin for u64 inputs.
///
/// The witness set 2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37 is exact for
/// all 64-bit integers.
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    for &p in &[2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        if n == p {
            return true;
        }
        if n % p == 0 {
            return false;
        }
    }
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }
    'witness: for &a in &[2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37] {
        let mut x = mod_pow_u64(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 0..s - 1 {
            x = mod_mul_u64(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// p-adic valuation of a machine-word integer (`n` must be nonzero).
pub fn valuation_u64(mut n: u64, p: u64) -> u32 {
    debug_assert!(n != 0 && p >= 2);
    let mut v = 0;
    while n % p == 0 {
        n /= p;
        v += 1;
    }
    v
}

/// `p^k` as a `BigUint`.
pub fn big_pow(p: u64, k: u32) -> BigUint {
    BigUint::from(p).pow(k)
}

/// Quotient of `a` by `d` when the division is exact, `None` otherwise.
pub fn exact_div(a: &BigInt, d: &BigInt) -> Option<BigInt> {
    if d.is_zero() {
        return None;
    }
    if (a % d).is_zero() {
        Some(a / d)
    } else {
        None
    }
}

/// Euclidean gcd on unsigned big integers.
pub fn big_gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !b.is_zero() {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Inverse of `a` modulo `n` over big integers, if `gcd(a, n) = 1`.
pub fn big_mod_inverse(a: &BigUint, n: &BigUint) -> Option<BigUint> {
    let n_int = BigInt::from(n.clone());
    let mut r0 = n_int.clone();
    let mut r1 = BigInt::from(a % n);
    let mut t0 = BigInt::zero();
    let mut t1 = BigInt::one();
    while !r1.is_zero() {
        let q = &r0 / &r1;
        let r2 = &r0 - &q * &r1;
        r0 = r1;
        r1 = r2;
        let t2 = &t0 - &q * &t1;
        t0 = t1;
        t1 = t2;
    }
    if !r0.is_one() {
        return None;
    }
    let t = ((t0 % &n_int) + &n_int) % &n_int;
    Some(t.magnitude().clone())
}

/// Reduces a signed integer into `[0, n)` as an unsigned residue.
pub fn reduce_mod(k: &BigInt, n: &BigUint) -> BigUint {
    let n_int = BigInt::from(n.clone());
    let r = ((k % &n_int) + &n_int) % &n_int;
    r.magnitude().clone()
}

/// Base-p digits of `n`, least significant first. Empty for zero.
pub fn base_p_digits(n: &BigUint, p: u64) -> Vec<u64> {
    let p_big = BigUint::from(p);
    let mut digits = Vec::new();
    let mut n = n.clone();
    while !n.is_zero() {
        let d = &n % &p_big;
        digits.push(d.to_u64().unwrap_or(0));
        n /= &p_big;
    }
    digits
}
