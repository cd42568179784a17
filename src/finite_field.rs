//! Explicit arithmetic for the finite field GF(p^k).
//!
//! Elements are length-k coefficient vectors over GF(p), reduced modulo a
//! monic irreducible polynomial of degree k. The modulus is either supplied
//! by the caller or found by a deterministic search, validated with Rabin's
//! irreducibility test in both cases.

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rand::Rng;

use crate::arith::{
    big_pow, is_prime_u64, mod_add_u64, mod_inverse_u64, mod_mul_u64, mod_sub_u64,
};
use crate::error::{Result, WittError};

/// Precomputed context for one finite field GF(p^k).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FqContext {
    p: u64,
    k: usize,
    /// Monic modulus, `modulus[i]` the coefficient of `z^i`, length `k + 1`.
    modulus: Vec<u64>,
}

impl FqContext {
    /// Builds GF(p^k) with the first monic irreducible modulus in the
    /// deterministic search order.
    pub fn new(p: u64, k: usize) -> Result<Self> {
        if !is_prime_u64(p) {
            return Err(WittError::NotPrime { p });
        }
        if k == 0 {
            return Err(WittError::ArithmeticOverflow(
                "finite field degree must be at least 1".into(),
            ));
        }
        let modulus = find_irreducible(p, k)?;
        Ok(Self { p, k, modulus })
    }

    /// Builds GF(p^k) with an explicit monic irreducible modulus of degree k.
    pub fn with_modulus(p: u64, modulus: Vec<u64>) -> Result<Self> {
        if !is_prime_u64(p) {
            return Err(WittError::NotPrime { p });
        }
        let k = modulus.len().saturating_sub(1);
        if k == 0 || modulus[k] != 1 || modulus.iter().any(|&c| c >= p) {
            return Err(WittError::NotInBaseRing {
                value: format!("{modulus:?}"),
                ring: format!("monic polynomials of positive degree over GF({p})"),
            });
        }
        if !is_irreducible(&modulus, p) {
            return Err(WittError::NotInBaseRing {
                value: format!("{modulus:?}"),
                ring: format!("irreducible polynomials over GF({p})"),
            });
        }
        Ok(Self { p, k, modulus })
    }

    pub fn p(&self) -> u64 {
        self.p
    }

    pub fn degree(&self) -> usize {
        self.k
    }

    pub fn modulus(&self) -> &[u64] {
        &self.modulus
    }

    /// q = p^k.
    pub fn order(&self) -> BigUint {
        big_pow(self.p, self.k as u32)
    }

    /// Printed name of the generator, `z2` for GF(p^2) and so on.
    pub fn gen_name(&self) -> String {
        format!("z{}", self.k)
    }

    pub fn zero(&self) -> Vec<u64> {
        vec![0; self.k]
    }

    pub fn one(&self) -> Vec<u64> {
        self.from_u64(1)
    }

    /// Image of the ring generator: the residue class of `z`, or 1 in the
    /// prime field.
    pub fn generator(&self) -> Vec<u64> {
        if self.k == 1 {
            return self.one();
        }
        let mut g = self.zero();
        g[1] = 1;
        g
    }

    pub fn from_u64(&self, a: u64) -> Vec<u64> {
        let mut x = self.zero();
        x[0] = a % self.p;
        x
    }

    pub fn is_zero(&self, x: &[u64]) -> bool {
        x.iter().all(|&c| c == 0)
    }

    /// The constant value of `x` when it lies in the prime subfield.
    pub fn as_prime_subfield(&self, x: &[u64]) -> Option<u64> {
        if x[1..].iter().all(|&c| c == 0) {
            Some(x[0])
        } else {
            None
        }
    }

    pub fn add(&self, x: &[u64], y: &[u64]) -> Vec<u64> {
        x.iter()
            .zip(y)
            .map(|(&a, &b)| mod_add_u64(a, b, self.p))
            .collect()
    }

    pub fn sub(&self, x: &[u64], y: &[u64]) -> Vec<u64> {
        x.iter()
            .zip(y)
            .map(|(&a, &b)| mod_sub_u64(a, b, self.p))
            .collect()
    }

    pub fn neg(&self, x: &[u64]) -> Vec<u64> {
        x.iter().map(|&a| mod_sub_u64(0, a, self.p)).collect()
    }

    pub fn mul(&self, x: &[u64], y: &[u64]) -> Vec<u64> {
        let prod = poly_mul(x, y, self.p);
        let mut r = poly_rem(&prod, &self.modulus, self.p);
        r.resize(self.k, 0);
        r
    }

    /// Multiplicative inverse via the extended Euclidean algorithm on
    /// polynomials over GF(p).
    pub fn inv(&self, x: &[u64]) -> Option<Vec<u64>> {
        if self.is_zero(x) {
            return None;
        }
        let mut r0 = self.modulus.clone();
        let mut r1 = poly_trim(x.to_vec());
        let mut t0: Vec<u64> = vec![];
        let mut t1: Vec<u64> = vec![1];
        while !r1.is_empty() {
            let (q, r2) = poly_divmod(&r0, &r1, self.p);
            r0 = r1;
            r1 = r2;
            let qt = poly_mul(&q, &t1, self.p);
            let t2 = poly_sub(&t0, &qt, self.p);
            t0 = t1;
            t1 = t2;
        }
        // r0 is the gcd, a nonzero constant since the modulus is irreducible.
        let c = mod_inverse_u64(r0[0], self.p)?;
        let mut out: Vec<u64> = t0.iter().map(|&a| mod_mul_u64(a, c, self.p)).collect();
        out.resize(self.k, 0);
        Some(out)
    }

    pub fn pow(&self, x: &[u64], e: &BigUint) -> Vec<u64> {
        let mut acc = self.one();
        let mut base = x.to_vec();
        for i in 0..e.bits() {
            if e.bit(i) {
                acc = self.mul(&acc, &base);
            }
            base = self.mul(&base, &base);
        }
        acc
    }

    pub fn pow_u64(&self, x: &[u64], e: u64) -> Vec<u64> {
        self.pow(x, &BigUint::from(e))
    }

    /// The unique `p^i`-th root of `x`, computed as the inverse power of the
    /// Frobenius automorphism: `x^(p^((k - i mod k) mod k))`.
    pub fn frobenius_root(&self, x: &[u64], i: usize) -> Vec<u64> {
        let j = (self.k - i % self.k) % self.k;
        if j == 0 {
            return x.to_vec();
        }
        self.pow(x, &big_pow(self.p, j as u32))
    }

    /// All q elements, counting coefficient vectors with the constant
    /// coefficient fastest.
    pub fn elements(&self) -> Result<Vec<Vec<u64>>> {
        let order = self.order();
        let n = order.to_usize().ok_or_else(|| {
            WittError::ArithmeticOverflow(format!("cannot enumerate {order} field elements"))
        })?;
        let mut out = Vec::with_capacity(n);
        let mut cur = self.zero();
        for _ in 0..n {
            out.push(cur.clone());
            for c in cur.iter_mut() {
                *c += 1;
                if *c < self.p {
                    break;
                }
                *c = 0;
            }
        }
        Ok(out)
    }

    pub fn random(&self, rng: &mut impl Rng) -> Vec<u64> {
        (0..self.k).map(|_| rng.gen_range(0..self.p)).collect()
    }

    pub fn format(&self, x: &[u64]) -> String {
        if self.is_zero(x) {
            return "0".to_string();
        }
        let name = self.gen_name();
        let mut parts = Vec::new();
        for i in (0..self.k).rev() {
            let c = x[i];
            if c == 0 {
                continue;
            }
            let part = match (i, c) {
                (0, _) => format!("{c}"),
                (1, 1) => name.clone(),
                (1, _) => format!("{c}*{name}"),
                (_, 1) => format!("{name}^{i}"),
                (_, _) => format!("{c}*{name}^{i}"),
            };
            parts.push(part);
        }
        parts.join(" + ")
    }
}

fn poly_trim(mut a: Vec<u64>) -> Vec<u64> {
    while a.last() == Some(&0) {
        a.pop();
    }
    a
}

fn poly_mul(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![0u64; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        if x == 0 {
            continue;
        }
        for (j, &y) in b.iter().enumerate() {
            out[i + j] = mod_add_u64(out[i + j], mod_mul_u64(x, y, p), p);
        }
    }
    poly_trim(out)
}

fn poly_sub(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    let n = a.len().max(b.len());
    let mut out = vec![0u64; n];
    for (i, o) in out.iter_mut().enumerate() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        *o = mod_sub_u64(x, y, p);
    }
    poly_trim(out)
}

/// Division with remainder by a nonzero divisor.
fn poly_divmod(a: &[u64], d: &[u64], p: u64) -> (Vec<u64>, Vec<u64>) {
    let d = poly_trim(d.to_vec());
    debug_assert!(!d.is_empty());
    let mut rem = poly_trim(a.to_vec());
    if rem.len() < d.len() {
        return (vec![], rem);
    }
    let lead_inv = mod_inverse_u64(d[d.len() - 1], p).unwrap_or(0);
    let mut quot = vec![0u64; rem.len() - d.len() + 1];
    while rem.len() >= d.len() && !rem.is_empty() {
        let shift = rem.len() - d.len();
        let c = mod_mul_u64(rem[rem.len() - 1], lead_inv, p);
        quot[shift] = c;
        for (i, &dc) in d.iter().enumerate() {
            rem[shift + i] = mod_sub_u64(rem[shift + i], mod_mul_u64(c, dc, p), p);
        }
        rem = poly_trim(rem);
    }
    (poly_trim(quot), rem)
}

fn poly_rem(a: &[u64], d: &[u64], p: u64) -> Vec<u64> {
    poly_divmod(a, d, p).1
}

fn poly_gcd(a: &[u64], b: &[u64], p: u64) -> Vec<u64> {
    let mut a = poly_trim(a.to_vec());
    let mut b = poly_trim(b.to_vec());
    while !b.is_empty() {
        let r = poly_rem(&a, &b, p);
        a = b;
        b = r;
    }
    a
}

/// x^e mod f over GF(p).
fn poly_powmod(x: &[u64], e: &BigUint, f: &[u64], p: u64) -> Vec<u64> {
    let mut acc = vec![1u64];
    let mut base = poly_rem(x, f, p);
    for i in 0..e.bits() {
        if e.bit(i) {
            acc = poly_rem(&poly_mul(&acc, &base, p), f, p);
        }
        base = poly_rem(&poly_mul(&base, &base, p), f, p);
    }
    acc
}

/// Rabin's test: f of degree k is irreducible over GF(p) iff
/// `x^(p^k) = x (mod f)` and `gcd(x^(p^(k/r)) - x, f) = 1` for every prime
/// divisor r of k.
fn is_irreducible(f: &[u64], p: u64) -> bool {
    let k = f.len() - 1;
    let x = poly_rem(&[0, 1], f, p);
    let frob = poly_powmod(&[0, 1], &big_pow(p, k as u32), f, p);
    if !poly_sub(&frob, &x, p).is_empty() {
        return false;
    }
    for r in prime_divisors(k as u64) {
        let sub = k as u64 / r;
        let fr = poly_powmod(&[0, 1], &big_pow(p, sub as u32), f, p);
        let g = poly_gcd(&poly_sub(&fr, &x, p), f, p);
        if g.len() != 1 {
            return false;
        }
    }
    true
}

fn prime_divisors(mut n: u64) -> Vec<u64> {
    let mut out = Vec::new();
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            out.push(d);
            while n % d == 0 {
                n /= d;
            }
        }
        d += 1;
    }
    if n > 1 {
        out.push(n);
    }
    out
}

/// First monic irreducible of degree k in the counter order on the
/// non-leading coefficients.
fn find_irreducible(p: u64, k: usize) -> Result<Vec<u64>> {
    if k == 1 {
        return Ok(vec![0, 1]);
    }
    let total = big_pow(p, k as u32);
    let limit = total.to_u64().unwrap_or(u64::MAX);
    let mut coeffs = vec![0u64; k + 1];
    coeffs[k] = 1;
    for c in 0..limit {
        let mut rest = c;
        for slot in coeffs.iter_mut().take(k) {
            *slot = rest % p;
            rest /= p;
        }
        if is_irreducible(&coeffs, p) {
            return Ok(coeffs);
        }
    }
    Err(WittError::ArithmeticOverflow(format!(
        "no irreducible modulus of degree {k} over GF({p})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    #[test]
    fn test_prime_field() {
        let f = FqContext::new(5, 1).unwrap();
        let a = f.from_u64(3);
        let b = f.from_u64(4);
        assert_eq!(f.mul(&a, &b), f.from_u64(2));
        assert_eq!(f.add(&a, &b), f.from_u64(2));
        assert_eq!(f.inv(&a), Some(f.from_u64(2)));
        assert_eq!(f.inv(&f.zero()), None);
        assert_eq!(f.format(&a), "3");
    }

    #[test]
    fn test_extension_field_arithmetic() {
        let f = FqContext::new(5, 2).unwrap();
        assert_eq!(f.order(), BigUint::from(25u32));
        let g = f.generator();
        // z * z = z^2, reduced by the monic modulus.
        let sq = f.mul(&g, &g);
        let back = f.mul(&sq, &f.inv(&sq).unwrap());
        assert_eq!(back, f.one());
        // Every nonzero element has order dividing 24.
        assert_eq!(f.pow(&g, &BigUint::from(24u32)), f.one());
    }

    #[test]
    fn test_frobenius_root_inverts_frobenius() {
        let f = FqContext::new(3, 4).unwrap();
        let g = f.generator();
        let x = f.add(&f.mul(&g, &g), &f.from_u64(2));
        for i in 0..=5 {
            let root = f.frobenius_root(&x, i);
            let mut y = root;
            for _ in 0..i {
                y = f.pow_u64(&y, 3);
            }
            assert_eq!(y, x, "p^{i}-th root");
        }
    }

    #[test]
    fn test_rejects_reducible_modulus() {
        // z^2 - 1 = (z-1)(z+1) over GF(5).
        assert!(FqContext::with_modulus(5, vec![4, 0, 1]).is_err());
        assert!(FqContext::with_modulus(5, vec![2, 0, 1]).is_ok());
        assert!(FqContext::new(6, 2).is_err());
    }

    #[test]
    fn test_enumeration() {
        let f = FqContext::new(3, 2).unwrap();
        let all = f.elements().unwrap();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0], f.zero());
        assert_eq!(all[1], f.one());
        assert_eq!(all[3], f.generator());
    }

    #[test]
    fn test_format_extension() {
        let f = FqContext::new(3, 2).unwrap();
        let g = f.generator();
        let x = f.add(&f.add(&g, &g), &f.one());
        assert_eq!(f.format(&x), "2*z2 + 1");
        assert_eq!(f.format(&f.zero()), "0");
    }
}
