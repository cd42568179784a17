//! Fixed-modulus p-adic scratch arithmetic.
//!
//! `ZpContext` models the integers modulo p^N with the digit operations the
//! table generator and the characteristic-p integer conversion need, and
//! `ZqContext` models the unramified extension (Z/p^N)[z]/(f) used by the
//! finite-field isomorphism. Neither is a `BaseRing`; they are internal
//! computation contexts, precomputed once and then read-only.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

use crate::arith::{big_pow, reduce_mod};
use crate::finite_field::FqContext;

/// The ring Z/p^N with Teichmüller digit extraction.
#[derive(Debug, Clone)]
pub struct ZpContext {
    p: u64,
    modulus: BigUint,
}

impl ZpContext {
    pub fn new(p: u64, precision: u32) -> Self {
        debug_assert!(precision >= 1);
        Self {
            p,
            modulus: big_pow(p, precision),
        }
    }

    pub fn reduce(&self, k: &BigInt) -> BigUint {
        reduce_mod(k, &self.modulus)
    }

    /// First p-adic digit.
    pub fn residue(&self, x: &BigUint) -> u64 {
        (x % self.p).to_u64().unwrap_or(0)
    }

    /// The multiplicative representative of a residue: `r^(p^(N-1)) mod p^N`.
    pub fn teichmuller(&self, r: u64) -> BigUint {
        let exp = &self.modulus / BigUint::from(self.p);
        BigUint::from(r % self.p).modpow(&exp, &self.modulus)
    }

    /// `(x - t) / p` for `x = t (mod p)`, the digit-shift step.
    pub fn shift_digit(&self, x: &BigUint, t: &BigUint) -> BigUint {
        let diff = (x + &self.modulus - t % &self.modulus) % &self.modulus;
        debug_assert!((&diff % self.p).is_zero());
        diff / self.p
    }
}

/// The unramified extension (Z/p^N)[z]/(f), f a lift of the modulus of a
/// finite field. Elements are length-k coefficient vectors of residues
/// modulo p^N.
#[derive(Debug, Clone)]
pub struct ZqContext {
    p: u64,
    k: usize,
    precision: u32,
    p_pow: BigUint,
    /// Lifted monic modulus, length k + 1.
    modulus: Vec<BigUint>,
    /// q = p^k.
    order: BigUint,
}

impl ZqContext {
    pub fn new(field: &FqContext, precision: u32) -> Self {
        let p = field.p();
        let k = field.degree();
        Self {
            p,
            k,
            precision,
            p_pow: big_pow(p, precision),
            modulus: field.modulus().iter().map(|&c| BigUint::from(c)).collect(),
            order: field.order(),
        }
    }

    pub fn zero(&self) -> Vec<BigUint> {
        vec![BigUint::zero(); self.k]
    }

    pub fn add(&self, x: &[BigUint], y: &[BigUint]) -> Vec<BigUint> {
        x.iter()
            .zip(y)
            .map(|(a, b)| (a + b) % &self.p_pow)
            .collect()
    }

    pub fn sub(&self, x: &[BigUint], y: &[BigUint]) -> Vec<BigUint> {
        x.iter()
            .zip(y)
            .map(|(a, b)| (a + &self.p_pow - b % &self.p_pow) % &self.p_pow)
            .collect()
    }

    pub fn mul(&self, x: &[BigUint], y: &[BigUint]) -> Vec<BigUint> {
        let mut prod = vec![BigUint::zero(); 2 * self.k - 1];
        for (i, a) in x.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in y.iter().enumerate() {
                prod[i + j] = (&prod[i + j] + a * b) % &self.p_pow;
            }
        }
        // Reduce by the monic modulus, top degree down.
        for d in (self.k..2 * self.k - 1).rev() {
            let c = std::mem::take(&mut prod[d]);
            if c.is_zero() {
                continue;
            }
            for j in 0..self.k {
                let sub = (&c * &self.modulus[j]) % &self.p_pow;
                prod[d - self.k + j] =
                    (&prod[d - self.k + j] + &self.p_pow - sub) % &self.p_pow;
            }
        }
        prod.truncate(self.k);
        prod
    }

    pub fn pow(&self, x: &[BigUint], e: &BigUint) -> Vec<BigUint> {
        let mut acc = self.zero();
        acc[0] = BigUint::one();
        let mut base = x.to_vec();
        for i in 0..e.bits() {
            if e.bit(i) {
                acc = self.mul(&acc, &base);
            }
            base = self.mul(&base, &base);
        }
        acc
    }

    /// Teichmüller lift of a residue-field element: any lift raised to the
    /// power `q^(N-1)` is the multiplicative representative mod p^N.
    pub fn teichmuller(&self, residue: &[u64]) -> Vec<BigUint> {
        let lift: Vec<BigUint> = residue.iter().map(|&c| BigUint::from(c)).collect();
        let exp = self.order.pow(self.precision - 1);
        self.pow(&lift, &exp)
    }

    /// Reduction to the residue field.
    pub fn residue(&self, x: &[BigUint]) -> Vec<u64> {
        x.iter()
            .map(|c| (c % self.p).to_u64().unwrap_or(0))
            .collect()
    }

    /// `(x - t) / p` where `x` and `t` agree modulo p.
    pub fn shift_digit(&self, x: &[BigUint], t: &[BigUint]) -> Vec<BigUint> {
        self.sub(x, t)
            .into_iter()
            .map(|c| {
                debug_assert!((&c % self.p).is_zero());
                c / self.p
            })
            .collect()
    }

    pub fn scale(&self, x: &[BigUint], c: &BigUint) -> Vec<BigUint> {
        x.iter().map(|a| (a * c) % &self.p_pow).collect()
    }
}
