//! Universal sum and product polynomials for the standard algorithm.
//!
//! The ring laws of length-n Witt vectors are polynomial identities over the
//! integers, determined by the ghost components
//! `w_n(X) = sum of p^i * X_i^(p^(n-i)) for i <= n`. Solving
//! `w_n(S) = w_n(X) + w_n(Y)` and `w_n(P) = w_n(X) * w_n(Y)` coordinate by
//! coordinate yields the polynomials generated here. The divisions by p^n
//! are exact over the integers by the classical integrality theorem, so the
//! whole right-hand side is accumulated first and divided once; a failed
//! division means the generation itself is broken, not bad input.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::arith::big_pow;
use crate::base_ring::{BaseRing, RingElement};
use crate::error::{Result, WittError};
use crate::polynomial::MPoly;

/// Cached ring laws for one ring: `sums[n]` and `prods[n]` are polynomials
/// in `X0..X(n-1), Y0..Y(n-1)` with coefficients in the base ring.
#[derive(Debug, Clone)]
pub struct WittPolynomials {
    pub sums: Vec<MPoly>,
    pub prods: Vec<MPoly>,
}

impl WittPolynomials {
    /// Generates the universal polynomials over the integers, then projects
    /// the coefficients into `base`.
    pub fn generate(base: &BaseRing, p: u64, precision: usize) -> Result<Self> {
        let max_exp = big_pow(p, precision.saturating_sub(1) as u32);
        if max_exp.to_u32().is_none() {
            return Err(WittError::ArithmeticOverflow(format!(
                "{p}^{} exceeds the supported exponent range",
                precision - 1
            )));
        }

        let zz = BaseRing::integers();
        let nvars = 2 * precision;
        let x = |i: usize| MPoly::var(&zz, nvars, i);
        let y = |i: usize| MPoly::var(&zz, nvars, precision + i);
        let p_int = BigInt::from(p);
        let p_scalar = |i: usize| zz.from_int(&p_int.pow(i as u32));
        let p_exp = |e: usize| {
            big_pow(p, e as u32)
                .to_u32()
                .unwrap_or_else(|| unreachable!("exponent bound checked above"))
        };

        let mut sums: Vec<MPoly> = Vec::with_capacity(precision);
        sums.push(x(0).add(&y(0)));
        for n in 1..precision {
            let mut acc = MPoly::zero(zz.clone(), nvars);
            for i in 0..n {
                let e = p_exp(n - i);
                let bracket = x(i)
                    .pow_u32(e)
                    .add(&y(i).pow_u32(e))
                    .sub(&sums[i].pow_u32(e));
                acc = acc.add(&bracket.scale(&p_scalar(i)));
            }
            let corr = match acc.div_coefficients(&p_scalar(n)) {
                Ok(q) => q,
                Err(_) => panic!("sum polynomial {n} has a ghost component not divisible by {p}^{n}"),
            };
            sums.push(x(n).add(&y(n)).add(&corr));
        }

        let mut prods: Vec<MPoly> = Vec::with_capacity(precision);
        prods.push(x(0).mul(&y(0)));
        for n in 1..precision {
            let mut x_ghost = MPoly::zero(zz.clone(), nvars);
            let mut y_ghost = MPoly::zero(zz.clone(), nvars);
            for i in 0..=n {
                let e = p_exp(n - i);
                x_ghost = x_ghost.add(&x(i).pow_u32(e).scale(&p_scalar(i)));
                y_ghost = y_ghost.add(&y(i).pow_u32(e).scale(&p_scalar(i)));
            }
            let mut prod_ghost = MPoly::zero(zz.clone(), nvars);
            for i in 0..n {
                let e = p_exp(n - i);
                prod_ghost = prod_ghost.add(&prods[i].pow_u32(e).scale(&p_scalar(i)));
            }
            let num = x_ghost.mul(&y_ghost).sub(&prod_ghost);
            let p_n = match num.div_coefficients(&p_scalar(n)) {
                Ok(q) => q,
                Err(_) => {
                    panic!("product polynomial {n} has a ghost component not divisible by {p}^{n}")
                }
            };
            prods.push(p_n);
        }

        let sums = sums
            .iter()
            .map(|s| s.map_coefficients(base))
            .collect::<Result<Vec<_>>>()?;
        let prods = prods
            .iter()
            .map(|s| s.map_coefficients(base))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sums, prods })
    }

    /// Evaluates one family of law polynomials at a pair of coordinate
    /// vectors.
    pub fn evaluate(polys: &[MPoly], x: &[RingElement], y: &[RingElement]) -> Vec<RingElement> {
        let values: Vec<RingElement> = x.iter().chain(y).cloned().collect();
        polys.iter().map(|f| f.substitute(&values)).collect()
    }
}

/// The ghost (phantom) components of a coordinate vector:
/// `w_n = sum of p^i * x_i^(p^(n-i))`.
pub fn ghost_components(p: u64, coords: &[RingElement]) -> Vec<RingElement> {
    let base = match coords.first() {
        Some(c) => c.parent().clone(),
        None => return Vec::new(),
    };
    let p_int = BigInt::from(p);
    (0..coords.len())
        .map(|n| {
            let mut acc = base.zero();
            for (i, c) in coords.iter().take(n + 1).enumerate() {
                let term = c
                    .pow_big(&big_pow(p, (n - i) as u32))
                    .mul(&base.from_int(&p_int.pow(i as u32)));
                acc = acc.add(&term);
            }
            acc
        })
        .collect()
}
