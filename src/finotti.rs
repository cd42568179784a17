//! Finotti's algorithm for Witt vector arithmetic in characteristic p.
//!
//! Instead of evaluating the universal polynomials, the sum and product
//! coordinates are assembled from the auxiliary maps eta_i of Finotti,
//! "Computations with Witt vectors of length 3" (J. Theorie des Nombres de
//! Bordeaux, 2011). The only precomputation is a table of Teichmueller
//! digits of scaled binomial coefficients, which depends on p and the
//! precision alone, never on the coefficient ring.

use num_bigint::{BigInt, BigUint};
use num_traits::ToPrimitive;

use crate::arith::{big_pow, valuation_u64};
use crate::base_ring::{BaseRing, RingElement};
use crate::error::{Result, WittError};
use crate::padic::ZpContext;

/// Teichmueller digits of the binomial coefficients `C(p^k, i)` scaled by
/// their p-part: `rows[k][i]` holds the `v_p(i)`-th digit of
/// `-C(p^k, i) / p^(k - v_p(i))` as a p-adic integer, for `k <= prec` and
/// `0 <= i < p^k`.
#[derive(Debug, Clone)]
pub struct BinomialTable {
    p: u64,
    rows: Vec<Vec<u64>>,
}

impl BinomialTable {
    pub fn generate(p: u64, precision: usize) -> Result<Self> {
        if big_pow(p, precision as u32).to_usize().is_none() {
            return Err(WittError::ArithmeticOverflow(format!(
                "{p}^{precision} table rows exceed addressable memory"
            )));
        }
        let zp = ZpContext::new(p, precision as u32 + 1);
        let mut rows = vec![vec![0u64]];
        for k in 1..=precision {
            let pk = big_pow(p, k as u32)
                .to_usize()
                .unwrap_or_else(|| unreachable!("row size bound checked above"));
            let mut row = vec![0u64; pk];
            let mut prev_bin = BigUint::from(1u64);
            for i in 1..=pk / 2 {
                let val = valuation_u64(i as u64, p);
                // The coefficients follow from the previous one; this is
                // much faster than computing each binomial from scratch.
                let next_bin = prev_bin * ((pk - (i - 1)) as u64) / (i as u64);
                prev_bin = next_bin.clone();
                let scaled = next_bin / big_pow(p, k as u32 - val);
                let mut series = zp.reduce(&-BigInt::from(scaled));
                for _ in 0..val {
                    let temp = zp.residue(&series);
                    series = zp.shift_digit(&series, &zp.teichmuller(temp));
                }
                row[i] = zp.residue(&series);
                // binomial coefficients are symmetric
                row[pk - i] = row[i];
            }
            rows.push(row);
        }
        Ok(Self { p, rows })
    }

    pub fn prime(&self) -> u64 {
        self.p
    }

    /// The map eta_bar of Finotti's paper. `vec` is a list of ring elements
    /// and the result is the `eta_index`-th carry of their formal sum.
    pub fn eta_bar(&self, base: &BaseRing, vec: &[RingElement], eta_index: usize) -> RingElement {
        let vec: Vec<RingElement> = vec.iter().filter(|x| !x.is_zero()).cloned().collect();

        // special cases
        if vec.len() <= 1 {
            return base.zero();
        }
        if eta_index == 0 {
            return sum_elements(base, &vec);
        }

        let k = eta_index;
        // For a pair we apply Theorem 8.6 directly.
        if vec.len() == 2 {
            let (x, y) = (&vec[0], &vec[1]);
            let mut script_n: Vec<Vec<RingElement>> = vec![Vec::new(); k + 1];
            for t in 1..=k {
                let pt = self.rows[t].len();
                for i in 1..pt {
                    let term = base
                        .from_u64(self.rows[t][i])
                        .mul(&x.pow_big(&BigUint::from(i as u64)))
                        .mul(&y.pow_big(&BigUint::from((pt - i) as u64)));
                    script_n[t].push(term);
                }
            }
            for t in 2..=k {
                for i in 1..t {
                    let prior = script_n[t - i].clone();
                    let next = self.eta_bar(base, &prior, i);
                    script_n[t].push(next);
                }
            }
            return sum_elements(base, &script_n[k]);
        }

        // Longer vectors split in half and recurse, Proposition 5.4.
        let m = vec.len() / 2;
        let (v_1, v_2) = vec.split_at(m);
        let s_1 = sum_elements(base, v_1);
        let s_2 = sum_elements(base, v_2);
        let mut script_m: Vec<Vec<RingElement>> = vec![Vec::new(); k + 1];
        for t in 1..=k {
            script_m[t].push(self.eta_bar(base, v_1, t));
            script_m[t].push(self.eta_bar(base, v_2, t));
            script_m[t].push(self.eta_bar(base, &[s_1.clone(), s_2.clone()], t));
        }
        for t in 2..=k {
            for s in 1..t {
                let prior = script_m[t - s].clone();
                let next = self.eta_bar(base, &prior, s);
                script_m[t].push(next);
            }
        }
        sum_elements(base, &script_m[k])
    }
}

fn sum_elements(base: &BaseRing, elems: &[RingElement]) -> RingElement {
    elems.iter().fold(base.zero(), |acc, e| acc.add(e))
}

/// Sum coordinates via the carry towers `G_n`.
pub fn sum_coordinates(
    table: &BinomialTable,
    x: &[RingElement],
    y: &[RingElement],
) -> Vec<RingElement> {
    let base = x[0].parent().clone();
    let prec = x.len();
    let mut g: Vec<Vec<RingElement>> = Vec::with_capacity(prec);
    for n in 0..prec {
        let mut g_n = vec![x[n].clone(), y[n].clone()];
        for i in 0..n {
            g_n.push(table.eta_bar(&base, &g[i], n - i));
        }
        g.push(g_n);
    }
    g.iter().map(|row| sum_elements(&base, row)).collect()
}

/// Product coordinates. The cross terms use Frobenius-power shortcuts,
/// which is why this algorithm is restricted to characteristic p.
pub fn prod_coordinates(
    table: &BinomialTable,
    x: &[RingElement],
    y: &[RingElement],
) -> Vec<RingElement> {
    let base = x[0].parent().clone();
    let p = table.p;
    let prec = x.len();
    let mut g = vec![vec![x[0].mul(&y[0])]];
    for n in 1..prec {
        let pn = big_pow(p, n as u32);
        let mut g_n = vec![
            x[0].pow_big(&pn).mul(&y[n]),
            y[0].pow_big(&pn).mul(&x[n]),
        ];
        for i in 1..n {
            g_n.push(
                x[i].pow_big(&big_pow(p, (n - i) as u32))
                    .mul(&y[n - i].pow_big(&big_pow(p, i as u32))),
            );
        }
        for i in 0..n {
            g_n.push(table.eta_bar(&base, &g[i], n - i));
        }
        g.push(g_n);
    }
    g.iter().map(|row| sum_elements(&base, row)).collect()
}
