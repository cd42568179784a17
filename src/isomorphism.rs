//! Arithmetic through the isomorphism `W_n(F_q) = Z_q / p^n`.
//!
//! Over a finite field of characteristic p the Witt vector ring is the
//! truncated ring of integers of the unramified extension of degree
//! `[F_q : F_p]`. Both ring operations encode the operands as p-adic
//! series, operate in `Z_q` and decode the result, which is far cheaper
//! than any polynomial evaluation.

use num_bigint::BigUint;

use crate::arith::big_pow;
use crate::base_ring::{BaseRing, ElementData, RingElement};
use crate::finite_field::FqContext;
use crate::padic::ZqContext;

#[derive(Debug, Clone)]
pub struct SeriesCodec {
    field: FqContext,
    zq: ZqContext,
    precision: usize,
}

impl SeriesCodec {
    pub fn new(field: &FqContext, precision: usize) -> Self {
        Self {
            field: field.clone(),
            zq: ZqContext::new(field, precision as u32),
            precision,
        }
    }

    fn fq_data(elem: &RingElement) -> &Vec<u64> {
        match elem.data() {
            ElementData::Fq(v) => v,
            _ => unreachable!("series codec applied outside a finite field"),
        }
    }

    /// The bijection `W(F_q) -> Z_q`: the i-th coordinate contributes
    /// `p^i` times the Teichmueller lift of its `p^i`-th root.
    pub fn vector_to_series(&self, coords: &[RingElement]) -> Vec<BigUint> {
        let p = self.field.p();
        let mut series = self.zq.zero();
        for (i, c) in coords.iter().enumerate() {
            let root = self.field.frobenius_root(Self::fq_data(c), i);
            let lift = self.zq.teichmuller(&root);
            series = self
                .zq
                .add(&series, &self.zq.scale(&lift, &big_pow(p, i as u32)));
        }
        series
    }

    /// The inverse bijection `Z_q -> W(F_q)`: peel Teichmueller digits and
    /// raise each to the matching Frobenius power.
    pub fn series_to_vector(&self, base: &BaseRing, series: &[BigUint]) -> Vec<RingElement> {
        let p = self.field.p();
        let mut series = series.to_vec();
        let mut coords = Vec::with_capacity(self.precision);
        for i in 0..self.precision {
            let digit = self.zq.residue(&series);
            let elem = self.field.pow(&digit, &big_pow(p, i as u32));
            coords.push(RingElement::from_parts(base.clone(), ElementData::Fq(elem)));
            series = self.zq.shift_digit(&series, &self.zq.teichmuller(&digit));
        }
        coords
    }

    pub fn sum_coordinates(
        &self,
        base: &BaseRing,
        x: &[RingElement],
        y: &[RingElement],
    ) -> Vec<RingElement> {
        let a = self.vector_to_series(x);
        let b = self.vector_to_series(y);
        self.series_to_vector(base, &self.zq.add(&a, &b))
    }

    pub fn prod_coordinates(
        &self,
        base: &BaseRing,
        x: &[RingElement],
        y: &[RingElement],
    ) -> Vec<RingElement> {
        let a = self.vector_to_series(x);
        let b = self.vector_to_series(y);
        self.series_to_vector(base, &self.zq.mul(&a, &b))
    }
}
