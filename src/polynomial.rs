//! Sparse multivariate polynomials over a `BaseRing`.
//!
//! Terms map an exponent vector to a nonzero coefficient. The coefficient
//! ring and the number of variables travel with the polynomial, and all
//! binary operations check that both operands agree on them.

use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::arith::{base_p_digits, big_pow};
use crate::base_ring::{BaseRing, RingElement};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MPoly {
    base: BaseRing,
    nvars: usize,
    terms: BTreeMap<Vec<u32>, RingElement>,
}

impl MPoly {
    pub fn zero(base: BaseRing, nvars: usize) -> Self {
        Self {
            base,
            nvars,
            terms: BTreeMap::new(),
        }
    }

    pub fn constant(base: &BaseRing, nvars: usize, c: RingElement) -> Self {
        let mut out = Self::zero(base.clone(), nvars);
        if !c.is_zero() {
            assert_eq!(c.parent(), base, "constant from a different ring");
            out.terms.insert(vec![0; nvars], c);
        }
        out
    }

    /// The monomial `X_i`.
    pub fn var(base: &BaseRing, nvars: usize, i: usize) -> Self {
        assert!(i < nvars);
        let mut exps = vec![0u32; nvars];
        exps[i] = 1;
        Self::monomial(base, exps, base.one())
    }

    pub fn monomial(base: &BaseRing, exps: Vec<u32>, coeff: RingElement) -> Self {
        let nvars = exps.len();
        let mut out = Self::zero(base.clone(), nvars);
        if !coeff.is_zero() {
            out.terms.insert(exps, coeff);
        }
        out
    }

    pub fn base(&self) -> &BaseRing {
        &self.base
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(|e| e.iter().all(|&x| x == 0))
    }

    pub fn constant_coefficient(&self) -> RingElement {
        self.terms
            .get(&vec![0u32; self.nvars])
            .cloned()
            .unwrap_or_else(|| self.base.zero())
    }

    /// Coefficient of the degree-one monomial in variable `i` alone.
    pub fn linear_coefficient(&self, i: usize) -> RingElement {
        let mut exps = vec![0u32; self.nvars];
        exps[i] = 1;
        self.terms
            .get(&exps)
            .cloned()
            .unwrap_or_else(|| self.base.zero())
    }

    fn insert_term(&mut self, exps: Vec<u32>, c: RingElement) {
        if c.is_zero() {
            return;
        }
        match self.terms.remove(&exps) {
            None => {
                self.terms.insert(exps, c);
            }
            Some(old) => {
                let sum = old.add(&c);
                if !sum.is_zero() {
                    self.terms.insert(exps, sum);
                }
            }
        }
    }

    fn check_compatible(&self, other: &Self) {
        assert_eq!(self.base, other.base, "polynomials over different rings");
        assert_eq!(self.nvars, other.nvars, "polynomials in different variables");
    }

    pub fn add(&self, other: &Self) -> Self {
        self.check_compatible(other);
        let mut out = self.clone();
        for (e, c) in &other.terms {
            out.insert_term(e.clone(), c.clone());
        }
        out
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn neg(&self) -> Self {
        let mut out = Self::zero(self.base.clone(), self.nvars);
        for (e, c) in &self.terms {
            out.terms.insert(e.clone(), c.neg());
        }
        out
    }

    pub fn mul(&self, other: &Self) -> Self {
        self.check_compatible(other);
        let mut out = Self::zero(self.base.clone(), self.nvars);
        for (e1, c1) in &self.terms {
            for (e2, c2) in &other.terms {
                let exps: Vec<u32> = e1
                    .iter()
                    .zip(e2)
                    .map(|(&a, &b)| exp_add(a, b))
                    .collect();
                out.insert_term(exps, c1.mul(c2));
            }
        }
        out
    }

    pub fn scale(&self, c: &RingElement) -> Self {
        let mut out = Self::zero(self.base.clone(), self.nvars);
        for (e, coeff) in &self.terms {
            out.insert_term(e.clone(), coeff.mul(c));
        }
        out
    }

    pub fn pow_u32(&self, e: u32) -> Self {
        let mut acc = Self::constant(&self.base, self.nvars, self.base.one());
        let mut base = self.clone();
        let mut e = e;
        while e > 0 {
            if e & 1 == 1 {
                acc = acc.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        acc
    }

    /// Termwise `p^j`-th power: coefficients through the base-ring Frobenius,
    /// exponents scaled by `p^j`. Valid in characteristic p only.
    pub fn frobenius_scale(&self, p: u64, j: u32) -> Self {
        if j == 0 {
            return self.clone();
        }
        let scale_big = big_pow(p, j);
        let scale = match scale_big.to_u32() {
            Some(s) => s,
            None => panic!("exponent overflow in characteristic-{p} power"),
        };
        let mut out = Self::zero(self.base.clone(), self.nvars);
        for (e, c) in &self.terms {
            let exps: Vec<u32> = e.iter().map(|&a| exp_mul(a, scale)).collect();
            out.insert_term(exps, c.pow_big(&scale_big));
        }
        out
    }

    /// `self^e` in characteristic p via base-p digits of the exponent: the
    /// digit powers are small, and the `p^j` factors are termwise Frobenius.
    pub fn pow_char_p(&self, e: &BigUint, p: u64) -> Self {
        if e.is_zero() {
            return Self::constant(&self.base, self.nvars, self.base.one());
        }
        let mut acc = Self::constant(&self.base, self.nvars, self.base.one());
        for (j, digit) in base_p_digits(e, p).into_iter().enumerate() {
            if digit == 0 {
                continue;
            }
            let d = match u32::try_from(digit) {
                Ok(d) => d,
                Err(_) => panic!("exponent digit overflow in characteristic-{p} power"),
            };
            let inner = self.pow_u32(d);
            acc = acc.mul(&inner.frobenius_scale(p, j as u32));
        }
        acc
    }

    /// Moves the polynomial into a ring over `target` by coercing every
    /// coefficient. Coefficients that die in the target (multiples of its
    /// characteristic, say) drop out of the term map.
    pub fn map_coefficients(&self, target: &BaseRing) -> crate::error::Result<MPoly> {
        let mut out = Self::zero(target.clone(), self.nvars);
        for (e, c) in &self.terms {
            out.insert_term(e.clone(), target.coerce(c)?);
        }
        Ok(out)
    }

    /// Divides every coefficient by `d`, failing if any quotient does not
    /// exist in the coefficient ring.
    pub fn div_coefficients(&self, d: &RingElement) -> crate::error::Result<MPoly> {
        let mut out = Self::zero(self.base.clone(), self.nvars);
        for (e, c) in &self.terms {
            out.insert_term(e.clone(), c.div(d)?);
        }
        Ok(out)
    }

    /// Evaluates at `values`, one per variable. All values must share one
    /// parent ring, and the coefficients must coerce into it.
    pub fn substitute(&self, values: &[RingElement]) -> RingElement {
        assert_eq!(values.len(), self.nvars, "one value per variable");
        assert!(!values.is_empty());
        let target = values[0].parent().clone();
        for v in values {
            assert_eq!(v.parent(), &target, "values from different rings");
        }
        let mut acc = target.zero();
        for (exps, coeff) in &self.terms {
            let mut term = match target.coerce(coeff) {
                Ok(t) => t,
                Err(_) => panic!("coefficient does not coerce into the evaluation ring"),
            };
            for (i, &e) in exps.iter().enumerate() {
                if e > 0 {
                    term = term.mul(&values[i].pow_big(&BigUint::from(e)));
                }
            }
            acc = acc.add(&term);
        }
        acc
    }

    pub fn format(&self, names: &[String]) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        let mut ordered: Vec<(&Vec<u32>, &RingElement)> = self.terms.iter().collect();
        ordered.sort_by(|(ea, _), (eb, _)| {
            let da: u64 = ea.iter().map(|&x| x as u64).sum();
            let db: u64 = eb.iter().map(|&x| x as u64).sum();
            db.cmp(&da).then_with(|| eb.cmp(ea))
        });
        let mut out = String::new();
        for (i, (exps, coeff)) in ordered.into_iter().enumerate() {
            let (neg, body) = term_string(coeff, exps, names);
            if i == 0 {
                if neg {
                    out.push('-');
                }
            } else if neg {
                out.push_str(" - ");
            } else {
                out.push_str(" + ");
            }
            out.push_str(&body);
        }
        out
    }
}

fn exp_add(a: u32, b: u32) -> u32 {
    match a.checked_add(b) {
        Some(v) => v,
        None => panic!("monomial exponent overflow"),
    }
}

fn exp_mul(a: u32, b: u32) -> u32 {
    match a.checked_mul(b) {
        Some(v) => v,
        None => panic!("monomial exponent overflow"),
    }
}

fn term_string(coeff: &RingElement, exps: &[u32], names: &[String]) -> (bool, String) {
    let cs = coeff.to_string();
    let vars: Vec<String> = exps
        .iter()
        .enumerate()
        .filter(|(_, &e)| e > 0)
        .map(|(i, &e)| {
            if e == 1 {
                names[i].clone()
            } else {
                format!("{}^{}", names[i], e)
            }
        })
        .collect();
    if vars.is_empty() {
        return match cs.strip_prefix('-') {
            Some(rest) => (true, rest.to_string()),
            None => (false, cs),
        };
    }
    let vars = vars.join("*");
    if cs.contains(' ') {
        return (false, format!("({cs})*{vars}"));
    }
    match cs.strip_prefix('-') {
        Some("1") => (true, vars),
        Some(rest) => (true, format!("{rest}*{vars}")),
        None if cs == "1" => (false, vars),
        None => (false, format!("{cs}*{vars}")),
    }
}
