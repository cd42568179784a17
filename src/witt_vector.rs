//! Truncated Witt vectors and their arithmetic.
//!
//! An element is a fixed-length tuple of base-ring coordinates owned by its
//! parent ring. Every operation dispatches on the strategy the parent
//! selected at construction and returns a fresh vector; nothing is mutated
//! in place.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive};

use crate::arith::{big_pow, exact_div};
use crate::base_ring::{BaseRing, ElementData, RingElement};
use crate::error::{Result, WittError};
use crate::finotti;
use crate::ghost::{self, WittPolynomials};
use crate::padic::ZpContext;
use crate::witt_ring::{Laws, WittVectorRing};

#[derive(Debug, Clone)]
pub struct WittVector {
    ring: WittVectorRing,
    coords: Vec<RingElement>,
}

impl PartialEq for WittVector {
    fn eq(&self, other: &Self) -> bool {
        self.ring == other.ring && self.coords == other.coords
    }
}

impl Eq for WittVector {}

impl Hash for WittVector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ring.hash(state);
        self.coords.hash(state);
    }
}

impl fmt::Display for WittVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.coords.iter().map(|c| c.to_string()).collect();
        write!(f, "({})", parts.join(", "))
    }
}

impl WittVector {
    pub(crate) fn from_parts(ring: WittVectorRing, coords: Vec<RingElement>) -> Self {
        debug_assert_eq!(coords.len(), ring.precision());
        Self { ring, coords }
    }

    pub fn ring(&self) -> &WittVectorRing {
        &self.ring
    }

    pub fn coordinates(&self) -> &[RingElement] {
        &self.coords
    }

    pub fn is_zero(&self) -> bool {
        self.coords.iter().all(|c| c.is_zero())
    }

    pub fn is_one(&self) -> bool {
        self.coords[0].is_one() && self.coords[1..].iter().all(|c| c.is_zero())
    }

    /// The ghost components `w_n = sum of p^i * x_i^(p^(n-i))`, computed in
    /// the base ring.
    pub fn ghost_components(&self) -> Vec<RingElement> {
        ghost::ghost_components(self.ring.prime(), &self.coords)
    }

    fn check_same_ring(&self, other: &Self) {
        assert_eq!(self.ring, other.ring, "Witt vectors from different rings");
    }

    pub fn add(&self, other: &Self) -> Self {
        self.check_same_ring(other);
        if other.is_zero() {
            return self.clone();
        }
        if self.is_zero() {
            return other.clone();
        }

        let coords = match self.ring.laws() {
            Laws::Standard(laws) => {
                WittPolynomials::evaluate(&laws.sums, &self.coords, &other.coords)
            }
            Laws::Finotti(table) => finotti::sum_coordinates(table, &self.coords, &other.coords),
            Laws::ZqIsomorphism(codec) => {
                codec.sum_coordinates(self.ring.base_ring(), &self.coords, &other.coords)
            }
            Laws::PInvertible { p_inverse } => {
                p_invertible_sum(&self.ring, p_inverse, &self.coords, &other.coords)
            }
        };
        Self::from_parts(self.ring.clone(), coords)
    }

    pub fn mul(&self, other: &Self) -> Self {
        self.check_same_ring(other);
        if self.is_zero() || other.is_zero() {
            return self.ring.zero();
        }
        if other.is_one() {
            return self.clone();
        }
        if self.is_one() {
            return other.clone();
        }

        let coords = match self.ring.laws() {
            Laws::Standard(laws) => {
                WittPolynomials::evaluate(&laws.prods, &self.coords, &other.coords)
            }
            Laws::Finotti(table) => finotti::prod_coordinates(table, &self.coords, &other.coords),
            Laws::ZqIsomorphism(codec) => {
                codec.prod_coordinates(self.ring.base_ring(), &self.coords, &other.coords)
            }
            Laws::PInvertible { p_inverse } => {
                p_invertible_prod(&self.ring, p_inverse, &self.coords, &other.coords)
            }
        };
        Self::from_parts(self.ring.clone(), coords)
    }

    /// In a 2-typical ring `-1` is the all-minus-one vector, so negation
    /// multiplies by it; everywhere else it is componentwise.
    pub fn neg(&self) -> Self {
        if self.ring.prime() == 2 {
            let base = self.ring.base_ring();
            let minus_ones =
                vec![base.from_i64(-1); self.ring.precision()];
            let all_minus_one = Self::from_parts(self.ring.clone(), minus_ones);
            return all_minus_one.mul(self);
        }
        let coords = self.coords.iter().map(|c| c.neg()).collect();
        Self::from_parts(self.ring.clone(), coords)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Multiplicative inverse. Fails when the 0th coordinate is not a unit
    /// or a later coordinate cannot be solved in the base ring.
    ///
    /// The inverse is found by multiplying by `(x_0^-1, Y_1, ..., Y_(n-1))`
    /// over a polynomial ring in the unknowns, equating the product with
    /// `(1, 0, ..., 0)` and solving the resulting triangular linear system
    /// one coordinate at a time.
    pub fn invert(&self) -> Result<Self> {
        if !self.coords[0].is_unit() {
            return Err(WittError::NotInvertible(self.to_string()));
        }
        if self.is_one() {
            return Ok(self.clone());
        }
        let base = self.ring.base_ring();
        let prec = self.ring.precision();
        let x0_inv = self.coords[0].inv()?;
        if prec == 1 {
            return Ok(Self::from_parts(self.ring.clone(), vec![x0_inv]));
        }

        let names: Vec<String> = (1..prec).map(|i| format!("Y{i}")).collect();
        let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let poly_base = BaseRing::polynomials(base, &name_refs);
        let poly_ring = WittVectorRing::new(&poly_base, prec, Some(self.ring.prime()), None)?;

        let lifted: Vec<RingElement> = self
            .coords
            .iter()
            .map(|c| poly_base.coerce(c))
            .collect::<Result<_>>()?;
        let mut unknowns: Vec<RingElement> = Vec::with_capacity(prec - 1);
        for i in 1..prec {
            unknowns.push(poly_base.gen(i - 1)?);
        }
        let mut inv_coords = vec![poly_base.coerce(&x0_inv)?];
        inv_coords.extend(unknowns);

        let prod = poly_ring
            .from_coordinates(&lifted)?
            .mul(&poly_ring.from_coordinates(&inv_coords)?);

        let mut solved = vec![x0_inv];
        for i in 1..prec {
            // After substituting the coordinates found so far, only Y_i
            // survives, linearly.
            let specialized = match prod.coords[i].data() {
                ElementData::Poly(f) => f.substitute(&inv_coords[1..]),
                _ => unreachable!("product lives over the polynomial ring"),
            };
            let f = match specialized.data() {
                ElementData::Poly(f) => f.clone(),
                _ => unreachable!("substitution stays in the polynomial ring"),
            };
            let constant = f.constant_coefficient();
            let linear = f.linear_coefficient(i - 1);
            let value = constant
                .neg()
                .div(&linear)
                .map_err(|_| WittError::NotInvertible(self.to_string()))?;
            inv_coords[i] = poly_base.coerce(&value)?;
            solved.push(value);
        }
        Ok(Self::from_parts(self.ring.clone(), solved))
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self> {
        self.check_same_ring(other);
        if other.is_one() {
            return Ok(self.clone());
        }
        if self.is_one() {
            return other.invert();
        }
        Ok(self.mul(&other.invert()?))
    }

    pub fn pow(&self, e: u64) -> Self {
        let mut result = self.ring.one();
        let mut square = self.clone();
        let mut e = e;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&square);
            }
            e >>= 1;
            if e > 0 {
                square = square.mul(&square);
            }
        }
        result
    }

    /// The image of an integer, via the ghost-solving recursion in mixed
    /// characteristic and via p-adic digit peeling in characteristic p.
    pub(crate) fn from_int(ring: &WittVectorRing, k: &BigInt) -> Result<Self> {
        let base = ring.base_ring();
        let p = ring.prime();
        let prec = ring.precision();

        if base.characteristic() == BigUint::from(p) {
            return Ok(Self::int_to_vector_char_p(ring, k));
        }

        let negate = k.sign() == Sign::Minus;
        let k = k.abs();

        let mut vec_k = vec![k.clone()];
        for n in 1..prec {
            let e_n = big_pow(p, n as u32).to_u32().ok_or_else(|| {
                WittError::ArithmeticOverflow(format!(
                    "{p}^{n} exceeds the supported exponent range"
                ))
            })?;
            let mut total = &k - k.pow(e_n);
            for i in 1..n {
                let e_i = big_pow(p, i as u32)
                    .to_u32()
                    .unwrap_or_else(|| unreachable!("smaller than the checked exponent"));
                total -= BigInt::from(p).pow((n - i) as u32) * vec_k[n - i].pow(e_i);
            }
            let p_n = BigInt::from(p).pow(n as u32);
            let q = match exact_div(&total, &p_n) {
                Some(q) => q,
                None => panic!("ghost residue of {k} is not divisible by {p}^{n}"),
            };
            vec_k.push(q);
        }

        if negate {
            if p == 2 {
                let coords = vec_k.iter().map(|x| base.from_int(x)).collect();
                let positive = Self::from_parts(ring.clone(), coords);
                return Ok(positive.neg());
            }
            for x in &mut vec_k {
                *x = -x.clone();
            }
        }
        let coords = vec_k.iter().map(|x| base.from_int(x)).collect();
        Ok(Self::from_parts(ring.clone(), coords))
    }

    /// Digit expansion of an integer in characteristic p, peeling
    /// Teichmueller representatives off a p-adic lift.
    fn int_to_vector_char_p(ring: &WittVectorRing, k: &BigInt) -> Self {
        let base = ring.base_ring();
        let p = ring.prime();
        let prec = ring.precision();
        let zp = ZpContext::new(p, prec as u32 + 1);

        let mut series = zp.reduce(k);
        let mut coords = Vec::with_capacity(prec);
        for _ in 0..prec {
            let digit = zp.residue(&series);
            coords.push(base.from_u64(digit));
            series = zp.shift_digit(&series, &zp.teichmuller(digit));
        }
        Self::from_parts(ring.clone(), coords)
    }
}

/// Ghost formulas with the divisions replaced by multiplication with the
/// cached inverse of p.
fn p_invertible_sum(
    ring: &WittVectorRing,
    p_inverse: &RingElement,
    x: &[RingElement],
    y: &[RingElement],
) -> Vec<RingElement> {
    let p = ring.prime();
    let mut sum = vec![x[0].add(&y[0])];
    for n in 1..ring.precision() {
        let mut acc = x[n].add(&y[n]);
        for i in 0..n {
            let e = big_pow(p, (n - i) as u32);
            let bracket = x[i]
                .pow_big(&e)
                .add(&y[i].pow_big(&e))
                .sub(&sum[i].pow_big(&e));
            acc = acc.add(&bracket.mul(&p_inverse.pow_big(&BigUint::from((n - i) as u64))));
        }
        sum.push(acc);
    }
    sum
}

fn p_invertible_prod(
    ring: &WittVectorRing,
    p_inverse: &RingElement,
    x: &[RingElement],
    y: &[RingElement],
) -> Vec<RingElement> {
    let base = ring.base_ring();
    let p = ring.prime();
    let p_int = BigInt::from(p);
    let mut prod = vec![x[0].mul(&y[0])];
    for n in 1..ring.precision() {
        let mut x_ghost = base.zero();
        let mut y_ghost = base.zero();
        let mut prod_ghost = base.zero();
        for i in 0..=n {
            let e = big_pow(p, (n - i) as u32);
            let scale = base.from_int(&p_int.pow(i as u32));
            x_ghost = x_ghost.add(&x[i].pow_big(&e).mul(&scale));
            y_ghost = y_ghost.add(&y[i].pow_big(&e).mul(&scale));
            if i < n {
                prod_ghost = prod_ghost.add(&prod[i].pow_big(&e).mul(&scale));
            }
        }
        let num = x_ghost.mul(&y_ghost).sub(&prod_ghost);
        prod.push(num.mul(&p_inverse.pow_big(&BigUint::from(n as u64))));
    }
    prod
}

// Reference-only operator impls. A by-value impl would take precedence
// over the inherent borrowing methods whenever the receiver is owned.
impl Add for &WittVector {
    type Output = WittVector;
    fn add(self, other: &WittVector) -> WittVector {
        WittVector::add(self, other)
    }
}

impl Sub for &WittVector {
    type Output = WittVector;
    fn sub(self, other: &WittVector) -> WittVector {
        WittVector::sub(self, other)
    }
}

impl Mul for &WittVector {
    type Output = WittVector;
    fn mul(self, other: &WittVector) -> WittVector {
        WittVector::mul(self, other)
    }
}

impl Neg for &WittVector {
    type Output = WittVector;
    fn neg(self) -> WittVector {
        WittVector::neg(self)
    }
}

impl Div for &WittVector {
    type Output = WittVector;
    fn div(self, other: &WittVector) -> WittVector {
        match WittVector::checked_div(self, other) {
            Ok(q) => q,
            Err(e) => panic!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Algorithm;
    use std::str::FromStr;

    fn gf3_prec4() -> WittVectorRing {
        let f3 = BaseRing::finite_field(3, 1).unwrap();
        WittVectorRing::new(&f3, 4, None, None).unwrap()
    }

    #[test]
    fn test_finite_field_arithmetic() {
        let w = gf3_prec4();
        let t = w.from_int_coordinates(&[1, 2, 0, 1]).unwrap();
        assert_eq!(t.pow(2), w.from_int_coordinates(&[1, 1, 0, 2]).unwrap());
        assert_eq!(t.neg(), w.from_int_coordinates(&[2, 1, 0, 2]).unwrap());
        let u = t.invert().unwrap();
        assert_eq!(u, w.from_int_coordinates(&[1, 1, 1, 0]).unwrap());
        assert_eq!(&u + &t, w.from_int_coordinates(&[2, 1, 1, 1]).unwrap());
        let u = t.invert().unwrap().add(&w.one());
        assert_eq!(&u * &t, w.from_int_coordinates(&[2, 0, 0, 1]).unwrap());
        assert_eq!(&u / &t, w.from_int_coordinates(&[2, 1, 2, 1]).unwrap());
    }

    #[test]
    fn test_arithmetic_does_not_consume_operands() {
        let w = gf3_prec4();
        let t = w.from_int_coordinates(&[1, 2, 0, 1]).unwrap();
        let u = w.from_int_coordinates(&[1, 1, 1, 0]).unwrap();

        // method calls on owned receivers borrow them
        let sum = t.add(&u);
        assert_eq!(sum, w.from_int_coordinates(&[2, 1, 1, 1]).unwrap());
        assert_eq!(sum, &t + &u);
        assert_eq!(t.mul(&u), &t * &u);
        assert_eq!(t.sub(&u), &t - &u);
        assert_eq!(t.neg(), -&t);

        // an operand may appear on both sides
        assert_eq!(t.mul(&t), t.pow(2));

        // and every operand stays usable afterwards
        assert_eq!(sum.sub(&u), t);
    }

    #[test]
    fn test_standard_algorithm_over_integers() {
        let zz = BaseRing::integers();
        let w = WittVectorRing::new(&zz, 2, Some(5), None).unwrap();
        assert_eq!(w.algorithm(), Algorithm::Standard);
        let a = w.from_int_coordinates(&[4, 10]).unwrap();
        let b = w.from_int_coordinates(&[-5, 12, 1]).unwrap();
        assert_eq!(&a * &b, w.from_int_coordinates(&[-20, -18362]).unwrap());
        let c = w.from_int_coordinates(&[1, 2, 3]).unwrap();
        let d = w.from_int_coordinates(&[1, 2]).unwrap();
        assert_eq!(&c + &d, w.from_int_coordinates(&[2, -2]).unwrap());
    }

    #[test]
    fn test_integer_image_mixed_characteristic() {
        let zz = BaseRing::integers();
        let w = WittVectorRing::new(&zz, 2, Some(23), None).unwrap();
        let v = w.from_i64(-123).unwrap();
        let huge =
            BigInt::from_str("50826444131062300759362981690761165250849615528").unwrap();
        assert_eq!(v.coordinates()[0], zz.from_i64(-123));
        assert_eq!(v.coordinates()[1], zz.from_int(&huge));
    }

    #[test]
    fn test_integer_image_char_p() {
        let f13 = BaseRing::finite_field(13, 1).unwrap();
        let w = WittVectorRing::new(&f13, 3, Some(13), None).unwrap();
        assert_eq!(
            w.from_i64(11).unwrap(),
            w.from_int_coordinates(&[11, 7, 4]).unwrap()
        );

        let f25 = BaseRing::finite_field(5, 2).unwrap();
        let w = WittVectorRing::new(&f25, 3, Some(5), None).unwrap();
        assert_eq!(w.algorithm(), Algorithm::ZqIsomorphism);
        assert_eq!(
            w.from_i64(12).unwrap(),
            w.from_int_coordinates(&[2, 1, 3]).unwrap()
        );
    }

    #[test]
    fn test_product_over_composite_modulus() {
        let z6 = BaseRing::integers_mod_u64(6).unwrap();
        let w = WittVectorRing::new(&z6, 4, Some(3), None).unwrap();
        assert_eq!(w.algorithm(), Algorithm::Standard);
        let a = w.from_int_coordinates(&[1, 2, 3, 4]).unwrap();
        let b = w.from_int_coordinates(&[4, 5, 0, 0]).unwrap();
        assert_eq!(&a * &b, w.from_int_coordinates(&[4, 1, 3, 4]).unwrap());
    }

    #[test]
    fn test_finotti_over_polynomial_base() {
        let f3 = BaseRing::finite_field(3, 1).unwrap();
        let poly = BaseRing::polynomials(&f3, &["X1", "X2", "Y1", "Y2"]);
        let w = WittVectorRing::new(&poly, 2, Some(3), None).unwrap();
        assert_eq!(w.algorithm(), Algorithm::Finotti);

        let x1 = poly.gen(0).unwrap();
        let x2 = poly.gen(1).unwrap();
        let y1 = poly.gen(2).unwrap();
        let y2 = poly.gen(3).unwrap();
        let a = w.from_coordinates(&[x1.clone(), x2.clone()]).unwrap();
        let b = w.from_coordinates(&[y1.clone(), y2.clone()]).unwrap();

        let s = a.add(&b);
        assert_eq!(s.coordinates()[0], x1.add(&y1));
        let x1sq_y1 = x1.mul(&x1).mul(&y1);
        let x1_y1sq = x1.mul(&y1).mul(&y1);
        assert_eq!(
            s.coordinates()[1],
            x2.add(&y2).sub(&x1sq_y1).sub(&x1_y1sq)
        );

        let m = a.mul(&b);
        assert_eq!(m.coordinates()[0], x1.mul(&y1));
        let expect = x2
            .mul(&y1.pow_big(&BigUint::from(3u64)))
            .add(&x1.pow_big(&BigUint::from(3u64)).mul(&y2));
        assert_eq!(m.coordinates()[1], expect);
    }

    #[test]
    fn test_p_invertible_matches_standard() {
        let z7 = BaseRing::integers_mod_u64(7).unwrap();
        let auto = WittVectorRing::new(&z7, 3, Some(5), None).unwrap();
        assert_eq!(auto.algorithm(), Algorithm::PInvertible);
        let std = WittVectorRing::new(&z7, 3, Some(5), Some(Algorithm::Standard)).unwrap();

        for (a, b) in [(2i64, 3i64), (6, 5), (4, 4)] {
            let xs: Vec<i64> = vec![a, b, a + b];
            let ys: Vec<i64> = vec![b, a, a * b];
            let x1 = auto.from_int_coordinates(&xs).unwrap();
            let y1 = auto.from_int_coordinates(&ys).unwrap();
            let x2 = std.from_int_coordinates(&xs).unwrap();
            let y2 = std.from_int_coordinates(&ys).unwrap();
            assert_eq!(x1.add(&y1).coordinates(), x2.add(&y2).coordinates());
            assert_eq!(x1.mul(&y1).coordinates(), x2.mul(&y2).coordinates());
        }
    }

    #[test]
    fn test_integer_embedding_is_a_ring_map() {
        let bases = [
            BaseRing::integers(),
            BaseRing::integers_mod_u64(7).unwrap(),
            BaseRing::finite_field(5, 2).unwrap(),
            BaseRing::finite_field(3, 1).unwrap(),
        ];
        let primes = [5u64, 5, 5, 3];
        for (base, p) in bases.iter().zip(primes) {
            let w = WittVectorRing::new(base, 3, Some(p), None).unwrap();
            let two = w.from_i64(2).unwrap();
            let three = w.from_i64(3).unwrap();
            assert_eq!(two.add(&three), w.from_i64(5).unwrap(), "{w}");
            assert_eq!(two.mul(&three), w.from_i64(6).unwrap(), "{w}");
        }
    }

    #[test]
    fn test_ghost_components_of_integer_image() {
        let zz = BaseRing::integers();
        let w = WittVectorRing::new(&zz, 3, Some(5), None).unwrap();
        let v = w.from_i64(7).unwrap();
        for g in v.ghost_components() {
            assert_eq!(g, zz.from_i64(7));
        }
    }

    #[test]
    fn test_negation_in_characteristic_two() {
        let f2 = BaseRing::finite_field(2, 1).unwrap();
        let w = WittVectorRing::new(&f2, 3, None, None).unwrap();
        let minus_one = w.from_i64(-1).unwrap();
        assert_eq!(minus_one, w.from_int_coordinates(&[1, 1, 1]).unwrap());

        let x = w.from_int_coordinates(&[1, 1, 0]).unwrap();
        assert!(x.add(&x.neg()).is_zero());

        // mixed characteristic with p = 2 takes the same all-minus-one path
        let zz = BaseRing::integers();
        let w = WittVectorRing::new(&zz, 3, Some(2), None).unwrap();
        let neg = w.from_i64(-3).unwrap();
        assert!(neg.add(&w.from_i64(3).unwrap()).is_zero());
    }

    #[test]
    fn test_invert_requires_unit_leading_coordinate() {
        let w = gf3_prec4();
        let t = w.from_int_coordinates(&[0, 1, 2, 1]).unwrap();
        assert!(matches!(t.invert(), Err(WittError::NotInvertible(_))));

        let z6 = BaseRing::integers_mod_u64(6).unwrap();
        let w = WittVectorRing::new(&z6, 2, Some(3), None).unwrap();
        let t = w.from_int_coordinates(&[2, 1]).unwrap();
        assert!(t.invert().is_err());
    }

    #[test]
    #[should_panic(expected = "does not exist")]
    fn test_division_by_non_unit_panics() {
        let w = gf3_prec4();
        let t = w.from_int_coordinates(&[1, 2, 0, 1]).unwrap();
        let z = w.from_int_coordinates(&[0, 1, 0, 0]).unwrap();
        let _ = &t / &z;
    }

    #[test]
    fn test_truncating_coercion_between_rings() {
        let f5 = BaseRing::finite_field(5, 1).unwrap();
        let f25 = BaseRing::finite_field(5, 2).unwrap();
        let w5 = WittVectorRing::new(&f5, 3, Some(5), None).unwrap();
        let w25 = WittVectorRing::new(&f25, 2, Some(5), None).unwrap();

        let v = w5.from_int_coordinates(&[3, 1, 4]).unwrap();
        let moved = w25.from_witt(&v).unwrap();
        assert_eq!(moved, w25.from_int_coordinates(&[3, 1]).unwrap());

        assert!(w5.from_witt(&moved).is_err());
    }

    #[test]
    fn test_coordinate_sequence_length_rules() {
        let w = gf3_prec4();
        assert!(matches!(
            w.from_int_coordinates(&[1, 2]),
            Err(WittError::WrongLength { expected: 4, got: 2 })
        ));
        let five = w.from_int_coordinates(&[1, 2, 0, 1, 2]).unwrap();
        assert_eq!(five.coordinates().len(), 4);
    }
}
