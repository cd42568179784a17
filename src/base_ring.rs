//! The coefficient rings Witt vectors are built over.
//!
//! `BaseRing` is a cheap-to-clone handle (an `Arc` around the ring data) and
//! `RingElement` carries its parent handle, so elements of different rings
//! can never be combined silently. Four families are supported: the integers,
//! the integers modulo n, the finite fields GF(p^k) and sparse multivariate
//! polynomial rings over any of these.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};
use std::sync::Arc;

use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Signed, ToPrimitive, Zero};
use rand::Rng;

use crate::arith::{big_gcd, big_mod_inverse, exact_div, is_prime_u64, reduce_mod};
use crate::error::{Result, WittError};
use crate::finite_field::FqContext;
use crate::polynomial::MPoly;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum RingRepr {
    Integers,
    IntegersMod { modulus: BigUint },
    FiniteField(FqContext),
    Polynomials { base: BaseRing, vars: Vec<String> },
}

/// Handle to one of the supported commutative rings.
#[derive(Debug, Clone)]
pub struct BaseRing(Arc<RingRepr>);

impl PartialEq for BaseRing {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for BaseRing {}

impl Hash for BaseRing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl BaseRing {
    pub fn integers() -> Self {
        Self(Arc::new(RingRepr::Integers))
    }

    pub fn integers_mod(modulus: BigUint) -> Result<Self> {
        if modulus < BigUint::from(2u32) {
            return Err(WittError::InvalidModulus {
                modulus: modulus.to_string(),
            });
        }
        Ok(Self(Arc::new(RingRepr::IntegersMod { modulus })))
    }

    pub fn integers_mod_u64(modulus: u64) -> Result<Self> {
        Self::integers_mod(BigUint::from(modulus))
    }

    pub fn finite_field(p: u64, degree: usize) -> Result<Self> {
        Ok(Self(Arc::new(RingRepr::FiniteField(FqContext::new(
            p, degree,
        )?))))
    }

    pub fn finite_field_with_modulus(p: u64, modulus: Vec<u64>) -> Result<Self> {
        Ok(Self(Arc::new(RingRepr::FiniteField(
            FqContext::with_modulus(p, modulus)?,
        ))))
    }

    pub fn polynomials(base: &BaseRing, vars: &[&str]) -> Self {
        assert!(!vars.is_empty(), "polynomial ring needs at least one variable");
        Self(Arc::new(RingRepr::Polynomials {
            base: base.clone(),
            vars: vars.iter().map(|s| s.to_string()).collect(),
        }))
    }

    pub(crate) fn repr(&self) -> &RingRepr {
        &self.0
    }

    pub(crate) fn fq_context(&self) -> Option<&FqContext> {
        match self.repr() {
            RingRepr::FiniteField(f) => Some(f),
            _ => None,
        }
    }

    pub fn poly_base(&self) -> Option<&BaseRing> {
        match self.repr() {
            RingRepr::Polynomials { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn var_names(&self) -> Option<&[String]> {
        match self.repr() {
            RingRepr::Polynomials { vars, .. } => Some(vars),
            _ => None,
        }
    }

    pub fn zero(&self) -> RingElement {
        self.from_int(&BigInt::zero())
    }

    pub fn one(&self) -> RingElement {
        self.from_int(&BigInt::one())
    }

    /// Canonical image of an integer in this ring.
    pub fn from_int(&self, k: &BigInt) -> RingElement {
        let data = match self.repr() {
            RingRepr::Integers => ElementData::Int(k.clone()),
            RingRepr::IntegersMod { modulus } => ElementData::Mod(reduce_mod(k, modulus)),
            RingRepr::FiniteField(f) => {
                let r = reduce_mod(k, &BigUint::from(f.p()));
                ElementData::Fq(f.from_u64(r.to_u64().unwrap_or(0)))
            }
            RingRepr::Polynomials { base, vars } => {
                ElementData::Poly(MPoly::constant(base, vars.len(), base.from_int(k)))
            }
        };
        RingElement {
            ring: self.clone(),
            data,
        }
    }

    pub fn from_i64(&self, k: i64) -> RingElement {
        self.from_int(&BigInt::from(k))
    }

    pub fn from_u64(&self, k: u64) -> RingElement {
        self.from_int(&BigInt::from(k))
    }

    /// The i-th generator: a polynomial variable, or the multiplicative
    /// generator class of a finite field.
    pub fn gen(&self, i: usize) -> Result<RingElement> {
        match self.repr() {
            RingRepr::Polynomials { base, vars } => {
                if i >= vars.len() {
                    return Err(WittError::NotInBaseRing {
                        value: format!("generator {i}"),
                        ring: self.to_string(),
                    });
                }
                Ok(RingElement {
                    ring: self.clone(),
                    data: ElementData::Poly(MPoly::var(base, vars.len(), i)),
                })
            }
            RingRepr::FiniteField(f) if i == 0 => Ok(RingElement {
                ring: self.clone(),
                data: ElementData::Fq(f.generator()),
            }),
            _ => Err(WittError::NotInBaseRing {
                value: format!("generator {i}"),
                ring: self.to_string(),
            }),
        }
    }

    pub fn characteristic(&self) -> BigUint {
        match self.repr() {
            RingRepr::Integers => BigUint::zero(),
            RingRepr::IntegersMod { modulus } => modulus.clone(),
            RingRepr::FiniteField(f) => BigUint::from(f.p()),
            RingRepr::Polynomials { base, .. } => base.characteristic(),
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(
            self.repr(),
            RingRepr::IntegersMod { .. } | RingRepr::FiniteField(_)
        )
    }

    pub fn is_finite_field(&self) -> bool {
        matches!(self.repr(), RingRepr::FiniteField(_))
    }

    pub fn cardinality(&self) -> Option<BigUint> {
        match self.repr() {
            RingRepr::IntegersMod { modulus } => Some(modulus.clone()),
            RingRepr::FiniteField(f) => Some(f.order()),
            _ => None,
        }
    }

    /// All elements of a finite ring, in a fixed order starting from zero.
    pub fn elements(&self) -> Result<Vec<RingElement>> {
        match self.repr() {
            RingRepr::IntegersMod { modulus } => {
                let n = modulus.to_usize().ok_or_else(|| {
                    WittError::ArithmeticOverflow(format!(
                        "cannot enumerate {modulus} residues"
                    ))
                })?;
                Ok((0..n)
                    .map(|v| RingElement {
                        ring: self.clone(),
                        data: ElementData::Mod(BigUint::from(v)),
                    })
                    .collect())
            }
            RingRepr::FiniteField(f) => Ok(f
                .elements()?
                .into_iter()
                .map(|x| RingElement {
                    ring: self.clone(),
                    data: ElementData::Fq(x),
                })
                .collect()),
            _ => Err(WittError::NotEnumerable(self.to_string())),
        }
    }

    pub fn random_element(&self, rng: &mut impl Rng) -> RingElement {
        let data = match self.repr() {
            RingRepr::Integers => ElementData::Int(rng.gen_bigint(64)),
            RingRepr::IntegersMod { modulus } => {
                ElementData::Mod(rng.gen_biguint_below(modulus))
            }
            RingRepr::FiniteField(f) => ElementData::Fq(f.random(rng)),
            RingRepr::Polynomials { base, vars } => {
                let c = base.random_element(rng);
                ElementData::Poly(MPoly::constant(base, vars.len(), c))
            }
        };
        RingElement {
            ring: self.clone(),
            data,
        }
    }

    pub fn has_coerce_map_from(&self, other: &BaseRing) -> bool {
        if self == other {
            return true;
        }
        match self.repr() {
            RingRepr::Integers => false,
            RingRepr::IntegersMod { modulus } => match other.repr() {
                RingRepr::Integers => true,
                RingRepr::IntegersMod { modulus: m } => (m % modulus).is_zero(),
                _ => false,
            },
            RingRepr::FiniteField(f) => match other.repr() {
                RingRepr::Integers => true,
                RingRepr::IntegersMod { modulus } => *modulus == BigUint::from(f.p()),
                RingRepr::FiniteField(g) => g.p() == f.p() && g.degree() == 1,
                _ => false,
            },
            RingRepr::Polynomials { base, .. } => base.has_coerce_map_from(other),
        }
    }

    /// Maps `x` into this ring along the canonical coercion, if one exists.
    pub fn coerce(&self, x: &RingElement) -> Result<RingElement> {
        if &x.ring == self {
            return Ok(x.clone());
        }
        let no_coercion = || WittError::NoCoercion {
            from: x.ring.to_string(),
            to: self.to_string(),
        };
        let data = match (self.repr(), x.ring.repr(), &x.data) {
            (RingRepr::IntegersMod { modulus }, RingRepr::Integers, ElementData::Int(k)) => {
                ElementData::Mod(reduce_mod(k, modulus))
            }
            (
                RingRepr::IntegersMod { modulus },
                RingRepr::IntegersMod { modulus: m },
                ElementData::Mod(v),
            ) => {
                if !(m % modulus).is_zero() {
                    return Err(no_coercion());
                }
                ElementData::Mod(v % modulus)
            }
            (RingRepr::FiniteField(_), RingRepr::Integers, ElementData::Int(k)) => {
                return Ok(self.from_int(k));
            }
            (
                RingRepr::FiniteField(f),
                RingRepr::IntegersMod { modulus },
                ElementData::Mod(v),
            ) => {
                if *modulus != BigUint::from(f.p()) {
                    return Err(no_coercion());
                }
                ElementData::Fq(f.from_u64(v.to_u64().unwrap_or(0)))
            }
            (RingRepr::FiniteField(f), RingRepr::FiniteField(g), ElementData::Fq(xs)) => {
                if g.p() != f.p() || g.degree() != 1 {
                    return Err(no_coercion());
                }
                ElementData::Fq(f.from_u64(xs[0]))
            }
            (RingRepr::Polynomials { base, vars }, _, _) => {
                if !base.has_coerce_map_from(&x.ring) {
                    return Err(no_coercion());
                }
                ElementData::Poly(MPoly::constant(base, vars.len(), base.coerce(x)?))
            }
            _ => return Err(no_coercion()),
        };
        Ok(RingElement {
            ring: self.clone(),
            data,
        })
    }
}

impl fmt::Display for BaseRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.repr() {
            RingRepr::Integers => write!(f, "Integer Ring"),
            RingRepr::IntegersMod { modulus } => {
                write!(f, "Ring of integers modulo {modulus}")
            }
            RingRepr::FiniteField(fq) => {
                if fq.degree() == 1 {
                    write!(f, "Finite Field of size {}", fq.p())
                } else {
                    write!(
                        f,
                        "Finite Field in {} of size {}^{}",
                        fq.gen_name(),
                        fq.p(),
                        fq.degree()
                    )
                }
            }
            RingRepr::Polynomials { base, vars } => {
                write!(
                    f,
                    "Multivariate Polynomial Ring in {} over {}",
                    vars.join(", "),
                    base
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ElementData {
    Int(BigInt),
    Mod(BigUint),
    Fq(Vec<u64>),
    Poly(MPoly),
}

/// An element of a `BaseRing`. Binary operations require both operands to
/// come from the same ring and panic otherwise, like mismatched lengths do
/// elsewhere in the crate.
#[derive(Debug, Clone)]
pub struct RingElement {
    ring: BaseRing,
    data: ElementData,
}

impl PartialEq for RingElement {
    fn eq(&self, other: &Self) -> bool {
        self.ring == other.ring && self.data == other.data
    }
}

impl Eq for RingElement {}

impl Hash for RingElement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ring.hash(state);
        self.data.hash(state);
    }
}

impl RingElement {
    pub fn parent(&self) -> &BaseRing {
        &self.ring
    }

    pub(crate) fn data(&self) -> &ElementData {
        &self.data
    }

    pub(crate) fn from_parts(ring: BaseRing, data: ElementData) -> Self {
        Self { ring, data }
    }

    pub fn is_zero(&self) -> bool {
        match &self.data {
            ElementData::Int(a) => a.is_zero(),
            ElementData::Mod(v) => v.is_zero(),
            ElementData::Fq(x) => x.iter().all(|&c| c == 0),
            ElementData::Poly(p) => p.is_zero(),
        }
    }

    pub fn is_one(&self) -> bool {
        match &self.data {
            ElementData::Int(a) => a.is_one(),
            ElementData::Mod(v) => v.is_one(),
            ElementData::Fq(x) => x[0] == 1 && x[1..].iter().all(|&c| c == 0),
            ElementData::Poly(p) => p.is_constant() && p.constant_coefficient().is_one(),
        }
    }

    pub fn is_unit(&self) -> bool {
        match (self.ring.repr(), &self.data) {
            (RingRepr::Integers, ElementData::Int(a)) => a.abs().is_one(),
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(v)) => {
                big_gcd(v, modulus).is_one()
            }
            (RingRepr::FiniteField(_), _) => !self.is_zero(),
            (RingRepr::Polynomials { .. }, ElementData::Poly(p)) => {
                p.is_constant() && p.constant_coefficient().is_unit()
            }
            _ => unreachable!("element data does not match ring"),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.ring, other.ring, "elements from different rings");
        let data = match (self.ring.repr(), &self.data, &other.data) {
            (RingRepr::Integers, ElementData::Int(a), ElementData::Int(b)) => {
                ElementData::Int(a + b)
            }
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(a), ElementData::Mod(b)) => {
                ElementData::Mod((a + b) % modulus)
            }
            (RingRepr::FiniteField(f), ElementData::Fq(a), ElementData::Fq(b)) => {
                ElementData::Fq(f.add(a, b))
            }
            (RingRepr::Polynomials { .. }, ElementData::Poly(a), ElementData::Poly(b)) => {
                ElementData::Poly(a.add(b))
            }
            _ => unreachable!("element data does not match ring"),
        };
        Self {
            ring: self.ring.clone(),
            data,
        }
    }

    pub fn sub(&self, other: &Self) -> Self {
        assert_eq!(self.ring, other.ring, "elements from different rings");
        let data = match (self.ring.repr(), &self.data, &other.data) {
            (RingRepr::Integers, ElementData::Int(a), ElementData::Int(b)) => {
                ElementData::Int(a - b)
            }
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(a), ElementData::Mod(b)) => {
                ElementData::Mod((a + (modulus - b)) % modulus)
            }
            (RingRepr::FiniteField(f), ElementData::Fq(a), ElementData::Fq(b)) => {
                ElementData::Fq(f.sub(a, b))
            }
            (RingRepr::Polynomials { .. }, ElementData::Poly(a), ElementData::Poly(b)) => {
                ElementData::Poly(a.sub(b))
            }
            _ => unreachable!("element data does not match ring"),
        };
        Self {
            ring: self.ring.clone(),
            data,
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        assert_eq!(self.ring, other.ring, "elements from different rings");
        let data = match (self.ring.repr(), &self.data, &other.data) {
            (RingRepr::Integers, ElementData::Int(a), ElementData::Int(b)) => {
                ElementData::Int(a * b)
            }
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(a), ElementData::Mod(b)) => {
                ElementData::Mod((a * b) % modulus)
            }
            (RingRepr::FiniteField(f), ElementData::Fq(a), ElementData::Fq(b)) => {
                ElementData::Fq(f.mul(a, b))
            }
            (RingRepr::Polynomials { .. }, ElementData::Poly(a), ElementData::Poly(b)) => {
                ElementData::Poly(a.mul(b))
            }
            _ => unreachable!("element data does not match ring"),
        };
        Self {
            ring: self.ring.clone(),
            data,
        }
    }

    pub fn neg(&self) -> Self {
        let data = match (self.ring.repr(), &self.data) {
            (RingRepr::Integers, ElementData::Int(a)) => ElementData::Int(-a),
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(v)) => {
                ElementData::Mod((modulus - v) % modulus)
            }
            (RingRepr::FiniteField(f), ElementData::Fq(x)) => ElementData::Fq(f.neg(x)),
            (RingRepr::Polynomials { .. }, ElementData::Poly(p)) => ElementData::Poly(p.neg()),
            _ => unreachable!("element data does not match ring"),
        };
        Self {
            ring: self.ring.clone(),
            data,
        }
    }

    pub fn inv(&self) -> Result<Self> {
        let not_invertible = || WittError::NotInvertible(self.to_string());
        let data = match (self.ring.repr(), &self.data) {
            (RingRepr::Integers, ElementData::Int(a)) => {
                if a.abs().is_one() {
                    ElementData::Int(a.clone())
                } else {
                    return Err(not_invertible());
                }
            }
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(v)) => {
                ElementData::Mod(big_mod_inverse(v, modulus).ok_or_else(not_invertible)?)
            }
            (RingRepr::FiniteField(f), ElementData::Fq(x)) => {
                ElementData::Fq(f.inv(x).ok_or_else(not_invertible)?)
            }
            (RingRepr::Polynomials { base, vars }, ElementData::Poly(p)) => {
                if !p.is_constant() {
                    return Err(not_invertible());
                }
                let c = p.constant_coefficient().inv().map_err(|_| not_invertible())?;
                ElementData::Poly(MPoly::constant(base, vars.len(), c))
            }
            _ => unreachable!("element data does not match ring"),
        };
        Ok(Self {
            ring: self.ring.clone(),
            data,
        })
    }

    /// Division: multiplication by the inverse where one exists, with exact
    /// quotients over the integers.
    pub fn div(&self, other: &Self) -> Result<Self> {
        assert_eq!(self.ring, other.ring, "elements from different rings");
        match (self.ring.repr(), &self.data, &other.data) {
            (RingRepr::Integers, ElementData::Int(a), ElementData::Int(b)) => {
                let q = exact_div(a, b)
                    .ok_or_else(|| WittError::NotInvertible(other.to_string()))?;
                Ok(Self {
                    ring: self.ring.clone(),
                    data: ElementData::Int(q),
                })
            }
            _ => Ok(self.mul(&other.inv()?)),
        }
    }

    pub fn pow_big(&self, e: &BigUint) -> Self {
        let data = match (self.ring.repr(), &self.data) {
            (RingRepr::Integers, ElementData::Int(a)) => {
                let exp = match e.to_u32() {
                    Some(v) => v,
                    None => panic!("exponent {e} exceeds the supported range"),
                };
                ElementData::Int(a.pow(exp))
            }
            (RingRepr::IntegersMod { modulus }, ElementData::Mod(v)) => {
                ElementData::Mod(v.modpow(e, modulus))
            }
            (RingRepr::FiniteField(f), ElementData::Fq(x)) => ElementData::Fq(f.pow(x, e)),
            (RingRepr::Polynomials { .. }, ElementData::Poly(p)) => {
                let ch = self.ring.characteristic();
                let char_p = ch.to_u64().filter(|&c| is_prime_u64(c));
                match char_p {
                    Some(c) => ElementData::Poly(p.pow_char_p(e, c)),
                    None => {
                        let exp = match e.to_u32() {
                            Some(v) => v,
                            None => panic!("exponent {e} exceeds the supported range"),
                        };
                        ElementData::Poly(p.pow_u32(exp))
                    }
                }
            }
            _ => unreachable!("element data does not match ring"),
        };
        Self {
            ring: self.ring.clone(),
            data,
        }
    }

    pub fn pow_u64(&self, e: u64) -> Self {
        self.pow_big(&BigUint::from(e))
    }
}

impl fmt::Display for RingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ring.repr(), &self.data) {
            (_, ElementData::Int(a)) => write!(f, "{a}"),
            (_, ElementData::Mod(v)) => write!(f, "{v}"),
            (RingRepr::FiniteField(ctx), ElementData::Fq(x)) => write!(f, "{}", ctx.format(x)),
            (RingRepr::Polynomials { vars, .. }, ElementData::Poly(p)) => {
                write!(f, "{}", p.format(vars))
            }
            _ => unreachable!("element data does not match ring"),
        }
    }
}

// Reference-only operator impls, as for Witt vectors: a by-value impl
// would take precedence over the inherent borrowing methods whenever
// the receiver is owned.
impl Add for &RingElement {
    type Output = RingElement;
    fn add(self, other: &RingElement) -> RingElement {
        RingElement::add(self, other)
    }
}

impl Sub for &RingElement {
    type Output = RingElement;
    fn sub(self, other: &RingElement) -> RingElement {
        RingElement::sub(self, other)
    }
}

impl Mul for &RingElement {
    type Output = RingElement;
    fn mul(self, other: &RingElement) -> RingElement {
        RingElement::mul(self, other)
    }
}

impl Neg for &RingElement {
    type Output = RingElement;
    fn neg(self) -> RingElement {
        RingElement::neg(self)
    }
}
