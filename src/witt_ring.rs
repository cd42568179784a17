//! Rings of truncated p-typical Witt vectors.
//!
//! A ring is parametrized by a coefficient ring, a truncation length, a
//! prime and one of four arithmetic strategies. The strategy data (law
//! polynomials, binomial table, series codec or the inverse of p) is
//! computed once at construction and shared by every element, and ring
//! instances themselves are memoized per parameter tuple so repeated
//! construction never redoes the expensive setup.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use num_bigint::{BigInt, BigUint};
use rand::Rng;

use crate::algorithm::{select, Algorithm};
use crate::arith::big_pow;
use crate::base_ring::{BaseRing, RingElement};
use crate::error::{Result, WittError};
use crate::finotti::BinomialTable;
use crate::ghost::WittPolynomials;
use crate::isomorphism::SeriesCodec;
use crate::witt_vector::WittVector;

/// The per-algorithm data the ring laws run on.
#[derive(Debug)]
pub(crate) enum Laws {
    Standard(WittPolynomials),
    PInvertible { p_inverse: RingElement },
    Finotti(BinomialTable),
    ZqIsomorphism(SeriesCodec),
}

#[derive(Debug)]
struct WittRingRepr {
    base: BaseRing,
    precision: usize,
    prime: u64,
    algorithm: Algorithm,
    laws: Laws,
}

/// A ring of truncated p-typical Witt vectors over a commutative base.
///
/// Handles are cheap to clone and compare; two handles built from the same
/// `(base, precision, prime, algorithm)` tuple share their precomputed law
/// data through the global registry.
#[derive(Debug, Clone)]
pub struct WittVectorRing(Arc<WittRingRepr>);

/// Registry of ring instances, keyed by the full parameter tuple.
static WITT_RING_CACHE: std::sync::LazyLock<
    Mutex<HashMap<(BaseRing, usize, u64, Algorithm), Arc<WittRingRepr>>>,
> = std::sync::LazyLock::new(|| Mutex::new(HashMap::new()));

impl WittVectorRing {
    /// Builds (or fetches from the registry) the Witt vector ring over
    /// `base` with the given truncation length.
    ///
    /// `prime` defaults to the characteristic of `base`, which must then be
    /// prime. `algorithm` defaults to the most adequate strategy for the
    /// parameters; an explicit choice is validated against its
    /// preconditions.
    pub fn new(
        base: &BaseRing,
        precision: usize,
        prime: Option<u64>,
        algorithm: Option<Algorithm>,
    ) -> Result<Self> {
        let (prime, algorithm) = select(base, precision, prime, algorithm)?;
        let key = (base.clone(), precision, prime, algorithm);

        {
            let cache = WITT_RING_CACHE.lock().unwrap();
            if let Some(repr) = cache.get(&key) {
                return Ok(Self(Arc::clone(repr)));
            }
        }

        let laws = match algorithm {
            Algorithm::Standard => {
                Laws::Standard(WittPolynomials::generate(base, prime, precision)?)
            }
            Algorithm::PInvertible => Laws::PInvertible {
                p_inverse: base.from_u64(prime).inv()?,
            },
            Algorithm::Finotti => Laws::Finotti(BinomialTable::generate(prime, precision)?),
            Algorithm::ZqIsomorphism => {
                let field = match base.fq_context() {
                    Some(f) => f,
                    None => unreachable!("selector admits Zq_isomorphism only over finite fields"),
                };
                Laws::ZqIsomorphism(SeriesCodec::new(field, precision))
            }
        };
        let repr = Arc::new(WittRingRepr {
            base: base.clone(),
            precision,
            prime,
            algorithm,
            laws,
        });

        let mut cache = WITT_RING_CACHE.lock().unwrap();
        let repr = Arc::clone(cache.entry(key).or_insert(repr));
        Ok(Self(repr))
    }

    pub fn base_ring(&self) -> &BaseRing {
        &self.0.base
    }

    pub fn precision(&self) -> usize {
        self.0.precision
    }

    pub fn prime(&self) -> u64 {
        self.0.prime
    }

    pub fn algorithm(&self) -> Algorithm {
        self.0.algorithm
    }

    pub(crate) fn laws(&self) -> &Laws {
        &self.0.laws
    }

    /// The characteristic of the ring. When p is invertible in the base,
    /// `W_n(R)` is isomorphic to `R^n` and the characteristic is that of
    /// the base; otherwise it picks up a factor `p^(n-1)` (Dennerlein,
    /// "Computational Aspects of Mixed Characteristic Witt Vectors",
    /// Corollary 3.3).
    pub fn characteristic(&self) -> BigUint {
        let base = &self.0.base;
        if base.from_u64(self.0.prime).is_unit() {
            return base.characteristic();
        }
        big_pow(self.0.prime, self.0.precision as u32 - 1) * base.characteristic()
    }

    pub fn is_finite(&self) -> bool {
        self.0.base.is_finite()
    }

    /// `None` when the base ring is infinite.
    pub fn cardinality(&self) -> Option<BigUint> {
        self.0
            .base
            .cardinality()
            .map(|c| c.pow(self.0.precision as u32))
    }

    pub fn zero(&self) -> WittVector {
        WittVector::from_parts(
            self.clone(),
            vec![self.0.base.zero(); self.0.precision],
        )
    }

    pub fn one(&self) -> WittVector {
        let mut coords = vec![self.0.base.zero(); self.0.precision];
        coords[0] = self.0.base.one();
        WittVector::from_parts(self.clone(), coords)
    }

    /// The image of an integer under the unique ring map from the
    /// integers.
    pub fn from_int(&self, k: &BigInt) -> Result<WittVector> {
        WittVector::from_int(self, k)
    }

    pub fn from_i64(&self, k: i64) -> Result<WittVector> {
        self.from_int(&BigInt::from(k))
    }

    /// Builds an element from a coordinate sequence. The sequence must
    /// have at least `precision` entries, each convertible into the base
    /// ring; extra entries are discarded.
    pub fn from_coordinates(&self, coords: &[RingElement]) -> Result<WittVector> {
        if coords.len() < self.0.precision {
            return Err(WittError::WrongLength {
                expected: self.0.precision,
                got: coords.len(),
            });
        }
        let coords = coords[..self.0.precision]
            .iter()
            .map(|c| self.0.base.coerce(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(WittVector::from_parts(self.clone(), coords))
    }

    /// Convenience constructor from small integer coordinates.
    pub fn from_int_coordinates(&self, coords: &[i64]) -> Result<WittVector> {
        let coords: Vec<RingElement> =
            coords.iter().map(|&c| self.0.base.from_i64(c)).collect();
        self.from_coordinates(&coords)
    }

    /// Re-coordinates a vector from another Witt vector ring. The source
    /// ring must have at least this ring's precision and a base whose
    /// elements convert into this base.
    pub fn from_witt(&self, v: &WittVector) -> Result<WittVector> {
        if v.ring().precision() < self.0.precision {
            return Err(WittError::WrongLength {
                expected: self.0.precision,
                got: v.ring().precision(),
            });
        }
        if !self.0.base.has_coerce_map_from(v.ring().base_ring()) {
            return Err(WittError::NoCoercion {
                from: v.ring().base_ring().to_string(),
                to: self.0.base.to_string(),
            });
        }
        self.from_coordinates(v.coordinates())
    }

    /// Whether elements of `other` convert canonically into this ring.
    pub fn has_coerce_map_from(&self, other: &WittVectorRing) -> bool {
        other.precision() >= self.0.precision
            && self.0.base.has_coerce_map_from(other.base_ring())
    }

    /// Embeds a base-ring element as `(x, 0, ..., 0)`. The lift is
    /// multiplicative.
    pub fn teichmuller_lift(&self, x: &RingElement) -> Result<WittVector> {
        let x = self.0.base.coerce(x).map_err(|_| WittError::NotInBaseRing {
            value: x.to_string(),
            ring: self.0.base.to_string(),
        })?;
        let mut coords = vec![self.0.base.zero(); self.0.precision];
        coords[0] = x;
        Ok(WittVector::from_parts(self.clone(), coords))
    }

    pub fn random_element(&self, rng: &mut impl Rng) -> WittVector {
        let coords = (0..self.0.precision)
            .map(|_| self.0.base.random_element(rng))
            .collect();
        WittVector::from_parts(self.clone(), coords)
    }

    /// Iterates over every vector of the ring, in Cartesian product order
    /// with the last coordinate varying fastest. Fails when the base ring
    /// cannot be enumerated.
    pub fn iter(&self) -> Result<WittRingIter> {
        let elems = self.0.base.elements()?;
        Ok(WittRingIter {
            ring: self.clone(),
            elems,
            indices: vec![0; self.0.precision],
            done: false,
        })
    }
}

impl PartialEq for WittVectorRing {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.base == other.0.base
                && self.0.precision == other.0.precision
                && self.0.prime == other.0.prime
                && self.0.algorithm == other.0.algorithm)
    }
}

impl Eq for WittVectorRing {}

impl Hash for WittVectorRing {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.base.hash(state);
        self.0.precision.hash(state);
        self.0.prime.hash(state);
        self.0.algorithm.hash(state);
    }
}

impl fmt::Display for WittVectorRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ring of truncated {}-typical Witt vectors of length {} over {}",
            self.0.prime, self.0.precision, self.0.base
        )
    }
}

/// Iterator over all elements of a Witt vector ring with finite base.
pub struct WittRingIter {
    ring: WittVectorRing,
    elems: Vec<RingElement>,
    indices: Vec<usize>,
    done: bool,
}

impl Iterator for WittRingIter {
    type Item = WittVector;

    fn next(&mut self) -> Option<WittVector> {
        if self.done || self.elems.is_empty() {
            return None;
        }
        let coords: Vec<RingElement> = self
            .indices
            .iter()
            .map(|&i| self.elems[i].clone())
            .collect();
        let out = WittVector::from_parts(self.ring.clone(), coords);

        // odometer step, last coordinate fastest
        let mut pos = self.indices.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.indices[pos] += 1;
            if self.indices[pos] < self.elems.len() {
                break;
            }
            self.indices[pos] = 0;
        }
        Some(out)
    }
}
