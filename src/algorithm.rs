//! Ring-law algorithm selection.
//!
//! Four algorithms compute the Witt vector ring laws, each valid under an
//! algebraic precondition on the coefficient ring. `select` validates an
//! explicit request against those preconditions, or picks the best
//! applicable algorithm when none is requested.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::arith::is_prime_u64;
use crate::base_ring::BaseRing;
use crate::error::{Result, WittError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Universal sum and product polynomials over the integers.
    Standard,
    /// Direct ghost-component solving; needs p invertible in the base.
    PInvertible,
    /// Finotti's binomial-table recursion; needs characteristic p.
    Finotti,
    /// Arithmetic through the isomorphism with Z_q; needs a finite field
    /// of characteristic p.
    ZqIsomorphism,
}

impl Algorithm {
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Standard => "standard",
            Algorithm::PInvertible => "p_invertible",
            Algorithm::Finotti => "finotti",
            Algorithm::ZqIsomorphism => "Zq_isomorphism",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = WittError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "standard" => Ok(Algorithm::Standard),
            "p_invertible" => Ok(Algorithm::PInvertible),
            "finotti" => Ok(Algorithm::Finotti),
            "Zq_isomorphism" => Ok(Algorithm::ZqIsomorphism),
            other => Err(WittError::UnknownAlgorithm(other.to_string())),
        }
    }
}

fn incompatible(algorithm: Algorithm, requirement: &str) -> WittError {
    WittError::IncompatibleAlgorithm {
        algorithm: algorithm.name().to_string(),
        requirement: requirement.to_string(),
    }
}

const NEEDS_UNIT: &str = "when p is a unit in the ring of coefficients";
const NEEDS_CHAR_P: &str = "for coefficient rings of characteristic p";
const NEEDS_FQ: &str = "when the coefficient ring is a finite field of characteristic p";

/// Resolves the prime and the algorithm for a Witt vector ring over `base`.
///
/// When `p` is `None` the characteristic of `base` must be prime and is
/// used as the prime. When `algorithm` is `None` the selection is, in
/// order of preference: `Zq_isomorphism` for finite fields of
/// characteristic p, `finotti` for other rings of characteristic p,
/// `p_invertible` when p is a unit in the base, and `standard` otherwise.
pub fn select(
    base: &BaseRing,
    precision: usize,
    p: Option<u64>,
    algorithm: Option<Algorithm>,
) -> Result<(u64, Algorithm)> {
    if precision == 0 {
        return Err(WittError::InvalidPrecision { precision });
    }

    let characteristic = base.characteristic();
    let prime = match p {
        None => characteristic
            .to_u64()
            .filter(|&c| is_prime_u64(c))
            .ok_or_else(|| WittError::NonPrimeCharacteristic {
                ring: base.to_string(),
            })?,
        Some(p) => {
            if !is_prime_u64(p) {
                return Err(WittError::NotPrime { p });
            }
            p
        }
    };

    let chosen = if characteristic == BigUint::from(prime) {
        match algorithm {
            Some(Algorithm::PInvertible) => {
                return Err(incompatible(Algorithm::PInvertible, NEEDS_UNIT));
            }
            _ if base.is_finite_field() => algorithm.unwrap_or(Algorithm::ZqIsomorphism),
            Some(Algorithm::ZqIsomorphism) => {
                return Err(incompatible(Algorithm::ZqIsomorphism, NEEDS_FQ));
            }
            _ => algorithm.unwrap_or(Algorithm::Finotti),
        }
    } else {
        match algorithm {
            Some(Algorithm::Finotti) => {
                return Err(incompatible(Algorithm::Finotti, NEEDS_CHAR_P));
            }
            Some(Algorithm::ZqIsomorphism) => {
                return Err(incompatible(Algorithm::ZqIsomorphism, NEEDS_FQ));
            }
            _ if base.from_u64(prime).is_unit() => {
                algorithm.unwrap_or(Algorithm::PInvertible)
            }
            Some(Algorithm::PInvertible) => {
                return Err(incompatible(Algorithm::PInvertible, NEEDS_UNIT));
            }
            _ => algorithm.unwrap_or(Algorithm::Standard),
        }
    };

    Ok((prime, chosen))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_selection() {
        let f25 = BaseRing::finite_field(5, 2).unwrap();
        assert_eq!(
            select(&f25, 3, Some(5), None).unwrap(),
            (5, Algorithm::ZqIsomorphism)
        );
        // Z/5 has prime characteristic but is not flagged as a field.
        let z5 = BaseRing::integers_mod_u64(5).unwrap();
        assert_eq!(select(&z5, 2, None, None).unwrap(), (5, Algorithm::Finotti));
        let z6 = BaseRing::integers_mod_u64(6).unwrap();
        assert_eq!(
            select(&z6, 2, Some(5), None).unwrap(),
            (5, Algorithm::PInvertible)
        );
        assert_eq!(
            select(&z6, 2, Some(3), None).unwrap(),
            (3, Algorithm::Standard)
        );
        let zz = BaseRing::integers();
        assert_eq!(
            select(&zz, 2, Some(23), None).unwrap(),
            (23, Algorithm::Standard)
        );
    }

    #[test]
    fn test_prime_inference() {
        let f3 = BaseRing::finite_field(3, 1).unwrap();
        assert_eq!(
            select(&f3, 4, None, None).unwrap(),
            (3, Algorithm::ZqIsomorphism)
        );
        let zz = BaseRing::integers();
        assert!(matches!(
            select(&zz, 2, None, None),
            Err(WittError::NonPrimeCharacteristic { .. })
        ));
        assert!(matches!(
            select(&zz, 2, Some(6), None),
            Err(WittError::NotPrime { p: 6 })
        ));
        assert!(matches!(
            select(&zz, 0, Some(5), None),
            Err(WittError::InvalidPrecision { .. })
        ));
    }

    #[test]
    fn test_explicit_requests() {
        let f25 = BaseRing::finite_field(5, 2).unwrap();
        // Explicit standard and finotti are allowed over a finite field.
        assert_eq!(
            select(&f25, 2, Some(5), Some(Algorithm::Standard)).unwrap().1,
            Algorithm::Standard
        );
        assert_eq!(
            select(&f25, 2, Some(5), Some(Algorithm::Finotti)).unwrap().1,
            Algorithm::Finotti
        );
        assert!(select(&f25, 2, Some(5), Some(Algorithm::PInvertible)).is_err());

        let zz = BaseRing::integers();
        assert!(select(&zz, 2, Some(5), Some(Algorithm::Finotti)).is_err());
        assert!(select(&zz, 2, Some(5), Some(Algorithm::ZqIsomorphism)).is_err());
        assert!(select(&zz, 2, Some(5), Some(Algorithm::PInvertible)).is_err());

        let z5 = BaseRing::integers_mod_u64(5).unwrap();
        assert!(select(&z5, 2, None, Some(Algorithm::ZqIsomorphism)).is_err());
        assert_eq!(
            select(&z5, 2, None, Some(Algorithm::Standard)).unwrap().1,
            Algorithm::Standard
        );

        // p invertible in the base: finotti and Zq are still refused.
        let z6 = BaseRing::integers_mod_u64(6).unwrap();
        assert!(select(&z6, 2, Some(5), Some(Algorithm::Finotti)).is_err());
        assert_eq!(
            select(&z6, 2, Some(5), Some(Algorithm::PInvertible)).unwrap().1,
            Algorithm::PInvertible
        );
    }

    #[test]
    fn test_names_round_trip() {
        for alg in [
            Algorithm::Standard,
            Algorithm::PInvertible,
            Algorithm::Finotti,
            Algorithm::ZqIsomorphism,
        ] {
            assert_eq!(alg.name().parse::<Algorithm>().unwrap(), alg);
        }
        assert!(matches!(
            "moon".parse::<Algorithm>(),
            Err(WittError::UnknownAlgorithm(_))
        ));
    }
}
