pub mod algorithm;
pub mod arith;
pub mod base_ring;
pub mod error;
pub mod finite_field;
pub mod finotti;
pub mod ghost;
pub mod isomorphism;
pub mod padic;
pub mod polynomial;
pub mod witt_ring;
pub mod witt_vector;

pub use algorithm::Algorithm;
pub use base_ring::{BaseRing, RingElement};
pub use error::{Result, WittError};
pub use finite_field::FqContext;
pub use finotti::BinomialTable;
pub use ghost::WittPolynomials;
pub use isomorphism::SeriesCodec;
pub use polynomial::MPoly;
pub use witt_ring::{WittRingIter, WittVectorRing};
pub use witt_vector::WittVector;
