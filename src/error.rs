use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WittError {
    #[error("Invalid precision: {precision} (must be at least 1)")]
    InvalidPrecision { precision: usize },

    #[error("Invalid modulus: {modulus}")]
    InvalidModulus { modulus: String },

    #[error("p must be a prime number, but {p} is not")]
    NotPrime { p: u64 },

    #[error("{ring} has non-prime characteristic and no prime was supplied")]
    NonPrimeCharacteristic { ring: String },

    #[error("algorithm must be one of None, 'standard', 'p_invertible', 'finotti' or 'Zq_isomorphism', got '{0}'")]
    UnknownAlgorithm(String),

    #[error("The '{algorithm}' algorithm only works {requirement}")]
    IncompatibleAlgorithm {
        algorithm: String,
        requirement: String,
    },

    #[error("Invalid length: expected at least {expected}, got {got}")]
    WrongLength { expected: usize, got: usize },

    #[error("Cannot coerce {from} into {to}")]
    NoCoercion { from: String, to: String },

    #[error("Cannot interpret {value} as an element of {ring}")]
    NotInBaseRing { value: String, ring: String },

    #[error("Inverse of {0} does not exist")]
    NotInvertible(String),

    #[error("{0} is not a finite ring and cannot be enumerated")]
    NotEnumerable(String),

    #[error("Arithmetic overflow: {0}")]
    ArithmeticOverflow(String),
}

pub type Result<T> = std::result::Result<T, WittError>;
