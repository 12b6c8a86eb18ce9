//! Errors surfaced by the NTT engine and the BFV multiplier.
//!
//! Every failure is returned to the immediate caller as a value; nothing
//! is retried or recovered internally. A construction error means no
//! instance; a per-operation error leaves the engine untouched.

use thiserror::Error;

/// Errors that may occur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BfvError {
    /// Ring or scheme parameters fail the NTT compatibility checks.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The primitive-root search exhausted every candidate generator.
    #[error("no primitive 2N-th root of unity modulo {q}")]
    InitializationFailed {
        /// The modulus that admitted no root.
        q: i64,
    },

    /// Extended gcd on (value, modulus) returned gcd ≠ 1.
    #[error("{value} has no inverse modulo {modulus}")]
    NoInverse {
        /// The value being inverted.
        value: i64,
        /// The modulus.
        modulus: i64,
    },

    /// A polynomial input does not match the ring degree.
    #[error("polynomial length {got} does not match ring degree {expected}")]
    ShapeMismatch {
        /// The ring degree N.
        expected: usize,
        /// The offending input length.
        got: usize,
    },

    /// The relinearization key is malformed.
    #[error("relinearization key polynomials must have length {expected}, got {got}")]
    InvalidKey {
        /// The ring degree N.
        expected: usize,
        /// The offending key polynomial length.
        got: usize,
    },
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, BfvError>;
