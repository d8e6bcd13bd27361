//! Error types for the crypto capability.

use snafu::Snafu;

/// Result type alias for crypto operations.
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Errors produced by [`CryptoSuite`](crate::CryptoSuite) operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CryptoError {
    /// The private key does not belong to this suite's algorithm family.
    #[snafu(display("key variant {actual} not usable with the {suite} suite"))]
    KeyMismatch {
        /// Suite that rejected the key.
        suite: &'static str,
        /// Variant name of the supplied key.
        actual: &'static str,
    },

    /// Symmetric key has the wrong length for the suite's cipher.
    #[snafu(display("invalid key length {actual}, {cipher} requires {expected} bytes"))]
    InvalidKeyLength {
        /// Cipher name.
        cipher: &'static str,
        /// Required key length in bytes.
        expected: usize,
        /// Supplied key length in bytes.
        actual: usize,
    },

    /// Ciphertext is malformed (too short for an IV, not block-aligned,
    /// or carries invalid padding).
    #[snafu(display("malformed ciphertext: {message}"))]
    Ciphertext {
        /// What made the ciphertext unusable.
        message: String,
    },

    /// The OS randomness source failed or returned short output.
    #[snafu(display("random source failed for {requested} bytes: {message}"))]
    RandomSource {
        /// Number of bytes requested.
        requested: usize,
        /// Source failure description.
        message: String,
    },

    /// A PEM or key document could not be parsed.
    #[snafu(display("invalid key material: {message}"))]
    InvalidKeyMaterial {
        /// Parse failure description.
        message: String,
    },
}
