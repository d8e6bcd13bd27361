//! SDK error types.
//!
//! Two tiers mirror how failures surface to callers:
//! - **Setup errors** (`Connection`, `Transport`, `Timeout`, `Signing`,
//!   `Config`) return synchronously from [`subscribe`] before any
//!   background task starts.
//! - **Streaming errors** (`ProtocolDecode`, `DataShape`,
//!   `TerminalStream`) attach to delivered records; only
//!   `TerminalStream` ends a subscription, and it is reported exactly
//!   once.
//!
//! [`subscribe`]: crate::EventClient::subscribe

use snafu::Snafu;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Error taxonomy for the event subscription SDK.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SdkError {
    /// Failed to establish or set up the peer connection.
    #[snafu(display("connection error: {message}"))]
    Connection {
        /// Error description.
        message: String,
    },

    /// Transport-level error (HTTP/2, TCP).
    #[snafu(display("transport error: {source}"))]
    Transport {
        /// Underlying transport error.
        source: tonic::transport::Error,
    },

    /// Connect or register did not finish within the caller's deadline.
    #[snafu(display("timed out after {duration_ms}ms while {operation}"))]
    Timeout {
        /// What was being attempted.
        operation: &'static str,
        /// Deadline in milliseconds.
        duration_ms: u64,
    },

    /// The crypto capability rejected the key or algorithm.
    #[snafu(display("signing failed: {source}"))]
    Signing {
        /// Capability error.
        source: hlfc_crypto::CryptoError,
    },

    /// A nested unmarshal step of the decode pipeline failed.
    #[snafu(display("protocol decode failed at {stage}: {source}"))]
    ProtocolDecode {
        /// Pipeline stage that could not parse its input.
        stage: &'static str,
        /// Prost decode error.
        source: prost::DecodeError,
    },

    /// A structurally required substructure is missing (for example a
    /// transaction with zero actions).
    #[snafu(display("unexpected data shape: {message}"))]
    DataShape {
        /// What was missing.
        message: String,
    },

    /// The event stream failed; the subscription is over.
    #[snafu(display("stream terminated: {message}"))]
    TerminalStream {
        /// Stream failure description.
        message: String,
    },

    /// Configuration validation error.
    #[snafu(display("configuration error: {message}"))]
    Config {
        /// Error description.
        message: String,
    },
}

impl SdkError {
    /// True for errors that attach to a single transaction record
    /// without ending the subscription.
    #[must_use]
    pub fn is_per_transaction(&self) -> bool {
        matches!(self, Self::ProtocolDecode { .. } | Self::DataShape { .. })
    }

    /// True when the error ends the subscription.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::TerminalStream { .. })
    }
}

impl From<hlfc_crypto::CryptoError> for SdkError {
    fn from(source: hlfc_crypto::CryptoError) -> Self {
        Self::Signing { source }
    }
}

impl From<tonic::transport::Error> for SdkError {
    fn from(source: tonic::transport::Error) -> Self {
        Self::Transport { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_are_per_transaction() {
        let err = SdkError::DataShape { message: "no actions".to_owned() };
        assert!(err.is_per_transaction());
        assert!(!err.is_terminal());
    }

    #[test]
    fn terminal_stream_is_terminal() {
        let err = SdkError::TerminalStream { message: "reset".to_owned() };
        assert!(err.is_terminal());
        assert!(!err.is_per_transaction());
    }

    #[test]
    fn setup_errors_are_neither() {
        let err = SdkError::Connection { message: "refused".to_owned() };
        assert!(!err.is_terminal());
        assert!(!err.is_per_transaction());
    }

    #[test]
    fn crypto_error_converts_to_signing() {
        let crypto = hlfc_crypto::EcdsaSuite::new();
        let key = hlfc_crypto::PrivateKey::sm2_from_slice(
            hlfc_crypto::SM2_DEFAULT_DIST_ID,
            &[0x22; 32],
        )
        .unwrap();
        let err: SdkError =
            hlfc_crypto::CryptoSuite::sign(&crypto, &key, b"x").unwrap_err().into();
        assert!(matches!(err, SdkError::Signing { .. }));
    }
}
