//! Signing and encryption capability for the HLFC client SDK.
//!
//! A [`CryptoSuite`] bundles the cryptographic operations a client needs
//! to authenticate requests towards a permissioned network, polymorphic
//! over two algorithm families:
//!
//! - [`EcdsaSuite`]: NIST P-256 ECDSA signatures, AES-256-CBC encryption,
//!   SHA-256 hashing
//! - [`GmSuite`]: SM2 signatures, SM4-CBC encryption, SM3 hashing
//!   (Chinese national standard, GM/T series)
//!
//! Suites are stateless per call and safe to share across concurrent
//! subscriptions. Signing is deterministic (RFC 6979 style nonces), so
//! signing the same bytes twice with the same key yields the same
//! signature.

#![deny(unsafe_code)]

mod error;
mod identity;
mod suite;

pub use error::{CryptoError, Result};
pub use identity::Identity;
pub use suite::{CryptoSuite, EcdsaSuite, GmSuite, PrivateKey, SM2_DEFAULT_DIST_ID};
