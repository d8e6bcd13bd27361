//! Enrollment identity: certificate plus private key.

use snafu::ensure;

use crate::error::{InvalidKeyMaterialSnafu, Result};
use crate::suite::PrivateKey;

/// A certificate and the matching private key, bound by the caller to a
/// membership id when a request is built.
///
/// Supplied by the application, shared across subscriptions and never
/// mutated. The certificate is held in DER form; the wire format wants
/// PEM, rendered on demand by [`certificate_pem`](Self::certificate_pem).
#[derive(Debug, Clone)]
pub struct Identity {
    certificate: Vec<u8>,
    private_key: PrivateKey,
}

impl Identity {
    /// Creates an identity from a DER-encoded certificate and a key.
    pub fn new(certificate_der: Vec<u8>, private_key: PrivateKey) -> Self {
        Self { certificate: certificate_der, private_key }
    }

    /// Creates an identity from a PEM `CERTIFICATE` block and a key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKeyMaterial`](crate::CryptoError) if
    /// the input is not a PEM certificate.
    pub fn from_cert_pem(cert_pem: &str, private_key: PrivateKey) -> Result<Self> {
        let block = pem::parse(cert_pem).map_err(|e| {
            InvalidKeyMaterialSnafu { message: format!("certificate PEM: {e}") }.build()
        })?;
        ensure!(
            block.tag() == "CERTIFICATE",
            InvalidKeyMaterialSnafu {
                message: format!("expected CERTIFICATE block, found {}", block.tag()),
            }
        );
        Ok(Self { certificate: block.into_contents(), private_key })
    }

    /// Returns the DER-encoded certificate.
    #[must_use]
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate
    }

    /// Renders the certificate as a PEM `CERTIFICATE` block.
    ///
    /// This is the exact byte form asserted as the creator identity in
    /// signed requests.
    #[must_use]
    pub fn certificate_pem(&self) -> String {
        pem::encode(&pem::Pem::new("CERTIFICATE", self.certificate.clone()))
    }

    /// Returns the private key handle.
    #[must_use]
    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> PrivateKey {
        PrivateKey::Ecdsa(Box::new(p256::ecdsa::SigningKey::from_slice(&[7u8; 32]).unwrap()))
    }

    #[test]
    fn pem_round_trip_preserves_der() {
        let der = vec![0x30, 0x82, 0x01, 0x0a, 0xde, 0xad, 0xbe, 0xef];
        let identity = Identity::new(der.clone(), test_key());

        let rendered = identity.certificate_pem();
        assert!(rendered.starts_with("-----BEGIN CERTIFICATE-----"));

        let reparsed = Identity::from_cert_pem(&rendered, test_key()).unwrap();
        assert_eq!(reparsed.certificate_der(), der.as_slice());
    }

    #[test]
    fn rejects_non_certificate_pem() {
        let block = pem::encode(&pem::Pem::new("PRIVATE KEY", vec![1, 2, 3]));
        let err = Identity::from_cert_pem(&block, test_key()).unwrap_err();
        assert!(err.to_string().contains("CERTIFICATE"));
    }

    #[test]
    fn rejects_garbage_pem() {
        assert!(Identity::from_cert_pem("not pem at all", test_key()).is_err());
    }
}
