//! The [`CryptoSuite`] trait and its two algorithm-family implementations.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};
use signature::Signer;
use snafu::ensure;

use crate::error::{
    CiphertextSnafu, InvalidKeyLengthSnafu, InvalidKeyMaterialSnafu, KeyMismatchSnafu,
    RandomSourceSnafu, Result,
};

/// CBC block size shared by AES and SM4.
const BLOCK_SIZE: usize = 16;

/// Distinguishing identifier mandated by GM/T 0009-2012 when none is
/// assigned to the signer.
pub const SM2_DEFAULT_DIST_ID: &str = "1234567812345678";

/// A private-key handle, tagged by algorithm family.
///
/// A suite only accepts keys of its own family; passing an SM2 key to the
/// ECDSA suite (or vice versa) is a [`KeyMismatch`](crate::CryptoError)
/// error, never a silent misuse.
#[derive(Debug, Clone)]
pub enum PrivateKey {
    /// NIST P-256 ECDSA signing key.
    Ecdsa(Box<p256::ecdsa::SigningKey>),
    /// SM2 signing key, distinguishing identifier bound at construction.
    Sm2(Box<sm2::dsa::SigningKey>),
}

impl PrivateKey {
    /// Builds a P-256 key from a raw 32-byte scalar.
    pub fn ecdsa_from_slice(bytes: &[u8]) -> Result<Self> {
        let key = p256::ecdsa::SigningKey::from_slice(bytes).map_err(|e| {
            InvalidKeyMaterialSnafu { message: format!("p256 scalar: {e}") }.build()
        })?;
        Ok(Self::Ecdsa(Box::new(key)))
    }

    /// Builds a P-256 key from a PKCS#8 PEM document.
    pub fn ecdsa_from_pkcs8_pem(pem: &str) -> Result<Self> {
        use p256::pkcs8::DecodePrivateKey;

        let key = p256::ecdsa::SigningKey::from_pkcs8_pem(pem).map_err(|e| {
            InvalidKeyMaterialSnafu { message: format!("p256 PKCS#8: {e}") }.build()
        })?;
        Ok(Self::Ecdsa(Box::new(key)))
    }

    /// Builds an SM2 key from a raw 32-byte scalar and a distinguishing
    /// identifier ([`SM2_DEFAULT_DIST_ID`] when none is assigned).
    pub fn sm2_from_slice(dist_id: &str, bytes: &[u8]) -> Result<Self> {
        let secret = sm2::SecretKey::from_slice(bytes).map_err(|e| {
            InvalidKeyMaterialSnafu { message: format!("sm2 scalar: {e}") }.build()
        })?;
        let key = sm2::dsa::SigningKey::new(dist_id, &secret).map_err(|e| {
            InvalidKeyMaterialSnafu { message: format!("sm2 signing key: {e}") }.build()
        })?;
        Ok(Self::Sm2(Box::new(key)))
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Self::Ecdsa(_) => "ecdsa",
            Self::Sm2(_) => "sm2",
        }
    }
}

/// Signing, encryption, hashing and randomness for one algorithm family.
///
/// Implementations are stateless per call and safe for concurrent use
/// from multiple subscriptions.
pub trait CryptoSuite: Send + Sync {
    /// Signs `message` with `key`.
    ///
    /// Deterministic: the same key and message always produce the same
    /// signature.
    ///
    /// # Errors
    ///
    /// [`KeyMismatch`](crate::CryptoError) when the key does not belong
    /// to this suite's family.
    fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>>;

    /// Encrypts `plaintext` under the symmetric `key` using the suite's
    /// block cipher in CBC mode with PKCS7 padding.
    ///
    /// A fresh random IV is prepended to the returned ciphertext.
    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Reverses [`encrypt`](Self::encrypt), reading the IV from the
    /// leading block of `ciphertext`.
    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>>;

    /// Hashes `message` with the suite's digest.
    fn hash(&self, message: &[u8]) -> Vec<u8>;

    /// Returns `len` bytes from the OS randomness source.
    ///
    /// # Errors
    ///
    /// [`RandomSource`](crate::CryptoError) when the source fails; the
    /// buffer is never returned partially filled.
    fn random_bytes(&self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        OsRng.try_fill_bytes(&mut buf).map_err(|e| {
            RandomSourceSnafu { requested: len, message: e.to_string() }.build()
        })?;
        Ok(buf)
    }
}

/// Splits `iv || ct` ciphertext produced by [`CryptoSuite::encrypt`].
fn split_iv(ciphertext: &[u8]) -> Result<(&[u8], &[u8])> {
    ensure!(
        ciphertext.len() >= 2 * BLOCK_SIZE,
        CiphertextSnafu {
            message: format!(
                "{} bytes is shorter than an IV plus one block",
                ciphertext.len()
            ),
        }
    );
    let (iv, ct) = ciphertext.split_at(BLOCK_SIZE);
    ensure!(
        ct.len() % BLOCK_SIZE == 0,
        CiphertextSnafu {
            message: format!("body of {} bytes is not block aligned", ct.len()),
        }
    );
    Ok((iv, ct))
}

/// Standard elliptic-curve family: P-256 ECDSA, AES-256-CBC, SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcdsaSuite;

impl EcdsaSuite {
    const AES_KEY_LEN: usize = 32;

    /// Creates the suite. Stateless; `Default` works equally well.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CryptoSuite for EcdsaSuite {
    fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
        let PrivateKey::Ecdsa(key) = key else {
            return KeyMismatchSnafu { suite: "ecdsa", actual: key.variant_name() }.fail();
        };
        let signature: p256::ecdsa::Signature = key.sign(message);
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        ensure!(
            key.len() == Self::AES_KEY_LEN,
            InvalidKeyLengthSnafu {
                cipher: "AES-256-CBC",
                expected: Self::AES_KEY_LEN,
                actual: key.len(),
            }
        );
        let iv = self.random_bytes(BLOCK_SIZE)?;
        let cipher = cbc::Encryptor::<aes::Aes256>::new_from_slices(key, &iv)
            .map_err(|e| CiphertextSnafu { message: e.to_string() }.build())?;
        let mut out = iv;
        out.extend_from_slice(&cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext));
        Ok(out)
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        ensure!(
            key.len() == Self::AES_KEY_LEN,
            InvalidKeyLengthSnafu {
                cipher: "AES-256-CBC",
                expected: Self::AES_KEY_LEN,
                actual: key.len(),
            }
        );
        let (iv, body) = split_iv(ciphertext)?;
        let cipher = cbc::Decryptor::<aes::Aes256>::new_from_slices(key, iv)
            .map_err(|e| CiphertextSnafu { message: e.to_string() }.build())?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| CiphertextSnafu { message: "invalid PKCS7 padding".to_string() }.build())
    }

    fn hash(&self, message: &[u8]) -> Vec<u8> {
        Sha256::digest(message).to_vec()
    }
}

/// Chinese national-standard family: SM2 signatures, SM4-CBC, SM3.
#[derive(Debug, Clone, Copy, Default)]
pub struct GmSuite;

impl GmSuite {
    const SM4_KEY_LEN: usize = 16;

    /// Creates the suite. Stateless; `Default` works equally well.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl CryptoSuite for GmSuite {
    fn sign(&self, key: &PrivateKey, message: &[u8]) -> Result<Vec<u8>> {
        let PrivateKey::Sm2(key) = key else {
            return KeyMismatchSnafu { suite: "gm", actual: key.variant_name() }.fail();
        };
        let signature: sm2::dsa::Signature = key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }

    fn encrypt(&self, key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        ensure!(
            key.len() == Self::SM4_KEY_LEN,
            InvalidKeyLengthSnafu {
                cipher: "SM4-CBC",
                expected: Self::SM4_KEY_LEN,
                actual: key.len(),
            }
        );
        let iv = self.random_bytes(BLOCK_SIZE)?;
        let cipher = cbc::Encryptor::<sm4::Sm4>::new_from_slices(key, &iv)
            .map_err(|e| CiphertextSnafu { message: e.to_string() }.build())?;
        let mut out = iv;
        out.extend_from_slice(&cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext));
        Ok(out)
    }

    fn decrypt(&self, key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
        ensure!(
            key.len() == Self::SM4_KEY_LEN,
            InvalidKeyLengthSnafu {
                cipher: "SM4-CBC",
                expected: Self::SM4_KEY_LEN,
                actual: key.len(),
            }
        );
        let (iv, body) = split_iv(ciphertext)?;
        let cipher = cbc::Decryptor::<sm4::Sm4>::new_from_slices(key, iv)
            .map_err(|e| CiphertextSnafu { message: e.to_string() }.build())?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(body)
            .map_err(|_| CiphertextSnafu { message: "invalid PKCS7 padding".to_string() }.build())
    }

    fn hash(&self, message: &[u8]) -> Vec<u8> {
        sm3::Sm3::digest(message).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use signature::Verifier;

    use super::*;

    fn ecdsa_key() -> PrivateKey {
        PrivateKey::ecdsa_from_slice(&[0x11; 32]).unwrap()
    }

    fn sm2_key() -> PrivateKey {
        PrivateKey::sm2_from_slice(SM2_DEFAULT_DIST_ID, &[0x22; 32]).unwrap()
    }

    #[test]
    fn ecdsa_signature_verifies_and_is_deterministic() {
        let key = ecdsa_key();
        let suite = EcdsaSuite::new();
        let msg = b"register: block interest";

        let sig = suite.sign(&key, msg).unwrap();
        assert_eq!(sig, suite.sign(&key, msg).unwrap());

        let PrivateKey::Ecdsa(signing) = &key else { unreachable!() };
        let parsed = p256::ecdsa::Signature::from_der(&sig).unwrap();
        signing.verifying_key().verify(msg, &parsed).unwrap();
    }

    #[test]
    fn sm2_signature_verifies() {
        let key = sm2_key();
        let suite = GmSuite::new();
        let msg = b"register: block interest";

        let sig = suite.sign(&key, msg).unwrap();

        let PrivateKey::Sm2(signing) = &key else { unreachable!() };
        let parsed = sm2::dsa::Signature::try_from(sig.as_slice()).unwrap();
        signing.verifying_key().verify(msg, &parsed).unwrap();
    }

    #[test]
    fn suites_reject_foreign_keys() {
        let err = EcdsaSuite::new().sign(&sm2_key(), b"x").unwrap_err();
        assert!(err.to_string().contains("ecdsa"));

        let err = GmSuite::new().sign(&ecdsa_key(), b"x").unwrap_err();
        assert!(err.to_string().contains("gm"));
    }

    #[test]
    fn aes_cbc_round_trip_multi_block() {
        let suite = EcdsaSuite::new();
        let key = [0x5a; 32];
        // Three blocks plus a tail byte, exercising chaining and padding.
        let plaintext = vec![0xc3u8; 49];

        let ct = suite.encrypt(&key, &plaintext).unwrap();
        assert_ne!(&ct[BLOCK_SIZE..], plaintext.as_slice());
        assert_eq!(suite.decrypt(&key, &ct).unwrap(), plaintext);
    }

    #[test]
    fn aes_cbc_fresh_iv_per_call() {
        let suite = EcdsaSuite::new();
        let key = [0x5a; 32];
        let a = suite.encrypt(&key, b"same input").unwrap();
        let b = suite.encrypt(&key, b"same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn sm4_cbc_round_trip_empty_plaintext() {
        let suite = GmSuite::new();
        let key = [0x09; 16];
        let ct = suite.encrypt(&key, b"").unwrap();
        // IV plus a single padding block.
        assert_eq!(ct.len(), 2 * BLOCK_SIZE);
        assert_eq!(suite.decrypt(&key, &ct).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decrypt_rejects_wrong_key_length() {
        let err = EcdsaSuite::new().decrypt(&[0u8; 16], &[0u8; 48]).unwrap_err();
        assert!(matches!(err, crate::CryptoError::InvalidKeyLength { .. }));
    }

    #[test]
    fn decrypt_rejects_truncated_ciphertext() {
        let err = GmSuite::new().decrypt(&[0u8; 16], &[0u8; 20]).unwrap_err();
        assert!(matches!(err, crate::CryptoError::Ciphertext { .. }));
    }

    #[test]
    fn decrypt_detects_tampering() {
        let suite = GmSuite::new();
        let key = [0x09; 16];
        let mut ct = suite.encrypt(&key, b"payload under test!").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0xff;
        // Either the padding breaks or the plaintext differs; both are
        // acceptable CBC failure modes, but it must never equal the input.
        match suite.decrypt(&key, &ct) {
            Ok(pt) => assert_ne!(pt, b"payload under test!"),
            Err(e) => assert!(matches!(e, crate::CryptoError::Ciphertext { .. })),
        }
    }

    #[test]
    fn random_bytes_len_and_variation() {
        let suite = EcdsaSuite::new();
        assert_eq!(suite.random_bytes(0).unwrap().len(), 0);
        let a = suite.random_bytes(64).unwrap();
        let b = suite.random_bytes(64).unwrap();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_digests_differ_by_family() {
        let ec = EcdsaSuite::new().hash(b"abc");
        let gm = GmSuite::new().hash(b"abc");
        assert_eq!(ec.len(), 32);
        assert_eq!(gm.len(), 32);
        assert_ne!(ec, gm);
    }

    proptest! {
        #[test]
        fn cbc_round_trips_arbitrary_plaintext(pt in proptest::collection::vec(any::<u8>(), 0..512)) {
            let suite = EcdsaSuite::new();
            let key = [0x77u8; 32];
            let ct = suite.encrypt(&key, &pt).unwrap();
            prop_assert_eq!(suite.decrypt(&key, &ct).unwrap(), pt);
        }
    }
}
