//! # Request Signer
//!
//! RSASSA-PSS signatures (SHA-256, MGF1-SHA-256, 20-byte salt) as required
//! by the Amazon Pay `AMZN-PAY-RSASSA-PSS` algorithm.
//!
//! PSS is probabilistic: signing the same message twice yields different
//! bytes, both of which verify. Verification is the server's job; the
//! verifying key is exposed only so tests and operators can self-check.

use amazonpay_core::{AmazonPayError, ApiResult};
use base64::{engine::general_purpose::STANDARD, Engine};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::{SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// Algorithm identifier placed in the authorization header and string to sign
pub const ALGORITHM: &str = "AMZN-PAY-RSASSA-PSS";

/// PSS salt length in bytes
pub const SALT_LEN: usize = 20;

/// Holds the private key. Immutable after construction and cheap to clone.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey<Sha256>,
    public: RsaPublicKey,
}

impl Signer {
    /// Parse a PEM encoded RSA private key (PKCS#8 `PRIVATE KEY` or
    /// PKCS#1 `RSA PRIVATE KEY`).
    pub fn from_pem(pem: &[u8]) -> ApiResult<Self> {
        let pem = std::str::from_utf8(pem)
            .map_err(|_| AmazonPayError::KeyParse("private key is not UTF-8 PEM".to_string()))?
            .trim();

        let key = match RsaPrivateKey::from_pkcs8_pem(pem) {
            Ok(key) => key,
            Err(pkcs8_err) => RsaPrivateKey::from_pkcs1_pem(pem).map_err(|pkcs1_err| {
                AmazonPayError::KeyParse(format!(
                    "expected an RSA private key in PKCS#8 or PKCS#1 PEM (pkcs8: {pkcs8_err}; pkcs1: {pkcs1_err})"
                ))
            })?,
        };

        Self::from_key(key)
    }

    pub fn from_key(key: RsaPrivateKey) -> ApiResult<Self> {
        key.validate()
            .map_err(|e| AmazonPayError::KeyParse(format!("invalid RSA key: {e}")))?;
        let public = key.to_public_key();
        Ok(Self {
            key: SigningKey::<Sha256>::new_with_salt_len(key, SALT_LEN),
            public,
        })
    }

    /// Sign raw message bytes
    pub fn sign(&self, message: &[u8]) -> ApiResult<Vec<u8>> {
        let signature = self
            .key
            .try_sign_with_rng(&mut rand::thread_rng(), message)
            .map_err(|e| AmazonPayError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }

    /// Sign and base64 encode (standard alphabet, padded)
    pub fn sign_base64(&self, message: &[u8]) -> ApiResult<String> {
        self.sign(message).map(|sig| STANDARD.encode(sig))
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Verifying key matching this signer's scheme
    pub fn verifying_key(&self) -> VerifyingKey<Sha256> {
        VerifyingKey::<Sha256>::new_with_salt_len(self.public.clone(), SALT_LEN)
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("algorithm", &ALGORITHM)
            .finish_non_exhaustive()
    }
}

/// Lowercase hex SHA-256
pub fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `ALGORITHM \n hex(sha256(input))`, the exact bytes that get signed
pub fn string_to_sign(input: &[u8]) -> String {
    format!("{}\n{}", ALGORITHM, hex_sha256(input))
}
