//! API private key parsing.
//!
//! Accepted formats:
//! - PEM `EC PRIVATE KEY` (SEC1) holding a P-256 key
//! - PEM `PRIVATE KEY` (PKCS#8) holding a P-256 or an Ed25519 key
//! - base64 of a 64-byte Ed25519 keypair (32-byte seed followed by the public key)
//!
//! Anything else is rejected before a client is ever built.

use crate::errors::{FacilitatorError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::pkcs8::DecodePrivateKey as _;
use p256::pkcs8::DecodePrivateKey as _;
use std::fmt;

/// JWS algorithm implied by a key type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    /// ECDSA over P-256 with SHA-256
    Es256,
    /// Ed25519
    EdDsa,
}

impl KeyAlgorithm {
    /// The `alg` header value.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyAlgorithm::Es256 => "ES256",
            KeyAlgorithm::EdDsa => "EdDSA",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed signing key. Read-only once built.
pub(crate) enum PrivateKey {
    P256(p256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.algorithm())
    }
}

impl PrivateKey {
    /// Parses a secret in any of the accepted formats.
    ///
    /// Literal `\n` sequences, as found in secrets pasted into `.env` files, are unescaped first.
    pub fn parse(secret: &str) -> Result<Self> {
        let secret = secret.trim().replace("\\n", "\n");

        match pem_label(&secret) {
            Some("EC PRIVATE KEY") => p256::SecretKey::from_sec1_pem(&secret)
                .map(|key| Self::P256(key.into()))
                .map_err(|e| {
                    FacilitatorError::InvalidKeyFormat(format!("EC key is not a valid P-256 key: {e}"))
                }),
            Some("PRIVATE KEY") => {
                if let Ok(key) = p256::SecretKey::from_pkcs8_pem(&secret) {
                    return Ok(Self::P256(key.into()));
                }
                ed25519_dalek::SigningKey::from_pkcs8_pem(&secret)
                    .map(Self::Ed25519)
                    .map_err(|_| {
                        FacilitatorError::UnsupportedKeyType(
                            "PKCS#8 key is neither P-256 nor Ed25519".to_string(),
                        )
                    })
            }
            Some(label) => Err(FacilitatorError::UnsupportedKeyType(label.to_string())),
            None => Self::parse_ed25519_keypair(&secret),
        }
    }

    fn parse_ed25519_keypair(secret: &str) -> Result<Self> {
        let bytes = BASE64.decode(secret.as_bytes()).map_err(|e| {
            FacilitatorError::InvalidKeyFormat(format!("key is neither PEM nor base64: {e}"))
        })?;
        let keypair: [u8; 64] = bytes.as_slice().try_into().map_err(|_| {
            FacilitatorError::InvalidKeyFormat(format!(
                "expected a 64-byte Ed25519 key, got {} bytes",
                bytes.len()
            ))
        })?;

        ed25519_dalek::SigningKey::from_keypair_bytes(&keypair)
            .map(Self::Ed25519)
            .map_err(|e| {
                FacilitatorError::InvalidKeyFormat(format!("Ed25519 public key does not match seed: {e}"))
            })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::P256(_) => KeyAlgorithm::Es256,
            Self::Ed25519(_) => KeyAlgorithm::EdDsa,
        }
    }

    /// Signs `message`, returning the raw JWS signature bytes (`r || s` for ES256).
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::P256(key) => {
                let signature: p256::ecdsa::Signature =
                    p256::ecdsa::signature::Signer::try_sign(key, message)
                        .map_err(|e| FacilitatorError::SigningError(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            Self::Ed25519(key) => Ok(ed25519_dalek::Signer::sign(key, message).to_bytes().to_vec()),
        }
    }
}

fn pem_label(secret: &str) -> Option<&str> {
    let rest = secret.strip_prefix("-----BEGIN ")?;
    let end = rest.find("-----")?;
    Some(&rest[..end])
}
