//! Per-request JWTs for the Coinbase facilitator.
//!
//! Each token lives for 60 seconds and carries a single `uris` entry of the form
//! `"POST api.cdp.coinbase.com/platform/v2/x402/verify"`, so it only authenticates
//! the exact method and endpoint it was minted for. Tokens are never cached.

use super::keys::{KeyAlgorithm, PrivateKey};
use crate::errors::Result;
use crate::utils::{current_timestamp, generate_numeric_nonce};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL, Engine};
use serde::{Deserialize, Serialize};

/// `iss` claim expected by the facilitator.
pub const JWT_ISSUER: &str = "cdp";

/// Sole `aud` claim entry expected by the facilitator.
pub const JWT_AUDIENCE: &str = "cdp_service";

/// Seconds between `nbf` and `exp`.
pub const TOKEN_LIFETIME_SECS: i64 = 60;

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'static str,
    kid: &'a str,
    typ: &'static str,
    nonce: String,
}

/// Claims carried by every request token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// API key identifier
    pub sub: String,
    /// Always [`JWT_ISSUER`]
    pub iss: String,
    /// Always `[JWT_AUDIENCE]`
    pub aud: Vec<String>,
    /// Issue time, Unix seconds
    pub nbf: i64,
    /// `nbf` + [`TOKEN_LIFETIME_SECS`]
    pub exp: i64,
    /// The one `"<METHOD> <host><path>"` this token authenticates
    pub uris: Vec<String>,
}

impl Claims {
    fn new(key_id: &str, uri: String, now: i64) -> Self {
        Self {
            sub: key_id.to_string(),
            iss: JWT_ISSUER.to_string(),
            aud: vec![JWT_AUDIENCE.to_string()],
            nbf: now,
            exp: now + TOKEN_LIFETIME_SECS,
            uris: vec![uri],
        }
    }
}

/// Mints request tokens for one API key.
#[derive(Debug)]
pub(crate) struct RequestSigner {
    key_id: String,
    key: PrivateKey,
}

impl RequestSigner {
    /// Parses the key secret up front so a bad key fails construction, not a request.
    pub fn new(key_id: impl Into<String>, key_secret: &str) -> Result<Self> {
        Ok(Self {
            key_id: key_id.into(),
            key: PrivateKey::parse(key_secret)?,
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.key.algorithm()
    }

    /// `Authorization` header value for one request.
    pub fn bearer(&self, method: &str, host: &str, path: &str) -> Result<String> {
        Ok(format!("Bearer {}", self.mint(method, host, path)?))
    }

    pub fn mint(&self, method: &str, host: &str, path: &str) -> Result<String> {
        self.mint_at(method, host, path, current_timestamp())
    }

    pub fn mint_at(&self, method: &str, host: &str, path: &str, now: i64) -> Result<String> {
        let header = JwtHeader {
            alg: self.key.algorithm().as_str(),
            kid: &self.key_id,
            typ: "JWT",
            nonce: generate_numeric_nonce(),
        };
        let claims = Claims::new(&self.key_id, format!("{method} {host}{path}"), now);

        let signing_input = format!(
            "{}.{}",
            BASE64URL.encode(serde_json::to_vec(&header)?),
            BASE64URL.encode(serde_json::to_vec(&claims)?)
        );
        let signature = self.key.sign(signing_input.as_bytes())?;

        Ok(format!("{signing_input}.{}", BASE64URL.encode(signature)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::keys::test_keys::{ed25519_base64, ed25519_key, p256_sec1_pem, p256_secret};
    use serde_json::Value;

    const HOST: &str = "api.cdp.coinbase.com";
    const VERIFY_PATH: &str = "/platform/v2/x402/verify";

    fn decode_part(part: &str) -> Value {
        serde_json::from_slice(&BASE64URL.decode(part).unwrap()).unwrap()
    }

    fn split(token: &str) -> (Value, Claims, Vec<u8>) {
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        let claims = serde_json::from_value(decode_part(parts[1])).unwrap();
        (decode_part(parts[0]), claims, BASE64URL.decode(parts[2]).unwrap())
    }

    #[test]
    fn test_es256_token_layout() {
        let signer = RequestSigner::new("organizations/org/apiKeys/key", &p256_sec1_pem()).unwrap();
        let token = signer.mint_at("POST", HOST, VERIFY_PATH, 1_700_000_000).unwrap();
        let (header, claims, _) = split(&token);

        assert_eq!(header["alg"], "ES256");
        assert_eq!(header["kid"], "organizations/org/apiKeys/key");
        assert_eq!(header["typ"], "JWT");
        let nonce = header["nonce"].as_str().unwrap();
        assert_eq!(nonce.len(), 16);
        assert!(nonce.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(claims.sub, "organizations/org/apiKeys/key");
        assert_eq!(claims.iss, "cdp");
        assert_eq!(claims.aud, vec!["cdp_service".to_string()]);
        assert_eq!(claims.nbf, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_000_060);
        assert_eq!(
            claims.uris,
            vec!["POST api.cdp.coinbase.com/platform/v2/x402/verify".to_string()]
        );
    }

    #[test]
    fn test_es256_signature_verifies() {
        use p256::ecdsa::signature::Verifier as _;

        let signer = RequestSigner::new("key", &p256_sec1_pem()).unwrap();
        let token = signer.mint("POST", HOST, VERIFY_PATH).unwrap();
        let (signing_input, _) = token.rsplit_once('.').unwrap();
        let (_, _, signature) = split(&token);

        let verifying_key =
            p256::ecdsa::VerifyingKey::from(&p256::ecdsa::SigningKey::from(p256_secret()));
        let signature = p256::ecdsa::Signature::from_slice(&signature).unwrap();
        assert!(verifying_key.verify(signing_input.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn test_eddsa_signature_verifies() {
        use ed25519_dalek::Verifier as _;

        let signer = RequestSigner::new("key", &ed25519_base64()).unwrap();
        assert_eq!(signer.algorithm(), KeyAlgorithm::EdDsa);

        let token = signer.mint("POST", HOST, "/platform/v2/x402/settle").unwrap();
        let (signing_input, _) = token.rsplit_once('.').unwrap();
        let (header, claims, signature) = split(&token);

        assert_eq!(header["alg"], "EdDSA");
        assert_eq!(claims.uris, vec![format!("POST {HOST}/platform/v2/x402/settle")]);
        let signature = ed25519_dalek::Signature::from_slice(&signature).unwrap();
        assert!(ed25519_key()
            .verifying_key()
            .verify(signing_input.as_bytes(), &signature)
            .is_ok());
    }

    #[test]
    fn test_tokens_are_never_reused() {
        let signer = RequestSigner::new("key", &ed25519_base64()).unwrap();
        let first = signer.mint_at("POST", HOST, VERIFY_PATH, 1_700_000_000).unwrap();
        let second = signer.mint_at("POST", HOST, VERIFY_PATH, 1_700_000_001).unwrap();
        let (first_header, first_claims, _) = split(&first);
        let (second_header, second_claims, _) = split(&second);

        assert_ne!(first_header["nonce"], second_header["nonce"]);
        assert_ne!(first_claims.exp, second_claims.exp);
        assert_eq!(first_claims.uris, second_claims.uris);
    }

    #[test]
    fn test_bearer_prefix() {
        let signer = RequestSigner::new("key", &ed25519_base64()).unwrap();
        let bearer = signer.bearer("POST", HOST, VERIFY_PATH).unwrap();
        assert!(bearer.starts_with("Bearer "));
        assert_eq!(bearer.matches('.').count(), 2);
    }
}
