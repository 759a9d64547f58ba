//! Error types for the facilitator clients.
//!
//! Only configuration problems surface as [`FacilitatorError`] from a constructor.
//! Failures during `verify`/`settle` are folded into the returned
//! [`VerifyResponse`](crate::types::VerifyResponse) or
//! [`SettleResponse`](crate::types::SettleResponse) instead.

use thiserror::Error;

/// Main error type for facilitator client construction and request signing.
#[derive(Error, Debug)]
pub enum FacilitatorError {
    /// The facilitator base URL does not use an approved scheme
    #[error("Invalid URL {0}, must start with http:// or https://")]
    InvalidBaseUrl(String),

    /// Error parsing URL
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// A required credential was neither passed explicitly nor found in the environment
    #[error("Missing credential {0}: pass it explicitly or set the environment variable")]
    MissingCredential(&'static str),

    /// The private key could not be decoded
    #[error("Invalid API key format: {0}")]
    InvalidKeyFormat(String),

    /// The private key decoded, but is neither a P-256 nor an Ed25519 key
    #[error("Unsupported key type: {0}")]
    UnsupportedKeyType(String),

    /// A configured value cannot be sent as an HTTP header
    #[error("Invalid value for header {name}")]
    InvalidHeaderValue {
        /// Header the value was destined for
        name: &'static str,
    },

    /// The HTTP client could not be built
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Signing the request token failed
    #[error("Could not sign the JWT: {0}")]
    SigningError(String),
}

/// Result type alias for facilitator client operations.
pub type Result<T> = std::result::Result<T, FacilitatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FacilitatorError::InvalidBaseUrl("ftp://facilitator".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid URL ftp://facilitator, must start with http:// or https://"
        );

        let err = FacilitatorError::MissingCredential("CDP_API_KEY_ID");
        assert!(err.to_string().contains("CDP_API_KEY_ID"));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: FacilitatorError = json_err.into();
        assert!(matches!(err, FacilitatorError::JsonError(_)));

        let url_err = url::Url::parse("not a url").unwrap_err();
        let err: FacilitatorError = url_err.into();
        assert!(matches!(err, FacilitatorError::UrlParseError(_)));
    }
}
