//! Facilitator client configuration.
//!
//! Credentials are read from the environment once, into these structs, and handed
//! to a client at construction. Nothing is re-read per call.

use crate::errors::{FacilitatorError, Result};
use crate::facilitator::{Facilitator, SignedFacilitatorClient, SimpleFacilitatorClient};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable holding the API key identifier.
pub const CDP_API_KEY_ID_ENV: &str = "CDP_API_KEY_ID";

/// Environment variable holding the API private key secret.
pub const CDP_API_KEY_SECRET_ENV: &str = "CDP_API_KEY_SECRET";

/// Base URL of the production Coinbase facilitator.
pub const COINBASE_FACILITATOR_BASE_URL: &str = "https://api.cdp.coinbase.com";

/// Route prefix of the facilitator's `/verify` and `/settle` endpoints on the production host.
pub const COINBASE_FACILITATOR_ROUTE: &str = "/platform/v2/x402";

/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `user-agent` sent with every facilitator request.
pub const USER_AGENT: &str = concat!("x402-facilitator-client-rust/", env!("CARGO_PKG_VERSION"));

/// An API key identifier and its secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    /// Key identifier
    pub key_id: String,

    /// Private key secret (PEM or base64)
    pub key_secret: String,
}

impl ApiCredentials {
    /// Creates credentials from explicit values.
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
        }
    }

    /// Reads `CDP_API_KEY_ID` and `CDP_API_KEY_SECRET`.
    ///
    /// Returns `None` unless both are set and non-empty.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(env_lookup)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let key_id = lookup(CDP_API_KEY_ID_ENV)?;
        let key_secret = lookup(CDP_API_KEY_SECRET_ENV)?;
        Some(Self::new(key_id, key_secret))
    }
}

impl fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .finish()
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Configuration for [`SimpleFacilitatorClient`].
#[derive(Clone, Debug)]
pub struct SimpleFacilitatorConfig {
    /// Facilitator base URL, e.g. `https://x402.org/facilitator`
    pub base_url: String,

    /// Static credentials sent as plain headers, if any
    pub credentials: Option<ApiCredentials>,

    /// Per-call timeout
    pub timeout: Duration,
}

impl SimpleFacilitatorConfig {
    /// Creates a configuration without credentials.
    ///
    /// # Examples
    ///
    /// ```
    /// use x402_facilitator_client::config::SimpleFacilitatorConfig;
    ///
    /// let config = SimpleFacilitatorConfig::new("https://x402.org/facilitator");
    /// assert!(config.credentials.is_none());
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Creates a configuration that picks up credentials from the environment when both are present.
    pub fn from_env(base_url: impl Into<String>) -> Self {
        Self {
            credentials: ApiCredentials::from_env(),
            ..Self::new(base_url)
        }
    }

    /// Sets static credentials.
    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Identifies the calling SDK in the `Correlation-Context` header.
///
/// Purely diagnostic; the facilitator does not authenticate with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationContext {
    /// Version of this SDK
    pub sdk_version: String,

    /// Language of this SDK
    pub sdk_language: String,

    /// Name of the integration using the SDK
    pub source: String,

    /// Version of the integration using the SDK
    pub source_version: String,
}

impl Default for CorrelationContext {
    fn default() -> Self {
        Self {
            sdk_version: env!("CARGO_PKG_VERSION").to_string(),
            sdk_language: "rust".to_string(),
            source: env!("CARGO_PKG_NAME").to_string(),
            source_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl CorrelationContext {
    /// Identifies an integration built on top of this SDK.
    pub fn for_integration(source: impl Into<String>, source_version: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            source_version: source_version.into(),
            ..Self::default()
        }
    }

    /// Renders the comma-separated `key=value` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use x402_facilitator_client::config::CorrelationContext;
    ///
    /// let context = CorrelationContext::for_integration("my-paywall", "2.1.0");
    /// assert!(context.header_value().ends_with("source=my-paywall,source_version=2.1.0"));
    /// ```
    pub fn header_value(&self) -> String {
        [
            ("sdk_version", &self.sdk_version),
            ("sdk_language", &self.sdk_language),
            ("source", &self.source),
            ("source_version", &self.source_version),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Configuration for [`SignedFacilitatorClient`].
#[derive(Clone, Debug)]
pub struct SignedFacilitatorConfig {
    /// Key identifier and private key used to sign every request
    pub credentials: ApiCredentials,

    /// Facilitator host; the production endpoint unless overridden
    pub base_url: String,

    /// Diagnostic SDK identification
    pub correlation: CorrelationContext,

    /// Per-call timeout
    pub timeout: Duration,
}

impl SignedFacilitatorConfig {
    /// Creates a configuration from explicit credentials.
    pub fn new(api_key_id: impl Into<String>, api_key_secret: impl Into<String>) -> Self {
        Self {
            credentials: ApiCredentials::new(api_key_id, api_key_secret),
            base_url: COINBASE_FACILITATOR_BASE_URL.to_string(),
            correlation: CorrelationContext::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Reads both credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorError::MissingCredential`] if either variable is unset.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// Uses the explicit values where given and falls back to the environment otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`FacilitatorError::MissingCredential`] if a value is missing from both.
    pub fn resolve(api_key_id: Option<String>, api_key_secret: Option<String>) -> Result<Self> {
        Self::resolve_with(api_key_id, api_key_secret, env_lookup)
    }

    fn resolve_with(
        api_key_id: Option<String>,
        api_key_secret: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key_id = api_key_id
            .filter(|value| !value.is_empty())
            .or_else(|| lookup(CDP_API_KEY_ID_ENV))
            .ok_or(FacilitatorError::MissingCredential(CDP_API_KEY_ID_ENV))?;
        let api_key_secret = api_key_secret
            .filter(|value| !value.is_empty())
            .or_else(|| lookup(CDP_API_KEY_SECRET_ENV))
            .ok_or(FacilitatorError::MissingCredential(CDP_API_KEY_SECRET_ENV))?;
        Ok(Self::new(api_key_id, api_key_secret))
    }

    /// Points the client at a different host, e.g. a proxy in front of the facilitator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the SDK identification sent in `Correlation-Context`.
    pub fn with_correlation(mut self, correlation: CorrelationContext) -> Self {
        self.correlation = correlation;
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Selects which facilitator backend a service talks to.
#[derive(Clone, Debug)]
pub enum FacilitatorConfig {
    /// Plain JSON posts to a configurable facilitator
    Simple(SimpleFacilitatorConfig),

    /// JWT-authenticated posts to the Coinbase facilitator
    Signed(SignedFacilitatorConfig),
}

impl FacilitatorConfig {
    /// Builds the configured client behind the common [`Facilitator`] interface.
    ///
    /// # Errors
    ///
    /// Returns a [`FacilitatorError`] for any configuration problem of the chosen backend.
    pub fn build(self) -> Result<Arc<dyn Facilitator>> {
        Ok(match self {
            Self::Simple(config) => Arc::new(SimpleFacilitatorClient::new(config)?),
            Self::Signed(config) => Arc::new(SignedFacilitatorClient::new(config)?),
        })
    }
}

impl From<SimpleFacilitatorConfig> for FacilitatorConfig {
    fn from(config: SimpleFacilitatorConfig) -> Self {
        Self::Simple(config)
    }
}

impl From<SignedFacilitatorConfig> for FacilitatorConfig {
    fn from(config: SignedFacilitatorConfig) -> Self {
        Self::Signed(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_credentials_require_both_values() {
        let only_id = lookup_from(&[(CDP_API_KEY_ID_ENV, "key-id")]);
        assert!(ApiCredentials::from_lookup(only_id).is_none());

        let both = lookup_from(&[(CDP_API_KEY_ID_ENV, "key-id"), (CDP_API_KEY_SECRET_ENV, "s3cret")]);
        let credentials = ApiCredentials::from_lookup(both).unwrap();
        assert_eq!(credentials, ApiCredentials::new("key-id", "s3cret"));
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let rendered = format!("{:?}", ApiCredentials::new("key-id", "s3cret"));
        assert!(rendered.contains("key-id"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_simple_config_builders() {
        let config = SimpleFacilitatorConfig::new("https://x402.org/facilitator")
            .with_credentials(ApiCredentials::new("id", "secret"))
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.credentials.unwrap().key_id, "id");
    }

    #[test]
    fn test_signed_config_explicit_values_win() {
        let env = lookup_from(&[(CDP_API_KEY_ID_ENV, "env-id"), (CDP_API_KEY_SECRET_ENV, "env-secret")]);
        let config =
            SignedFacilitatorConfig::resolve_with(Some("explicit-id".to_string()), None, env).unwrap();

        assert_eq!(config.credentials.key_id, "explicit-id");
        assert_eq!(config.credentials.key_secret, "env-secret");
        assert_eq!(config.base_url, COINBASE_FACILITATOR_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_signed_config_missing_secret() {
        let env = lookup_from(&[(CDP_API_KEY_ID_ENV, "env-id")]);
        let err = SignedFacilitatorConfig::resolve_with(None, None, env).unwrap_err();
        assert!(matches!(
            err,
            FacilitatorError::MissingCredential(CDP_API_KEY_SECRET_ENV)
        ));
    }

    #[test]
    fn test_correlation_header_value() {
        let context = CorrelationContext {
            sdk_version: "1.0.0".to_string(),
            sdk_language: "rust".to_string(),
            source: "paywall".to_string(),
            source_version: "0.3.1".to_string(),
        };
        assert_eq!(
            context.header_value(),
            "sdk_version=1.0.0,sdk_language=rust,source=paywall,source_version=0.3.1"
        );
    }
}
