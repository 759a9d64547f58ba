//! Facilitator client that posts plain JSON to a configurable base URL.
//!
//! Optional credentials travel as the static headers `X-CDP-API-KEY-ID` and
//! `X-CDP-API-SECRET`, unsigned and unhashed. Only send them over TLS. Whether a
//! given facilitator checks them at all is up to that facilitator.

use super::normalize::Normalizer;
use super::Facilitator;
use crate::config::{ApiCredentials, SimpleFacilitatorConfig, USER_AGENT};
use crate::errors::{FacilitatorError, Result};
use crate::transport::{CallError, HttpTransport, RawReply};
use crate::types::{FacilitatorRequest, PaymentRequirements, SettleResponse, VerifyResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use url::Url;

const API_KEY_ID_HEADER: HeaderName = HeaderName::from_static("x-cdp-api-key-id");
const API_SECRET_HEADER: HeaderName = HeaderName::from_static("x-cdp-api-secret");

/// Client for any facilitator exposing `POST {base}/verify` and `POST {base}/settle`.
#[derive(Debug)]
pub struct SimpleFacilitatorClient {
    base_url: String,
    verify_url: Url,
    settle_url: Url,
    headers: HeaderMap,
    transport: HttpTransport,
}

impl SimpleFacilitatorClient {
    /// Builds a client from its configuration.
    ///
    /// # Errors
    ///
    /// Fails if the base URL is not `http://` or `https://`, if a credential
    /// cannot be sent as a header, or if the HTTP client cannot be built.
    ///
    /// # Examples
    ///
    /// ```
    /// use x402_facilitator_client::config::SimpleFacilitatorConfig;
    /// use x402_facilitator_client::facilitator::SimpleFacilitatorClient;
    ///
    /// let client = SimpleFacilitatorClient::new(
    ///     SimpleFacilitatorConfig::new("https://x402.org/facilitator/"),
    /// ).unwrap();
    /// assert_eq!(client.verify_url().as_str(), "https://x402.org/facilitator/verify");
    ///
    /// assert!(SimpleFacilitatorClient::new(SimpleFacilitatorConfig::new("x402.org")).is_err());
    /// ```
    pub fn new(config: SimpleFacilitatorConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(FacilitatorError::InvalidBaseUrl(config.base_url));
        }

        let verify_url = Url::parse(&format!("{base_url}/verify"))?;
        let settle_url = Url::parse(&format!("{base_url}/settle"))?;
        let headers = request_headers(config.credentials.as_ref())?;
        let transport = HttpTransport::new(config.timeout)?;

        tracing::info!(
            %base_url,
            authenticated = config.credentials.is_some(),
            "facilitator client ready"
        );

        Ok(Self {
            base_url,
            verify_url,
            settle_url,
            headers,
            transport,
        })
    }

    /// Builds a client for `base_url`, picking up credentials from the environment.
    ///
    /// # Errors
    ///
    /// See [`SimpleFacilitatorClient::new`].
    pub fn from_env(base_url: impl Into<String>) -> Result<Self> {
        Self::new(SimpleFacilitatorConfig::from_env(base_url))
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of the verify endpoint.
    pub fn verify_url(&self) -> &Url {
        &self.verify_url
    }

    /// Full URL of the settle endpoint.
    pub fn settle_url(&self) -> &Url {
        &self.settle_url
    }

    /// Whether static credential headers are attached to requests.
    pub fn is_authenticated(&self) -> bool {
        self.headers.contains_key(API_KEY_ID_HEADER)
    }

    async fn post(
        &self,
        url: &Url,
        payment_header: &str,
        requirements: &PaymentRequirements,
    ) -> std::result::Result<RawReply, CallError> {
        let body = FacilitatorRequest {
            payment_header,
            payment_requirements: requirements,
        };
        self.transport.post(url, self.headers.clone(), &body).await
    }
}

#[async_trait]
impl Facilitator for SimpleFacilitatorClient {
    fn name(&self) -> &str {
        "simple"
    }

    async fn verify(
        &self,
        payment_header: &str,
        requirements: &PaymentRequirements,
    ) -> VerifyResponse {
        let outcome = self.post(&self.verify_url, payment_header, requirements).await;
        Normalizer::SIMPLE.verify(outcome)
    }

    async fn settle(
        &self,
        payment_header: &str,
        requirements: &PaymentRequirements,
    ) -> SettleResponse {
        let outcome = self.post(&self.settle_url, payment_header, requirements).await;
        Normalizer::SIMPLE.settle(outcome)
    }

    async fn shutdown(&self) {
        if self.transport.shutdown().await {
            tracing::info!(base_url = %self.base_url, "facilitator client shut down");
        }
    }
}

fn request_headers(credentials: Option<&ApiCredentials>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

    if let Some(credentials) = credentials {
        let key_id = HeaderValue::from_str(&credentials.key_id).map_err(|_| {
            FacilitatorError::InvalidHeaderValue {
                name: "X-CDP-API-KEY-ID",
            }
        })?;
        let mut secret = HeaderValue::from_str(&credentials.key_secret).map_err(|_| {
            FacilitatorError::InvalidHeaderValue {
                name: "X-CDP-API-SECRET",
            }
        })?;
        secret.set_sensitive(true);

        headers.insert(API_KEY_ID_HEADER, key_id);
        headers.insert(API_SECRET_HEADER, secret);
    }

    Ok(headers)
}
