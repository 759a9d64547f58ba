//! The HTTP connection pool owned by a facilitator client.

use crate::errors::{FacilitatorError, Result};
use crate::types::FacilitatorRequest;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Status and body of a facilitator reply, captured before any interpretation.
#[derive(Debug, Clone)]
pub(crate) struct RawReply {
    pub status: StatusCode,
    pub body: String,
}

/// Why an outbound call produced no [`RawReply`].
#[derive(thiserror::Error, Debug)]
pub(crate) enum CallError {
    #[error("{0}")]
    Signing(#[from] FacilitatorError),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("expected a JSON object in the response body")]
    NotAnObject,

    #[error("facilitator client has been shut down")]
    ShutDown,
}

/// One pooled `reqwest` client, released by [`HttpTransport::shutdown`].
#[derive(Debug)]
pub(crate) struct HttpTransport {
    client: RwLock<Option<Client>>,
}

impl HttpTransport {
    /// Builds the pool with a per-call timeout. Redirects are followed.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client: RwLock::new(Some(client)),
        })
    }

    /// POSTs `body` as JSON and captures the reply.
    ///
    /// Dropping the returned future abandons the in-flight connection.
    pub async fn post(
        &self,
        url: &Url,
        headers: HeaderMap,
        body: &FacilitatorRequest<'_>,
    ) -> std::result::Result<RawReply, CallError> {
        // Clone out of the lock so concurrent calls never wait on each other.
        let client = self.client.read().await.clone().ok_or(CallError::ShutDown)?;

        tracing::debug!(%url, "posting to facilitator");
        let response = client
            .post(url.clone())
            .headers(headers)
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(RawReply { status, body })
    }

    /// Releases the pool. Returns false if it was already released.
    pub async fn shutdown(&self) -> bool {
        self.client.write().await.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentRequirements;

    fn requirements() -> PaymentRequirements {
        PaymentRequirements {
            scheme: "exact".to_string(),
            network: "base".to_string(),
            max_amount_required: "1".to_string(),
            resource: "/".to_string(),
            description: None,
            mime_type: None,
            output_schema: None,
            pay_to: "0x0".to_string(),
            max_timeout_seconds: 60,
            asset: "0x0".to_string(),
            extra: None,
        }
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
        assert!(transport.shutdown().await);
        assert!(!transport.shutdown().await);
    }

    #[tokio::test]
    async fn test_post_after_shutdown_fails() {
        let transport = HttpTransport::new(Duration::from_secs(1)).unwrap();
        transport.shutdown().await;

        let requirements = requirements();
        let url = Url::parse("http://127.0.0.1:1/verify").unwrap();
        let body = FacilitatorRequest {
            payment_header: "header",
            payment_requirements: &requirements,
        };
        let err = transport
            .post(&url, HeaderMap::new(), &body)
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::ShutDown));
    }
}
