//! Example paywalled server using Axum.
//!
//! Requests to `/weather` must carry an `X-PAYMENT` header. The header is handed to a
//! facilitator for verification and settlement before the weather is served.
//!
//! Run with:
//! ```bash
//! cargo run --example facilitator   # in another terminal
//! cargo run --example server
//! ```
//!
//! Environment variables (a `.env` file is honoured):
//! - PAY_TO: Address to receive payments
//! - FACILITATOR_URL: URL of a plain facilitator (default: http://localhost:3001)
//! - CDP_API_KEY_ID / CDP_API_KEY_SECRET: when both are set, use the Coinbase facilitator instead
//! - PORT: Server port (default: 3000)

use axum::{
    extract::State,
    http::{header::HeaderName, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use x402_facilitator_client::config::{
    CorrelationContext, SignedFacilitatorConfig, SimpleFacilitatorConfig,
};
use x402_facilitator_client::utils::encode_payment_response_header;
use x402_facilitator_client::{Facilitator, FacilitatorConfig, PaymentRequirements};

const X_PAYMENT: HeaderName = HeaderName::from_static("x-payment");
const X_PAYMENT_RESPONSE: HeaderName = HeaderName::from_static("x-payment-response");

struct AppState {
    facilitator: Arc<dyn Facilitator>,
    requirements: PaymentRequirements,
}

/// Protected endpoint that requires payment.
async fn weather_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(payment_header) = headers.get(X_PAYMENT) else {
        return Ok(payment_required(&state.requirements, "X-PAYMENT header is required"));
    };
    let payment_header = payment_header
        .to_str()
        .map_err(|_| AppError::InvalidPayment("Invalid payment header encoding".into()))?;

    let (verification, settlement) = state
        .facilitator
        .verify_then_settle(payment_header, &state.requirements)
        .await;

    if !verification.is_valid {
        let reason = verification.error.unwrap_or_default();
        return Ok(payment_required(&state.requirements, &reason));
    }
    if !settlement.success {
        let reason = settlement.error_reason.clone().unwrap_or_default();
        return Ok(payment_required(&state.requirements, &reason));
    }

    let encoded = encode_payment_response_header(&settlement)
        .map_err(|e| AppError::ServerError(e.to_string()))?;

    let weather_data = json!({
        "location": "San Francisco",
        "temperature": 68,
        "conditions": "Sunny",
        "humidity": 65,
        "paid": true,
        "transaction": settlement.transaction,
    });

    Ok((StatusCode::OK, [(X_PAYMENT_RESPONSE, encoded)], Json(weather_data)).into_response())
}

fn payment_required(requirements: &PaymentRequirements, error: &str) -> Response {
    (
        StatusCode::PAYMENT_REQUIRED,
        Json(json!({
            "x402Version": 1,
            "error": error,
            "accepts": [requirements],
        })),
    )
        .into_response()
}

/// Health check endpoint (no payment required).
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "protocol": "x402",
        "facilitator": state.facilitator.name(),
    }))
}

fn facilitator_config() -> anyhow::Result<FacilitatorConfig> {
    let credentials = (
        std::env::var("CDP_API_KEY_ID").ok(),
        std::env::var("CDP_API_KEY_SECRET").ok(),
    );
    if let (Some(_), Some(_)) = credentials {
        let config = SignedFacilitatorConfig::from_env()?
            .with_correlation(CorrelationContext::for_integration("weather-demo", "0.1.0"));
        return Ok(config.into());
    }

    let facilitator_url = std::env::var("FACILITATOR_URL")
        .unwrap_or_else(|_| "http://localhost:3001".to_string());
    Ok(SimpleFacilitatorConfig::new(facilitator_url).into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,x402_facilitator_client=debug")),
        )
        .init();

    let pay_to = std::env::var("PAY_TO")
        .unwrap_or_else(|_| "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()?;

    // $0.01 in USDC on Base Sepolia
    let requirements = PaymentRequirements {
        scheme: "exact".to_string(),
        network: "base-sepolia".to_string(),
        max_amount_required: "10000".to_string(),
        resource: format!("http://localhost:{port}/weather"),
        description: Some("Weather API access".to_string()),
        mime_type: Some("application/json".to_string()),
        output_schema: None,
        pay_to,
        max_timeout_seconds: 300,
        asset: "0x036CbD53842c5426634e7929541eC2318f3dCF7e".to_string(),
        extra: Some(json!({"name": "USDC", "version": "2"})),
    };

    let facilitator = facilitator_config()?.build()?;
    tracing::info!(facilitator = facilitator.name(), "payments configured");

    let state = Arc::new(AppState {
        facilitator: Arc::clone(&facilitator),
        requirements,
    });

    let app = Router::new()
        .route("/weather", get(weather_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    facilitator.shutdown().await;
    Ok(())
}

enum AppError {
    InvalidPayment(String),
    ServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidPayment(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
