//! Example stand-in facilitator service.
//!
//! Speaks the plain facilitator wire format so the `server` example has something to
//! talk to. It accepts any payment header that is valid base64 JSON and "settles" it
//! with a made-up transaction hash. Nothing touches a chain.
//!
//! Run with:
//! ```bash
//! cargo run --example facilitator
//! ```
//!
//! Environment variables:
//! - PORT: Server port (default: 3001)

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use x402_facilitator_client::utils::generate_numeric_nonce;
use x402_facilitator_client::{PaymentRequirements, SettleResponse, VerifyResponse};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacilitatorBody {
    payment_header: String,
    payment_requirements: PaymentRequirements,
}

fn check(body: &FacilitatorBody) -> Result<Value, String> {
    let decoded = STANDARD
        .decode(&body.payment_header)
        .map_err(|_| "invalid_payload".to_string())?;
    let payload: Value =
        serde_json::from_slice(&decoded).map_err(|_| "invalid_payload".to_string())?;

    if payload["network"] != body.payment_requirements.network.as_str() {
        return Err("invalid_network".to_string());
    }
    Ok(payload)
}

async fn verify_handler(Json(body): Json<FacilitatorBody>) -> impl IntoResponse {
    let response = match check(&body) {
        Ok(_) => VerifyResponse::valid(),
        Err(reason) => VerifyResponse::invalid(reason),
    };
    tracing::info!(is_valid = response.is_valid, "verify");
    Json(response)
}

async fn settle_handler(Json(body): Json<FacilitatorBody>) -> impl IntoResponse {
    match check(&body) {
        Ok(payload) => {
            let transaction = format!("0x{}", generate_numeric_nonce());
            tracing::info!(%transaction, "settle");
            let payer = payload["payload"]["authorization"]["from"]
                .as_str()
                .map(str::to_owned);
            (
                StatusCode::OK,
                Json(SettleResponse::settled(
                    transaction,
                    body.payment_requirements.network,
                    payer,
                )),
            )
        }
        Err(reason) => (StatusCode::BAD_REQUEST, Json(SettleResponse::failed(reason))),
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "x402-facilitator",
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()?;

    let app = Router::new()
        .route("/verify", post(verify_handler))
        .route("/settle", post(settle_handler))
        .route("/health", axum::routing::get(health_handler))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "facilitator listening");

    axum::serve(listener, app).await?;

    Ok(())
}
