//! Maps whatever happened on the wire onto [`VerifyResponse`] and [`SettleResponse`].

use crate::transport::{CallError, RawReply};
use crate::types::{SettleResponse, VerifyResponse};
use reqwest::StatusCode;
use serde_json::{Map, Value};

/// How a backend phrases its failure reasons.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Normalizer {
    /// Prefix for non-200 verify replies, e.g. "Facilitator error"
    rejected: &'static str,
    /// Appended to "Failed to verify payment", e.g. " with Coinbase facilitator"
    via: &'static str,
}

impl Normalizer {
    pub const SIMPLE: Self = Self {
        rejected: "Facilitator error",
        via: "",
    };

    pub const COINBASE: Self = Self {
        rejected: "Coinbase facilitator error",
        via: " with Coinbase facilitator",
    };

    pub fn verify(&self, outcome: Result<RawReply, CallError>) -> VerifyResponse {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(err) => return self.verify_failure(&err),
        };

        if reply.status != StatusCode::OK {
            tracing::warn!(status = %reply.status, "facilitator rejected verify request");
            return VerifyResponse::invalid(format!(
                "{}: {} {}",
                self.rejected,
                reply.status.as_u16(),
                reply.body
            ));
        }

        match serde_json::from_str::<VerifyResponse>(&reply.body) {
            Ok(verification) => verification.normalized(),
            Err(err) => self.verify_failure(&CallError::Decode(err)),
        }
    }

    pub fn settle(&self, outcome: Result<RawReply, CallError>) -> SettleResponse {
        let reply = match outcome {
            Ok(reply) => reply,
            Err(err) => return self.settle_failure(&err),
        };

        if reply.status != StatusCode::OK {
            tracing::warn!(status = %reply.status, "facilitator rejected settle request");
            return SettleResponse::failed(settle_rejection(reply.status, &reply.body));
        }

        match serde_json::from_str::<Value>(&reply.body) {
            Ok(Value::Object(data)) => settled_from(&data),
            Ok(_) => self.settle_failure(&CallError::NotAnObject),
            Err(err) => self.settle_failure(&CallError::Decode(err)),
        }
    }

    fn verify_failure(&self, err: &CallError) -> VerifyResponse {
        tracing::warn!(error = %err, "verify call failed");
        VerifyResponse::invalid(format!("Failed to verify payment{}: {err}", self.via))
    }

    fn settle_failure(&self, err: &CallError) -> SettleResponse {
        tracing::warn!(error = %err, "settle call failed");
        SettleResponse::failed(format!("Failed to settle payment{}: {err}", self.via))
    }
}

/// Missing fields degrade to defaults rather than failing the settlement.
fn settled_from(data: &Map<String, Value>) -> SettleResponse {
    let field = |name: &str| data.get(name).and_then(Value::as_str);
    SettleResponse::settled(
        field("transaction").unwrap_or_default(),
        field("network").unwrap_or("unknown"),
        field("payer").map(str::to_owned),
    )
}

/// Prefers the facilitator's `errorReason`; falls back to status and raw body.
fn settle_rejection(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(data)) => match data.get("errorReason") {
            Some(Value::String(reason)) => reason.clone(),
            Some(other) => other.to_string(),
            None => format!("HTTP {}", status.as_u16()),
        },
        _ => format!("HTTP {}: {}", status.as_u16(), body),
    }
}
