//! Value types exchanged with a facilitator.
//!
//! [`PaymentRequirements`] is passed through to the facilitator untouched. The two
//! result types, [`VerifyResponse`] and [`SettleResponse`], are what every public
//! client operation returns, whether the facilitator answered or not.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reason carried by the synthetic settlement result when verification did not pass.
pub const VERIFICATION_FAILED: &str = "Verification failed";

/// Describes the payment requirements for a specific resource.
///
/// The client never inspects these; it only serializes them into the request body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    /// Payment scheme (e.g., "exact")
    pub scheme: String,

    /// Network identifier (e.g., "base", "base-sepolia")
    pub network: String,

    /// Maximum amount required in the smallest unit of the asset, as a decimal string
    pub max_amount_required: String,

    /// The resource URL or identifier
    pub resource: String,

    /// Human-readable description of what the payment is for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// MIME type of the resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// JSON schema describing the output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,

    /// Recipient address
    pub pay_to: String,

    /// Maximum time in seconds that the payment is valid
    pub max_timeout_seconds: u64,

    /// Token contract address
    pub asset: String,

    /// Scheme-specific extra data (e.g., {"name": "USDC", "version": "2"})
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

/// Body posted to both `/verify` and `/settle`.
#[derive(Serialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorRequest<'a> {
    /// The raw payment header, forwarded as-is
    pub payment_header: &'a str,

    /// The requirements the payment is checked against
    pub payment_requirements: &'a PaymentRequirements,
}

/// Outcome of a `/verify` exchange.
///
/// `error` is only ever populated when `is_valid` is false.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Whether the payment header satisfies the requirements
    pub is_valid: bool,

    /// Why the payment was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The standard x402 spelling of `error`, folded into it by `normalized()`
    #[serde(default, rename = "invalidReason", skip_serializing)]
    invalid_reason: Option<String>,
}

impl VerifyResponse {
    /// A successful verification.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error: None,
            invalid_reason: None,
        }
    }

    /// A failed verification with a human-readable reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(reason.into()),
            invalid_reason: None,
        }
    }

    /// Folds `invalidReason` into `error`, preferring `error` when both are set, and
    /// drops any error text a facilitator attached to a valid result.
    pub(crate) fn normalized(mut self) -> Self {
        let invalid_reason = self.invalid_reason.take();
        if self.is_valid {
            self.error = None;
        } else if self.error.is_none() {
            self.error = invalid_reason;
        }
        self
    }
}

/// Outcome of a `/settle` exchange.
///
/// On success `error_reason` is absent; on failure the settlement metadata is absent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    /// Whether the payment was settled
    pub success: bool,

    /// Settlement transaction identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,

    /// Network the payment settled on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Address of the payer, when the facilitator reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,

    /// Why settlement failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
}

impl SettleResponse {
    /// A successful settlement.
    pub fn settled(
        transaction: impl Into<String>,
        network: impl Into<String>,
        payer: Option<String>,
    ) -> Self {
        Self {
            success: true,
            transaction: Some(transaction.into()),
            network: Some(network.into()),
            payer,
            error_reason: None,
        }
    }

    /// A failed settlement with a human-readable reason.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction: None,
            network: None,
            payer: None,
            error_reason: Some(reason.into()),
        }
    }

    /// The result reported when settlement was skipped because verification failed.
    pub fn verification_failed() -> Self {
        Self::failed(VERIFICATION_FAILED)
    }
}
