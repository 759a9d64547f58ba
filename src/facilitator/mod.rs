//! Clients for remote x402 facilitators.
//!
//! Both backends implement [`Facilitator`]; a service picks one through
//! [`FacilitatorConfig`](crate::config::FacilitatorConfig) and never needs to know which.

mod normalize;
pub mod signed;
pub mod simple;

pub use signed::SignedFacilitatorClient;
pub use simple::SimpleFacilitatorClient;

use crate::types::{PaymentRequirements, SettleResponse, VerifyResponse};
use async_trait::async_trait;

/// A remote service that verifies and settles payments.
///
/// Every operation returns a well-formed result. Transport failures, non-200
/// replies, undecodable bodies and signing failures all come back as
/// `is_valid == false` / `success == false` with a reason. Implementations
/// hold no per-call state and may be shared across tasks.
#[async_trait]
pub trait Facilitator: Send + Sync {
    /// Short name of the backend, for logs.
    fn name(&self) -> &str;

    /// Checks a payment header against requirements without moving funds.
    async fn verify(
        &self,
        payment_header: &str,
        requirements: &PaymentRequirements,
    ) -> VerifyResponse;

    /// Executes the payment.
    async fn settle(
        &self,
        payment_header: &str,
        requirements: &PaymentRequirements,
    ) -> SettleResponse;

    /// Verifies, then settles only if verification passed.
    ///
    /// When verification fails the facilitator's settle endpoint is not contacted
    /// and the settlement result is [`SettleResponse::verification_failed`].
    async fn verify_then_settle(
        &self,
        payment_header: &str,
        requirements: &PaymentRequirements,
    ) -> (VerifyResponse, SettleResponse) {
        let verification = self.verify(payment_header, requirements).await;
        if !verification.is_valid {
            tracing::debug!(facilitator = self.name(), "verification failed, skipping settlement");
            return (verification, SettleResponse::verification_failed());
        }

        let settlement = self.settle(payment_header, requirements).await;
        (verification, settlement)
    }

    /// Releases the connection pool. Calls made afterwards return failure results.
    async fn shutdown(&self);
}
