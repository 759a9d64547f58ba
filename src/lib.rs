//! # x402-facilitator-client
//!
//! Clients for the facilitator side of the x402 protocol: hand a payment header and
//! the resource's payment requirements to a remote facilitator, have it verified and
//! settled, and get back a uniform yes/no outcome with settlement metadata.
//!
//! ## Backends
//!
//! - [`SimpleFacilitatorClient`]: posts to `{base_url}/verify` and `{base_url}/settle`,
//!   optionally with static credential headers.
//! - [`SignedFacilitatorClient`]: posts to the Coinbase CDP facilitator, authenticating
//!   every request with a short-lived ES256 or EdDSA JWT bound to the endpoint.
//!
//! Both implement [`Facilitator`], so a service can select one through
//! [`FacilitatorConfig`] and hold it as `Arc<dyn Facilitator>`.
//!
//! ## Failure model
//!
//! Constructors return [`FacilitatorError`] for configuration mistakes: a bad base URL,
//! missing credentials, or an unusable private key. After that, `verify`, `settle` and
//! `verify_then_settle` never fail. Facilitator rejections, transport errors, timeouts,
//! undecodable bodies and signing problems all become `is_valid == false` or
//! `success == false` with a readable reason.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use x402_facilitator_client::config::SimpleFacilitatorConfig;
//! use x402_facilitator_client::{Facilitator, FacilitatorConfig, PaymentRequirements};
//!
//! # async fn example(payment_header: &str, requirements: PaymentRequirements)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let facilitator =
//!     FacilitatorConfig::from(SimpleFacilitatorConfig::from_env("https://x402.org/facilitator"))
//!         .build()?;
//!
//! let (verification, settlement) = facilitator
//!     .verify_then_settle(payment_header, &requirements)
//!     .await;
//! if settlement.success {
//!     println!("settled in {:?}", settlement.transaction);
//! } else {
//!     println!("rejected: {:?} / {:?}", verification.error, settlement.error_reason);
//! }
//!
//! facilitator.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## References
//!
//! - [x402 Specification](https://github.com/coinbase/x402)
//! - [x402.org](https://x402.org)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod facilitator;
mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::FacilitatorConfig;
pub use errors::{FacilitatorError, Result};
pub use facilitator::{Facilitator, SignedFacilitatorClient, SimpleFacilitatorClient};
pub use types::{PaymentRequirements, SettleResponse, VerifyResponse};
