//! Utility functions shared by the facilitator clients.

use crate::errors::Result;
use crate::types::SettleResponse;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::Rng;

/// Number of decimal digits in a JWT nonce.
pub const NONCE_DIGITS: usize = 16;

/// Encodes a [`SettleResponse`] as Base64 JSON for the `X-PAYMENT-RESPONSE` header.
///
/// # Examples
///
/// ```
/// use x402_facilitator_client::types::SettleResponse;
/// use x402_facilitator_client::utils::encode_payment_response_header;
///
/// let settlement = SettleResponse::settled("0xabc", "base", None);
/// let encoded = encode_payment_response_header(&settlement).unwrap();
/// assert!(!encoded.is_empty());
/// ```
pub fn encode_payment_response_header(settlement: &SettleResponse) -> Result<String> {
    let json = serde_json::to_string(settlement)?;
    Ok(BASE64.encode(json.as_bytes()))
}

/// Generates a random string of [`NONCE_DIGITS`] decimal digits.
///
/// Nonces are not tracked; two tokens may in principle share one.
///
/// # Examples
///
/// ```
/// use x402_facilitator_client::utils::generate_numeric_nonce;
///
/// let nonce = generate_numeric_nonce();
/// assert_eq!(nonce.len(), 16);
/// assert!(nonce.chars().all(|c| c.is_ascii_digit()));
/// ```
pub fn generate_numeric_nonce() -> String {
    let mut rng = rand::thread_rng();
    (0..NONCE_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Gets the current Unix timestamp in seconds.
///
/// # Examples
///
/// ```
/// use x402_facilitator_client::utils::current_timestamp;
///
/// let now = current_timestamp();
/// assert!(now > 1600000000); // After Sept 2020
/// ```
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
