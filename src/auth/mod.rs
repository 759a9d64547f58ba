//! Request authentication for the signed facilitator client.

pub mod jwt;
pub mod keys;

pub use jwt::{Claims, JWT_AUDIENCE, JWT_ISSUER, TOKEN_LIFETIME_SECS};
pub use keys::KeyAlgorithm;
