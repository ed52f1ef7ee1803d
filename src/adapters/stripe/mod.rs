//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port twice: [`StripeGateway`] against the
//! Stripe REST API, and [`StubPaymentGateway`] as the deterministic fallback
//! selected when no credentials are configured.
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod gateway;
mod stub;
mod webhook_types;

pub use gateway::{StripeConfig, StripeGateway};
pub use stub::StubPaymentGateway;
pub use webhook_types::{SignatureHeader, SignatureParseError, StripeEvent, StripePaymentIntent};
