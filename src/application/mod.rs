//! Application layer - command handlers.
//!
//! Orchestrates port operations for inbound requests. Webhook handlers own
//! the verify -> normalize -> dispatch sequence; the HTTP adapter only
//! extracts headers and bodies.

pub mod webhooks;

pub use webhooks::{
    FulfillmentWebhookOutcome, PaymentWebhookOutcome, ProcessFulfillmentWebhookCommand,
    ProcessFulfillmentWebhookHandler, ProcessPaymentWebhookCommand, ProcessPaymentWebhookHandler,
    ProcessedFulfillmentWebhook, ProcessedPaymentWebhook,
};
