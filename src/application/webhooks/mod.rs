//! Webhook command handlers.
//!
//! One handler per inbound-webhook-capable provider. Each delegates
//! signature verification and normalization to its port, then dispatches on
//! the canonical event type. Side effects are logged here; the event-bus
//! emission a full deployment would wire up consumes the same outcomes.

mod process_fulfillment_webhook;
mod process_payment_webhook;

pub use process_fulfillment_webhook::{
    FulfillmentWebhookOutcome, ProcessFulfillmentWebhookCommand, ProcessFulfillmentWebhookHandler,
    ProcessedFulfillmentWebhook,
};
pub use process_payment_webhook::{
    PaymentWebhookOutcome, ProcessPaymentWebhookCommand, ProcessPaymentWebhookHandler,
    ProcessedPaymentWebhook,
};
