//! Webhook HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use handlers::{
    handle_printful_webhook, handle_stripe_webhook, WebhookAppState, PRINTFUL_SIGNATURE_HEADER,
    STRIPE_SIGNATURE_HEADER,
};
pub use routes::webhook_routes;
