//! HTTP adapters - the inbound API surface.

pub mod health;
pub mod webhooks;

pub use health::{health, HealthAppState};
pub use webhooks::{webhook_routes, WebhookAppState};
