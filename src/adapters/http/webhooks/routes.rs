//! Axum router configuration for the webhook endpoints.
//!
//! Webhooks carry no user authentication; authenticity is the provider
//! signature verified by the connector.

use axum::{routing::post, Router};

use super::handlers::{handle_printful_webhook, handle_stripe_webhook, WebhookAppState};

/// Create the webhook router.
///
/// # Routes
/// - `POST /stripe` - payment provider events
/// - `POST /printful` - fulfillment provider events
///
/// Mount under `/api/v1/webhooks`.
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/stripe", post(handle_stripe_webhook))
        .route("/printful", post(handle_printful_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::printful::StubFulfillmentProvider;
    use crate::adapters::stripe::StubPaymentGateway;

    #[test]
    fn webhook_routes_creates_router() {
        let state = WebhookAppState {
            payment_gateway: Arc::new(StubPaymentGateway::new()),
            fulfillment_provider: Arc::new(StubFulfillmentProvider::new()),
        };
        let _: Router<()> = webhook_routes().with_state(state);
    }
}
