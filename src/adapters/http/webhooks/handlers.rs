//! Webhook endpoint handlers.
//!
//! Per-request state machine: received -> signature-checked ->
//! delegated-to-connector -> event-normalized -> dispatched. A missing or
//! empty signature header terminates before the connector is invoked. Any
//! connector error is reduced to one fixed client-error body; the underlying
//! detail is logged here and never leaks into the response.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use crate::application::{
    ProcessFulfillmentWebhookCommand, ProcessFulfillmentWebhookHandler,
    ProcessPaymentWebhookCommand, ProcessPaymentWebhookHandler,
};
use crate::ports::{FulfillmentProvider, PaymentGateway};

use super::dto::{PrintfulWebhookAck, StripeWebhookAck, WebhookErrorResponse};

/// Payment provider signature header.
pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Fulfillment provider signature header.
pub const PRINTFUL_SIGNATURE_HEADER: &str = "X-Printful-Signature";

/// State for the webhook routes.
///
/// Holds the ports, not concrete adapters; the same routes serve live and
/// stub configurations.
#[derive(Clone)]
pub struct WebhookAppState {
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub fulfillment_provider: Arc<dyn FulfillmentProvider>,
}

impl WebhookAppState {
    fn payment_webhook_handler(&self) -> ProcessPaymentWebhookHandler {
        ProcessPaymentWebhookHandler::new(Arc::clone(&self.payment_gateway))
    }

    fn fulfillment_webhook_handler(&self) -> ProcessFulfillmentWebhookHandler {
        ProcessFulfillmentWebhookHandler::new(Arc::clone(&self.fulfillment_provider))
    }
}

/// Extract a signature header, treating absent and empty alike.
fn signature_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

/// `POST /api/v1/webhooks/stripe`
pub async fn handle_stripe_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = signature_header(&headers, STRIPE_SIGNATURE_HEADER) else {
        warn!(provider = "stripe", "webhook rejected: missing signature header");
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookErrorResponse::missing_signature()),
        )
            .into_response();
    };

    let cmd = ProcessPaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.payment_webhook_handler().handle(cmd).await {
        Ok(processed) => (
            StatusCode::OK,
            Json(StripeWebhookAck {
                received: true,
                event_id: processed.event_id,
            }),
        )
            .into_response(),
        Err(err) => {
            error!(provider = "stripe", error = %err, "webhook processing failed");
            (
                StatusCode::BAD_REQUEST,
                Json(WebhookErrorResponse::processing_failed()),
            )
                .into_response()
        }
    }
}

/// `POST /api/v1/webhooks/printful`
pub async fn handle_printful_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = signature_header(&headers, PRINTFUL_SIGNATURE_HEADER) else {
        warn!(provider = "printful", "webhook rejected: missing signature header");
        return (
            StatusCode::BAD_REQUEST,
            Json(WebhookErrorResponse::missing_signature()),
        )
            .into_response();
    };

    let cmd = ProcessFulfillmentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.fulfillment_webhook_handler().handle(cmd).await {
        Ok(processed) => (
            StatusCode::OK,
            Json(PrintfulWebhookAck {
                received: true,
                event_type: processed.event_type.as_str().to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            error!(provider = "printful", error = %err, "webhook processing failed");
            (
                StatusCode::BAD_REQUEST,
                Json(WebhookErrorResponse::processing_failed()),
            )
                .into_response()
        }
    }
}
