//! Wire DTOs for the webhook endpoints.
//!
//! Responses are deliberately fixed shapes: success acknowledgements echo
//! only the event ID or type, and error bodies never carry verification
//! detail (that stays in the server-side logs).

use serde::Serialize;

/// Acknowledgement for a processed payment webhook.
#[derive(Debug, Serialize)]
pub struct StripeWebhookAck {
    pub received: bool,
    pub event_id: String,
}

/// Acknowledgement for a processed fulfillment webhook.
#[derive(Debug, Serialize)]
pub struct PrintfulWebhookAck {
    pub received: bool,
    pub event_type: String,
}

/// Fixed client-error body for webhook rejections.
#[derive(Debug, Serialize)]
pub struct WebhookErrorResponse {
    pub error: &'static str,
}

impl WebhookErrorResponse {
    /// The signature header was absent or empty.
    pub fn missing_signature() -> Self {
        Self {
            error: "Missing signature header",
        }
    }

    /// Verification or normalization failed. The underlying detail is
    /// logged server-side and never echoed to the caller.
    pub fn processing_failed() -> Self {
        Self {
            error: "Webhook processing failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ack_serializes_expected_shape() {
        let ack = StripeWebhookAck {
            received: true,
            event_id: "evt_123".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&ack).unwrap(),
            json!({"received": true, "event_id": "evt_123"})
        );
    }

    #[test]
    fn error_bodies_are_fixed() {
        assert_eq!(
            serde_json::to_value(WebhookErrorResponse::processing_failed()).unwrap(),
            json!({"error": "Webhook processing failed"})
        );
        assert_eq!(
            serde_json::to_value(WebhookErrorResponse::missing_signature()).unwrap(),
            json!({"error": "Missing signature header"})
        );
    }
}
