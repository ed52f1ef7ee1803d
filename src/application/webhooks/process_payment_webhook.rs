//! ProcessPaymentWebhookHandler - command handler for payment provider
//! webhooks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ports::{PaymentError, PaymentEventType, PaymentGateway, PaymentWebhookEvent};

/// Command to process a payment webhook.
#[derive(Debug, Clone)]
pub struct ProcessPaymentWebhookCommand {
    /// Raw webhook payload.
    pub payload: Vec<u8>,

    /// Webhook signature header value.
    pub signature: String,
}

/// A processed payment webhook.
#[derive(Debug, Clone)]
pub struct ProcessedPaymentWebhook {
    /// Vendor event ID, echoed in the acknowledgement.
    pub event_id: String,

    pub outcome: PaymentWebhookOutcome,
}

/// What the dispatch decided for the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentWebhookOutcome {
    /// Payment settled; the order workflow is notified.
    PaymentSucceeded { payment_intent_id: Option<String> },

    /// Payment attempt failed; the order workflow is notified.
    PaymentFailed { payment_intent_id: Option<String> },

    /// A charge was refunded; the order workflow is notified.
    RefundRecorded { charge_id: Option<String> },

    /// Event type this layer does not act on. Acknowledged so the vendor
    /// does not retry-storm.
    Acknowledged { event_type: String },
}

/// Handler for payment provider webhooks.
///
/// Verification and normalization live in the gateway; this handler owns the
/// dispatch on the canonical event type.
pub struct ProcessPaymentWebhookHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl ProcessPaymentWebhookHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Verify, normalize, and dispatch one webhook delivery.
    ///
    /// Errors out of the gateway (bad signature, malformed payload, missing
    /// webhook secret) propagate; the HTTP boundary reduces them to a fixed
    /// client error.
    pub async fn handle(
        &self,
        cmd: ProcessPaymentWebhookCommand,
    ) -> Result<ProcessedPaymentWebhook, PaymentError> {
        let event = self
            .gateway
            .handle_webhook(&cmd.payload, &cmd.signature)
            .await?;

        let outcome = Self::dispatch(&event);
        Ok(ProcessedPaymentWebhook {
            event_id: event.id,
            outcome,
        })
    }

    fn dispatch(event: &PaymentWebhookEvent) -> PaymentWebhookOutcome {
        let object_id = event.data["id"].as_str().map(String::from);

        match &event.event_type {
            PaymentEventType::PaymentIntentSucceeded => {
                info!(
                    event_id = %event.id,
                    payment_intent_id = object_id.as_deref().unwrap_or("unknown"),
                    "payment settled, notifying order workflow"
                );
                PaymentWebhookOutcome::PaymentSucceeded {
                    payment_intent_id: object_id,
                }
            }
            PaymentEventType::PaymentIntentFailed => {
                warn!(
                    event_id = %event.id,
                    payment_intent_id = object_id.as_deref().unwrap_or("unknown"),
                    "payment failed, notifying order workflow"
                );
                PaymentWebhookOutcome::PaymentFailed {
                    payment_intent_id: object_id,
                }
            }
            PaymentEventType::ChargeRefunded => {
                info!(
                    event_id = %event.id,
                    charge_id = object_id.as_deref().unwrap_or("unknown"),
                    "charge refunded, notifying order workflow"
                );
                PaymentWebhookOutcome::RefundRecorded {
                    charge_id: object_id,
                }
            }
            PaymentEventType::Unknown(event_type) => {
                info!(
                    event_id = %event.id,
                    event_type = %event_type,
                    "unhandled payment webhook event acknowledged"
                );
                PaymentWebhookOutcome::Acknowledged {
                    event_type: event_type.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::ports::{
        CreateCustomerRequest, CreatePaymentIntentRequest, CreateRefundRequest, PaymentCustomer,
        PaymentIntent, PaymentResult, RefundResult,
    };

    /// Gateway that returns a fixed webhook event, or an error.
    struct FixedEventGateway {
        event: Result<PaymentWebhookEvent, PaymentError>,
    }

    impl FixedEventGateway {
        fn returning(event: PaymentWebhookEvent) -> Self {
            Self { event: Ok(event) }
        }

        fn failing(error: PaymentError) -> Self {
            Self { event: Err(error) }
        }
    }

    #[async_trait]
    impl PaymentGateway for FixedEventGateway {
        async fn create_payment_intent(
            &self,
            _request: CreatePaymentIntentRequest,
        ) -> Result<PaymentIntent, PaymentError> {
            unimplemented!()
        }

        async fn confirm_payment(
            &self,
            _payment_intent_id: &str,
        ) -> Result<PaymentResult, PaymentError> {
            unimplemented!()
        }

        async fn create_refund(
            &self,
            _request: CreateRefundRequest,
        ) -> Result<RefundResult, PaymentError> {
            unimplemented!()
        }

        async fn create_customer(
            &self,
            _request: CreateCustomerRequest,
        ) -> Result<PaymentCustomer, PaymentError> {
            unimplemented!()
        }

        async fn handle_webhook(
            &self,
            _payload: &[u8],
            _signature: &str,
        ) -> Result<PaymentWebhookEvent, PaymentError> {
            self.event.clone()
        }
    }

    fn command() -> ProcessPaymentWebhookCommand {
        ProcessPaymentWebhookCommand {
            payload: br#"{"id":"evt_1"}"#.to_vec(),
            signature: "t=1,v1=abc".to_string(),
        }
    }

    #[tokio::test]
    async fn dispatches_succeeded_event() {
        let gateway = FixedEventGateway::returning(PaymentWebhookEvent {
            id: "evt_1".to_string(),
            event_type: PaymentEventType::PaymentIntentSucceeded,
            data: json!({"id": "pi_123", "status": "succeeded"}),
        });
        let handler = ProcessPaymentWebhookHandler::new(Arc::new(gateway));

        let processed = handler.handle(command()).await.unwrap();

        assert_eq!(processed.event_id, "evt_1");
        assert_eq!(
            processed.outcome,
            PaymentWebhookOutcome::PaymentSucceeded {
                payment_intent_id: Some("pi_123".to_string())
            }
        );
    }

    #[tokio::test]
    async fn dispatches_failed_event() {
        let gateway = FixedEventGateway::returning(PaymentWebhookEvent {
            id: "evt_2".to_string(),
            event_type: PaymentEventType::PaymentIntentFailed,
            data: json!({"id": "pi_456"}),
        });
        let handler = ProcessPaymentWebhookHandler::new(Arc::new(gateway));

        let processed = handler.handle(command()).await.unwrap();

        assert_eq!(
            processed.outcome,
            PaymentWebhookOutcome::PaymentFailed {
                payment_intent_id: Some("pi_456".to_string())
            }
        );
    }

    #[tokio::test]
    async fn acknowledges_unknown_event_types() {
        let gateway = FixedEventGateway::returning(PaymentWebhookEvent {
            id: "evt_3".to_string(),
            event_type: PaymentEventType::Unknown("customer.created".to_string()),
            data: json!({}),
        });
        let handler = ProcessPaymentWebhookHandler::new(Arc::new(gateway));

        let processed = handler.handle(command()).await.unwrap();

        // Unrecognized types are an acknowledgement, never an error.
        assert_eq!(
            processed.outcome,
            PaymentWebhookOutcome::Acknowledged {
                event_type: "customer.created".to_string()
            }
        );
    }

    #[tokio::test]
    async fn propagates_verification_failure() {
        let gateway =
            FixedEventGateway::failing(PaymentError::invalid_webhook("signature mismatch"));
        let handler = ProcessPaymentWebhookHandler::new(Arc::new(gateway));

        let result = handler.handle(command()).await;

        assert!(result.is_err());
    }
}
