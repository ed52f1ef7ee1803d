//! Stub payment gateway.
//!
//! Deterministic, network-free implementation selected when no payment
//! credentials are configured. Generates synthetic IDs with a recognizable
//! `_stub_` prefix and sleeps for a bounded random interval so async call
//! sites behave realistically under test.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::ports::{
    CreateCustomerRequest, CreatePaymentIntentRequest, CreateRefundRequest, PaymentCustomer,
    PaymentError, PaymentEventType, PaymentGateway, PaymentIntent, PaymentIntentStatus,
    PaymentResult, PaymentWebhookEvent, RefundResult, RefundStatus,
};

/// Stub payment gateway.
#[derive(Debug, Default, Clone)]
pub struct StubPaymentGateway;

impl StubPaymentGateway {
    pub fn new() -> Self {
        Self
    }

    fn synthetic_id(prefix: &str) -> String {
        let head = uuid::Uuid::new_v4().simple().to_string();
        format!("{}_stub_{}", prefix, &head[..12])
    }

    /// Bounded random latency so async call sites are exercised; not a model
    /// of real backpressure.
    async fn simulate_latency() {
        let delay_ms = { rand::thread_rng().gen_range(100..=300) };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[async_trait]
impl PaymentGateway for StubPaymentGateway {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        Self::simulate_latency().await;

        let id = Self::synthetic_id("pi");
        let client_secret = format!("{}_secret_{}", id, &uuid::Uuid::new_v4().simple().to_string()[..16]);

        Ok(PaymentIntent {
            id,
            client_secret,
            amount: request.amount,
            currency: request.currency,
            status: PaymentIntentStatus::RequiresConfirmation,
        })
    }

    async fn confirm_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentResult, PaymentError> {
        Self::simulate_latency().await;
        Ok(PaymentResult::succeeded(payment_intent_id))
    }

    async fn create_refund(
        &self,
        request: CreateRefundRequest,
    ) -> Result<RefundResult, PaymentError> {
        Self::simulate_latency().await;

        Ok(RefundResult {
            id: Self::synthetic_id("re"),
            amount: request.amount.unwrap_or(0),
            status: RefundStatus::Succeeded,
        })
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<PaymentCustomer, PaymentError> {
        Self::simulate_latency().await;

        Ok(PaymentCustomer {
            id: Self::synthetic_id("cus"),
            email: request.email,
            name: request.name,
        })
    }

    async fn handle_webhook(
        &self,
        _payload: &[u8],
        _signature: &str,
    ) -> Result<PaymentWebhookEvent, PaymentError> {
        Self::simulate_latency().await;

        // The stub always resolves to a settled payment.
        let intent_id = Self::synthetic_id("pi");
        Ok(PaymentWebhookEvent {
            id: Self::synthetic_id("evt"),
            event_type: PaymentEventType::PaymentIntentSucceeded,
            data: serde_json::json!({
                "id": intent_id,
                "object": "payment_intent",
                "amount": 2000,
                "currency": "usd",
                "status": "succeeded"
            }),
        })
    }
}
