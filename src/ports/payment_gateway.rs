//! Payment gateway port for external payment processing.
//!
//! Defines the contract for payment processor integrations (e.g., Stripe).
//! Implementations handle payment intent lifecycle, refunds, customer
//! management, and webhook verification.
//!
//! # Design
//!
//! - **Gateway agnostic**: canonical DTOs are independent of any vendor wire
//!   format; adapters own the translation.
//! - **Minor units**: all amounts are integers in the currency's minor unit.
//! - **Two error channels**: `confirm_payment` reports declines as a
//!   `PaymentResult` with `success: false` (an expected business outcome);
//!   every other operation propagates vendor faults as `PaymentError`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent for the given amount.
    ///
    /// Returns a fresh, immutable intent; confirming it mutates vendor-side
    /// state reflected in a new [`PaymentResult`].
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Confirm a previously created payment intent.
    ///
    /// A declined card is an expected outcome: implementations must return
    /// `Ok(PaymentResult { success: false, .. })` rather than an error.
    async fn confirm_payment(&self, payment_intent_id: &str)
        -> Result<PaymentResult, PaymentError>;

    /// Refund a payment, in full when `amount` is `None`.
    async fn create_refund(&self, request: CreateRefundRequest)
        -> Result<RefundResult, PaymentError>;

    /// Create a customer in the payment system.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<PaymentCustomer, PaymentError>;

    /// Verify a webhook signature and normalize the event.
    ///
    /// Calling this without a configured webhook secret is a fatal
    /// misconfiguration and fails immediately with
    /// [`PaymentErrorCode::MissingWebhookSecret`] before any network call.
    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentWebhookEvent, PaymentError>;
}

/// Request to create a payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePaymentIntentRequest {
    /// Amount in minor units (cents).
    pub amount: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Gateway customer ID to attach, if any.
    pub customer_id: Option<String>,

    /// Metadata forwarded to the gateway.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// A payment intent as the platform sees it.
///
/// Immutable once returned; a fresh call yields a new intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Gateway intent ID.
    pub id: String,

    /// Client secret handed to the browser to complete payment.
    pub client_secret: String,

    /// Amount in minor units.
    pub amount: i64,

    /// ISO 4217 currency code.
    pub currency: String,

    /// Canonical intent status.
    pub status: PaymentIntentStatus,
}

/// Canonical 4-state reduction of the vendor's richer intent state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    /// Awaiting confirmation by the platform.
    RequiresConfirmation,

    /// Customer action needed (3DS challenge, new payment method).
    RequiresAction,

    /// Payment settled.
    Succeeded,

    /// Payment failed or was abandoned.
    Failed,
}

/// Outcome of confirming an intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Whether the confirmation settled the payment.
    pub success: bool,

    /// The intent that was confirmed.
    pub payment_intent_id: String,

    /// Canonical status after confirmation.
    pub status: PaymentIntentStatus,

    /// Vendor decline/error detail when `success` is false.
    pub error: Option<String>,
}

impl PaymentResult {
    /// A successful confirmation.
    pub fn succeeded(payment_intent_id: impl Into<String>) -> Self {
        Self {
            success: true,
            payment_intent_id: payment_intent_id.into(),
            status: PaymentIntentStatus::Succeeded,
            error: None,
        }
    }

    /// A failed confirmation carrying the vendor's reason.
    pub fn failed(payment_intent_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            payment_intent_id: payment_intent_id.into(),
            status: PaymentIntentStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// Request to refund a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRefundRequest {
    /// Intent to refund.
    pub payment_intent_id: String,

    /// Partial refund amount in minor units; full refund when absent.
    pub amount: Option<i64>,

    /// Vendor-recognized reason code, if any.
    pub reason: Option<String>,
}

/// Refund as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundResult {
    /// Gateway refund ID.
    pub id: String,

    /// Refunded amount in minor units.
    pub amount: i64,

    /// Refund settlement status.
    pub status: RefundStatus,
}

/// Refund settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Succeeded,
    Failed,
}

/// Request to create a gateway customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub email: String,
    pub name: String,

    /// Metadata forwarded to the gateway.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Customer in the payment system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCustomer {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Normalized payment webhook event.
///
/// The vendor event is reduced to an opaque `data` bag; `event_type` drives
/// dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentWebhookEvent {
    /// Vendor event ID.
    pub id: String,

    /// Canonical event type.
    pub event_type: PaymentEventType,

    /// Vendor object payload, passed through for downstream consumers.
    pub data: serde_json::Value,
}

/// Payment webhook event types the platform dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentEventType {
    /// Payment settled.
    PaymentIntentSucceeded,

    /// Payment attempt failed.
    PaymentIntentFailed,

    /// A charge was refunded.
    ChargeRefunded,

    /// Event type this layer does not yet act on; acknowledged, never an
    /// error.
    Unknown(String),
}

impl PaymentEventType {
    /// Map a vendor event-type string to the canonical type.
    pub fn from_wire(event_type: &str) -> Self {
        match event_type {
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            "payment_intent.payment_failed" => Self::PaymentIntentFailed,
            "charge.refunded" => Self::ChargeRefunded,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Errors from payment gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    pub fn missing_webhook_secret() -> Self {
        Self::new(
            PaymentErrorCode::MissingWebhookSecret,
            "Webhook secret is not configured",
        )
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Request rejected by the vendor as malformed.
    InvalidRequest,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Invalid webhook signature or payload.
    InvalidWebhook,

    /// Webhook secret absent from configuration.
    MissingWebhookSecret,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::MissingWebhookSecret => "missing_webhook_secret",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn event_type_from_wire_maps_known_types() {
        assert_eq!(
            PaymentEventType::from_wire("payment_intent.succeeded"),
            PaymentEventType::PaymentIntentSucceeded
        );
        assert_eq!(
            PaymentEventType::from_wire("payment_intent.payment_failed"),
            PaymentEventType::PaymentIntentFailed
        );
        assert_eq!(
            PaymentEventType::from_wire("charge.refunded"),
            PaymentEventType::ChargeRefunded
        );
    }

    #[test]
    fn event_type_from_wire_preserves_unknown() {
        assert_eq!(
            PaymentEventType::from_wire("customer.created"),
            PaymentEventType::Unknown("customer.created".to_string())
        );
    }

    #[test]
    fn payment_error_retryable() {
        assert!(PaymentErrorCode::NetworkError.is_retryable());
        assert!(PaymentErrorCode::RateLimitExceeded.is_retryable());

        assert!(!PaymentErrorCode::InvalidWebhook.is_retryable());
        assert!(!PaymentErrorCode::MissingWebhookSecret.is_retryable());
    }

    #[test]
    fn payment_error_display() {
        let err = PaymentError::missing_webhook_secret();
        assert!(err.to_string().contains("missing_webhook_secret"));
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn payment_result_constructors() {
        let ok = PaymentResult::succeeded("pi_123");
        assert!(ok.success);
        assert_eq!(ok.status, PaymentIntentStatus::Succeeded);
        assert!(ok.error.is_none());

        let declined = PaymentResult::failed("pi_123", "card_declined");
        assert!(!declined.success);
        assert_eq!(declined.status, PaymentIntentStatus::Failed);
        assert_eq!(declined.error.as_deref(), Some("card_declined"));
    }
}
