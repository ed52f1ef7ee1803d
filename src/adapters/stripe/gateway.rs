//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API: payment
//! intent lifecycle, refunds, customer creation, and webhook verification.
//!
//! # Security
//!
//! - HMAC-SHA256 signature verification with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//! - Secrets handled via `secrecy::SecretString`
//!
//! # Error channels
//!
//! `confirm_payment` reports declines and vendor rejections as
//! `PaymentResult { success: false }` — callers branch on confirmation
//! outcomes, they don't catch them. All other operations propagate vendor
//! faults as `PaymentError`.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    CreateCustomerRequest, CreatePaymentIntentRequest, CreateRefundRequest, PaymentCustomer,
    PaymentError, PaymentEventType, PaymentGateway, PaymentIntent, PaymentIntentStatus,
    PaymentResult, PaymentWebhookEvent, RefundResult, RefundStatus,
};

use super::webhook_types::{
    hex_encode, SignatureHeader, StripeCustomer, StripeErrorResponse, StripeEvent,
    StripePaymentIntent, StripeRefund,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Webhook signing secret (whsec_...). Absent means webhook handling is
    /// a misconfiguration that fails on first use.
    webhook_secret: Option<SecretString>,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(secret_key: impl Into<String>, webhook_secret: Option<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            webhook_secret: webhook_secret.map(SecretString::new),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe payment gateway adapter.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    /// Create a new gateway with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Map Stripe's intent-status vocabulary onto the canonical 4-state
    /// enum. Total over every input: unlisted vendor statuses are treated
    /// as failed.
    pub(crate) fn map_intent_status(vendor_status: &str) -> PaymentIntentStatus {
        match vendor_status {
            "requires_confirmation" | "processing" => PaymentIntentStatus::RequiresConfirmation,
            "requires_payment_method" | "requires_action" => PaymentIntentStatus::RequiresAction,
            "succeeded" => PaymentIntentStatus::Succeeded,
            "canceled" | "requires_capture" => PaymentIntentStatus::Failed,
            _ => PaymentIntentStatus::Failed,
        }
    }

    /// Map Stripe's refund-status vocabulary onto the canonical enum.
    fn map_refund_status(vendor_status: &str) -> RefundStatus {
        match vendor_status {
            "succeeded" => RefundStatus::Succeeded,
            "pending" | "requires_action" => RefundStatus::Pending,
            _ => RefundStatus::Failed,
        }
    }

    /// POST a form-encoded request and deserialize the success body,
    /// converting non-2xx responses into `PaymentError`.
    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(%status, path, error = %error_text, "Stripe API call failed");
            return Err(PaymentError::provider(StripeErrorResponse::message_from(
                &error_text,
            )));
        }

        response
            .json()
            .await
            .map_err(|e| PaymentError::provider(format!("Failed to parse Stripe response: {}", e)))
    }

    fn to_canonical_intent(intent: StripePaymentIntent) -> PaymentIntent {
        PaymentIntent {
            status: Self::map_intent_status(&intent.status),
            client_secret: intent.client_secret.unwrap_or_default(),
            id: intent.id,
            amount: intent.amount,
            currency: intent.currency.to_uppercase(),
        }
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// # Security
    ///
    /// - Uses constant-time comparison to prevent timing attacks
    /// - Validates timestamp to prevent replay attacks
    fn verify_signature(
        &self,
        payload: &[u8],
        header: &SignatureHeader,
        secret: &SecretString,
    ) -> Result<(), PaymentError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_webhook(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_webhook("Event timestamp in future"));
        }

        // 2. Compute expected signature
        let signed_payload = format!(
            "{}.{}",
            header.timestamp,
            String::from_utf8_lossy(payload)
        );

        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");

        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison
        let expected_bytes: &[u8] = expected.as_slice();
        let provided_bytes: &[u8] = &header.v1_signature;

        if expected_bytes.ct_eq(provided_bytes).unwrap_u8() != 1 {
            tracing::warn!(
                expected_signature = hex_encode(expected_bytes),
                "Invalid webhook signature"
            );
            return Err(PaymentError::invalid_webhook("Invalid signature"));
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_payment_intent(
        &self,
        request: CreatePaymentIntentRequest,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut params = vec![
            ("amount".to_string(), request.amount.to_string()),
            ("currency".to_string(), request.currency.to_lowercase()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        if let Some(customer_id) = &request.customer_id {
            params.push(("customer".to_string(), customer_id.clone()));
        }

        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        let intent: StripePaymentIntent = self.post_form("/v1/payment_intents", &params).await?;

        Ok(Self::to_canonical_intent(intent))
    }

    async fn confirm_payment(
        &self,
        payment_intent_id: &str,
    ) -> Result<PaymentResult, PaymentError> {
        let path = format!("/v1/payment_intents/{}/confirm", payment_intent_id);

        // Declines and vendor rejections are expected business outcomes here,
        // so every failure path collapses into a failed PaymentResult.
        match self.post_form::<StripePaymentIntent>(&path, &[]).await {
            Ok(intent) => {
                let status = Self::map_intent_status(&intent.status);
                if status == PaymentIntentStatus::Succeeded {
                    Ok(PaymentResult::succeeded(intent.id))
                } else {
                    let reason = intent
                        .last_payment_error
                        .and_then(|e| e.message.or(e.code))
                        .unwrap_or_else(|| format!("payment not completed: {}", intent.status));
                    Ok(PaymentResult {
                        success: false,
                        payment_intent_id: intent.id,
                        status,
                        error: Some(reason),
                    })
                }
            }
            Err(err) => {
                tracing::warn!(
                    payment_intent_id,
                    error = %err,
                    "Payment confirmation failed"
                );
                Ok(PaymentResult::failed(payment_intent_id, err.message))
            }
        }
    }

    async fn create_refund(
        &self,
        request: CreateRefundRequest,
    ) -> Result<RefundResult, PaymentError> {
        let mut params = vec![(
            "payment_intent".to_string(),
            request.payment_intent_id.clone(),
        )];

        if let Some(amount) = request.amount {
            params.push(("amount".to_string(), amount.to_string()));
        }
        if let Some(reason) = &request.reason {
            params.push(("reason".to_string(), reason.clone()));
        }

        let refund: StripeRefund = self.post_form("/v1/refunds", &params).await?;

        Ok(RefundResult {
            status: Self::map_refund_status(&refund.status),
            id: refund.id,
            amount: refund.amount,
        })
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<PaymentCustomer, PaymentError> {
        let mut params = vec![
            ("email".to_string(), request.email.clone()),
            ("name".to_string(), request.name.clone()),
        ];

        for (key, value) in &request.metadata {
            params.push((format!("metadata[{}]", key), value.clone()));
        }

        let customer: StripeCustomer = self.post_form("/v1/customers", &params).await?;

        Ok(PaymentCustomer {
            id: customer.id,
            email: customer.email.unwrap_or(request.email),
            name: customer.name.unwrap_or(request.name),
        })
    }

    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<PaymentWebhookEvent, PaymentError> {
        // A missing secret is a fatal misconfiguration; fail before touching
        // the payload or the network.
        let secret = self
            .config
            .webhook_secret
            .as_ref()
            .ok_or_else(PaymentError::missing_webhook_secret)?;

        let header = SignatureHeader::parse(signature).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
            PaymentError::invalid_webhook(e.to_string())
        })?;

        self.verify_signature(payload, &header, secret)?;

        let event: StripeEvent = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            "Payment webhook verified"
        );

        Ok(PaymentWebhookEvent {
            id: event.id,
            event_type: PaymentEventType::from_wire(&event.event_type),
            data: event.data.object,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StripeConfig {
        StripeConfig::new("sk_test_key", Some("whsec_test_secret".to_string()))
    }

    fn create_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
        let signed_payload = format!("{}.{}", timestamp, payload);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        let result = mac.finalize().into_bytes();

        format!("t={},v1={}", timestamp, hex_encode(&result))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn intent_status_mapping_is_exhaustive_over_vendor_vocabulary() {
        let table = [
            ("requires_payment_method", PaymentIntentStatus::RequiresAction),
            ("requires_action", PaymentIntentStatus::RequiresAction),
            (
                "requires_confirmation",
                PaymentIntentStatus::RequiresConfirmation,
            ),
            ("processing", PaymentIntentStatus::RequiresConfirmation),
            ("succeeded", PaymentIntentStatus::Succeeded),
            ("canceled", PaymentIntentStatus::Failed),
            ("requires_capture", PaymentIntentStatus::Failed),
        ];

        for (vendor, canonical) in table {
            assert_eq!(StripeGateway::map_intent_status(vendor), canonical);
        }
    }

    #[test]
    fn unknown_intent_status_defaults_to_failed() {
        assert_eq!(
            StripeGateway::map_intent_status("some_future_status"),
            PaymentIntentStatus::Failed
        );
        assert_eq!(
            StripeGateway::map_intent_status(""),
            PaymentIntentStatus::Failed
        );
    }

    proptest::proptest! {
        // Total over arbitrary vendor strings: anything outside the known
        // vocabulary must land on Failed, never panic or fall through.
        #[test]
        fn arbitrary_statuses_map_to_failed(vendor in "[a-z_]{1,32}") {
            let known = [
                "requires_payment_method",
                "requires_action",
                "requires_confirmation",
                "processing",
                "succeeded",
            ];
            proptest::prop_assume!(!known.contains(&vendor.as_str()));
            proptest::prop_assert_eq!(
                StripeGateway::map_intent_status(&vendor),
                PaymentIntentStatus::Failed
            );
        }
    }

    #[test]
    fn refund_status_mapping() {
        assert_eq!(
            StripeGateway::map_refund_status("succeeded"),
            RefundStatus::Succeeded
        );
        assert_eq!(
            StripeGateway::map_refund_status("pending"),
            RefundStatus::Pending
        );
        assert_eq!(
            StripeGateway::map_refund_status("failed"),
            RefundStatus::Failed
        );
        assert_eq!(
            StripeGateway::map_refund_status("canceled"),
            RefundStatus::Failed
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn verify(gateway: &StripeGateway, payload: &str, signature: &str) -> Result<(), PaymentError> {
        let header = SignatureHeader::parse(signature).unwrap();
        let secret = gateway.config.webhook_secret.as_ref().unwrap();
        gateway.verify_signature(payload.as_bytes(), &header, secret)
    }

    #[test]
    fn verify_signature_valid() {
        let gateway = StripeGateway::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        assert!(verify(&gateway, payload, &signature).is_ok());
    }

    #[test]
    fn verify_signature_wrong_secret() {
        let gateway = StripeGateway::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("wrong_secret", timestamp, payload);

        let result = verify(&gateway, payload, &signature);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code,
            crate::ports::PaymentErrorCode::InvalidWebhook
        );
    }

    #[test]
    fn verify_signature_expired_timestamp() {
        let gateway = StripeGateway::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let old_timestamp = chrono::Utc::now().timestamp() - 600;
        let signature = create_test_signature("whsec_test_secret", old_timestamp, payload);

        let result = verify(&gateway, payload, &signature);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("too old"));
    }

    #[test]
    fn verify_signature_future_timestamp() {
        let gateway = StripeGateway::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let future_timestamp = chrono::Utc::now().timestamp() + 120;
        let signature = create_test_signature("whsec_test_secret", future_timestamp, payload);

        let result = verify(&gateway, payload, &signature);
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("future"));
    }

    #[test]
    fn verify_signature_tolerates_small_clock_skew() {
        let gateway = StripeGateway::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp() + 30;
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        assert!(verify(&gateway, payload, &signature).is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Handling Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn handle_webhook_without_secret_fails_immediately() {
        let gateway = StripeGateway::new(StripeConfig::new("sk_test_key", None));

        let result = gateway.handle_webhook(b"{}", "t=1,v1=00").await;

        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().code,
            crate::ports::PaymentErrorCode::MissingWebhookSecret
        );
    }

    #[tokio::test]
    async fn handle_webhook_valid_signature_and_payload() {
        let gateway = StripeGateway::new(test_config());

        let payload = r#"{
            "id": "evt_test123",
            "type": "payment_intent.succeeded",
            "created": 1704067200,
            "data": {
                "object": {
                    "id": "pi_123",
                    "amount": 5000,
                    "currency": "usd",
                    "status": "succeeded"
                }
            },
            "livemode": false
        }"#;

        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let event = gateway
            .handle_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap();

        assert_eq!(event.id, "evt_test123");
        assert_eq!(event.event_type, PaymentEventType::PaymentIntentSucceeded);
        assert_eq!(event.data["id"], "pi_123");
    }

    #[tokio::test]
    async fn handle_webhook_rejects_invalid_signature() {
        let gateway = StripeGateway::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = format!("t={},v1=deadbeef", timestamp);

        let result = gateway.handle_webhook(payload.as_bytes(), &signature).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn handle_webhook_rejects_malformed_header() {
        let gateway = StripeGateway::new(test_config());

        let result = gateway.handle_webhook(b"{}", "malformed_header").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn handle_webhook_rejects_invalid_json() {
        let gateway = StripeGateway::new(test_config());
        let payload = "not valid json";
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let result = gateway.handle_webhook(payload.as_bytes(), &signature).await;

        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("Invalid JSON"));
    }

    #[tokio::test]
    async fn handle_webhook_maps_unknown_event_type() {
        let gateway = StripeGateway::new(test_config());

        let payload = r#"{
            "id": "evt_unknown",
            "type": "some.future.event",
            "created": 1704067200,
            "data": {"object": {"foo": "bar"}},
            "livemode": false
        }"#;

        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature("whsec_test_secret", timestamp, payload);

        let event = gateway
            .handle_webhook(payload.as_bytes(), &signature)
            .await
            .unwrap();

        assert!(matches!(
            event.event_type,
            PaymentEventType::Unknown(ref s) if s == "some.future.event"
        ));
    }
}
