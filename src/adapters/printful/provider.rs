//! Printful fulfillment provider adapter.
//!
//! Implements the `FulfillmentProvider` port against the Printful REST API
//! with a bearer-token client. Every response arrives in a `{code, result}`
//! envelope; every request/response boundary translates between the vendor's
//! snake_case wire shapes and the canonical DTOs.
//!
//! # Error channels
//!
//! `sync_product` and `cancel_order` catch vendor errors and return
//! `FulfillmentSyncResult { success: false }` — partial sync/cancel failures
//! are expected outcomes. Everything else propagates `FulfillmentError`.
//!
//! # Security
//!
//! Webhook deliveries carry an `X-Printful-Signature` header: hex-encoded
//! HMAC-SHA256 over the raw body, keyed with the store API key. Comparison
//! is constant-time.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::ports::{
    Carrier, CreateOrderRequest, FulfillmentError, FulfillmentEventType, FulfillmentOrder,
    FulfillmentProvider, FulfillmentSyncResult, FulfillmentWebhookEvent, ShippingRate,
    ShippingRateRequest, SyncProduct, SyncProductDetail, SyncProductRequest, VariantStockUpdate,
};

use super::wire::{
    Envelope, ErrorEnvelope, PrintfulCarrier, PrintfulOrder, PrintfulOrderRequest,
    PrintfulShippingRate, PrintfulShippingRateRequest, PrintfulStockUpdateRequest,
    PrintfulSyncProduct, PrintfulSyncProductDetail, PrintfulSyncProductRequest,
    PrintfulWebhookPayload,
};

type HmacSha256 = Hmac<Sha256>;

/// Printful API configuration.
#[derive(Clone)]
pub struct PrintfulConfig {
    /// Store API key; also the webhook signing secret.
    api_key: SecretString,

    /// Base URL for the Printful API (default: https://api.printful.com).
    api_base_url: String,
}

impl PrintfulConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.printful.com".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Printful fulfillment provider adapter.
pub struct PrintfulProvider {
    config: PrintfulConfig,
    http_client: reqwest::Client,
}

impl PrintfulProvider {
    pub fn new(config: PrintfulConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn unwrap_response<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, FulfillmentError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FulfillmentError::Network(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(%status, path, "Printful API call failed");
            return Err(FulfillmentError::Api {
                status: status.as_u16(),
                message: ErrorEnvelope::message_from(&body),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| FulfillmentError::InvalidResponse(e.to_string()))?;
        Ok(envelope.result)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, FulfillmentError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| FulfillmentError::Network(e.to_string()))?;

        Self::unwrap_response(response, path).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FulfillmentError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| FulfillmentError::Network(e.to_string()))?;

        Self::unwrap_response(response, path).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FulfillmentError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self
            .http_client
            .put(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| FulfillmentError::Network(e.to_string()))?;

        Self::unwrap_response(response, path).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, FulfillmentError> {
        let url = format!("{}{}", self.config.api_base_url, path);
        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| FulfillmentError::Network(e.to_string()))?;

        Self::unwrap_response(response, path).await
    }

    /// Constant-time check of the hex HMAC-SHA256 signature over the raw
    /// body.
    fn verify_signature(&self, payload: &[u8], signature: &str) -> Result<(), FulfillmentError> {
        let provided = decode_hex(signature.trim()).ok_or_else(|| {
            FulfillmentError::InvalidWebhook("signature is not valid hex".into())
        })?;

        let mut mac = HmacSha256::new_from_slice(self.config.api_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();

        if expected.as_slice().ct_eq(&provided).unwrap_u8() != 1 {
            tracing::warn!("Invalid fulfillment webhook signature");
            return Err(FulfillmentError::InvalidWebhook("invalid signature".into()));
        }

        Ok(())
    }
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return None;
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for i in (0..hex.len()).step_by(2) {
        bytes.push(u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?);
    }
    Some(bytes)
}

#[async_trait]
impl FulfillmentProvider for PrintfulProvider {
    async fn sync_product(
        &self,
        request: SyncProductRequest,
    ) -> Result<FulfillmentSyncResult, FulfillmentError> {
        let wire = PrintfulSyncProductRequest::from_canonical(&request);

        // Partial sync failures are expected outcomes the caller branches
        // on, so vendor errors collapse into a failed result here.
        match self
            .post::<_, PrintfulSyncProduct>("/store/products", &wire)
            .await
        {
            Ok(product) => Ok(FulfillmentSyncResult::ok(Some(product.id))),
            Err(err) => {
                tracing::warn!(external_id = %request.external_id, error = %err, "Product sync failed");
                Ok(FulfillmentSyncResult::failed(err.to_string()))
            }
        }
    }

    async fn update_product_stock(
        &self,
        sync_product_id: i64,
        updates: Vec<VariantStockUpdate>,
    ) -> Result<(), FulfillmentError> {
        let wire = PrintfulStockUpdateRequest::from_canonical(&updates);
        let path = format!("/store/products/{}", sync_product_id);

        let _: serde_json::Value = self.put(&path, &wire).await?;
        Ok(())
    }

    async fn get_sync_product(
        &self,
        sync_product_id: i64,
    ) -> Result<SyncProductDetail, FulfillmentError> {
        let path = format!("/store/products/{}", sync_product_id);
        let detail: PrintfulSyncProductDetail = self.get(&path).await?;
        Ok(detail.into_canonical())
    }

    async fn list_sync_products(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<SyncProduct>, FulfillmentError> {
        let path = format!("/store/products?offset={}&limit={}", offset, limit);
        let products: Vec<PrintfulSyncProduct> = self.get(&path).await?;
        Ok(products.into_iter().map(|p| p.into_canonical()).collect())
    }

    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<FulfillmentOrder, FulfillmentError> {
        let wire = PrintfulOrderRequest::from_canonical(&request);
        let order: PrintfulOrder = self.post("/orders", &wire).await?;
        Ok(order.into_canonical())
    }

    async fn get_order(&self, order_id: i64) -> Result<FulfillmentOrder, FulfillmentError> {
        let path = format!("/orders/{}", order_id);
        let order: PrintfulOrder = self.get(&path).await?;
        Ok(order.into_canonical())
    }

    async fn confirm_order(&self, order_id: i64) -> Result<FulfillmentOrder, FulfillmentError> {
        let path = format!("/orders/{}/confirm", order_id);
        let order: PrintfulOrder = self.post(&path, &serde_json::json!({})).await?;
        Ok(order.into_canonical())
    }

    async fn cancel_order(
        &self,
        order_id: i64,
    ) -> Result<FulfillmentSyncResult, FulfillmentError> {
        let path = format!("/orders/{}", order_id);

        match self.delete::<PrintfulOrder>(&path).await {
            Ok(_) => Ok(FulfillmentSyncResult::ok(None)),
            Err(err) => {
                tracing::warn!(order_id, error = %err, "Order cancel failed");
                Ok(FulfillmentSyncResult::failed(err.to_string()))
            }
        }
    }

    async fn calculate_shipping_rates(
        &self,
        request: ShippingRateRequest,
    ) -> Result<Vec<ShippingRate>, FulfillmentError> {
        let wire = PrintfulShippingRateRequest::from_canonical(&request);
        let rates: Vec<PrintfulShippingRate> = self.post("/shipping/rates", &wire).await?;
        Ok(rates.into_iter().map(|r| r.into_canonical()).collect())
    }

    async fn get_shipping_carriers(&self) -> Result<Vec<Carrier>, FulfillmentError> {
        let carriers: Vec<PrintfulCarrier> = self.get("/shipping/carriers").await?;
        Ok(carriers.into_iter().map(|c| c.into_canonical()).collect())
    }

    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<FulfillmentWebhookEvent, FulfillmentError> {
        self.verify_signature(payload, signature)?;

        let wire: PrintfulWebhookPayload = serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse fulfillment webhook payload");
            FulfillmentError::InvalidWebhook(format!("invalid JSON: {}", e))
        })?;

        tracing::info!(event_type = %wire.event_type, "Fulfillment webhook verified");

        Ok(FulfillmentWebhookEvent {
            event_type: FulfillmentEventType::from_wire(&wire.event_type),
            created: wire.created,
            retries: wire.retries,
            data: wire.data,
        })
    }
}
