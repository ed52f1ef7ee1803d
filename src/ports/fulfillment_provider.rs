//! Fulfillment provider port (print-on-demand).
//!
//! Defines the contract for the fulfillment vendor (Printful): product sync,
//! order lifecycle, shipping rates, and inbound webhooks.
//!
//! # Money at this boundary
//!
//! The vendor's order/cost schema is decimal-string native. Retail prices the
//! platform submits are converted from minor-unit integers at the request
//! boundary; price fields in vendor **responses** are passed through as the
//! decimal strings the vendor sent. This asymmetry is deliberate and confined
//! to this port's DTOs.
//!
//! # Error channels
//!
//! `sync_product` and `cancel_order` report vendor failures as
//! `Ok(FulfillmentSyncResult { success: false, .. })` — partial sync/cancel
//! failures are outcomes callers branch on. Every other operation propagates
//! vendor faults as `Err(FulfillmentError)`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port for fulfillment integrations.
#[async_trait]
pub trait FulfillmentProvider: Send + Sync {
    /// Create or update a sync product in the vendor store.
    async fn sync_product(
        &self,
        request: SyncProductRequest,
    ) -> Result<FulfillmentSyncResult, FulfillmentError>;

    /// Push stock availability for a product's variants.
    async fn update_product_stock(
        &self,
        sync_product_id: i64,
        updates: Vec<VariantStockUpdate>,
    ) -> Result<(), FulfillmentError>;

    /// Fetch a sync product with its variants.
    async fn get_sync_product(
        &self,
        sync_product_id: i64,
    ) -> Result<SyncProductDetail, FulfillmentError>;

    /// List sync products, paginated.
    async fn list_sync_products(
        &self,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<SyncProduct>, FulfillmentError>;

    /// Create a draft order.
    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<FulfillmentOrder, FulfillmentError>;

    /// Fetch an order.
    async fn get_order(&self, order_id: i64) -> Result<FulfillmentOrder, FulfillmentError>;

    /// Confirm a draft order for fulfillment.
    async fn confirm_order(&self, order_id: i64) -> Result<FulfillmentOrder, FulfillmentError>;

    /// Cancel an order.
    async fn cancel_order(
        &self,
        order_id: i64,
    ) -> Result<FulfillmentSyncResult, FulfillmentError>;

    /// Quote shipping rates for a destination and item set.
    async fn calculate_shipping_rates(
        &self,
        request: ShippingRateRequest,
    ) -> Result<Vec<ShippingRate>, FulfillmentError>;

    /// List carriers the vendor ships with.
    async fn get_shipping_carriers(&self) -> Result<Vec<Carrier>, FulfillmentError>;

    /// Verify a webhook signature and normalize the event.
    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<FulfillmentWebhookEvent, FulfillmentError>;
}

/// Request to create or update a sync product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncProductRequest {
    /// Platform product ID.
    pub external_id: String,

    pub name: String,
    pub thumbnail_url: Option<String>,
    pub variants: Vec<SyncVariantRequest>,
}

/// Variant within a sync product request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncVariantRequest {
    /// Platform variant ID.
    pub external_id: String,

    /// Vendor catalog variant being printed on.
    pub variant_id: i64,

    /// Retail price in minor units; converted to a decimal string at the
    /// vendor boundary.
    pub retail_price: i64,

    /// Print file URLs.
    #[serde(default)]
    pub file_urls: Vec<String>,
}

/// Stock update for one variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantStockUpdate {
    pub external_variant_id: String,
    pub in_stock: bool,
}

/// Outcome of operations that report failure as a result rather than an
/// error (`sync_product`, `cancel_order`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentSyncResult {
    pub success: bool,

    /// Vendor sync-product ID when the operation created/updated one.
    pub sync_product_id: Option<i64>,

    pub error: Option<String>,
}

impl FulfillmentSyncResult {
    pub fn ok(sync_product_id: Option<i64>) -> Self {
        Self {
            success: true,
            sync_product_id,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sync_product_id: None,
            error: Some(error.into()),
        }
    }
}

/// Sync product summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncProduct {
    pub id: i64,
    pub external_id: String,
    pub name: String,
    pub variant_count: u32,
    pub synced_count: u32,
    pub thumbnail_url: Option<String>,
}

/// Sync product with its variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncProductDetail {
    pub product: SyncProduct,
    pub variants: Vec<SyncVariant>,
}

/// Variant of a sync product as the vendor reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncVariant {
    pub id: i64,
    pub external_id: String,
    pub name: String,

    /// Vendor catalog variant ID.
    pub variant_id: i64,

    /// Vendor decimal string, passed through unchanged.
    pub retail_price: String,

    pub currency: String,
    pub sku: Option<String>,
}

/// Request to create an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Platform order ID.
    pub external_id: String,

    pub recipient: Recipient,
    pub items: Vec<OrderItemRequest>,
}

/// Shipping recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state_code: Option<String>,
    pub country_code: String,
    pub zip: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Line item in an order request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    /// Sync variant to fulfill.
    pub sync_variant_id: i64,

    pub quantity: u32,

    /// Override retail price in minor units, when the platform price differs
    /// from the synced one.
    pub retail_price: Option<i64>,
}

/// Order as the vendor reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentOrder {
    pub id: i64,
    pub external_id: Option<String>,

    /// Vendor status vocabulary (draft, pending, inprocess, fulfilled, ...),
    /// passed through.
    pub status: String,

    pub recipient: Recipient,
    pub items: Vec<OrderItem>,
    pub costs: OrderCosts,

    #[serde(default)]
    pub shipments: Vec<Shipment>,

    /// Unix timestamps from the vendor.
    pub created: i64,
    pub updated: i64,
}

/// Line item in a vendor order response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub sync_variant_id: Option<i64>,
    pub name: String,
    pub quantity: u32,

    /// Vendor decimal string, passed through unchanged.
    pub retail_price: String,
}

/// Order cost breakdown. All fields are vendor decimal strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCosts {
    pub currency: String,
    pub subtotal: String,
    pub discount: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

/// Shipment attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub carrier: String,
    pub service: String,
    pub tracking_number: String,
    pub tracking_url: Option<String>,
    pub shipped_at: Option<i64>,
}

/// Request to quote shipping rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRateRequest {
    pub recipient: ShippingAddress,
    pub items: Vec<ShippingRateItem>,
}

/// Destination subset needed for rate quoting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub country_code: String,
    pub state_code: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
}

/// Item subset needed for rate quoting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRateItem {
    pub variant_id: i64,
    pub quantity: u32,
}

/// One shipping option.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Vendor rate ID (e.g., `STANDARD`).
    pub id: String,

    pub name: String,

    /// Vendor decimal string, passed through unchanged.
    pub rate: String,

    pub currency: String,
    pub min_delivery_days: u32,
    pub max_delivery_days: u32,
}

/// Carrier the vendor ships with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Carrier {
    pub code: String,
    pub name: String,
}

/// Normalized fulfillment webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentWebhookEvent {
    /// Canonical event type.
    pub event_type: FulfillmentEventType,

    /// Unix timestamp the vendor created the event.
    pub created: i64,

    /// Vendor delivery attempt count.
    pub retries: i64,

    /// Vendor payload, passed through for downstream consumers.
    pub data: serde_json::Value,
}

/// Fulfillment webhook event types the platform dispatches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentEventType {
    PackageShipped,
    PackageReturned,
    OrderFailed,
    OrderCanceled,
    ProductSynced,
    StockUpdated,

    /// Event type this layer does not yet act on; acknowledged, never an
    /// error.
    Unknown(String),
}

impl FulfillmentEventType {
    /// Map a vendor event-type string to the canonical type.
    pub fn from_wire(event_type: &str) -> Self {
        match event_type {
            "package_shipped" => Self::PackageShipped,
            "package_returned" => Self::PackageReturned,
            "order_failed" => Self::OrderFailed,
            "order_canceled" => Self::OrderCanceled,
            "product_synced" => Self::ProductSynced,
            "stock_updated" => Self::StockUpdated,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The vendor wire name for this event type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PackageShipped => "package_shipped",
            Self::PackageReturned => "package_returned",
            Self::OrderFailed => "order_failed",
            Self::OrderCanceled => "order_canceled",
            Self::ProductSynced => "product_synced",
            Self::StockUpdated => "stock_updated",
            Self::Unknown(other) => other,
        }
    }
}

/// Errors from fulfillment provider operations.
#[derive(Debug, Clone, Error)]
pub enum FulfillmentError {
    #[error("fulfillment network error: {0}")]
    Network(String),

    #[error("fulfillment API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid fulfillment webhook: {0}")]
    InvalidWebhook(String),

    #[error("webhook secret is not configured")]
    MissingWebhookSecret,

    #[error("unexpected fulfillment response: {0}")]
    InvalidResponse(String),
}
