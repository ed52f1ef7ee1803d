//! Printful wire types.
//!
//! Vendor-shaped structs (snake_case fields, `{code, result}` envelopes) and
//! the translation to canonical port DTOs. The vendor's order/cost schema is
//! decimal-string native: request-side retail prices are converted from
//! minor units here; response-side decimal strings pass through unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::money::minor_units_to_decimal_string;
use crate::ports::{
    Carrier, CreateOrderRequest, FulfillmentOrder, OrderCosts, OrderItem, Recipient, ShippingRate,
    ShippingRateRequest, SyncProduct, SyncProductDetail, SyncProductRequest, SyncVariant,
    VariantStockUpdate,
};

// ════════════════════════════════════════════════════════════════════════════════
// Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Every Printful response wraps its payload in `{code, result}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub code: i64,
    pub result: T,
}

/// Error body on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub result: Option<serde_json::Value>,

    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    /// Best-effort human-readable message from an error body.
    pub fn message_from(body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()
            .and_then(|e| {
                e.error
                    .and_then(|d| d.message)
                    .or_else(|| e.result.and_then(|r| r.as_str().map(String::from)))
            })
            .unwrap_or_else(|| body.to_string())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Sync Products
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for `POST /store/products`.
#[derive(Debug, Clone, Serialize)]
pub struct PrintfulSyncProductRequest {
    pub sync_product: PrintfulSyncProductInfo,
    pub sync_variants: Vec<PrintfulSyncVariantRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulSyncProductInfo {
    pub external_id: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulSyncVariantRequest {
    pub external_id: String,
    pub variant_id: i64,

    /// Decimal string derived from the canonical minor-unit price.
    pub retail_price: String,

    pub files: Vec<PrintfulFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulFile {
    pub url: String,
}

impl PrintfulSyncProductRequest {
    pub fn from_canonical(request: &SyncProductRequest) -> Self {
        Self {
            sync_product: PrintfulSyncProductInfo {
                external_id: request.external_id.clone(),
                name: request.name.clone(),
                thumbnail: request.thumbnail_url.clone(),
            },
            sync_variants: request
                .variants
                .iter()
                .map(|v| PrintfulSyncVariantRequest {
                    external_id: v.external_id.clone(),
                    variant_id: v.variant_id,
                    retail_price: minor_units_to_decimal_string(v.retail_price),
                    files: v
                        .file_urls
                        .iter()
                        .map(|url| PrintfulFile { url: url.clone() })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Request body for stock pushes (`PUT /store/products/{id}`).
#[derive(Debug, Clone, Serialize)]
pub struct PrintfulStockUpdateRequest {
    pub sync_variants: Vec<PrintfulStockVariant>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulStockVariant {
    pub external_id: String,
    pub is_ignored: bool,
}

impl PrintfulStockUpdateRequest {
    pub fn from_canonical(updates: &[VariantStockUpdate]) -> Self {
        Self {
            sync_variants: updates
                .iter()
                .map(|u| PrintfulStockVariant {
                    external_id: u.external_variant_id.clone(),
                    is_ignored: !u.in_stock,
                })
                .collect(),
        }
    }
}

/// Sync product summary as the vendor returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulSyncProduct {
    pub id: i64,

    #[serde(default)]
    pub external_id: String,

    pub name: String,

    /// Variant count.
    #[serde(default)]
    pub variants: u32,

    /// Synced variant count.
    #[serde(default)]
    pub synced: u32,

    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl PrintfulSyncProduct {
    pub fn into_canonical(self) -> SyncProduct {
        SyncProduct {
            id: self.id,
            external_id: self.external_id,
            name: self.name,
            variant_count: self.variants,
            synced_count: self.synced,
            thumbnail_url: self.thumbnail_url,
        }
    }
}

/// `GET /store/products/{id}` result.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulSyncProductDetail {
    pub sync_product: PrintfulSyncProduct,

    #[serde(default)]
    pub sync_variants: Vec<PrintfulSyncVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulSyncVariant {
    pub id: i64,

    #[serde(default)]
    pub external_id: String,

    pub name: String,

    #[serde(default)]
    pub variant_id: i64,

    /// Vendor decimal string, passed through unchanged.
    #[serde(default)]
    pub retail_price: String,

    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub sku: Option<String>,
}

impl PrintfulSyncProductDetail {
    pub fn into_canonical(self) -> SyncProductDetail {
        SyncProductDetail {
            product: self.sync_product.into_canonical(),
            variants: self
                .sync_variants
                .into_iter()
                .map(|v| SyncVariant {
                    id: v.id,
                    external_id: v.external_id,
                    name: v.name,
                    variant_id: v.variant_id,
                    retail_price: v.retail_price,
                    currency: v.currency,
                    sku: v.sku,
                })
                .collect(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Orders
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Serialize)]
pub struct PrintfulOrderRequest {
    pub external_id: String,
    pub recipient: PrintfulRecipient,
    pub items: Vec<PrintfulOrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintfulRecipient {
    pub name: String,
    pub address1: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,

    pub city: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,

    pub country_code: String,
    pub zip: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulOrderItemRequest {
    pub sync_variant_id: i64,
    pub quantity: u32,

    /// Decimal string derived from the canonical minor-unit override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retail_price: Option<String>,
}

impl PrintfulOrderRequest {
    pub fn from_canonical(request: &CreateOrderRequest) -> Self {
        Self {
            external_id: request.external_id.clone(),
            recipient: PrintfulRecipient::from_canonical(&request.recipient),
            items: request
                .items
                .iter()
                .map(|item| PrintfulOrderItemRequest {
                    sync_variant_id: item.sync_variant_id,
                    quantity: item.quantity,
                    retail_price: item.retail_price.map(minor_units_to_decimal_string),
                })
                .collect(),
        }
    }
}

impl PrintfulRecipient {
    pub fn from_canonical(recipient: &Recipient) -> Self {
        Self {
            name: recipient.name.clone(),
            address1: recipient.address1.clone(),
            address2: recipient.address2.clone(),
            city: recipient.city.clone(),
            state_code: recipient.state_code.clone(),
            country_code: recipient.country_code.clone(),
            zip: recipient.zip.clone(),
            phone: recipient.phone.clone(),
            email: recipient.email.clone(),
        }
    }

    pub fn into_canonical(self) -> Recipient {
        Recipient {
            name: self.name,
            address1: self.address1,
            address2: self.address2,
            city: self.city,
            state_code: self.state_code,
            country_code: self.country_code,
            zip: self.zip,
            phone: self.phone,
            email: self.email,
        }
    }
}

/// Order as the vendor returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulOrder {
    pub id: i64,

    #[serde(default)]
    pub external_id: Option<String>,

    pub status: String,
    pub recipient: PrintfulRecipient,

    #[serde(default)]
    pub items: Vec<PrintfulOrderItem>,

    pub costs: PrintfulOrderCosts,

    #[serde(default)]
    pub shipments: Vec<PrintfulShipment>,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub updated: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulOrderItem {
    pub id: i64,

    #[serde(default)]
    pub sync_variant_id: Option<i64>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub quantity: u32,

    /// Vendor decimal string, passed through unchanged.
    #[serde(default)]
    pub retail_price: String,
}

/// Cost breakdown. All fields are vendor decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulOrderCosts {
    #[serde(default)]
    pub currency: String,

    #[serde(default)]
    pub subtotal: String,

    #[serde(default)]
    pub discount: String,

    #[serde(default)]
    pub shipping: String,

    #[serde(default)]
    pub tax: String,

    #[serde(default)]
    pub total: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulShipment {
    pub id: i64,

    #[serde(default)]
    pub carrier: String,

    #[serde(default)]
    pub service: String,

    #[serde(default)]
    pub tracking_number: String,

    #[serde(default)]
    pub tracking_url: Option<String>,

    #[serde(default)]
    pub shipped_at: Option<i64>,
}

impl PrintfulOrder {
    pub fn into_canonical(self) -> FulfillmentOrder {
        FulfillmentOrder {
            id: self.id,
            external_id: self.external_id,
            status: self.status,
            recipient: self.recipient.into_canonical(),
            items: self
                .items
                .into_iter()
                .map(|item| OrderItem {
                    id: item.id,
                    sync_variant_id: item.sync_variant_id,
                    name: item.name,
                    quantity: item.quantity,
                    retail_price: item.retail_price,
                })
                .collect(),
            costs: OrderCosts {
                currency: self.costs.currency,
                subtotal: self.costs.subtotal,
                discount: self.costs.discount,
                shipping: self.costs.shipping,
                tax: self.costs.tax,
                total: self.costs.total,
            },
            shipments: self
                .shipments
                .into_iter()
                .map(|s| crate::ports::Shipment {
                    id: s.id,
                    carrier: s.carrier,
                    service: s.service,
                    tracking_number: s.tracking_number,
                    tracking_url: s.tracking_url,
                    shipped_at: s.shipped_at,
                })
                .collect(),
            created: self.created,
            updated: self.updated,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Shipping
// ════════════════════════════════════════════════════════════════════════════════

/// Request body for `POST /shipping/rates`.
#[derive(Debug, Clone, Serialize)]
pub struct PrintfulShippingRateRequest {
    pub recipient: PrintfulShippingAddress,
    pub items: Vec<PrintfulShippingItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulShippingAddress {
    pub country_code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintfulShippingItem {
    pub variant_id: i64,
    pub quantity: u32,
}

impl PrintfulShippingRateRequest {
    pub fn from_canonical(request: &ShippingRateRequest) -> Self {
        Self {
            recipient: PrintfulShippingAddress {
                country_code: request.recipient.country_code.clone(),
                state_code: request.recipient.state_code.clone(),
                city: request.recipient.city.clone(),
                zip: request.recipient.zip.clone(),
            },
            items: request
                .items
                .iter()
                .map(|item| PrintfulShippingItem {
                    variant_id: item.variant_id,
                    quantity: item.quantity,
                })
                .collect(),
        }
    }
}

/// One rate as the vendor returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulShippingRate {
    pub id: String,
    pub name: String,

    /// Vendor decimal string, passed through unchanged.
    pub rate: String,

    #[serde(default)]
    pub currency: String,

    #[serde(default, rename = "minDeliveryDays")]
    pub min_delivery_days: u32,

    #[serde(default, rename = "maxDeliveryDays")]
    pub max_delivery_days: u32,
}

impl PrintfulShippingRate {
    pub fn into_canonical(self) -> ShippingRate {
        ShippingRate {
            id: self.id,
            name: self.name,
            rate: self.rate,
            currency: self.currency,
            min_delivery_days: self.min_delivery_days,
            max_delivery_days: self.max_delivery_days,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulCarrier {
    pub code: String,
    pub name: String,
}

impl PrintfulCarrier {
    pub fn into_canonical(self) -> Carrier {
        Carrier {
            code: self.code,
            name: self.name,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhooks
// ════════════════════════════════════════════════════════════════════════════════

/// Webhook payload as the vendor delivers it.
#[derive(Debug, Clone, Deserialize)]
pub struct PrintfulWebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub created: i64,

    #[serde(default)]
    pub retries: i64,

    #[serde(default)]
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{SyncVariantRequest, OrderItemRequest};

    #[test]
    fn sync_product_request_converts_prices_to_decimal_strings() {
        let canonical = SyncProductRequest {
            external_id: "prod_9".to_string(),
            name: "Tote Bag".to_string(),
            thumbnail_url: None,
            variants: vec![SyncVariantRequest {
                external_id: "var_1".to_string(),
                variant_id: 4011,
                retail_price: 2599,
                file_urls: vec!["https://cdn.example.com/print.png".to_string()],
            }],
        };

        let wire = PrintfulSyncProductRequest::from_canonical(&canonical);

        assert_eq!(wire.sync_variants[0].retail_price, "25.99");
        assert_eq!(wire.sync_variants[0].files[0].url, "https://cdn.example.com/print.png");
    }

    #[test]
    fn order_request_converts_price_override() {
        let canonical = CreateOrderRequest {
            external_id: "order_7".to_string(),
            recipient: Recipient {
                name: "Jo Doe".to_string(),
                address1: "1 Main St".to_string(),
                address2: None,
                city: "Springfield".to_string(),
                state_code: Some("CA".to_string()),
                country_code: "US".to_string(),
                zip: "90210".to_string(),
                phone: None,
                email: None,
            },
            items: vec![OrderItemRequest {
                sync_variant_id: 101,
                quantity: 2,
                retail_price: Some(1500),
            }],
        };

        let wire = PrintfulOrderRequest::from_canonical(&canonical);

        assert_eq!(wire.items[0].retail_price.as_deref(), Some("15.00"));
        assert_eq!(wire.recipient.country_code, "US");
    }

    #[test]
    fn order_response_passes_decimal_strings_through() {
        let json = r#"{
            "id": 13,
            "external_id": "order_7",
            "status": "fulfilled",
            "recipient": {
                "name": "Jo Doe",
                "address1": "1 Main St",
                "city": "Springfield",
                "country_code": "US",
                "zip": "90210"
            },
            "items": [
                {"id": 1, "sync_variant_id": 101, "name": "Tote Bag", "quantity": 2, "retail_price": "25.99"}
            ],
            "costs": {
                "currency": "USD",
                "subtotal": "51.98",
                "discount": "0.00",
                "shipping": "4.99",
                "tax": "0.00",
                "total": "56.97"
            },
            "shipments": [
                {"id": 9, "carrier": "USPS", "service": "Priority", "tracking_number": "9400100000000000000000"}
            ],
            "created": 1704067200,
            "updated": 1704070000
        }"#;

        let order: PrintfulOrder = serde_json::from_str(json).unwrap();
        let canonical = order.into_canonical();

        assert_eq!(canonical.costs.total, "56.97");
        assert_eq!(canonical.items[0].retail_price, "25.99");
        assert_eq!(canonical.shipments[0].tracking_number, "9400100000000000000000");
    }

    #[test]
    fn error_message_prefers_error_detail() {
        let body = r#"{"code": 400, "result": "Bad Request", "error": {"reason": "BadRequest", "message": "Invalid variant"}}"#;
        assert_eq!(ErrorEnvelope::message_from(body), "Invalid variant");
    }

    #[test]
    fn error_message_falls_back_to_result_string() {
        let body = r#"{"code": 404, "result": "Order not found"}"#;
        assert_eq!(ErrorEnvelope::message_from(body), "Order not found");
    }

    #[test]
    fn webhook_payload_parses() {
        let json = r#"{
            "type": "package_shipped",
            "created": 1704067200,
            "retries": 0,
            "store": 12,
            "data": {"shipment": {"tracking_number": "PF123"}, "order": {"id": 13}}
        }"#;

        let payload: PrintfulWebhookPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.event_type, "package_shipped");
        assert_eq!(payload.data["shipment"]["tracking_number"], "PF123");
    }
}
