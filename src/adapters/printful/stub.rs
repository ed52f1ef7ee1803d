//! Stub fulfillment provider.
//!
//! Network-free implementation selected when no fulfillment API key is
//! configured. Mirrors every vendor shape with synthetic but internally
//! consistent data: orders always carry one shipment with a tracking number,
//! and shipping quotes always return the three named tiers.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::money::minor_units_to_decimal_string;
use crate::ports::{
    Carrier, CreateOrderRequest, FulfillmentError, FulfillmentEventType, FulfillmentOrder,
    FulfillmentProvider, FulfillmentSyncResult, FulfillmentWebhookEvent, OrderCosts, OrderItem,
    Recipient, ShippingRate, ShippingRateRequest, SyncProduct, SyncProductDetail,
    SyncProductRequest, SyncVariant, VariantStockUpdate,
};

/// Stub fulfillment provider.
pub struct StubFulfillmentProvider {
    next_id: AtomicI64,
}

impl Default for StubFulfillmentProvider {
    fn default() -> Self {
        Self {
            next_id: AtomicI64::new(1000),
        }
    }
}

impl StubFulfillmentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn simulate_latency() {
        let delay_ms = { rand::thread_rng().gen_range(100..=300) };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    fn stub_order(&self, id: i64, external_id: Option<String>, recipient: Recipient, items: Vec<OrderItem>, status: &str) -> FulfillmentOrder {
        let subtotal_minor: i64 = items
            .iter()
            .map(|item| {
                let unit = crate::domain::money::decimal_string_to_minor_units(&item.retail_price)
                    .unwrap_or(0);
                unit * i64::from(item.quantity)
            })
            .sum();
        let shipping_minor = 499;

        let now = chrono::Utc::now().timestamp();

        FulfillmentOrder {
            id,
            external_id,
            status: status.to_string(),
            recipient,
            costs: OrderCosts {
                currency: "USD".to_string(),
                subtotal: minor_units_to_decimal_string(subtotal_minor),
                discount: "0.00".to_string(),
                shipping: minor_units_to_decimal_string(shipping_minor),
                tax: "0.00".to_string(),
                total: minor_units_to_decimal_string(subtotal_minor + shipping_minor),
            },
            shipments: vec![crate::ports::Shipment {
                id: id + 9000,
                carrier: "USPS".to_string(),
                service: "Priority Mail".to_string(),
                tracking_number: format!("9400{:020}", id),
                tracking_url: Some(format!(
                    "https://tools.usps.com/go/TrackConfirmAction?tLabels=9400{:020}",
                    id
                )),
                shipped_at: Some(now),
            }],
            items,
            created: now,
            updated: now,
        }
    }

    fn default_recipient() -> Recipient {
        Recipient {
            name: "Test Recipient".to_string(),
            address1: "19749 Dearborn St".to_string(),
            address2: None,
            city: "Chatsworth".to_string(),
            state_code: Some("CA".to_string()),
            country_code: "US".to_string(),
            zip: "91311".to_string(),
            phone: None,
            email: None,
        }
    }
}

#[async_trait]
impl FulfillmentProvider for StubFulfillmentProvider {
    async fn sync_product(
        &self,
        _request: SyncProductRequest,
    ) -> Result<FulfillmentSyncResult, FulfillmentError> {
        Self::simulate_latency().await;
        Ok(FulfillmentSyncResult::ok(Some(self.allocate_id())))
    }

    async fn update_product_stock(
        &self,
        _sync_product_id: i64,
        _updates: Vec<VariantStockUpdate>,
    ) -> Result<(), FulfillmentError> {
        Self::simulate_latency().await;
        Ok(())
    }

    async fn get_sync_product(
        &self,
        sync_product_id: i64,
    ) -> Result<SyncProductDetail, FulfillmentError> {
        Self::simulate_latency().await;

        Ok(SyncProductDetail {
            product: SyncProduct {
                id: sync_product_id,
                external_id: format!("prod_{}", sync_product_id),
                name: "Classic Tee".to_string(),
                variant_count: 1,
                synced_count: 1,
                thumbnail_url: None,
            },
            variants: vec![SyncVariant {
                id: sync_product_id * 10,
                external_id: format!("var_{}", sync_product_id),
                name: "Classic Tee / M".to_string(),
                variant_id: 4012,
                retail_price: "25.00".to_string(),
                currency: "USD".to_string(),
                sku: Some(format!("SKU-{}-M", sync_product_id)),
            }],
        })
    }

    async fn list_sync_products(
        &self,
        _offset: u32,
        limit: u32,
    ) -> Result<Vec<SyncProduct>, FulfillmentError> {
        Self::simulate_latency().await;

        let count = limit.min(2);
        Ok((0..count)
            .map(|i| SyncProduct {
                id: 1000 + i64::from(i),
                external_id: format!("prod_{}", 1000 + i),
                name: format!("Classic Tee {}", i + 1),
                variant_count: 1,
                synced_count: 1,
                thumbnail_url: None,
            })
            .collect())
    }

    async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<FulfillmentOrder, FulfillmentError> {
        Self::simulate_latency().await;

        let id = self.allocate_id();
        let items = request
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| OrderItem {
                id: id * 100 + i as i64,
                sync_variant_id: Some(item.sync_variant_id),
                name: "Classic Tee / M".to_string(),
                quantity: item.quantity,
                retail_price: item
                    .retail_price
                    .map(minor_units_to_decimal_string)
                    .unwrap_or_else(|| "25.00".to_string()),
            })
            .collect();

        Ok(self.stub_order(id, Some(request.external_id), request.recipient, items, "draft"))
    }

    async fn get_order(&self, order_id: i64) -> Result<FulfillmentOrder, FulfillmentError> {
        Self::simulate_latency().await;

        let items = vec![OrderItem {
            id: order_id * 100,
            sync_variant_id: Some(order_id * 10),
            name: "Classic Tee / M".to_string(),
            quantity: 1,
            retail_price: "25.00".to_string(),
        }];

        Ok(self.stub_order(order_id, None, Self::default_recipient(), items, "fulfilled"))
    }

    async fn confirm_order(&self, order_id: i64) -> Result<FulfillmentOrder, FulfillmentError> {
        Self::simulate_latency().await;

        let items = vec![OrderItem {
            id: order_id * 100,
            sync_variant_id: Some(order_id * 10),
            name: "Classic Tee / M".to_string(),
            quantity: 1,
            retail_price: "25.00".to_string(),
        }];

        Ok(self.stub_order(order_id, None, Self::default_recipient(), items, "pending"))
    }

    async fn cancel_order(
        &self,
        _order_id: i64,
    ) -> Result<FulfillmentSyncResult, FulfillmentError> {
        Self::simulate_latency().await;
        Ok(FulfillmentSyncResult::ok(None))
    }

    async fn calculate_shipping_rates(
        &self,
        _request: ShippingRateRequest,
    ) -> Result<Vec<ShippingRate>, FulfillmentError> {
        Self::simulate_latency().await;

        // Exactly three tiers, each with min <= max delivery days.
        Ok(vec![
            ShippingRate {
                id: "STANDARD".to_string(),
                name: "Flat Rate (Estimated delivery: 5-7 business days)".to_string(),
                rate: "4.99".to_string(),
                currency: "USD".to_string(),
                min_delivery_days: 5,
                max_delivery_days: 7,
            },
            ShippingRate {
                id: "EXPRESS".to_string(),
                name: "Express (Estimated delivery: 2-3 business days)".to_string(),
                rate: "14.99".to_string(),
                currency: "USD".to_string(),
                min_delivery_days: 2,
                max_delivery_days: 3,
            },
            ShippingRate {
                id: "OVERNIGHT".to_string(),
                name: "Overnight (Estimated delivery: 1 business day)".to_string(),
                rate: "29.99".to_string(),
                currency: "USD".to_string(),
                min_delivery_days: 1,
                max_delivery_days: 1,
            },
        ])
    }

    async fn get_shipping_carriers(&self) -> Result<Vec<Carrier>, FulfillmentError> {
        Self::simulate_latency().await;

        Ok(vec![
            Carrier {
                code: "USPS".to_string(),
                name: "United States Postal Service".to_string(),
            },
            Carrier {
                code: "FEDEX".to_string(),
                name: "FedEx".to_string(),
            },
            Carrier {
                code: "DHL".to_string(),
                name: "DHL Express".to_string(),
            },
        ])
    }

    async fn handle_webhook(
        &self,
        _payload: &[u8],
        _signature: &str,
    ) -> Result<FulfillmentWebhookEvent, FulfillmentError> {
        Self::simulate_latency().await;

        let order_id = self.allocate_id();
        Ok(FulfillmentWebhookEvent {
            event_type: FulfillmentEventType::PackageShipped,
            created: chrono::Utc::now().timestamp(),
            retries: 0,
            data: serde_json::json!({
                "order": {"id": order_id, "status": "fulfilled"},
                "shipment": {
                    "carrier": "USPS",
                    "tracking_number": format!("9400{:020}", order_id)
                }
            }),
        })
    }
}
