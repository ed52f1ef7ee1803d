//! ProcessFulfillmentWebhookHandler - command handler for fulfillment
//! provider webhooks.

use std::sync::Arc;

use tracing::{info, warn};

use crate::ports::{
    FulfillmentError, FulfillmentEventType, FulfillmentProvider, FulfillmentWebhookEvent,
};

/// Command to process a fulfillment webhook.
#[derive(Debug, Clone)]
pub struct ProcessFulfillmentWebhookCommand {
    /// Raw webhook payload.
    pub payload: Vec<u8>,

    /// Webhook signature header value.
    pub signature: String,
}

/// A processed fulfillment webhook.
#[derive(Debug, Clone)]
pub struct ProcessedFulfillmentWebhook {
    /// Canonical event type, echoed in the acknowledgement.
    pub event_type: FulfillmentEventType,

    pub outcome: FulfillmentWebhookOutcome,
}

/// What the dispatch decided for the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentWebhookOutcome {
    /// A package shipped; the order workflow records the tracking number.
    PackageShipped {
        order_id: Option<i64>,
        tracking_number: Option<String>,
    },

    /// A package came back; the order workflow is notified.
    PackageReturned { order_id: Option<i64> },

    /// The vendor could not fulfill the order.
    OrderFailed { order_id: Option<i64> },

    /// The order was canceled vendor-side.
    OrderCanceled { order_id: Option<i64> },

    /// A sync product finished processing.
    ProductSynced { sync_product_id: Option<i64> },

    /// Vendor stock availability changed.
    StockUpdated { sync_product_id: Option<i64> },

    /// Event type this layer does not act on. Acknowledged so the vendor
    /// does not retry-storm.
    Acknowledged { event_type: String },
}

/// Handler for fulfillment provider webhooks.
pub struct ProcessFulfillmentWebhookHandler {
    provider: Arc<dyn FulfillmentProvider>,
}

impl ProcessFulfillmentWebhookHandler {
    pub fn new(provider: Arc<dyn FulfillmentProvider>) -> Self {
        Self { provider }
    }

    /// Verify, normalize, and dispatch one webhook delivery.
    pub async fn handle(
        &self,
        cmd: ProcessFulfillmentWebhookCommand,
    ) -> Result<ProcessedFulfillmentWebhook, FulfillmentError> {
        let event = self
            .provider
            .handle_webhook(&cmd.payload, &cmd.signature)
            .await?;

        let outcome = Self::dispatch(&event);
        Ok(ProcessedFulfillmentWebhook {
            event_type: event.event_type,
            outcome,
        })
    }

    fn dispatch(event: &FulfillmentWebhookEvent) -> FulfillmentWebhookOutcome {
        let order_id = event.data["order"]["id"].as_i64();
        let sync_product_id = event.data["sync_product"]["id"].as_i64();

        match &event.event_type {
            FulfillmentEventType::PackageShipped => {
                let tracking_number = event.data["shipment"]["tracking_number"]
                    .as_str()
                    .map(String::from);
                info!(
                    order_id = order_id.unwrap_or_default(),
                    tracking_number = tracking_number.as_deref().unwrap_or("unknown"),
                    "package shipped, notifying order workflow"
                );
                FulfillmentWebhookOutcome::PackageShipped {
                    order_id,
                    tracking_number,
                }
            }
            FulfillmentEventType::PackageReturned => {
                warn!(
                    order_id = order_id.unwrap_or_default(),
                    "package returned, notifying order workflow"
                );
                FulfillmentWebhookOutcome::PackageReturned { order_id }
            }
            FulfillmentEventType::OrderFailed => {
                warn!(
                    order_id = order_id.unwrap_or_default(),
                    "order failed at the fulfillment vendor, notifying order workflow"
                );
                FulfillmentWebhookOutcome::OrderFailed { order_id }
            }
            FulfillmentEventType::OrderCanceled => {
                info!(
                    order_id = order_id.unwrap_or_default(),
                    "order canceled vendor-side, notifying order workflow"
                );
                FulfillmentWebhookOutcome::OrderCanceled { order_id }
            }
            FulfillmentEventType::ProductSynced => {
                info!(
                    sync_product_id = sync_product_id.unwrap_or_default(),
                    "product sync completed"
                );
                FulfillmentWebhookOutcome::ProductSynced { sync_product_id }
            }
            FulfillmentEventType::StockUpdated => {
                info!(
                    sync_product_id = sync_product_id.unwrap_or_default(),
                    "vendor stock updated"
                );
                FulfillmentWebhookOutcome::StockUpdated { sync_product_id }
            }
            FulfillmentEventType::Unknown(event_type) => {
                info!(
                    event_type = %event_type,
                    "unhandled fulfillment webhook event acknowledged"
                );
                FulfillmentWebhookOutcome::Acknowledged {
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
        Carrier, CreateOrderRequest, FulfillmentOrder, FulfillmentSyncResult, ShippingRate,
        ShippingRateRequest, SyncProduct, SyncProductDetail, SyncProductRequest,
        VariantStockUpdate,
    };

    /// Provider that returns a fixed webhook event, or an error.
    struct FixedEventProvider {
        event: Result<FulfillmentWebhookEvent, FulfillmentError>,
    }

    impl FixedEventProvider {
        fn returning(event: FulfillmentWebhookEvent) -> Self {
            Self { event: Ok(event) }
        }

        fn failing(error: FulfillmentError) -> Self {
            Self { event: Err(error) }
        }
    }

    #[async_trait]
    impl FulfillmentProvider for FixedEventProvider {
        async fn sync_product(
            &self,
            _request: SyncProductRequest,
        ) -> Result<FulfillmentSyncResult, FulfillmentError> {
            unimplemented!()
        }

        async fn update_product_stock(
            &self,
            _sync_product_id: i64,
            _updates: Vec<VariantStockUpdate>,
        ) -> Result<(), FulfillmentError> {
            unimplemented!()
        }

        async fn get_sync_product(
            &self,
            _sync_product_id: i64,
        ) -> Result<SyncProductDetail, FulfillmentError> {
            unimplemented!()
        }

        async fn list_sync_products(
            &self,
            _offset: u32,
            _limit: u32,
        ) -> Result<Vec<SyncProduct>, FulfillmentError> {
            unimplemented!()
        }

        async fn create_order(
            &self,
            _request: CreateOrderRequest,
        ) -> Result<FulfillmentOrder, FulfillmentError> {
            unimplemented!()
        }

        async fn get_order(&self, _order_id: i64) -> Result<FulfillmentOrder, FulfillmentError> {
            unimplemented!()
        }

        async fn confirm_order(
            &self,
            _order_id: i64,
        ) -> Result<FulfillmentOrder, FulfillmentError> {
            unimplemented!()
        }

        async fn cancel_order(
            &self,
            _order_id: i64,
        ) -> Result<FulfillmentSyncResult, FulfillmentError> {
            unimplemented!()
        }

        async fn calculate_shipping_rates(
            &self,
            _request: ShippingRateRequest,
        ) -> Result<Vec<ShippingRate>, FulfillmentError> {
            unimplemented!()
        }

        async fn get_shipping_carriers(&self) -> Result<Vec<Carrier>, FulfillmentError> {
            unimplemented!()
        }

        async fn handle_webhook(
            &self,
            _payload: &[u8],
            _signature: &str,
        ) -> Result<FulfillmentWebhookEvent, FulfillmentError> {
            self.event.clone()
        }
    }

    fn command() -> ProcessFulfillmentWebhookCommand {
        ProcessFulfillmentWebhookCommand {
            payload: br#"{"type":"package_shipped"}"#.to_vec(),
            signature: "deadbeef".to_string(),
        }
    }

    #[tokio::test]
    async fn dispatches_package_shipped_with_tracking() {
        let provider = FixedEventProvider::returning(FulfillmentWebhookEvent {
            event_type: FulfillmentEventType::PackageShipped,
            created: 1700000000,
            retries: 0,
            data: json!({
                "order": {"id": 42},
                "shipment": {"carrier": "USPS", "tracking_number": "9400111899560000000000"}
            }),
        });
        let handler = ProcessFulfillmentWebhookHandler::new(Arc::new(provider));

        let processed = handler.handle(command()).await.unwrap();

        assert_eq!(processed.event_type, FulfillmentEventType::PackageShipped);
        assert_eq!(
            processed.outcome,
            FulfillmentWebhookOutcome::PackageShipped {
                order_id: Some(42),
                tracking_number: Some("9400111899560000000000".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn dispatches_order_canceled() {
        let provider = FixedEventProvider::returning(FulfillmentWebhookEvent {
            event_type: FulfillmentEventType::OrderCanceled,
            created: 1700000000,
            retries: 1,
            data: json!({"order": {"id": 7}}),
        });
        let handler = ProcessFulfillmentWebhookHandler::new(Arc::new(provider));

        let processed = handler.handle(command()).await.unwrap();

        assert_eq!(
            processed.outcome,
            FulfillmentWebhookOutcome::OrderCanceled { order_id: Some(7) }
        );
    }

    #[tokio::test]
    async fn acknowledges_unknown_event_types() {
        let provider = FixedEventProvider::returning(FulfillmentWebhookEvent {
            event_type: FulfillmentEventType::Unknown("order_put_hold".to_string()),
            created: 1700000000,
            retries: 0,
            data: json!({}),
        });
        let handler = ProcessFulfillmentWebhookHandler::new(Arc::new(provider));

        let processed = handler.handle(command()).await.unwrap();

        assert_eq!(
            processed.outcome,
            FulfillmentWebhookOutcome::Acknowledged {
                event_type: "order_put_hold".to_string()
            }
        );
    }

    #[tokio::test]
    async fn propagates_verification_failure() {
        let provider = FixedEventProvider::failing(FulfillmentError::InvalidWebhook(
            "signature mismatch".to_string(),
        ));
        let handler = ProcessFulfillmentWebhookHandler::new(Arc::new(provider));

        assert!(handler.handle(command()).await.is_err());
    }
}
