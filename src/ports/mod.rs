//! Ports - capability contracts for external providers.
//!
//! Following hexagonal architecture, each integration concern is one trait:
//!
//! - [`PaymentGateway`] - payment intents, refunds, customers, webhooks
//! - [`CrmConnector`] - contact/lead/opportunity sync and field mappings
//! - [`FulfillmentProvider`] - print-on-demand products, orders, shipping
//! - [`AnalyticsProvider`] - event tracking and the dashboard read-model
//! - [`FieldMappingStore`] - the one piece of cross-request state
//!
//! Adapters implement these ports; consumers depend only on the trait, never
//! on a concrete vendor or stub.

mod analytics_provider;
mod crm_connector;
mod field_mapping_store;
mod fulfillment_provider;
mod payment_gateway;

pub use analytics_provider::{
    AnalyticsDashboardData, AnalyticsError, AnalyticsEvent, AnalyticsProvider, EcommerceFunnel,
    PageMetric, ProductRevenue, RevenueSummary, TrafficSource,
};
pub use crm_connector::{
    ContactData, CrmConnector, CrmError, CrmSyncResult, FieldMapping, LeadData, OpportunityData,
    OpportunityProduct,
};
pub use field_mapping_store::FieldMappingStore;
pub use fulfillment_provider::{
    Carrier, CreateOrderRequest, FulfillmentError, FulfillmentEventType, FulfillmentOrder,
    FulfillmentProvider, FulfillmentSyncResult, FulfillmentWebhookEvent, OrderCosts, OrderItem,
    OrderItemRequest, Recipient, Shipment, ShippingAddress, ShippingRate, ShippingRateItem,
    ShippingRateRequest, SyncProduct, SyncProductDetail, SyncProductRequest, SyncVariant,
    SyncVariantRequest, VariantStockUpdate,
};
pub use payment_gateway::{
    CreateCustomerRequest, CreatePaymentIntentRequest, CreateRefundRequest, PaymentCustomer,
    PaymentError, PaymentErrorCode, PaymentEventType, PaymentGateway, PaymentIntent,
    PaymentIntentStatus, PaymentResult, PaymentWebhookEvent, RefundResult, RefundStatus,
};
