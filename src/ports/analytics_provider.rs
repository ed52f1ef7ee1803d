//! Analytics provider port.
//!
//! Defines the contract for the web-analytics vendor (GA4): server-side
//! event submission and the dashboard read-model.
//!
//! The dashboard aggregate is rebuilt on every query; it has no write path.
//! Every numeric field defaults to `0` and every list to `[]` — a vendor
//! response with missing rows must never surface as a missing value.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::DateRange;

/// Port for analytics integrations.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Client-side tracking entry point.
    ///
    /// Browser-originated events must never reach the server path, so this
    /// is a no-op that logs a warning when called server-side.
    fn track_event(&self, name: &str, params: HashMap<String, serde_json::Value>);

    /// Submit events server-to-server.
    async fn track_server_event(
        &self,
        client_id: &str,
        events: Vec<AnalyticsEvent>,
    ) -> Result<(), AnalyticsError>;

    /// Build the dashboard aggregate for a date range.
    ///
    /// All underlying report queries must succeed; there is no
    /// partial-result mode.
    async fn dashboard_data(
        &self,
        date_range: DateRange,
    ) -> Result<AnalyticsDashboardData, AnalyticsError>;
}

/// One event for server-to-server submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,

    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// Dashboard aggregate read-model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsDashboardData {
    #[serde(default)]
    pub active_users: u64,

    #[serde(default)]
    pub top_pages: Vec<PageMetric>,

    #[serde(default)]
    pub traffic_sources: Vec<TrafficSource>,

    #[serde(default)]
    pub ecommerce_funnel: EcommerceFunnel,

    #[serde(default)]
    pub revenue: RevenueSummary,
}

/// Page views for one path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetric {
    pub path: String,

    #[serde(default)]
    pub views: u64,
}

/// Sessions attributed to one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrafficSource {
    pub source: String,

    #[serde(default)]
    pub sessions: u64,
}

/// Ecommerce conversion funnel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcommerceFunnel {
    #[serde(default)]
    pub views: u64,

    #[serde(default)]
    pub add_to_cart: u64,

    #[serde(default)]
    pub begin_checkout: u64,

    #[serde(default)]
    pub purchases: u64,
}

/// Revenue totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueSummary {
    /// Total revenue in minor units.
    #[serde(default)]
    pub total: i64,

    #[serde(default)]
    pub by_product: Vec<ProductRevenue>,
}

/// Revenue attributed to one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product: String,

    /// Revenue in minor units.
    #[serde(default)]
    pub revenue: i64,
}

/// Errors from analytics operations.
#[derive(Debug, Clone, Error)]
pub enum AnalyticsError {
    #[error("analytics network error: {0}")]
    Network(String),

    #[error("event submission rejected (status {status}): {reason}")]
    Collect { status: u16, reason: String },

    #[error("report query failed: {0}")]
    Report(String),

    #[error("unexpected analytics response: {0}")]
    InvalidResponse(String),
}
