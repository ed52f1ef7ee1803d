//! GA4 analytics provider adapter.
//!
//! Implements the `AnalyticsProvider` port against two Google endpoints: the
//! Measurement Protocol `collect` endpoint for server-to-server events, and
//! the Data API `runReport` endpoint for the dashboard read-model.
//!
//! The dashboard aggregate issues its five report queries concurrently and
//! fails as a whole if any one of them fails; the revenue leg issues its two
//! sub-queries (total, then by-product) sequentially. Every extraction path
//! goes through defaulting helpers, so missing rows or metric values land as
//! `0`/empty rather than holes in the aggregate.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::try_join;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::DateRange;
use crate::ports::{
    AnalyticsDashboardData, AnalyticsError, AnalyticsEvent, AnalyticsProvider, EcommerceFunnel,
    PageMetric, ProductRevenue, RevenueSummary, TrafficSource,
};

use super::auth::{ServiceAccountKey, TokenSource};
use super::wire::{CollectEvent, CollectRequest, RunReportRequest, RunReportResponse};

/// Funnel stage events, in order.
const FUNNEL_EVENTS: [&str; 4] = ["view_item", "add_to_cart", "begin_checkout", "purchase"];

/// GA4 configuration.
#[derive(Clone)]
pub struct Ga4Config {
    measurement_id: String,
    api_secret: SecretString,
    property_id: String,
    credentials_path: String,
    collect_base_url: String,
    data_api_base_url: String,
}

impl Ga4Config {
    pub fn new(
        measurement_id: impl Into<String>,
        api_secret: impl Into<String>,
        property_id: impl Into<String>,
        credentials_path: impl Into<String>,
    ) -> Self {
        Self {
            measurement_id: measurement_id.into(),
            api_secret: SecretString::new(api_secret.into()),
            property_id: property_id.into(),
            credentials_path: credentials_path.into(),
            collect_base_url: "https://www.google-analytics.com".to_string(),
            data_api_base_url: "https://analyticsdata.googleapis.com".to_string(),
        }
    }

    /// Override the Measurement Protocol base URL (for testing).
    pub fn with_collect_base_url(mut self, url: impl Into<String>) -> Self {
        self.collect_base_url = url.into();
        self
    }

    /// Override the Data API base URL (for testing).
    pub fn with_data_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.data_api_base_url = url.into();
        self
    }
}

/// GA4 analytics provider adapter.
pub struct Ga4Provider {
    config: Ga4Config,
    http_client: reqwest::Client,
    token_source: TokenSource,
}

impl Ga4Provider {
    /// Build a provider, loading the reporting credentials file eagerly so a
    /// bad path fails at selection time rather than on the first query.
    pub fn new(config: Ga4Config) -> Result<Self, AnalyticsError> {
        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        Ok(Self {
            token_source: TokenSource::new(key),
            http_client: reqwest::Client::new(),
            config,
        })
    }

    async fn run_report(
        &self,
        request: RunReportRequest,
    ) -> Result<RunReportResponse, AnalyticsError> {
        let token = self.token_source.access_token().await?;
        let url = format!(
            "{}/v1beta/properties/{}:runReport",
            self.config.data_api_base_url, self.config.property_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyticsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Analytics report query failed");
            return Err(AnalyticsError::Report(format!(
                "runReport failed ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalyticsError::InvalidResponse(e.to_string()))
    }

    async fn fetch_active_users(&self, range: &DateRange) -> Result<u64, AnalyticsError> {
        let request =
            RunReportRequest::new(range.start_str(), range.end_str(), &["activeUsers"]);
        Ok(self.run_report(request).await?.single_metric_u64())
    }

    async fn fetch_top_pages(&self, range: &DateRange) -> Result<Vec<PageMetric>, AnalyticsError> {
        let request =
            RunReportRequest::new(range.start_str(), range.end_str(), &["screenPageViews"])
                .with_dimension("pagePath")
                .ordered_by_metric_desc("screenPageViews")
                .with_limit(10);
        Ok(Self::assemble_top_pages(&self.run_report(request).await?))
    }

    async fn fetch_traffic_sources(
        &self,
        range: &DateRange,
    ) -> Result<Vec<TrafficSource>, AnalyticsError> {
        let request = RunReportRequest::new(range.start_str(), range.end_str(), &["sessions"])
            .with_dimension("sessionSource")
            .ordered_by_metric_desc("sessions")
            .with_limit(10);
        Ok(Self::assemble_traffic_sources(
            &self.run_report(request).await?,
        ))
    }

    async fn fetch_funnel(&self, range: &DateRange) -> Result<EcommerceFunnel, AnalyticsError> {
        let request = RunReportRequest::new(range.start_str(), range.end_str(), &["eventCount"])
            .with_dimension("eventName")
            .filtered_in_list("eventName", &FUNNEL_EVENTS);
        Ok(Self::assemble_funnel(&self.run_report(request).await?))
    }

    /// Revenue runs its two sub-queries sequentially: the total first, then
    /// the per-product breakdown.
    async fn fetch_revenue(&self, range: &DateRange) -> Result<RevenueSummary, AnalyticsError> {
        let total_request =
            RunReportRequest::new(range.start_str(), range.end_str(), &["totalRevenue"]);
        let total = self
            .run_report(total_request)
            .await?
            .rows
            .first()
            .map(|row| row.metric_minor_units(0))
            .unwrap_or(0);

        let by_product_request =
            RunReportRequest::new(range.start_str(), range.end_str(), &["itemRevenue"])
                .with_dimension("itemName")
                .ordered_by_metric_desc("itemRevenue")
                .with_limit(10);
        let by_product = Self::assemble_product_revenue(&self.run_report(by_product_request).await?);

        Ok(RevenueSummary { total, by_product })
    }

    fn assemble_top_pages(response: &RunReportResponse) -> Vec<PageMetric> {
        response
            .rows
            .iter()
            .map(|row| PageMetric {
                path: row.dimension(0),
                views: row.metric_u64(0),
            })
            .collect()
    }

    fn assemble_traffic_sources(response: &RunReportResponse) -> Vec<TrafficSource> {
        response
            .rows
            .iter()
            .map(|row| TrafficSource {
                source: row.dimension(0),
                sessions: row.metric_u64(0),
            })
            .collect()
    }

    fn assemble_funnel(response: &RunReportResponse) -> EcommerceFunnel {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for row in &response.rows {
            counts.insert(row.dimension(0), row.metric_u64(0));
        }

        EcommerceFunnel {
            views: counts.get("view_item").copied().unwrap_or(0),
            add_to_cart: counts.get("add_to_cart").copied().unwrap_or(0),
            begin_checkout: counts.get("begin_checkout").copied().unwrap_or(0),
            purchases: counts.get("purchase").copied().unwrap_or(0),
        }
    }

    fn assemble_product_revenue(response: &RunReportResponse) -> Vec<ProductRevenue> {
        response
            .rows
            .iter()
            .map(|row| ProductRevenue {
                product: row.dimension(0),
                revenue: row.metric_minor_units(0),
            })
            .collect()
    }
}

#[async_trait]
impl AnalyticsProvider for Ga4Provider {
    fn track_event(&self, name: &str, _params: HashMap<String, serde_json::Value>) {
        // Browser-originated events belong on the client; reaching this path
        // means a caller is wired wrong.
        tracing::warn!(
            event = name,
            "track_event called server-side; use track_server_event instead"
        );
    }

    async fn track_server_event(
        &self,
        client_id: &str,
        events: Vec<AnalyticsEvent>,
    ) -> Result<(), AnalyticsError> {
        let url = format!(
            "{}/mp/collect?measurement_id={}&api_secret={}",
            self.config.collect_base_url,
            self.config.measurement_id,
            self.config.api_secret.expose_secret()
        );

        let body = CollectRequest {
            client_id: client_id.to_string(),
            events: events
                .into_iter()
                .map(|event| CollectEvent {
                    name: event.name,
                    params: event.params.into_iter().collect(),
                })
                .collect(),
        };

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyticsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let reason = response
                .text()
                .await
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                });
            tracing::error!(%status, "Event submission rejected");
            return Err(AnalyticsError::Collect {
                status: status.as_u16(),
                reason,
            });
        }

        Ok(())
    }

    async fn dashboard_data(
        &self,
        date_range: DateRange,
    ) -> Result<AnalyticsDashboardData, AnalyticsError> {
        // Five independent report queries, concurrently; one failure fails
        // the whole aggregate.
        let (active_users, top_pages, traffic_sources, ecommerce_funnel, revenue) = try_join!(
            self.fetch_active_users(&date_range),
            self.fetch_top_pages(&date_range),
            self.fetch_traffic_sources(&date_range),
            self.fetch_funnel(&date_range),
            self.fetch_revenue(&date_range),
        )?;

        Ok(AnalyticsDashboardData {
            active_users,
            top_pages,
            traffic_sources,
            ecommerce_funnel,
            revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ga4::wire::{ReportRow, ReportValue};

    fn row(dimension: &str, metric: Option<&str>) -> ReportRow {
        ReportRow {
            dimension_values: vec![ReportValue {
                value: Some(dimension.to_string()),
            }],
            metric_values: vec![ReportValue {
                value: metric.map(String::from),
            }],
        }
    }

    #[test]
    fn funnel_assembles_from_event_rows() {
        let response = RunReportResponse {
            rows: vec![
                row("view_item", Some("5000")),
                row("add_to_cart", Some("320")),
                row("begin_checkout", Some("180")),
                row("purchase", Some("95")),
            ],
            row_count: 4,
        };

        let funnel = Ga4Provider::assemble_funnel(&response);

        assert_eq!(funnel.views, 5000);
        assert_eq!(funnel.add_to_cart, 320);
        assert_eq!(funnel.begin_checkout, 180);
        assert_eq!(funnel.purchases, 95);
    }

    #[test]
    fn funnel_defaults_missing_stages_to_zero() {
        let response = RunReportResponse {
            rows: vec![row("purchase", Some("12"))],
            row_count: 1,
        };

        let funnel = Ga4Provider::assemble_funnel(&response);

        assert_eq!(funnel.views, 0);
        assert_eq!(funnel.add_to_cart, 0);
        assert_eq!(funnel.purchases, 12);
    }

    #[test]
    fn funnel_defaults_undefined_metric_values_to_zero() {
        let response = RunReportResponse {
            rows: vec![row("view_item", None)],
            row_count: 1,
        };

        let funnel = Ga4Provider::assemble_funnel(&response);
        assert_eq!(funnel.views, 0);
    }

    #[test]
    fn top_pages_assemble_with_defaults() {
        let response = RunReportResponse {
            rows: vec![row("/home", Some("1200")), row("/shop", None)],
            row_count: 2,
        };

        let pages = Ga4Provider::assemble_top_pages(&response);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].path, "/home");
        assert_eq!(pages[0].views, 1200);
        assert_eq!(pages[1].views, 0);
    }

    #[test]
    fn empty_report_yields_empty_lists() {
        let response = RunReportResponse::default();
        assert!(Ga4Provider::assemble_top_pages(&response).is_empty());
        assert!(Ga4Provider::assemble_traffic_sources(&response).is_empty());
        assert!(Ga4Provider::assemble_product_revenue(&response).is_empty());
    }

    #[test]
    fn product_revenue_converts_to_minor_units() {
        let response = RunReportResponse {
            rows: vec![row("Classic Tee", Some("129.99"))],
            row_count: 1,
        };

        let revenue = Ga4Provider::assemble_product_revenue(&response);
        assert_eq!(revenue[0].revenue, 12999);
    }
}
