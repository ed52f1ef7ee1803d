//! Stub analytics provider.
//!
//! Network-free implementation selected when GA4 credentials are absent.
//! Returns a fixed, internally consistent dataset regardless of the
//! requested date range — callers must not assume the stub's values vary
//! with input. The funnel strictly narrows.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::domain::DateRange;
use crate::ports::{
    AnalyticsDashboardData, AnalyticsError, AnalyticsEvent, AnalyticsProvider, EcommerceFunnel,
    PageMetric, ProductRevenue, RevenueSummary, TrafficSource,
};

/// Stub analytics provider.
#[derive(Debug, Default, Clone)]
pub struct StubAnalyticsProvider;

impl StubAnalyticsProvider {
    pub fn new() -> Self {
        Self
    }

    async fn simulate_latency() {
        let delay_ms = { rand::thread_rng().gen_range(100..=300) };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    fn fixed_dataset() -> AnalyticsDashboardData {
        AnalyticsDashboardData {
            active_users: 1250,
            top_pages: vec![
                PageMetric {
                    path: "/".to_string(),
                    views: 8200,
                },
                PageMetric {
                    path: "/shop".to_string(),
                    views: 5400,
                },
                PageMetric {
                    path: "/events".to_string(),
                    views: 2100,
                },
            ],
            traffic_sources: vec![
                TrafficSource {
                    source: "google".to_string(),
                    sessions: 4300,
                },
                TrafficSource {
                    source: "(direct)".to_string(),
                    sessions: 2900,
                },
                TrafficSource {
                    source: "instagram".to_string(),
                    sessions: 1150,
                },
            ],
            ecommerce_funnel: EcommerceFunnel {
                views: 5000,
                add_to_cart: 320,
                begin_checkout: 180,
                purchases: 95,
            },
            revenue: RevenueSummary {
                total: 458_500,
                by_product: vec![
                    ProductRevenue {
                        product: "Classic Tee".to_string(),
                        revenue: 250_000,
                    },
                    ProductRevenue {
                        product: "Tote Bag".to_string(),
                        revenue: 120_000,
                    },
                    ProductRevenue {
                        product: "Gallery Poster".to_string(),
                        revenue: 88_500,
                    },
                ],
            },
        }
    }
}

#[async_trait]
impl AnalyticsProvider for StubAnalyticsProvider {
    fn track_event(&self, name: &str, _params: HashMap<String, serde_json::Value>) {
        tracing::warn!(
            event = name,
            "track_event called server-side; use track_server_event instead"
        );
    }

    async fn track_server_event(
        &self,
        _client_id: &str,
        _events: Vec<AnalyticsEvent>,
    ) -> Result<(), AnalyticsError> {
        Self::simulate_latency().await;
        Ok(())
    }

    async fn dashboard_data(
        &self,
        _date_range: DateRange,
    ) -> Result<AnalyticsDashboardData, AnalyticsError> {
        Self::simulate_latency().await;
        Ok(Self::fixed_dataset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn funnel_strictly_narrows() {
        let stub = StubAnalyticsProvider::new();
        let data = stub
            .dashboard_data(range((2026, 1, 1), (2026, 1, 31)))
            .await
            .unwrap();

        let funnel = data.ecommerce_funnel;
        assert!(funnel.views > funnel.add_to_cart);
        assert!(funnel.add_to_cart > funnel.begin_checkout);
        assert!(funnel.begin_checkout > funnel.purchases);
    }

    #[tokio::test]
    async fn dataset_does_not_vary_with_date_range() {
        let stub = StubAnalyticsProvider::new();

        let january = stub
            .dashboard_data(range((2026, 1, 1), (2026, 1, 31)))
            .await
            .unwrap();
        let one_day = stub
            .dashboard_data(range((2026, 6, 15), (2026, 6, 15)))
            .await
            .unwrap();

        assert_eq!(january, one_day);
    }

    #[tokio::test]
    async fn revenue_breakdown_stays_within_total() {
        let stub = StubAnalyticsProvider::new();
        let data = stub
            .dashboard_data(range((2026, 1, 1), (2026, 1, 31)))
            .await
            .unwrap();

        let breakdown_sum: i64 = data.revenue.by_product.iter().map(|p| p.revenue).sum();
        assert!(breakdown_sum <= data.revenue.total);
    }

    #[tokio::test]
    async fn track_server_event_accepts_events() {
        let stub = StubAnalyticsProvider::new();

        let result = stub
            .track_server_event(
                "client_1",
                vec![AnalyticsEvent {
                    name: "purchase".to_string(),
                    params: HashMap::new(),
                }],
            )
            .await;

        assert!(result.is_ok());
    }
}
