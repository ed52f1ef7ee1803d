//! GA4 Data API wire types.
//!
//! Request/response shapes for `runReport` and the Measurement Protocol
//! `collect` endpoint. Metric values arrive as strings; extraction helpers
//! default every missing row or value to zero so the dashboard aggregate
//! can never surface a hole.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════════
// runReport Request
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub date_ranges: Vec<ApiDateRange>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<Dimension>,

    pub metrics: Vec<Metric>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_filter: Option<FilterExpression>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_bys: Option<Vec<OrderBy>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl RunReportRequest {
    pub fn new(start_date: String, end_date: String, metrics: &[&str]) -> Self {
        Self {
            date_ranges: vec![ApiDateRange {
                start_date,
                end_date,
            }],
            dimensions: Vec::new(),
            metrics: metrics
                .iter()
                .map(|name| Metric {
                    name: (*name).to_string(),
                })
                .collect(),
            dimension_filter: None,
            order_bys: None,
            limit: None,
        }
    }

    pub fn with_dimension(mut self, name: &str) -> Self {
        self.dimensions.push(Dimension {
            name: name.to_string(),
        });
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    /// Order by the first metric, descending.
    pub fn ordered_by_metric_desc(mut self, metric: &str) -> Self {
        self.order_bys = Some(vec![OrderBy {
            metric: MetricOrderBy {
                metric_name: metric.to_string(),
            },
            desc: true,
        }]);
        self
    }

    /// Restrict a dimension to a value list.
    pub fn filtered_in_list(mut self, dimension: &str, values: &[&str]) -> Self {
        self.dimension_filter = Some(FilterExpression {
            filter: Filter {
                field_name: dimension.to_string(),
                in_list_filter: InListFilter {
                    values: values.iter().map(|v| (*v).to_string()).collect(),
                },
            },
        });
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterExpression {
    pub filter: Filter,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_name: String,
    pub in_list_filter: InListFilter,
}

#[derive(Debug, Clone, Serialize)]
pub struct InListFilter {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    pub metric: MetricOrderBy,
    pub desc: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOrderBy {
    pub metric_name: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// runReport Response
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    pub rows: Vec<ReportRow>,

    #[serde(default)]
    pub row_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    #[serde(default)]
    pub dimension_values: Vec<ReportValue>,

    #[serde(default)]
    pub metric_values: Vec<ReportValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportValue {
    #[serde(default)]
    pub value: Option<String>,
}

impl ReportRow {
    /// Dimension value at `index`, empty string when absent.
    pub fn dimension(&self, index: usize) -> String {
        self.dimension_values
            .get(index)
            .and_then(|v| v.value.clone())
            .unwrap_or_default()
    }

    /// Integer metric at `index`, `0` when absent or unparseable.
    pub fn metric_u64(&self, index: usize) -> u64 {
        self.metric_values
            .get(index)
            .and_then(|v| v.value.as_deref())
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| v.max(0.0) as u64)
            .unwrap_or(0)
    }

    /// Currency metric at `index` in minor units, `0` when absent or
    /// unparseable.
    pub fn metric_minor_units(&self, index: usize) -> i64 {
        self.metric_values
            .get(index)
            .and_then(|v| v.value.as_deref())
            .and_then(|v| v.parse::<f64>().ok())
            .map(|v| (v * 100.0).round() as i64)
            .unwrap_or(0)
    }
}

impl RunReportResponse {
    /// First-row integer metric, `0` when the report has no rows.
    pub fn single_metric_u64(&self) -> u64 {
        self.rows.first().map(|row| row.metric_u64(0)).unwrap_or(0)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Measurement Protocol
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct CollectRequest {
    pub client_id: String,
    pub events: Vec<CollectEvent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectEvent {
    pub name: String,

    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub params: serde_json::Map<String, serde_json::Value>,
}
