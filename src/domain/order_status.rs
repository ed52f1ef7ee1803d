//! Canonical order status.

use serde::{Deserialize, Serialize};

/// The platform's 3-value order status, consumed by the CRM connector's
/// stage mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, not yet settled.
    Open,

    /// Order paid and fulfilled.
    ClosedWon,

    /// Order canceled or refunded.
    ClosedLost,
}

impl OrderStatus {
    /// Parse a status string from platform documents, falling back to
    /// `Open` for anything unrecognized.
    pub fn parse(value: &str) -> Self {
        match value {
            "closed_won" => OrderStatus::ClosedWon,
            "closed_lost" => OrderStatus::ClosedLost,
            _ => OrderStatus::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::ClosedWon => "closed_won",
            OrderStatus::ClosedLost => "closed_lost",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
