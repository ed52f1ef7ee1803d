//! GA4 analytics adapter.
//!
//! Implements the `AnalyticsProvider` port twice: [`Ga4Provider`] against
//! the Measurement Protocol and the Data API, and [`StubAnalyticsProvider`]
//! as the network-free fallback selected when credentials are absent.

mod auth;
mod provider;
mod stub;
pub(crate) mod wire;

pub use provider::{Ga4Config, Ga4Provider};
pub use stub::StubAnalyticsProvider;
