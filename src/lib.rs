//! Commerce Bridge - provider integration layer for the commerce platform.
//!
//! Integrates the platform with its external providers - a payment processor,
//! a print-on-demand fulfillment service, a CRM, and a web-analytics service -
//! behind one capability port per concern. Selection factories pick the real
//! vendor adapter when credentials are fully configured and fall back to a
//! deterministic stub otherwise.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod providers;
