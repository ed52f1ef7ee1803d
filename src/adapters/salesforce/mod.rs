//! Salesforce CRM adapter.
//!
//! Implements the `CrmConnector` port twice: [`SalesforceConnector`] over a
//! session-based REST client, and [`StubCrmConnector`] as the network-free
//! fallback selected when credentials are absent.
//!
//! # Configuration
//!
//! The real connector requires username, password, security token, and the
//! login URL. Authentication is explicit and awaited: construction goes
//! through the async [`SalesforceConnector::connect`] factory, never a
//! fire-and-forget login.

pub(crate) mod client;
mod connector;
mod stub;

pub use client::{SalesforceClient, SalesforceConfig, SobjectApi};
pub use connector::SalesforceConnector;
pub use stub::StubCrmConnector;
