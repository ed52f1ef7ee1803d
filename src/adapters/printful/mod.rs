//! Printful fulfillment adapter.
//!
//! Implements the `FulfillmentProvider` port twice: [`PrintfulProvider`]
//! against the Printful REST API, and [`StubFulfillmentProvider`] as the
//! network-free fallback selected when no API key is configured.

mod provider;
mod stub;
mod wire;

pub use provider::{PrintfulConfig, PrintfulProvider};
pub use stub::StubFulfillmentProvider;
