//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is loaded
//! with the `COMMERCE_BRIDGE_` prefix and nested values use underscores as
//! separators.
//!
//! Capability credential sets are optional by design: an incomplete set is
//! not an error, it routes the provider selection factories to that
//! capability's stub.
//!
//! # Example
//!
//! ```no_run
//! use commerce_bridge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod analytics;
mod crm;
mod error;
mod fulfillment;
mod payment;
mod server;

pub use analytics::AnalyticsConfig;
pub use crm::CrmConfig;
pub use error::{ConfigError, ValidationError};
pub use fulfillment::FulfillmentConfig;
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the commerce bridge. Load using
/// [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Payment gateway configuration (Stripe)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// CRM configuration (Salesforce)
    #[serde(default)]
    pub crm: CrmConfig,

    /// Fulfillment configuration (Printful)
    #[serde(default)]
    pub fulfillment: FulfillmentConfig,

    /// Analytics configuration (GA4)
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COMMERCE_BRIDGE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COMMERCE_BRIDGE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `COMMERCE_BRIDGE__PAYMENT__STRIPE_SECRET_KEY=...` ->
    ///   `payment.stripe_secret_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COMMERCE_BRIDGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Absent credential sets are fine (they select stubs); values that are
    /// present must be well-formed.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.payment.validate()?;
        self.crm.validate()?;
        self.analytics.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
