//! Fulfillment configuration

use serde::Deserialize;

/// Fulfillment configuration (Printful)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FulfillmentConfig {
    /// Printful API key, also the webhook HMAC secret
    #[serde(default)]
    pub printful_api_key: String,
}

impl FulfillmentConfig {
    /// Check whether the real provider can be constructed.
    pub fn is_configured(&self) -> bool {
        !self.printful_api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_not_configured() {
        assert!(!FulfillmentConfig::default().is_configured());
    }

    #[test]
    fn test_key_present_configured() {
        let config = FulfillmentConfig {
            printful_api_key: "pf_api_key".to_string(),
        };
        assert!(config.is_configured());
    }
}
