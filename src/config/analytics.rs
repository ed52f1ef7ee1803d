//! Analytics configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Analytics configuration (GA4)
///
/// The Measurement Protocol needs the measurement ID and API secret; the
/// Data API needs the property ID and a service-account credentials file.
/// The real provider requires all four.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsConfig {
    /// GA4 measurement ID (`G-XXXXXXX`)
    #[serde(default)]
    pub ga4_measurement_id: String,

    /// Measurement Protocol API secret
    #[serde(default)]
    pub ga4_api_secret: String,

    /// GA4 property ID (numeric)
    #[serde(default)]
    pub ga4_property_id: String,

    /// Path to the service-account key file for the Data API
    #[serde(default)]
    pub ga4_credentials_path: String,
}

impl AnalyticsConfig {
    /// Check whether every credential the real provider needs is present.
    pub fn is_configured(&self) -> bool {
        !self.ga4_measurement_id.is_empty()
            && !self.ga4_api_secret.is_empty()
            && !self.ga4_property_id.is_empty()
            && !self.ga4_credentials_path.is_empty()
    }

    /// Validate analytics configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.ga4_measurement_id.is_empty() && !self.ga4_measurement_id.starts_with("G-") {
            return Err(ValidationError::InvalidMeasurementId);
        }
        if !self.ga4_property_id.is_empty()
            && !self.ga4_property_id.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::InvalidPropertyId);
        }
        Ok(())
    }
}
