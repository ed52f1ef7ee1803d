//! Provider selection factories - the composition root of the integration
//! layer.
//!
//! One factory per capability. Each inspects its configuration section and
//! constructs the real vendor adapter if and only if **every** required
//! credential is present; anything less selects the deterministic stub. The
//! check is strict-AND on purpose: partial credentials must fail safe to the
//! stub rather than produce a half-configured live adapter that fails at the
//! first network call.
//!
//! Nothing outside this module branches on configuration; consumers hold
//! `Arc<dyn Port>` values and never learn which side was picked.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::adapters::ga4::{Ga4Config, Ga4Provider, StubAnalyticsProvider};
use crate::adapters::memory::InMemoryFieldMappingStore;
use crate::adapters::printful::{PrintfulConfig, PrintfulProvider, StubFulfillmentProvider};
use crate::adapters::salesforce::{SalesforceConfig, SalesforceConnector, StubCrmConnector};
use crate::adapters::stripe::{StripeConfig, StripeGateway, StubPaymentGateway};
use crate::config::{AnalyticsConfig, AppConfig, CrmConfig, FulfillmentConfig, PaymentConfig};
use crate::ports::{
    AnalyticsError, AnalyticsProvider, CrmConnector, CrmError, FieldMappingStore,
    FulfillmentProvider, PaymentGateway,
};

/// Which side of a capability the factory selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderMode {
    /// Real vendor adapter, credentials fully present.
    Live,

    /// Deterministic network-free fallback.
    Stub,
}

/// Selection outcome per capability, surfaced on `/health`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ProviderModes {
    pub payment: ProviderMode,
    pub crm: ProviderMode,
    pub fulfillment: ProviderMode,
    pub analytics: ProviderMode,
}

/// The resolved provider set the application runs against.
pub struct Providers {
    pub payment: Arc<dyn PaymentGateway>,
    pub crm: Arc<dyn CrmConnector>,
    pub fulfillment: Arc<dyn FulfillmentProvider>,
    pub analytics: Arc<dyn AnalyticsProvider>,
    pub modes: ProviderModes,
}

/// Errors raised while constructing real providers at startup.
///
/// Missing credentials are never an error (they select stubs); these are
/// faults with credentials that *are* present, e.g. a failed CRM login or an
/// unreadable analytics key file.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    #[error("CRM connector initialization failed: {0}")]
    Crm(#[from] CrmError),

    #[error("analytics provider initialization failed: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// Select the payment gateway implementation.
pub fn select_payment_gateway(config: &PaymentConfig) -> (Arc<dyn PaymentGateway>, ProviderMode) {
    if config.is_configured() {
        info!(provider = "stripe", mode = "live", "payment gateway selected");
        let gateway = StripeGateway::new(StripeConfig::new(
            config.stripe_secret_key.clone(),
            Some(config.stripe_webhook_secret.clone()),
        ));
        (Arc::new(gateway), ProviderMode::Live)
    } else {
        info!(provider = "stripe", mode = "stub", "payment gateway selected");
        (Arc::new(StubPaymentGateway::new()), ProviderMode::Stub)
    }
}

/// Select the CRM connector implementation.
///
/// The real connector authenticates here, awaited, so a selected connector
/// can never serve traffic with an unestablished session. A login failure
/// surfaces as an error at selection time rather than on the first sync.
pub async fn select_crm_connector(
    config: &CrmConfig,
    mappings: Arc<dyn FieldMappingStore>,
) -> Result<(Arc<dyn CrmConnector>, ProviderMode), CrmError> {
    if config.is_configured() {
        info!(provider = "salesforce", mode = "live", "CRM connector selected");
        let connector = SalesforceConnector::connect(
            SalesforceConfig::new(
                config.salesforce_username.clone(),
                config.salesforce_password.clone(),
                config.salesforce_security_token.clone(),
                config.salesforce_login_url.clone(),
            ),
            mappings,
        )
        .await?;
        Ok((Arc::new(connector), ProviderMode::Live))
    } else {
        info!(provider = "salesforce", mode = "stub", "CRM connector selected");
        Ok((Arc::new(StubCrmConnector::new(mappings)), ProviderMode::Stub))
    }
}

/// Select the fulfillment provider implementation.
pub fn select_fulfillment_provider(
    config: &FulfillmentConfig,
) -> (Arc<dyn FulfillmentProvider>, ProviderMode) {
    if config.is_configured() {
        info!(provider = "printful", mode = "live", "fulfillment provider selected");
        let provider = PrintfulProvider::new(PrintfulConfig::new(config.printful_api_key.clone()));
        (Arc::new(provider), ProviderMode::Live)
    } else {
        info!(provider = "printful", mode = "stub", "fulfillment provider selected");
        (Arc::new(StubFulfillmentProvider::new()), ProviderMode::Stub)
    }
}

/// Select the analytics provider implementation.
pub fn select_analytics_provider(
    config: &AnalyticsConfig,
) -> Result<(Arc<dyn AnalyticsProvider>, ProviderMode), AnalyticsError> {
    if config.is_configured() {
        info!(provider = "ga4", mode = "live", "analytics provider selected");
        let provider = Ga4Provider::new(Ga4Config::new(
            config.ga4_measurement_id.clone(),
            config.ga4_api_secret.clone(),
            config.ga4_property_id.clone(),
            config.ga4_credentials_path.clone(),
        ))?;
        Ok((Arc::new(provider), ProviderMode::Live))
    } else {
        info!(provider = "ga4", mode = "stub", "analytics provider selected");
        Ok((Arc::new(StubAnalyticsProvider::new()), ProviderMode::Stub))
    }
}

/// Resolve one implementation per capability from the full configuration.
///
/// The field-mapping store backs both CRM implementations so mappings written
/// while stubbed survive a switch to live credentials within the process.
pub async fn select_providers(config: &AppConfig) -> Result<Providers, ProviderInitError> {
    let mappings: Arc<dyn FieldMappingStore> = Arc::new(InMemoryFieldMappingStore::new());

    let (payment, payment_mode) = select_payment_gateway(&config.payment);
    let (crm, crm_mode) = select_crm_connector(&config.crm, mappings).await?;
    let (fulfillment, fulfillment_mode) = select_fulfillment_provider(&config.fulfillment);
    let (analytics, analytics_mode) = select_analytics_provider(&config.analytics)?;

    Ok(Providers {
        payment,
        crm,
        fulfillment,
        analytics,
        modes: ProviderModes {
            payment: payment_mode,
            crm: crm_mode,
            fulfillment: fulfillment_mode,
            analytics: analytics_mode,
        },
    })
}
