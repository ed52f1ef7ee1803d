//! Stub CRM connector.
//!
//! Network-free implementation selected when Salesforce credentials are
//! absent. Synthesizes vendor-realistic 18-character record IDs with the
//! matching object-type prefix and always reports success.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::ports::{
    ContactData, CrmConnector, CrmError, CrmSyncResult, FieldMapping, FieldMappingStore, LeadData,
    OpportunityData,
};

/// Salesforce object-type key prefixes.
const CONTACT_PREFIX: &str = "003";
const LEAD_PREFIX: &str = "00Q";
const OPPORTUNITY_PREFIX: &str = "006";

/// Stub CRM connector.
pub struct StubCrmConnector {
    mappings: Arc<dyn FieldMappingStore>,
}

impl StubCrmConnector {
    pub fn new(mappings: Arc<dyn FieldMappingStore>) -> Self {
        Self { mappings }
    }

    /// An 18-character ID with the object-type prefix, like the vendor's.
    fn synthetic_id(prefix: &str) -> String {
        let head = uuid::Uuid::new_v4().simple().to_string().to_uppercase();
        format!("{}{}", prefix, &head[..15])
    }

    async fn simulate_latency() {
        let delay_ms = { rand::thread_rng().gen_range(100..=300) };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[async_trait]
impl CrmConnector for StubCrmConnector {
    async fn sync_contact(&self, _data: ContactData) -> Result<CrmSyncResult, CrmError> {
        Self::simulate_latency().await;
        Ok(CrmSyncResult::ok(Self::synthetic_id(CONTACT_PREFIX)))
    }

    async fn sync_lead(&self, _data: LeadData) -> Result<CrmSyncResult, CrmError> {
        Self::simulate_latency().await;
        Ok(CrmSyncResult::ok(Self::synthetic_id(LEAD_PREFIX)))
    }

    async fn sync_opportunity(&self, _data: OpportunityData) -> Result<CrmSyncResult, CrmError> {
        Self::simulate_latency().await;
        Ok(CrmSyncResult::ok(Self::synthetic_id(OPPORTUNITY_PREFIX)))
    }

    async fn field_mappings(&self) -> Result<Vec<FieldMapping>, CrmError> {
        self.mappings.get().await
    }

    async fn update_field_mappings(&self, mappings: Vec<FieldMapping>) -> Result<(), CrmError> {
        self.mappings.replace(mappings).await
    }
}
