//! CRM connector port.
//!
//! Defines the contract for CRM integrations (e.g., Salesforce). The
//! connector owns upsert semantics: contacts dedupe on the platform user ID,
//! opportunities dedupe on the platform order ID, leads are always created.
//!
//! # Error channels
//!
//! Vendor failures — whether raised as transport errors or reported as a
//! structured `{success: false, errors}` response — are normalized by
//! implementations into an `Ok(CrmSyncResult { success: false, .. })`. An
//! `Err(CrmError)` from a `sync_*` method signals an internal or
//! configuration fault, not a vendor rejection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::OrderStatus;

/// Port for CRM integrations.
#[async_trait]
pub trait CrmConnector: Send + Sync {
    /// Upsert a contact, deduplicating on the platform user ID.
    ///
    /// Calling twice with the same `cms_user_id` updates in place and
    /// returns the same external ID both times.
    async fn sync_contact(&self, data: ContactData) -> Result<CrmSyncResult, CrmError>;

    /// Create a lead. Never deduplicated: every call creates a new record.
    async fn sync_lead(&self, data: LeadData) -> Result<CrmSyncResult, CrmError>;

    /// Upsert an opportunity, deduplicating on the platform order ID.
    async fn sync_opportunity(&self, data: OpportunityData) -> Result<CrmSyncResult, CrmError>;

    /// Current CMS-field to CRM-field projection table.
    async fn field_mappings(&self) -> Result<Vec<FieldMapping>, CrmError>;

    /// Replace the projection table wholesale.
    async fn update_field_mappings(&self, mappings: Vec<FieldMapping>) -> Result<(), CrmError>;
}

/// Canonical contact upsert payload. Dedupe key: `cms_user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactData {
    /// Platform user ID, stored in a CRM custom field for dedupe lookups.
    pub cms_user_id: String,

    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Canonical lead payload. No dedupe key; every sync creates a record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadData {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,

    /// Originating form, referenced in the lead description when present.
    pub source_form: Option<String>,
}

/// Canonical opportunity upsert payload. Dedupe key: `order_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityData {
    /// Platform order ID, stored in a CRM custom field for dedupe lookups.
    pub order_id: String,

    /// External contact ID to associate, if known.
    pub contact_id: Option<String>,

    /// Order total in minor units. Converted to major units only at the CRM
    /// boundary.
    pub amount: i64,

    /// Canonical order status, mapped to the CRM stage vocabulary.
    pub status: OrderStatus,

    /// Line items summarized into the opportunity description.
    #[serde(default)]
    pub products: Vec<OpportunityProduct>,
}

/// Line item in an opportunity payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityProduct {
    pub name: String,
    pub quantity: u32,

    /// Line amount in minor units.
    pub amount: i64,
}

/// Outcome of a CRM sync operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmSyncResult {
    pub success: bool,

    /// External record ID when the sync succeeded.
    pub external_id: Option<String>,

    /// Vendor failure detail when the sync did not.
    pub error: Option<String>,
}

impl CrmSyncResult {
    pub fn ok(external_id: impl Into<String>) -> Self {
        Self {
            success: true,
            external_id: Some(external_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            external_id: None,
            error: Some(error.into()),
        }
    }
}

/// One row of the configurable CMS-field to CRM-field projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    pub cms_field: String,
    pub crm_field: String,

    /// CRM object the target field lives on (Contact, Lead, Opportunity).
    pub crm_object: String,
}

/// Errors from CRM connector internals.
#[derive(Debug, Clone, Error)]
pub enum CrmError {
    #[error("CRM authentication failed: {0}")]
    Authentication(String),

    #[error("CRM network error: {0}")]
    Network(String),

    #[error("CRM API error: {0}")]
    Api(String),

    #[error("unexpected CRM response: {0}")]
    InvalidResponse(String),
}
