//! Salesforce CRM connector.
//!
//! Implements the `CrmConnector` port over the session client. The connector
//! owns the upsert semantics:
//!
//! - **Contact** dedupes on the `CMS_User_Id__c` custom field: found records
//!   are updated in place, everything else is created.
//! - **Lead** is never deduplicated; every sync creates a record.
//! - **Opportunity** dedupes on `CMS_Order_Id__c` with the same
//!   find-or-create branch as Contact, and maps the canonical order status
//!   onto Salesforce stage names.
//!
//! Vendor failures from either channel (REST rejection or structured
//! `{success: false, errors}` save result — both arrive here as
//! `Err(CrmError)` from the client) are caught and reduced to
//! `CrmSyncResult { success: false, error }`.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::money::{minor_units_to_decimal_string, minor_units_to_major};
use crate::domain::OrderStatus;
use crate::ports::{
    ContactData, CrmConnector, CrmError, CrmSyncResult, FieldMapping, FieldMappingStore, LeadData,
    OpportunityData, OpportunityProduct,
};

use super::client::{escape_soql, SalesforceClient, SalesforceConfig, SobjectApi};

/// Custom field holding the platform user ID on Contact.
const CONTACT_DEDUPE_FIELD: &str = "CMS_User_Id__c";

/// Custom field holding the platform order ID on Opportunity.
const OPPORTUNITY_DEDUPE_FIELD: &str = "CMS_Order_Id__c";

/// Salesforce CRM connector.
pub struct SalesforceConnector {
    api: Arc<dyn SobjectApi>,
    mappings: Arc<dyn FieldMappingStore>,
}

impl SalesforceConnector {
    /// Connect and authenticate. Login is awaited here so a connector never
    /// serves traffic before the session is established.
    pub async fn connect(
        config: SalesforceConfig,
        mappings: Arc<dyn FieldMappingStore>,
    ) -> Result<Self, CrmError> {
        let client = SalesforceClient::new(config);
        client.connect().await?;
        Ok(Self {
            api: Arc::new(client),
            mappings,
        })
    }

    /// Build a connector over an already-established API. Used by tests and
    /// anywhere a session is managed externally.
    pub fn with_api(api: Arc<dyn SobjectApi>, mappings: Arc<dyn FieldMappingStore>) -> Self {
        Self { api, mappings }
    }

    /// Map the canonical order status onto Salesforce stage names.
    ///
    /// Total by construction; `Open` (the parse fallback for unrecognized
    /// platform statuses) lands on the default stage.
    pub(crate) fn stage_name(status: OrderStatus) -> &'static str {
        match status {
            OrderStatus::Open => "Prospecting",
            OrderStatus::ClosedWon => "Closed Won",
            OrderStatus::ClosedLost => "Closed Lost",
        }
    }

    /// Look up a record by a custom-field value, returning its ID when the
    /// record exists and actually carries one.
    async fn find_record_id(
        &self,
        sobject: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<String>, CrmError> {
        let soql = format!(
            "SELECT Id FROM {} WHERE {} = '{}' LIMIT 1",
            sobject,
            field,
            escape_soql(value)
        );

        let response = self.api.query(&soql).await?;

        Ok(response
            .records
            .first()
            .and_then(|record| record["Id"].as_str())
            .filter(|id| !id.is_empty())
            .map(String::from))
    }

    /// Find-or-create branch shared by Contact and Opportunity.
    async fn upsert(
        &self,
        sobject: &str,
        dedupe_field: &str,
        dedupe_value: &str,
        fields: serde_json::Value,
    ) -> Result<String, CrmError> {
        match self
            .find_record_id(sobject, dedupe_field, dedupe_value)
            .await?
        {
            Some(record_id) => {
                self.api.update(sobject, &record_id, fields).await?;
                Ok(record_id)
            }
            None => self.api.create(sobject, fields).await,
        }
    }

    fn contact_fields(data: &ContactData) -> serde_json::Value {
        json!({
            "FirstName": data.first_name,
            "LastName": data.last_name,
            "Email": data.email,
            "Phone": data.phone,
            CONTACT_DEDUPE_FIELD: data.cms_user_id,
        })
    }

    fn lead_fields(data: &LeadData) -> serde_json::Value {
        let mut fields = json!({
            "FirstName": data.first_name,
            "LastName": data.last_name,
            "Email": data.email,
            "Company": data.company.as_deref().unwrap_or("Unknown"),
        });

        if let Some(form) = &data.source_form {
            fields["Description"] = json!(format!("Created from form: {}", form));
        }

        fields
    }

    fn opportunity_fields(data: &OpportunityData) -> serde_json::Value {
        let mut fields = json!({
            "Name": format!("Order {}", data.order_id),
            "StageName": Self::stage_name(data.status),
            // Salesforce Amount is in major units; the conversion from
            // minor units happens only at this boundary.
            "Amount": minor_units_to_major(data.amount),
            "CloseDate": chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            OPPORTUNITY_DEDUPE_FIELD: data.order_id,
        });

        if let Some(contact_id) = &data.contact_id {
            fields["ContactId"] = json!(contact_id);
        }
        if !data.products.is_empty() {
            fields["Description"] = json!(describe_products(&data.products));
        }

        fields
    }
}

fn describe_products(products: &[OpportunityProduct]) -> String {
    products
        .iter()
        .map(|p| {
            format!(
                "{} x {} ({})",
                p.quantity,
                p.name,
                minor_units_to_decimal_string(p.amount)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl CrmConnector for SalesforceConnector {
    async fn sync_contact(&self, data: ContactData) -> Result<CrmSyncResult, CrmError> {
        let fields = Self::contact_fields(&data);
        match self
            .upsert("Contact", CONTACT_DEDUPE_FIELD, &data.cms_user_id, fields)
            .await
        {
            Ok(external_id) => Ok(CrmSyncResult::ok(external_id)),
            Err(err) => {
                tracing::warn!(cms_user_id = %data.cms_user_id, error = %err, "Contact sync failed");
                Ok(CrmSyncResult::failed(err.to_string()))
            }
        }
    }

    async fn sync_lead(&self, data: LeadData) -> Result<CrmSyncResult, CrmError> {
        // Leads are intentionally never deduplicated.
        match self.api.create("Lead", Self::lead_fields(&data)).await {
            Ok(external_id) => Ok(CrmSyncResult::ok(external_id)),
            Err(err) => {
                tracing::warn!(email = %data.email, error = %err, "Lead sync failed");
                Ok(CrmSyncResult::failed(err.to_string()))
            }
        }
    }

    async fn sync_opportunity(&self, data: OpportunityData) -> Result<CrmSyncResult, CrmError> {
        let fields = Self::opportunity_fields(&data);
        match self
            .upsert(
                "Opportunity",
                OPPORTUNITY_DEDUPE_FIELD,
                &data.order_id,
                fields,
            )
            .await
        {
            Ok(external_id) => Ok(CrmSyncResult::ok(external_id)),
            Err(err) => {
                tracing::warn!(order_id = %data.order_id, error = %err, "Opportunity sync failed");
                Ok(CrmSyncResult::failed(err.to_string()))
            }
        }
    }

    async fn field_mappings(&self) -> Result<Vec<FieldMapping>, CrmError> {
        self.mappings.get().await
    }

    async fn update_field_mappings(&self, mappings: Vec<FieldMapping>) -> Result<(), CrmError> {
        self.mappings.replace(mappings).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryFieldMappingStore;
    use crate::adapters::salesforce::client::QueryResponse;
    use std::sync::Mutex;

    /// Recorded call against the fake API.
    #[derive(Debug, Clone, PartialEq)]
    enum ApiCall {
        Query(String),
        Create(String),
        Update(String, String),
    }

    /// Fake SObject API with canned query results and call recording.
    struct FakeSobjectApi {
        query_records: Mutex<Vec<serde_json::Value>>,
        create_result: Mutex<Result<String, CrmError>>,
        calls: Mutex<Vec<ApiCall>>,
        last_fields: Mutex<Option<serde_json::Value>>,
    }

    impl FakeSobjectApi {
        fn returning_empty() -> Self {
            Self {
                query_records: Mutex::new(vec![]),
                create_result: Mutex::new(Ok("NEW_RECORD_ID_000".to_string())),
                calls: Mutex::new(vec![]),
                last_fields: Mutex::new(None),
            }
        }

        fn returning_record(id: &str) -> Self {
            let fake = Self::returning_empty();
            *fake.query_records.lock().unwrap() =
                vec![json!({"attributes": {"type": "Contact"}, "Id": id})];
            fake
        }

        fn failing_create(message: &str) -> Self {
            let fake = Self::returning_empty();
            *fake.create_result.lock().unwrap() = Err(CrmError::Api(message.to_string()));
            fake
        }

        fn calls(&self) -> Vec<ApiCall> {
            self.calls.lock().unwrap().clone()
        }

        fn last_fields(&self) -> serde_json::Value {
            self.last_fields.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl SobjectApi for FakeSobjectApi {
        async fn query(&self, soql: &str) -> Result<QueryResponse, CrmError> {
            self.calls
                .lock()
                .unwrap()
                .push(ApiCall::Query(soql.to_string()));
            let records = self.query_records.lock().unwrap().clone();
            Ok(QueryResponse {
                total_size: records.len() as i64,
                records,
            })
        }

        async fn create(
            &self,
            sobject: &str,
            fields: serde_json::Value,
        ) -> Result<String, CrmError> {
            self.calls
                .lock()
                .unwrap()
                .push(ApiCall::Create(sobject.to_string()));
            *self.last_fields.lock().unwrap() = Some(fields);
            self.create_result.lock().unwrap().clone()
        }

        async fn update(
            &self,
            sobject: &str,
            record_id: &str,
            fields: serde_json::Value,
        ) -> Result<(), CrmError> {
            self.calls
                .lock()
                .unwrap()
                .push(ApiCall::Update(sobject.to_string(), record_id.to_string()));
            *self.last_fields.lock().unwrap() = Some(fields);
            Ok(())
        }
    }

    fn connector(api: Arc<FakeSobjectApi>) -> SalesforceConnector {
        SalesforceConnector::with_api(api, Arc::new(InMemoryFieldMappingStore::new()))
    }

    fn contact_data() -> ContactData {
        ContactData {
            cms_user_id: "user_42".to_string(),
            email: "jo@example.com".to_string(),
            first_name: "Jo".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Stage Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn stage_mapping_covers_every_status() {
        assert_eq!(
            SalesforceConnector::stage_name(OrderStatus::Open),
            "Prospecting"
        );
        assert_eq!(
            SalesforceConnector::stage_name(OrderStatus::ClosedWon),
            "Closed Won"
        );
        assert_eq!(
            SalesforceConnector::stage_name(OrderStatus::ClosedLost),
            "Closed Lost"
        );
    }

    #[test]
    fn unrecognized_platform_status_lands_on_default_stage() {
        // Platform documents carry status strings; parse falls back to Open,
        // which maps to the default stage.
        let status = OrderStatus::parse("something_else");
        assert_eq!(SalesforceConnector::stage_name(status), "Prospecting");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Contact Upsert Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn contact_sync_creates_when_lookup_is_empty() {
        let api = Arc::new(FakeSobjectApi::returning_empty());
        let connector = connector(api.clone());

        let result = connector.sync_contact(contact_data()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.external_id.as_deref(), Some("NEW_RECORD_ID_000"));
        assert_eq!(
            api.calls(),
            vec![
                ApiCall::Query(
                    "SELECT Id FROM Contact WHERE CMS_User_Id__c = 'user_42' LIMIT 1".to_string()
                ),
                ApiCall::Create("Contact".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn contact_sync_updates_in_place_when_found() {
        let api = Arc::new(FakeSobjectApi::returning_record("003EXISTING000000A"));
        let connector = connector(api.clone());

        let result = connector.sync_contact(contact_data()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.external_id.as_deref(), Some("003EXISTING000000A"));
        assert!(matches!(api.calls()[1], ApiCall::Update(ref o, _) if o == "Contact"));
    }

    #[tokio::test]
    async fn contact_sync_is_idempotent_on_dedupe_key() {
        let api = Arc::new(FakeSobjectApi::returning_record("003EXISTING000000A"));
        let connector = connector(api.clone());

        let first = connector.sync_contact(contact_data()).await.unwrap();
        let second = connector.sync_contact(contact_data()).await.unwrap();

        assert_eq!(first.external_id, second.external_id);
        let creates = api
            .calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::Create(_)))
            .count();
        assert_eq!(creates, 0);
    }

    #[tokio::test]
    async fn contact_sync_creates_when_found_record_has_no_usable_id() {
        let api = Arc::new(FakeSobjectApi::returning_empty());
        *api.query_records.lock().unwrap() = vec![json!({"attributes": {"type": "Contact"}})];
        let connector = connector(api.clone());

        let result = connector.sync_contact(contact_data()).await.unwrap();

        assert!(result.success);
        assert!(matches!(api.calls()[1], ApiCall::Create(_)));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Lead Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn lead_sync_always_creates_and_never_queries() {
        let api = Arc::new(FakeSobjectApi::returning_empty());
        let connector = connector(api.clone());

        let lead = LeadData {
            email: "lead@example.com".to_string(),
            first_name: "Lea".to_string(),
            last_name: "Derly".to_string(),
            company: None,
            source_form: Some("newsletter".to_string()),
        };

        connector.sync_lead(lead.clone()).await.unwrap();
        connector.sync_lead(lead).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| matches!(c, ApiCall::Create(ref o) if o == "Lead")));

        let fields = api.last_fields();
        assert_eq!(fields["Company"], "Unknown");
        assert_eq!(fields["Description"], "Created from form: newsletter");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Opportunity Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn opportunity_sync_against_empty_crm_creates_with_major_units_and_stage() {
        let api = Arc::new(FakeSobjectApi::returning_empty());
        let connector = connector(api.clone());

        let result = connector
            .sync_opportunity(OpportunityData {
                order_id: "order_abc".to_string(),
                contact_id: Some("003X".to_string()),
                amount: 5000,
                status: OrderStatus::ClosedWon,
                products: vec![OpportunityProduct {
                    name: "Widget".to_string(),
                    quantity: 2,
                    amount: 2500,
                }],
            })
            .await
            .unwrap();

        assert!(result.success);

        let fields = api.last_fields();
        assert_eq!(fields["Amount"], json!(50.0));
        assert_eq!(fields["StageName"], "Closed Won");
        assert_eq!(fields["CMS_Order_Id__c"], "order_abc");
        assert_eq!(fields["ContactId"], "003X");
        assert_eq!(fields["Description"], "2 x Widget (25.00)");
        assert!(matches!(
            api.calls()[1],
            ApiCall::Create(ref o) if o == "Opportunity"
        ));
    }

    #[tokio::test]
    async fn opportunity_sync_dedupes_on_order_id() {
        let api = Arc::new(FakeSobjectApi::returning_record("006EXISTING000000A"));
        let connector = connector(api.clone());

        let result = connector
            .sync_opportunity(OpportunityData {
                order_id: "order_abc".to_string(),
                contact_id: None,
                amount: 1000,
                status: OrderStatus::Open,
                products: vec![],
            })
            .await
            .unwrap();

        assert_eq!(result.external_id.as_deref(), Some("006EXISTING000000A"));
        assert!(matches!(api.calls()[1], ApiCall::Update(ref o, _) if o == "Opportunity"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Normalization Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn vendor_failure_becomes_structured_result_not_error() {
        let api = Arc::new(FakeSobjectApi::failing_create(
            r#"[{"statusCode":"REQUIRED_FIELD_MISSING","message":"Required fields are missing: [LastName]"}]"#,
        ));
        let connector = connector(api);

        let result = connector.sync_contact(contact_data()).await.unwrap();

        assert!(!result.success);
        assert!(result.external_id.is_none());
        assert!(result.error.unwrap().contains("REQUIRED_FIELD_MISSING"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Field Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn field_mappings_round_trip_through_store() {
        let connector = connector(Arc::new(FakeSobjectApi::returning_empty()));

        let mappings = vec![FieldMapping {
            cms_field: "email".to_string(),
            crm_field: "Email".to_string(),
            crm_object: "Contact".to_string(),
        }];

        connector
            .update_field_mappings(mappings.clone())
            .await
            .unwrap();
        let read_back = connector.field_mappings().await.unwrap();

        assert_eq!(read_back, mappings);
    }
}
