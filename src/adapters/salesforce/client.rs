//! Session-based Salesforce REST client.
//!
//! Authenticates with the SOAP partner login (username + password +
//! security token against the configured login URL), then issues SObject
//! CRUD and SOQL query calls over the REST API using the session token.
//!
//! Login is explicit and awaited: [`SalesforceClient::connect`] must
//! complete before the client serves traffic, so a connector can never race
//! an in-flight or silently failed authentication.
//!
//! # Error channels
//!
//! Salesforce reports record-level failures two ways: REST error arrays on
//! non-2xx responses, and `{"success": false, "errors": [...]}` bodies on
//! 2xx save results. Both are normalized here into `Err(CrmError::Api)` with
//! the vendor payload serialized into the message; the connector above
//! decides what to do with them.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::ports::CrmError;

const API_VERSION: &str = "v58.0";

/// Salesforce credentials and login endpoint.
#[derive(Clone)]
pub struct SalesforceConfig {
    pub username: String,
    pub password: SecretString,
    pub security_token: SecretString,

    /// Login host, e.g. `https://login.salesforce.com` (or the sandbox
    /// `https://test.salesforce.com`).
    pub login_url: String,
}

impl SalesforceConfig {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        security_token: impl Into<String>,
        login_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::new(password.into()),
            security_token: SecretString::new(security_token.into()),
            login_url: login_url.into(),
        }
    }
}

/// Established session state.
#[derive(Debug, Clone)]
struct Session {
    session_id: String,
    instance_url: String,
}

/// Result of a SObject create/update call.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveResult {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

/// SOQL query response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    #[serde(rename = "totalSize", default)]
    pub total_size: i64,

    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

/// Session-based Salesforce client.
pub struct SalesforceClient {
    config: SalesforceConfig,
    http_client: reqwest::Client,
    session: RwLock<Option<Session>>,
}

impl SalesforceClient {
    pub fn new(config: SalesforceConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            session: RwLock::new(None),
        }
    }

    /// Authenticate and store the session. Must complete before any query
    /// or CRUD call; callers construct the connector through an async
    /// factory that awaits this.
    pub async fn connect(&self) -> Result<(), CrmError> {
        let login_endpoint = format!(
            "{}/services/Soap/u/58.0",
            self.config.login_url.trim_end_matches('/')
        );

        let password = format!(
            "{}{}",
            self.config.password.expose_secret(),
            self.config.security_token.expose_secret()
        );

        let envelope = format!(
            concat!(
                r#"<?xml version="1.0" encoding="utf-8"?>"#,
                r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" "#,
                r#"xmlns:urn="urn:partner.soap.sforce.com">"#,
                "<soapenv:Body><urn:login>",
                "<urn:username>{}</urn:username>",
                "<urn:password>{}</urn:password>",
                "</urn:login></soapenv:Body></soapenv:Envelope>"
            ),
            xml_escape(&self.config.username),
            xml_escape(&password),
        );

        let response = self
            .http_client
            .post(&login_endpoint)
            .header("Content-Type", "text/xml; charset=UTF-8")
            .header("SOAPAction", "login")
            .body(envelope)
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        if !status.is_success() {
            let fault = extract_tag(&body, "faultstring")
                .unwrap_or_else(|| format!("login failed with status {}", status));
            tracing::error!(%status, "Salesforce login failed");
            return Err(CrmError::Authentication(fault));
        }

        let session_id = extract_tag(&body, "sessionId")
            .ok_or_else(|| CrmError::InvalidResponse("login response missing sessionId".into()))?;
        let server_url = extract_tag(&body, "serverUrl")
            .ok_or_else(|| CrmError::InvalidResponse("login response missing serverUrl".into()))?;
        let instance_url = origin_of(&server_url)
            .ok_or_else(|| CrmError::InvalidResponse("unparseable serverUrl".into()))?;

        tracing::info!(instance_url = %instance_url, "Salesforce session established");

        *self.session.write().await = Some(Session {
            session_id,
            instance_url,
        });

        Ok(())
    }

    async fn session(&self) -> Result<Session, CrmError> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| CrmError::Authentication("client is not connected".into()))
    }

    /// Run a SOQL query.
    pub async fn query(&self, soql: &str) -> Result<QueryResponse, CrmError> {
        let session = self.session().await?;
        let url = format!(
            "{}/services/data/{}/query",
            session.instance_url, API_VERSION
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&session.session_id)
            .query(&[("q", soql)])
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, "Salesforce query failed");
            return Err(CrmError::Api(body));
        }

        response
            .json()
            .await
            .map_err(|e| CrmError::InvalidResponse(e.to_string()))
    }

    /// Create an SObject record. Returns the new record ID.
    pub async fn create(
        &self,
        sobject: &str,
        fields: serde_json::Value,
    ) -> Result<String, CrmError> {
        let session = self.session().await?;
        let url = format!(
            "{}/services/data/{}/sobjects/{}",
            session.instance_url, API_VERSION, sobject
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&session.session_id)
            .json(&fields)
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            tracing::error!(%status, sobject, "Salesforce create failed");
            return Err(CrmError::Api(body));
        }

        let result: SaveResult =
            serde_json::from_str(&body).map_err(|e| CrmError::InvalidResponse(e.to_string()))?;

        // A 2xx save can still carry a structured failure; normalize it into
        // the same error channel as a REST-level rejection.
        if !result.success {
            let errors = serde_json::to_string(&result.errors).unwrap_or_default();
            return Err(CrmError::Api(errors));
        }

        result
            .id
            .ok_or_else(|| CrmError::InvalidResponse("save result missing record id".into()))
    }

    /// Update an SObject record in place.
    pub async fn update(
        &self,
        sobject: &str,
        record_id: &str,
        fields: serde_json::Value,
    ) -> Result<(), CrmError> {
        let session = self.session().await?;
        let url = format!(
            "{}/services/data/{}/sobjects/{}/{}",
            session.instance_url, API_VERSION, sobject, record_id
        );

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&session.session_id)
            .json(&fields)
            .send()
            .await
            .map_err(|e| CrmError::Network(e.to_string()))?;

        // Successful updates return 204 No Content.
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, sobject, record_id, "Salesforce update failed");
            return Err(CrmError::Api(body));
        }

        Ok(())
    }
}

/// SObject CRUD surface the connector needs. A trait seam so connector
/// logic is testable against a fake and reusable over any session client.
#[async_trait]
pub trait SobjectApi: Send + Sync {
    async fn query(&self, soql: &str) -> Result<QueryResponse, CrmError>;

    async fn create(&self, sobject: &str, fields: serde_json::Value) -> Result<String, CrmError>;

    async fn update(
        &self,
        sobject: &str,
        record_id: &str,
        fields: serde_json::Value,
    ) -> Result<(), CrmError>;
}

#[async_trait]
impl SobjectApi for SalesforceClient {
    async fn query(&self, soql: &str) -> Result<QueryResponse, CrmError> {
        SalesforceClient::query(self, soql).await
    }

    async fn create(&self, sobject: &str, fields: serde_json::Value) -> Result<String, CrmError> {
        SalesforceClient::create(self, sobject, fields).await
    }

    async fn update(
        &self,
        sobject: &str,
        record_id: &str,
        fields: serde_json::Value,
    ) -> Result<(), CrmError> {
        SalesforceClient::update(self, sobject, record_id, fields).await
    }
}

/// Escape a value for a SOQL string literal.
pub fn escape_soql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Pull the text content of the first `<tag>...</tag>` pair.
fn extract_tag(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = xml.find(&open)? + open.len();
    let end = xml[start..].find(&close)? + start;
    Some(xml[start..end].to_string())
}

/// Scheme + host of a URL, without pulling in a URL crate.
fn origin_of(url: &str) -> Option<String> {
    let scheme_end = url.find("://")? + 3;
    let host_end = url[scheme_end..]
        .find('/')
        .map(|i| scheme_end + i)
        .unwrap_or(url.len());
    Some(url[..host_end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_soql_quotes() {
        assert_eq!(escape_soql("O'Brien"), "O\\'Brien");
        assert_eq!(escape_soql("a\\b"), "a\\\\b");
        assert_eq!(escape_soql("plain"), "plain");
    }

    #[test]
    fn xml_escape_entities() {
        assert_eq!(xml_escape("a&b<c>"), "a&amp;b&lt;c&gt;");
        assert_eq!(xml_escape(r#"p"w'd"#), "p&quot;w&apos;d");
    }

    #[test]
    fn extract_tag_finds_first_pair() {
        let xml = "<resp><sessionId>00Dabc!xyz</sessionId><serverUrl>https://x</serverUrl></resp>";
        assert_eq!(extract_tag(xml, "sessionId").unwrap(), "00Dabc!xyz");
        assert_eq!(extract_tag(xml, "serverUrl").unwrap(), "https://x");
        assert!(extract_tag(xml, "missing").is_none());
    }

    #[test]
    fn origin_of_strips_path() {
        assert_eq!(
            origin_of("https://na1.salesforce.com/services/Soap/u/58.0/00D").unwrap(),
            "https://na1.salesforce.com"
        );
        assert_eq!(
            origin_of("https://na1.salesforce.com").unwrap(),
            "https://na1.salesforce.com"
        );
        assert!(origin_of("no-scheme").is_none());
    }

    #[test]
    fn save_result_parses_structured_failure() {
        let json = r#"{
            "success": false,
            "errors": [{"statusCode": "REQUIRED_FIELD_MISSING", "message": "Required fields are missing: [LastName]", "fields": ["LastName"]}]
        }"#;

        let result: SaveResult = serde_json::from_str(json).unwrap();
        assert!(!result.success);
        assert!(result.id.is_none());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn query_response_parses_records() {
        let json = r#"{
            "totalSize": 1,
            "done": true,
            "records": [{"attributes": {"type": "Contact"}, "Id": "003XX000004TMM2AAO"}]
        }"#;

        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_size, 1);
        assert_eq!(response.records[0]["Id"], "003XX000004TMM2AAO");
    }

    #[tokio::test]
    async fn calls_without_session_fail_as_authentication_errors() {
        let client = SalesforceClient::new(SalesforceConfig::new(
            "ops@example.com",
            "hunter2",
            "token",
            "https://login.salesforce.com",
        ));

        let result = client.query("SELECT Id FROM Contact").await;
        assert!(matches!(result, Err(CrmError::Authentication(_))));
    }
}
