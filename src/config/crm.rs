//! CRM configuration

use serde::Deserialize;

use super::error::ValidationError;

/// CRM configuration (Salesforce)
///
/// The real connector performs a username/password + security-token login
/// against the configured login URL. All four values are required; anything
/// less selects the stub connector.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    /// Salesforce username
    #[serde(default)]
    pub salesforce_username: String,

    /// Salesforce password
    #[serde(default)]
    pub salesforce_password: String,

    /// Salesforce security token, appended to the password at login
    #[serde(default)]
    pub salesforce_security_token: String,

    /// Salesforce login URL
    #[serde(default = "default_login_url")]
    pub salesforce_login_url: String,
}

impl CrmConfig {
    /// Check whether every credential the real connector needs is present.
    pub fn is_configured(&self) -> bool {
        !self.salesforce_username.is_empty()
            && !self.salesforce_password.is_empty()
            && !self.salesforce_security_token.is_empty()
            && !self.salesforce_login_url.is_empty()
    }

    /// Validate CRM configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.salesforce_login_url.is_empty()
            && !self.salesforce_login_url.starts_with("http://")
            && !self.salesforce_login_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidCrmLoginUrl);
        }
        Ok(())
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            salesforce_username: String::new(),
            salesforce_password: String::new(),
            salesforce_security_token: String::new(),
            salesforce_login_url: default_login_url(),
        }
    }
}

fn default_login_url() -> String {
    "https://login.salesforce.com".to_string()
}
