//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Environment variable holding the account subdomain.
pub const SUBDOMAIN_VAR: &str = "AMOCRM_SUBDOMAIN";
/// Environment variable overriding the API root URL.
pub const BASE_URL_VAR: &str = "AMOCRM_BASE_URL";

/// Largest page the API serves.
pub const MAX_PAGE_LIMIT: u32 = amocrm_model::filter::MAX_LIMIT;

/// Connection settings for one amoCRM account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Account subdomain: `acme` for `https://acme.amocrm.ru`.
    pub subdomain: String,
    /// Full API root, e.g. `http://127.0.0.1:8080/api/v4`. Overrides the
    /// URL derived from `subdomain`.
    pub base_url: Option<String>,
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Page size used when walking custom-field listings.
    pub page_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            subdomain: String::new(),
            base_url: None,
            user_agent: "amocrm-rs/v4".to_string(),
            timeout_secs: 30,
            page_limit: MAX_PAGE_LIMIT,
        }
    }
}

impl ClientConfig {
    pub fn for_subdomain(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            ..Self::default()
        }
    }

    /// Reads `AMOCRM_SUBDOMAIN` and `AMOCRM_BASE_URL`. At least one must be
    /// set.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// [`ClientConfig::from_env`] against an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let config = Self {
            subdomain: non_empty(SUBDOMAIN_VAR).unwrap_or_default(),
            base_url: non_empty(BASE_URL_VAR),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.subdomain.is_empty() && self.base_url.is_none() {
            return Err(ClientError::Config(format!(
                "either {SUBDOMAIN_VAR} or {BASE_URL_VAR} must be set"
            )));
        }
        if self
            .subdomain
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '-'))
        {
            return Err(ClientError::Config(format!(
                "invalid subdomain: {:?}",
                self.subdomain
            )));
        }
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(ClientError::Config(format!(
                "page_limit must be within 1..={MAX_PAGE_LIMIT}"
            )));
        }
        Ok(())
    }

    /// API root without a trailing slash.
    pub fn api_root(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.amocrm.ru/api/v4", self.subdomain),
        }
    }

    /// Absolute URL of a collection path such as `contacts/12/notes`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root(), path.trim_start_matches('/'))
    }
}
