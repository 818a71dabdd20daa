//! Client configuration.
//!
//! Credentials and tenant identifiers are resolved from explicit values first
//! and an environment map second. The resulting [`Config`] is an immutable
//! snapshot; every scalar field is guaranteed non-empty.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_CLIENT_ID: &str = "SFMC_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SFMC_CLIENT_SECRET";
pub const ENV_TENANT_SUBDOMAIN: &str = "SFMC_TENANT_SUBDOMAIN";
pub const ENV_ACCOUNT_IDS: &str = "SFMC_ACCOUNT_IDS";
pub const ENV_ACCOUNT_ID: &str = "SFMC_ACCOUNT_ID";

/// Resolved Marketing Cloud credentials for one business unit.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    client_id: String,
    client_secret: String,
    tenant_subdomain: String,
    account_id: String,
    account_name: Option<String>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolve entirely from the given environment map.
    pub fn from_env_map(env: HashMap<String, String>) -> Result<Self> {
        Self::builder().environment(env).build()
    }

    /// Resolve entirely from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn tenant_subdomain(&self) -> &str {
        &self.tenant_subdomain
    }

    /// Account identifier (MID) the token is scoped to.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn account_name(&self) -> Option<&str> {
        self.account_name.as_deref()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("tenant_subdomain", &self.tenant_subdomain)
            .field("account_id", &self.account_id)
            .field("account_name", &self.account_name)
            .finish()
    }
}

/// Builder for [`Config`]. Explicit values win over the environment map.
#[derive(Debug, Default, Clone)]
pub struct ConfigBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    tenant_subdomain: Option<String>,
    account_id: Option<String>,
    account_name: Option<String>,
    environment: HashMap<String, String>,
}

impl ConfigBuilder {
    pub fn client_id(mut self, value: impl Into<String>) -> Self {
        self.client_id = Some(value.into());
        self
    }

    pub fn client_secret(mut self, value: impl Into<String>) -> Self {
        self.client_secret = Some(value.into());
        self
    }

    pub fn tenant_subdomain(mut self, value: impl Into<String>) -> Self {
        self.tenant_subdomain = Some(value.into());
        self
    }

    /// Explicit account id. Overrides any account-name lookup.
    pub fn account_id(mut self, value: impl Into<String>) -> Self {
        self.account_id = Some(value.into());
        self
    }

    /// Logical account name looked up in `SFMC_ACCOUNT_IDS`.
    pub fn account_name(mut self, value: impl Into<String>) -> Self {
        self.account_name = Some(value.into());
        self
    }

    /// Fallback values, keyed by the `SFMC_*` variable names.
    pub fn environment(mut self, env: HashMap<String, String>) -> Self {
        self.environment = env;
        self
    }

    pub fn build(self) -> Result<Config> {
        let client_id = self.explicit_or_env(&self.client_id, ENV_CLIENT_ID);
        let client_secret = self.explicit_or_env(&self.client_secret, ENV_CLIENT_SECRET);
        let tenant_subdomain = self.explicit_or_env(&self.tenant_subdomain, ENV_TENANT_SUBDOMAIN);

        let account_ids = self.account_ids()?;
        let account_name = non_empty(&self.account_name)
            .or_else(|| account_ids.first().map(|(name, _)| name.clone()));

        let account_id = non_empty(&self.account_id)
            .or_else(|| {
                account_name.as_ref().and_then(|name| {
                    account_ids
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, id)| id.clone())
                })
            })
            .or_else(|| self.env(ENV_ACCOUNT_ID));

        let client_id = client_id.ok_or_else(|| missing(ENV_CLIENT_ID))?;
        let client_secret = client_secret.ok_or_else(|| missing(ENV_CLIENT_SECRET))?;
        let tenant_subdomain = tenant_subdomain.ok_or_else(|| missing(ENV_TENANT_SUBDOMAIN))?;
        let account_id = account_id.ok_or_else(|| {
            Error::configuration(format!(
                "Unable to resolve account_id for account_name: {}",
                account_name.as_deref().unwrap_or("<none>")
            ))
        })?;

        debug!(
            "Resolved config for tenant {} (account {})",
            tenant_subdomain, account_id
        );

        Ok(Config {
            client_id,
            client_secret,
            tenant_subdomain,
            account_id,
            account_name,
        })
    }

    fn env(&self, key: &str) -> Option<String> {
        self.environment
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    fn explicit_or_env(&self, explicit: &Option<String>, key: &str) -> Option<String> {
        non_empty(explicit).or_else(|| self.env(key))
    }

    /// Parse `SFMC_ACCOUNT_IDS`, keeping document order so "first account"
    /// is well defined.
    fn account_ids(&self) -> Result<Vec<(String, String)>> {
        let raw = match self.environment.get(ENV_ACCOUNT_IDS) {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Ok(Vec::new()),
        };

        let parsed: serde_json::Map<String, Value> = serde_json::from_str(raw)
            .map_err(|_| Error::configuration(format!("Invalid JSON in {}", ENV_ACCOUNT_IDS)))?;

        parsed
            .into_iter()
            .map(|(name, id)| match id {
                Value::String(s) => Ok((name, s)),
                Value::Number(n) => Ok((name, n.to_string())),
                _ => Err(Error::configuration(format!(
                    "Invalid account id for '{}' in {}",
                    name, ENV_ACCOUNT_IDS
                ))),
            })
            .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn missing(key: &str) -> Error {
    Error::configuration(format!("Missing {}", key))
}
