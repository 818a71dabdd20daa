use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Public API domain; tenants are subdomains of `auth.`, `rest.` and `soap.` hosts.
pub const DEFAULT_DOMAIN: &str = "marketingcloudapis.com";

/// Statuses treated as success unless overridden.
pub const DEFAULT_SUCCESS_CODES: &[u16] = &[200, 201, 202];

const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Transport-level knobs shared by the blocking and async clients.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Any status outside this set is a hard failure.
    pub success_codes: Vec<u16>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    pub domain: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            success_codes: DEFAULT_SUCCESS_CODES.to_vec(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: format!("sfmc-client/{}", DEFAULT_VERSION),
            domain: DEFAULT_DOMAIN.to_string(),
        }
    }
}

impl HttpSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_success_codes(mut self, codes: impl Into<Vec<u16>>) -> Self {
        self.success_codes = codes.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn is_success(&self, status: u16) -> bool {
        self.success_codes.contains(&status)
    }
}

/// Base URLs of the three tenant endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: Url,
    pub rest: Url,
    pub soap: Url,
}

impl Endpoints {
    pub fn new(tenant_subdomain: &str, domain: &str) -> Result<Self> {
        let build = |service: &str| -> Result<Url> {
            let raw = format!("https://{}.{}.{}/", tenant_subdomain, service, domain);
            Url::parse(&raw).map_err(|e| {
                Error::configuration(format!("Invalid {} endpoint '{}': {}", service, raw, e))
            })
        };

        Ok(Self {
            auth: build("auth")?,
            rest: build("rest")?,
            soap: build("soap")?,
        })
    }

    /// OAuth client-credentials token endpoint.
    pub fn token_url(&self) -> Result<Url> {
        self.auth
            .join("v2/token")
            .map_err(|e| Error::configuration(format!("Invalid token URL: {}", e)))
    }

    /// Resolve a REST path (with optional query string) against the REST host.
    ///
    /// The result must stay on the tenant's REST host; absolute URLs and
    /// other schemes are usage errors.
    pub fn rest_url(&self, path: &str) -> Result<Url> {
        let url = self.rest.join(path.trim_start_matches('/')).map_err(|e| {
            Error::usage(format!("Invalid REST path '{}': {}", path, e))
        })?;
        if url.origin() != self.rest.origin() {
            return Err(Error::usage(format!(
                "REST path '{}' resolves outside {}",
                path, self.rest
            )));
        }
        Ok(url)
    }
}
