use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::auth::{AsyncAuthManager, AuthManager};
use crate::config::Config;
use crate::error::Result;
use crate::http::{AsyncHttpClient, HttpClient, IntoMethod};
use crate::soap::SoapDocument;

/// Shared core of a [`Client`](super::Client): configuration, the token
/// lifecycle and the HTTP client wired to it. Managers hold it behind an
/// `Arc`.
pub struct Dispatcher {
    config: Arc<Config>,
    auth: Arc<AuthManager>,
    http: HttpClient,
}

impl Dispatcher {
    /// Wire `http` to `auth` as its token source. Without an explicit auth
    /// manager one is created over a clone of `http`.
    pub(crate) fn new(config: Arc<Config>, http: HttpClient, auth: Option<Arc<AuthManager>>) -> Self {
        let auth =
            auth.unwrap_or_else(|| Arc::new(AuthManager::new(config.clone(), http.clone())));
        let http = http.with_token_source(auth.clone());
        Self { config, auth, http }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Validate the method, make sure a token is in hand, then call the REST
    /// API. Unsupported methods fail before any network activity.
    pub fn rest(&self, endpoint: &str, method: impl IntoMethod, data: Option<&Value>) -> Result<Value> {
        let method = method.into_method()?;
        self.auth.ensure_authenticated()?;
        self.http.rest_request(method, endpoint, data)
    }

    pub fn soap(&self, action: &str, body: &str) -> Result<SoapDocument> {
        self.auth.ensure_authenticated()?;
        debug!("Dispatching SOAP action {}", action);
        self.http.soap_request(action, body)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("auth", &self.auth)
            .field("http", &self.http)
            .finish()
    }
}

/// Async counterpart of [`Dispatcher`].
pub struct AsyncDispatcher {
    config: Arc<Config>,
    auth: Arc<AsyncAuthManager>,
    http: AsyncHttpClient,
}

impl AsyncDispatcher {
    pub(crate) fn new(
        config: Arc<Config>,
        http: AsyncHttpClient,
        auth: Option<Arc<AsyncAuthManager>>,
    ) -> Self {
        let auth =
            auth.unwrap_or_else(|| Arc::new(AsyncAuthManager::new(config.clone(), http.clone())));
        let http = http.with_token_source(auth.clone());
        Self { config, auth, http }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &AsyncAuthManager {
        &self.auth
    }

    pub fn http(&self) -> &AsyncHttpClient {
        &self.http
    }

    pub async fn rest(
        &self,
        endpoint: &str,
        method: impl IntoMethod,
        data: Option<&Value>,
    ) -> Result<Value> {
        let method = method.into_method()?;
        self.auth.ensure_authenticated().await?;
        self.http.rest_request(method, endpoint, data).await
    }

    pub async fn soap(&self, action: &str, body: &str) -> Result<SoapDocument> {
        self.auth.ensure_authenticated().await?;
        debug!("Dispatching SOAP action {}", action);
        self.http.soap_request(action, body).await
    }
}

impl std::fmt::Debug for AsyncDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncDispatcher")
            .field("auth", &self.auth)
            .field("http", &self.http)
            .finish()
    }
}
