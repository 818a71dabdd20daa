use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::dialect;
use super::request::{HttpRequest, HttpResponse, IntoMethod, Method};
use super::settings::{Endpoints, HttpSettings};
use super::transport::{AsyncTransport, BlockingReqwestTransport, ReqwestTransport, Transport};
use crate::auth::{ensure_blocking_context, AsyncTokenSource, TokenSource};
use crate::config::Config;
use crate::error::{Error, RequestKind, Result};
use crate::soap::SoapDocument;

fn missing_token_source() -> Error {
    Error::usage("HTTP client has no token source; build it through a Client")
}

/// Blocking HTTP client for the auth, REST and SOAP endpoints.
///
/// Cheap to clone; clones share the transport and its connection pool.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    settings: Arc<HttpSettings>,
    endpoints: Arc<Endpoints>,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl HttpClient {
    /// Client over the default `reqwest` blocking transport. Fails with a
    /// usage error inside a Tokio runtime.
    pub fn new(config: &Config, settings: HttpSettings) -> Result<Self> {
        let transport = BlockingReqwestTransport::new(&settings)?;
        Self::with_transport(config, settings, Arc::new(transport))
    }

    pub fn with_transport(
        config: &Config,
        settings: HttpSettings,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let endpoints = Endpoints::new(config.tenant_subdomain(), &settings.domain)?;
        Ok(Self {
            transport,
            settings: Arc::new(settings),
            endpoints: Arc::new(endpoints),
            tokens: None,
        })
    }

    /// Attach the source REST and SOAP calls draw their bearer token from.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn send(&self, kind: RequestKind, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.transport.send(request).map_err(|e| {
            Error::request_source(kind, None, format!("Failed to send request to {}: {}", url, e), e)
        })
    }

    fn token(&self) -> Result<String> {
        self.tokens.as_ref().ok_or_else(missing_token_source)?.token()
    }

    pub fn auth_request(&self, method: Method, url: Url, payload: &Value) -> Result<Value> {
        let request = dialect::auth_request(&self.settings, method, url, payload);
        let response = self.send(RequestKind::Auth, request)?;
        dialect::decode_auth(&self.settings, response)
    }

    pub fn rest_request(
        &self,
        method: impl IntoMethod,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<Value> {
        let method = method.into_method()?;
        ensure_blocking_context("rest_request")?;
        let token = self.token()?;
        let request =
            dialect::rest_request(&self.settings, &self.endpoints, method, path, &token, payload)?;
        debug!("REST {} {}", method, request.url);
        let response = self.send(RequestKind::Rest, request)?;
        dialect::decode_rest(&self.settings, response)
    }

    pub fn soap_request(&self, action: &str, body: &str) -> Result<SoapDocument> {
        ensure_blocking_context("soap_request")?;
        let token = self.token()?;
        let request = dialect::soap_request(&self.settings, &self.endpoints, action, &token, body);
        debug!("SOAP {}", action);
        let response = self.send(RequestKind::Soap, request)?;
        dialect::decode_soap(&self.settings, response)
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("endpoints", &self.endpoints)
            .field("settings", &self.settings)
            .field("has_token_source", &self.tokens.is_some())
            .finish()
    }
}

/// Async counterpart of [`HttpClient`]; same three operations, same
/// semantics.
#[derive(Clone)]
pub struct AsyncHttpClient {
    transport: Arc<dyn AsyncTransport>,
    settings: Arc<HttpSettings>,
    endpoints: Arc<Endpoints>,
    tokens: Option<Arc<dyn AsyncTokenSource>>,
}

impl AsyncHttpClient {
    /// Client over the default async `reqwest` transport.
    pub fn new(config: &Config, settings: HttpSettings) -> Result<Self> {
        let transport = ReqwestTransport::new(&settings)?;
        Self::with_transport(config, settings, Arc::new(transport))
    }

    pub fn with_transport(
        config: &Config,
        settings: HttpSettings,
        transport: Arc<dyn AsyncTransport>,
    ) -> Result<Self> {
        let endpoints = Endpoints::new(config.tenant_subdomain(), &settings.domain)?;
        Ok(Self {
            transport,
            settings: Arc::new(settings),
            endpoints: Arc::new(endpoints),
            tokens: None,
        })
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn AsyncTokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn send(&self, kind: RequestKind, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.transport.send(request).await.map_err(|e| {
            Error::request_source(kind, None, format!("Failed to send request to {}: {}", url, e), e)
        })
    }

    async fn token(&self) -> Result<String> {
        self.tokens
            .as_ref()
            .ok_or_else(missing_token_source)?
            .token()
            .await
    }

    pub async fn auth_request(&self, method: Method, url: Url, payload: &Value) -> Result<Value> {
        let request = dialect::auth_request(&self.settings, method, url, payload);
        let response = self.send(RequestKind::Auth, request).await?;
        dialect::decode_auth(&self.settings, response)
    }

    pub async fn rest_request(
        &self,
        method: impl IntoMethod,
        path: &str,
        payload: Option<&Value>,
    ) -> Result<Value> {
        let method = method.into_method()?;
        let token = self.token().await?;
        let request =
            dialect::rest_request(&self.settings, &self.endpoints, method, path, &token, payload)?;
        debug!("REST {} {}", method, request.url);
        let response = self.send(RequestKind::Rest, request).await?;
        dialect::decode_rest(&self.settings, response)
    }

    pub async fn soap_request(&self, action: &str, body: &str) -> Result<SoapDocument> {
        let token = self.token().await?;
        let request = dialect::soap_request(&self.settings, &self.endpoints, action, &token, body);
        debug!("SOAP {}", action);
        let response = self.send(RequestKind::Soap, request).await?;
        dialect::decode_soap(&self.settings, response)
    }
}

impl fmt::Debug for AsyncHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncHttpClient")
            .field("endpoints", &self.endpoints)
            .field("settings", &self.settings)
            .field("has_token_source", &self.tokens.is_some())
            .finish()
    }
}
