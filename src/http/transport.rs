//! Network capability behind the HTTP clients.
//!
//! A transport only moves bytes: it sends an [`HttpRequest`] and returns the
//! status and body text. Status interpretation lives in the dialect.

use async_trait::async_trait;
use tracing::debug;

use super::request::{HttpRequest, HttpResponse, Method, RequestBody};
use super::settings::HttpSettings;
use crate::auth::ensure_blocking_context;
use crate::error::{BoxError, Error, Result};

/// Thread-blocking transport.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// Transport for the cooperative (async) execution model.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Blocking transport over a pooled `reqwest::blocking::Client`.
///
/// Must be built and used outside any Tokio runtime context.
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
}

impl BlockingReqwestTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        // The blocking reqwest client owns a runtime and panics if dropped
        // inside another one.
        ensure_blocking_context("BlockingReqwestTransport::new")?;
        let client = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Transport for BlockingReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Xml(xml)) => builder.body(xml),
            None => builder,
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("Response status: {}", status);

        Ok(HttpResponse { status, body })
    }
}

/// Async transport over a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client (custom TLS, proxies, shared pool).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(reqwest_method(request.method), request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        builder = match request.body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Xml(xml)) => builder.body(xml),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Response status: {}", status);

        Ok(HttpResponse { status, body })
    }
}
