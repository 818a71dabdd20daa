use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::token::{TokenCache, TokenRequest, TokenResponse};
use super::{AsyncTokenSource, CachedToken};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{AsyncHttpClient, Method};

/// Token lifecycle for async callers. Tasks waiting on a refresh yield
/// instead of blocking their worker thread.
pub struct AsyncAuthManager {
    config: Arc<Config>,
    http: AsyncHttpClient,
    cache: TokenCache,
    refresh_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl AsyncAuthManager {
    pub fn new(config: Arc<Config>, http: AsyncHttpClient) -> Self {
        Self {
            config,
            http,
            cache: TokenCache::default(),
            refresh_lock: Mutex::new(()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn is_token_expired(&self) -> bool {
        self.cache.is_expired(self.clock.now())
    }

    pub fn cached_token(&self) -> Option<CachedToken> {
        self.cache.current()
    }

    pub async fn ensure_authenticated(&self) -> Result<()> {
        if self.is_token_expired() {
            self.authenticate().await?;
        }
        Ok(())
    }

    pub async fn get_token(&self) -> Result<String> {
        match self.cache.valid_at(self.clock.now()) {
            Some(token) => Ok(token),
            None => self.authenticate().await,
        }
    }

    /// Exchange client credentials for a token. Callers queued behind an
    /// in-flight exchange reuse its result.
    pub async fn authenticate(&self) -> Result<String> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(token) = self.cache.valid_at(self.clock.now()) {
            debug!("Token refreshed by another task; skipping exchange");
            return Ok(token);
        }

        let url = self.http.endpoints().token_url()?;
        info!(
            "Authenticating to {} for account {}",
            url,
            self.config.account_id()
        );

        let payload = TokenRequest::client_credentials(&self.config).to_json();
        let response = self
            .http
            .auth_request(Method::Post, url, &payload)
            .await
            .map_err(Error::into_authentication)?;

        let token = TokenResponse::from_value(response)?.into_cached(self.clock.now())?;
        let access_token = token.access_token.clone();
        debug!("Token valid until {}", token.expires_at);
        self.cache.store(token);

        info!("Successfully authenticated");
        Ok(access_token)
    }
}

#[async_trait]
impl AsyncTokenSource for AsyncAuthManager {
    async fn token(&self) -> Result<String> {
        self.get_token().await
    }
}

impl std::fmt::Debug for AsyncAuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncAuthManager")
            .field("config", &self.config)
            .field("token", &self.cache.current())
            .finish()
    }
}
