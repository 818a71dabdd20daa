use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use super::token::{TokenCache, TokenRequest, TokenResponse};
use super::{ensure_blocking_context, CachedToken, TokenSource};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{HttpClient, Method};

/// Token lifecycle for blocking callers.
///
/// All threads sharing one manager share one token. The refresh lock is
/// only taken when the cached token is missing or expired.
pub struct AuthManager {
    config: Arc<Config>,
    http: HttpClient,
    cache: TokenCache,
    refresh_lock: Mutex<()>,
    clock: Arc<dyn Clock>,
}

impl AuthManager {
    /// `http` is only used for the token exchange and needs no token source.
    pub fn new(config: Arc<Config>, http: HttpClient) -> Self {
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

    /// True when no token is cached or `now >= expiry`.
    pub fn is_token_expired(&self) -> bool {
        self.cache.is_expired(self.clock.now())
    }

    /// Snapshot of the cached token, if any.
    pub fn cached_token(&self) -> Option<CachedToken> {
        self.cache.current()
    }

    pub fn ensure_authenticated(&self) -> Result<()> {
        ensure_blocking_context("ensure_authenticated")?;
        if self.is_token_expired() {
            self.authenticate()?;
        }
        Ok(())
    }

    /// A usable bearer token, authenticating first if needed.
    pub fn get_token(&self) -> Result<String> {
        ensure_blocking_context("get_token")?;
        match self.cache.valid_at(self.clock.now()) {
            Some(token) => Ok(token),
            None => self.authenticate(),
        }
    }

    /// Exchange client credentials for a token, unless another thread did so
    /// while this one waited for the lock.
    pub fn authenticate(&self) -> Result<String> {
        ensure_blocking_context("authenticate")?;
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(token) = self.cache.valid_at(self.clock.now()) {
            debug!("Token refreshed by another caller; skipping exchange");
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
            .map_err(Error::into_authentication)?;

        let token = TokenResponse::from_value(response)?.into_cached(self.clock.now())?;
        let access_token = token.access_token.clone();
        debug!("Token valid until {}", token.expires_at);
        self.cache.store(token);

        info!("Successfully authenticated");
        Ok(access_token)
    }
}

impl TokenSource for AuthManager {
    fn token(&self) -> Result<String> {
        self.get_token()
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("config", &self.config)
            .field("token", &self.cache.current())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ManualClock;
    use crate::error::ErrorKind;
    use crate::http::mock::{MockTransport, Route};
    use crate::http::HttpSettings;
    use chrono::Duration;
    use std::sync::Barrier;
    use std::thread;

    fn config() -> Arc<Config> {
        Arc::new(
            Config::builder()
                .client_id("abc")
                .client_secret("xyz")
                .tenant_subdomain("test")
                .account_id("acct")
                .build()
                .unwrap(),
        )
    }

    fn manager(mock: &Arc<MockTransport>, clock: &Arc<ManualClock>) -> AuthManager {
        let config = config();
        let http = HttpClient::with_transport(&config, HttpSettings::default(), mock.clone())
            .unwrap();
        AuthManager::new(config, http).with_clock(clock.clone())
    }

    const TOKEN_BODY: &str = r#"{"access_token": "token123", "expires_in": 3600}"#;

    #[test]
    fn test_auth_success() {
        let mock = Arc::new(MockTransport::new().auth(200, TOKEN_BODY));
        let clock = Arc::new(ManualClock::new());
        let auth = manager(&mock, &clock);
        let t0 = clock.now();

        assert!(auth.is_token_expired());
        assert_eq!(auth.authenticate().unwrap(), "token123");
        assert!(!auth.is_token_expired());

        let cached = auth.cached_token().unwrap();
        assert_eq!(cached.access_token, "token123");
        assert_eq!(cached.expires_at, t0 + Duration::seconds(3540));

        let sent = mock.requests();
        assert_eq!(
            sent[0].url.as_str(),
            "https://test.auth.marketingcloudapis.com/v2/token"
        );
    }

    #[test]
    fn test_auth_failure() {
        let mock = Arc::new(MockTransport::new().auth(401, "Unauthorized"));
        let clock = Arc::new(ManualClock::new());
        let auth = manager(&mock, &clock);

        let err = auth.authenticate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("401 - Unauthorized"));
        assert!(auth.is_token_expired());
    }

    #[test]
    fn test_malformed_success_body() {
        let mock = Arc::new(MockTransport::new().auth(200, r#"{"access_token": "t"}"#));
        let clock = Arc::new(ManualClock::new());
        let auth = manager(&mock, &clock);

        let err = auth.authenticate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(auth.cached_token().is_none());
    }

    #[test]
    fn test_huge_expires_in_does_not_panic() {
        let mock = Arc::new(
            MockTransport::new().auth(200, r#"{"access_token": "T", "expires_in": 9223372036854775807}"#),
        );
        let clock = Arc::new(ManualClock::new());
        let auth = manager(&mock, &clock);

        let err = auth.get_token().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(auth.cached_token().is_none());
    }

    #[test]
    fn test_unreachable_auth_endpoint() {
        let mock = Arc::new(MockTransport::new());
        let clock = Arc::new(ManualClock::new());
        let err = manager(&mock, &clock).ensure_authenticated().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Authentication);
    }

    #[test]
    fn test_token_reused_until_expiry() {
        let mock = Arc::new(MockTransport::new().auth(200, TOKEN_BODY));
        let clock = Arc::new(ManualClock::new());
        let auth = manager(&mock, &clock);

        auth.ensure_authenticated().unwrap();
        auth.ensure_authenticated().unwrap();
        assert_eq!(auth.get_token().unwrap(), "token123");
        assert_eq!(mock.calls_to(Route::Auth), 1);

        clock.advance(Duration::seconds(3539));
        assert!(!auth.is_token_expired());
        clock.advance(Duration::seconds(1));
        assert!(auth.is_token_expired());

        auth.get_token().unwrap();
        assert_eq!(mock.calls_to(Route::Auth), 2);
    }

    #[test]
    fn test_concurrent_refresh_collapses_to_one_exchange() {
        let mock = Arc::new(
            MockTransport::new()
                .auth(200, TOKEN_BODY)
                .with_delay(std::time::Duration::from_millis(50)),
        );
        let clock = Arc::new(ManualClock::new());
        let auth = Arc::new(manager(&mock, &clock));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let auth = auth.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    auth.ensure_authenticated().unwrap();
                    auth.get_token().unwrap()
                })
            })
            .collect();

        let tokens: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(tokens.iter().all(|t| t == "token123"));
        assert_eq!(mock.calls_to(Route::Auth), 1);
    }

    #[test]
    fn test_back_to_back_authenticate_in_flight() {
        let mock = Arc::new(
            MockTransport::new()
                .auth(200, TOKEN_BODY)
                .with_delay(std::time::Duration::from_millis(100)),
        );
        let clock = Arc::new(ManualClock::new());
        let auth = Arc::new(manager(&mock, &clock));

        let first = {
            let auth = auth.clone();
            thread::spawn(move || auth.authenticate().unwrap())
        };
        thread::sleep(std::time::Duration::from_millis(20));
        let second = auth.authenticate().unwrap();

        assert_eq!(first.join().unwrap(), second);
        assert_eq!(mock.calls_to(Route::Auth), 1);
    }

    #[tokio::test]
    async fn test_blocking_manager_inside_runtime_is_usage_error() {
        let mock = Arc::new(MockTransport::new().auth(200, TOKEN_BODY));
        let clock = Arc::new(ManualClock::new());
        let auth = manager(&mock, &clock);

        for err in [
            auth.get_token().unwrap_err(),
            auth.ensure_authenticated().unwrap_err(),
        ] {
            assert_eq!(err.kind(), ErrorKind::Usage);
        }
        assert_eq!(mock.call_count(), 0);
    }
}
