//! Token exchange payloads and the cached token state.

use std::fmt;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{Error, Result};

/// Seconds shaved off `expires_in` so a token is refreshed before the
/// server stops accepting it.
pub const EXPIRY_BUFFER_SECS: i64 = 60;

/// Client-credentials token request body
pub(crate) struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub account_id: &'a str,
}

impl<'a> TokenRequest<'a> {
    pub fn client_credentials(config: &'a Config) -> Self {
        Self {
            grant_type: "client_credentials",
            client_id: config.client_id(),
            client_secret: config.client_secret(),
            account_id: config.account_id(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "grant_type": self.grant_type,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "account_id": self.account_id,
        })
    }
}

/// Token response; both fields are optional so a malformed success body is
/// reported as an authentication error rather than a decode error.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Authentication {
            message: format!("Malformed auth response: {}", e),
            status: None,
            source: Some(Box::new(e)),
        })
    }

    /// Turn the response into a cached token, stamping the expiry relative
    /// to `now`.
    pub fn into_cached(self, now: DateTime<Utc>) -> Result<CachedToken> {
        match (self.access_token, self.expires_in) {
            (Some(access_token), Some(expires_in)) if !access_token.is_empty() => {
                let expires_at = expires_in
                    .checked_sub(EXPIRY_BUFFER_SECS)
                    .and_then(Duration::try_seconds)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        Error::authentication("Invalid expires_in in auth response")
                    })?;
                Ok(CachedToken {
                    access_token,
                    expires_at,
                })
            }
            _ => Err(Error::authentication(
                "Access token or expiration missing in auth response.",
            )),
        }
    }
}

/// A bearer token and the instant after which it must not be used.
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    /// Already includes the safety buffer.
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token and expiry stored as one value, so readers see both or neither.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    state: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn current(&self) -> Option<CachedToken> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The cached token if it is still usable at `now`.
    pub fn valid_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.current()
            .filter(|token| !token.is_expired(now))
            .map(|token| token.access_token)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_at(now).is_none()
    }

    pub fn store(&self, token: CachedToken) {
        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
    }
}
