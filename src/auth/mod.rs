//! OAuth client-credentials authentication.
//!
//! [`AuthManager`] serves blocking callers and [`AsyncAuthManager`] serves
//! async callers. Both cache one bearer token, refresh it when it expires and
//! collapse concurrent refreshes into a single exchange.

mod async_manager;
mod clock;
mod manager;
mod token;

pub use async_manager::AsyncAuthManager;
pub use clock::{Clock, SystemClock};
pub use manager::AuthManager;
pub use token::{CachedToken, EXPIRY_BUFFER_SECS};

#[cfg(test)]
pub(crate) use clock::ManualClock;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Supplies a valid bearer token to blocking request paths.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Result<String>;
}

/// Supplies a valid bearer token to async request paths.
#[async_trait]
pub trait AsyncTokenSource: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Blocking entry points refuse to run on a Tokio runtime thread, where
/// they would stall the scheduler (or deadlock on the refresh lock).
pub(crate) fn ensure_blocking_context(operation: &str) -> Result<()> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::usage(format!(
            "'{}' is a blocking call and cannot run inside an async runtime; use the async client instead",
            operation
        )));
    }
    Ok(())
}
