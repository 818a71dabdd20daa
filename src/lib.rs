//! Salesforce Marketing Cloud API client.
//!
//! Authenticates with the OAuth client-credentials grant, keeps one bearer
//! token per client (refreshed a minute before it expires) and issues REST
//! and SOAP calls through either a blocking [`Client`] or an [`AsyncClient`].
//!
//! ```no_run
//! use sfmc_client::{Client, Config};
//!
//! # fn main() -> sfmc_client::Result<()> {
//! let config = Config::builder()
//!     .client_id("id")
//!     .client_secret("secret")
//!     .tenant_subdomain("mc123")
//!     .account_id("5100000")
//!     .build()?;
//! let client = Client::new(config)?;
//! let de = client.data_extensions().get_by_key("orders")?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod managers;
pub mod soap;

pub use auth::{AsyncAuthManager, AuthManager};
pub use client::{AsyncClient, Client};
pub use config::Config;
pub use error::{Error, ErrorKind, RequestKind, Result};
pub use http::{HttpSettings, Method};
