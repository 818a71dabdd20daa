//! Top-level clients.
//!
//! [`Client`] is for threaded, blocking code and [`AsyncClient`] for code
//! running on a Tokio runtime. Both expose the same operations and lazily
//! created object managers.

mod blocking;
mod dispatcher;
mod nonblocking;

pub use blocking::{Client, ClientBuilder};
pub use dispatcher::{AsyncDispatcher, Dispatcher};
pub use nonblocking::{AsyncClient, AsyncClientBuilder};
