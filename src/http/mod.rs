//! HTTP layer for the auth, REST and SOAP endpoints.
//!
//! Request construction and response decoding live in `dialect` and are
//! shared; [`HttpClient`] and [`AsyncHttpClient`] only differ in the
//! transport they drive.

mod client;
mod dialect;
#[cfg(test)]
pub(crate) mod mock;
mod request;
mod settings;
mod transport;

pub use client::{AsyncHttpClient, HttpClient};
pub use request::{HttpRequest, HttpResponse, IntoMethod, Method, RequestBody};
pub use settings::{
    Endpoints, HttpSettings, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_DOMAIN, DEFAULT_SUCCESS_CODES,
    DEFAULT_TIMEOUT_SECS,
};
pub use transport::{AsyncTransport, BlockingReqwestTransport, ReqwestTransport, Transport};
