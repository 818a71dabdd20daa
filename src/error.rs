//! Error taxonomy for the client.
//!
//! Every failure surfaces as one of four kinds: configuration, authentication,
//! request or usage. Each carries structured fields so callers can branch on
//! the kind and the HTTP status without parsing messages.

use std::fmt;

/// Boxed error used to carry an underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which of the three request shapes failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Auth,
    Rest,
    Soap,
}

impl RequestKind {
    fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Auth => "Auth",
            RequestKind::Rest => "REST",
            RequestKind::Soap => "SOAP",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error classification, for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Request,
    Usage,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required setting is missing or unparsable. Raised before any
    /// network activity.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The token exchange failed or returned a malformed success body.
    #[error("authentication failed: {message}")]
    Authentication {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    /// A REST, SOAP or auth call failed on the wire, returned a status
    /// outside the success set, or its body could not be decoded.
    #[error("{kind} request failed: {message}")]
    Request {
        kind: RequestKind,
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The caller used the API incorrectly (wrong execution model,
    /// unsupported HTTP method).
    #[error("usage error: {0}")]
    Usage(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) => ErrorKind::Configuration,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::Request { .. } => ErrorKind::Request,
            Error::Usage(_) => ErrorKind::Usage,
        }
    }

    /// HTTP status code attached to the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Authentication { status, .. } | Error::Request { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    pub(crate) fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Non-success HTTP status. The message embeds the status code and the
    /// body text verbatim.
    pub(crate) fn status_failure(kind: RequestKind, status: u16, body: &str) -> Self {
        Error::Request {
            kind,
            status: Some(status),
            message: format!("{} - {}", status, body),
            source: None,
        }
    }

    pub(crate) fn request_source(
        kind: RequestKind,
        status: Option<u16>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::Request {
            kind,
            status,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Re-tag a failure of the token exchange as an authentication error,
    /// keeping its status and cause.
    pub(crate) fn into_authentication(self) -> Self {
        match self {
            Error::Request {
                status,
                message,
                source,
                ..
            } => Error::Authentication {
                message,
                status,
                source,
            },
            other => other,
        }
    }
}
