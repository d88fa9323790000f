//! Error types for dataplane-http.
//!
//! These are faults: conditions under which a call could not be built or
//! could not complete. Classified HTTP outcomes (not found, not authorized,
//! error status) are data and live in [`crate::StreamResult`].

use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing required address property `{0}`")]
    MissingProperty(&'static str),

    #[error("invalid value `{value}` for address property `{key}`")]
    InvalidProperty { key: String, value: String },

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("secret `{0}` could not be resolved")]
    SecretNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] Box<figment::Error>),

    #[error("{0}")]
    Validation(String),

    #[error("received empty response body transferring HTTP data for request {request_id}: {status}")]
    EmptyBody { request_id: String, status: u16 },

    #[error("HTTP call failed: {0}")]
    Call(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn call<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Call(Box::new(e))
    }

    pub(crate) fn invalid_property(key: impl Into<String>, value: impl Into<String>) -> Self {
        Error::InvalidProperty {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Whether this error stems from request or runtime configuration
    /// rather than from an attempted transfer.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::MissingProperty(_)
                | Error::InvalidProperty { .. }
                | Error::InvalidUrl { .. }
                | Error::SecretNotFound(_)
                | Error::Config(_)
                | Error::ConfigLoad(_)
                | Error::Validation(_)
        )
    }
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Self {
        Error::ConfigLoad(Box::new(e))
    }
}
