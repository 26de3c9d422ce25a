//! Error types for client construction and request dispatch.

use reqwest::StatusCode;
use thiserror::Error;

/// Primary error type for client operations.
///
/// The auth header mutators never fail; only construction and actual request
/// dispatch produce errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured base URL could not be parsed.
    #[error("invalid base URL '{value}'")]
    InvalidBaseUrl {
        /// Offending URL string, as provided by the environment or caller.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The configured client version is not a valid header value.
    #[error("client version '{value}' contains invalid header characters")]
    InvalidClientVersion {
        /// Offending version string.
        value: String,
    },
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    Build {
        /// Builder failure reported by `reqwest`.
        #[source]
        source: reqwest::Error,
    },
    /// A request path could not be joined onto the base URL.
    #[error("invalid request path '{path}'")]
    InvalidRequestPath {
        /// Relative path that failed to join.
        path: String,
        /// Underlying parse failure.
        #[source]
        source: url::ParseError,
    },
    /// The request could not be sent or the transport failed mid-flight.
    #[error("request to {path} failed")]
    Request {
        /// Relative path of the failed request.
        path: String,
        /// Transport failure reported by `reqwest`.
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-2xx status.
    #[error("{message} (status {status})")]
    Api {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Message extracted from the error envelope, or the raw body text.
        message: String,
    },
    /// A successful response body failed to deserialize.
    #[error("failed to decode response from {path}")]
    Decode {
        /// Relative path of the request whose body failed to decode.
        path: String,
        /// Deserialization failure reported by `reqwest`.
        #[source]
        source: reqwest::Error,
    },
}

/// Convenience alias for functions returning a [`ClientError`].
pub type ClientResult<T> = Result<T, ClientError>;
