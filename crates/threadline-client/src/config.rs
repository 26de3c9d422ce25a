//! Construction-time settings for the API client.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Environment variable overriding the default base URL.
pub const ENV_BASE_URL: &str = "API_BASE_URL";
/// Environment variable overriding the client version header value.
pub const ENV_CLIENT_VERSION: &str = "GITHUB_SHA";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CLIENT_VERSION: &str = "dev";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings captured once when the client is constructed.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root address prefixed to all relative request paths.
    pub base_url: Url,
    /// Build identifier sent as the `x-client-version` default header.
    pub client_version: String,
    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Build a config for the given base URL with the default client version
    /// and timeout.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read settings from the process environment.
    ///
    /// `API_BASE_URL` overrides the default base URL
    /// (`http://localhost:8000`); `GITHUB_SHA` overrides the default client
    /// version (`dev`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when the override is not a
    /// parseable URL.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through a caller-supplied variable lookup.
    ///
    /// Behaves exactly like [`Self::from_env`]; the indirection exists so
    /// construction can be exercised without mutating process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] when the base URL override is
    /// not a parseable URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let raw_url = lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = raw_url
            .parse()
            .map_err(|source| ClientError::InvalidBaseUrl {
                value: raw_url,
                source,
            })?;
        let client_version =
            lookup(ENV_CLIENT_VERSION).unwrap_or_else(|| DEFAULT_CLIENT_VERSION.to_string());

        Ok(Self {
            base_url,
            client_version,
            timeout: DEFAULT_TIMEOUT,
        })
    }
}
