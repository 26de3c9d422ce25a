//! Shared API client with mutable default auth headers and typed calls.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Url};
use threadline_api_models::{
    ApiErrorResponse, MessageThread, ThreadIndexQuery, ThreadUpdateRequest, ThreadsResponse,
};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const HEADER_API_KEY: &str = "x-api-key";
const HEADER_CLIENT_VERSION: &str = "x-client-version";

const THREADS_PATH: &str = "/v1/message-threads";

/// Default auth headers attached to every request until changed again.
#[derive(Debug, Default)]
struct AuthHeaders {
    authorization: Option<String>,
    api_key: Option<String>,
}

/// HTTP client preconfigured with a base URL and client-version header.
///
/// Clones are cheap and share one set of default auth headers: a mutation
/// through any clone is visible to requests issued through every other clone
/// afterwards. A request already in flight when a mutation lands may carry
/// either value.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth: Arc<RwLock<AuthHeaders>>,
}

impl ApiClient {
    /// Build a client from the given configuration.
    ///
    /// The client version is installed as the `x-client-version` default
    /// header on the underlying HTTP client and accompanies every request.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidClientVersion`] when the configured
    /// version is not a valid header value, or [`ClientError::Build`] when
    /// the underlying HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let mut default_headers = HeaderMap::new();
        let version = HeaderValue::from_str(&config.client_version).map_err(|_| {
            ClientError::InvalidClientVersion {
                value: config.client_version.clone(),
            }
        })?;
        default_headers.insert(HEADER_CLIENT_VERSION, version);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|source| ClientError::Build { source })?;

        Ok(Self {
            client,
            base_url: config.base_url,
            auth: Arc::new(RwLock::new(AuthHeaders::default())),
        })
    }

    /// Root address prefixed to all relative request paths.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set the default `Authorization` header to `Bearer <token>`.
    ///
    /// An absent token is not special-cased: it produces the literal value
    /// `Bearer null`, matching the service's long-standing client behavior.
    /// Callers that want to drop authorization entirely must guard the call
    /// themselves.
    pub fn set_auth_header(&self, token: Option<&str>) {
        self.auth_mut().authorization = Some(format!("Bearer {}", token.unwrap_or("null")));
    }

    /// Set the default `x-api-key` header.
    ///
    /// An absent key maps to the empty string.
    pub fn set_api_key(&self, api_key: Option<&str>) {
        self.auth_mut().api_key = Some(api_key.unwrap_or_default().to_string());
    }

    /// Current default `Authorization` header value, if one has been set.
    #[must_use]
    pub fn authorization(&self) -> Option<String> {
        self.auth_ref().authorization.clone()
    }

    /// Current default `x-api-key` header value, if one has been set.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.auth_ref().api_key.clone()
    }

    /// Fetch a page of message threads matching the given query.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Request`] on transport failure,
    /// [`ClientError::Api`] on a non-2xx response, and
    /// [`ClientError::Decode`] when the payload cannot be deserialized.
    pub async fn list_threads(&self, query: &ThreadIndexQuery) -> ClientResult<Vec<MessageThread>> {
        let mut url = self.endpoint(THREADS_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.to_pairs() {
                pairs.append_pair(key, &value);
            }
        }

        tracing::debug!(owner = %query.owner, "fetching message threads");

        let response = self
            .with_auth(self.client.get(url))
            .send()
            .await
            .map_err(|source| ClientError::Request {
                path: THREADS_PATH.to_string(),
                source,
            })?;

        if response.status().is_success() {
            let body = response.json::<ThreadsResponse>().await.map_err(|source| {
                ClientError::Decode {
                    path: THREADS_PATH.to_string(),
                    source,
                }
            })?;
            Ok(body.data)
        } else {
            Err(classify_response(response).await)
        }
    }

    /// Archive or unarchive the thread with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Request`] on transport failure and
    /// [`ClientError::Api`] on a non-2xx response.
    pub async fn set_thread_archived(&self, id: Uuid, is_archived: bool) -> ClientResult<()> {
        let path = format!("{THREADS_PATH}/{id}");
        let url = self.endpoint(&path)?;

        tracing::debug!(thread_id = %id, is_archived, "updating thread archive state");

        let response = self
            .with_auth(self.client.put(url))
            .json(&ThreadUpdateRequest { is_archived })
            .send()
            .await
            .map_err(|source| ClientError::Request { path, source })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(classify_response(response).await)
        }
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| ClientError::InvalidRequestPath {
                path: path.to_string(),
                source,
            })
    }

    /// Attach the current default auth headers to an outgoing request.
    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let auth = self.auth_ref();
        let request = match &auth.authorization {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        };
        match &auth.api_key {
            Some(value) => request.header(HEADER_API_KEY, value),
            None => request,
        }
    }

    fn auth_ref(&self) -> RwLockReadGuard<'_, AuthHeaders> {
        self.auth.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn auth_mut(&self) -> RwLockWriteGuard<'_, AuthHeaders> {
        self.auth.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Map a non-2xx response to a [`ClientError::Api`].
///
/// Prefers the message from the service's error envelope, falls back to the
/// raw body text, then to a generic status line for empty bodies.
async fn classify_response(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let message = serde_json::from_slice::<ApiErrorResponse>(&bytes).map_or_else(
        |_| String::from_utf8_lossy(&bytes).trim().to_string(),
        |payload| payload.message,
    );
    let message = if message.is_empty() {
        format!("request failed with status {status}")
    } else {
        message
    };

    tracing::debug!(%status, message, "request rejected by service");
    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::MockServer;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ApiClient {
        let config = ClientConfig::new(server.base_url().parse().expect("valid URL"));
        ApiClient::new(config).expect("client builds")
    }

    fn empty_page() -> serde_json::Value {
        json!({ "data": [] })
    }

    #[tokio::test]
    async fn set_auth_header_applies_bearer_token_to_requests() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .header("authorization", "Bearer abc");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        client.set_auth_header(Some("abc"));
        assert_eq!(client.authorization().as_deref(), Some("Bearer abc"));

        client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn absent_token_sends_literal_bearer_null() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .header("authorization", "Bearer null");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        client.set_auth_header(None);
        assert_eq!(client.authorization().as_deref(), Some("Bearer null"));

        client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn absent_api_key_sends_empty_value() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .header("x-api-key", "");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        client.set_api_key(None);
        assert_eq!(client.api_key().as_deref(), Some(""));

        client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn latest_header_mutation_wins() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .header("authorization", "Bearer second")
                .header("x-api-key", "k1");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        client.set_auth_header(Some("first"));
        client.set_auth_header(Some("second"));
        client.set_api_key(Some("k1"));

        client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn clones_share_header_state() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .header("authorization", "Bearer shared");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        let clone = client.clone();
        clone.set_auth_header(Some("shared"));
        assert_eq!(client.authorization().as_deref(), Some("Bearer shared"));

        client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn client_version_header_accompanies_every_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .header(HEADER_CLIENT_VERSION, "dev");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn list_threads_appends_query_pairs() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/message-threads")
                .query_param("owner", "+18005550199")
                .query_param("is_archived", "true")
                .query_param("skip", "40")
                .query_param("limit", "10")
                .query_param("query", "invoice");
            then.status(200).json_body(empty_page());
        });

        let client = client_for(&server);
        let query = ThreadIndexQuery::for_owner("+18005550199")
            .archived(true)
            .page(40, 10)
            .search("invoice");
        client.list_threads(&query).await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn list_threads_decodes_thread_payload() -> Result<()> {
        let server = MockServer::start_async().await;
        let thread_id = Uuid::new_v4();
        let message_id = Uuid::new_v4();
        server.mock(|when, then| {
            when.method(GET).path("/v1/message-threads");
            then.status(200).json_body(json!({
                "data": [{
                    "id": thread_id,
                    "owner": "+18005550199",
                    "contact": "+18005550100",
                    "color": "indigo",
                    "created_at": "2022-06-05T11:26:09Z",
                    "updated_at": "2022-06-05T11:27:09Z",
                    "order_timestamp": "2022-06-05T11:27:09Z",
                    "last_message_id": message_id,
                    "last_message_content": "This is a sample message content",
                    "is_archived": false
                }]
            }));
        });

        let client = client_for(&server);
        let threads = client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await?;

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].id, thread_id);
        assert_eq!(threads[0].contact, "+18005550100");
        assert_eq!(threads[0].last_message_id, message_id);
        assert!(!threads[0].is_archived);
        Ok(())
    }

    #[tokio::test]
    async fn set_thread_archived_issues_put_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        let path = format!("/v1/message-threads/{id}");
        let mock = server.mock(move |when, then| {
            when.method(PUT)
                .path(path.as_str())
                .json_body(json!({ "is_archived": true }));
            then.status(204);
        });

        let client = client_for(&server);
        client.set_thread_archived(id, true).await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn api_errors_surface_the_envelope_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/message-threads");
            then.status(400).json_body(json!({
                "message": "owner is required"
            }));
        });

        let client = client_for(&server);
        let err = client
            .list_threads(&ThreadIndexQuery::for_owner(""))
            .await
            .expect_err("bad request should fail");

        assert!(matches!(
            err,
            ClientError::Api { status, message }
                if status == reqwest::StatusCode::BAD_REQUEST && message == "owner is required"
        ));
    }

    #[tokio::test]
    async fn empty_error_bodies_fall_back_to_status_line() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/v1/message-threads");
            then.status(503);
        });

        let client = client_for(&server);
        let err = client
            .list_threads(&ThreadIndexQuery::for_owner("+18005550199"))
            .await
            .expect_err("server error should fail");

        assert!(matches!(
            err,
            ClientError::Api { status, message }
                if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
                    && message.contains("503")
        ));
    }

    #[test]
    fn headers_start_unset() {
        let config = ClientConfig::new("http://localhost:8000".parse().expect("valid URL"));
        let client = ApiClient::new(config).expect("client builds");
        assert!(client.authorization().is_none());
        assert!(client.api_key().is_none());
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }
}
