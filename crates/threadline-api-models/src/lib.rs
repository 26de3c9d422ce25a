#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the Threadline messaging API.
//!
//! These types mirror the JSON payloads exchanged with the server: thread
//! records, the query parameters accepted by the thread index endpoint, and
//! the response envelopes the service wraps its payloads in. The client crate
//! re-uses them for request/response encoding so the wire contract stays a
//! single source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size applied by the thread index endpoint.
pub const DEFAULT_THREAD_PAGE_LIMIT: u32 = 20;

/// A conversation thread between an owner and a contact.
///
/// Timestamps serialize as ISO-8601 strings and identifiers as UUID strings,
/// matching the server's JSON representation. The type attaches no lifecycle
/// rules; in particular `updated_at >= created_at` is the producer's
/// responsibility, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageThread {
    /// Unique identifier of the thread.
    pub id: Uuid,
    /// Phone number of the owning user.
    pub owner: String,
    /// Phone number of the counterparty.
    pub contact: String,
    /// Display color tag used when rendering the thread.
    pub color: String,
    /// Creation time of the thread.
    pub created_at: DateTime<Utc>,
    /// Last modification time of the thread.
    pub updated_at: DateTime<Utc>,
    /// Timestamp used for sort ordering in thread lists.
    pub order_timestamp: DateTime<Utc>,
    /// Identifier of the most recent message in the thread.
    pub last_message_id: Uuid,
    /// Preview text of the most recent message.
    pub last_message_content: String,
    /// Whether the thread is archived.
    pub is_archived: bool,
}

impl MessageThread {
    /// Fold a new message event into the thread's last-message fields.
    ///
    /// Moves the ordering timestamp to the event timestamp and replaces the
    /// last-message identifier and preview content.
    pub fn record_message(
        &mut self,
        timestamp: DateTime<Utc>,
        message_id: Uuid,
        content: impl Into<String>,
    ) {
        self.order_timestamp = timestamp;
        self.last_message_id = message_id;
        self.last_message_content = content.into();
    }

    /// Set or clear the archive flag.
    pub const fn set_archived(&mut self, is_archived: bool) {
        self.is_archived = is_archived;
    }

    /// Whether the given message is the most recent one in the thread.
    #[must_use]
    pub fn has_last_message(&self, id: Uuid) -> bool {
        self.last_message_id == id
    }
}

/// Query parameters accepted by the thread index endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadIndexQuery {
    /// Phone number owning the threads to list.
    pub owner: String,
    /// Restrict the listing to archived or unarchived threads.
    #[serde(default)]
    pub is_archived: bool,
    /// Number of records to skip for pagination.
    #[serde(default)]
    pub skip: u32,
    /// Maximum number of records to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Optional free-text filter applied to thread contents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

const fn default_limit() -> u32 {
    DEFAULT_THREAD_PAGE_LIMIT
}

impl ThreadIndexQuery {
    /// Build a query for the given owner with the server's defaults applied:
    /// unarchived threads only, first page of twenty records, no text filter.
    #[must_use]
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            is_archived: false,
            skip: 0,
            limit: DEFAULT_THREAD_PAGE_LIMIT,
            query: None,
        }
    }

    /// Restrict the listing to archived threads.
    #[must_use]
    pub const fn archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }

    /// Apply a pagination window.
    #[must_use]
    pub const fn page(mut self, skip: u32, limit: u32) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    /// Apply a free-text filter. Whitespace-only input clears the filter.
    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        let trimmed = query.into().trim().to_string();
        self.query = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        };
        self
    }

    /// Render the query as URL key/value pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("owner", self.owner.clone()),
            ("is_archived", self.is_archived.to_string()),
            ("skip", self.skip.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(query) = &self.query {
            pairs.push(("query", query.clone()));
        }
        pairs
    }
}

/// Envelope returned by the thread index endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadsResponse {
    /// Page of thread records ordered by `order_timestamp` descending.
    pub data: Vec<MessageThread>,
}

/// Body accepted by `PUT /v1/message-threads/{id}` to change the archive flag.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadUpdateRequest {
    /// Desired archive state for the thread.
    pub is_archived: bool,
}

/// Error payload surfaced by the service on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiErrorResponse {
    /// Human-readable description of the failure.
    pub message: String,
}
