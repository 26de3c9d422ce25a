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
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Preconfigured HTTP client for the Threadline messaging API.
//!
//! Layout:
//! - `config.rs`: construction-time settings (base URL, client version)
//! - `client.rs`: the shared [`ApiClient`], auth header mutators, typed calls
//! - `error.rs`: the crate error type
//!
//! The client is an explicitly constructed object rather than process-global
//! state; clones share one set of default auth headers, so every request
//! issued after a header mutation carries the latest values.

pub mod client;
pub mod config;
pub mod error;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
