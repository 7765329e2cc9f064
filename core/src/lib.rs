//! Synchronous client for the GitHub v3 REST API.
//!
//! # Overview
//! Covers organization membership checks, issue comments, labels, pull
//! request retrieval and commit statuses. List endpoints follow the
//! `rel="next"` relation of the `Link` response header until the last page
//! and return the fully aggregated result.
//!
//! # Design
//! - `GithubApi` is stateless: it holds the base URL and default headers and
//!   splits every operation into `build_*` (produces a request) and
//!   `parse_*` (consumes a response), keeping the I/O boundary explicit.
//! - `Transport` executes a request. `UreqTransport` is the blocking
//!   production implementation; tests substitute in-memory transports.
//! - `GithubClient` glues the two together and is safe to share across
//!   threads.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod types;

pub use api::GithubApi;
pub use client::GithubClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use pagination::{fetch_all_pages, next_link, parse_link_header, LinkRelation};
pub use types::{IssueComment, Label, NewComment, PullRequest, Status, User};
