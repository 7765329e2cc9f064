//! Error types for the GitHub API client.
//!
//! # Design
//! There are two ways a call can fail against the remote service: the
//! transport never produced a response, or the response carried a status the
//! operation does not accept. A listing whose `next` links cycle back to an
//! earlier page is reported on its own. JSON codec failures get their own
//! variants so a malformed payload is not mistaken for a protocol error.

use thiserror::Error;

/// Errors returned by `GithubApi` parse methods and `GithubClient` calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, TLS, I/O).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// The server answered with a status other than the one the operation expects.
    #[error("unexpected status {status} (expected {expected}): {body}")]
    UnexpectedStatus {
        expected: u16,
        status: u16,
        body: String,
    },

    /// A `rel="next"` link pointed back at a page already fetched in the same listing.
    #[error("pagination loop: next link {url} was already visited")]
    PaginationLoop { url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Status code of the offending response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
