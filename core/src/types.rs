//! DTOs mirroring the GitHub v3 JSON shapes the client reads and writes.
//!
//! # Design
//! These types are defined independently from the mock-server's records.
//! Integration tests catch schema drift between the two crates. Only the
//! fields the client needs are modelled; unknown fields are ignored on decode.

use serde::{Deserialize, Serialize};

/// Account reference embedded in comments and pull requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub login: String,
}

/// A comment on an issue or pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html_url: String,
}

/// Request payload for posting a new issue comment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewComment {
    pub body: String,
}

/// A pull request as returned by `GET /repos/{org}/{repo}/pulls/{number}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    #[serde(default)]
    pub number: u64,
    pub user: User,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub html_url: String,
}

/// A commit status. `state` is one of `pending`, `success`, `error` or
/// `failure`; the remaining fields are omitted from the request when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
}

/// An issue label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
}
