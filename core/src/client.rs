//! Blocking GitHub client: `GithubApi` plus a `Transport`.
//!
//! # Design
//! Each method is build, execute, parse. The client holds no mutable state,
//! so a single instance can be shared across threads when its transport
//! allows it. List endpoints go through `pagination::fetch_all_pages`.

use tracing::instrument;

use crate::api::GithubApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{Transport, UreqTransport};
use crate::pagination::fetch_all_pages;
use crate::types::{IssueComment, Label, PullRequest, Status};

#[derive(Debug, Clone)]
pub struct GithubClient<T = UreqTransport> {
    api: GithubApi,
    transport: T,
}

impl GithubClient<UreqTransport> {
    /// Client for `base_url` over a default `ureq` agent, without identity headers.
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(GithubApi::new(base_url), UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(GithubApi::from_config(config), UreqTransport::new())
    }
}

impl<T: Transport> GithubClient<T> {
    pub fn with_transport(api: GithubApi, transport: T) -> Self {
        Self { api, transport }
    }

    pub fn api(&self) -> &GithubApi {
        &self.api
    }

    /// Whether `user` is a member of `org`. Only 204 means yes; every other
    /// status, 404 included, is returned as an error.
    #[instrument(skip(self))]
    pub fn is_member(&self, org: &str, user: &str) -> Result<bool, ApiError> {
        let response = self.transport.execute(self.api.build_is_member(org, user))?;
        self.api.parse_is_member(response)
    }

    #[instrument(skip(self, body))]
    pub fn create_comment(&self, org: &str, repo: &str, number: u64, body: &str) -> Result<(), ApiError> {
        let request = self.api.build_create_comment(org, repo, number, body)?;
        let response = self.transport.execute(request)?;
        self.api.parse_create_comment(response)
    }

    #[instrument(skip(self))]
    pub fn delete_comment(&self, org: &str, repo: &str, id: u64) -> Result<(), ApiError> {
        let response = self.transport.execute(self.api.build_delete_comment(org, repo, id))?;
        self.api.parse_delete_comment(response)
    }

    #[instrument(skip(self))]
    pub fn get_pull_request(&self, org: &str, repo: &str, number: u64) -> Result<PullRequest, ApiError> {
        let response = self
            .transport
            .execute(self.api.build_get_pull_request(org, repo, number))?;
        self.api.parse_get_pull_request(response)
    }

    #[instrument(skip(self, status), fields(context = %status.context, state = %status.state))]
    pub fn create_status(&self, org: &str, repo: &str, sha: &str, status: &Status) -> Result<(), ApiError> {
        let request = self.api.build_create_status(org, repo, sha, status)?;
        let response = self.transport.execute(request)?;
        self.api.parse_create_status(response)
    }

    /// Every comment on the issue, across all pages, in server order.
    #[instrument(skip(self))]
    pub fn list_issue_comments(&self, org: &str, repo: &str, number: u64) -> Result<Vec<IssueComment>, ApiError> {
        let first = self.api.build_list_issue_comments(org, repo, number);
        fetch_all_pages(&self.transport, first, |page| {
            self.api.parse_issue_comments_page(page)
        })
    }

    #[instrument(skip(self))]
    pub fn add_label(&self, org: &str, repo: &str, number: u64, label: &str) -> Result<(), ApiError> {
        let request = self.api.build_add_label(org, repo, number, label)?;
        let response = self.transport.execute(request)?;
        self.api.parse_add_label(response)
    }

    #[instrument(skip(self))]
    pub fn remove_label(&self, org: &str, repo: &str, number: u64, label: &str) -> Result<(), ApiError> {
        let response = self
            .transport
            .execute(self.api.build_remove_label(org, repo, number, label))?;
        self.api.parse_remove_label(response)
    }

    /// Every label on the issue, across all pages.
    #[instrument(skip(self))]
    pub fn list_issue_labels(&self, org: &str, repo: &str, number: u64) -> Result<Vec<Label>, ApiError> {
        let first = self.api.build_list_issue_labels(org, repo, number);
        fetch_all_pages(&self.transport, first, |page| self.api.parse_issue_labels_page(page))
    }
}
