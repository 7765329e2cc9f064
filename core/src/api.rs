//! Stateless request builder and response parser for the GitHub v3 API.
//!
//! # Design
//! `GithubApi` holds only the base URL and the headers attached to every
//! request. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`, so
//! the request shape and status handling can be tested without a network.
//! Every `parse_*` method checks the response against the single status code
//! its endpoint documents.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use urlencoding::encode;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{IssueComment, Label, NewComment, PullRequest, Status};

pub const ACCEPT_V3: &str = "application/vnd.github.v3+json";

const STATUS_OK: u16 = 200;
const STATUS_CREATED: u16 = 201;
const STATUS_NO_CONTENT: u16 = 204;

#[derive(Debug, Clone)]
pub struct GithubApi {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl GithubApi {
    /// Builder for `base_url` with no default headers.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: Vec::new(),
        }
    }

    /// Builder with `Accept`, `User-Agent` and, if configured, `Authorization`
    /// headers on every request.
    pub fn from_config(config: &ClientConfig) -> Self {
        let mut headers = vec![
            ("Accept".to_string(), ACCEPT_V3.to_string()),
            ("User-Agent".to_string(), config.user_agent.clone()),
        ];
        if let Some(token) = &config.token {
            headers.push(("Authorization".to_string(), format!("token {token}")));
        }
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            headers,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: self.headers.clone(),
            body: None,
        }
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    // -----------------------------------------------------------------------
    // Build
    // -----------------------------------------------------------------------

    pub fn build_is_member(&self, org: &str, user: &str) -> HttpRequest {
        let path = format!("/orgs/{}/members/{}", encode(org), encode(user));
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_create_comment(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/issues/{number}/comments", repo_path(org, repo));
        let payload = NewComment {
            body: body.to_string(),
        };
        self.json_request(HttpMethod::Post, &path, &payload)
    }

    pub fn build_delete_comment(&self, org: &str, repo: &str, id: u64) -> HttpRequest {
        let path = format!("{}/issues/comments/{id}", repo_path(org, repo));
        self.request(HttpMethod::Delete, &path)
    }

    pub fn build_get_pull_request(&self, org: &str, repo: &str, number: u64) -> HttpRequest {
        let path = format!("{}/pulls/{number}", repo_path(org, repo));
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_create_status(
        &self,
        org: &str,
        repo: &str,
        sha: &str,
        status: &Status,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/statuses/{}", repo_path(org, repo), encode(sha));
        self.json_request(HttpMethod::Post, &path, status)
    }

    /// First page of an issue's comments; later pages follow `Link` headers.
    pub fn build_list_issue_comments(&self, org: &str, repo: &str, number: u64) -> HttpRequest {
        let path = format!("{}/issues/{number}/comments", repo_path(org, repo));
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_add_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<HttpRequest, ApiError> {
        let path = format!("{}/issues/{number}/labels", repo_path(org, repo));
        self.json_request(HttpMethod::Post, &path, &[label])
    }

    pub fn build_remove_label(&self, org: &str, repo: &str, number: u64, label: &str) -> HttpRequest {
        let path = format!(
            "{}/issues/{number}/labels/{}",
            repo_path(org, repo),
            encode(label)
        );
        self.request(HttpMethod::Delete, &path)
    }

    /// First page of an issue's labels; later pages follow `Link` headers.
    pub fn build_list_issue_labels(&self, org: &str, repo: &str, number: u64) -> HttpRequest {
        let path = format!("{}/issues/{number}/labels", repo_path(org, repo));
        self.request(HttpMethod::Get, &path)
    }

    // -----------------------------------------------------------------------
    // Parse
    // -----------------------------------------------------------------------

    /// `true` on 204. GitHub answers 404 for non-members and 302 when the
    /// caller cannot see the member list; both are errors here.
    pub fn parse_is_member(&self, response: HttpResponse) -> Result<bool, ApiError> {
        check_status(&response, STATUS_NO_CONTENT)?;
        Ok(true)
    }

    pub fn parse_create_comment(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, STATUS_CREATED)
    }

    pub fn parse_delete_comment(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, STATUS_NO_CONTENT)
    }

    pub fn parse_get_pull_request(&self, response: HttpResponse) -> Result<PullRequest, ApiError> {
        check_status(&response, STATUS_OK)?;
        decode(&response)
    }

    pub fn parse_create_status(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, STATUS_CREATED)
    }

    /// Decode one page of comments. Pagination is handled by the caller.
    pub fn parse_issue_comments_page(&self, response: HttpResponse) -> Result<Vec<IssueComment>, ApiError> {
        check_status(&response, STATUS_OK)?;
        decode(&response)
    }

    pub fn parse_add_label(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, STATUS_OK)
    }

    pub fn parse_remove_label(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, STATUS_NO_CONTENT)
    }

    pub fn parse_issue_labels_page(&self, response: HttpResponse) -> Result<Vec<Label>, ApiError> {
        check_status(&response, STATUS_OK)?;
        decode(&response)
    }
}

fn repo_path(org: &str, repo: &str) -> String {
    format!("/repos/{}/{}", encode(org), encode(repo))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    warn!(status = response.status, expected, "unexpected response status");
    Err(ApiError::UnexpectedStatus {
        expected,
        status: response.status,
        body: response.body.clone(),
    })
}
