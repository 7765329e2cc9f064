use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// GitHub's default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Author recorded on comments created through the mock.
pub const BOT_LOGIN: &str = "mock-bot";

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub login: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    pub user: User,
    pub body: String,
}

#[derive(Deserialize)]
pub struct NewComment {
    pub body: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub user: User,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub state: String,
    #[serde(default)]
    pub target_url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Label {
    pub name: String,
}

type RepoKey = (String, String);
type IssueKey = (String, String, u64);

/// In-memory state behind the fake API. Public so tests can seed it and
/// inspect writes.
#[derive(Debug, Default)]
pub struct Store {
    pub members: HashMap<String, HashSet<String>>,
    pub comments: HashMap<IssueKey, Vec<IssueComment>>,
    pub pulls: HashMap<IssueKey, PullRequest>,
    pub statuses: HashMap<(String, String, String), Vec<Status>>,
    pub labels: HashMap<IssueKey, Vec<String>>,
    next_comment_id: u64,
}

impl Store {
    pub fn with_member(mut self, org: &str, user: &str) -> Self {
        self.members
            .entry(org.to_string())
            .or_default()
            .insert(user.to_string());
        self
    }

    pub fn with_pull_request(mut self, org: &str, repo: &str, pr: PullRequest) -> Self {
        self.pulls
            .insert((org.to_string(), repo.to_string(), pr.number), pr);
        self
    }

    pub fn with_comment(mut self, org: &str, repo: &str, number: u64, author: &str, body: &str) -> Self {
        self.push_comment((org.to_string(), repo.to_string(), number), author, body);
        self
    }

    pub fn with_label(mut self, org: &str, repo: &str, number: u64, label: &str) -> Self {
        self.labels
            .entry((org.to_string(), repo.to_string(), number))
            .or_default()
            .push(label.to_string());
        self
    }

    fn push_comment(&mut self, key: IssueKey, author: &str, body: &str) -> IssueComment {
        self.next_comment_id += 1;
        let comment = IssueComment {
            id: self.next_comment_id,
            user: User {
                login: author.to_string(),
            },
            body: body.to_string(),
        };
        self.comments.entry(key).or_default().push(comment.clone());
        comment
    }

    fn remove_comment(&mut self, (org, repo): RepoKey, id: u64) -> bool {
        for ((o, r, _), comments) in self.comments.iter_mut() {
            if *o != org || *r != repo {
                continue;
            }
            if let Some(pos) = comments.iter().position(|c| c.id == id) {
                comments.remove(pos);
                return true;
            }
        }
        false
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn new_db(store: Store) -> Db {
    Arc::new(RwLock::new(store))
}

#[derive(Clone)]
struct AppState {
    db: Db,
    page_size: usize,
}

pub fn app() -> Router {
    app_with(new_db(Store::default()), DEFAULT_PAGE_SIZE)
}

/// Router over `db`, serving at most `page_size` items per list page unless
/// the request asks for a different `per_page`.
pub fn app_with(db: Db, page_size: usize) -> Router {
    let state = AppState {
        db,
        page_size: page_size.max(1),
    };
    Router::new()
        .route("/orgs/{org}/members/{user}", get(check_member))
        .route(
            "/repos/{org}/{repo}/issues/{number}/comments",
            get(list_comments).post(create_comment),
        )
        .route("/repos/{org}/{repo}/issues/comments/{id}", delete(delete_comment))
        .route("/repos/{org}/{repo}/pulls/{number}", get(get_pull_request))
        .route("/repos/{org}/{repo}/statuses/{sha}", post(create_status))
        .route(
            "/repos/{org}/{repo}/issues/{number}/labels",
            get(list_labels).post(add_labels),
        )
        .route(
            "/repos/{org}/{repo}/issues/{number}/labels/{name}",
            delete(remove_label),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, db: Db, page_size: usize) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(db, page_size)).await
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Slice `items` for the requested page and build the matching `Link` header.
///
/// Link targets are absolute, built from the request's `Host` header, the
/// way GitHub advertises them.
fn paginate<T: Clone>(
    items: &[T],
    params: &PageParams,
    default_size: usize,
    host: &str,
    path: &str,
) -> (Vec<T>, Option<String>) {
    let per_page = params.per_page.unwrap_or(default_size).max(1);
    let page = params.page.unwrap_or(1).max(1);
    let last = items.len().div_ceil(per_page).max(1);

    let start = (page - 1).saturating_mul(per_page).min(items.len());
    let end = start.saturating_add(per_page).min(items.len());
    let slice = items[start..end].to_vec();

    let url = |n: usize| format!("http://{host}{path}?page={n}&per_page={per_page}");
    let mut links = Vec::new();
    if page < last {
        links.push(format!("<{}>; rel=\"next\"", url(page + 1)));
        links.push(format!("<{}>; rel=\"last\"", url(last)));
    }
    if page > 1 {
        links.push(format!("<{}>; rel=\"first\"", url(1)));
        links.push(format!("<{}>; rel=\"prev\"", url(page - 1)));
    }

    let link = (!links.is_empty()).then(|| links.join(", "));
    (slice, link)
}

fn paged_response<T: Serialize>(items: Vec<T>, link: Option<String>) -> Response {
    let mut response = Json(items).into_response();
    if let Some(value) = link.and_then(|l| HeaderValue::from_str(&l).ok()) {
        response.headers_mut().insert(header::LINK, value);
    }
    response
}

fn host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost")
        .to_string()
}

async fn check_member(
    State(state): State<AppState>,
    Path((org, user)): Path<(String, String)>,
) -> StatusCode {
    let store = state.db.read().await;
    let is_member = store.members.get(&org).is_some_and(|m| m.contains(&user));
    if is_member {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn list_comments(
    State(state): State<AppState>,
    Path((org, repo, number)): Path<IssueKey>,
    Query(params): Query<PageParams>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let store = state.db.read().await;
    let comments = store
        .comments
        .get(&(org, repo, number))
        .cloned()
        .unwrap_or_default();
    let (page, link) = paginate(&comments, &params, state.page_size, &host(&headers), uri.path());
    paged_response(page, link)
}

async fn create_comment(
    State(state): State<AppState>,
    Path(key): Path<IssueKey>,
    Json(input): Json<NewComment>,
) -> (StatusCode, Json<IssueComment>) {
    let comment = state.db.write().await.push_comment(key, BOT_LOGIN, &input.body);
    debug!(id = comment.id, "comment created");
    (StatusCode::CREATED, Json(comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    Path((org, repo, id)): Path<IssueKey>,
) -> StatusCode {
    if state.db.write().await.remove_comment((org, repo), id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn get_pull_request(
    State(state): State<AppState>,
    Path(key): Path<IssueKey>,
) -> Result<Json<PullRequest>, StatusCode> {
    let store = state.db.read().await;
    store.pulls.get(&key).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

const STATUS_STATES: [&str; 4] = ["pending", "success", "error", "failure"];

async fn create_status(
    State(state): State<AppState>,
    Path((org, repo, sha)): Path<(String, String, String)>,
    Json(status): Json<Status>,
) -> Result<(StatusCode, Json<Status>), StatusCode> {
    if !STATUS_STATES.contains(&status.state.as_str()) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    state
        .db
        .write()
        .await
        .statuses
        .entry((org, repo, sha))
        .or_default()
        .push(status.clone());
    Ok((StatusCode::CREATED, Json(status)))
}

async fn list_labels(
    State(state): State<AppState>,
    Path(key): Path<IssueKey>,
    Query(params): Query<PageParams>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let store = state.db.read().await;
    let labels: Vec<Label> = store
        .labels
        .get(&key)
        .map(|names| names.iter().map(|name| Label { name: name.clone() }).collect())
        .unwrap_or_default();
    let (page, link) = paginate(&labels, &params, state.page_size, &host(&headers), uri.path());
    paged_response(page, link)
}

async fn add_labels(
    State(state): State<AppState>,
    Path(key): Path<IssueKey>,
    Json(names): Json<Vec<String>>,
) -> Json<Vec<Label>> {
    let mut store = state.db.write().await;
    let labels = store.labels.entry(key).or_default();
    for name in names {
        if !labels.contains(&name) {
            labels.push(name);
        }
    }
    Json(labels.iter().map(|name| Label { name: name.clone() }).collect())
}

async fn remove_label(
    State(state): State<AppState>,
    Path((org, repo, number, name)): Path<(String, String, u64, String)>,
) -> StatusCode {
    let mut store = state.db.write().await;
    let Some(labels) = store.labels.get_mut(&(org, repo, number)) else {
        return StatusCode::NOT_FOUND;
    };
    match labels.iter().position(|l| *l == name) {
        Some(pos) => {
            labels.remove(pos);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
