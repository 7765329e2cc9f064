//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port with a small page size, then
//! exercises every client operation over real HTTP through `UreqTransport`.
//! Validates that request building, pagination and response parsing work
//! against an actual server, and inspects the server's store for writes.

use github_client::{ApiError, ClientConfig, GithubClient, Status};
use mock_server::{new_db, Db, PullRequest, Store, User};

const PAGE_SIZE: usize = 2;

/// Boot the mock server over `store` and return the shared store and base URL.
fn start_server(store: Store) -> (Db, String) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let db = new_db(store);
    let server_db = db.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, server_db, PAGE_SIZE).await
        })
        .unwrap();
    });

    (db, format!("http://{addr}"))
}

fn seeded_store() -> Store {
    Store::default()
        .with_member("k8s", "person")
        .with_pull_request(
            "k8s",
            "kuber",
            PullRequest {
                number: 12,
                user: User {
                    login: "bla".to_string(),
                },
                title: "Fix flake".to_string(),
                state: "open".to_string(),
            },
        )
}

#[test]
fn membership() {
    let (_db, base) = start_server(seeded_store());
    let client = GithubClient::new(&base);

    assert!(client.is_member("k8s", "person").unwrap());

    let err = client.is_member("k8s", "stranger").unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedStatus { status: 404, .. }));
}

#[test]
fn pull_request_decodes_author() {
    let (_db, base) = start_server(seeded_store());
    let client = GithubClient::from_config(&ClientConfig::new(&base).with_token("t0ken"));

    let pr = client.get_pull_request("k8s", "kuber", 12).unwrap();
    assert_eq!(pr.number, 12);
    assert_eq!(pr.user.login, "bla");
    assert_eq!(pr.title, "Fix flake");

    let err = client.get_pull_request("k8s", "kuber", 13).unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn comments_paginate_across_pages() {
    let (db, base) = start_server(Store::default());
    let client = GithubClient::new(&base);

    for body in ["one", "two", "three", "four", "five"] {
        client.create_comment("k8s", "kuber", 15, body).unwrap();
    }

    // 5 comments with a page size of 2 spans three pages.
    let comments = client.list_issue_comments("k8s", "kuber", 15).unwrap();
    let bodies: Vec<&str> = comments.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three", "four", "five"]);
    let ids: Vec<u64> = comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert!(comments.iter().all(|c| c.user.login == mock_server::BOT_LOGIN));

    client.delete_comment("k8s", "kuber", 3).unwrap();
    let remaining = client.list_issue_comments("k8s", "kuber", 15).unwrap();
    assert_eq!(remaining.len(), 4);
    assert!(remaining.iter().all(|c| c.id != 3));
    assert_eq!(db.blocking_read().comments.values().map(Vec::len).sum::<usize>(), 4);

    let err = client.delete_comment("k8s", "kuber", 3).unwrap_err();
    assert!(matches!(err, ApiError::UnexpectedStatus { expected: 204, status: 404, .. }));
}

#[test]
fn empty_comment_list() {
    let (_db, base) = start_server(Store::default());
    let client = GithubClient::new(&base);
    assert!(client.list_issue_comments("k8s", "kuber", 1).unwrap().is_empty());
}

#[test]
fn status_is_recorded() {
    let (db, base) = start_server(Store::default());
    let client = GithubClient::new(&base);

    let status = Status {
        state: "failure".to_string(),
        target_url: "https://ci.example.com/build/7".to_string(),
        description: "2 tests failed".to_string(),
        context: "ci/unit".to_string(),
    };
    client.create_status("k8s", "kuber", "abcdef", &status).unwrap();

    let store = db.blocking_read();
    let recorded = &store.statuses[&("k8s".to_string(), "kuber".to_string(), "abcdef".to_string())];
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].context, "ci/unit");
    assert_eq!(recorded[0].state, "failure");
    assert_eq!(recorded[0].description, "2 tests failed");
    drop(store);

    let bad = Status {
        state: "green".to_string(),
        ..Status::default()
    };
    let err = client.create_status("k8s", "kuber", "abcdef", &bad).unwrap_err();
    assert_eq!(err.status(), Some(422));
}

#[test]
fn label_lifecycle() {
    let (_db, base) = start_server(Store::default());
    let client = GithubClient::new(&base);

    for label in ["yay", "lgtm", "needs review", "kind/bug"] {
        client.add_label("k8s", "kuber", 5, label).unwrap();
    }

    let labels = client.list_issue_labels("k8s", "kuber", 5).unwrap();
    let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["yay", "lgtm", "needs review", "kind/bug"]);

    client.remove_label("k8s", "kuber", 5, "needs review").unwrap();
    client.remove_label("k8s", "kuber", 5, "kind/bug").unwrap();
    let labels = client.list_issue_labels("k8s", "kuber", 5).unwrap();
    let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["yay", "lgtm"]);

    let err = client.remove_label("k8s", "kuber", 5, "kind/bug").unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[test]
fn concurrent_calls_share_one_client() {
    let (_db, base) = start_server(seeded_store());
    let client = GithubClient::new(&base);

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                assert!(client.is_member("k8s", "person").unwrap());
                assert_eq!(client.get_pull_request("k8s", "kuber", 12).unwrap().user.login, "bla");
            });
        }
    });
}

#[test]
fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GithubClient::new(&format!("http://{addr}"));
    let err = client.list_issue_comments("k8s", "kuber", 1).unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
}

/// Serve `/orgs/k8s/members/person` as a 302 to another path and answer
/// anything else with 204, one connection per request.
fn start_redirecting_server() -> String {
    use std::io::{BufRead, BufReader, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
            }

            let response = if request_line.contains("/orgs/k8s/members/person ") {
                format!(
                    "HTTP/1.1 302 Found\r\nLocation: http://{addr}/orgs/k8s/public_members/person\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                )
            } else {
                "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
            };
            stream.write_all(response.as_bytes()).unwrap();
        }
    });
    format!("http://{addr}")
}

#[test]
fn redirect_is_not_followed() {
    let base = start_redirecting_server();
    let client = GithubClient::new(&base);
    let err = client.is_member("k8s", "person").unwrap_err();
    assert!(
        matches!(err, ApiError::UnexpectedStatus { expected: 204, status: 302, .. }),
        "{err:?}"
    );
}
