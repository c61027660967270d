// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::{to_bytes, Body, Bytes};
use axum::http::{header, Request, StatusCode};
use organizer_sync::config::Config;
use organizer_sync::db::Db;
use organizer_sync::models::{Username, TOKEN_LEN};
use organizer_sync::routes::create_router;
use organizer_sync::AppState;
use std::sync::Arc;
use tower::ServiceExt;

/// Create a test app on a private in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = Db::open_in_memory().expect("Failed to open in-memory database");
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

/// POST `body` with a Content-Length that matches it.
#[allow(dead_code)]
pub async fn post(app: &axum::Router, uri: &str, body: Vec<u8>) -> (StatusCode, Bytes) {
    let len = body.len();
    post_with_length(app, uri, body, len).await
}

/// POST `body` while declaring an arbitrary Content-Length.
#[allow(dead_code)]
pub async fn post_with_length(
    app: &axum::Router,
    uri: &str,
    body: Vec<u8>,
    declared: usize,
) -> (StatusCode, Bytes) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_LENGTH, declared)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes)
}

/// Space-padded 32-byte username.
#[allow(dead_code)]
pub fn username(name: &str) -> Vec<u8> {
    Username::padded(name).unwrap().as_bytes().to_vec()
}

/// `username ‖ passwordHash` body.
#[allow(dead_code)]
pub fn login_body(name: &str, hash: u8) -> Vec<u8> {
    let mut body = username(name);
    body.extend_from_slice(&[hash; 32]);
    body
}

/// Register body with keys filled with `key1` / `key2`.
#[allow(dead_code)]
pub fn register_body(name: &str, hash: u8, key1: u8, key2: u8) -> Vec<u8> {
    let mut body = login_body(name, hash);
    body.extend_from_slice(&[key1; 32]);
    body.extend_from_slice(&[key2; 32]);
    body
}

/// An authenticated session as returned by `/register`.
#[derive(Clone, Copy, Debug)]
#[allow(dead_code)]
pub struct TestSession {
    pub user_id: i64,
    pub token: [u8; TOKEN_LEN],
}

#[allow(dead_code)]
impl TestSession {
    pub fn from_response(body: &[u8]) -> Self {
        assert!(body.len() >= 40, "session body too short: {}", body.len());
        Self {
            user_id: i64::from_le_bytes(body[..8].try_into().unwrap()),
            token: body[8..40].try_into().unwrap(),
        }
    }

    /// `userID ‖ token`
    pub fn header(&self) -> Vec<u8> {
        let mut out = self.user_id.to_le_bytes().to_vec();
        out.extend_from_slice(&self.token);
        out
    }
}

/// Register `name` and return its session.
#[allow(dead_code)]
pub async fn register(app: &axum::Router, name: &str, hash: u8) -> TestSession {
    let (status, body) = post(app, "/register", register_body(name, hash, 0xa1, 0xb2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 40);
    TestSession::from_response(&body)
}

/// `userID ‖ token ‖ count ‖ records`
#[allow(dead_code)]
pub fn syncup_body(session: &TestSession, count: u32, records: &[u8]) -> Vec<u8> {
    let mut body = session.header();
    body.extend_from_slice(&count.to_le_bytes());
    body.extend_from_slice(records);
    body
}

/// `userID ‖ token ‖ startTime ‖ endTime`
#[allow(dead_code)]
pub fn syncdown_body(session: &TestSession, start: i64, end: i64) -> Vec<u8> {
    let mut body = session.header();
    body.extend_from_slice(&start.to_le_bytes());
    body.extend_from_slice(&end.to_le_bytes());
    body
}

/// One raw note record.
#[allow(dead_code)]
pub fn note(item_id: i64, last_modified: i64, fill: u8) -> Vec<u8> {
    let mut out = item_id.to_le_bytes().to_vec();
    out.extend_from_slice(&last_modified.to_le_bytes());
    out.extend_from_slice(&[fill; 128]);
    out
}

/// One raw extension record.
#[allow(dead_code)]
pub fn extension(item_id: i64, sequence_num: i32, fill: u8) -> Vec<u8> {
    let mut out = item_id.to_le_bytes().to_vec();
    out.extend_from_slice(&1i64.to_le_bytes());
    out.extend_from_slice(&sequence_num.to_le_bytes());
    out.extend_from_slice(&[fill; 64]);
    out
}

/// One raw deletion marker.
#[allow(dead_code)]
pub fn deleted(item_id: i64, last_modified: i64, item_table: i16) -> Vec<u8> {
    let mut out = item_id.to_le_bytes().to_vec();
    out.extend_from_slice(&last_modified.to_le_bytes());
    out.extend_from_slice(&item_table.to_le_bytes());
    out
}
