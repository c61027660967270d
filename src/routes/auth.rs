// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: register, login, credential change, cursor row, deletion.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use std::sync::Arc;

use super::read_fixed;
use crate::error::Result;
use crate::models::Credentials;
use crate::wire::messages::{
    encode_cursors, encode_login, encode_session, AuthHeader, ChangeLoginRequest, RegisterRequest,
    AUTH_HEADER_LEN, CHANGE_LOGIN_LEN, DELETE_ACCOUNT_LEN, LOGIN_LEN, REGISTER_LEN,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/changelogin", post(change_login))
        .route("/lastupdated", post(last_updated))
        .route("/deleteaccount", post(delete_account))
}

/// Create an account and its first session.
async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Bytes> {
    let bytes = read_fixed(&state.validator, &headers, body, REGISTER_LEN).await?;
    let req = RegisterRequest::decode(&bytes)?;

    let session = state.auth.register(req.credentials, req.keys).await?;
    Ok(encode_session(session.user_id, &session.token))
}

async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Bytes> {
    let bytes = read_fixed(&state.validator, &headers, body, LOGIN_LEN).await?;
    let credentials = Credentials::decode(&bytes)?;

    let result = state.auth.login(credentials).await?;
    Ok(encode_login(
        result.session.user_id,
        &result.session.token,
        &result.keys,
    ))
}

/// Rotate username, password, and keys; all older sessions end.
async fn change_login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Bytes> {
    let bytes = read_fixed(&state.validator, &headers, body, CHANGE_LOGIN_LEN).await?;
    let req = ChangeLoginRequest::decode(&bytes)?;

    let session = state
        .auth
        .change_credentials(req.old, req.new, req.keys)
        .await?;
    Ok(encode_session(session.user_id, &session.token))
}

async fn last_updated(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<Bytes> {
    let bytes = read_fixed(&state.validator, &headers, body, AUTH_HEADER_LEN).await?;
    let auth = AuthHeader::decode(&bytes)?;

    let cursors = state.sync.last_updated(auth).await?;
    Ok(encode_cursors(&cursors))
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<StatusCode> {
    let bytes = read_fixed(&state.validator, &headers, body, DELETE_ACCOUNT_LEN).await?;
    let credentials = Credentials::decode(&bytes)?;

    state.auth.delete_account(credentials).await?;
    Ok(StatusCode::OK)
}
