// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod auth;
pub mod sync;

use crate::error::{AppError, Result};
use crate::validate::{content_length, RequestValidator};
use crate::wire::messages::{encode_max_record_count, SYNCUP_HEADER_LEN};
use crate::AppState;
use axum::body::{to_bytes, Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Health check response
async fn health_check() -> &'static str {
    "ok"
}

/// Advertise the syncup record ceiling.
async fn max_record_count(State(state): State<Arc<AppState>>) -> Bytes {
    encode_max_record_count(state.validator.max_record_count())
}

/// Read a fixed-size body after checking its declared length.
pub(crate) async fn read_fixed(
    validator: &RequestValidator,
    headers: &HeaderMap,
    body: Body,
    expected: usize,
) -> Result<Bytes> {
    let declared = content_length(headers)?;
    validator.check_fixed(declared, expected)?;
    read_exact(body, declared, expected).await
}

/// Read a `header ‖ records` batch body.
///
/// Never reads more than the largest valid batch, whatever the declared
/// length says.
pub(crate) async fn read_batch(
    validator: &RequestValidator,
    headers: &HeaderMap,
    body: Body,
    record_size: usize,
) -> Result<Bytes> {
    let declared = content_length(headers)?;
    validator.check_declared(declared, SYNCUP_HEADER_LEN, record_size)?;

    let limit = validator.read_limit(SYNCUP_HEADER_LEN, record_size);
    let bytes = read_exact(body, declared, limit).await?;
    let count = validator.record_count(&bytes)?;
    validator.check_records(declared, SYNCUP_HEADER_LEN, record_size, count)?;
    Ok(bytes)
}

async fn read_exact(body: Body, declared: usize, limit: usize) -> Result<Bytes> {
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|e| AppError::BadRequest(format!("failed to read body: {e}")))?;
    if bytes.len() != declared {
        return Err(AppError::BadRequest(format!(
            "body is {} bytes, Content-Length says {declared}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Any origin: credentials travel in the body, never in cookies.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let timeout = state.config.request_timeout;

    Router::new()
        .route("/", post(max_record_count))
        .route("/health", get(health_check))
        .merge(auth::routes())
        .merge(sync::routes())
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors)
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
