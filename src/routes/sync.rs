// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-table upload and download routes.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
    Router,
};
use std::sync::Arc;

use super::{read_batch, read_fixed};
use crate::error::{AppError, Result};
use crate::models::EntityKind;
use crate::wire::messages::{SyncdownRequest, SyncupHeader, SYNCDOWN_LEN, SYNCUP_HEADER_LEN};
use crate::wire::{decode_records, encode_bitmap};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/syncup/{*table}", post(syncup))
        .route("/syncdown/{*table}", post(syncdown))
}

fn resolve(table: &str) -> Result<EntityKind> {
    EntityKind::from_path(table).ok_or_else(|| AppError::NotFound(format!("table {table}")))
}

/// Upload a batch; responds with the "not stored" bitmap.
async fn syncup(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Bytes> {
    let kind = resolve(&table)?;
    let bytes = read_batch(&state.validator, &headers, body, kind.record_size()).await?;
    let header = SyncupHeader::decode(&bytes)?;
    let records = decode_records(
        kind,
        &bytes[SYNCUP_HEADER_LEN..],
        header.record_count as usize,
    )?;

    let not_stored = state.sync.syncup(kind, header.auth, records).await?;
    Ok(encode_bitmap(&not_stored))
}

/// Download records stamped within the requested window.
async fn syncdown(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<Bytes> {
    let kind = resolve(&table)?;
    let bytes = read_fixed(&state.validator, &headers, body, SYNCDOWN_LEN).await?;
    let req = SyncdownRequest::decode(&bytes)?;

    state.sync.syncdown(kind, req).await
}
