// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delta sync: merge uploaded batches and serve timestamp-range downloads.

use bytes::Bytes;
use rusqlite::Connection;

use super::tokens::TokenStore;
use crate::db::{self, Db};
use crate::error::{AppError, Result};
use crate::models::{EntityKind, LastUpdated, RecordExtra, SyncRecord};
use crate::time_utils::now_millis;
use crate::wire::messages::{AuthHeader, SyncdownRequest};
use crate::wire::records::encode_record_list;

/// Record a deletion marker and remove what it points at.
///
/// The home row and its extensions are deleted even when the marker itself
/// was already stored. Unknown table codes are reported as not stored.
fn apply_deletion(
    conn: &Connection,
    user_id: i64,
    record: &SyncRecord,
    stamp: i64,
) -> Result<bool> {
    let RecordExtra::ItemTable(code) = record.extra else {
        return Ok(false);
    };
    let Some(home) = EntityKind::from_table_code(code) else {
        tracing::warn!(user_id, item_table = code, "Deletion for unknown table");
        return Ok(false);
    };

    let stored = db::items::upsert(conn, EntityKind::Deleted, user_id, record, stamp)?;
    db::items::delete_item(conn, home, user_id, record.item_id)?;
    db::items::delete_item(conn, EntityKind::Extensions, user_id, record.item_id)?;
    Ok(stored)
}

fn load_cursors(conn: &Connection, user_id: i64) -> Result<LastUpdated> {
    db::users::get_cursors(conn, user_id)?
        .ok_or_else(|| AppError::Integrity(format!("no cursor row for user {user_id}")))
}

/// Per-table upload and download.
#[derive(Clone)]
pub struct SyncEngine {
    db: Db,
    tokens: TokenStore,
}

impl SyncEngine {
    pub fn new(db: Db, tokens: TokenStore) -> Self {
        Self { db, tokens }
    }

    /// Merge a batch into `kind`'s table.
    ///
    /// Returns one "not stored" flag per input record. The whole batch
    /// commits or none of it does.
    pub async fn syncup(
        &self,
        kind: EntityKind,
        auth: AuthHeader,
        records: Vec<SyncRecord>,
    ) -> Result<Vec<bool>> {
        self.tokens.authenticate(&auth).await?;
        let user_id = auth.user_id;

        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let cursors = load_cursors(&tx, user_id)?;
                // Never stamp below what clients have already seen.
                let stamp = now_millis().max(cursors.get(kind));

                let mut not_stored = Vec::with_capacity(records.len());
                for record in &records {
                    let stored = match kind {
                        EntityKind::Deleted => apply_deletion(&tx, user_id, record, stamp)?,
                        _ => db::items::upsert(&tx, kind, user_id, record, stamp)?,
                    };
                    not_stored.push(!stored);
                }

                let stored = not_stored.iter().filter(|&&skipped| !skipped).count();
                if stored > 0 {
                    db::users::set_cursor(&tx, user_id, kind, stamp)?;
                }
                tx.commit()?;

                tracing::info!(
                    user_id,
                    table = %kind,
                    count = records.len(),
                    stored,
                    "Syncup applied"
                );
                Ok(not_stored)
            })
            .await
    }

    /// Records of `kind` stamped within `[start_time, end_time]`, encoded as a
    /// counted list.
    pub async fn syncdown(&self, kind: EntityKind, req: SyncdownRequest) -> Result<Bytes> {
        self.tokens.authenticate(&req.auth).await?;
        let user_id = req.auth.user_id;

        let records = self
            .db
            .call(move |conn| {
                Ok(db::items::select_range(
                    conn,
                    kind,
                    user_id,
                    req.start_time,
                    req.end_time,
                )?)
            })
            .await?;

        tracing::debug!(user_id, table = %kind, count = records.len(), "Syncdown");
        Ok(encode_record_list(kind, &records)?)
    }

    /// The caller's cursor row.
    pub async fn last_updated(&self, auth: AuthHeader) -> Result<LastUpdated> {
        self.tokens.authenticate(&auth).await?;
        let user_id = auth.user_id;
        self.db.call(move |conn| load_cursors(conn, user_id)).await
    }
}
