// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token queries.

use rusqlite::{params, Connection};

use super::blob32;
use crate::models::{AuthToken, Token};

pub fn insert_token(conn: &Connection, token: &AuthToken) -> rusqlite::Result<()> {
    conn.prepare_cached(
        "INSERT INTO tokens (user_id, creation_time, expiration_time, token)
         VALUES (?1, ?2, ?3, ?4)",
    )?
    .execute(params![
        token.user_id,
        token.creation_time,
        token.expiration_time,
        &token.token[..],
    ])?;
    Ok(())
}

/// Every token row for a user, expired or not.
pub fn list_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<AuthToken>> {
    let mut stmt = conn.prepare_cached(
        "SELECT user_id, creation_time, expiration_time, token FROM tokens WHERE user_id = ?1",
    )?;
    let rows = stmt.query_map(params![user_id], |row| {
        Ok(AuthToken {
            user_id: row.get(0)?,
            creation_time: row.get(1)?,
            expiration_time: row.get(2)?,
            token: blob32(row, 3)?,
        })
    })?;
    rows.collect()
}

/// Move the expiry of the row identified by `(user_id, creation_time, token)`.
pub fn refresh(
    conn: &Connection,
    user_id: i64,
    creation_time: i64,
    token: &Token,
    expiration_time: i64,
) -> rusqlite::Result<usize> {
    conn.prepare_cached(
        "UPDATE tokens SET expiration_time = ?4
         WHERE user_id = ?1 AND creation_time = ?2 AND token = ?3",
    )?
    .execute(params![user_id, creation_time, &token[..], expiration_time])
}

pub fn delete_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM tokens WHERE user_id = ?1", params![user_id])
}

/// Delete every token with `expiration_time < now`.
pub fn purge_expired(conn: &Connection, now: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "DELETE FROM tokens WHERE expiration_time < ?1",
        params![now],
    )
}
