// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (SQLite).

pub mod items;
pub mod schema;
pub mod sqlite;
pub mod tokens;
pub mod users;

pub use sqlite::Db;

/// Account table names as constants.
pub mod tables {
    pub const USERS: &str = "users";
    pub const TOKENS: &str = "tokens";
    /// Per-user cursor row
    pub const LAST_UPDATED: &str = "last_updated";
}

/// True for UNIQUE / PRIMARY KEY violations.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Read a fixed 32-byte blob column.
pub(crate) fn blob32(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<[u8; 32]> {
    let raw: Vec<u8> = row.get(idx)?;
    let len = raw.len();
    raw.try_into().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Blob,
            format!("expected 32-byte blob, found {len} bytes").into(),
        )
    })
}
