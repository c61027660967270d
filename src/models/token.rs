// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token model.

/// Token length in bytes.
pub const TOKEN_LEN: usize = 32;

/// Raw bearer token bytes.
pub type Token = [u8; TOKEN_LEN];

/// A stored token row. Many may exist per user (one per device session).
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub user_id: i64,
    /// Issue time (ms); identifies the row together with the token bytes
    pub creation_time: i64,
    /// Expiry (ms); rows with `expiration_time <= now` never authenticate
    pub expiration_time: i64,
    pub token: Token,
}

impl AuthToken {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiration_time <= now
    }
}
