// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-user "last ingested" cursor row.
//!
//! Clients compare these values against their own to decide whether a
//! syncdown round trip is worth making for a given table.

use crate::models::entity::{EntityKind, KIND_COUNT};

/// Most recent server `lastUpdated` stamp ingested into each table for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastUpdated {
    pub user_id: i64,
    cursors: [i64; KIND_COUNT],
}

impl LastUpdated {
    /// All-zero row created alongside a new account.
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            cursors: [0; KIND_COUNT],
        }
    }

    pub fn from_values(user_id: i64, cursors: [i64; KIND_COUNT]) -> Self {
        Self { user_id, cursors }
    }

    pub fn get(&self, kind: EntityKind) -> i64 {
        self.cursors[kind.cursor_index()]
    }

    pub fn set(&mut self, kind: EntityKind, value: i64) {
        self.cursors[kind.cursor_index()] = value;
    }

    /// Values in wire order (notes .. deleted).
    pub fn values(&self) -> &[i64; KIND_COUNT] {
        &self.cursors
    }
}
