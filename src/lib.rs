// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Organizer-Sync: multi-device sync backend for an encrypted organizer app
//!
//! Clients push and pull opaque encrypted records over a fixed-layout binary
//! protocol, authenticated by bearer tokens bound to a username and password
//! hash.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validate;
pub mod wire;

use config::Config;
use db::Db;
use services::{AuthManager, SyncEngine, TokenStore};
use validate::RequestValidator;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub validator: RequestValidator,
    pub tokens: TokenStore,
    pub auth: AuthManager,
    pub sync: SyncEngine,
}

impl AppState {
    /// Wire every service to one database handle.
    pub fn new(config: Config, db: Db) -> Self {
        let tokens = TokenStore::new(db.clone(), &config);
        Self {
            validator: RequestValidator::new(config.max_record_count),
            auth: AuthManager::new(db.clone(), tokens.clone()),
            sync: SyncEngine::new(db, tokens.clone()),
            tokens,
            config,
        }
    }
}
