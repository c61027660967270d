// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod purge;
pub mod sync;
pub mod tokens;

pub use auth::{hash_password, AuthManager, LoginResult, Session};
pub use purge::spawn_token_purge;
pub use sync::SyncEngine;
pub use tokens::TokenStore;
