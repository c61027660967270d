// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod cursor;
pub mod entity;
pub mod record;
pub mod token;
pub mod user;

pub use cursor::LastUpdated;
pub use entity::{EntityKind, RecordShape};
pub use record::{RecordExtra, SyncRecord};
pub use token::{AuthToken, Token, TOKEN_LEN};
pub use user::{Credentials, KeyPair, User, Username};
