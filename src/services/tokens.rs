// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer token lifecycle: issue, validate (with optional refresh), purge.

use anyhow::anyhow;
use ring::rand::{SecureRandom, SystemRandom};
use rusqlite::Connection;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::db::{self, Db};
use crate::error::{AppError, Result};
use crate::models::{AuthToken, Token, TOKEN_LEN};
use crate::time_utils::now_millis;
use crate::wire::messages::AuthHeader;

/// Issues and checks bearer tokens.
#[derive(Clone)]
pub struct TokenStore {
    db: Db,
    rng: SystemRandom,
    expire_millis: i64,
    refresh_on_use: bool,
}

impl TokenStore {
    pub fn new(db: Db, config: &Config) -> Self {
        Self {
            db,
            rng: SystemRandom::new(),
            expire_millis: config.token_expire_millis(),
            refresh_on_use: config.token_expire_refresh,
        }
    }

    fn random<const N: usize>(&self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.rng
            .fill(&mut out)
            .map_err(|_| AppError::Internal(anyhow!("system random source failed")))?;
        Ok(out)
    }

    pub fn generate_token(&self) -> Result<Token> {
        self.random::<TOKEN_LEN>()
    }

    pub fn generate_salt(&self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.random::<4>()?))
    }

    /// Issue a token inside an open transaction.
    pub fn issue_in(&self, conn: &Connection, user_id: i64, now: i64) -> Result<Token> {
        let token = self.generate_token()?;
        db::tokens::insert_token(
            conn,
            &AuthToken {
                user_id,
                creation_time: now,
                expiration_time: now.saturating_add(self.expire_millis),
                token,
            },
        )?;
        tracing::debug!(user_id, "Issued token");
        Ok(token)
    }

    pub async fn issue(&self, user_id: i64) -> Result<Token> {
        let store = self.clone();
        self.db
            .call(move |conn| store.issue_in(conn, user_id, now_millis()))
            .await
    }

    /// Check a token at time `now`, refreshing its expiry when configured.
    pub fn validate_in(
        &self,
        conn: &Connection,
        user_id: i64,
        token: &Token,
        now: i64,
    ) -> Result<bool> {
        let rows = db::tokens::list_for_user(conn, user_id)?;
        let Some(row) = rows
            .into_iter()
            .find(|row| bool::from(row.token[..].ct_eq(&token[..])))
        else {
            return Ok(false);
        };

        if row.is_expired(now) {
            tracing::debug!(user_id, "Rejected expired token");
            return Ok(false);
        }

        if self.refresh_on_use {
            db::tokens::refresh(
                conn,
                user_id,
                row.creation_time,
                &row.token,
                now.saturating_add(self.expire_millis),
            )?;
        }
        Ok(true)
    }

    pub async fn validate(&self, user_id: i64, token: Token) -> Result<bool> {
        self.validate_at(user_id, token, now_millis()).await
    }

    pub async fn validate_at(&self, user_id: i64, token: Token, now: i64) -> Result<bool> {
        let store = self.clone();
        self.db
            .call(move |conn| store.validate_in(conn, user_id, &token, now))
            .await
    }

    /// Validate the `userID ‖ token` prefix of a request.
    pub async fn authenticate(&self, auth: &AuthHeader) -> Result<()> {
        if self.validate(auth.user_id, auth.token).await? {
            Ok(())
        } else {
            tracing::info!(user_id = auth.user_id, "Token rejected");
            Err(AppError::Unauthorized)
        }
    }

    pub async fn invalidate_all_for_user(&self, user_id: i64) -> Result<usize> {
        self.db
            .call(move |conn| Ok(db::tokens::delete_for_user(conn, user_id)?))
            .await
    }

    /// Delete every token whose expiry is before `now`.
    pub async fn purge_expired(&self, now: i64) -> Result<usize> {
        self.db
            .call(move |conn| Ok(db::tokens::purge_expired(conn, now)?))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(refresh: bool) -> TokenStore {
        let mut config = Config::test_default();
        config.token_expire_time = std::time::Duration::from_secs(60);
        config.token_expire_refresh = refresh;
        TokenStore::new(Db::open_in_memory().unwrap(), &config)
    }

    #[test]
    fn test_tokens_are_random() {
        let store = store(true);
        assert_ne!(store.generate_token().unwrap(), store.generate_token().unwrap());
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let store = store(true);
        let token = store.issue(7).await.unwrap();
        assert!(store.validate(7, token).await.unwrap());
        assert!(!store.validate(8, token).await.unwrap());

        let mut other = token;
        other[0] ^= 1;
        assert!(!store.validate(7, other).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_token_never_authenticates() {
        let store = store(true);
        let token = store.issue(7).await.unwrap();
        let later = now_millis() + 61_000;
        assert!(!store.validate_at(7, token, later).await.unwrap());
    }

    #[tokio::test]
    async fn test_refresh_extends_expiry() {
        let store = store(true);
        let token = store.issue(7).await.unwrap();
        let start = now_millis();

        // Used 50s in: still valid and pushed out to 110s.
        assert!(store.validate_at(7, token, start + 50_000).await.unwrap());
        assert!(store.validate_at(7, token, start + 100_000).await.unwrap());
    }

    #[tokio::test]
    async fn test_no_refresh_keeps_expiry() {
        let store = store(false);
        let token = store.issue(7).await.unwrap();
        let start = now_millis();

        assert!(store.validate_at(7, token, start + 50_000).await.unwrap());
        assert!(!store.validate_at(7, token, start + 100_000).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalidate_and_purge() {
        let store = store(true);
        let first = store.issue(1).await.unwrap();
        store.issue(1).await.unwrap();
        store.issue(2).await.unwrap();

        assert_eq!(store.invalidate_all_for_user(1).await.unwrap(), 2);
        assert!(!store.validate(1, first).await.unwrap());

        assert_eq!(store.purge_expired(now_millis()).await.unwrap(), 0);
        assert_eq!(
            store.purge_expired(now_millis() + 120_000).await.unwrap(),
            1
        );
    }
}
