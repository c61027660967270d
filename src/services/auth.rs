// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account lifecycle: registration, login, credential rotation, deletion.

use rusqlite::Connection;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::tokens::TokenStore;
use crate::db::{self, users::NewUser, Db};
use crate::error::{AppError, Result};
use crate::models::{Credentials, KeyPair, Token, User, Username};
use crate::time_utils::now_millis;
use crate::validate::validate_username;

/// `userID` and a fresh token.
#[derive(Debug, Clone, Copy)]
pub struct Session {
    pub user_id: i64,
    pub token: Token,
}

/// Successful login: session plus the stored keys.
#[derive(Debug, Clone, Copy)]
pub struct LoginResult {
    pub session: Session,
    pub keys: KeyPair,
}

/// SHA-256 over the client password hash followed by the salt's LE bytes.
pub fn hash_password(password_hash: &[u8; 32], salt: i32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password_hash);
    hasher.update(salt.to_le_bytes());
    hasher.finalize().into()
}

fn password_matches(user: &User, password_hash: &[u8; 32]) -> bool {
    let computed = hash_password(password_hash, user.salt);
    computed[..].ct_eq(&user.password_hash_hash[..]).into()
}

/// Look up and verify a login. Unknown user and wrong password are the same
/// error.
fn verify(conn: &Connection, credentials: &Credentials) -> Result<User> {
    let user = db::users::get_by_username(conn, &credentials.username)?;
    match user {
        Some(user) if password_matches(&user, &credentials.password_hash) => Ok(user),
        _ => {
            tracing::info!(username = %credentials.username.display(), "Login rejected");
            Err(AppError::Unauthorized)
        }
    }
}

fn taken(err: rusqlite::Error) -> AppError {
    if db::is_constraint_violation(&err) {
        AppError::Conflict("username already registered".to_string())
    } else {
        err.into()
    }
}

/// Delete a user and everything it owns.
fn delete_user_in(conn: &Connection, user_id: i64) -> Result<()> {
    let tokens = db::tokens::delete_for_user(conn, user_id)?;
    let items = db::items::delete_all_for_user(conn, user_id)?;
    db::users::delete_cursors(conn, user_id)?;
    db::users::delete_user(conn, user_id)?;
    tracing::info!(user_id, tokens, items, "Deleted user");
    Ok(())
}

/// Account operations. Every operation runs in a single transaction.
#[derive(Clone)]
pub struct AuthManager {
    db: Db,
    tokens: TokenStore,
}

impl AuthManager {
    pub fn new(db: Db, tokens: TokenStore) -> Self {
        Self { db, tokens }
    }

    pub async fn register(&self, credentials: Credentials, keys: KeyPair) -> Result<Session> {
        validate_username(&credentials.username)?;
        let tokens = self.tokens.clone();

        self.db
            .call(move |conn| {
                let salt = tokens.generate_salt()?;
                let hash = hash_password(&credentials.password_hash, salt);
                let now = now_millis();

                let tx = conn.transaction()?;
                let user_id = db::users::insert_user(
                    &tx,
                    &NewUser {
                        username: &credentials.username,
                        password_hash_hash: &hash,
                        salt,
                        keys: &keys,
                        now,
                    },
                )
                .map_err(taken)?;
                db::users::insert_cursors(&tx, user_id)?;
                let token = tokens.issue_in(&tx, user_id, now)?;
                tx.commit()?;

                tracing::info!(user_id, username = %credentials.username.display(), "Registered user");
                Ok(Session { user_id, token })
            })
            .await
    }

    pub async fn login(&self, credentials: Credentials) -> Result<LoginResult> {
        validate_username(&credentials.username)?;
        let tokens = self.tokens.clone();

        self.db
            .call(move |conn| {
                let now = now_millis();
                let tx = conn.transaction()?;
                let user = verify(&tx, &credentials)?;
                db::users::set_last_login(&tx, user.user_id, now)?;
                let token = tokens.issue_in(&tx, user.user_id, now)?;
                tx.commit()?;

                tracing::info!(user_id = user.user_id, "User logged in");
                Ok(LoginResult {
                    session: Session {
                        user_id: user.user_id,
                        token,
                    },
                    keys: user.keys,
                })
            })
            .await
    }

    /// Rotate username, password, and keys. Every existing token is dropped and
    /// exactly one new one issued.
    pub async fn change_credentials(
        &self,
        old: Credentials,
        new: Credentials,
        keys: KeyPair,
    ) -> Result<Session> {
        validate_username(&old.username)?;
        validate_username(&new.username)?;
        let tokens = self.tokens.clone();

        self.db
            .call(move |conn| {
                let salt = tokens.generate_salt()?;
                let hash = hash_password(&new.password_hash, salt);
                let now = now_millis();

                let tx = conn.transaction()?;
                let user = verify(&tx, &old)?;
                db::users::update_credentials(
                    &tx,
                    user.user_id,
                    &NewUser {
                        username: &new.username,
                        password_hash_hash: &hash,
                        salt,
                        keys: &keys,
                        now,
                    },
                )
                .map_err(taken)?;
                let revoked = db::tokens::delete_for_user(&tx, user.user_id)?;
                let token = tokens.issue_in(&tx, user.user_id, now)?;
                tx.commit()?;

                tracing::info!(user_id = user.user_id, revoked, "Credentials changed");
                Ok(Session {
                    user_id: user.user_id,
                    token,
                })
            })
            .await
    }

    /// Remove an account by username. Returns `false` if it did not exist.
    pub async fn delete_user(&self, username: Username) -> Result<bool> {
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let Some(user) = db::users::get_by_username(&tx, &username)? else {
                    return Ok(false);
                };
                delete_user_in(&tx, user.user_id)?;
                tx.commit()?;
                Ok(true)
            })
            .await
    }

    /// Remove the account identified by a valid login.
    pub async fn delete_account(&self, credentials: Credentials) -> Result<()> {
        validate_username(&credentials.username)?;

        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let user = verify(&tx, &credentials)?;
                delete_user_in(&tx, user.user_id)?;
                tx.commit()?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn manager() -> (AuthManager, TokenStore, Db) {
        let db = Db::open_in_memory().unwrap();
        let tokens = TokenStore::new(db.clone(), &Config::test_default());
        (AuthManager::new(db.clone(), tokens.clone()), tokens, db)
    }

    fn creds(name: &str, hash: u8) -> Credentials {
        Credentials {
            username: Username::padded(name).unwrap(),
            password_hash: [hash; 32],
        }
    }

    fn keys(byte: u8) -> KeyPair {
        KeyPair {
            key1: [byte; 32],
            key2: [byte + 1; 32],
        }
    }

    #[test]
    fn test_hash_password_depends_on_salt() {
        let hash = [7u8; 32];
        assert_eq!(hash_password(&hash, 1), hash_password(&hash, 1));
        assert_ne!(hash_password(&hash, 1), hash_password(&hash, 2));

        let mut expected = Sha256::new();
        expected.update([7u8; 32]);
        expected.update([1, 0, 0, 0]);
        let expected: [u8; 32] = expected.finalize().into();
        assert_eq!(hash_password(&hash, 1), expected);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (auth, tokens, _) = manager();
        let session = auth.register(creds("alice", 1), keys(10)).await.unwrap();
        assert!(tokens.validate(session.user_id, session.token).await.unwrap());

        let login = auth.login(creds("alice", 1)).await.unwrap();
        assert_eq!(login.session.user_id, session.user_id);
        assert_eq!(login.keys, keys(10));
        assert_ne!(login.session.token, session.token);
    }

    #[tokio::test]
    async fn test_bad_login_is_unauthorized() {
        let (auth, _, _) = manager();
        auth.register(creds("alice", 1), keys(10)).await.unwrap();

        for bad in [creds("alice", 2), creds("alicf", 1), creds("bob", 2)] {
            assert!(matches!(auth.login(bad).await, Err(AppError::Unauthorized)));
        }
        assert!(auth.login(creds("alice", 1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_register_conflicts() {
        let (auth, _, _) = manager();
        auth.register(creds("alice", 1), keys(10)).await.unwrap();
        assert!(matches!(
            auth.register(creds("alice", 2), keys(20)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_reserved_byte_rejected_before_storage() {
        let (auth, _, _) = manager();
        let mut bytes = *Username::padded("al").unwrap().as_bytes();
        bytes[2] = 0;
        let bad = Credentials {
            username: Username::from_bytes(bytes),
            password_hash: [1; 32],
        };
        assert!(matches!(
            auth.register(bad.clone(), keys(1)).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(auth.login(bad).await, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_change_credentials_rotates_everything() {
        let (auth, tokens, _) = manager();
        let first = auth.register(creds("alice", 1), keys(10)).await.unwrap();
        let second = auth.login(creds("alice", 1)).await.unwrap().session;

        let rotated = auth
            .change_credentials(creds("alice", 1), creds("alice2", 5), keys(30))
            .await
            .unwrap();
        assert_eq!(rotated.user_id, first.user_id);
        assert!(!tokens.validate(first.user_id, first.token).await.unwrap());
        assert!(!tokens.validate(second.user_id, second.token).await.unwrap());
        assert!(tokens.validate(rotated.user_id, rotated.token).await.unwrap());

        assert!(auth.login(creds("alice", 1)).await.is_err());
        let login = auth.login(creds("alice2", 5)).await.unwrap();
        assert_eq!(login.keys, keys(30));
    }

    #[tokio::test]
    async fn test_change_credentials_collision_is_atomic() {
        let (auth, tokens, _) = manager();
        let alice = auth.register(creds("alice", 1), keys(10)).await.unwrap();
        auth.register(creds("bob", 2), keys(20)).await.unwrap();

        assert!(matches!(
            auth.change_credentials(creds("alice", 1), creds("bob", 3), keys(30))
                .await,
            Err(AppError::Conflict(_))
        ));
        assert!(tokens.validate(alice.user_id, alice.token).await.unwrap());
        assert!(auth.login(creds("alice", 1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let (auth, tokens, store) = manager();
        let session = auth.register(creds("alice", 1), keys(10)).await.unwrap();
        let user_id = session.user_id;

        assert!(auth
            .delete_user(Username::padded("alice").unwrap())
            .await
            .unwrap());
        assert!(!tokens.validate(user_id, session.token).await.unwrap());
        let cursors = store
            .call(move |conn| Ok(db::users::get_cursors(conn, user_id)?))
            .await
            .unwrap();
        assert!(cursors.is_none());
        assert!(!auth
            .delete_user(Username::padded("alice").unwrap())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_account_requires_password() {
        let (auth, _, _) = manager();
        auth.register(creds("alice", 1), keys(10)).await.unwrap();
        assert!(auth.delete_account(creds("alice", 2)).await.is_err());
        auth.delete_account(creds("alice", 1)).await.unwrap();
        assert!(auth.login(creds("alice", 1)).await.is_err());
    }
}
