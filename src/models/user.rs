// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model and credential types.

/// Width of fixed text fields on the wire.
pub const USERNAME_LEN: usize = 32;
/// Right-padding byte for fixed text fields.
pub const PAD_BYTE: u8 = b' ';
/// Byte that must never appear inside a fixed text field.
pub const RESERVED_BYTE: u8 = 0x00;

/// Fixed-width, space-padded username exactly as sent by the client.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Username([u8; USERNAME_LEN]);

impl Username {
    pub fn from_bytes(bytes: [u8; USERNAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a padded username from text. Returns `None` if it does not fit.
    pub fn padded(name: &str) -> Option<Self> {
        let raw = name.as_bytes();
        if raw.len() > USERNAME_LEN {
            return None;
        }
        let mut bytes = [PAD_BYTE; USERNAME_LEN];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; USERNAME_LEN] {
        &self.0
    }

    pub fn contains_reserved(&self) -> bool {
        self.0.contains(&RESERVED_BYTE)
    }

    /// Lossy, trimmed rendering for logs.
    pub fn display(&self) -> String {
        let end = self
            .0
            .iter()
            .rposition(|&b| b != PAD_BYTE)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl std::fmt::Debug for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Username").field(&self.display()).finish()
    }
}

/// Username plus the client-side password hash.
#[derive(Clone)]
pub struct Credentials {
    pub username: Username,
    pub password_hash: [u8; 32],
}

/// The two encrypted private keys a client stores server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPair {
    pub key1: [u8; 32],
    pub key2: [u8; 32],
}

/// Account row.
#[derive(Debug, Clone)]
pub struct User {
    /// Server-assigned, immutable
    pub user_id: i64,
    /// Unique, changeable through credential rotation
    pub username: Username,
    /// SHA-256(password hash || salt)
    pub password_hash_hash: [u8; 32],
    pub salt: i32,
    pub keys: KeyPair,
    /// Last credential write (ms)
    pub last_updated: i64,
    /// Last successful login (ms)
    pub last_login: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_username() {
        let name = Username::padded("alice").unwrap();
        assert_eq!(&name.as_bytes()[..5], b"alice");
        assert!(name.as_bytes()[5..].iter().all(|&b| b == PAD_BYTE));
        assert_eq!(name.display(), "alice");
        assert!(!name.contains_reserved());
    }

    #[test]
    fn test_username_too_long() {
        assert!(Username::padded(&"x".repeat(33)).is_none());
        assert!(Username::padded(&"x".repeat(32)).is_some());
    }

    #[test]
    fn test_reserved_byte_detected() {
        let mut bytes = [PAD_BYTE; USERNAME_LEN];
        bytes[..3].copy_from_slice(b"bob");
        bytes[10] = RESERVED_BYTE;
        assert!(Username::from_bytes(bytes).contains_reserved());
    }
}
