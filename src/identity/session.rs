use std::collections::BTreeSet;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::user::User;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};

const NONCE_LEN: usize = 12;
// 16-byte GCM tag plus at least one byte of ciphertext
const MIN_SEALED_LEN: usize = NONCE_LEN + 17;

/// Identity plus expiry, carried inside the session cookie.
/// A refreshed session is a new value; nothing mutates one in place.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user: User, expires_at: DateTime<Utc>) -> Self { Self { user, expires_at } }

    /// Session starting now and lasting `lifetime`. Fails when the expiry is out of range.
    pub fn issue(user: User, lifetime: Duration) -> AuthResult<Self> {
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::Codec(format!("session lifetime {} out of range", lifetime)))?;
        Ok(Self::new(user, expires_at))
    }

    /// Valid strictly before `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool { now < self.expires_at }

    pub fn is_valid(&self) -> bool { self.is_valid_at(Utc::now()) }

    /// `Ok(self)` while live, `SessionExpired` otherwise.
    pub fn check_live_at(self, now: DateTime<Utc>) -> AuthResult<Self> {
        if self.is_valid_at(now) { Ok(self) } else { Err(AuthError::SessionExpired) }
    }
}

/// Seals sessions into opaque URL-safe tokens with AES-256-GCM.
///
/// Token layout is `base64url(nonce || ciphertext || tag)` with a fresh random nonce per
/// token. The tag covers the whole ciphertext, so any altered byte fails to open.
#[derive(Clone)]
pub struct SessionCodec {
    cipher: Aes256Gcm,
}

// Sealed payload shape. Only the codec turns it back into a `User`.
#[derive(Deserialize)]
struct SessionWire {
    user: UserWire,
    expires_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct UserWire {
    identity: String,
    #[serde(default)]
    groups: BTreeSet<String>,
    authed_by: String,
}

impl From<SessionWire> for Session {
    fn from(w: SessionWire) -> Self {
        let UserWire { identity, groups, authed_by } = w.user;
        Session::new(User::new(identity, groups, authed_by), w.expires_at)
    }
}

impl SessionCodec {
    /// Derive the AES key as SHA-256 of the supplied key material.
    pub fn new(key_material: &[u8]) -> AuthResult<Self> {
        let key = Sha256::digest(key_material);
        let cipher = Aes256Gcm::new_from_slice(key.as_slice())
            .map_err(|e| AuthError::Codec(format!("invalid key length: {}", e)))?;
        Ok(Self { cipher })
    }

    /// Random per-process key. Every session issued under it dies with the process.
    pub fn ephemeral() -> AuthResult<Self> {
        let mut key = [0u8; 32];
        getrandom::getrandom(&mut key).map_err(|e| AuthError::Codec(e.to_string()))?;
        Self::new(&key)
    }

    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        match config.session_key.as_deref() {
            Some(k) if !k.is_empty() => Self::new(k.as_bytes()),
            _ => {
                warn!("no session key configured, generating an ephemeral one; sessions will not survive a restart");
                Self::ephemeral()
            }
        }
    }

    pub fn encode(&self, session: &Session) -> AuthResult<String> {
        let plain = serde_json::to_vec(session).map_err(|e| AuthError::Codec(e.to_string()))?;
        self.seal(&plain)
    }

    fn seal(&self, plain: &[u8]) -> AuthResult<String> {
        let mut nonce = [0u8; NONCE_LEN];
        getrandom::getrandom(&mut nonce).map_err(|e| AuthError::Codec(e.to_string()))?;
        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plain)
            .map_err(|_| AuthError::Codec("encryption failed".into()))?;
        let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&sealed);
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(out))
    }

    /// Open a token. Does not look at `expires_at`; callers decide liveness.
    pub fn decode(&self, token: &str) -> AuthResult<Session> {
        let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| AuthError::InvalidToken)?;
        if raw.len() < MIN_SEALED_LEN {
            return Err(AuthError::InvalidToken);
        }
        let (nonce, sealed) = raw.split_at(NONCE_LEN);
        let plain = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), sealed)
            .map_err(|_| AuthError::InvalidToken)?;
        let wire: SessionWire = serde_json::from_slice(&plain).map_err(|_| AuthError::InvalidToken)?;
        Ok(wire.into())
    }

    /// Decode and require the session to be live now.
    pub fn decode_live(&self, token: &str) -> AuthResult<Session> {
        self.decode(token)?.check_live_at(Utc::now())
    }
}

impl std::fmt::Debug for SessionCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionCodec { .. }")
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
