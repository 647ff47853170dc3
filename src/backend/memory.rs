//! In-process authenticator over argon2 PHC hashes.
//!
//! Built in code (no file parsing). The server binary registers one as `memory`, and it
//! is handy anywhere a fixed user table is enough.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use password_hash::{PasswordHash, SaltString};
use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::identity::{Authenticator, Factory};

#[derive(Debug, Clone)]
struct Entry {
    phc: String,
    groups: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct MemoryAuthenticator {
    name: String,
    users: HashMap<String, Entry>,
}

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

impl MemoryAuthenticator {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self { name: name.into(), users: HashMap::new() }
    }

    /// Add a user with a plaintext password (hashed here with argon2id).
    pub fn with_user<I, G>(self, user: &str, password: &str, groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        let phc = hash_password(password)?;
        self.with_hash(user, &phc, groups)
    }

    /// Add a user with an existing PHC string.
    pub fn with_hash<I, G>(mut self, user: &str, phc: &str, groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        PasswordHash::new(phc).map_err(|e| anyhow!("invalid password hash for '{}': {}", user, e))?;
        let groups = groups.into_iter().map(Into::into).collect();
        self.users.insert(user.to_string(), Entry { phc: phc.to_string(), groups });
        Ok(self)
    }

    pub fn add_group(&mut self, user: &str, group: &str) -> bool {
        match self.users.get_mut(user) {
            Some(e) => e.groups.insert(group.to_string()),
            None => false,
        }
    }

    pub fn len(&self) -> usize { self.users.len() }

    pub fn is_empty(&self) -> bool { self.users.is_empty() }

    /// Registry factory handing out clones of this configured instance.
    pub fn factory(self) -> Factory {
        let shared = Arc::new(self);
        Arc::new(move || Ok(shared.clone() as Arc<dyn Authenticator>))
    }
}

#[async_trait]
impl Authenticator for MemoryAuthenticator {
    async fn check_password(&self, user: &str, pass: &str) -> AuthResult<()> {
        let Some(entry) = self.users.get(user) else {
            debug!(mechanism = %self.name, user = %user, "unknown user");
            return Err(AuthError::Unauthenticated);
        };
        let parsed = PasswordHash::new(&entry.phc).map_err(|e| AuthError::backend(self.name.as_str(), e.to_string()))?;
        if Argon2::default().verify_password(pass.as_bytes(), &parsed).is_err() {
            debug!(mechanism = %self.name, user = %user, "user unauthenticated");
            return Err(AuthError::Unauthenticated);
        }
        Ok(())
    }

    async fn groups_of(&self, user: &str) -> AuthResult<BTreeSet<String>> {
        Ok(self.users.get(user).map(|e| e.groups.clone()).unwrap_or_default())
    }

    fn name(&self) -> &str { &self.name }
}
