use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AuthResult;

/// Authenticator checks a credential pair against one identity backend.
///
/// `check_password` returns `Err(AuthError::Unauthenticated)` when the backend simply
/// does not accept the pair; that is the normal rejection and must not be logged as an
/// error. Anything else (`AuthError::Backend`) is an operational failure. Either way the
/// chain moves on to the next authenticator.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn check_password(&self, user: &str, pass: &str) -> AuthResult<()>;

    async fn groups_of(&self, user: &str) -> AuthResult<BTreeSet<String>>;

    fn name(&self) -> &str;
}

/// Zero-argument constructor stored in the [`super::Registry`].
pub type Factory = Arc<dyn Fn() -> anyhow::Result<Arc<dyn Authenticator>> + Send + Sync>;

/// Wrap a closure as a registry factory.
pub fn factory<F>(f: F) -> Factory
where
    F: Fn() -> anyhow::Result<Arc<dyn Authenticator>> + Send + Sync + 'static,
{
    Arc::new(f)
}
