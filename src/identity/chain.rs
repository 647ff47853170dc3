use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, error, warn};

use super::authenticator::Authenticator;
use super::registry::Registry;
use super::user::User;
use crate::error::{AuthError, AuthResult};

/// Ordered list of constructed authenticators. Order is configuration order and the
/// first backend to accept a credential wins, so earlier backends shadow later ones
/// on username collisions.
///
/// Built once before traffic starts and only read afterwards.
#[derive(Clone, Default)]
pub struct Chain {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl Chain {
    pub fn new(authenticators: Vec<Arc<dyn Authenticator>>) -> Self { Self { authenticators } }

    /// Initialize every mechanism in `names` from the registry, in order.
    /// The first initialization failure aborts the whole chain.
    pub fn from_registry<S: AsRef<str>>(registry: &Registry, names: &[S]) -> AuthResult<Self> {
        let mut authenticators = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match registry.initialize(name) {
                Ok(a) => authenticators.push(a),
                Err(e) => {
                    error!(mechanism = %name, error = %e, "could not initialize auth mechanism");
                    return Err(e);
                }
            }
        }
        Ok(Self { authenticators })
    }

    /// Try each authenticator in order and stop at the first that accepts.
    ///
    /// A group lookup failure after an accepted password leaves the user with no groups
    /// rather than failing the login.
    pub async fn authenticate(&self, user: &str, pass: &str) -> AuthResult<User> {
        for a in &self.authenticators {
            debug!(mechanism = %a.name(), "attempting authentication");
            match a.check_password(user, pass).await {
                Ok(()) => {
                    let groups = match a.groups_of(user).await {
                        Ok(g) => g,
                        Err(e) => {
                            warn!(mechanism = %a.name(), error = %e, "error while retrieving user groups");
                            BTreeSet::new()
                        }
                    };
                    debug!(mechanism = %a.name(), user = %user, "authenticated");
                    return Ok(User::new(user.to_string(), groups, a.name().to_string()));
                }
                Err(AuthError::Unauthenticated) => {}
                Err(e) => {
                    error!(mechanism = %a.name(), error = %e, "backend failure during authentication");
                }
            }
        }
        debug!(user = %user, "no auth mechanism matched");
        Err(AuthError::Unauthenticated)
    }

    pub fn len(&self) -> usize { self.authenticators.len() }

    pub fn is_empty(&self) -> bool { self.authenticators.is_empty() }

    pub fn names(&self) -> Vec<&str> { self.authenticators.iter().map(|a| a.name()).collect() }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("mechanisms", &self.names()).finish()
    }
}

#[cfg(test)]
#[path = "chain_tests.rs"]
mod chain_tests;
