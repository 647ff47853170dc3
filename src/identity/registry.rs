use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, warn};

use super::authenticator::{Authenticator, Factory};
use crate::error::{AuthError, AuthResult};

/// Mapping from mechanism name to the factory that builds it.
///
/// Owned by whatever composes the process at startup and handed to consumers by
/// reference. Construction is not memoized: every `initialize` runs the factory again,
/// so callers that want a single instance keep the returned `Arc` (the chain does).
#[derive(Default, Clone)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    /// Register a factory under `name`. The first registration of a name wins; later
    /// ones are logged and dropped.
    pub fn register<S: Into<String>>(&mut self, name: S, factory: Factory) {
        let name = name.into();
        if self.factories.contains_key(&name) {
            warn!(mechanism = %name, "mechanism name collision, keeping first registration");
            return;
        }
        info!(mechanism = %name, "registered auth mechanism");
        self.factories.insert(name, factory);
    }

    /// Build a fresh authenticator for `name`.
    pub fn initialize(&self, name: &str) -> AuthResult<Arc<dyn Authenticator>> {
        let Some(f) = self.factories.get(name) else {
            error!(mechanism = %name, "non existent mechanism requested");
            return Err(AuthError::MechanismNotFound(name.to_string()));
        };
        f().map_err(|source| AuthError::Init { mechanism: name.to_string(), source })
    }

    pub fn contains(&self, name: &str) -> bool { self.factories.contains_key(name) }

    /// Registered mechanism names, sorted.
    pub fn mechanisms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("mechanisms", &self.mechanisms()).finish()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod registry_tests;
