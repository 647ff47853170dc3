//! Scripted authenticators shared by the unit tests of this module.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::Authenticator;
use crate::error::{AuthError, AuthResult};

pub(crate) enum Groups {
    Fixed(Vec<&'static str>),
    Fail,
}

pub(crate) struct Scripted {
    pub name: &'static str,
    /// `None` accepts nothing, `Some((user, pass))` accepts exactly that pair.
    pub accepts: Option<(&'static str, &'static str)>,
    pub broken: bool,
    pub groups: Groups,
    pub checks: AtomicUsize,
}

impl Scripted {
    pub fn rejecting(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name, accepts: None, broken: false, groups: Groups::Fixed(vec![]), checks: AtomicUsize::new(0) })
    }

    pub fn accepting(name: &'static str, user: &'static str, pass: &'static str, groups: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self { name, accepts: Some((user, pass)), broken: false, groups: Groups::Fixed(groups), checks: AtomicUsize::new(0) })
    }

    pub fn broken(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name, accepts: None, broken: true, groups: Groups::Fixed(vec![]), checks: AtomicUsize::new(0) })
    }

    pub fn with_failing_groups(name: &'static str, user: &'static str, pass: &'static str) -> Arc<Self> {
        Arc::new(Self { name, accepts: Some((user, pass)), broken: false, groups: Groups::Fail, checks: AtomicUsize::new(0) })
    }

    pub fn checks(&self) -> usize { self.checks.load(Ordering::SeqCst) }
}

#[async_trait]
impl Authenticator for Scripted {
    async fn check_password(&self, user: &str, pass: &str) -> AuthResult<()> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.broken {
            return Err(AuthError::backend(self.name, "backend unreachable"));
        }
        match self.accepts {
            Some((u, p)) if u == user && p == pass => Ok(()),
            _ => Err(AuthError::Unauthenticated),
        }
    }

    async fn groups_of(&self, _user: &str) -> AuthResult<BTreeSet<String>> {
        match &self.groups {
            Groups::Fixed(g) => Ok(g.iter().map(|s| s.to_string()).collect()),
            Groups::Fail => Err(AuthError::backend(self.name, "group search failed")),
        }
    }

    fn name(&self) -> &str { self.name }
}
