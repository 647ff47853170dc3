use std::collections::BTreeSet;

use serde::Serialize;

/// Normalized identity produced by a successful authenticator check.
///
/// There is no public constructor: a `User` comes out of [`super::Chain::authenticate`]
/// or out of a session token that was sealed around one. It cannot be deserialized
/// from outside the crate either:
///
/// ```compile_fail
/// let forged: authware::User = serde_json::from_str(
///     r#"{"identity":"root","groups":["admin"],"authed_by":"memory"}"#,
/// ).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct User {
    /// Whatever the caller presented as the user identifier. Not guaranteed to
    /// match the canonical form any backend uses internally.
    identity: String,
    /// Bare group names (no DN or path decoration).
    groups: BTreeSet<String>,
    /// Name of the mechanism that accepted the credential.
    authed_by: String,
}

impl User {
    pub(crate) fn new(identity: String, groups: BTreeSet<String>, authed_by: String) -> Self {
        Self { identity, groups, authed_by }
    }

    pub fn identity(&self) -> &str { &self.identity }

    pub fn groups(&self) -> &BTreeSet<String> { &self.groups }

    pub fn authed_by(&self) -> &str { &self.authed_by }

    pub fn in_group(&self, group: &str) -> bool { self.groups.contains(group) }
}
