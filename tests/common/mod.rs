//! Shared harness: scripted mechanisms, a real listener on an ephemeral port, and a
//! reqwest client that does not follow redirects.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use authware::config::AuthConfig;
use authware::http::AuthState;
use authware::identity::{Authenticator, Registry, factory};
use authware::{AuthError, AuthResult, SessionCodec};

pub const SESSION_KEY: &str = "integration-test-key";

/// Mechanism that rejects every credential.
pub struct AlwaysReject(pub &'static str);

#[async_trait]
impl Authenticator for AlwaysReject {
    async fn check_password(&self, _user: &str, _pass: &str) -> AuthResult<()> {
        Err(AuthError::Unauthenticated)
    }

    async fn groups_of(&self, _user: &str) -> AuthResult<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    fn name(&self) -> &str { self.0 }
}

/// Mechanism that accepts exactly one user/password pair.
pub struct OneUser {
    pub name: &'static str,
    pub user: &'static str,
    pub pass: &'static str,
    pub groups: &'static [&'static str],
}

#[async_trait]
impl Authenticator for OneUser {
    async fn check_password(&self, user: &str, pass: &str) -> AuthResult<()> {
        if user == self.user && pass == self.pass { Ok(()) } else { Err(AuthError::Unauthenticated) }
    }

    async fn groups_of(&self, _user: &str) -> AuthResult<BTreeSet<String>> {
        Ok(self.groups.iter().map(|g| g.to_string()).collect())
    }

    fn name(&self) -> &str { self.name }
}

/// Registry with `A` (rejects everything) and `B` (accepts alice/secret, group staff).
pub fn registry() -> Registry {
    let mut reg = Registry::new();
    reg.register("A", factory(|| Ok(Arc::new(AlwaysReject("A")) as Arc<dyn Authenticator>)));
    reg.register("B", factory(|| {
        Ok(Arc::new(OneUser { name: "B", user: "alice", pass: "secret", groups: &["staff"] }) as Arc<dyn Authenticator>)
    }));
    reg
}

pub fn state() -> AuthState {
    let config = AuthConfig::default()
        .with_mechanisms(["A", "B"])
        .with_session_key(SESSION_KEY)
        .with_default_next("/logged-in/");
    AuthState::from_registry(&registry(), config).expect("auth state")
}

/// Codec sharing the test key, for inspecting and forging cookies.
pub fn codec() -> SessionCodec {
    SessionCodec::new(SESSION_KEY.as_bytes()).expect("codec")
}

/// Serve the demo router for `state` and return its base URL.
pub async fn spawn(state: AuthState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, authware::server::router(state)).await.expect("serve");
    });
    format!("http://{}", addr)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}

/// Value of the `session` cookie in a Set-Cookie header, if any.
pub fn session_set_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .map(|v| v.to_string())
}

pub fn cookie_token(set_cookie: &str) -> String {
    let first = set_cookie.split(';').next().unwrap_or_default();
    first.trim_start_matches("session=").to_string()
}

pub fn location(resp: &reqwest::Response) -> String {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
