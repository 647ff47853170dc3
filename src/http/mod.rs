//! axum integration: Basic and cookie middleware, the scheme router, and the login /
//! logout handlers.
//!
//! Middleware functions are meant for `axum::middleware::from_fn_with_state` with an
//! [`AuthState`]; on success they put a [`RequestContext`] into the request extensions.

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::config::AuthConfig;
use crate::error::AuthResult;
use crate::identity::{Chain, Registry, SessionCodec};

mod basic;
mod cookie;
mod login;
mod multi;

pub use basic::require_basic;
pub use cookie::require_session;
pub use login::{LoginOutcome, login_form, logout, process_login};
pub use multi::require_any;
pub use crate::identity::{AuthScheme, RequestContext};

pub const SESSION_COOKIE: &str = "session";
pub const BASIC_CHALLENGE: &str = r#"Basic realm="restricted", charset="UTF-8""#;

/// Shared state injected into the auth middleware and handlers.
/// Built once at startup; read-only afterwards.
#[derive(Clone, Debug)]
pub struct AuthState {
    pub chain: Arc<Chain>,
    pub codec: Arc<SessionCodec>,
    pub config: Arc<AuthConfig>,
}

impl AuthState {
    pub fn new(chain: Chain, codec: SessionCodec, config: AuthConfig) -> Self {
        Self { chain: Arc::new(chain), codec: Arc::new(codec), config: Arc::new(config) }
    }

    /// Initialize the configured mechanisms from `registry` and the session codec from
    /// the configured key (or an ephemeral one).
    pub fn from_registry(registry: &Registry, config: AuthConfig) -> AuthResult<Self> {
        let chain = Chain::from_registry(registry, &config.mechanisms)?;
        let codec = SessionCodec::from_config(&config)?;
        Ok(Self::new(chain, codec, config))
    }
}

pub(crate) fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for cookie in headers.get_all(axum::http::header::COOKIE) {
        let Ok(s) = cookie.to_str() else { continue; };
        for part in s.split(';') {
            let p = part.trim();
            if let Some((k, v)) = p.split_once('=') {
                if k.trim() == name && !v.is_empty() { return Some(v.to_string()); }
            }
        }
    }
    None
}
