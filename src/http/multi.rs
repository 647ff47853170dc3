use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::http::header::WWW_AUTHENTICATE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use super::basic::{basic_credentials, basic_flow};
use super::cookie::session_flow;
use super::{AuthState, BASIC_CHALLENGE, SESSION_COOKIE, parse_cookie};

/// Pick exactly one scheme by what the request presents: Basic header first, then the
/// session cookie. With neither the request is rejected outright.
pub async fn require_any(State(state): State<AuthState>, req: Request, next: Next) -> Response {
    if basic_credentials(req.headers()).is_some() {
        debug!("basic auth supplied");
        return basic_flow(&state, req, next).await;
    }
    if parse_cookie(req.headers(), SESSION_COOKIE).is_some() {
        debug!("cookie auth supplied");
        return session_flow(&state, req, next).await;
    }
    debug!(path = %req.uri().path(), "no supported auth scheme supplied");
    (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, BASIC_CHALLENGE)], "Authentication Required\n").into_response()
}
