use axum::extract::{Request, State};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use tracing::debug;

use super::{AuthState, BASIC_CHALLENGE};
use crate::identity::{AuthScheme, RequestContext};

/// Credentials from an `Authorization: Basic ...` header, if present and well formed.
pub(crate) fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") { return None; }
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (user, pass) = text.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Require HTTP Basic credentials accepted by the chain.
pub async fn require_basic(State(state): State<AuthState>, req: Request, next: Next) -> Response {
    basic_flow(&state, req, next).await
}

pub(crate) async fn basic_flow(state: &AuthState, mut req: Request, next: Next) -> Response {
    let Some((user, pass)) = basic_credentials(req.headers()) else {
        debug!(path = %req.uri().path(), "received request with no auth");
        return (
            StatusCode::UNAUTHORIZED,
            [(WWW_AUTHENTICATE, BASIC_CHALLENGE)],
            "HTTP Basic Authentication Required\n",
        )
            .into_response();
    };

    match state.chain.authenticate(&user, &pass).await {
        Ok(u) => {
            let ctx = RequestContext::new(u, AuthScheme::Basic);
            debug!(user = %ctx.user.identity(), mechanism = %ctx.user.authed_by(), request_id = %ctx.request_id, "basic auth granted");
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => {
            debug!(user = %user, "denying request after no auth method matched");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(v: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static(v));
        h
    }

    #[test]
    fn parses_basic_header() {
        // alice:se:cret
        let h = with_auth("Basic YWxpY2U6c2U6Y3JldA==");
        assert_eq!(basic_credentials(&h), Some(("alice".to_string(), "se:cret".to_string())));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let h = with_auth("basic YWxpY2U6c2VjcmV0");
        assert_eq!(basic_credentials(&h), Some(("alice".to_string(), "secret".to_string())));
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
        assert!(basic_credentials(&with_auth("Bearer YWxpY2U6c2VjcmV0")).is_none());
        assert!(basic_credentials(&with_auth("Basic !!!")).is_none());
        // "alice" without a colon
        assert!(basic_credentials(&with_auth("Basic YWxpY2U=")).is_none());
    }
}
