use axum::extract::{OriginalUri, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{AuthState, SESSION_COOKIE, parse_cookie};
use crate::error::{AuthError, AuthResult};
use crate::identity::{AuthScheme, RequestContext, Session, SessionCodec};

const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub(crate) fn session_cookie(token: &str, expires: DateTime<Utc>) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Expires={}",
        SESSION_COOKIE,
        token,
        expires.format(HTTP_DATE)
    )
}

pub(crate) fn expired_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        SESSION_COOKIE
    )
}

/// `<login_path>?next=<target>` with the target percent-encoded.
pub(crate) fn login_redirect(login_path: &str, target: &str) -> String {
    let sep = if login_path.contains('?') { '&' } else { '?' };
    format!("{}{}next={}", login_path, sep, urlencoding::encode(target))
}

/// Live session from the request cookie. A missing cookie reads as an invalid token.
pub(crate) fn session_from_headers(codec: &SessionCodec, headers: &HeaderMap) -> AuthResult<Session> {
    let token = parse_cookie(headers, SESSION_COOKIE).ok_or(AuthError::InvalidToken)?;
    codec.decode_live(&token)
}

/// Require a live session cookie; otherwise redirect to the login page, keeping the
/// requested location in `next`.
pub async fn require_session(State(state): State<AuthState>, req: Request, next: Next) -> Response {
    session_flow(&state, req, next).await
}

pub(crate) async fn session_flow(state: &AuthState, mut req: Request, next: Next) -> Response {
    match session_from_headers(&state.codec, req.headers()) {
        Ok(session) => {
            let ctx = RequestContext::new(session.user, AuthScheme::Session);
            debug!(user = %ctx.user.identity(), request_id = %ctx.request_id, "session accepted");
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => {
            // Nested routers strip their prefix from the request uri
            let uri = req.extensions().get::<OriginalUri>().map(|o| o.0.clone()).unwrap_or_else(|| req.uri().clone());
            let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            debug!(reason = %e.code_str(), path = %target, "no valid session, redirecting to login");
            Redirect::to(&login_redirect(&state.config.login_path, target)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn cookie_attributes() {
        let t = Utc.with_ymd_and_hms(2030, 3, 4, 5, 6, 7).unwrap();
        let c = session_cookie("tok", t);
        assert_eq!(c, "session=tok; Path=/; HttpOnly; SameSite=Lax; Expires=Mon, 04 Mar 2030 05:06:07 GMT");
    }

    #[test]
    fn expired_cookie_clears_value() {
        let c = expired_session_cookie();
        assert!(c.starts_with("session=;"));
        assert!(c.contains("Max-Age=0"));
        assert!(c.contains("Path=/"));
    }

    #[test]
    fn login_redirect_encodes_target() {
        assert_eq!(login_redirect("/login", "/logged-in/"), "/login?next=%2Flogged-in%2F");
        assert_eq!(login_redirect("/login?theme=x", "/a?b=c"), "/login?theme=x&next=%2Fa%3Fb%3Dc");
    }

    #[test]
    fn missing_cookie_is_invalid_token() {
        let codec = SessionCodec::ephemeral().unwrap();
        assert!(matches!(session_from_headers(&codec, &HeaderMap::new()), Err(AuthError::InvalidToken)));
    }
}
