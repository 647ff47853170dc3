use std::collections::HashMap;

use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Query, State};
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::Duration;
use tracing::{debug, error, info};

use super::AuthState;
use super::cookie::{expired_session_cookie, session_cookie};
use crate::error::AuthError;
use crate::identity::Session;

/// Result of one pass through the login form flow.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Credentials accepted: set `cookie` and redirect to `location`.
    Granted { cookie: String, location: String },
    Denied(AuthError),
    /// Form did not carry the configured fields.
    BadRequest(String),
}

impl IntoResponse for LoginOutcome {
    fn into_response(self) -> Response {
        match self {
            LoginOutcome::Granted { cookie, location } => {
                ([(SET_COOKIE, cookie)], Redirect::to(&location)).into_response()
            }
            LoginOutcome::Denied(e) => e.into_response(),
            LoginOutcome::BadRequest(msg) => AuthError::BadRequest(msg).into_response(),
        }
    }
}

/// Only local absolute paths are followed after login.
/// Browsers drop tabs and newlines and read a backslash as `/`, so those never pass.
pub(crate) fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/') && !n.starts_with("//") && !n.chars().any(|c| c.is_control() || c == '\\')
    })
}

/// Run the login flow over already-parsed form fields.
pub async fn process_login(state: &AuthState, fields: &HashMap<String, String>, next: Option<&str>) -> LoginOutcome {
    let cfg = &state.config;
    let (Some(user), Some(pass)) = (fields.get(&cfg.user_field), fields.get(&cfg.pass_field)) else {
        return LoginOutcome::BadRequest(format!("Form must contain {} and {} as fields", cfg.user_field, cfg.pass_field));
    };

    let user = match state.chain.authenticate(user, pass).await {
        Ok(u) => u,
        Err(e) => {
            debug!(user = %user, "denying login after no auth method matched");
            return LoginOutcome::Denied(e);
        }
    };

    let sealed = Session::issue(user, cfg.session_lifetime).and_then(|session| {
        // Outlive the session slightly so the browser still sends it while it is refreshed
        let cookie_expiry = session
            .expires_at
            .checked_add_signed(Duration::minutes(1))
            .ok_or_else(|| AuthError::Codec("cookie expiry out of range".into()))?;
        let token = state.codec.encode(&session)?;
        Ok((session, session_cookie(&token, cookie_expiry)))
    });
    let (session, cookie) = match sealed {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "error creating session cookie");
            return LoginOutcome::Denied(e);
        }
    };

    let location = match safe_next(next) {
        Some(n) => n.to_string(),
        None => {
            debug!("default value for next used on login");
            cfg.default_next.clone()
        }
    };
    info!(user = %session.user.identity(), mechanism = %session.user.authed_by(), "login granted");
    LoginOutcome::Granted { cookie, location }
}

/// POST handler for a login form (`application/x-www-form-urlencoded`).
/// `next` is read from the query string first, then from the form.
pub async fn login_form(
    State(state): State<AuthState>,
    Query(query): Query<HashMap<String, String>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> LoginOutcome {
    let cfg = &state.config;
    let fields = match form {
        Ok(Form(f)) => f,
        Err(e) => {
            debug!(error = %e, "unparseable login form");
            return LoginOutcome::BadRequest(format!("Form must contain {} and {} as fields", cfg.user_field, cfg.pass_field));
        }
    };
    let next = query.get("next").or_else(|| fields.get("next")).map(String::as_str);
    process_login(&state, &fields, next).await
}

/// Clear the session cookie and send the caller to the configured landing path.
/// Safe to call any number of times.
pub async fn logout(State(state): State<AuthState>) -> Response {
    ([(SET_COOKIE, expired_session_cookie())], Redirect::to(&state.config.logout_redirect)).into_response()
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod login_tests;
