//! Unified authentication error model and mapping helpers.
//! Every layer (registry, chain, session codec, HTTP flows) reports through `AuthError`;
//! the HTTP mapping keeps backend detail out of responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Configuration asked for a mechanism nobody registered.
    #[error("mechanism '{0}' is not registered")]
    MechanismNotFound(String),
    #[error("mechanism '{mechanism}' failed to initialize: {source}")]
    Init {
        mechanism: String,
        #[source]
        source: anyhow::Error,
    },
    /// Expected per-credential outcome. Never logged as an error.
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("backend '{mechanism}' failed: {message}")]
    Backend { mechanism: String, message: String },
    #[error("invalid session token")]
    InvalidToken,
    #[error("session expired")]
    SessionExpired,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("session codec error: {0}")]
    Codec(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl AuthError {
    pub fn backend<M: Into<String>, S: Into<String>>(mechanism: M, message: S) -> Self {
        AuthError::Backend { mechanism: mechanism.into(), message: message.into() }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::MechanismNotFound(_) => "mechanism_not_found",
            AuthError::Init { .. } => "mechanism_init_failed",
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::Backend { .. } => "backend_error",
            AuthError::InvalidToken => "invalid_token",
            AuthError::SessionExpired => "session_expired",
            AuthError::BadRequest(_) => "bad_request",
            AuthError::Codec(_) => "codec_error",
            AuthError::Config(_) => "config_error",
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated
            | AuthError::Backend { .. }
            | AuthError::InvalidToken
            | AuthError::SessionExpired => StatusCode::UNAUTHORIZED,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::MechanismNotFound(_)
            | AuthError::Init { .. }
            | AuthError::Codec(_)
            | AuthError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for outcomes the cookie flow treats the same as "no session".
    pub fn is_missing_session(&self) -> bool {
        matches!(self, AuthError::InvalidToken | AuthError::SessionExpired)
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        // Callers only ever see a generic denial; operators get the detail in the logs.
        let body = match &self {
            AuthError::BadRequest(msg) => format!("{}\n", msg),
            _ if status == StatusCode::UNAUTHORIZED => "Access Denied\n".to_string(),
            _ => "Internal Server Error\n".to_string(),
        };
        (status, body).into_response()
    }
}
