use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use super::User;
use crate::error::AuthError;

/// Which credential scheme resolved the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Basic,
    Session,
}

/// Resolved identity for one request, stored in the request extensions by the
/// auth middleware and discarded with the request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user: User,
    pub scheme: AuthScheme,
    pub request_id: Uuid,
}

impl RequestContext {
    pub fn new(user: User, scheme: AuthScheme) -> Self {
        Self { user, scheme, request_id: Uuid::new_v4() }
    }
}

/// Protected handlers take `RequestContext` as an argument. Behind a route with no auth
/// middleware the extractor answers 401 instead of running the handler.
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<RequestContext>().cloned().ok_or(AuthError::Unauthenticated)
    }
}
