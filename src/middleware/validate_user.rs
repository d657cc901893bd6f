use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::convert::Infallible;

use super::auth::AuthUser;
use crate::database::models::User;
use crate::error::ApiError;
use crate::permissions::{AccessContext, Principal};
use crate::AppState;

/// The stored user behind a verified token
#[derive(Clone, Debug)]
pub struct ValidatedUser(pub User);

impl ValidatedUser {
    pub fn principal(&self) -> Principal {
        Principal::from(&self.0)
    }
}

/// Middleware that resolves the token's user against the store so that
/// role changes and deletions take effect immediately
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(auth_user) = request.extensions().get::<AuthUser>().cloned() else {
        return Ok(next.run(request).await);
    };

    let user = state.store.user_by_id(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(
            "User validation failed: user {} <{}> no longer exists",
            auth_user.user_id,
            auth_user.email
        );
        ApiError::unauthorized("User not found")
    })?;

    if user.role != auth_user.role {
        tracing::debug!(
            "User {} role changed from {} to {} since token issue",
            user.username,
            auth_user.role,
            user.role
        );
    }

    request.extensions_mut().insert(ValidatedUser(user));
    Ok(next.run(request).await)
}

/// Handler-side view of who is calling: the validated user, if any, and the
/// access context the permission rules run against
#[derive(Clone, Debug)]
pub struct Caller {
    pub user: Option<User>,
    pub ctx: AccessContext,
}

impl Caller {
    /// The signed-in user; 401 for anonymous callers
    pub fn user(&self) -> Result<&User, ApiError> {
        self.user
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Authentication credentials were not provided"))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<ValidatedUser>().map(|v| v.0.clone());
        let ctx = AccessContext::new(user.as_ref().map(Principal::from), parts.method.clone());
        Ok(Self { user, ctx })
    }
}
