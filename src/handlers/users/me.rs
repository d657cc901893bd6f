use axum::extract::State;

use crate::database::models::{User, UserChanges};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::{policy, Target};
use crate::AppState;

use super::UpdateUser;

fn own_profile(caller: &Caller) -> Result<&User, ApiError> {
    let rule = policy::own_profile();
    rule.check(&caller.ctx)?;
    let user = caller.user()?;
    rule.check_object(&caller.ctx, &Target::Profile(user.id))?;
    Ok(user)
}

/// GET /api/v1/users/me
pub async fn get(caller: Caller) -> ApiResult<User> {
    let user = own_profile(&caller)?;
    Ok(ApiResponse::success(user.clone()))
}

/// PATCH /api/v1/users/me - role is only writable by admins
pub async fn patch(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<UpdateUser>,
) -> ApiResult<User> {
    let user = own_profile(&caller)?;
    let body = body.validated()?;

    let mut changes = UserChanges::from(body);
    if changes.role.is_some() && !caller.ctx.principal.as_ref().is_some_and(|p| p.is_admin()) {
        tracing::debug!("Ignoring role change requested by {} on own profile", user.username);
        changes.role = None;
    }

    let updated = state
        .store
        .update_user(user.id, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::success(updated))
}
