use axum::extract::{Path, State};

use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::{policy, Target};
use crate::AppState;

use super::UpdateUser;

async fn load(state: &AppState, caller: &Caller, username: &str) -> Result<User, ApiError> {
    let rule = policy::users();
    rule.check(&caller.ctx)?;

    let user = state
        .store
        .user_by_username(username)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))?;

    rule.check_object(&caller.ctx, &Target::Profile(user.id))?;
    Ok(user)
}

/// GET /api/v1/users/:username
pub async fn get(State(state): State<AppState>, caller: Caller, Path(username): Path<String>) -> ApiResult<User> {
    let user = load(&state, &caller, &username).await?;
    Ok(ApiResponse::success(user))
}

/// PATCH /api/v1/users/:username
pub async fn patch(
    State(state): State<AppState>,
    caller: Caller,
    Path(username): Path<String>,
    body: JsonBody<UpdateUser>,
) -> ApiResult<User> {
    let user = load(&state, &caller, &username).await?;
    let body = body.validated()?;

    let updated = state
        .store
        .update_user(user.id, body.into())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("User '{}' not found", username)))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/v1/users/:username - also removes the user's reviews and comments
pub async fn delete(State(state): State<AppState>, caller: Caller, Path(username): Path<String>) -> ApiResult<()> {
    let user = load(&state, &caller, &username).await?;

    if !state.store.delete_user(user.id).await? {
        return Err(ApiError::not_found(format!("User '{}' not found", username)));
    }
    tracing::info!("Deleted user {}", user.username);
    Ok(ApiResponse::no_content())
}
