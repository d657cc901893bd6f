use axum::extract::{Path, State};

use crate::database::models::Comment;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::{policy, Target};
use crate::AppState;

use super::UpdateComment;

async fn load(
    state: &AppState,
    caller: &Caller,
    (title_id, review_id, comment_id): (i64, i64, i64),
) -> Result<Comment, ApiError> {
    let rule = policy::discussion();
    rule.check(&caller.ctx)?;

    // The review must belong to the title in the path
    if state.store.review_by_id(title_id, review_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Review {} not found", review_id)));
    }
    let comment = state
        .store
        .comment_by_id(review_id, comment_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Comment {} not found", comment_id)))?;

    rule.check_object(&caller.ctx, &Target::Authored { author_id: comment.author_id })?;
    Ok(comment)
}

/// GET .../reviews/:review_id/comments/:comment_id
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(ids): Path<(i64, i64, i64)>,
) -> ApiResult<Comment> {
    let comment = load(&state, &caller, ids).await?;
    Ok(ApiResponse::success(comment))
}

/// PATCH .../reviews/:review_id/comments/:comment_id
pub async fn patch(
    State(state): State<AppState>,
    caller: Caller,
    Path(ids): Path<(i64, i64, i64)>,
    body: JsonBody<UpdateComment>,
) -> ApiResult<Comment> {
    let comment = load(&state, &caller, ids).await?;
    let body = body.validated()?;

    let updated = state
        .store
        .update_comment(comment.id, body.text)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Comment {} not found", comment.id)))?;
    Ok(ApiResponse::success(updated))
}

/// DELETE .../reviews/:review_id/comments/:comment_id
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path(ids): Path<(i64, i64, i64)>,
) -> ApiResult<()> {
    let comment = load(&state, &caller, ids).await?;

    state.store.delete_comment(comment.id).await?;
    Ok(ApiResponse::no_content())
}
