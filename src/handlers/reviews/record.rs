use axum::extract::{Path, State};

use crate::database::models::Review;
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::{policy, Target};
use crate::AppState;

use super::UpdateReview;

/// Look the review up under its title, then run the row-level check
async fn load(state: &AppState, caller: &Caller, title_id: i64, review_id: i64) -> Result<Review, ApiError> {
    let rule = policy::discussion();
    rule.check(&caller.ctx)?;

    let review = state
        .store
        .review_by_id(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Review {} not found", review_id)))?;

    rule.check_object(&caller.ctx, &Target::Authored { author_id: review.author_id })?;
    Ok(review)
}

/// GET /api/v1/titles/:title_id/reviews/:review_id
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> ApiResult<Review> {
    let review = load(&state, &caller, title_id, review_id).await?;
    Ok(ApiResponse::success(review))
}

/// PATCH /api/v1/titles/:title_id/reviews/:review_id
pub async fn patch(
    State(state): State<AppState>,
    caller: Caller,
    Path((title_id, review_id)): Path<(i64, i64)>,
    body: JsonBody<UpdateReview>,
) -> ApiResult<Review> {
    load(&state, &caller, title_id, review_id).await?;
    let body = body.validated()?;

    let review = state
        .store
        .update_review(review_id, body.into())
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Review {} not found", review_id)))?;
    Ok(ApiResponse::success(review))
}

/// DELETE /api/v1/titles/:title_id/reviews/:review_id - comments go with it
pub async fn delete(
    State(state): State<AppState>,
    caller: Caller,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    let review = load(&state, &caller, title_id, review_id).await?;

    state.store.delete_review(review.id).await?;
    tracing::info!("Review {} on title {} deleted", review.id, title_id);
    Ok(ApiResponse::no_content())
}
