use axum::extract::{OriginalUri, Path, Query, State};

use crate::database::models::{Comment, NewComment, Review};
use crate::error::ApiError;
use crate::filter::{ListQuery, Page};
use crate::handlers::{request_uri, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::policy;
use crate::AppState;

use super::CreateComment;

async fn review(state: &AppState, title_id: i64, review_id: i64) -> Result<Review, ApiError> {
    state
        .store
        .review_by_id(title_id, review_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Review {} not found", review_id)))
}

/// GET /api/v1/titles/:title_id/reviews/:review_id/comments
pub async fn get(
    State(state): State<AppState>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(query): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Page<Comment>> {
    review(&state, title_id, review_id).await?;

    let page = query.page_request()?;
    let (comments, count) = state.store.list_comments(review_id, page).await?;
    Ok(ApiResponse::success(Page::new(comments, count, &page, request_uri(&uri))))
}

/// POST /api/v1/titles/:title_id/reviews/:review_id/comments
pub async fn post(
    State(state): State<AppState>,
    caller: Caller,
    Path((title_id, review_id)): Path<(i64, i64)>,
    body: JsonBody<CreateComment>,
) -> ApiResult<Comment> {
    policy::discussion().check(&caller.ctx)?;
    let author = caller.user()?;
    let review = review(&state, title_id, review_id).await?;
    let body = body.validated()?;

    let comment = state
        .store
        .create_comment(NewComment { review_id: review.id, author_id: author.id, text: body.text })
        .await?;
    tracing::debug!("User {} commented on review {}", author.username, review.id);
    Ok(ApiResponse::created(comment))
}
