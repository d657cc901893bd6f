use axum::extract::{OriginalUri, Path, Query, State};

use crate::database::models::Review;
use crate::error::ApiError;
use crate::filter::{ListQuery, Page};
use crate::handlers::{request_uri, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::policy;
use crate::services::ReviewService;
use crate::AppState;

use super::CreateReview;

/// GET /api/v1/titles/:title_id/reviews
pub async fn get(
    State(state): State<AppState>,
    Path(title_id): Path<i64>,
    Query(query): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Page<Review>> {
    if state.store.title_by_id(title_id).await?.is_none() {
        return Err(ApiError::not_found(format!("Title {} not found", title_id)));
    }

    let page = query.page_request()?;
    let (reviews, count) = state.store.list_reviews(title_id, page).await?;
    Ok(ApiResponse::success(Page::new(reviews, count, &page, request_uri(&uri))))
}

/// POST /api/v1/titles/:title_id/reviews - one review per user and title
pub async fn post(
    State(state): State<AppState>,
    caller: Caller,
    Path(title_id): Path<i64>,
    body: JsonBody<CreateReview>,
) -> ApiResult<Review> {
    policy::discussion().check(&caller.ctx)?;
    let author = caller.user()?;
    let body = body.validated()?;

    let review = ReviewService::new(state.store.clone())
        .create(title_id, author, body.text, body.score)
        .await?;
    Ok(ApiResponse::created(review))
}
