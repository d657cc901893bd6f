use axum::extract::{OriginalUri, Query, State};

use crate::database::models::User;
use crate::filter::{ListQuery, Page};
use crate::handlers::{request_uri, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::policy;
use crate::AppState;

use super::CreateUser;

/// GET /api/v1/users - list users, `search` matches the username
pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Page<User>> {
    policy::users().check(&caller.ctx)?;

    let page = query.page_request()?;
    let (users, count) = state.store.list_users(query.search_term(), page).await?;
    Ok(ApiResponse::success(Page::new(users, count, &page, request_uri(&uri))))
}

/// POST /api/v1/users - create a user with any role
pub async fn post(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<CreateUser>,
) -> ApiResult<User> {
    policy::users().check(&caller.ctx)?;
    let body = body.validated()?;

    let user = state.store.create_user(body.into()).await?;
    tracing::info!("Created user {} with role {}", user.username, user.role);
    Ok(ApiResponse::created(user))
}
