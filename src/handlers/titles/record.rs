use axum::extract::{Path, State};

use crate::database::models::{Title, TitleChanges};
use crate::error::ApiError;
use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::policy;
use crate::services::TitleService;
use crate::AppState;

use super::{check_year, UpdateTitle};

fn not_found(title_id: i64) -> ApiError {
    ApiError::not_found(format!("Title {} not found", title_id))
}

/// GET /api/v1/titles/:title_id
pub async fn get(State(state): State<AppState>, Path(title_id): Path<i64>) -> ApiResult<Title> {
    let title = state.store.title_by_id(title_id).await?.ok_or_else(|| not_found(title_id))?;
    Ok(ApiResponse::success(title))
}

/// PATCH /api/v1/titles/:title_id
pub async fn patch(
    State(state): State<AppState>,
    caller: Caller,
    Path(title_id): Path<i64>,
    body: JsonBody<UpdateTitle>,
) -> ApiResult<Title> {
    policy::catalog().check(&caller.ctx)?;
    if state.store.title_by_id(title_id).await?.is_none() {
        return Err(not_found(title_id));
    }
    let body = body.validated()?;
    if let Some(year) = body.year {
        check_year(year)?;
    }

    let service = TitleService::new(state.store.clone());
    let category_id = match body.category {
        Some(Some(slug)) => Some(Some(service.resolve_category(&slug).await?)),
        Some(None) => Some(None),
        None => None,
    };
    let genre_ids = match body.genre {
        Some(slugs) => Some(service.resolve_genres(&slugs).await?),
        None => None,
    };

    let changes = TitleChanges {
        name: body.name,
        year: body.year,
        description: body.description,
        category_id,
        genre_ids,
    };
    let title = state
        .store
        .update_title(title_id, changes)
        .await?
        .ok_or_else(|| not_found(title_id))?;
    Ok(ApiResponse::success(title))
}

/// DELETE /api/v1/titles/:title_id - reviews and their comments go with it
pub async fn delete(State(state): State<AppState>, caller: Caller, Path(title_id): Path<i64>) -> ApiResult<()> {
    policy::catalog().check(&caller.ctx)?;

    if !state.store.delete_title(title_id).await? {
        return Err(not_found(title_id));
    }
    tracing::info!("Title {} deleted", title_id);
    Ok(ApiResponse::no_content())
}
