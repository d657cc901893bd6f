use axum::extract::{OriginalUri, Query, State};

use crate::database::models::{NewTitle, Title};
use crate::filter::Page;
use crate::handlers::{request_uri, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::policy;
use crate::services::TitleService;
use crate::AppState;

use super::{check_year, CreateTitle, TitleQuery};

/// GET /api/v1/titles - filter by `category`, `genre`, `name`, `year`
pub async fn get(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Page<Title>> {
    let page = query.page_request()?;
    let (titles, count) = state.store.list_titles(&query.filter(), page).await?;
    Ok(ApiResponse::success(Page::new(titles, count, &page, request_uri(&uri))))
}

/// POST /api/v1/titles - `category` and `genre` are given as slugs
pub async fn post(
    State(state): State<AppState>,
    caller: Caller,
    body: JsonBody<CreateTitle>,
) -> ApiResult<Title> {
    policy::catalog().check(&caller.ctx)?;
    let body = body.validated()?;
    check_year(body.year)?;

    let service = TitleService::new(state.store.clone());
    let category_id = match body.category.as_deref() {
        Some(slug) => Some(service.resolve_category(slug).await?),
        None => None,
    };
    let genre_ids = service.resolve_genres(&body.genre).await?;

    let title = state
        .store
        .create_title(NewTitle {
            name: body.name,
            year: body.year,
            description: body.description,
            category_id,
            genre_ids,
        })
        .await?;

    tracing::info!("Title {} '{}' created", title.id, title.name);
    Ok(ApiResponse::created(title))
}
