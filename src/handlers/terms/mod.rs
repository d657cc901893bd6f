//! Categories and genres. Both routes share these handlers; the router
//! attaches the [`TermKind`] as a request extension.

use axum::extract::{Extension, OriginalUri, Path, Query, State};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{NewTerm, Term, TermKind};
use crate::error::ApiError;
use crate::filter::{ListQuery, Page};
use crate::handlers::{request_uri, validate_slug, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, Caller};
use crate::permissions::policy;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TermPayload {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Slug must be between 1 and 50 characters"), custom(function = "validate_slug"))]
    pub slug: String,
}

/// GET /api/v1/{categories,genres} - `search` matches the name
pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<TermKind>,
    Query(query): Query<ListQuery>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Page<Term>> {
    let page = query.page_request()?;
    let (terms, count) = state.store.list_terms(kind, query.search_term(), page).await?;
    Ok(ApiResponse::success(Page::new(terms, count, &page, request_uri(&uri))))
}

/// POST /api/v1/{categories,genres}
pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<TermKind>,
    caller: Caller,
    body: JsonBody<TermPayload>,
) -> ApiResult<Term> {
    policy::catalog().check(&caller.ctx)?;
    let body = body.validated()?;

    let term = state
        .store
        .create_term(kind, NewTerm { name: body.name, slug: body.slug })
        .await?;
    tracing::info!("{} '{}' created", kind.label(), term.slug);
    Ok(ApiResponse::created(term))
}

/// DELETE /api/v1/{categories,genres}/:slug
pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<TermKind>,
    caller: Caller,
    Path(slug): Path<String>,
) -> ApiResult<()> {
    policy::catalog().check(&caller.ctx)?;

    if !state.store.delete_term(kind, &slug).await? {
        return Err(ApiError::not_found(format!("{} '{}' not found", kind.label(), slug)));
    }
    tracing::info!("{} '{}' deleted", kind.label(), slug);
    Ok(ApiResponse::no_content())
}
