pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod permissions;
pub mod rating;
pub mod services;

#[cfg(test)]
pub mod testing;

use axum::{
    extract::{Extension, State},
    http::{HeaderValue, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::models::TermKind;
use crate::database::Store;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

/// Full application router: service routes plus the `/api/v1` resources
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(term_routes())
        .merge(title_routes())
        .merge(discussion_routes());

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        // Layers run bottom-up: the token is decoded before the user is loaded
        .layer(from_fn_with_state(state.clone(), middleware::validate_user_middleware))
        .layer(from_fn(middleware::jwt_auth_middleware))
        .with_state(state);

    let router = match cors_layer() {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config::config().api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn cors_layer() -> Option<CorsLayer> {
    let security = &config::config().security;
    if !security.enable_cors {
        return None;
    }
    if security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/auth/email", post(auth::email_post))
        .route("/auth/token", post(auth::token_post))
}

fn user_routes() -> Router<AppState> {
    use handlers::users;

    Router::new()
        .route("/users", get(users::users_get).post(users::users_post))
        // Static segment wins over the :username capture
        .route("/users/me", get(users::me_get).patch(users::me_patch))
        .route(
            "/users/:username",
            get(users::user_get).patch(users::user_patch).delete(users::user_delete),
        )
}

fn term_routes() -> Router<AppState> {
    use handlers::terms;

    let mut router = Router::new();
    for (path, kind) in [("/categories", TermKind::Category), ("/genres", TermKind::Genre)] {
        router = router
            .route(path, get(terms::list).post(terms::create).layer(Extension(kind)))
            .route(&format!("{}/:slug", path), delete(terms::delete).layer(Extension(kind)));
    }
    router
}

fn title_routes() -> Router<AppState> {
    use handlers::titles;

    Router::new()
        .route("/titles", get(titles::titles_get).post(titles::titles_post))
        .route(
            "/titles/:title_id",
            get(titles::title_get).patch(titles::title_patch).delete(titles::title_delete),
        )
}

fn discussion_routes() -> Router<AppState> {
    use handlers::{comments, reviews};

    Router::new()
        .route(
            "/titles/:title_id/reviews",
            get(reviews::reviews_get).post(reviews::reviews_post),
        )
        .route(
            "/titles/:title_id/reviews/:review_id",
            get(reviews::review_get).patch(reviews::review_patch).delete(reviews::review_delete),
        )
        .route(
            "/titles/:title_id/reviews/:review_id/comments",
            get(comments::comments_get).post(comments::comments_post),
        )
        .route(
            "/titles/:title_id/reviews/:review_id/comments/:comment_id",
            get(comments::comment_get).patch(comments::comment_patch).delete(comments::comment_delete),
        )
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "YaMDb API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Reviews of films, books and music with role-based access",
            "endpoints": {
                "auth": "/api/v1/auth/email, /api/v1/auth/token (public)",
                "users": "/api/v1/users[/:username] (admin), /api/v1/users/me (signed in)",
                "categories": "/api/v1/categories[/:slug]",
                "genres": "/api/v1/genres[/:slug]",
                "titles": "/api/v1/titles[/:title_id]",
                "reviews": "/api/v1/titles/:title_id/reviews[/:review_id]",
                "comments": "/api/v1/titles/:title_id/reviews/:review_id/comments[/:comment_id]",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
