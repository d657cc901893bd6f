mod memory_store;

pub use memory_store::MemoryStore;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::{self, Claims};
use crate::database::models::{Role, User};
use crate::{app, AppState};

/// Rows the router tests need before they can exercise an endpoint
pub mod fixtures {
    use std::sync::Arc;

    use super::MemoryStore;
    use crate::database::models::{NewTerm, NewTitle, NewUser, Role, Term, TermKind, Title, User};
    use crate::database::Store;

    pub async fn user(store: &Arc<MemoryStore>, username: &str, role: Role) -> User {
        store
            .create_user(NewUser {
                email: format!("{}@example.com", username),
                username: username.to_string(),
                role,
                ..Default::default()
            })
            .await
            .expect("fixture user")
    }

    pub async fn title(store: &Arc<MemoryStore>, name: &str) -> Title {
        store
            .create_title(NewTitle {
                name: name.to_string(),
                year: 1979,
                ..Default::default()
            })
            .await
            .expect("fixture title")
    }

    pub async fn term(store: &Arc<MemoryStore>, kind: TermKind, name: &str, slug: &str) -> Term {
        store
            .create_term(kind, NewTerm { name: name.to_string(), slug: slug.to_string() })
            .await
            .expect("fixture term")
    }
}

/// Router over a fresh in-memory store, driven with `oneshot`
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    router: Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let router = app(AppState::new(store.clone()));
        Self { store, router }
    }

    /// Create a user and return it together with a bearer token
    pub async fn login(&self, username: &str, role: Role) -> (User, String) {
        let user = fixtures::user(&self.store, username, role).await;
        let token = auth::generate_jwt(&Claims::for_user(&user)).expect("fixture token");
        (user, token)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    pub async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("router response");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }
}
