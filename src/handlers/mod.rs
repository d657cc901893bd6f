// handlers/mod.rs - one sub-module per resource under /api/v1
//
// auth      POST /auth/email, /auth/token           (public)
// users     /users, /users/me, /users/:username     (admin, owner)
// terms     /categories, /genres                    (catalog)
// titles    /titles, /titles/:title_id              (catalog)
// reviews   /titles/:title_id/reviews[/:review_id]  (discussion)
// comments  .../reviews/:review_id/comments[/:id]   (discussion)

pub mod auth;
pub mod comments;
pub mod reviews;
pub mod terms;
pub mod titles;
pub mod users;

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::Uri,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use std::borrow::Cow;
use std::convert::Infallible;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// JSON body whose parse and `validator` outcome is held until the handler
/// has run its access checks, so denied callers never see field errors
#[derive(Debug)]
pub struct JsonBody<T>(Result<T, ApiError>);

impl<T: Validate> JsonBody<T> {
    pub fn validated(self) -> Result<T, ApiError> {
        let value = self.0?;
        value.validate()?;
        Ok(value)
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let parsed = Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| value)
            .map_err(|rejection: JsonRejection| ApiError::bad_request(rejection.body_text()));
        Ok(JsonBody(parsed))
    }
}

/// Path plus query of the request, used to build page links
pub(crate) fn request_uri(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path())
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent field (`None`)
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

/// Slugs are limited to letters, digits, `-` and `_`
pub(crate) fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if !slug.is_empty() && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        Ok(())
    } else {
        Err(invalid("slug", "Slug may contain only letters, digits, hyphens and underscores"))
    }
}

/// Usernames use word characters plus `.@+-`; `me` is reserved for the own-profile route
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username == "me" {
        return Err(invalid("username", "Username 'me' is reserved"));
    }
    if !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
    {
        Ok(())
    } else {
        Err(invalid("username", "Username may contain only letters, digits and . @ + - _"))
    }
}
