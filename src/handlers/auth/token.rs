use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SignupService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank"))]
    pub confirmation_code: String,
}

/// POST /api/v1/auth/token - exchange a confirmation code for an access token
pub async fn post(State(state): State<AppState>, body: JsonBody<TokenRequest>) -> ApiResult<Value> {
    let body = body.validated()?;
    let token = SignupService::new(state.store.clone())
        .exchange_code(&body.email, &body.confirmation_code)
        .await?;

    Ok(ApiResponse::success(json!({ "token": token })))
}
