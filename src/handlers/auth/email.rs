use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::handlers::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::SignupService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Enter a valid email address"), length(max = 100, message = "Email must be at most 100 characters"))]
    pub email: String,
}

/// POST /api/v1/auth/email - register on first use and send a confirmation code
pub async fn post(State(state): State<AppState>, body: JsonBody<EmailRequest>) -> ApiResult<Value> {
    let body = body.validated()?;
    let (user, _code) = SignupService::new(state.store.clone()).request_code(&body.email).await?;

    Ok(ApiResponse::success(json!({
        "email": user.email,
        "username": user.username,
    })))
}
