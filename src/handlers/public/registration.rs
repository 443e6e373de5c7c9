// handlers/public/registration.rs - POST /registration/auth/login

use axum::extract::State;

use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::registration::{LoginRequest, LoginResponse, RegistrationService};
use crate::state::AppState;

/// Admins sign in with their username, students with their roll number.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let session = RegistrationService::new(state.pool).login(request).await?;
    Ok(ApiResponse::success(session))
}
