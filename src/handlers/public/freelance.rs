// handlers/public/freelance.rs - signup, login and public profiles under /freelance

use axum::extract::State;
use uuid::Uuid;

use crate::database::models::freelance::{
    FreelanceReview, FreelanceUser, LoginRequest, PublicProfile, SignupRequest,
};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::freelance::{FreelanceService, LoginResponse};
use crate::state::AppState;

/// POST /freelance/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> ApiResult<FreelanceUser> {
    Ok(ApiResponse::created(FreelanceService::new(state.pool).signup(request).await?))
}

/// POST /freelance/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::success(FreelanceService::new(state.pool).login(request).await?))
}

/// GET /freelance/users/:id
pub async fn public_profile(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<PublicProfile> {
    Ok(ApiResponse::success(FreelanceService::new(state.pool).public_profile(user_id).await?))
}

/// GET /freelance/reviews/freelancer/:id
pub async fn freelancer_reviews(
    State(state): State<AppState>,
    ApiPath(freelancer_id): ApiPath<Uuid>,
) -> ApiResult<Vec<FreelanceReview>> {
    Ok(ApiResponse::success(
        FreelanceService::new(state.pool).freelancer_reviews(freelancer_id).await?,
    ))
}
