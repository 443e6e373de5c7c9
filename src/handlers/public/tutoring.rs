// handlers/public/tutoring.rs - signup, login and tutor discovery under /tutoring

use axum::extract::State;
use uuid::Uuid;

use crate::database::models::tutoring::{
    LoginRequest, ReviewWithAuthor, SignupRequest, TutorSearch, TutorSummary, TutoringUser,
};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::tutoring::{LoginResponse, TutoringService};
use crate::state::AppState;

/// POST /tutoring/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> ApiResult<TutoringUser> {
    let user = TutoringService::new(state.pool).signup(request).await?;
    Ok(ApiResponse::created(user))
}

/// POST /tutoring/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    Ok(ApiResponse::success(TutoringService::new(state.pool).login(request).await?))
}

/// GET /tutoring/tutors
pub async fn search_tutors(
    State(state): State<AppState>,
    ApiQuery(search): ApiQuery<TutorSearch>,
) -> ApiResult<Vec<TutorSummary>> {
    Ok(ApiResponse::success(TutoringService::new(state.pool).search_tutors(search).await?))
}

/// GET /tutoring/tutors/:id/reviews
pub async fn tutor_reviews(
    State(state): State<AppState>,
    ApiPath(tutor_id): ApiPath<Uuid>,
) -> ApiResult<Vec<ReviewWithAuthor>> {
    Ok(ApiResponse::success(TutoringService::new(state.pool).tutor_reviews(tutor_id).await?))
}
