// handlers/elevated/tutoring.rs - admin endpoints under /tutoring/api/admin

use axum::extract::State;
use uuid::Uuid;

use crate::database::models::tutoring::{
    CityCount, CompletionRate, SubjectCount, TutorStatusFilter, TutoringUser, VerifyTutor,
};
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult};
use crate::services::tutoring::{TutoringService, UserGrowth};
use crate::state::AppState;

fn service(state: AppState) -> TutoringService {
    TutoringService::new(state.pool)
}

/// GET /tutoring/api/admin/tutors?status=pending
pub async fn list_tutors(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TutorStatusFilter>,
) -> ApiResult<Vec<TutoringUser>> {
    Ok(ApiResponse::success(service(state).list_tutors(filter).await?))
}

/// POST /tutoring/api/admin/tutors/:id/verify
pub async fn verify_tutor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<VerifyTutor>,
) -> ApiResult<TutoringUser> {
    Ok(ApiResponse::success(service(state).verify_tutor(id, request).await?))
}

pub async fn popular_subjects(State(state): State<AppState>) -> ApiResult<Vec<SubjectCount>> {
    Ok(ApiResponse::success(service(state).popular_subjects().await?))
}

pub async fn session_completion_rate(State(state): State<AppState>) -> ApiResult<CompletionRate> {
    Ok(ApiResponse::success(service(state).session_completion_rate().await?))
}

pub async fn usage_by_city(State(state): State<AppState>) -> ApiResult<Vec<CityCount>> {
    Ok(ApiResponse::success(service(state).usage_by_city().await?))
}

pub async fn user_growth(State(state): State<AppState>) -> ApiResult<UserGrowth> {
    Ok(ApiResponse::success(service(state).user_growth().await?))
}
