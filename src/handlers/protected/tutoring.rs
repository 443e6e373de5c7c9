// handlers/protected/tutoring.rs - tutor and student endpoints under /tutoring/api
//
// Tutors only ever see their own sessions; the tutor id comes from the token.

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::database::models::tutoring::{
    BookSession, CreateReview, EarningsSummary, SessionStatus, SessionWithContact, TutorReview, TutorSummary,
    TutoringSession, TutoringUser, UpdateTutorProfile, WishlistAdd,
};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::tutoring::TutoringService;
use crate::state::AppState;

fn service(state: AppState) -> TutoringService {
    TutoringService::new(state.pool)
}

pub async fn tutor_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<TutoringUser> {
    Ok(ApiResponse::success(service(state).tutor_profile(user.id).await?))
}

pub async fn update_tutor_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(update): ApiJson<UpdateTutorProfile>,
) -> ApiResult<TutoringUser> {
    Ok(ApiResponse::success(service(state).update_tutor_profile(user.id, update).await?))
}

pub async fn tutor_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<SessionWithContact>> {
    Ok(ApiResponse::success(service(state).tutor_sessions(user.id).await?))
}

async fn transition(state: AppState, user: AuthUser, session_id: Uuid, status: SessionStatus) -> ApiResult<TutoringSession> {
    let session = service(state).set_session_status(user.id, session_id, status).await?;
    Ok(ApiResponse::success(session))
}

/// POST /tutoring/api/sessions/:id/accept
pub async fn accept_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TutoringSession> {
    transition(state, user, id, SessionStatus::Accepted).await
}

/// POST /tutoring/api/sessions/:id/decline
pub async fn decline_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TutoringSession> {
    transition(state, user, id, SessionStatus::Declined).await
}

/// POST /tutoring/api/sessions/:id/complete
pub async fn complete_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<TutoringSession> {
    transition(state, user, id, SessionStatus::Completed).await
}

pub async fn earnings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<EarningsSummary> {
    Ok(ApiResponse::success(service(state).earnings(user.id).await?))
}

/// POST /tutoring/api/sessions
pub async fn book_session(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<BookSession>,
) -> ApiResult<TutoringSession> {
    Ok(ApiResponse::created(service(state).book_session(user.id, request).await?))
}

pub async fn student_sessions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<SessionWithContact>> {
    Ok(ApiResponse::success(service(state).student_sessions(user.id).await?))
}

pub async fn wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<TutorSummary>> {
    Ok(ApiResponse::success(service(state).wishlist(user.id).await?))
}

pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<WishlistAdd>,
) -> ApiResult<Vec<TutorSummary>> {
    Ok(ApiResponse::success(service(state).add_to_wishlist(user.id, request.tutor_id).await?))
}

/// DELETE /tutoring/api/wishlist/:tutor_id
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(tutor_id): ApiPath<Uuid>,
) -> ApiResult<Vec<TutorSummary>> {
    Ok(ApiResponse::success(service(state).remove_from_wishlist(user.id, tutor_id).await?))
}

/// POST /tutoring/api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateReview>,
) -> ApiResult<TutorReview> {
    Ok(ApiResponse::created(service(state).create_review(user.id, request).await?))
}
