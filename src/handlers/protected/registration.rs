// handlers/protected/registration.rs - student endpoints under /registration/api
//
// The student id always comes from the token; a student can only act on
// their own registrations.

use axum::{extract::State, Extension};
use uuid::Uuid;

use crate::database::models::registration::{
    Course, CourseListing, CourseSelection, CourseWithPrerequisites, ScheduleEntry,
};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::registration::RegistrationService;
use crate::state::AppState;

/// GET /registration/api/courses
pub async fn list_courses(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<CourseListing>> {
    let courses = RegistrationService::new(state.pool)
        .list_courses_for_student(user.id)
        .await?;
    Ok(ApiResponse::success(courses))
}

/// POST /registration/api/enrollments
pub async fn register(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(selection): ApiJson<CourseSelection>,
) -> ApiResult<Course> {
    let course = RegistrationService::new(state.pool)
        .register(user.id, selection.course_id)
        .await?;
    Ok(ApiResponse::created(course))
}

/// DELETE /registration/api/enrollments/:course_id
pub async fn drop_course(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Course> {
    let course = RegistrationService::new(state.pool)
        .drop_course(user.id, course_id)
        .await?;
    Ok(ApiResponse::success(course))
}

/// GET /registration/api/schedule
pub async fn schedule(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<ScheduleEntry>> {
    let schedule = RegistrationService::new(state.pool).schedule(user.id).await?;
    Ok(ApiResponse::success(schedule))
}

/// GET /registration/api/prerequisites
pub async fn prerequisites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<CourseWithPrerequisites>> {
    let courses = RegistrationService::new(state.pool)
        .prerequisites_for_student(user.id)
        .await?;
    Ok(ApiResponse::success(courses))
}
