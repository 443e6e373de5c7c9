// handlers/elevated/registration.rs - admin endpoints under /registration/api/admin

use axum::extract::State;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::registration::{
    Course, CourseSelection, CourseWithPrerequisites, CreateCourse, CreateStudent, EnrolledStudent, SeatUpdate,
    Student, StudentWithCourses, UpdateCourse,
};
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::services::registration::RegistrationService;
use crate::state::AppState;

fn service(state: AppState) -> RegistrationService {
    RegistrationService::new(state.pool)
}

pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    Ok(ApiResponse::success(service(state).list_courses().await?))
}

pub async fn create_course(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateCourse>,
) -> ApiResult<Course> {
    Ok(ApiResponse::created(service(state).create_course(input).await?))
}

pub async fn get_course(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Course> {
    Ok(ApiResponse::success(service(state).get_course(id).await?))
}

pub async fn update_course(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateCourse>,
) -> ApiResult<Course> {
    Ok(ApiResponse::success(service(state).update_course(id, input).await?))
}

pub async fn delete_course(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<Value> {
    service(state).delete_course(id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

/// PUT /registration/api/admin/courses/:id/seats
pub async fn set_seats(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<SeatUpdate>,
) -> ApiResult<Course> {
    Ok(ApiResponse::success(service(state).set_seats(id, update).await?))
}

pub async fn list_students(State(state): State<AppState>) -> ApiResult<Vec<StudentWithCourses>> {
    Ok(ApiResponse::success(service(state).students_with_courses().await?))
}

pub async fn create_student(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateStudent>,
) -> ApiResult<Student> {
    Ok(ApiResponse::created(service(state).create_student(input).await?))
}

/// POST /registration/api/admin/students/:id/register
pub async fn register_student(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<Uuid>,
    ApiJson(selection): ApiJson<CourseSelection>,
) -> ApiResult<Course> {
    let course = service(state).register(student_id, selection.course_id).await?;
    Ok(ApiResponse::created(course))
}

/// POST /registration/api/admin/students/:id/drop
pub async fn drop_student(
    State(state): State<AppState>,
    ApiPath(student_id): ApiPath<Uuid>,
    ApiJson(selection): ApiJson<CourseSelection>,
) -> ApiResult<Course> {
    let course = service(state).drop_course(student_id, selection.course_id).await?;
    Ok(ApiResponse::success(course))
}

/// GET /registration/api/admin/reports/courses/:id/students
pub async fn report_course_students(
    State(state): State<AppState>,
    ApiPath(course_id): ApiPath<Uuid>,
) -> ApiResult<Vec<EnrolledStudent>> {
    Ok(ApiResponse::success(service(state).students_in_course(course_id).await?))
}

/// GET /registration/api/admin/reports/courses/available
pub async fn report_available_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    Ok(ApiResponse::success(service(state).courses_with_open_seats().await?))
}

/// GET /registration/api/admin/reports/courses/prerequisites
pub async fn report_prerequisites(State(state): State<AppState>) -> ApiResult<Vec<CourseWithPrerequisites>> {
    Ok(ApiResponse::success(service(state).prerequisite_report().await?))
}
