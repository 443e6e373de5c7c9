// handlers/elevated/freelance.rs - admin console under /freelance/api/admin
//
// Analytics endpoints answer with the JSON envelope, or with a CSV
// attachment when called with ?export=csv.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};
use uuid::Uuid;

use crate::database::models::freelance::{
    AdminActionLog, AdminDashboard, ExportFormat, ExportQuery, FreelanceUser, RejectVerification, ReviewOverview,
    RoleUpdate, VerificationRequest, VerificationRequestWithUser,
};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, AuthUser, CsvDownload};
use crate::services::freelance::analytics::{to_csv, CsvRow};
use crate::services::freelance::FreelanceService;
use crate::state::AppState;

fn service(state: AppState) -> FreelanceService {
    FreelanceService::new(state.pool)
}

fn report<T: CsvRow>(name: &str, query: ExportQuery, rows: Vec<T>) -> Result<Response, ApiError> {
    match query.export {
        Some(ExportFormat::Csv) => Ok(CsvDownload {
            filename: format!("{}.csv", name),
            body: to_csv(&rows)?,
        }
        .into_response()),
        None => Ok(ApiResponse::success(rows).into_response()),
    }
}

fn single_report<T: CsvRow>(name: &str, query: ExportQuery, row: T) -> Result<Response, ApiError> {
    match query.export {
        Some(ExportFormat::Csv) => Ok(CsvDownload {
            filename: format!("{}.csv", name),
            body: to_csv(std::slice::from_ref(&row))?,
        }
        .into_response()),
        None => Ok(ApiResponse::success(row).into_response()),
    }
}

pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<FreelanceUser>> {
    Ok(ApiResponse::success(service(state).list_users().await?))
}

/// PUT /freelance/api/admin/users/:id/role
pub async fn set_user_role(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<RoleUpdate>,
) -> ApiResult<FreelanceUser> {
    Ok(ApiResponse::success(service(state).set_user_role(admin.id, user_id, update.role).await?))
}

/// PUT /freelance/api/admin/users/:id/suspend
pub async fn suspend_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<FreelanceUser> {
    Ok(ApiResponse::success(service(state).suspend_user(admin.id, user_id).await?))
}

pub async fn verification_requests(State(state): State<AppState>) -> ApiResult<Vec<VerificationRequestWithUser>> {
    Ok(ApiResponse::success(service(state).verification_requests().await?))
}

/// PUT /freelance/api/admin/verifications/:id/approve
pub async fn approve_verification(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(request_id): ApiPath<Uuid>,
) -> ApiResult<VerificationRequest> {
    Ok(ApiResponse::success(service(state).approve_verification(admin.id, request_id).await?))
}

/// PUT /freelance/api/admin/verifications/:id/reject
pub async fn reject_verification(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    ApiPath(request_id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<RejectVerification>,
) -> ApiResult<VerificationRequest> {
    let request = service(state)
        .reject_verification(admin.id, request_id, body.reason)
        .await?;
    Ok(ApiResponse::success(request))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<AdminDashboard> {
    Ok(ApiResponse::success(service(state).dashboard().await?))
}

pub async fn all_reviews(State(state): State<AppState>) -> ApiResult<Vec<ReviewOverview>> {
    Ok(ApiResponse::success(service(state).all_reviews().await?))
}

pub async fn action_logs(State(state): State<AppState>) -> ApiResult<Vec<AdminActionLog>> {
    Ok(ApiResponse::success(service(state).action_logs().await?))
}

/// GET /freelance/api/admin/analytics/platform
pub async fn platform_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    single_report("platform_stats", query, service(state).platform_stats().await?)
}

pub async fn skill_popularity(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    report("skill_popularity", query, service(state).skill_popularity().await?)
}

pub async fn revenue_stats(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    single_report("revenue_stats", query, service(state).revenue_stats().await?)
}

pub async fn signup_trends(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    report("signup_trends", query, service(state).signup_trends().await?)
}

pub async fn project_trends(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<Response, ApiError> {
    report("project_posting_trends", query, service(state).project_trends().await?)
}
