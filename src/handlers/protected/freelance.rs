// handlers/protected/freelance.rs - client and freelancer endpoints under /freelance/api
//
// Role gates live on the router; ownership checks live in the service.

use axum::{extract::State, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::freelance::{
    AssignFreelancer, Bid, BidDecision, BidWithFreelancer, BidWithProject, CounterOffer, CreateMilestone,
    CreatePortfolioItem, CreateProject, CreateReview, CreateTimeLog, FreelanceReview, FreelanceUser, Milestone,
    Notification, PlaceBid, PortfolioItem, Project, ProjectDetail, ProjectListing, RespondToReview, TimeLog,
    UpdateBid, UpdateMilestone, UpdateProfile, UpdateProject, VerificationRequest,
};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiPath, ApiResponse, ApiResult, AuthUser};
use crate::services::freelance::{Actor, FreelanceService};
use crate::state::AppState;

fn service(state: AppState) -> FreelanceService {
    FreelanceService::new(state.pool)
}

fn actor(user: &AuthUser) -> Result<Actor, ApiError> {
    Ok(Actor::new(user.id, &user.role)?)
}

/// GET /freelance/api/me
pub async fn me(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<FreelanceUser> {
    Ok(ApiResponse::success(service(state).get_user(user.id).await?))
}

/// PUT /freelance/api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(update): ApiJson<UpdateProfile>,
) -> ApiResult<FreelanceUser> {
    Ok(ApiResponse::success(service(state).update_profile(user.id, update).await?))
}

pub async fn add_portfolio_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(item): ApiJson<CreatePortfolioItem>,
) -> ApiResult<Vec<PortfolioItem>> {
    Ok(ApiResponse::created(service(state).add_portfolio_item(user.id, item).await?))
}

pub async fn delete_portfolio_item(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(item_id): ApiPath<Uuid>,
) -> ApiResult<Vec<PortfolioItem>> {
    Ok(ApiResponse::success(service(state).delete_portfolio_item(user.id, item_id).await?))
}

/// POST /freelance/api/verifications
pub async fn request_verification(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<VerificationRequest> {
    Ok(ApiResponse::created(service(state).request_verification(user.id).await?))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(input): ApiJson<CreateProject>,
) -> ApiResult<Project> {
    Ok(ApiResponse::created(service(state).create_project(user.id, input).await?))
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<ProjectListing>> {
    Ok(ApiResponse::success(service(state).list_projects(actor(&user)?).await?))
}

pub async fn get_project(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<ProjectDetail> {
    Ok(ApiResponse::success(service(state).get_project(id).await?))
}

pub async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UpdateProject>,
) -> ApiResult<Project> {
    Ok(ApiResponse::success(service(state).update_project(actor(&user)?, id, update).await?))
}

/// PUT /freelance/api/projects/:id/assign
pub async fn assign_freelancer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AssignFreelancer>,
) -> ApiResult<Project> {
    let project = service(state)
        .assign_freelancer(user.id, id, request.freelancer_id)
        .await?;
    Ok(ApiResponse::success(project))
}

pub async fn add_milestone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CreateMilestone>,
) -> ApiResult<Vec<Milestone>> {
    Ok(ApiResponse::created(service(state).add_milestone(user.id, id, input).await?))
}

/// PUT /freelance/api/projects/:id/milestones/:milestone_id
pub async fn update_milestone(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath((project_id, milestone_id)): ApiPath<(Uuid, Uuid)>,
    ApiJson(update): ApiJson<UpdateMilestone>,
) -> ApiResult<Milestone> {
    let milestone = service(state)
        .update_milestone(actor(&user)?, project_id, milestone_id, update)
        .await?;
    Ok(ApiResponse::success(milestone))
}

/// POST /freelance/api/projects/:id/time-logs
pub async fn log_time(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<CreateTimeLog>,
) -> ApiResult<Vec<TimeLog>> {
    Ok(ApiResponse::created(service(state).log_time(user.id, id, input).await?))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Value> {
    service(state).delete_project(actor(&user)?, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

pub async fn place_bid(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<PlaceBid>,
) -> ApiResult<Bid> {
    Ok(ApiResponse::created(service(state).place_bid(user.id, request).await?))
}

/// GET /freelance/api/bids/my
pub async fn my_bids(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<BidWithProject>> {
    Ok(ApiResponse::success(service(state).my_bids(user.id).await?))
}

/// GET /freelance/api/bids/project/:project_id
pub async fn project_bids(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Vec<BidWithFreelancer>> {
    Ok(ApiResponse::success(service(state).project_bids(actor(&user)?, project_id).await?))
}

pub async fn update_bid(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<UpdateBid>,
) -> ApiResult<Bid> {
    Ok(ApiResponse::success(service(state).update_bid(user.id, id, update).await?))
}

/// PUT /freelance/api/bids/:id/counter
pub async fn counter_bid(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<CounterOffer>,
) -> ApiResult<Bid> {
    Ok(ApiResponse::success(service(state).counter_bid(user.id, id, request.counter_offer).await?))
}

/// PUT /freelance/api/bids/:id/status
pub async fn decide_bid(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<BidDecision>,
) -> ApiResult<Bid> {
    Ok(ApiResponse::success(service(state).decide_bid(user.id, id, request.status).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreateReview>,
) -> ApiResult<FreelanceReview> {
    Ok(ApiResponse::created(service(state).create_review(user.id, request).await?))
}

/// PUT /freelance/api/reviews/:id/respond
pub async fn respond_to_review(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<RespondToReview>,
) -> ApiResult<FreelanceReview> {
    let review = service(state)
        .respond_to_review(user.id, id, request.freelancer_response)
        .await?;
    Ok(ApiResponse::success(review))
}

pub async fn notifications(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::success(service(state).notifications(user.id).await?))
}

/// PUT /freelance/api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Notification> {
    Ok(ApiResponse::success(service(state).mark_notification_read(user.id, id).await?))
}
