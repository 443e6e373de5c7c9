//! Freelancing marketplace records and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{text_enum, StringList};

text_enum! {
    pub enum FreelanceRole {
        Client => "client",
        Freelancer => "freelancer",
        Admin => "admin",
    }
}

text_enum! {
    pub enum VerificationLevel {
        Basic => "basic",
        Verified => "verified",
        Premium => "premium",
    }
}

text_enum! {
    pub enum ProjectStatus {
        Open => "open",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum MilestoneStatus {
        Pending => "pending",
        Completed => "completed",
    }
}

text_enum! {
    pub enum BidStatus {
        Pending => "pending",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

text_enum! {
    pub enum NotificationKind {
        System => "system",
        Verification => "verification",
        Project => "project",
        Bid => "bid",
        Message => "message",
    }
}

text_enum! {
    pub enum RequestStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    pub enum ExportFormat {
        Csv => "csv",
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FreelanceUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: FreelanceRole,
    pub is_verified: bool,
    pub verification_level: VerificationLevel,
    pub is_banned: bool,
    pub skills: Vec<String>,
    pub preferred_categories: Vec<String>,
    pub profile_completed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PortfolioItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// What anyone can see about a freelancer.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub name: String,
    pub role: FreelanceRole,
    pub skills: Vec<String>,
    pub is_verified: bool,
    pub verification_level: VerificationLevel,
    pub profile_completed: i32,
    pub portfolio: Vec<PortfolioItem>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    pub is_hourly: bool,
    pub client_id: Uuid,
    pub freelancer_id: Option<Uuid>,
    pub status: ProjectStatus,
    pub progress: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Project joined with the names of both parties.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub project: Project,
    pub client_name: String,
    pub client_email: String,
    pub freelancer_name: Option<String>,
    pub freelancer_email: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Milestone {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: MilestoneStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeLog {
    pub id: Uuid,
    pub project_id: Uuid,
    pub date: NaiveDate,
    pub hours: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub listing: ProjectListing,
    pub milestones: Vec<Milestone>,
    pub time_logs: Vec<TimeLog>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Bid {
    pub id: Uuid,
    pub project_id: Uuid,
    pub freelancer_id: Uuid,
    pub proposal: String,
    pub bid_amount: Decimal,
    pub status: BidStatus,
    pub counter_offer: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bid as seen by the client reviewing a project.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BidWithFreelancer {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bid: Bid,
    pub freelancer_name: String,
    pub freelancer_skills: Vec<String>,
}

/// Bid as seen by the freelancer who placed it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BidWithProject {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bid: Bid,
    pub project_title: String,
    pub project_status: ProjectStatus,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FreelanceReview {
    pub id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub freelancer_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub freelancer_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewOverview {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: FreelanceReview,
    pub client_name: String,
    pub freelancer_name: String,
    pub project_title: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub content: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: RequestStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VerificationRequestWithUser {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: VerificationRequest,
    pub user_name: String,
    pub user_email: String,
    pub verification_level: VerificationLevel,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminActionLog {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub total_projects: i64,
    pub total_bids: i64,
    pub total_reviews: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_freelancers: i64,
    pub total_clients: i64,
    pub total_projects: i64,
    pub total_bids: i64,
    pub total_reviews: i64,
    pub completed_projects: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SkillCount {
    pub skill: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RevenueStats {
    pub total_revenue: Decimal,
    pub avg_project_budget: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyCount {
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub role: FreelanceRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub skills: Option<StringList>,
    pub preferred_categories: Option<StringList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePortfolioItem {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub title: String,
    pub description: String,
    pub category: String,
    pub budget: Decimal,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub is_hourly: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub budget: Option<Decimal>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: Option<ProjectStatus>,
    pub progress: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignFreelancer {
    pub freelancer_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMilestone {
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMilestone {
    pub status: MilestoneStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTimeLog {
    pub date: NaiveDate,
    pub hours: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceBid {
    pub project_id: Uuid,
    pub proposal: String,
    pub bid_amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBid {
    pub proposal: Option<String>,
    pub bid_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterOffer {
    pub counter_offer: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidDecision {
    pub status: BidStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub project_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RespondToReview {
    pub freelancer_response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: FreelanceRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RejectVerification {
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub export: Option<ExportFormat>,
}
