//! Tutor marketplace records and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{text_enum, StringList};

text_enum! {
    pub enum TutoringRole {
        Student => "student",
        Tutor => "tutor",
        Admin => "admin",
    }
}

text_enum! {
    pub enum TeachingPreference {
        Online => "online",
        InPerson => "in-person",
        Both => "both",
    }
}

text_enum! {
    pub enum VerificationStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

text_enum! {
    pub enum SessionStatus {
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
        Completed => "completed",
    }
}

text_enum! {
    pub enum SessionType {
        Online => "online",
        InPerson => "in-person",
    }
}

text_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Completed => "completed",
    }
}

/// Hours a tutor offers on one weekday, e.g. `{"day": "Monday", "times": ["10:00"]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub day: String,
    #[serde(default)]
    pub times: Vec<String>,
}

/// A row from `tutoring.users`. Tutor-only columns stay empty for students.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TutoringUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: TutoringRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub subjects: Vec<String>,
    pub hourly_rate: Option<Decimal>,
    pub availability: Json<Vec<Availability>>,
    pub teaching_preferences: Option<TeachingPreference>,
    pub qualifications: Vec<String>,
    pub verification_status: Option<VerificationStatus>,
    pub verification_comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TutoringSession {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub student_id: Uuid,
    pub subject: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration: Decimal,
    pub session_type: SessionType,
    pub status: SessionStatus,
    pub earnings: Decimal,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session with the other party's contact details.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionWithContact {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub session: TutoringSession,
    pub counterpart_username: String,
    pub counterpart_email: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TutorReview {
    pub id: Uuid,
    pub student_id: Uuid,
    pub tutor_id: Uuid,
    pub session_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: TutorReview,
    pub student_username: String,
}

/// Public tutor card used by search and wishlists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TutorSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub subjects: Vec<String>,
    pub hourly_rate: Option<Decimal>,
    pub teaching_preferences: Option<TeachingPreference>,
    pub average_rating: Option<f64>,
    pub review_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarningsSummary {
    pub total_earnings: Decimal,
    pub weekly_earnings: Decimal,
    pub monthly_earnings: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SubjectCount {
    pub subject: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRate {
    pub completed: i64,
    pub total: i64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CityCount {
    pub location: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: TutoringRole,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub teaching_preferences: Option<TeachingPreference>,
    pub qualifications: Option<StringList>,
    pub subjects: Option<StringList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// E-mail address or username.
    pub identifier: String,
    pub password: String,
}

/// Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTutorProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture: Option<String>,
    pub location: Option<String>,
    pub subjects: Option<StringList>,
    pub hourly_rate: Option<Decimal>,
    pub availability: Option<Vec<Availability>>,
    pub teaching_preferences: Option<TeachingPreference>,
    pub qualifications: Option<StringList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookSession {
    pub tutor_id: Uuid,
    pub subject: String,
    pub date: NaiveDate,
    pub time: String,
    /// Hours.
    pub duration: Decimal,
    pub session_type: SessionType,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub session_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WishlistAdd {
    pub tutor_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TutorSearch {
    pub subject: Option<String>,
    pub location: Option<String>,
    pub max_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TutorStatusFilter {
    pub status: Option<VerificationStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyTutor {
    pub status: VerificationStatus,
    pub comments: Option<String>,
}
