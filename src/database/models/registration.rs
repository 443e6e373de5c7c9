//! Course registration records and DTOs.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::text_enum;

text_enum! {
    pub enum RegistrationRole {
        Admin => "admin",
        Student => "student",
    }
}

/// A row from `registration.courses`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,
    pub department: String,
    pub seats_available: i32,
    pub prerequisites: Vec<Uuid>,
    pub days: Vec<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: Uuid,
    pub roll_number: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Course as seen by a student, with their own registration flag.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub course: Course,
    pub registered: bool,
}

/// Short reference to a course, used for prerequisite lists.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CourseRef {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,
    pub seats_available: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseWithPrerequisites {
    pub id: Uuid,
    pub course_code: String,
    pub title: String,
    pub seats_available: i32,
    pub prerequisites: Vec<CourseRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub day: String,
    pub time: String,
    pub course_title: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrolledStudent {
    pub id: Uuid,
    pub name: String,
    pub roll_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentWithCourses {
    #[serde(flatten)]
    pub student: Student,
    pub courses: Vec<CourseRef>,
}

/// Clock times arrive as "HH:MM" or "HH:MM:SS" strings.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourse {
    pub course_code: String,
    pub title: String,
    pub department: String,
    pub seats_available: i32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub days: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// All fields optional; `prerequisites` replaces the whole list when present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourse {
    pub course_code: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub seats_available: Option<i32>,
    pub prerequisites: Option<Vec<String>>,
    pub days: Option<Vec<String>>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudent {
    pub roll_number: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CourseSelection {
    pub course_id: Uuid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeatUpdate {
    pub seats_available: i32,
}
