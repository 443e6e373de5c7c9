use std::collections::HashMap;

use chrono::NaiveTime;
use tracing::info;
use uuid::Uuid;

use super::schedule::{check_time_order, find_conflict, normalize_days, parse_optional_clock, Slot};
use super::RegistrationService;
use crate::database::models::registration::{
    Course, CourseListing, CourseRef, CourseWithPrerequisites, CreateCourse, SeatUpdate, UpdateCourse,
};
use crate::services::{require_text, ServiceError, ServiceResult};

impl RegistrationService {
    pub async fn list_courses(&self) -> ServiceResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>("SELECT * FROM registration.courses ORDER BY course_code")
            .fetch_all(&self.pool)
            .await?;
        Ok(courses)
    }

    /// Every course with a flag telling whether `student_id` is registered in it.
    pub async fn list_courses_for_student(&self, student_id: Uuid) -> ServiceResult<Vec<CourseListing>> {
        let courses = sqlx::query_as::<_, CourseListing>(
            "SELECT c.*,
                    EXISTS(SELECT 1 FROM registration.enrollments e
                           WHERE e.course_id = c.id AND e.student_id = $1) AS registered
             FROM registration.courses c
             ORDER BY c.course_code",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn get_course(&self, course_id: Uuid) -> ServiceResult<Course> {
        sqlx::query_as::<_, Course>("SELECT * FROM registration.courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course"))
    }

    pub async fn create_course(&self, input: CreateCourse) -> ServiceResult<Course> {
        require_text("course_code", &input.course_code)?;
        require_text("title", &input.title)?;
        require_text("department", &input.department)?;
        check_seats(input.seats_available)?;

        let days = normalize_days(&input.days)?;
        let start = parse_optional_clock("start_time", input.start_time.as_deref())?;
        let end = parse_optional_clock("end_time", input.end_time.as_deref())?;
        check_time_order(start, end)?;
        self.reject_time_conflict(&days, start, end, None).await?;

        let prerequisites = self.resolve_course_codes(&input.prerequisites).await?;

        let course = sqlx::query_as::<_, Course>(
            "INSERT INTO registration.courses
                (course_code, title, department, seats_available, prerequisites, days, start_time, end_time)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(input.course_code.trim())
        .bind(input.title.trim())
        .bind(input.department.trim())
        .bind(input.seats_available)
        .bind(&prerequisites)
        .bind(&days)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        info!("Created course {} ({})", course.course_code, course.id);
        Ok(course)
    }

    pub async fn update_course(&self, course_id: Uuid, input: UpdateCourse) -> ServiceResult<Course> {
        let current = self.get_course(course_id).await?;

        let course_code = input.course_code.unwrap_or(current.course_code);
        let title = input.title.unwrap_or(current.title);
        let department = input.department.unwrap_or(current.department);
        let seats_available = input.seats_available.unwrap_or(current.seats_available);
        require_text("course_code", &course_code)?;
        require_text("title", &title)?;
        require_text("department", &department)?;
        check_seats(seats_available)?;

        let days = match input.days {
            Some(days) => normalize_days(&days)?,
            None => current.days,
        };
        let start = match input.start_time {
            Some(raw) => parse_optional_clock("start_time", Some(&raw))?,
            None => current.start_time,
        };
        let end = match input.end_time {
            Some(raw) => parse_optional_clock("end_time", Some(&raw))?,
            None => current.end_time,
        };
        check_time_order(start, end)?;
        self.reject_time_conflict(&days, start, end, Some(course_id)).await?;

        let prerequisites = match input.prerequisites {
            Some(codes) => {
                let mut ids = self.resolve_course_codes(&codes).await?;
                ids.retain(|id| *id != course_id);
                ids
            }
            None => current.prerequisites,
        };

        let course = sqlx::query_as::<_, Course>(
            "UPDATE registration.courses
             SET course_code = $2, title = $3, department = $4, seats_available = $5,
                 prerequisites = $6, days = $7, start_time = $8, end_time = $9
             WHERE id = $1
             RETURNING *",
        )
        .bind(course_id)
        .bind(course_code.trim())
        .bind(title.trim())
        .bind(department.trim())
        .bind(seats_available)
        .bind(&prerequisites)
        .bind(&days)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course"))?;

        info!("Updated course {}", course.course_code);
        Ok(course)
    }

    /// Deleting a course drops its enrollments and removes it from every
    /// other course's prerequisite list.
    pub async fn delete_course(&self, course_id: Uuid) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE registration.courses
             SET prerequisites = array_remove(prerequisites, $1)
             WHERE $1 = ANY(prerequisites)",
        )
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM registration.courses WHERE id = $1")
            .bind(course_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(ServiceError::not_found("Course"));
        }

        tx.commit().await?;
        info!("Deleted course {}", course_id);
        Ok(())
    }

    pub async fn set_seats(&self, course_id: Uuid, update: SeatUpdate) -> ServiceResult<Course> {
        check_seats(update.seats_available)?;

        let course = sqlx::query_as::<_, Course>(
            "UPDATE registration.courses SET seats_available = $2 WHERE id = $1 RETURNING *",
        )
        .bind(course_id)
        .bind(update.seats_available)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Course"))?;

        info!("Seats for {} set to {}", course.course_code, course.seats_available);
        Ok(course)
    }

    /// Prerequisite course codes to ids; unknown codes are dropped.
    async fn resolve_course_codes(&self, codes: &[String]) -> ServiceResult<Vec<Uuid>> {
        let codes: Vec<String> = codes
            .iter()
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty())
            .collect();
        if codes.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM registration.courses WHERE course_code = ANY($1) ORDER BY course_code",
        )
        .bind(&codes)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn reject_time_conflict(
        &self,
        days: &[String],
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
        exclude: Option<Uuid>,
    ) -> ServiceResult<()> {
        let Some(slot) = Slot::of(days, start, end) else {
            return Ok(());
        };

        let scheduled = sqlx::query_as::<_, Course>(
            "SELECT * FROM registration.courses
             WHERE start_time IS NOT NULL AND end_time IS NOT NULL AND days && $1",
        )
        .bind(days)
        .fetch_all(&self.pool)
        .await?;

        if let Some(clash) = find_conflict(&slot, &scheduled, exclude) {
            return Err(ServiceError::Validation(format!(
                "Time conflict: {} is scheduled at the same time on the same day",
                clash.course_code
            )));
        }
        Ok(())
    }

    /// Resolve prerequisite ids for a set of courses in one query.
    pub(super) async fn with_prerequisites(&self, courses: Vec<Course>) -> ServiceResult<Vec<CourseWithPrerequisites>> {
        let wanted: Vec<Uuid> = courses
            .iter()
            .flat_map(|course| course.prerequisites.iter().copied())
            .collect();

        let refs: HashMap<Uuid, CourseRef> = if wanted.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, CourseRef>(
                "SELECT id, course_code, title, seats_available
                 FROM registration.courses WHERE id = ANY($1)",
            )
            .bind(&wanted)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|course| (course.id, course))
            .collect()
        };

        Ok(courses
            .into_iter()
            .map(|course| CourseWithPrerequisites {
                prerequisites: course
                    .prerequisites
                    .iter()
                    .filter_map(|id| refs.get(id).cloned())
                    .collect(),
                id: course.id,
                course_code: course.course_code,
                title: course.title,
                seats_available: course.seats_available,
            })
            .collect())
    }
}

fn check_seats(seats: i32) -> ServiceResult<()> {
    if seats < 0 {
        return Err(ServiceError::invalid("seats_available", "cannot be negative"));
    }
    Ok(())
}
