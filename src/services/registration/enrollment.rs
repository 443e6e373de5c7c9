use std::collections::HashMap;

use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use super::schedule::expand_schedule;
use super::{ensure_student, RegistrationService};
use crate::database::models::registration::{
    Course, CourseRef, CourseWithPrerequisites, ScheduleEntry, Student, StudentWithCourses,
};
use crate::services::{ServiceError, ServiceResult};

#[derive(FromRow)]
struct EnrollmentRow {
    student_id: Uuid,
    #[sqlx(flatten)]
    course: CourseRef,
}

impl RegistrationService {
    /// Register a student for a course, taking one seat.
    pub async fn register(&self, student_id: Uuid, course_id: Uuid) -> ServiceResult<Course> {
        let mut tx = self.pool.begin().await?;

        ensure_student(&mut *tx, student_id).await?;

        let course = sqlx::query_as::<_, Course>("SELECT * FROM registration.courses WHERE id = $1 FOR UPDATE")
            .bind(course_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::not_found("Course"))?;

        if course.seats_available <= 0 {
            return Err(ServiceError::Validation("No seats available".to_string()));
        }

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM registration.enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;
        if already {
            return Err(ServiceError::Validation("Already registered for this course".to_string()));
        }

        let course = sqlx::query_as::<_, Course>(
            "UPDATE registration.courses
             SET seats_available = seats_available - 1
             WHERE id = $1 AND seats_available > 0
             RETURNING *",
        )
        .bind(course_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::Validation("No seats available".to_string()))?;

        sqlx::query("INSERT INTO registration.enrollments (student_id, course_id) VALUES ($1, $2)")
            .bind(student_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Student {} registered for {}", student_id, course.course_code);
        Ok(course)
    }

    /// Drop a registration, giving the seat back.
    pub async fn drop_course(&self, student_id: Uuid, course_id: Uuid) -> ServiceResult<Course> {
        let mut tx = self.pool.begin().await?;

        ensure_student(&mut *tx, student_id).await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM registration.courses WHERE id = $1)")
            .bind(course_id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(ServiceError::not_found("Course"));
        }

        let removed = sqlx::query("DELETE FROM registration.enrollments WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::Validation("Not registered in this course".to_string()));
        }

        let course = sqlx::query_as::<_, Course>(
            "UPDATE registration.courses SET seats_available = seats_available + 1 WHERE id = $1 RETURNING *",
        )
        .bind(course_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Student {} dropped {}", student_id, course.course_code);
        Ok(course)
    }

    pub async fn registered_courses(&self, student_id: Uuid) -> ServiceResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT c.* FROM registration.courses c
             JOIN registration.enrollments e ON e.course_id = c.id
             WHERE e.student_id = $1
             ORDER BY c.course_code",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn schedule(&self, student_id: Uuid) -> ServiceResult<Vec<ScheduleEntry>> {
        let courses = self.registered_courses(student_id).await?;
        Ok(expand_schedule(&courses))
    }

    /// Registered courses with their prerequisite courses resolved.
    pub async fn prerequisites_for_student(&self, student_id: Uuid) -> ServiceResult<Vec<CourseWithPrerequisites>> {
        let courses = self.registered_courses(student_id).await?;
        self.with_prerequisites(courses).await
    }

    pub async fn students_with_courses(&self) -> ServiceResult<Vec<StudentWithCourses>> {
        let students = sqlx::query_as::<_, Student>("SELECT * FROM registration.students ORDER BY roll_number")
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, EnrollmentRow>(
            "SELECT e.student_id, c.id, c.course_code, c.title, c.seats_available
             FROM registration.enrollments e
             JOIN registration.courses c ON c.id = e.course_id
             ORDER BY c.course_code",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_student: HashMap<Uuid, Vec<CourseRef>> = HashMap::new();
        for row in rows {
            by_student.entry(row.student_id).or_default().push(row.course);
        }

        Ok(students
            .into_iter()
            .map(|student| StudentWithCourses {
                courses: by_student.remove(&student.id).unwrap_or_default(),
                student,
            })
            .collect())
    }
}
