use uuid::Uuid;

use super::RegistrationService;
use crate::database::models::registration::{Course, CourseWithPrerequisites, EnrolledStudent};
use crate::services::ServiceResult;

impl RegistrationService {
    /// Students registered in one course.
    pub async fn students_in_course(&self, course_id: Uuid) -> ServiceResult<Vec<EnrolledStudent>> {
        self.get_course(course_id).await?;

        let students = sqlx::query_as::<_, EnrolledStudent>(
            "SELECT s.id, s.name, s.roll_number
             FROM registration.enrollments e
             JOIN registration.students s ON s.id = e.student_id
             WHERE e.course_id = $1
             ORDER BY s.roll_number",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    pub async fn courses_with_open_seats(&self) -> ServiceResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM registration.courses WHERE seats_available > 0 ORDER BY course_code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    pub async fn prerequisite_report(&self) -> ServiceResult<Vec<CourseWithPrerequisites>> {
        let courses = self.list_courses().await?;
        self.with_prerequisites(courses).await
    }
}
