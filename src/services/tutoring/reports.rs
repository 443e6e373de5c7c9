use serde::Serialize;

use super::earnings::completion_rate;
use super::TutoringService;
use crate::database::models::tutoring::{CityCount, CompletionRate, MonthCount, SubjectCount};
use crate::services::ServiceResult;

/// Monthly signups, split by role.
#[derive(Debug, Clone, Serialize)]
pub struct UserGrowth {
    pub students: Vec<MonthCount>,
    pub tutors: Vec<MonthCount>,
}

impl TutoringService {
    /// Five most booked subjects.
    pub async fn popular_subjects(&self) -> ServiceResult<Vec<SubjectCount>> {
        let subjects = sqlx::query_as::<_, SubjectCount>(
            "SELECT subject, COUNT(*) AS count
             FROM tutoring.sessions
             GROUP BY subject
             ORDER BY count DESC, subject
             LIMIT 5",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(subjects)
    }

    pub async fn session_completion_rate(&self) -> ServiceResult<CompletionRate> {
        let (completed, total): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*) FILTER (WHERE status = 'completed'), COUNT(*) FROM tutoring.sessions",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(completion_rate(completed, total))
    }

    /// Users per city; users without a location are grouped under null.
    pub async fn usage_by_city(&self) -> ServiceResult<Vec<CityCount>> {
        let cities = sqlx::query_as::<_, CityCount>(
            "SELECT location, COUNT(*) AS count
             FROM tutoring.users
             WHERE role <> 'admin'
             GROUP BY location
             ORDER BY count DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(cities)
    }

    pub async fn user_growth(&self) -> ServiceResult<UserGrowth> {
        let students = self.signups_per_month("student").await?;
        let tutors = self.signups_per_month("tutor").await?;
        Ok(UserGrowth { students, tutors })
    }

    async fn signups_per_month(&self, role: &str) -> ServiceResult<Vec<MonthCount>> {
        let months = sqlx::query_as::<_, MonthCount>(
            "SELECT to_char(created_at, 'YYYY-MM') AS month, COUNT(*) AS count
             FROM tutoring.users
             WHERE role = $1
             GROUP BY month
             ORDER BY month",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(months)
    }
}
