//! Platform analytics for admins, exportable as CSV.

use serde::Serialize;

use super::FreelanceService;
use crate::database::models::freelance::{DailyCount, PlatformStats, RevenueStats, SkillCount};
use crate::services::{ServiceError, ServiceResult};

/// A report row that can be exported; `HEADER` names its serialized fields in order.
pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
}

impl CsvRow for PlatformStats {
    const HEADER: &'static [&'static str] = &[
        "total_users",
        "total_freelancers",
        "total_clients",
        "total_projects",
        "total_bids",
        "total_reviews",
        "completed_projects",
    ];
}

impl CsvRow for SkillCount {
    const HEADER: &'static [&'static str] = &["skill", "count"];
}

impl CsvRow for RevenueStats {
    const HEADER: &'static [&'static str] = &["total_revenue", "avg_project_budget"];
}

impl CsvRow for DailyCount {
    const HEADER: &'static [&'static str] = &["day", "count"];
}

/// Render report rows as CSV. The header row is written even when there are no rows.
pub fn to_csv<T: CsvRow>(rows: &[T]) -> ServiceResult<String> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer
        .write_record(T::HEADER)
        .map_err(|e| ServiceError::Export(format!("Failed to write CSV header: {}", e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ServiceError::Export(format!("Failed to write CSV row: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Export(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::Export(e.to_string()))
}

impl FreelanceService {
    pub async fn platform_stats(&self) -> ServiceResult<PlatformStats> {
        let stats = sqlx::query_as::<_, PlatformStats>(
            "SELECT (SELECT COUNT(*) FROM freelance.users) AS total_users,
                    (SELECT COUNT(*) FROM freelance.users WHERE role = 'freelancer') AS total_freelancers,
                    (SELECT COUNT(*) FROM freelance.users WHERE role = 'client') AS total_clients,
                    (SELECT COUNT(*) FROM freelance.projects) AS total_projects,
                    (SELECT COUNT(*) FROM freelance.bids) AS total_bids,
                    (SELECT COUNT(*) FROM freelance.reviews) AS total_reviews,
                    (SELECT COUNT(*) FROM freelance.projects WHERE status = 'completed') AS completed_projects",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    /// How many freelancers list each skill, most common first.
    pub async fn skill_popularity(&self) -> ServiceResult<Vec<SkillCount>> {
        let skills = sqlx::query_as::<_, SkillCount>(
            "SELECT skill, COUNT(*) AS count
             FROM freelance.users, unnest(skills) AS skill
             WHERE role = 'freelancer'
             GROUP BY skill
             ORDER BY count DESC, skill",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    /// Sum and average budget of completed projects.
    pub async fn revenue_stats(&self) -> ServiceResult<RevenueStats> {
        let revenue = sqlx::query_as::<_, RevenueStats>(
            "SELECT COALESCE(SUM(budget), 0) AS total_revenue,
                    COALESCE(ROUND(AVG(budget), 2), 0) AS avg_project_budget
             FROM freelance.projects
             WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(revenue)
    }

    pub async fn signup_trends(&self) -> ServiceResult<Vec<DailyCount>> {
        self.daily_counts("freelance.users").await
    }

    pub async fn project_trends(&self) -> ServiceResult<Vec<DailyCount>> {
        self.daily_counts("freelance.projects").await
    }

    /// Rows created per day over the last 30 days.
    async fn daily_counts(&self, table: &'static str) -> ServiceResult<Vec<DailyCount>> {
        let query = format!(
            "SELECT to_char(created_at, 'YYYY-MM-DD') AS day, COUNT(*) AS count
             FROM {}
             WHERE created_at >= now() - interval '30 days'
             GROUP BY day
             ORDER BY day",
            table
        );
        let days = sqlx::query_as::<_, DailyCount>(&query).fetch_all(&self.pool).await?;
        Ok(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn csv_has_header_and_rows() {
        let rows = vec![
            SkillCount {
                skill: "rust".into(),
                count: 3,
            },
            SkillCount {
                skill: "sql, postgres".into(),
                count: 1,
            },
        ];
        let csv = to_csv(&rows).unwrap();
        assert_eq!(csv, "skill,count\nrust,3\n\"sql, postgres\",1\n");
    }

    #[test]
    fn csv_renders_decimals() {
        let rows = vec![RevenueStats {
            total_revenue: Decimal::new(150050, 2),
            avg_project_budget: Decimal::new(75025, 2),
        }];
        let csv = to_csv(&rows).unwrap();
        assert_eq!(csv, "total_revenue,avg_project_budget\n1500.50,750.25\n");
    }

    #[test]
    fn empty_report_still_has_header() {
        let rows: Vec<DailyCount> = Vec::new();
        assert_eq!(to_csv(&rows).unwrap(), "day,count\n");
    }

    #[test]
    fn platform_header_matches_fields() {
        let stats = PlatformStats {
            total_users: 9,
            total_freelancers: 4,
            total_clients: 4,
            total_projects: 3,
            total_bids: 5,
            total_reviews: 1,
            completed_projects: 1,
        };
        let csv = to_csv(std::slice::from_ref(&stats)).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(PlatformStats::HEADER.join(",").as_str()));
        assert_eq!(lines.next(), Some("9,4,4,3,5,1,1"));
    }
}
