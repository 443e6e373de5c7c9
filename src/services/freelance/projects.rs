use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::notifications::notify;
use super::{Actor, FreelanceService};
use crate::database::models::freelance::{
    CreateMilestone, CreateProject, CreateTimeLog, FreelanceRole, Milestone, NotificationKind, Project,
    ProjectDetail, ProjectListing, ProjectStatus, TimeLog, UpdateMilestone, UpdateProject,
};
use crate::services::{require_text, ServiceError, ServiceResult};

const PROJECT_LISTING_SELECT: &str = "SELECT p.*, c.name AS client_name, c.email AS client_email,
        f.name AS freelancer_name, f.email AS freelancer_email
     FROM freelance.projects p
     JOIN freelance.users c ON c.id = p.client_id
     LEFT JOIN freelance.users f ON f.id = p.freelancer_id";

fn check_budget(budget: Decimal) -> ServiceResult<()> {
    if budget.is_sign_negative() {
        return Err(ServiceError::invalid("budget", "cannot be negative"));
    }
    Ok(())
}

fn check_progress(progress: i32) -> ServiceResult<()> {
    if !(0..=100).contains(&progress) {
        return Err(ServiceError::invalid("progress", "must be between 0 and 100"));
    }
    Ok(())
}

pub(super) async fn load_project(conn: &mut PgConnection, project_id: Uuid) -> ServiceResult<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM freelance.projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Project"))
}

impl FreelanceService {
    pub async fn create_project(&self, client_id: Uuid, input: CreateProject) -> ServiceResult<Project> {
        require_text("title", &input.title)?;
        require_text("description", &input.description)?;
        require_text("category", &input.category)?;
        check_budget(input.budget)?;

        let project = sqlx::query_as::<_, Project>(
            "INSERT INTO freelance.projects (title, description, category, budget, deadline, is_hourly, client_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.category.trim())
        .bind(input.budget)
        .bind(input.deadline)
        .bind(input.is_hourly)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Project {} posted by {}", project.id, client_id);
        Ok(project)
    }

    /// Freelancers see their own and unassigned projects, clients their own, admins all.
    pub async fn list_projects(&self, actor: Actor) -> ServiceResult<Vec<ProjectListing>> {
        let mut query = QueryBuilder::<Postgres>::new(PROJECT_LISTING_SELECT);
        match actor.role {
            FreelanceRole::Freelancer => {
                query
                    .push(" WHERE p.freelancer_id = ")
                    .push_bind(actor.id)
                    .push(" OR p.freelancer_id IS NULL");
            }
            FreelanceRole::Client => {
                query.push(" WHERE p.client_id = ").push_bind(actor.id);
            }
            FreelanceRole::Admin => {}
        }
        query.push(" ORDER BY p.created_at DESC");

        let projects = query.build_query_as::<ProjectListing>().fetch_all(&self.pool).await?;
        Ok(projects)
    }

    pub async fn get_project(&self, project_id: Uuid) -> ServiceResult<ProjectDetail> {
        let query = format!("{} WHERE p.id = $1", PROJECT_LISTING_SELECT);
        let listing = sqlx::query_as::<_, ProjectListing>(&query)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project"))?;

        let milestones = sqlx::query_as::<_, Milestone>(
            "SELECT * FROM freelance.milestones WHERE project_id = $1 ORDER BY due_date NULLS LAST, title",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        let time_logs = sqlx::query_as::<_, TimeLog>("SELECT * FROM freelance.time_logs WHERE project_id = $1 ORDER BY date")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ProjectDetail {
            listing,
            milestones,
            time_logs,
        })
    }

    /// Patch a project. Allowed for the owning client, the assigned freelancer and admins.
    pub async fn update_project(&self, actor: Actor, project_id: Uuid, update: UpdateProject) -> ServiceResult<Project> {
        if let Some(title) = &update.title {
            require_text("title", title)?;
        }
        if let Some(budget) = update.budget {
            check_budget(budget)?;
        }
        if let Some(progress) = update.progress {
            check_progress(progress)?;
        }

        let mut conn = self.pool.acquire().await?;
        let current = load_project(&mut *conn, project_id).await?;
        let allowed =
            actor.is_admin() || current.client_id == actor.id || current.freelancer_id == Some(actor.id);
        if !allowed {
            return Err(ServiceError::Forbidden("Not authorized to update this project".to_string()));
        }

        let project = sqlx::query_as::<_, Project>(
            "UPDATE freelance.projects
             SET title = $2, description = $3, category = $4, budget = $5, deadline = $6,
                 status = $7, progress = $8, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(project_id)
        .bind(update.title.map(|t| t.trim().to_string()).unwrap_or(current.title))
        .bind(update.description.unwrap_or(current.description))
        .bind(update.category.unwrap_or(current.category))
        .bind(update.budget.unwrap_or(current.budget))
        .bind(update.deadline.unwrap_or(current.deadline))
        .bind(update.status.unwrap_or(current.status))
        .bind(update.progress.unwrap_or(current.progress))
        .fetch_one(&mut *conn)
        .await?;
        Ok(project)
    }

    pub async fn assign_freelancer(&self, client_id: Uuid, project_id: Uuid, freelancer_id: Uuid) -> ServiceResult<Project> {
        let mut tx = self.pool.begin().await?;

        let project = load_project(&mut *tx, project_id).await?;
        if project.client_id != client_id {
            return Err(ServiceError::Forbidden("Not authorized to assign this project".to_string()));
        }

        let role: Option<FreelanceRole> = sqlx::query_scalar("SELECT role FROM freelance.users WHERE id = $1")
            .bind(freelancer_id)
            .fetch_optional(&mut *tx)
            .await?;
        match role {
            None => return Err(ServiceError::not_found("Freelancer")),
            Some(FreelanceRole::Freelancer) => {}
            Some(_) => return Err(ServiceError::invalid("freelancer_id", "user is not a freelancer")),
        }

        let project = sqlx::query_as::<_, Project>(
            "UPDATE freelance.projects SET freelancer_id = $2, status = $3, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(project_id)
        .bind(freelancer_id)
        .bind(ProjectStatus::InProgress)
        .fetch_one(&mut *tx)
        .await?;

        notify(
            &mut *tx,
            freelancer_id,
            NotificationKind::Project,
            format!("You were assigned to project \"{}\"", project.title),
        )
        .await?;

        tx.commit().await?;
        info!("Project {} assigned to {}", project.id, freelancer_id);
        Ok(project)
    }

    pub async fn add_milestone(&self, client_id: Uuid, project_id: Uuid, input: CreateMilestone) -> ServiceResult<Vec<Milestone>> {
        require_text("title", &input.title)?;
        let mut conn = self.pool.acquire().await?;

        let project = load_project(&mut *conn, project_id).await?;
        if project.client_id != client_id {
            return Err(ServiceError::Forbidden("Not your project".to_string()));
        }

        sqlx::query("INSERT INTO freelance.milestones (project_id, title, due_date) VALUES ($1, $2, $3)")
            .bind(project_id)
            .bind(input.title.trim())
            .bind(input.due_date)
            .execute(&mut *conn)
            .await?;

        let milestones = sqlx::query_as::<_, Milestone>(
            "SELECT * FROM freelance.milestones WHERE project_id = $1 ORDER BY due_date NULLS LAST, title",
        )
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(milestones)
    }

    /// The owning client or the assigned freelancer may move a milestone.
    pub async fn update_milestone(
        &self,
        actor: Actor,
        project_id: Uuid,
        milestone_id: Uuid,
        update: UpdateMilestone,
    ) -> ServiceResult<Milestone> {
        let mut conn = self.pool.acquire().await?;

        let project = load_project(&mut *conn, project_id).await?;
        if project.client_id != actor.id && project.freelancer_id != Some(actor.id) {
            return Err(ServiceError::Forbidden("Not your project".to_string()));
        }

        sqlx::query_as::<_, Milestone>(
            "UPDATE freelance.milestones SET status = $3 WHERE id = $1 AND project_id = $2 RETURNING *",
        )
        .bind(milestone_id)
        .bind(project_id)
        .bind(update.status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Milestone"))
    }

    pub async fn log_time(&self, freelancer_id: Uuid, project_id: Uuid, input: CreateTimeLog) -> ServiceResult<Vec<TimeLog>> {
        if input.hours <= Decimal::ZERO {
            return Err(ServiceError::invalid("hours", "must be greater than zero"));
        }
        let mut conn = self.pool.acquire().await?;

        let project = load_project(&mut *conn, project_id).await?;
        if project.freelancer_id != Some(freelancer_id) {
            return Err(ServiceError::Forbidden("Not your project".to_string()));
        }

        sqlx::query("INSERT INTO freelance.time_logs (project_id, date, hours) VALUES ($1, $2, $3)")
            .bind(project_id)
            .bind(input.date)
            .bind(input.hours)
            .execute(&mut *conn)
            .await?;

        let logs = sqlx::query_as::<_, TimeLog>("SELECT * FROM freelance.time_logs WHERE project_id = $1 ORDER BY date")
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(logs)
    }

    pub async fn delete_project(&self, actor: Actor, project_id: Uuid) -> ServiceResult<()> {
        let mut conn = self.pool.acquire().await?;

        let project = load_project(&mut *conn, project_id).await?;
        if !actor.is_admin() && project.client_id != actor.id {
            return Err(ServiceError::Forbidden("Not authorized to delete this project".to_string()));
        }

        sqlx::query("DELETE FROM freelance.projects WHERE id = $1")
            .bind(project_id)
            .execute(&mut *conn)
            .await?;
        info!("Project {} deleted by {}", project_id, actor.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bounds() {
        assert!(check_progress(0).is_ok());
        assert!(check_progress(100).is_ok());
        assert!(check_progress(101).is_err());
        assert!(check_progress(-1).is_err());
    }

    #[test]
    fn negative_budget_is_rejected() {
        assert!(check_budget(Decimal::new(-1, 0)).is_err());
        assert!(check_budget(Decimal::ZERO).is_ok());
    }
}
