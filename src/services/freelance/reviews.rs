use tracing::info;
use uuid::Uuid;

use super::notifications::notify;
use super::projects::load_project;
use super::FreelanceService;
use crate::database::models::freelance::{CreateReview, FreelanceReview, NotificationKind, ReviewOverview};
use crate::services::{require_rating, require_text, ServiceError, ServiceResult};

impl FreelanceService {
    /// A client reviews the freelancer assigned to one of their projects.
    pub async fn create_review(&self, client_id: Uuid, request: CreateReview) -> ServiceResult<FreelanceReview> {
        require_rating(request.rating)?;

        let mut tx = self.pool.begin().await?;
        let project = load_project(&mut *tx, request.project_id).await?;
        if project.client_id != client_id {
            return Err(ServiceError::Forbidden("Not your project".to_string()));
        }
        let freelancer_id = project
            .freelancer_id
            .ok_or_else(|| ServiceError::Validation("Project has no assigned freelancer".to_string()))?;

        let reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM freelance.reviews WHERE project_id = $1 AND client_id = $2)",
        )
        .bind(project.id)
        .bind(client_id)
        .fetch_one(&mut *tx)
        .await?;
        if reviewed {
            return Err(ServiceError::Conflict("Project already reviewed".to_string()));
        }

        let review = sqlx::query_as::<_, FreelanceReview>(
            "INSERT INTO freelance.reviews (project_id, client_id, freelancer_id, rating, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(project.id)
        .bind(client_id)
        .bind(freelancer_id)
        .bind(request.rating)
        .bind(request.comment)
        .fetch_one(&mut *tx)
        .await?;

        notify(
            &mut *tx,
            freelancer_id,
            NotificationKind::System,
            format!("You received a {}-star review on \"{}\"", review.rating, project.title),
        )
        .await?;

        tx.commit().await?;
        info!("Review {} left for freelancer {}", review.id, freelancer_id);
        Ok(review)
    }

    pub async fn respond_to_review(&self, freelancer_id: Uuid, review_id: Uuid, response: String) -> ServiceResult<FreelanceReview> {
        require_text("freelancer_response", &response)?;

        let review = sqlx::query_as::<_, FreelanceReview>("SELECT * FROM freelance.reviews WHERE id = $1")
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Review"))?;
        if review.freelancer_id != freelancer_id {
            return Err(ServiceError::Forbidden("Only the reviewed freelancer can respond".to_string()));
        }

        let review = sqlx::query_as::<_, FreelanceReview>(
            "UPDATE freelance.reviews SET freelancer_response = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(review_id)
        .bind(response.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(review)
    }

    pub async fn freelancer_reviews(&self, freelancer_id: Uuid) -> ServiceResult<Vec<FreelanceReview>> {
        let reviews = sqlx::query_as::<_, FreelanceReview>(
            "SELECT * FROM freelance.reviews WHERE freelancer_id = $1 ORDER BY created_at DESC",
        )
        .bind(freelancer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    pub async fn all_reviews(&self) -> ServiceResult<Vec<ReviewOverview>> {
        let reviews = sqlx::query_as::<_, ReviewOverview>(
            "SELECT r.*, c.name AS client_name, f.name AS freelancer_name, p.title AS project_title
             FROM freelance.reviews r
             JOIN freelance.users c ON c.id = r.client_id
             JOIN freelance.users f ON f.id = r.freelancer_id
             JOIN freelance.projects p ON p.id = r.project_id
             ORDER BY r.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }
}
