use sqlx::{Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use super::TutoringService;
use crate::database::models::tutoring::{
    CreateReview, ReviewWithAuthor, SessionStatus, TutorReview, TutorSearch, TutorStatusFilter, TutorSummary,
    TutoringRole, TutoringSession, TutoringUser, VerificationStatus, VerifyTutor,
};
use crate::services::{contains_pattern, require_rating, ServiceError, ServiceResult};

const TUTOR_SUMMARY_SELECT: &str = "SELECT u.id, u.username, u.first_name, u.last_name, u.location, u.subjects,
        u.hourly_rate, u.teaching_preferences,
        AVG(r.rating)::float8 AS average_rating, COUNT(r.id) AS review_count
     FROM tutoring.users u
     LEFT JOIN tutoring.reviews r ON r.tutor_id = u.id";

const TUTOR_SUMMARY_GROUP: &str = " GROUP BY u.id";

impl TutoringService {
    /// Review a completed session the student attended. One review per session.
    pub async fn create_review(&self, student_id: Uuid, request: CreateReview) -> ServiceResult<TutorReview> {
        require_rating(request.rating)?;

        let session = sqlx::query_as::<_, TutoringSession>(
            "SELECT * FROM tutoring.sessions WHERE id = $1 AND student_id = $2",
        )
        .bind(request.session_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session"))?;

        if session.status != SessionStatus::Completed {
            return Err(ServiceError::Validation("Only completed sessions can be reviewed".to_string()));
        }

        let reviewed: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tutoring.reviews WHERE session_id = $1)")
            .bind(session.id)
            .fetch_one(&self.pool)
            .await?;
        if reviewed {
            return Err(ServiceError::Conflict("Session already reviewed".to_string()));
        }

        let review = sqlx::query_as::<_, TutorReview>(
            "INSERT INTO tutoring.reviews (student_id, tutor_id, session_id, rating, review_text)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(student_id)
        .bind(session.tutor_id)
        .bind(session.id)
        .bind(request.rating)
        .bind(request.review_text)
        .fetch_one(&self.pool)
        .await?;

        info!("Review {} left for tutor {}", review.id, review.tutor_id);
        Ok(review)
    }

    pub async fn tutor_reviews(&self, tutor_id: Uuid) -> ServiceResult<Vec<ReviewWithAuthor>> {
        let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
            "SELECT r.*, u.username AS student_username
             FROM tutoring.reviews r
             JOIN tutoring.users u ON u.id = r.student_id
             WHERE r.tutor_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(tutor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// Approved tutors filtered by subject, city and maximum rate.
    pub async fn search_tutors(&self, search: TutorSearch) -> ServiceResult<Vec<TutorSummary>> {
        let mut query = QueryBuilder::<Postgres>::new(TUTOR_SUMMARY_SELECT);
        query.push(" WHERE u.role = 'tutor' AND u.verification_status = 'approved'");

        if let Some(subject) = search.subject.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query
                .push(" AND EXISTS (SELECT 1 FROM unnest(u.subjects) s WHERE s ILIKE ")
                .push_bind(contains_pattern(subject))
                .push(" ESCAPE '\\')");
        }
        if let Some(location) = search.location.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query
                .push(" AND u.location ILIKE ")
                .push_bind(contains_pattern(location))
                .push(" ESCAPE '\\'");
        }
        if let Some(max_rate) = search.max_rate {
            query.push(" AND u.hourly_rate <= ").push_bind(max_rate);
        }
        query.push(TUTOR_SUMMARY_GROUP);
        query.push(" ORDER BY average_rating DESC NULLS LAST, u.username");

        let tutors = query.build_query_as::<TutorSummary>().fetch_all(&self.pool).await?;
        Ok(tutors)
    }

    pub async fn wishlist(&self, student_id: Uuid) -> ServiceResult<Vec<TutorSummary>> {
        let query = format!(
            "{} JOIN tutoring.wishlist w ON w.tutor_id = u.id WHERE w.student_id = $1{} ORDER BY MAX(w.added_at) DESC",
            TUTOR_SUMMARY_SELECT, TUTOR_SUMMARY_GROUP
        );
        let tutors = sqlx::query_as::<_, TutorSummary>(&query)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tutors)
    }

    /// Adding a tutor twice is a no-op.
    pub async fn add_to_wishlist(&self, student_id: Uuid, tutor_id: Uuid) -> ServiceResult<Vec<TutorSummary>> {
        let is_tutor: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tutoring.users WHERE id = $1 AND role = 'tutor')")
            .bind(tutor_id)
            .fetch_one(&self.pool)
            .await?;
        if !is_tutor {
            return Err(ServiceError::not_found("Tutor"));
        }

        sqlx::query(
            "INSERT INTO tutoring.wishlist (student_id, tutor_id) VALUES ($1, $2)
             ON CONFLICT (student_id, tutor_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(tutor_id)
        .execute(&self.pool)
        .await?;
        self.wishlist(student_id).await
    }

    pub async fn remove_from_wishlist(&self, student_id: Uuid, tutor_id: Uuid) -> ServiceResult<Vec<TutorSummary>> {
        let removed = sqlx::query("DELETE FROM tutoring.wishlist WHERE student_id = $1 AND tutor_id = $2")
            .bind(student_id)
            .bind(tutor_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::NotFound("Tutor not in wishlist".to_string()));
        }
        self.wishlist(student_id).await
    }

    pub async fn list_tutors(&self, filter: TutorStatusFilter) -> ServiceResult<Vec<TutoringUser>> {
        let tutors = sqlx::query_as::<_, TutoringUser>(
            "SELECT * FROM tutoring.users
             WHERE role = $1 AND ($2::text IS NULL OR verification_status = $2)
             ORDER BY created_at DESC",
        )
        .bind(TutoringRole::Tutor)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(tutors)
    }

    /// Approve or reject a pending tutor.
    pub async fn verify_tutor(&self, tutor_id: Uuid, request: VerifyTutor) -> ServiceResult<TutoringUser> {
        if request.status == VerificationStatus::Pending {
            return Err(ServiceError::invalid("status", "must be approved or rejected"));
        }
        let comments = request
            .comments
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "No comments provided".to_string());

        let tutor = sqlx::query_as::<_, TutoringUser>(
            "UPDATE tutoring.users
             SET verification_status = $2, verification_comments = $3, updated_at = now()
             WHERE id = $1 AND role = 'tutor'
             RETURNING *",
        )
        .bind(tutor_id)
        .bind(request.status)
        .bind(comments)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Tutor"))?;

        info!("Tutor {} verification set to {}", tutor.username, request.status);
        Ok(tutor)
    }
}
