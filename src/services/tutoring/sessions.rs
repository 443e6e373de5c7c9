use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::earnings::{session_price, summarize_earnings};
use super::TutoringService;
use crate::database::models::tutoring::{
    BookSession, EarningsSummary, SessionStatus, SessionWithContact, TutoringRole, TutoringSession, TutoringUser,
    VerificationStatus,
};
use crate::services::{require_text, ServiceError, ServiceResult};

impl TutoringService {
    /// Sessions booked with a tutor, each carrying the student's contact details.
    pub async fn tutor_sessions(&self, tutor_id: Uuid) -> ServiceResult<Vec<SessionWithContact>> {
        let sessions = sqlx::query_as::<_, SessionWithContact>(
            "SELECT s.*, u.username AS counterpart_username, u.email AS counterpart_email
             FROM tutoring.sessions s
             JOIN tutoring.users u ON u.id = s.student_id
             WHERE s.tutor_id = $1
             ORDER BY s.date DESC, s.time DESC",
        )
        .bind(tutor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    /// Sessions a student booked, each carrying the tutor's contact details.
    pub async fn student_sessions(&self, student_id: Uuid) -> ServiceResult<Vec<SessionWithContact>> {
        let sessions = sqlx::query_as::<_, SessionWithContact>(
            "SELECT s.*, u.username AS counterpart_username, u.email AS counterpart_email
             FROM tutoring.sessions s
             JOIN tutoring.users u ON u.id = s.tutor_id
             WHERE s.student_id = $1
             ORDER BY s.date DESC, s.time DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    /// A tutor accepts, declines or completes one of their own sessions.
    pub async fn set_session_status(
        &self,
        tutor_id: Uuid,
        session_id: Uuid,
        status: SessionStatus,
    ) -> ServiceResult<TutoringSession> {
        if status == SessionStatus::Pending {
            return Err(ServiceError::invalid("status", "must be accepted, declined or completed"));
        }

        let session = sqlx::query_as::<_, TutoringSession>(
            "UPDATE tutoring.sessions
             SET status = $3,
                 payment_status = CASE WHEN $3 = 'completed' THEN 'completed' ELSE payment_status END,
                 updated_at = now()
             WHERE id = $1 AND tutor_id = $2
             RETURNING *",
        )
        .bind(session_id)
        .bind(tutor_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Session"))?;

        info!("Session {} marked {}", session.id, session.status);
        Ok(session)
    }

    pub async fn earnings(&self, tutor_id: Uuid) -> ServiceResult<EarningsSummary> {
        let completed: Vec<(NaiveDate, Decimal)> = sqlx::query_as(
            "SELECT date, earnings FROM tutoring.sessions WHERE tutor_id = $1 AND status = 'completed'",
        )
        .bind(tutor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(summarize_earnings(&completed, Utc::now().date_naive()))
    }

    /// Book a session with an approved tutor at the tutor's current rate.
    pub async fn book_session(&self, student_id: Uuid, request: BookSession) -> ServiceResult<TutoringSession> {
        require_text("subject", &request.subject)?;
        require_text("time", &request.time)?;
        if request.duration <= Decimal::ZERO {
            return Err(ServiceError::invalid("duration", "must be greater than zero"));
        }

        let tutor = sqlx::query_as::<_, TutoringUser>("SELECT * FROM tutoring.users WHERE id = $1 AND role = $2")
            .bind(request.tutor_id)
            .bind(TutoringRole::Tutor)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Tutor"))?;

        if tutor.verification_status != Some(VerificationStatus::Approved) {
            return Err(ServiceError::Validation("Tutor is not verified".to_string()));
        }
        let rate = tutor
            .hourly_rate
            .ok_or_else(|| ServiceError::Validation("Tutor has not set an hourly rate".to_string()))?;

        let session = sqlx::query_as::<_, TutoringSession>(
            "INSERT INTO tutoring.sessions
                (tutor_id, student_id, subject, date, time, duration, session_type, earnings)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(tutor.id)
        .bind(student_id)
        .bind(request.subject.trim())
        .bind(request.date)
        .bind(request.time.trim())
        .bind(request.duration)
        .bind(request.session_type)
        .bind(session_price(rate, request.duration))
        .fetch_one(&self.pool)
        .await?;

        info!("Session {} booked with tutor {}", session.id, tutor.username);
        Ok(session)
    }
}
