use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

use super::notifications::notify;
use super::FreelanceService;
use crate::database::models::freelance::{
    AdminActionLog, AdminDashboard, FreelanceRole, FreelanceUser, NotificationKind, RequestStatus,
    VerificationRequest, VerificationRequestWithUser,
};
use crate::services::{ServiceError, ServiceResult};

/// Append to the admin audit trail inside the caller's transaction.
async fn log_action(
    conn: &mut PgConnection,
    admin_id: Uuid,
    action: &str,
    target_type: &str,
    target_id: Uuid,
    note: impl Into<String>,
) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO freelance.admin_action_logs (admin_id, action, target_type, target_id, note)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(admin_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(note.into())
    .execute(conn)
    .await?;
    Ok(())
}

impl FreelanceService {
    /// A user asks to be verified. Only one request may be pending at a time.
    pub async fn request_verification(&self, user_id: Uuid) -> ServiceResult<VerificationRequest> {
        let pending: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM freelance.verification_requests WHERE user_id = $1 AND status = 'pending')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        if pending {
            return Err(ServiceError::Conflict("A verification request is already pending".to_string()));
        }

        let request = sqlx::query_as::<_, VerificationRequest>(
            "INSERT INTO freelance.verification_requests (user_id) VALUES ($1) RETURNING *",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    pub async fn list_users(&self) -> ServiceResult<Vec<FreelanceUser>> {
        let users = sqlx::query_as::<_, FreelanceUser>("SELECT * FROM freelance.users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn set_user_role(&self, admin_id: Uuid, user_id: Uuid, role: FreelanceRole) -> ServiceResult<FreelanceUser> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, FreelanceUser>(
            "UPDATE freelance.users SET role = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .bind(role)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;

        log_action(&mut *tx, admin_id, "Updated User Role", "User", user_id, format!("Role changed to {}", role)).await?;

        tx.commit().await?;
        info!("Admin {} set role of {} to {}", admin_id, user.email, role);
        Ok(user)
    }

    pub async fn suspend_user(&self, admin_id: Uuid, user_id: Uuid) -> ServiceResult<FreelanceUser> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, FreelanceUser>(
            "UPDATE freelance.users SET is_banned = TRUE, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;

        log_action(&mut *tx, admin_id, "Suspended User", "User", user_id, "User suspended").await?;

        tx.commit().await?;
        info!("Admin {} suspended {}", admin_id, user.email);
        Ok(user)
    }

    pub async fn verification_requests(&self) -> ServiceResult<Vec<VerificationRequestWithUser>> {
        let requests = sqlx::query_as::<_, VerificationRequestWithUser>(
            "SELECT v.*, u.name AS user_name, u.email AS user_email, u.verification_level
             FROM freelance.verification_requests v
             JOIN freelance.users u ON u.id = v.user_id
             ORDER BY v.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Approving marks the user verified.
    pub async fn approve_verification(&self, admin_id: Uuid, request_id: Uuid) -> ServiceResult<VerificationRequest> {
        let mut tx = self.pool.begin().await?;
        let request = decide_request(&mut tx, request_id, RequestStatus::Approved, None).await?;

        sqlx::query(
            "UPDATE freelance.users SET is_verified = TRUE, verification_level = 'verified', updated_at = now()
             WHERE id = $1",
        )
        .bind(request.user_id)
        .execute(&mut *tx)
        .await?;

        log_action(&mut *tx, admin_id, "Approved Verification", "User", request.user_id, "Verified freelancer").await?;
        notify(&mut *tx, request.user_id, NotificationKind::Verification, "Your account has been verified").await?;

        tx.commit().await?;
        Ok(request)
    }

    pub async fn reject_verification(
        &self,
        admin_id: Uuid,
        request_id: Uuid,
        reason: Option<String>,
    ) -> ServiceResult<VerificationRequest> {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| "Not specified".to_string());

        let mut tx = self.pool.begin().await?;
        let request = decide_request(&mut tx, request_id, RequestStatus::Rejected, Some(&reason)).await?;

        log_action(
            &mut *tx,
            admin_id,
            "Rejected Verification",
            "User",
            request.user_id,
            format!("Reason: {}", reason),
        )
        .await?;
        notify(
            &mut *tx,
            request.user_id,
            NotificationKind::Verification,
            format!("Your verification request was rejected: {}", reason),
        )
        .await?;

        tx.commit().await?;
        Ok(request)
    }

    pub async fn dashboard(&self) -> ServiceResult<AdminDashboard> {
        let dashboard = sqlx::query_as::<_, AdminDashboard>(
            "SELECT (SELECT COUNT(*) FROM freelance.users) AS total_users,
                    (SELECT COUNT(*) FROM freelance.projects) AS total_projects,
                    (SELECT COUNT(*) FROM freelance.bids) AS total_bids,
                    (SELECT COUNT(*) FROM freelance.reviews) AS total_reviews",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(dashboard)
    }

    pub async fn action_logs(&self) -> ServiceResult<Vec<AdminActionLog>> {
        let logs = sqlx::query_as::<_, AdminActionLog>(
            "SELECT * FROM freelance.admin_action_logs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}

/// Settle a pending request; decided requests stay as they are.
async fn decide_request(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    request_id: Uuid,
    status: RequestStatus,
    reason: Option<&str>,
) -> ServiceResult<VerificationRequest> {
    let current = sqlx::query_as::<_, VerificationRequest>(
        "SELECT * FROM freelance.verification_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| ServiceError::NotFound("Request not found".to_string()))?;

    if current.status != RequestStatus::Pending {
        return Err(ServiceError::Validation(format!("Request is already {}", current.status)));
    }

    let request = sqlx::query_as::<_, VerificationRequest>(
        "UPDATE freelance.verification_requests
         SET status = $2, reason = COALESCE($3, reason), updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(request_id)
    .bind(status)
    .bind(reason)
    .fetch_one(&mut **tx)
    .await?;
    Ok(request)
}
