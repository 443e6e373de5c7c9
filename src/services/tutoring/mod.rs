//! Tutor marketplace: accounts and tutor profiles, sessions, reviews,
//! wishlists and admin reports.

pub mod earnings;
mod reports;
mod reviews;
mod sessions;

pub use reports::UserGrowth;

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::database::models::tutoring::{
    Availability, LoginRequest, SignupRequest, TutoringRole, TutoringUser, UpdateTutorProfile,
    VerificationStatus,
};
use crate::services::{require_email, require_password, require_text, ServiceError, ServiceResult};
use crate::types::{canonical_weekday, Portal};

/// Subjects a new tutor starts with when the signup form leaves them empty.
const DEFAULT_TUTOR_SUBJECTS: [&str; 3] = ["Mathematics", "Physics", "Chemistry"];

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: TutoringUser,
}

pub struct TutoringService {
    pool: PgPool,
}

impl TutoringService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Students and tutors sign themselves up; admins are provisioned out of band.
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<TutoringUser> {
        require_text("username", &request.username)?;
        require_email(&request.email)?;
        require_password(&request.password)?;
        if request.role == TutoringRole::Admin {
            return Err(ServiceError::Forbidden("Admin accounts cannot be created through signup".to_string()));
        }
        if let Some(rate) = request.hourly_rate {
            if rate.is_sign_negative() {
                return Err(ServiceError::invalid("hourly_rate", "cannot be negative"));
            }
        }

        let is_tutor = request.role == TutoringRole::Tutor;
        let (subjects, qualifications) = if is_tutor {
            let mut subjects = request.subjects.map(|s| s.into_vec()).unwrap_or_default();
            if subjects.is_empty() {
                subjects = DEFAULT_TUTOR_SUBJECTS.iter().map(|s| s.to_string()).collect();
            }
            (subjects, request.qualifications.map(|q| q.into_vec()).unwrap_or_default())
        } else {
            (Vec::new(), Vec::new())
        };

        self.ensure_identity_free(request.username.trim(), request.email.trim()).await?;

        let hash = hash_password(&request.password)?;
        let user = sqlx::query_as::<_, TutoringUser>(
            "INSERT INTO tutoring.users
                (username, email, password_hash, role, first_name, last_name, location,
                 subjects, hourly_rate, teaching_preferences, qualifications,
                 verification_status, verification_comments)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *",
        )
        .bind(request.username.trim())
        .bind(request.email.trim().to_lowercase())
        .bind(hash)
        .bind(request.role)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.location)
        .bind(&subjects)
        .bind(if is_tutor { request.hourly_rate } else { None })
        .bind(if is_tutor { request.teaching_preferences } else { None })
        .bind(&qualifications)
        .bind(is_tutor.then_some(VerificationStatus::Pending))
        .bind(is_tutor.then_some("Pending verification"))
        .fetch_one(&self.pool)
        .await?;

        info!("Tutoring signup: {} as {}", user.username, user.role);
        Ok(user)
    }

    /// Log in with either e-mail address or username.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        require_text("identifier", &request.identifier)?;
        require_text("password", &request.password)?;
        let identifier = request.identifier.trim();

        let user = sqlx::query_as::<_, TutoringUser>(
            "SELECT * FROM tutoring.users WHERE email = lower($1) OR username = $1 LIMIT 1",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized("Invalid username or email".to_string()))?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(ServiceError::Unauthorized("Incorrect password".to_string()));
        }

        let token = issue_token(user.id, Portal::Tutoring, user.role.as_str())?;
        info!("Tutoring login for {}", user.username);
        Ok(LoginResponse { token, user })
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<TutoringUser> {
        sqlx::query_as::<_, TutoringUser>("SELECT * FROM tutoring.users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn tutor_profile(&self, tutor_id: Uuid) -> ServiceResult<TutoringUser> {
        let user = self.get_user(tutor_id).await?;
        if user.role != TutoringRole::Tutor {
            return Err(ServiceError::NotFound("Tutor profile not found".to_string()));
        }
        Ok(user)
    }

    pub async fn update_tutor_profile(&self, tutor_id: Uuid, update: UpdateTutorProfile) -> ServiceResult<TutoringUser> {
        let availability = match update.availability {
            Some(slots) => Some(normalize_availability(slots)?),
            None => None,
        };
        if let Some(rate) = update.hourly_rate {
            if rate.is_sign_negative() {
                return Err(ServiceError::invalid("hourly_rate", "cannot be negative"));
            }
        }

        let current = self.tutor_profile(tutor_id).await?;

        let subjects = update.subjects.map(|s| s.into_vec()).unwrap_or(current.subjects);
        let qualifications = update
            .qualifications
            .map(|q| q.into_vec())
            .unwrap_or(current.qualifications);
        let availability = availability.unwrap_or(current.availability.0);

        let user = sqlx::query_as::<_, TutoringUser>(
            "UPDATE tutoring.users
             SET first_name = $2, last_name = $3, bio = $4, profile_picture = $5, location = $6,
                 subjects = $7, hourly_rate = $8, availability = $9, teaching_preferences = $10,
                 qualifications = $11, updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(tutor_id)
        .bind(update.first_name.or(current.first_name))
        .bind(update.last_name.or(current.last_name))
        .bind(update.bio.or(current.bio))
        .bind(update.profile_picture.or(current.profile_picture))
        .bind(update.location.or(current.location))
        .bind(&subjects)
        .bind(update.hourly_rate.or(current.hourly_rate))
        .bind(Json(&availability))
        .bind(update.teaching_preferences.or(current.teaching_preferences))
        .bind(&qualifications)
        .fetch_one(&self.pool)
        .await?;

        info!("Tutor {} updated their profile", user.username);
        Ok(user)
    }

    /// Used by the CLI to bootstrap an administrator.
    pub async fn create_admin(&self, username: &str, email: &str, password: &str) -> ServiceResult<TutoringUser> {
        require_text("username", username)?;
        require_email(email)?;
        require_password(password)?;
        self.ensure_identity_free(username.trim(), email.trim()).await?;

        let hash = hash_password(password)?;
        let user = sqlx::query_as::<_, TutoringUser>(
            "INSERT INTO tutoring.users (username, email, password_hash, role)
             VALUES ($1, $2, $3, 'admin')
             RETURNING *",
        )
        .bind(username.trim())
        .bind(email.trim().to_lowercase())
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn ensure_identity_free(&self, username: &str, email: &str) -> ServiceResult<()> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tutoring.users WHERE email = lower($1) OR username = $2)",
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }
        Ok(())
    }
}

/// Canonical weekday names; empty time lists are dropped.
fn normalize_availability(slots: Vec<Availability>) -> ServiceResult<Vec<Availability>> {
    slots
        .into_iter()
        .filter(|slot| !slot.times.is_empty())
        .map(|slot| {
            let day = canonical_weekday(&slot.day)
                .ok_or_else(|| ServiceError::invalid("availability", format!("'{}' is not a weekday", slot.day)))?;
            Ok(Availability {
                day: day.to_string(),
                times: slot.times.into_iter().map(|t| t.trim().to_string()).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_days_are_canonical() {
        let slots = vec![
            Availability {
                day: "mon".into(),
                times: vec![" 10:00 ".into()],
            },
            Availability {
                day: "Friday".into(),
                times: vec![],
            },
        ];
        let normalized = normalize_availability(slots).unwrap();
        assert_eq!(
            normalized,
            vec![Availability {
                day: "Monday".into(),
                times: vec!["10:00".into()]
            }]
        );
    }

    #[test]
    fn unknown_availability_day_is_rejected() {
        let slots = vec![Availability {
            day: "Caturday".into(),
            times: vec!["09:00".into()],
        }];
        assert!(matches!(
            normalize_availability(slots),
            Err(ServiceError::InvalidField { field: "availability", .. })
        ));
    }
}
