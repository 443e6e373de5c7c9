//! Freelancing marketplace: accounts, profiles and portfolios, projects,
//! bids, reviews, notifications and the admin console.

mod admin;
pub mod analytics;
mod bids;
mod notifications;
mod projects;
mod reviews;

use std::str::FromStr;

use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::database::models::freelance::{
    CreatePortfolioItem, FreelanceRole, FreelanceUser, LoginRequest, PortfolioItem, PublicProfile, SignupRequest,
    UpdateProfile,
};
use crate::services::{require_email, require_password, require_text, ServiceError, ServiceResult};
use crate::types::Portal;

/// The authenticated caller, as far as freelance permission checks care.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: FreelanceRole,
}

impl Actor {
    pub fn new(id: Uuid, role: &str) -> ServiceResult<Self> {
        Ok(Self {
            id,
            role: FreelanceRole::from_str(role)?,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == FreelanceRole::Admin
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: FreelanceUser,
}

pub struct FreelanceService {
    pool: PgPool,
}

impl FreelanceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<FreelanceUser> {
        require_text("name", &request.name)?;
        require_email(&request.email)?;
        require_password(&request.password)?;
        if request.role == FreelanceRole::Admin {
            return Err(ServiceError::Forbidden("Admin accounts cannot be created through signup".to_string()));
        }
        let phone = request.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        let email = request.email.trim().to_lowercase();

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM freelance.users WHERE email = $1 OR ($2::text IS NOT NULL AND phone = $2))",
        )
        .bind(&email)
        .bind(&phone)
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let hash = hash_password(&request.password)?;
        let completion = profile_completion(true, phone.is_some(), false, false, false);
        let user = sqlx::query_as::<_, FreelanceUser>(
            "INSERT INTO freelance.users (name, email, phone, password_hash, role, profile_completed)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(request.name.trim())
        .bind(&email)
        .bind(&phone)
        .bind(hash)
        .bind(request.role)
        .bind(completion)
        .fetch_one(&self.pool)
        .await?;

        info!("Freelance signup: {} as {}", user.email, user.role);
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        require_text("email", &request.email)?;
        require_text("password", &request.password)?;

        let user = sqlx::query_as::<_, FreelanceUser>("SELECT * FROM freelance.users WHERE email = lower($1)")
            .bind(request.email.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }
        if user.is_banned {
            return Err(ServiceError::Forbidden("Account suspended".to_string()));
        }

        let token = issue_token(user.id, Portal::Freelance, user.role.as_str())?;
        info!("Freelance login for {}", user.email);
        Ok(LoginResponse { token, user })
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<FreelanceUser> {
        sqlx::query_as::<_, FreelanceUser>("SELECT * FROM freelance.users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn public_profile(&self, user_id: Uuid) -> ServiceResult<PublicProfile> {
        let user = self.get_user(user_id).await?;
        let portfolio = self.portfolio(user_id).await?;
        Ok(PublicProfile {
            id: user.id,
            name: user.name,
            role: user.role,
            skills: user.skills,
            is_verified: user.is_verified,
            verification_level: user.verification_level,
            profile_completed: user.profile_completed,
            portfolio,
        })
    }

    pub async fn update_profile(&self, user_id: Uuid, update: UpdateProfile) -> ServiceResult<FreelanceUser> {
        if let Some(name) = &update.name {
            require_text("name", name)?;
        }
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, FreelanceUser>("SELECT * FROM freelance.users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))?;

        let phone = match update.phone {
            Some(phone) => Some(phone.trim().to_string()).filter(|p| !p.is_empty()),
            None => current.phone,
        };
        if let Some(phone) = &phone {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM freelance.users WHERE phone = $1 AND id <> $2)")
                    .bind(phone)
                    .bind(user_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if taken {
                return Err(ServiceError::Conflict("Phone number already in use".to_string()));
            }
        }

        sqlx::query(
            "UPDATE freelance.users
             SET name = $2, phone = $3, skills = $4, preferred_categories = $5, updated_at = now()
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(update.name.map(|n| n.trim().to_string()).unwrap_or(current.name))
        .bind(&phone)
        .bind(update.skills.map(|s| s.into_vec()).unwrap_or(current.skills))
        .bind(
            update
                .preferred_categories
                .map(|c| c.into_vec())
                .unwrap_or(current.preferred_categories),
        )
        .execute(&mut *tx)
        .await?;

        let user = refresh_completion(&mut *tx, user_id).await?;
        tx.commit().await?;
        info!("Freelance user {} updated their profile", user.email);
        Ok(user)
    }

    pub async fn portfolio(&self, user_id: Uuid) -> ServiceResult<Vec<PortfolioItem>> {
        let items = sqlx::query_as::<_, PortfolioItem>(
            "SELECT * FROM freelance.portfolio_items WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn add_portfolio_item(&self, user_id: Uuid, item: CreatePortfolioItem) -> ServiceResult<Vec<PortfolioItem>> {
        require_text("title", &item.title)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO freelance.portfolio_items (user_id, title, description, image, link)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(item.title.trim())
        .bind(item.description)
        .bind(item.image)
        .bind(item.link)
        .execute(&mut *tx)
        .await?;

        refresh_completion(&mut *tx, user_id).await?;
        tx.commit().await?;
        self.portfolio(user_id).await
    }

    pub async fn delete_portfolio_item(&self, user_id: Uuid, item_id: Uuid) -> ServiceResult<Vec<PortfolioItem>> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM freelance.portfolio_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(ServiceError::not_found("Portfolio item"));
        }

        refresh_completion(&mut *tx, user_id).await?;
        tx.commit().await?;
        self.portfolio(user_id).await
    }

    /// Used by the CLI to bootstrap an administrator.
    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> ServiceResult<FreelanceUser> {
        require_text("name", name)?;
        require_email(email)?;
        require_password(password)?;

        let hash = hash_password(password)?;
        let user = sqlx::query_as::<_, FreelanceUser>(
            "INSERT INTO freelance.users (name, email, password_hash, role, is_verified, verification_level)
             VALUES ($1, lower($2), $3, 'admin', TRUE, 'verified')
             RETURNING *",
        )
        .bind(name.trim())
        .bind(email.trim())
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

/// Profile completeness in percent: name, phone, skills, portfolio and
/// preferred categories are worth 20 points each.
pub fn profile_completion(
    has_name: bool,
    has_phone: bool,
    has_skills: bool,
    has_portfolio: bool,
    has_categories: bool,
) -> i32 {
    [has_name, has_phone, has_skills, has_portfolio, has_categories]
        .iter()
        .filter(|present| **present)
        .count() as i32
        * 20
}

async fn refresh_completion(conn: &mut PgConnection, user_id: Uuid) -> ServiceResult<FreelanceUser> {
    let user = sqlx::query_as::<_, FreelanceUser>("SELECT * FROM freelance.users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))?;
    let portfolio_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM freelance.portfolio_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    let completion = profile_completion(
        !user.name.trim().is_empty(),
        user.phone.is_some(),
        !user.skills.is_empty(),
        portfolio_items > 0,
        !user.preferred_categories.is_empty(),
    );

    let user = sqlx::query_as::<_, FreelanceUser>(
        "UPDATE freelance.users SET profile_completed = $2 WHERE id = $1 RETURNING *",
    )
    .bind(user_id)
    .bind(completion)
    .fetch_one(&mut *conn)
    .await?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_counts_each_section() {
        assert_eq!(profile_completion(false, false, false, false, false), 0);
        assert_eq!(profile_completion(true, false, false, false, false), 20);
        assert_eq!(profile_completion(true, true, true, false, true), 80);
        assert_eq!(profile_completion(true, true, true, true, true), 100);
    }

    #[test]
    fn actor_parses_token_roles() {
        let id = Uuid::new_v4();
        let actor = Actor::new(id, "admin").unwrap();
        assert!(actor.is_admin());
        assert_eq!(Actor::new(id, "client").unwrap().role, FreelanceRole::Client);
        assert!(Actor::new(id, "student").is_err());
    }
}
