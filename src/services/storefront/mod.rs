//! E-commerce storefront: customer accounts, catalog, cart and wishlist,
//! orders, the salesman desk and the admin dashboard.

mod admin;
mod cart;
mod catalog;
pub mod metrics;
mod orders;

pub use admin::roles;

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::config::ListingConfig;
use crate::database::models::storefront::{LoginRequest, SignupRequest, StoreRole, StoreUser, UpdateProfile};
use crate::services::{require_email, require_password, require_text, ServiceError, ServiceResult};
use crate::types::Portal;

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: StoreUser,
}

pub struct StorefrontService {
    pool: PgPool,
    listing: &'static ListingConfig,
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl StorefrontService {
    pub fn new(pool: PgPool, listing: &'static ListingConfig) -> Self {
        Self { pool, listing }
    }

    /// Self-service signup always creates a customer.
    pub async fn signup(&self, request: SignupRequest) -> ServiceResult<StoreUser> {
        let user = self
            .insert_user(
                &request.name,
                &request.email,
                &request.password,
                optional_text(request.phone),
                optional_text(request.address),
                StoreRole::Customer,
            )
            .await?;
        info!("Storefront signup: {}", user.email);
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        require_text("email", &request.email)?;
        require_text("password", &request.password)?;

        let user = sqlx::query_as::<_, StoreUser>("SELECT * FROM storefront.users WHERE email = lower($1)")
            .bind(request.email.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(ServiceError::Unauthorized("Invalid email or password".to_string()));
        }

        let token = issue_token(user.id, Portal::Store, user.role.as_str())?;
        info!("Storefront login for {}", user.email);
        Ok(LoginResponse { token, user })
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<StoreUser> {
        sqlx::query_as::<_, StoreUser>("SELECT * FROM storefront.users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("User"))
    }

    pub async fn update_profile(&self, user_id: Uuid, update: UpdateProfile) -> ServiceResult<StoreUser> {
        require_text("name", &update.name)?;

        sqlx::query_as::<_, StoreUser>(
            "UPDATE storefront.users
             SET name = $2, phone = $3, address = $4, image = COALESCE($5, image), updated_at = now()
             WHERE id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(update.name.trim())
        .bind(optional_text(update.phone))
        .bind(optional_text(update.address))
        .bind(optional_text(update.image))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("User"))
    }

    /// Used by the CLI to bootstrap an administrator.
    pub async fn create_admin(&self, name: &str, email: &str, password: &str) -> ServiceResult<StoreUser> {
        self.insert_user(name, email, password, None, None, StoreRole::Admin).await
    }

    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        phone: Option<String>,
        address: Option<String>,
        role: StoreRole,
    ) -> ServiceResult<StoreUser> {
        require_text("name", name)?;
        require_email(email)?;
        require_password(password)?;
        let email = email.trim().to_lowercase();

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM storefront.users WHERE email = $1)")
            .bind(&email)
            .fetch_one(&self.pool)
            .await?;
        if taken {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let hash = hash_password(password)?;
        let user = sqlx::query_as::<_, StoreUser>(
            "INSERT INTO storefront.users (name, email, phone, password_hash, address, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(name.trim())
        .bind(&email)
        .bind(phone)
        .bind(hash)
        .bind(address)
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optionals_become_none() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(Some(" 0300 ".into())), Some("0300".to_string()));
        assert_eq!(optional_text(None), None);
    }
}
