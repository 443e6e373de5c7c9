//! Course registration: accounts, course catalogue, enrollments and reports.

mod courses;
mod enrollment;
mod reports;
pub mod schedule;

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, issue_token, verify_password};
use crate::database::models::registration::{Admin, CreateStudent, RegistrationRole, Student};
use crate::services::{require_password, require_text, ServiceError, ServiceResult};
use crate::types::Portal;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Admin username or student roll number.
    pub username: String,
    pub password: String,
}

/// The account behind a registration login, serialized as the bare row.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Account {
    Admin(Admin),
    Student(Student),
}

impl Account {
    pub fn id(&self) -> Uuid {
        match self {
            Account::Admin(admin) => admin.id,
            Account::Student(student) => student.id,
        }
    }

    pub fn role(&self) -> RegistrationRole {
        match self {
            Account::Admin(_) => RegistrationRole::Admin,
            Account::Student(_) => RegistrationRole::Student,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Account::Admin(admin) => &admin.username,
            Account::Student(student) => &student.name,
        }
    }

    fn password_hash(&self) -> &str {
        match self {
            Account::Admin(admin) => &admin.password_hash,
            Account::Student(student) => &student.password_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: RegistrationRole,
    pub user: Account,
}

pub struct RegistrationService {
    pool: PgPool,
}

impl RegistrationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admins log in by username, students by roll number.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        require_text("username", &request.username)?;
        require_text("password", &request.password)?;
        let username = request.username.trim();

        let admin = sqlx::query_as::<_, Admin>("SELECT * FROM registration.admins WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let user = match admin {
            Some(admin) => Account::Admin(admin),
            None => sqlx::query_as::<_, Student>("SELECT * FROM registration.students WHERE roll_number = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?
                .map(Account::Student)
                .ok_or_else(|| ServiceError::Unauthorized("Invalid credentials".to_string()))?,
        };

        if !verify_password(&request.password, user.password_hash()) {
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        let role = user.role();
        let token = issue_token(user.id(), Portal::Registration, role.as_str())?;
        info!("Registration login for {} ({})", user.display_name(), role);

        Ok(LoginResponse { token, role, user })
    }

    pub async fn create_student(&self, input: CreateStudent) -> ServiceResult<Student> {
        require_text("roll_number", &input.roll_number)?;
        require_text("name", &input.name)?;
        require_password(&input.password)?;

        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM registration.students WHERE roll_number = $1)",
        )
        .bind(input.roll_number.trim())
        .fetch_one(&self.pool)
        .await?;
        if taken {
            return Err(ServiceError::Conflict(format!(
                "Roll number {} is already registered",
                input.roll_number.trim()
            )));
        }

        let hash = hash_password(&input.password)?;
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO registration.students (roll_number, name, password_hash)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(input.roll_number.trim())
        .bind(input.name.trim())
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;

        info!("Created student {}", student.roll_number);
        Ok(student)
    }

    /// Used by the CLI to bootstrap the first administrator.
    pub async fn create_admin(&self, username: &str, password: &str) -> ServiceResult<Admin> {
        require_text("username", username)?;
        require_password(password)?;

        let hash = hash_password(password)?;
        let admin = sqlx::query_as::<_, Admin>(
            "INSERT INTO registration.admins (username, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(username.trim())
        .bind(hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(admin)
    }
}

async fn ensure_student(conn: &mut PgConnection, student_id: Uuid) -> ServiceResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM registration.students WHERE id = $1)")
        .bind(student_id)
        .fetch_one(conn)
        .await?;
    if !exists {
        return Err(ServiceError::not_found("Student"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn login_response_nests_the_account() {
        let student = Student {
            id: Uuid::new_v4(),
            roll_number: "22F-3681".into(),
            name: "Hira".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: Utc::now(),
        };
        let user = Account::Student(student.clone());
        assert_eq!(user.role(), RegistrationRole::Student);
        assert_eq!(user.display_name(), "Hira");

        let body = serde_json::to_value(LoginResponse {
            token: "t".into(),
            role: user.role(),
            user,
        })
        .unwrap();
        assert_eq!(body["role"], "student");
        assert_eq!(body["user"]["roll_number"], "22F-3681");
        assert_eq!(body["user"]["id"], student.id.to_string());
        assert!(body["user"].get("password_hash").is_none());
    }
}
