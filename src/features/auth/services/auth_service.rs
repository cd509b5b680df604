use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::auth::dtos::{LoginRequestDto, RegisterRequestDto};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::{hash_password, verify_password, TokenService};
use crate::features::users::models::User;
use crate::shared::time;

const INVALID_CREDENTIALS: &str = "Login failed: name or password is incorrect";

/// Service for account registration, login and session checks
pub struct AuthService {
    pool: SqlitePool,
    tokens: Arc<TokenService>,
    cookie_secure: bool,
}

impl AuthService {
    pub fn new(pool: SqlitePool, tokens: Arc<TokenService>, cookie_secure: bool) -> Self {
        Self {
            pool,
            tokens,
            cookie_secure,
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.tokens.ttl()
    }

    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    /// True until the first account exists
    pub async fn setup_required(&self) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count users: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(count == 0)
    }

    /// Self-registration. The very first account becomes admin, every later
    /// one is a reporter; the role is decided inside the INSERT.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<User> {
        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (
                ?, ?, ?,
                CASE WHEN EXISTS (SELECT 1 FROM users) THEN 'reporter' ELSE 'admin' END,
                ?
            )
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(dto.name.trim())
        .bind(dto.email.trim())
        .bind(&password_hash)
        .bind(time::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("User name '{}' is already taken", dto.name.trim()))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Registered user: {} (role: {})", user.name, user.role);
        Ok(user)
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, dto: LoginRequestDto) -> Result<(String, User)> {
        let user = self
            .find_by_name(dto.name.trim())
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !verify_password(&dto.password, &user.password_hash) {
            tracing::info!("Rejected login for user: {}", user.name);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!("User logged in: {}", user.name);
        Ok((token, user))
    }

    /// Resolve a session token to the current state of its account
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let user_id = self.tokens.verify(token)?;

        let user = self
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Session is no longer valid".to_string()))?;

        Ok(user.into())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get user by name: {:?}", e);
            AppError::Database(e)
        })
    }
}
