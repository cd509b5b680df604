use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::hash_password;
use crate::features::users::dtos::{CreateUserDto, DeleteUserResponseDto, RoleStatsDto};
use crate::features::users::models::{Role, User, UserWithReportCount};
use crate::modules::storage::PhotoStore;
use crate::shared::time;

/// Account administration for the admin screens
pub struct UserService {
    pool: SqlitePool,
    photos: Arc<PhotoStore>,
}

impl UserService {
    pub fn new(pool: SqlitePool, photos: Arc<PhotoStore>) -> Self {
        Self { pool, photos }
    }

    /// All users with the number of reports filed under each name
    pub async fn list_with_counts(&self) -> Result<Vec<UserWithReportCount>> {
        sqlx::query_as::<_, UserWithReportCount>(
            r#"
            SELECT u.id, u.name, u.email, u.role, u.created_at,
                   (SELECT COUNT(*) FROM reports r WHERE r.user_name = u.name) AS report_count
            FROM users u
            ORDER BY u.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn role_stats(&self) -> Result<RoleStatsDto> {
        let (total, admin, editor, reporter): (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(role = 'admin'), 0),
                   COALESCE(SUM(role = 'editor'), 0),
                   COALESCE(SUM(role = 'reporter'), 0)
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count roles: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(RoleStatsDto {
            total,
            admin,
            editor,
            reporter,
        })
    }

    pub async fn create_user(&self, dto: CreateUserDto) -> Result<User> {
        let password_hash = hash_password(&dto.password)?;
        let name = dto.name.trim();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(name)
        .bind(dto.email.trim())
        .bind(&password_hash)
        .bind(dto.role)
        .bind(time::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("User name '{}' is already taken", name))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::Database(e)
            }
        })?;

        tracing::info!("Created user: {} (role: {})", user.name, user.role);
        Ok(user)
    }

    /// Change a user's role. An admin may not demote themself, which keeps
    /// at least one admin able to reach this screen.
    pub async fn update_role(
        &self,
        acting: &AuthenticatedUser,
        user_id: i64,
        role: Role,
    ) -> Result<User> {
        if acting.id == user_id && role != Role::Admin {
            return Err(AppError::BadRequest(
                "You cannot remove your own admin role".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET role = ? WHERE id = ?
            RETURNING id, name, email, password_hash, role, created_at
            "#,
        )
        .bind(role)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update role: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        tracing::info!(
            "User {} changed role of {} to {}",
            acting.name,
            user.name,
            user.role
        );
        Ok(user)
    }

    /// Delete an account together with every report filed under its name and
    /// those reports' photo directories.
    pub async fn delete_user(
        &self,
        acting: &AuthenticatedUser,
        user_id: i64,
    ) -> Result<DeleteUserResponseDto> {
        if acting.id == user_id {
            return Err(AppError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let name: String = sqlx::query_scalar("SELECT name FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let report_numbers: Vec<String> =
            sqlx::query_scalar("SELECT report_number FROM reports WHERE user_name = ?")
                .bind(&name)
                .fetch_all(&mut *tx)
                .await?;

        let deleted_reports = sqlx::query("DELETE FROM reports WHERE user_name = ?")
            .bind(&name)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to delete user {}: {:?}", user_id, e);
            AppError::Database(e)
        })?;

        // Rows are gone; a leftover directory is only wasted disk
        let mut deleted_photo_dirs = 0;
        for number in &report_numbers {
            match self.photos.remove_report_dir(number).await {
                Ok(Some(_)) => deleted_photo_dirs += 1,
                Ok(None) => {}
                Err(e) => tracing::warn!("Failed to remove photos of {}: {:?}", number, e),
            }
        }

        tracing::info!(
            "User {} deleted {} ({} reports)",
            acting.name,
            name,
            deleted_reports
        );

        Ok(DeleteUserResponseDto {
            name,
            deleted_reports,
            deleted_photo_dirs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::test_pool;
    use crate::modules::storage::PhotoUpload;

    fn create_dto(name: &str, role: Role) -> CreateUserDto {
        CreateUserDto {
            name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase()),
            password: "long-enough-password".to_string(),
            role,
        }
    }

    fn acting(user: &User) -> AuthenticatedUser {
        user.clone().into()
    }

    async fn insert_report(pool: &SqlitePool, number: &str, user_name: &str) {
        sqlx::query(
            r#"
            INSERT INTO reports (report_number, user_name, activity_date, start_time, end_time,
                                 method, hunter, location, animal, sex, created_at)
            VALUES (?, ?, '2024-05-21', '06:00', '09:00', 'Trap', 'Taro Yamada',
                    'North ridge', 'Boar', 'male', '2024-05-21 09:30:00')
            "#,
        )
        .bind(number)
        .bind(user_name)
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_list_with_counts_and_stats() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let svc = UserService::new(pool.clone(), Arc::new(PhotoStore::new(tmp.path())));

        svc.create_user(create_dto("Chair", Role::Admin)).await.unwrap();
        svc.create_user(create_dto("Clerk", Role::Editor)).await.unwrap();
        svc.create_user(create_dto("Taro", Role::Reporter)).await.unwrap();
        insert_report(&pool, "20240521001", "Taro").await;
        insert_report(&pool, "20240521002", "Taro").await;

        let users = svc.list_with_counts().await.unwrap();
        let taro = users.iter().find(|u| u.name == "Taro").unwrap();
        assert_eq!(taro.report_count, 2);

        let stats = svc.role_stats().await.unwrap();
        assert_eq!(
            stats,
            RoleStatsDto {
                total: 3,
                admin: 1,
                editor: 1,
                reporter: 1
            }
        );
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_or_delete_self() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let svc = UserService::new(pool, Arc::new(PhotoStore::new(tmp.path())));

        let admin = svc.create_user(create_dto("Chair", Role::Admin)).await.unwrap();
        let me = acting(&admin);

        assert!(matches!(
            svc.update_role(&me, admin.id, Role::Reporter).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            svc.delete_user(&me, admin.id).await,
            Err(AppError::BadRequest(_))
        ));

        let other = svc.create_user(create_dto("Taro", Role::Reporter)).await.unwrap();
        let updated = svc.update_role(&me, other.id, Role::Editor).await.unwrap();
        assert_eq!(updated.role, Role::Editor);

        assert!(matches!(
            svc.update_role(&me, 999, Role::Editor).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user_removes_reports_and_photos() {
        let pool = test_pool().await;
        let tmp = tempfile::tempdir().unwrap();
        let photos = Arc::new(PhotoStore::new(tmp.path()));
        let svc = UserService::new(pool.clone(), photos.clone());

        let admin = svc.create_user(create_dto("Chair", Role::Admin)).await.unwrap();
        let taro = svc.create_user(create_dto("Taro", Role::Reporter)).await.unwrap();
        insert_report(&pool, "20240521001", "Taro").await;
        insert_report(&pool, "20240521002", "Chair").await;
        photos
            .save_photos(
                "20240521001",
                &[PhotoUpload {
                    file_name: "boar.jpg".to_string(),
                    data: vec![1, 2, 3],
                }],
            )
            .await
            .unwrap();

        let result = svc.delete_user(&acting(&admin), taro.id).await.unwrap();
        assert_eq!(result.deleted_reports, 1);
        assert_eq!(result.deleted_photo_dirs, 1);
        assert!(!tmp.path().join("20240521001").exists());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }
}
