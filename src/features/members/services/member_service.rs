use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::members::dtos::{ImportRosterResponseDto, MemberInputDto};
use crate::features::members::models::{Member, MemberLicence};
use crate::shared::csv_list;
use crate::shared::time;

const MEMBER_COLUMNS: &str = r#"
    id, name,
    large_license_permit, large_license_operator, large_license_instruction,
    small_license_permit, small_license_operator, small_license_instruction,
    phone, email, address, birthday, status, notes, created_at, updated_at
"#;

const LICENCE_COLUMNS: &str = r#"
    large_license_permit, large_license_operator, large_license_instruction,
    small_license_permit, small_license_operator, small_license_instruction
"#;

/// Server-side roster file read when no file is uploaded
pub const ROSTER_FILE: &str = "roster.csv";

#[derive(FromRow)]
struct NamedLicence {
    name: String,
    #[sqlx(flatten)]
    licence: MemberLicence,
}

/// Blank or whitespace-only → NULL
fn normalize(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct MemberService {
    pool: SqlitePool,
    data_dir: PathBuf,
}

impl MemberService {
    pub fn new(pool: SqlitePool, data_dir: PathBuf) -> Self {
        Self { pool, data_dir }
    }

    pub async fn list(&self) -> Result<Vec<Member>> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members ORDER BY name",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list members: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn get(&self, id: i64) -> Result<Member> {
        sqlx::query_as::<_, Member>(&format!(
            "SELECT {} FROM members WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get member: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))
    }

    pub async fn create(&self, dto: &MemberInputDto) -> Result<Member> {
        let name = dto.name.trim();
        let now = time::now();

        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            INSERT INTO members (
                name,
                large_license_permit, large_license_operator, large_license_instruction,
                small_license_permit, small_license_operator, small_license_instruction,
                phone, email, address, birthday, status, notes, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(name)
        .bind(normalize(&dto.large_license_permit))
        .bind(normalize(&dto.large_license_operator))
        .bind(normalize(&dto.large_license_instruction))
        .bind(normalize(&dto.small_license_permit))
        .bind(normalize(&dto.small_license_operator))
        .bind(normalize(&dto.small_license_instruction))
        .bind(normalize(&dto.phone))
        .bind(normalize(&dto.email))
        .bind(normalize(&dto.address))
        .bind(normalize(&dto.birthday))
        .bind(dto.status)
        .bind(normalize(&dto.notes))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| self.map_write_error(e, name))?;

        tracing::info!("Added member: {}", member.name);
        Ok(member)
    }

    /// Replace every editable field of a member
    pub async fn update(&self, id: i64, dto: &MemberInputDto) -> Result<Member> {
        let name = dto.name.trim();

        let member = sqlx::query_as::<_, Member>(&format!(
            r#"
            UPDATE members SET
                name = ?,
                large_license_permit = ?, large_license_operator = ?,
                large_license_instruction = ?, small_license_permit = ?,
                small_license_operator = ?, small_license_instruction = ?,
                phone = ?, email = ?, address = ?, birthday = ?,
                status = ?, notes = ?, updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            MEMBER_COLUMNS
        ))
        .bind(name)
        .bind(normalize(&dto.large_license_permit))
        .bind(normalize(&dto.large_license_operator))
        .bind(normalize(&dto.large_license_instruction))
        .bind(normalize(&dto.small_license_permit))
        .bind(normalize(&dto.small_license_operator))
        .bind(normalize(&dto.small_license_instruction))
        .bind(normalize(&dto.phone))
        .bind(normalize(&dto.email))
        .bind(normalize(&dto.address))
        .bind(normalize(&dto.birthday))
        .bind(dto.status)
        .bind(normalize(&dto.notes))
        .bind(time::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| self.map_write_error(e, name))?
        .ok_or_else(|| AppError::NotFound(format!("Member {} not found", id)))?;

        tracing::info!("Updated member: {}", member.name);
        Ok(member)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete member: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member {} not found", id)));
        }

        Ok(())
    }

    /// Licence numbers of the roster member with this exact name
    pub async fn licence_for(&self, name: &str) -> Result<Option<MemberLicence>> {
        sqlx::query_as::<_, MemberLicence>(&format!(
            "SELECT {} FROM members WHERE name = ?",
            LICENCE_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get member licence: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Every member's licence numbers keyed by name, for bulk export
    pub async fn licences_by_name(&self) -> Result<HashMap<String, MemberLicence>> {
        let rows = sqlx::query_as::<_, NamedLicence>(&format!(
            "SELECT name, {} FROM members",
            LICENCE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load member licences: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(rows.into_iter().map(|r| (r.name, r.licence)).collect())
    }

    /// Import roster names. `upload` is the raw CSV when one was sent;
    /// otherwise `<data_dir>/roster.csv` is read.
    pub async fn import_roster(&self, upload: Option<Vec<u8>>) -> Result<ImportRosterResponseDto> {
        let names = match upload {
            Some(bytes) => csv_list::first_column(bytes.as_slice())
                .map_err(|e| AppError::BadRequest(format!("Invalid CSV file: {}", e)))?,
            None => {
                let path = self.data_dir.join(ROSTER_FILE);
                csv_list::load_first_column(&path).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Roster file not found: {}", path.display()))
                })?
            }
        };

        self.import_names(&names).await
    }

    async fn import_names(&self, names: &[String]) -> Result<ImportRosterResponseDto> {
        let now = time::now();
        let mut imported = 0;
        let mut skipped = 0;

        let mut tx = self.pool.begin().await?;
        for name in names {
            let inserted = sqlx::query(
                r#"
                INSERT INTO members (name, status, created_at, updated_at)
                VALUES (?, 'active', ?, ?)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(name)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted > 0 {
                imported += 1;
            } else {
                skipped += 1;
            }
        }
        tx.commit().await?;

        tracing::info!(
            "Roster import: {} added, {} skipped",
            imported,
            skipped
        );
        Ok(ImportRosterResponseDto { imported, skipped })
    }

    fn map_write_error(&self, e: sqlx::Error, name: &str) -> AppError {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Member '{}' already exists", name))
        } else {
            tracing::error!("Failed to write member: {:?}", e);
            AppError::Database(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::test_pool;
    use crate::features::members::models::MemberStatus;

    async fn service(data_dir: PathBuf) -> MemberService {
        MemberService::new(test_pool().await, data_dir)
    }

    fn input(name: &str) -> MemberInputDto {
        MemberInputDto {
            name: name.to_string(),
            large_license_permit: Some("L-100".to_string()),
            phone: Some("   ".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_crud() {
        let svc = service(PathBuf::from("data")).await;

        let created = svc.create(&input("Taro Yamada")).await.unwrap();
        assert_eq!(created.large_license_permit.as_deref(), Some("L-100"));
        assert_eq!(created.phone, None);
        assert_eq!(created.status, MemberStatus::Active);

        assert!(matches!(
            svc.create(&input("Taro Yamada")).await,
            Err(AppError::Conflict(_))
        ));

        let mut changed = input("Taro Yamada");
        changed.large_license_permit = None;
        changed.status = MemberStatus::Inactive;
        let updated = svc.update(created.id, &changed).await.unwrap();
        assert_eq!(updated.large_license_permit, None);
        assert_eq!(updated.status, MemberStatus::Inactive);

        svc.create(&input("Hanako Suzuki")).await.unwrap();
        let names: Vec<String> = svc.list().await.unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Hanako Suzuki", "Taro Yamada"]);

        svc.delete(created.id).await.unwrap();
        assert!(matches!(svc.get(created.id).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.delete(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_licence_lookup() {
        let svc = service(PathBuf::from("data")).await;
        svc.create(&input("Taro Yamada")).await.unwrap();

        let licence = svc.licence_for("Taro Yamada").await.unwrap().unwrap();
        assert_eq!(licence.large_license_permit.as_deref(), Some("L-100"));
        assert!(svc.licence_for("Nobody").await.unwrap().is_none());

        let all = svc.licences_by_name().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("Taro Yamada"));
    }

    #[tokio::test]
    async fn test_import_roster_upload_and_server_file() {
        let tmp = tempfile::tempdir().unwrap();
        let svc = service(tmp.path().to_path_buf()).await;
        svc.create(&input("Taro Yamada")).await.unwrap();

        let upload = b"Taro Yamada\n\nHanako Suzuki\n  Jiro Tanaka \nHanako Suzuki\n".to_vec();
        let result = svc.import_roster(Some(upload)).await.unwrap();
        assert_eq!(
            result,
            ImportRosterResponseDto {
                imported: 2,
                skipped: 2
            }
        );

        assert!(matches!(
            svc.import_roster(None).await,
            Err(AppError::NotFound(_))
        ));

        std::fs::write(tmp.path().join(ROSTER_FILE), "Saburo Sato\nJiro Tanaka\n").unwrap();
        let result = svc.import_roster(None).await.unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped, 1);
    }
}
