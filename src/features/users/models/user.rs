use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

/// Account role, ordered from least to most privileged
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reporter,
    Editor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Reporter => "reporter",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for user accounts
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

/// User row joined with the number of reports filed under their name
#[derive(Debug, Clone, FromRow)]
pub struct UserWithReportCount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    pub report_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin > Role::Editor);
        assert!(Role::Editor > Role::Reporter);
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Editor).unwrap(), "\"editor\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert_eq!(Role::Reporter.to_string(), "reporter");
    }
}
