use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
}

/// Association roster entry
#[derive(Debug, Clone, FromRow)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub large_license_permit: Option<String>,
    pub large_license_operator: Option<String>,
    pub large_license_instruction: Option<String>,
    pub small_license_permit: Option<String>,
    pub small_license_operator: Option<String>,
    pub small_license_instruction: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthday: Option<String>,
    pub status: MemberStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// The six licence numbers printed on reports and exported to CSV
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct MemberLicence {
    pub large_license_permit: Option<String>,
    pub large_license_operator: Option<String>,
    pub large_license_instruction: Option<String>,
    pub small_license_permit: Option<String>,
    pub small_license_operator: Option<String>,
    pub small_license_instruction: Option<String>,
}

impl MemberLicence {
    /// Licence numbers in CSV column order, blank when unset
    pub fn columns(&self) -> [&str; 6] {
        [
            self.large_license_permit.as_deref().unwrap_or(""),
            self.large_license_operator.as_deref().unwrap_or(""),
            self.large_license_instruction.as_deref().unwrap_or(""),
            self.small_license_permit.as_deref().unwrap_or(""),
            self.small_license_operator.as_deref().unwrap_or(""),
            self.small_license_instruction.as_deref().unwrap_or(""),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_licence_columns_blank_when_unset() {
        let licence = MemberLicence {
            large_license_permit: Some("L-12".to_string()),
            small_license_instruction: Some("S-3".to_string()),
            ..Default::default()
        };
        assert_eq!(licence.columns(), ["L-12", "", "", "", "", "S-3"]);
        assert_eq!(MemberLicence::default().columns(), [""; 6]);
    }
}
