use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::members::models::{Member, MemberStatus};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MemberResponseDto {
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

impl From<Member> for MemberResponseDto {
    fn from(m: Member) -> Self {
        Self {
            id: m.id,
            name: m.name,
            large_license_permit: m.large_license_permit,
            large_license_operator: m.large_license_operator,
            large_license_instruction: m.large_license_instruction,
            small_license_permit: m.small_license_permit,
            small_license_operator: m.small_license_operator,
            small_license_instruction: m.small_license_instruction,
            phone: m.phone,
            email: m.email,
            address: m.address,
            birthday: m.birthday,
            status: m.status,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Editable member fields, used for both create and full update.
/// Blank strings are stored as NULL.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct MemberInputDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
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
    /// Free text, usually YYYY-MM-DD
    pub birthday: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportRosterResponseDto {
    pub imported: u64,
    pub skipped: u64,
}
