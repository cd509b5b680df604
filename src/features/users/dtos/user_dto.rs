use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::{Role, User, UserWithReportCount};

/// Public view of an account (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

/// Row of the user management table
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: NaiveDateTime,
    /// Reports filed under this user's name
    pub report_count: i64,
}

impl From<UserWithReportCount> for UserSummaryDto {
    fn from(u: UserWithReportCount) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            created_at: u.created_at,
            report_count: u.report_count,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleStatsDto {
    pub total: i64,
    pub admin: i64,
    pub editor: i64,
    pub reporter: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponseDto {
    pub users: Vec<UserSummaryDto>,
    pub stats: RoleStatsDto,
}

/// Request DTO for an admin creating an account with an explicit role
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRoleDto {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteUserResponseDto {
    pub name: String,
    pub deleted_reports: u64,
    pub deleted_photo_dirs: u64,
}
