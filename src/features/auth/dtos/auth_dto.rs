use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::dtos::UserResponseDto;

/// Request DTO for self-registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Request DTO for login by account name
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for login; the token is also set as the session cookie
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponseDto {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    pub user: UserResponseDto,
}

/// Current user plus the server clock, for the landing screen
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub user: UserResponseDto,
    pub server_time: String,
}

/// Whether the first account still has to be created
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetupStatusDto {
    pub setup_required: bool,
}
