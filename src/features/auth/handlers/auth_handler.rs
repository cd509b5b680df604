use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, LoginResponseDto, MeResponseDto, RegisterRequestDto, SetupStatusDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::features::users::dtos::UserResponseDto;
use crate::shared::constants::{DISPLAY_DATETIME_FORMAT, SESSION_COOKIE};
use crate::shared::time;
use crate::shared::types::ApiResponse;
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use validator::Validate;

fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Whether the first account still has to be registered
#[utoipa::path(
    get,
    path = "/api/auth/setup",
    responses(
        (status = 200, description = "Setup status", body = ApiResponse<SetupStatusDto>)
    ),
    tag = "auth"
)]
pub async fn setup_status(
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<SetupStatusDto>>> {
    let setup_required = service.setup_required().await?;
    Ok(Json(ApiResponse::success(
        Some(SetupStatusDto { setup_required }),
        None,
        None,
    )))
}

/// Register a new account
///
/// The first account becomes admin; later registrations are reporters.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Name already taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.register(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(user.into()),
            Some("Registration complete. Please log in.".to_string()),
            None,
        )),
    ))
}

/// Login with name and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful; session cookie set", body = ApiResponse<LoginResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    jar: CookieJar,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = service.login(dto).await?;
    let jar = jar.add(session_cookie(token.clone(), service.cookie_secure()));

    let response = LoginResponseDto {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: service.token_ttl().as_secs(),
        user: user.into(),
    };

    Ok((jar, Json(ApiResponse::success(Some(response), None, None))))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logged out")
    ),
    tag = "auth"
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<()>>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (
        jar,
        Json(ApiResponse::success(
            None,
            Some("Logged out".to_string()),
            None,
        )),
    )
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<MeResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(
        ("session_cookie" = []),
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<MeResponseDto>>> {
    let user = service
        .find_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let dto = MeResponseDto {
        user: user.into(),
        server_time: time::now().format(DISPLAY_DATETIME_FORMAT).to_string(),
    };

    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}
