//! Role-based authorization guards.
//!
//! Role hierarchy (from highest to lowest):
//! - admin: user management, CSV export, mail replies, photo cleanup
//! - editor: member roster management
//! - reporter: submits and reads their own reports
//!
//! Each higher role includes all permissions of lower roles.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

fn current_user(parts: &Parts) -> Result<&AuthenticatedUser, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))
}

/// Guard for admin-only endpoints.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for roster management: allows "editor" and "admin".
pub struct RequireEditor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.has_editor_access() {
            return Err(AppError::Forbidden("Editor access required".to_string()));
        }

        Ok(RequireEditor(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::Role;
    use axum::http::Request;

    fn parts_with(role: Option<Role>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(role) = role {
            parts.extensions.insert(AuthenticatedUser {
                id: 7,
                name: "someone".to_string(),
                email: String::new(),
                role,
            });
        }
        parts
    }

    #[tokio::test]
    async fn test_require_admin() {
        let mut parts = parts_with(Some(Role::Admin));
        assert!(RequireAdmin::from_request_parts(&mut parts, &()).await.is_ok());

        let mut parts = parts_with(Some(Role::Editor));
        let err = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Forbidden(_)));

        let mut parts = parts_with(None);
        let err = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_require_editor() {
        for role in [Role::Editor, Role::Admin] {
            let mut parts = parts_with(Some(role));
            assert!(RequireEditor::from_request_parts(&mut parts, &()).await.is_ok());
        }

        let mut parts = parts_with(Some(Role::Reporter));
        assert!(RequireEditor::from_request_parts(&mut parts, &())
            .await
            .is_err());
    }
}
