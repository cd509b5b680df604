use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::users::models::{Role, User};

/// The account behind the current request, reloaded from the database on every call
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Check if user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Editors and admins may manage the member roster
    pub fn has_editor_access(&self) -> bool {
        self.role >= Role::Editor
    }

    /// Whether this user may read a report filed under `user_name`
    pub fn can_view_report_of(&self, user_name: &str) -> bool {
        self.has_editor_access() || self.name == user_name
    }
}

impl From<User> for AuthenticatedUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
        }
    }
}

/// Claims carried by the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: 1,
            name: "Taro Yamada".to_string(),
            email: "taro@example.org".to_string(),
            role,
        }
    }

    #[test]
    fn test_access_levels() {
        assert!(user(Role::Admin).is_admin());
        assert!(user(Role::Admin).has_editor_access());
        assert!(user(Role::Editor).has_editor_access());
        assert!(!user(Role::Editor).is_admin());
        assert!(!user(Role::Reporter).has_editor_access());
    }

    #[test]
    fn test_can_view_report_of() {
        assert!(user(Role::Reporter).can_view_report_of("Taro Yamada"));
        assert!(!user(Role::Reporter).can_view_report_of("Hanako Suzuki"));
        assert!(user(Role::Editor).can_view_report_of("Hanako Suzuki"));
    }
}
