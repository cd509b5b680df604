use axum::{extract::Request, middleware::Next, Router};

use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::Role;

pub fn test_user(id: i64, name: &str, role: Role) -> AuthenticatedUser {
    AuthenticatedUser {
        id,
        name: name.to_string(),
        email: format!("{}@example.org", name.to_lowercase()),
        role,
    }
}

pub fn admin_user() -> AuthenticatedUser {
    test_user(1, "Admin", Role::Admin)
}

/// Stand-in for the session middleware: every request is made as `user`
pub fn with_user(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
