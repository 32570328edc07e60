use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;

use crate::jwt::validate_token;

// Middleware for authentication
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // Extract token from headers
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    // Validate token
    let user = validate_token(token, &config.supabase_jwt_secret).map_err(AppError::Auth)?;

    // Add user to request extensions
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

// Function to extract user from request extensions
pub async fn extract_user<B>(request: &Request<B>) -> Result<User, AppError> {
    request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::Auth("User not found in request extensions".to_string()))
}

/// Guard for handlers restricted to a single role. Admins pass every guard.
pub fn require_role(user: &User, role: UserRole) -> Result<(), AppError> {
    if user.has_role(role) || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Auth(format!("Requires {} role", role)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestUser;

    #[test]
    fn require_role_accepts_matching_role_and_admin() {
        let provider = TestUser::provider("p@example.com").to_user();
        let admin = TestUser::admin("a@example.com").to_user();
        let patient = TestUser::patient("pt@example.com").to_user();

        assert!(require_role(&provider, UserRole::Provider).is_ok());
        assert!(require_role(&admin, UserRole::Provider).is_ok());
        assert!(require_role(&patient, UserRole::Provider).is_err());
    }
}
