use serde::{Deserialize, Serialize};

use shared_models::auth::UserRole;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub access_token: Option<String>,
    pub user: shared_models::auth::AccountProfile,
}
