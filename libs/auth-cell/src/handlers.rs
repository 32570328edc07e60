use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{AccountProfile, SessionResponse, User, UserRole};
use shared_models::error::AppError;

use crate::models::{LoginRequest, RegisterRequest, RegisterResponse};

fn default_avatar(email: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", email)
}

/// Load the account row backing an authenticated user. The row's role is the
/// authoritative one; when the row is missing we fall back to the signup
/// metadata, never to inspecting the email address.
async fn load_account_profile(
    client: &SupabaseClient,
    user_id: &str,
    email: &str,
    metadata: Option<&Value>,
    auth_token: &str,
) -> Result<AccountProfile, AppError> {
    let rows: Vec<AccountProfile> = client
        .select("users", &format!("id=eq.{}", urlencoding::encode(user_id)), Some(auth_token))
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    if let Some(profile) = rows.into_iter().next() {
        return Ok(profile);
    }

    debug!("No users row for {}, deriving profile from signup metadata", user_id);

    let role = metadata
        .and_then(|m| m.get("role"))
        .and_then(|r| r.as_str())
        .and_then(UserRole::parse)
        .unwrap_or(UserRole::Patient);

    let name = metadata
        .and_then(|m| m.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

    Ok(AccountProfile {
        id: user_id.to_string(),
        name,
        email: email.to_string(),
        role,
        avatar: Some(default_avatar(email)),
    })
}

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    debug!("Login attempt for {}", request.email);

    let client = SupabaseClient::new(&config);

    let session = client
        .sign_in_with_password(&request.email, &request.password)
        .await
        .map_err(|_| AppError::Auth("Invalid credentials".to_string()))?;

    let access_token = session
        .get("access_token")
        .and_then(|t| t.as_str())
        .ok_or_else(|| AppError::Auth("Sign-in response missing access token".to_string()))?
        .to_string();

    let auth_user = session
        .get("user")
        .cloned()
        .ok_or_else(|| AppError::Auth("Sign-in response missing user".to_string()))?;

    let user_id = auth_user
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Auth("Sign-in response missing user id".to_string()))?;

    let email = auth_user
        .get("email")
        .and_then(|v| v.as_str())
        .unwrap_or(&request.email);

    let metadata = auth_user.get("user_metadata");

    let profile =
        load_account_profile(&client, user_id, email, metadata, &access_token).await?;

    Ok(Json(SessionResponse {
        access_token,
        user: profile,
    }))
}

#[axum::debug_handler]
pub async fn register(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    debug!("Registering {} as {}", request.email, request.role);

    if request.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required".to_string()));
    }

    let client = SupabaseClient::new(&config);

    let metadata = json!({
        "name": request.name,
        "role": request.role,
        "avatar": default_avatar(&request.email),
    });

    let signup = client
        .sign_up(&request.email, &request.password, metadata)
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    // With email autoconfirm the signup response is a session; without it,
    // only the user object comes back and the token stays None.
    let access_token = signup
        .get("access_token")
        .and_then(|t| t.as_str())
        .map(str::to_string);

    let auth_user = signup.get("user").cloned().unwrap_or_else(|| signup.clone());

    let user_id = auth_user
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::ExternalService("Signup response missing user id".to_string()))?;

    let profile = AccountProfile {
        id: user_id.to_string(),
        name: request.name.clone(),
        email: request.email.clone(),
        role: request.role,
        avatar: Some(default_avatar(&request.email)),
    };

    // Persist the account row so the role stays queryable by the dashboards.
    let row = json!({
        "id": profile.id,
        "name": profile.name,
        "email": profile.email,
        "role": profile.role,
        "avatar": profile.avatar,
    });

    let _: AccountProfile = client
        .insert("users", row, access_token.as_deref())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(RegisterResponse {
        access_token,
        user: profile,
    }))
}

#[axum::debug_handler]
pub async fn logout(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let client = SupabaseClient::new(&config);

    client
        .sign_out(auth.token())
        .await
        .map_err(|e| AppError::ExternalService(e.to_string()))?;

    Ok(Json(json!({ "success": true })))
}

#[axum::debug_handler]
pub async fn get_session(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<SessionResponse>, AppError> {
    debug!("Recovering session for user: {}", user.id);

    let client = SupabaseClient::new(&config);
    let email = user.email.clone().unwrap_or_default();

    let profile = load_account_profile(
        &client,
        &user.id,
        &email,
        user.metadata.as_ref(),
        auth.token(),
    )
    .await?;

    Ok(Json(SessionResponse {
        access_token: auth.token().to_string(),
        user: profile,
    }))
}
