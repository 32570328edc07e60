use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account roles. The role is authoritative: it comes from the JWT claims
/// or the `users` row, never from inspecting the email address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Patient,
    Provider,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Patient => write!(f, "patient"),
            UserRole::Provider => write!(f, "provider"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

impl UserRole {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "patient" => Some(UserRole::Patient),
            "provider" => Some(UserRole::Provider),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub app_metadata: Option<serde_json::Value>,
    pub user_metadata: Option<serde_json::Value>,
    pub aud: Option<String>,
    pub iat: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == Some(role)
    }
}

/// Account row stored in the `users` collection alongside the auth service's
/// own records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user: AccountProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_wire_form() {
        for role in [UserRole::Patient, UserRole::Provider, UserRole::Admin] {
            assert_eq!(UserRole::parse(&role.to_string()), Some(role));
        }
        assert_eq!(UserRole::parse("doctor"), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&UserRole::Provider).unwrap();
        assert_eq!(json, "\"provider\"");
    }
}
