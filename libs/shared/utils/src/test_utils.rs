use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{User, UserRole};

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "patient".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn provider(email: &str) -> Self {
        Self::new(email, "provider")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: UserRole::parse(&self.role),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }
}

/// Canned Supabase bodies used across cell integration tests.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn account_response(id: &str, email: &str, name: &str, role: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "email": email,
            "role": role,
            "avatar": format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", email)
        })
    }

    pub fn provider_response(id: &str, name: &str, specialty: &str, verified: bool) -> Value {
        json!({
            "id": id,
            "name": name,
            "specialty": specialty,
            "bio": "Experienced home-care professional",
            "rating": 4.5,
            "review_count": 12,
            "is_verified": verified,
            "avatar": null
        })
    }

    pub fn service_response(id: &str, name: &str, duration: i32) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": "Professional healthcare service at home",
            "icon": "stethoscope",
            "estimated_duration": duration
        })
    }

    pub fn availability_response(provider_id: &str, date: &str, start: &str, end: &str) -> Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "provider_id": provider_id,
            "date": date,
            "start_time": start,
            "end_time": end,
            "is_available": true
        })
    }

    pub fn appointment_response(
        id: &str,
        patient_id: &str,
        provider_id: &str,
        status: &str,
    ) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "provider_id": provider_id,
            "service_id": "general-checkup",
            "appointment_date": "2023-05-15",
            "start_time": "10:00",
            "end_time": "11:00",
            "duration": 60,
            "special_requirements": null,
            "status": status,
            "payment_method": "credit_card",
            "payment_status": "completed",
            "amount": 75.0,
            "created_at": "2023-05-01T00:00:00Z",
            "updated_at": "2023-05-01T00:00:00Z"
        })
    }

    pub fn review_response(id: &str, provider_id: &str, patient_id: &str, rating: i32) -> Value {
        json!({
            "id": id,
            "provider_id": provider_id,
            "patient_id": patient_id,
            "rating": rating,
            "comment": "Very professional and punctual",
            "created_at": "2023-05-20T00:00:00Z"
        })
    }
}
