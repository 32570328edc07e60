use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use booking_cell::router::booking_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    booking_routes(Arc::new(config))
}

fn test_config(mock_server: &MockServer) -> AppConfig {
    TestConfig::with_supabase_url(&mock_server.uri()).to_app_config()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn booking_body() -> Body {
    Body::from(
        json!({
            "service_id": "general-checkup",
            "duration": 60,
            "special_requirements": null,
            "provider_id": "prov-1",
            "appointment_date": "2023-05-15",
            "start_time": "10:00",
            "payment_method": "credit_card"
        })
        .to_string(),
    )
}

#[tokio::test]
async fn test_services_catalog_is_public() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response("general-checkup", "General Health Checkup", 60),
            MockSupabaseResponses::service_response("nursing-care", "Nursing Care", 120),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/services")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["services"][0]["name"], "General Health Checkup");
}

#[tokio::test]
async fn test_payment_methods_are_listed_without_auth() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/payment-methods")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let methods = body["payment_methods"].as_array().unwrap();
    assert_eq!(methods.len(), 3);
    assert!(methods.iter().any(|m| m["id"] == "credit_card"));
}

#[tokio::test]
async fn test_booking_flow_creates_appointment_and_flips_slot() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let patient = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, None);

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response("apt-42", &patient.id, "prov-1", "upcoming")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/provider_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::availability_response("prov-1", "2023-05-15", "10:00:00", "11:00:00")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response("general-checkup", "General Health Checkup", 60)
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(booking_body())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let confirmation = &body["confirmation"];
    assert_eq!(confirmation["appointment_id"], "apt-42");
    assert_eq!(confirmation["service_name"], "General Health Checkup");
    assert_eq!(confirmation["formatted_date"], "05/15/2023");
    assert_eq!(confirmation["duration_display"], "60 minutes");
    assert_eq!(confirmation["payment_method_display"], "Credit/Debit Card");
    assert_eq!(confirmation["amount"], 75.0);
    assert_eq!(confirmation["status"], "upcoming");
}

#[tokio::test]
async fn test_booking_survives_failed_slot_flip() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let patient = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, None);

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::appointment_response("apt-42", &patient.id, "prov-1", "upcoming")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/provider_availability"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/services"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::service_response("general-checkup", "General Health Checkup", 60)
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(booking_body())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_duration_is_rejected_before_payment() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let patient = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, None);

    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "service_id": "general-checkup",
                "duration": 50,
                "provider_id": "prov-1",
                "appointment_date": "2023-05-15",
                "start_time": "10:00",
                "payment_method": "credit_card"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_providers_cannot_book() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let provider = TestUser::provider("dr@example.com");
    let token = JwtTestUtils::create_test_token(&provider, &config.supabase_jwt_secret, None);

    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(booking_body())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
