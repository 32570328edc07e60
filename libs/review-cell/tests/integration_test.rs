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

use review_cell::router::review_routes;
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

fn create_test_app(config: AppConfig) -> Router {
    review_routes(Arc::new(config))
}

fn test_config(mock_server: &MockServer) -> AppConfig {
    TestConfig::with_supabase_url(&mock_server.uri()).to_app_config()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_provider_reviews_include_average_rating() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::review_response("rev-1", "prov-1", "patient-1", 5),
            MockSupabaseResponses::review_response("rev-2", "prov-1", "patient-2", 4),
            MockSupabaseResponses::review_response("rev-3", "prov-1", "patient-3", 4),
        ])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/providers/prov-1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["average_rating"], 4.3);
}

#[tokio::test]
async fn test_provider_with_no_reviews_averages_zero() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    Mock::given(method("GET"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);

    let request = Request::builder()
        .method("GET")
        .uri("/providers/prov-1")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["average_rating"], 0.0);
}

#[tokio::test]
async fn test_patient_leaves_review() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server);

    let patient = TestUser::patient("alice@example.com");
    let token = JwtTestUtils::create_test_token(&patient, &config.supabase_jwt_secret, None);

    Mock::given(method("POST"))
        .and(path("/rest/v1/reviews"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::review_response("rev-9", "prov-1", &patient.id, 5)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(config);

    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header("Authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "provider_id": "prov-1",
                "rating": 5,
                "comment": "Very professional and punctual"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["review"]["rating"], 5);
}

#[tokio::test]
async fn test_out_of_range_rating_is_rejected() {
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
                "provider_id": "prov-1",
                "rating": 6,
                "comment": "Too good"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_providers_cannot_review_themselves() {
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
        .body(Body::from(
            json!({
                "provider_id": "prov-1",
                "rating": 5,
                "comment": "Great"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
