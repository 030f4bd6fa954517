mod common;

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use actix_web::http::{header, StatusCode};
use actix_web::test;
use async_trait::async_trait;
use backend::adapters::users_sea;
use backend::errors::domain::{DomainError, InfraErrorKind};
use backend::repos::{AuthRepository, User};
use backend::{mint_access_token, AppState, SecurityConfig};
use common::{
    assert_problem, counting_state, init_app, register, sqlite_state, test_security,
    CountingRepos,
};
use serde_json::json;

const GATED: &[(&str, &str)] = &[
    ("GET", "/api/event"),
    ("POST", "/api/event"),
    ("GET", "/api/event/1"),
    ("PUT", "/api/event/1"),
    ("DELETE", "/api/event/1"),
    ("GET", "/api/ticket"),
    ("POST", "/api/ticket"),
    ("GET", "/api/ticket/1"),
    ("POST", "/api/ticket/validate"),
];

fn request(method: &str, uri: &str) -> test::TestRequest {
    let req = match method {
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "DELETE" => test::TestRequest::delete(),
        _ => test::TestRequest::get(),
    };
    req.uri(uri)
        .set_json(json!({ "name": "x", "location": "y", "date": "2030-01-01T00:00:00Z", "event_id": 1, "ticket_id": 1, "owner_id": 1 }))
}

#[actix_web::test]
async fn test_missing_credential_never_reaches_repositories() {
    let (state, counter, _db) = counting_state().await;
    let app = init_app(state).await;

    for (method, uri) in GATED {
        let resp = test::call_service(&app, request(method, uri).to_request()).await;
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer",
            "{method} {uri}"
        );
        assert_problem(resp, "UNAUTHORIZED_MISSING_BEARER", StatusCode::UNAUTHORIZED).await;
    }

    assert_eq!(counter.count(), 0);
}

#[actix_web::test]
async fn test_bad_credentials_never_reach_repositories() {
    let (state, counter, _db) = counting_state().await;
    let app = init_app(state).await;

    let other_secret = SecurityConfig::new("a-completely-different-secret".as_bytes());
    let forged = mint_access_token(1, "x@example.test", SystemTime::now(), &other_secret).unwrap();
    let expired = mint_access_token(
        1,
        "x@example.test",
        SystemTime::now() - Duration::from_secs(48 * 60 * 60),
        &test_security(),
    )
    .unwrap();

    let cases = [
        ("Basic dXNlcjpwYXNz".to_string(), "UNAUTHORIZED_MISSING_BEARER"),
        ("Bearer ".to_string(), "UNAUTHORIZED_MISSING_BEARER"),
        ("Bearer garbage".to_string(), "UNAUTHORIZED_INVALID_JWT"),
        (format!("Bearer {forged}"), "UNAUTHORIZED_INVALID_JWT"),
        (format!("Bearer {expired}"), "UNAUTHORIZED_EXPIRED_JWT"),
    ];

    for (authorization, code) in cases {
        for (method, uri) in GATED {
            let req = request(method, uri)
                .insert_header(("Authorization", authorization.clone()))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_problem(resp, code, StatusCode::UNAUTHORIZED).await;
        }
    }

    assert_eq!(counter.count(), 0);
}

#[actix_web::test]
async fn test_valid_credential_reaches_handler() {
    let (state, counter, _db) = counting_state().await;
    let app = init_app(state).await;
    let user = register(&app, "gate").await;

    let req = test::TestRequest::get()
        .uri("/api/event")
        .insert_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(counter.count(), 1);
}

#[actix_web::test]
async fn test_auth_routes_need_no_credential() {
    let (state, counter, _db) = counting_state().await;
    let app = init_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "nobody@example.test", "password": "whatever-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // Reached the handler: credentials rejected, not a missing bearer.
    assert_problem(resp, "INVALID_CREDENTIALS", StatusCode::UNAUTHORIZED).await;
    assert_eq!(counter.count(), 0);
}

#[actix_web::test]
async fn test_unknown_api_path_is_gated() {
    let (state, _counter, _db) = counting_state().await;
    let app = init_app(state).await;

    let req = test::TestRequest::get().uri("/api/admin").to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "UNAUTHORIZED_MISSING_BEARER", StatusCode::UNAUTHORIZED).await;
}

#[actix_web::test]
async fn test_token_for_deleted_user_is_rejected() {
    let (state, db) = sqlite_state().await;
    let app = init_app(state).await;
    let user = register(&app, "leaver").await;

    let removed = users_sea::delete_user(&db, user.id).await.unwrap();
    assert_eq!(removed, 1);

    let req = test::TestRequest::get()
        .uri("/api/ticket")
        .insert_header(user.bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "UNAUTHORIZED", StatusCode::UNAUTHORIZED).await;
}

struct UnavailableUsers;

#[async_trait]
impl AuthRepository for UnavailableUsers {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
        Err(DomainError::infra(InfraErrorKind::DbUnavailable, "down"))
    }
    async fn find_by_id(&self, _user_id: i64) -> Result<Option<User>, DomainError> {
        Err(DomainError::infra(InfraErrorKind::DbUnavailable, "down"))
    }
    async fn create_user(&self, _email: &str, _hash: &str) -> Result<User, DomainError> {
        Err(DomainError::infra(InfraErrorKind::DbUnavailable, "down"))
    }
}

#[actix_web::test]
async fn test_gate_fails_closed_when_user_lookup_fails() {
    let counter = Arc::new(CountingRepos::default());
    let state = AppState::with_repositories(
        test_security(),
        counter.clone(),
        counter.clone(),
        Arc::new(UnavailableUsers),
    );
    let app = init_app(state).await;

    let token = mint_access_token(5, "x@example.test", SystemTime::now(), &test_security()).unwrap();
    let req = test::TestRequest::get()
        .uri("/api/event")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_problem(resp, "DB_UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE).await;
    assert_eq!(counter.count(), 0);
}
