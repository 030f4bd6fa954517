mod common;

use actix_web::http::{header, StatusCode};
use actix_web::test;
use common::{init_app, sqlite_state, ALLOWED_ORIGIN};

#[actix_web::test]
async fn test_preflight_from_allowed_origin() {
    let (state, _db) = sqlite_state().await;
    let app = init_app(state).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/event")
        .insert_header((header::ORIGIN, ALLOWED_ORIGIN))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PUT"))
        .insert_header((
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            "authorization,content-type",
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let headers = resp.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ALLOWED_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "3600");

    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    for method in ["GET", "POST", "HEAD", "PUT", "DELETE", "PATCH"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }
}

#[actix_web::test]
async fn test_preflight_from_unknown_origin_gets_no_allow_origin() {
    let (state, _db) = sqlite_state().await;
    let app = init_app(state).await;

    let req = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/event")
        .insert_header((header::ORIGIN, "https://evil.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let allow_origin = resp
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .and_then(|v| v.to_str().ok());
    assert_ne!(allow_origin, Some("https://evil.example"));
    assert_ne!(allow_origin, Some("*"));
}

#[actix_web::test]
async fn test_simple_request_exposes_content_length() {
    let (state, _db) = sqlite_state().await;
    let app = init_app(state).await;

    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header((header::ORIGIN, ALLOWED_ORIGIN))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ALLOWED_ORIGIN
    );
    let exposed = headers
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("content-length"));
}
