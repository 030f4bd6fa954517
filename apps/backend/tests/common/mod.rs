#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use async_trait::async_trait;
use backend::errors::domain::DomainError;
use backend::middleware::{cors_middleware, RequestLog, RequestTrace};
use backend::repos::{
    Event, EventChanges, EventRepository, NewEvent, SeaAuthRepository, Ticket, TicketRepository,
};
use backend::{bootstrap_db, routes, AppState, DbConfig, SecurityConfig};
use backend_test_support::problem_details::{
    assert_problem_details_from_parts, ProblemDetailsLike,
};
use backend_test_support::unique_helpers::unique_email;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";
pub const PASSWORD: &str = "correct-horse-battery";

pub fn test_security() -> SecurityConfig {
    SecurityConfig::new("test_secret_key_for_testing_purposes_only".as_bytes())
}

/// Fresh, migrated in-memory SQLite database.
pub async fn test_db() -> DatabaseConnection {
    bootstrap_db(&DbConfig::sqlite_memory())
        .await
        .expect("migrate in-memory sqlite")
}

pub async fn sqlite_state() -> (AppState, DatabaseConnection) {
    let db = test_db().await;
    let state = AppState::from_connection(db.clone(), test_security());
    (state, db)
}

/// Production middleware stack and routes around the given state.
pub async fn init_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .wrap(cors_middleware(&[ALLOWED_ORIGIN.to_string()]))
            .wrap(RequestLog)
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

/// Assert the response is a Problem Details error with the given code.
pub async fn assert_problem<B: MessageBody>(
    resp: ServiceResponse<B>,
    expected_code: &str,
    expected_status: StatusCode,
) -> ProblemDetailsLike {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;
    assert_problem_details_from_parts(
        status,
        &headers,
        &body,
        expected_code,
        expected_status,
        None,
    )
}

pub struct Registered {
    pub id: i64,
    pub email: String,
    pub token: String,
}

impl Registered {
    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token))
    }
}

pub async fn register<S, B>(app: &S, prefix: &str) -> Registered
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let email = unique_email(prefix);
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": email, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "registration should succeed");

    let body: Value = test::read_body_json(resp).await;
    Registered {
        id: body["user"]["id"].as_i64().expect("user id"),
        email: body["user"]["email"].as_str().expect("email").to_string(),
        token: body["token"].as_str().expect("token").to_string(),
    }
}

pub async fn create_event<S, B>(app: &S, user: &Registered, name: &str, date: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/event")
        .insert_header(user.bearer())
        .set_json(json!({ "name": name, "location": "Main Hall", "date": date }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "event creation should succeed");
    test::read_body_json(resp).await
}

pub async fn buy_ticket<S, B>(app: &S, user: &Registered, event_id: i64) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/ticket")
        .insert_header(user.bearer())
        .set_json(json!({ "event_id": event_id }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED, "ticket purchase should succeed");
    test::read_body_json(resp).await
}

/// Event and ticket repositories that only count calls. Used to prove the
/// gate rejects requests before any handler touches storage.
#[derive(Default)]
pub struct CountingRepos {
    pub calls: AtomicUsize,
}

impl CountingRepos {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventRepository for CountingRepos {
    async fn list(&self) -> Result<Vec<Event>, DomainError> {
        self.hit();
        Ok(Vec::new())
    }
    async fn find(&self, _id: i64) -> Result<Option<Event>, DomainError> {
        self.hit();
        Ok(None)
    }
    async fn create(&self, _new: NewEvent) -> Result<Event, DomainError> {
        self.hit();
        Err(DomainError::validation("counting repository does not store"))
    }
    async fn update(
        &self,
        _id: i64,
        _changes: EventChanges,
    ) -> Result<Option<Event>, DomainError> {
        self.hit();
        Ok(None)
    }
    async fn delete(&self, _id: i64) -> Result<bool, DomainError> {
        self.hit();
        Ok(false)
    }
}

#[async_trait]
impl TicketRepository for CountingRepos {
    async fn list_for_user(&self, _user_id: i64) -> Result<Vec<Ticket>, DomainError> {
        self.hit();
        Ok(Vec::new())
    }
    async fn find_for_user(
        &self,
        _ticket_id: i64,
        _user_id: i64,
    ) -> Result<Option<Ticket>, DomainError> {
        self.hit();
        Ok(None)
    }
    async fn create(&self, _user_id: i64, _event_id: i64) -> Result<Ticket, DomainError> {
        self.hit();
        Err(DomainError::validation("counting repository does not store"))
    }
    async fn mark_entered(&self, _ticket_id: i64, _owner_id: i64) -> Result<Ticket, DomainError> {
        self.hit();
        Err(DomainError::validation("counting repository does not store"))
    }
}

/// State whose event and ticket repositories are one shared `CountingRepos`,
/// with real user storage so valid tokens can still be issued.
pub async fn counting_state() -> (AppState, Arc<CountingRepos>, DatabaseConnection) {
    let db = test_db().await;
    let counter = Arc::new(CountingRepos::default());
    let state = AppState::with_repositories(
        test_security(),
        counter.clone(),
        counter.clone(),
        Arc::new(SeaAuthRepository::new(db.clone())),
    );
    (state, counter, db)
}
