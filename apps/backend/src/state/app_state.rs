use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::security_config::SecurityConfig;
use crate::repos::{
    AuthRepository, EventRepository, SeaAuthRepository, SeaEventRepository, SeaTicketRepository,
    TicketRepository,
};
use crate::services::auth::AuthService;

/// Application state shared by every worker through `web::Data`.
///
/// Repositories sit behind trait objects so tests can swap in doubles.
#[derive(Clone)]
pub struct AppState {
    pub security: SecurityConfig,
    pub events: Arc<dyn EventRepository>,
    pub tickets: Arc<dyn TicketRepository>,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the SeaORM repositories and the auth service around one pool.
    pub fn from_connection(db: DatabaseConnection, security: SecurityConfig) -> Self {
        let events: Arc<dyn EventRepository> = Arc::new(SeaEventRepository::new(db.clone()));
        let tickets: Arc<dyn TicketRepository> = Arc::new(SeaTicketRepository::new(db.clone()));
        let users: Arc<dyn AuthRepository> = Arc::new(SeaAuthRepository::new(db));

        Self::with_repositories(security, events, tickets, users)
    }

    pub fn with_repositories(
        security: SecurityConfig,
        events: Arc<dyn EventRepository>,
        tickets: Arc<dyn TicketRepository>,
        users: Arc<dyn AuthRepository>,
    ) -> Self {
        let auth = AuthService::new(users, security.clone());
        Self {
            security,
            events,
            tickets,
            auth,
        }
    }
}
