use crate::config::db::DbConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;
use crate::state::security_config::SecurityConfig;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    security_config: SecurityConfig,
    db_config: DbConfig,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            security_config: SecurityConfig::default(),
            db_config: DbConfig::sqlite_memory(),
        }
    }

    pub fn with_db(mut self, db_config: DbConfig) -> Self {
        self.db_config = db_config;
        self
    }

    pub fn with_security(mut self, security_config: SecurityConfig) -> Self {
        self.security_config = security_config;
        self
    }

    /// Connect, migrate, then compose repositories and services.
    pub async fn build(self) -> Result<AppState, AppError> {
        let conn = bootstrap_db(&self.db_config).await?;
        Ok(AppState::from_connection(conn, self.security_config))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
