use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::db::{DbConfig, DbKind};
use crate::error::AppError;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL: Duration = Duration::from_secs(2);

fn connect_options(config: &DbConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(config.url().to_owned());
    opts.connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    match config.kind() {
        // Every connection to `sqlite::memory:` opens its own empty database,
        // so the pool must hold exactly one.
        DbKind::SqliteMemory => {
            opts.max_connections(1).min_connections(1);
        }
        DbKind::SqliteFile => {
            opts.max_connections(4);
        }
        DbKind::Postgres => {
            opts.max_connections(10).min_connections(1);
        }
    }
    opts
}

/// Retry with a fixed interval; returns the last error once attempts run out.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval: Duration,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    attempt,
                    max_attempts,
                    interval_ms = interval.as_millis() as u64,
                    error = %e,
                    "connection_retry=failed"
                );
                attempt += 1;
                tokio::time::sleep(interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Open a connection pool. Does NOT run migrations.
///
/// Postgres is retried a few times since it may still be starting next to
/// us; SQLite failures are not transient and fail immediately.
pub async fn connect_db(config: &DbConfig) -> Result<DatabaseConnection, AppError> {
    let attempts = match config.kind() {
        DbKind::Postgres => CONNECT_ATTEMPTS,
        DbKind::SqliteFile | DbKind::SqliteMemory => 1,
    };

    info!(db = %config.sanitized_url(), "Connecting to database");

    retry_connection(
        || async {
            Database::connect(connect_options(config))
                .await
                .map_err(|e| AppError::db_unavailable(format!("Failed to connect to database: {e}")))
        },
        attempts,
        CONNECT_INTERVAL,
    )
    .await
}

/// Connect, then bring the schema up to date. The only entry point used by
/// `StateBuilder`, so the app never serves against an un-migrated database.
pub async fn bootstrap_db(config: &DbConfig) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(config).await?;

    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::internal(format!("Database migration failed: {e}")))?;

    info!(db = %config.sanitized_url(), "Database ready");
    Ok(conn)
}
