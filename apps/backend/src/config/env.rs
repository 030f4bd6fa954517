use std::fmt;

use actix_web::http::Uri;

use super::db::{must_var, DbConfig, DbKind};
use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const MIN_JWT_SECRET_LEN: usize = 16;

/// Immutable process configuration.
///
/// Built once in `main` and passed by reference to whatever needs it; nothing
/// else reads the environment.
#[derive(Clone)]
pub struct EnvConfig {
    pub server_host: String,
    pub server_port: u16,
    pub allowed_origins: Vec<String>,
    pub jwt_secret: String,
    pub db: DbConfig,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_host = lookup("SERVER_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::config(format!("SERVER_PORT must be a valid port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };

        let allowed_origins = parse_origins(&must_var(&lookup, "ALLOWED_ORIGINS")?)?;

        let jwt_secret = must_var(&lookup, "JWT_SECRET")?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(AppError::config(format!(
                "JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }

        let db = DbConfig::from_lookup(&lookup)?;
        // The pool recycles idle connections, and each reconnect to
        // `sqlite::memory:` starts from an empty database.
        if db.kind() == DbKind::SqliteMemory {
            return Err(AppError::config(
                "DATABASE_URL cannot point at in-memory SQLite for the server",
            ));
        }

        Ok(Self {
            server_host,
            server_port,
            allowed_origins,
            jwt_secret,
            db,
        })
    }

    pub fn security(&self) -> SecurityConfig {
        SecurityConfig::new(self.jwt_secret.as_bytes())
    }
}

impl fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvConfig")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("allowed_origins", &self.allowed_origins)
            .field("jwt_secret", &"***")
            .field("db", &self.db)
            .finish()
    }
}

/// Parse a comma-separated origin list.
///
/// Empty entries are skipped. Every remaining entry must be a bare http(s)
/// origin (scheme, host and optional port). `*` is refused because the CORS
/// policy allows credentials.
fn parse_origins(raw: &str) -> Result<Vec<String>, AppError> {
    let mut origins = Vec::new();

    for origin in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if origin == "*" {
            return Err(AppError::config(
                "ALLOWED_ORIGINS cannot contain '*' when credentials are allowed",
            ));
        }
        origins.push(parse_origin(origin)?);
    }

    if origins.is_empty() {
        return Err(AppError::config("ALLOWED_ORIGINS must list at least one origin"));
    }

    Ok(origins)
}

fn parse_origin(origin: &str) -> Result<String, AppError> {
    let invalid = |reason: &str| {
        AppError::config(format!("ALLOWED_ORIGINS entry '{origin}' {reason}"))
    };

    let uri: Uri = origin
        .parse()
        .map_err(|_| invalid("is not a valid origin"))?;

    let scheme = match uri.scheme_str() {
        Some(scheme @ ("http" | "https")) => scheme,
        _ => return Err(invalid("must start with http:// or https://")),
    };
    let authority = match uri.authority() {
        Some(authority) if !authority.host().is_empty() => authority,
        _ => return Err(invalid("must include a host")),
    };
    if authority.as_str().contains('@') {
        return Err(invalid("must not carry user info"));
    }
    if uri.path() != "/" || uri.query().is_some() || origin.contains('#') {
        return Err(invalid("must not have a path, query or fragment"));
    }

    Ok(format!("{scheme}://{authority}"))
}
