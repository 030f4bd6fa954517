use std::fmt;

use crate::error::AppError;

/// Database backend, derived from the connection URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

/// Database location. Either a full `DATABASE_URL`, or a Postgres URL
/// assembled from the `DB_*` variables.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    url: String,
}

impl DbConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Private in-memory SQLite database, used by tests.
    pub fn sqlite_memory() -> Self {
        Self::from_url("sqlite::memory:")
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            return Ok(Self::from_url(url.trim()));
        }

        let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".to_string());
        let port = match lookup("DB_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                AppError::config(format!("DB_PORT must be a valid port number, got '{raw}'"))
            })?,
            None => 5432,
        };
        let name = must_var(&lookup, "DB_NAME")?;
        let user = must_var(&lookup, "DB_USER")?;
        let password = must_var(&lookup, "DB_PASSWORD")?;
        let sslmode = lookup("DB_SSLMODE").unwrap_or_else(|| "disable".to_string());

        Ok(Self::from_url(format!(
            "postgresql://{user}:{password}@{host}:{port}/{name}?sslmode={sslmode}"
        )))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> DbKind {
        if self.url.starts_with("sqlite:") {
            if self.url.contains(":memory:") || self.url.contains("mode=memory") {
                DbKind::SqliteMemory
            } else {
                DbKind::SqliteFile
            }
        } else {
            DbKind::Postgres
        }
    }

    /// URL with the password (if any) masked, safe to log.
    pub fn sanitized_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((userinfo, host_part)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host_part}"),
            None => self.url.clone(),
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.sanitized_url())
            .finish()
    }
}

/// Get a required, non-empty variable or return a config error.
pub(crate) fn must_var<F>(lookup: &F, name: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("Required environment variable '{name}' is not set")))
}
