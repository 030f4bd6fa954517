//! Registration, login and token resolution.

use std::sync::Arc;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::auth::jwt::{mint_access_token, verify_access_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::CurrentUser;
use crate::logging::pii::Redacted;
use crate::logging::security;
use crate::repos::{AuthRepository, User};
use crate::state::security_config::SecurityConfig;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash checked when the email is unknown, so both login failure paths do
/// the same amount of work.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| hash_password("dummy-password-for-timing").ok());

/// A freshly issued token together with the user it belongs to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    security: SecurityConfig,
}

/// Trim and lower-case an email, then check it has a local part and a domain.
pub fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(AppError::invalid(
            ErrorCode::InvalidEmail,
            "Email must look like name@domain",
        ))
    }
}

fn check_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::invalid(
            ErrorCode::InvalidPassword,
            format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

async fn hash_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
}

/// Burn the same argon2 work as a real check. The dummy hash is built on
/// first use, which happens inside the blocking task.
async fn verify_against_dummy(password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || match DUMMY_HASH.as_deref() {
        Some(dummy) => verify_password(&password, dummy),
        None => Ok(false),
    })
    .await
    .map_err(|e| AppError::internal(format!("Password verification task failed: {e}")))?
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, security: SecurityConfig) -> Self {
        Self { repo, security }
    }

    fn issue(&self, user: User) -> Result<AuthSession, AppError> {
        let token = mint_access_token(user.id, &user.email, SystemTime::now(), &self.security)?;
        Ok(AuthSession { token, user })
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let email = normalize_email(email)?;
        check_password(password)?;

        let password_hash = hash_blocking(password.to_string()).await?;
        let user = self.repo.create_user(&email, &password_hash).await?;

        info!(user_id = user.id, email = %Redacted(&user.email), "User registered");
        self.issue(user)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AppError> {
        let Ok(email) = normalize_email(email) else {
            security::login_failed("malformed_email", email);
            return Err(AppError::invalid_credentials());
        };

        let Some(user) = self.repo.find_by_email(&email).await? else {
            let _ = verify_against_dummy(password.to_string()).await;
            security::login_failed("unknown_email", &email);
            return Err(AppError::invalid_credentials());
        };

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            security::login_failed("wrong_password", &email);
            return Err(AppError::invalid_credentials());
        }

        debug!(user_id = user.id, "Login succeeded");
        self.issue(user)
    }

    /// Resolve a bearer token into the caller, checking the user still exists.
    pub async fn authenticate(&self, token: &str) -> Result<CurrentUser, AppError> {
        let claims = verify_access_token(token, &self.security)?;
        let user_id = claims.user_id()?;

        match self.repo.find_by_id(user_id).await? {
            Some(user) => Ok(CurrentUser {
                id: user.id,
                email: user.email,
            }),
            None => Err(AppError::unauthorized()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("  Fan@Example.COM ").unwrap(),
            "fan@example.com"
        );
        for bad in ["", "no-at-sign", "@example.com", "fan@", "a@b@c", "fa n@example.com"] {
            let err = normalize_email(bad).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidEmail, "input {bad:?}");
        }
    }

    #[test]
    fn test_password_length() {
        assert!(check_password("12345678").is_ok());
        assert_eq!(
            check_password("1234567").unwrap_err().code(),
            ErrorCode::InvalidPassword
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_dummy_verification_never_matches() {
        assert!(!verify_against_dummy("whatever-password".into()).await.unwrap());
        assert!(Lazy::get(&DUMMY_HASH).is_some());
    }
}
