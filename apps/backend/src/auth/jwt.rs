use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Claims carried by access tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User id (users.id) as a decimal string
    pub sub: String,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl Claims {
    /// Numeric user id from `sub`.
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| AppError::unauthorized_invalid_jwt())
    }
}

/// Mint an access token valid for `security.token_ttl`.
pub fn mint_access_token(
    user_id: i64,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("Failed to get current time"))?
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat,
        exp: iat + security.token_ttl.as_secs() as i64,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify a token and return its claims.
///
/// Expired tokens map to `UnauthorizedExpiredJwt`; every other failure
/// (bad signature, malformed token, wrong algorithm) to `UnauthorizedInvalidJwt`.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(security.algorithm);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized_expired_jwt(),
        _ => AppError::unauthorized_invalid_jwt(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use super::{mint_access_token, verify_access_token};
    use crate::errors::ErrorCode;
    use crate::state::security_config::SecurityConfig;

    fn security() -> SecurityConfig {
        SecurityConfig::new("test_secret_key_for_testing_purposes_only".as_bytes())
    }

    #[test]
    fn test_mint_and_verify() {
        let security = security();
        let now = SystemTime::now();

        let token = mint_access_token(42, "fan@example.com", now, &security).unwrap();
        let claims = verify_access_token(&token, &security).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "fan@example.com");
        assert_eq!(
            claims.iat,
            now.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
        );
        assert_eq!(claims.exp, claims.iat + 24 * 60 * 60);
    }

    #[test]
    fn test_expired_token() {
        let security = security();
        let issued = SystemTime::now() - Duration::from_secs(25 * 60 * 60);

        let token = mint_access_token(7, "late@example.com", issued, &security).unwrap();
        let err = verify_access_token(&token, &security).unwrap_err();

        assert_eq!(err.code(), ErrorCode::UnauthorizedExpiredJwt);
    }

    #[test]
    fn test_bad_signature() {
        let security_a = SecurityConfig::new("secret-A-0123456789".as_bytes());
        let security_b = SecurityConfig::new("secret-B-0123456789".as_bytes());

        let token = mint_access_token(7, "a@example.com", SystemTime::now(), &security_a).unwrap();
        let err = verify_access_token(&token, &security_b).unwrap_err();

        assert_eq!(err.code(), ErrorCode::UnauthorizedInvalidJwt);
    }

    #[test]
    fn test_garbage_token() {
        let err = verify_access_token("not.a.jwt", &security()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnauthorizedInvalidJwt);
    }
}
