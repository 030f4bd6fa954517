//! User lookups used by registration, login and the auth gate.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::adapters::users_sea as users_adapter;
use crate::entities::users;
use crate::errors::domain::DomainError;

/// User domain model
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, DomainError>;
    /// Fails with `Conflict(UniqueEmail)` when the email is taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DomainError>;
}

#[derive(Clone)]
pub struct SeaAuthRepository {
    db: DatabaseConnection,
}

impl SeaAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuthRepository for SeaAuthRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let user = users_adapter::find_user_by_email(&self.db, email).await?;
        Ok(user.map(User::from))
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, DomainError> {
        let user = users_adapter::find_user_by_id(&self.db, user_id).await?;
        Ok(user.map(User::from))
    }

    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, DomainError> {
        let dto = users_adapter::UserCreate::new(email, password_hash);
        let user = users_adapter::create_user(&self.db, dto).await?;
        Ok(User::from(user))
    }
}
