//! Durable user storage behind a storage-agnostic trait.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{NewUser, User};

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("a user with this email already exists")]
    AlreadyExists,
    #[error("user not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for user records. Implementations must be safe to share across requests
/// and must enforce email uniqueness atomically.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user. Fails with `AlreadyExists` if the email is taken, in which
    /// case the existing record is left untouched.
    async fn save(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Looks a user up by exact email.
    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError>;
}
