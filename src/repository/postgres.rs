use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::{RepositoryError, UserRepository};
use crate::models::{NewUser, User};

/// `UserRepository` backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool against `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, user: NewUser) -> Result<User, RepositoryError> {
        let user = User::new(user);

        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, username, name, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, email, username, name, password_hash, created_at",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, username, name, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

/// The unique index on `email` is the only arbiter of concurrent sign-ups.
fn map_unique_violation(error: sqlx::Error) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
            RepositoryError::AlreadyExists
        }
        _ => RepositoryError::Database(error),
    }
}
