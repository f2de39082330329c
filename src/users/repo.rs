use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::{NewUser, User};

/// Failure reported by the storage layer. Carries the driver's message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct RepoError(pub String);

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db) => RepoError(db.message().to_owned()),
            other => RepoError(other.to_string()),
        }
    }
}

/// Persistence operations on users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns the identifier the database assigned to it.
    async fn create(&self, user: &NewUser) -> Result<i64, RepoError>;

    /// Fetches the user with `user_id`, or `None` if there is no such row.
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, RepoError>;

    /// Refuses new work and waits for outstanding statements to finish.
    async fn close(&self);
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: &NewUser) -> Result<i64, RepoError> {
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email)
            VALUES ($1, $2)
            RETURNING user_id::int8
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(user_id)
    }

    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id::int8 AS user_id, username, email
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
