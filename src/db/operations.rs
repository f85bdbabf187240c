use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{CredentialStore, NewUser, UserRecord};
use crate::error::DatabaseError;

/// PostgreSQL-backed credential store. Email uniqueness is enforced by the
/// `users_email_key` constraint, so a lost registration race surfaces as a
/// unique violation rather than a second row.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: Arc<PgPool>,
}

impl PgCredentialStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn new_with_options(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Applies the embedded migrations under `./migrations`.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn begin_transaction(&self) -> Result<Transaction<'_, Postgres>, DatabaseError> {
        Ok(self.pool.as_ref().begin().await?)
    }

    async fn insert_with_transaction(
        &self,
        user: &NewUser,
        transaction: &mut Transaction<'_, Postgres>,
    ) -> Result<UserRecord, DatabaseError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&mut **transaction)
        .await?;

        Ok(record)
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(record)
    }

    async fn insert_unique(&self, user: NewUser) -> Result<UserRecord, DatabaseError> {
        let mut transaction = self.begin_transaction().await?;

        // dropping the transaction on error rolls it back
        let record = self.insert_with_transaction(&user, &mut transaction).await?;
        transaction.commit().await?;
        Ok(record)
    }
}
