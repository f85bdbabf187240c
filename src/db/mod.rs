//! Credential storage for authgate.
//!
//! The service only needs two operations from a store: exact lookup by email
//! and an insert that enforces email uniqueness itself. Two backends exist,
//! PostgreSQL via sqlx and an in-process map.

pub mod memory;
pub mod models;
pub mod operations;

use async_trait::async_trait;

use crate::error::DatabaseError;

pub use memory::MemoryCredentialStore;
pub use models::{NewUser, PublicUser, UserRecord};
pub use operations::PgCredentialStore;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive match on the stored email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError>;

    /// Creates the record, or fails with `DatabaseError::Duplicate` when the
    /// email is already taken. Must be atomic with respect to that check.
    async fn insert_unique(&self, user: NewUser) -> Result<UserRecord, DatabaseError>;
}
