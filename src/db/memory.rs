use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, NewUser, UserRecord};
use crate::error::DatabaseError;

/// Process-local store keyed by email. Used for tests and `database.backend = "memory"`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DatabaseError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert_unique(&self, user: NewUser) -> Result<UserRecord, DatabaseError> {
        // check and insert under one write guard
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(DatabaseError::Duplicate);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
        };
        users.insert(record.email.clone(), record.clone());
        Ok(record)
    }
}
