use std::sync::Arc;
use tracing::{error, info, warn};

use super::password::PasswordHasher;
use super::token::TokenIssuer;
use crate::db::{CredentialStore, NewUser, PublicUser};
use crate::error::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    EmailNotFound,
    InvalidPassword,
    ServerError,
}

impl AuthRejection {
    pub fn code(&self) -> &'static str {
        match self {
            AuthRejection::EmailNotFound => "EMAIL_NOT_FOUND",
            AuthRejection::InvalidPassword => "INVALID_PASSWORD",
            AuthRejection::ServerError => "SERVER_ERROR",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthRejection::EmailNotFound => "Email not found",
            AuthRejection::InvalidPassword => "Invalid password",
            AuthRejection::ServerError => "Internal server error",
        }
    }
}

/// Result of a login attempt. Carries either a token or a reason, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated { token: String, user: PublicUser },
    Rejected(AuthRejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationRejection {
    UserExists,
    ServerError,
}

impl RegistrationRejection {
    pub fn code(&self) -> &'static str {
        match self {
            RegistrationRejection::UserExists => "USER_EXISTS",
            RegistrationRejection::ServerError => "SERVER_ERROR",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RegistrationRejection::UserExists => "User already exists",
            RegistrationRejection::ServerError => "Failed to create user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Created(PublicUser),
    Rejected(RegistrationRejection),
}

/// Verifies credentials and registers users. Holds no mutable state; share
/// it behind an `Arc`.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, tokens: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> AuthOutcome {
        let record = match self.store.find_by_email(email).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                info!("Login rejected for {}: email not found", email);
                return AuthOutcome::Rejected(AuthRejection::EmailNotFound);
            }
            Err(e) => {
                error!("Credential lookup failed for {}: {}", email, e);
                return AuthOutcome::Rejected(AuthRejection::ServerError);
            }
        };

        if !self.hasher.verify(password, &record.password_hash) {
            warn!("Login rejected for {}: invalid password", email);
            return AuthOutcome::Rejected(AuthRejection::InvalidPassword);
        }

        match self.tokens.issue(&record.id.to_string()) {
            Ok(token) => AuthOutcome::Authenticated {
                token,
                user: record.to_public(),
            },
            Err(e) => {
                error!("Token issuance failed for user {}: {}", record.id, e);
                AuthOutcome::Rejected(AuthRejection::ServerError)
            }
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> RegistrationOutcome {
        match self.store.find_by_email(email).await {
            Ok(Some(_)) => {
                info!("Registration rejected for {}: user exists", email);
                return RegistrationOutcome::Rejected(RegistrationRejection::UserExists);
            }
            Ok(None) => {}
            Err(e) => {
                error!("Credential lookup failed for {}: {}", email, e);
                return RegistrationOutcome::Rejected(RegistrationRejection::ServerError);
            }
        }

        let password_hash = match self.hasher.hash(password) {
            Ok(hash) => hash,
            Err(e) => {
                error!("Could not hash password for {}: {}", email, e);
                return RegistrationOutcome::Rejected(RegistrationRejection::ServerError);
            }
        };

        let new_user = NewUser {
            email: email.to_string(),
            password_hash,
        };

        match self.store.insert_unique(new_user).await {
            Ok(record) => {
                info!("Created user {} for {}", record.id, email);
                RegistrationOutcome::Created(record.to_public())
            }
            // lost a race with a concurrent registration
            Err(DatabaseError::Duplicate) => {
                info!("Registration rejected for {}: user exists", email);
                RegistrationOutcome::Rejected(RegistrationRejection::UserExists)
            }
            Err(e) => {
                error!("Could not store user {}: {}", email, e);
                RegistrationOutcome::Rejected(RegistrationRejection::ServerError)
            }
        }
    }
}
