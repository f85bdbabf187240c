//! Authentication module for authgate
//!
//! Password hashing, access-token issuance and the login/registration
//! service, plus the HTTP handlers that expose them.

pub mod handlers;
mod password;
mod service;
mod token;

pub use password::PasswordHasher;
pub use service::{
    AuthOutcome, AuthRejection, AuthService, RegistrationOutcome, RegistrationRejection,
};
pub use token::{Claims, TokenIssuer};
