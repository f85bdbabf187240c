use authgate_server::{
    auth::{AuthOutcome, AuthRejection, AuthService, PasswordHasher, RegistrationOutcome, RegistrationRejection, TokenIssuer},
    error::AuthError,
    MemoryCredentialStore,
};
use chrono::{Duration, Utc};
use std::sync::Arc;

fn setup_service() -> AuthService {
    let tokens = TokenIssuer::new("test_secret", Duration::hours(24)).unwrap();
    AuthService::new(Arc::new(MemoryCredentialStore::new()), PasswordHasher::new(), tokens)
}

#[tokio::test]
async fn test_register_login_scenario() {
    let auth_service = setup_service();

    let created = match auth_service.register("a@x.com", "secret1").await {
        RegistrationOutcome::Created(user) => user,
        other => panic!("expected Created, got {:?}", other),
    };
    assert_eq!(created.email, "a@x.com");

    match auth_service.authenticate("a@x.com", "secret1").await {
        AuthOutcome::Authenticated { token, user } => {
            assert_eq!(user, created);

            let claims = auth_service.tokens().verify(&token).unwrap();
            assert_eq!(claims.sub, created.id.to_string());
            let remaining = claims.exp - Utc::now().timestamp();
            assert!(remaining > 23 * 3600 && remaining <= 24 * 3600);
        }
        other => panic!("expected Authenticated, got {:?}", other),
    }

    assert_eq!(
        auth_service.authenticate("a@x.com", "wrong").await,
        AuthOutcome::Rejected(AuthRejection::InvalidPassword)
    );
    assert_eq!(
        auth_service.authenticate("nobody@x.com", "secret1").await,
        AuthOutcome::Rejected(AuthRejection::EmailNotFound)
    );
    assert_eq!(
        auth_service.register("a@x.com", "other").await,
        RegistrationOutcome::Rejected(RegistrationRejection::UserExists)
    );

    // the rejected re-registration must not have replaced the password
    assert!(matches!(
        auth_service.authenticate("a@x.com", "secret1").await,
        AuthOutcome::Authenticated { .. }
    ));
}

#[tokio::test]
async fn test_email_match_is_exact() {
    let auth_service = setup_service();
    auth_service.register("a@x.com", "secret1").await;

    assert_eq!(
        auth_service.authenticate("A@x.com", "secret1").await,
        AuthOutcome::Rejected(AuthRejection::EmailNotFound)
    );
    assert_eq!(
        auth_service.authenticate(" a@x.com", "secret1").await,
        AuthOutcome::Rejected(AuthRejection::EmailNotFound)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_creates_one_user() {
    let auth_service = Arc::new(setup_service());

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = auth_service.clone();
        handles.push(tokio::spawn(async move {
            service.register("race@x.com", &format!("password{}", i)).await
        }));
    }

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            RegistrationOutcome::Created(_) => created += 1,
            RegistrationOutcome::Rejected(reason) => {
                assert_eq!(reason, RegistrationRejection::UserExists)
            }
        }
    }
    assert_eq!(created, 1);
}

#[tokio::test]
async fn test_invalid_token() {
    let auth_service = setup_service();
    assert!(matches!(
        auth_service.tokens().verify("invalid_token"),
        Err(AuthError::InvalidToken)
    ));
}
