pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use std::time::Duration;
use actix_web::{web, HttpResponse};
use tracing::info;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::{Settings, StoreBackend};

pub use auth::{AuthOutcome, AuthService, PasswordHasher, RegistrationOutcome, TokenIssuer};
pub use db::{CredentialStore, MemoryCredentialStore, PgCredentialStore, PublicUser};

/// Liveness probe; carries no auth logic.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "OK",
        "message": "Server is running"
    }))
}

/// Registers every route and the JSON body config. Shared by `main` and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(auth::handlers::json_error_handler))
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health_check))
                .route("/login", web::post().to(auth::handlers::login))
                .route("/register", web::post().to(auth::handlers::register)),
        )
        .default_service(web::to(auth::handlers::not_found));
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub auth_service: Arc<AuthService>,
    pg_store: Option<PgCredentialStore>,
}

impl AppState {
    /// Builds the configured credential store and the auth service. Fails
    /// without a usable signing key.
    pub async fn new(config: Settings) -> Result<Self> {
        config.validate()?;

        let (store, pg_store): (Arc<dyn CredentialStore>, Option<PgCredentialStore>) =
            match config.database.backend {
                StoreBackend::Postgres => {
                    let pg = PgCredentialStore::new_with_options(
                        &config.database.url,
                        config.database.max_connections,
                        Duration::from_secs(config.database.acquire_timeout_secs),
                    )
                    .await?;
                    pg.migrate().await?;
                    (Arc::new(pg.clone()), Some(pg))
                }
                StoreBackend::Memory => {
                    info!("Using in-memory credential store; users are lost on restart");
                    (Arc::new(MemoryCredentialStore::new()), None)
                }
            };

        let mut state = Self::with_store(config, store)?;
        state.pg_store = pg_store;
        Ok(state)
    }

    /// Wires the service around an already constructed store.
    pub fn with_store(config: Settings, store: Arc<dyn CredentialStore>) -> Result<Self> {
        config.validate()?;

        let tokens = TokenIssuer::new(
            &config.auth.jwt_secret,
            chrono::Duration::hours(config.auth.token_expiry_hours),
        )?;
        let auth_service = AuthService::new(store, PasswordHasher::new(), tokens);

        Ok(Self {
            config: Arc::new(config),
            auth_service: Arc::new(auth_service),
            pg_store: None,
        })
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(pg) = &self.pg_store {
            pg.close().await;
        }
        Ok(())
    }
}
