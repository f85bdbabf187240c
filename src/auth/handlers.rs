use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::service::{AuthOutcome, AuthRejection, RegistrationOutcome, RegistrationRejection};
use crate::db::PublicUser;
use crate::error::AppError;
use crate::AppState;

const MISSING_CREDENTIALS: &str = "Email and password are required";

/// Login and registration share this body. Both fields are optional so a
/// missing one yields the 400 validation message rather than a parse error.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// JSON or `application/x-www-form-urlencoded`. When neither extractor
/// accepts the body, the JSON error wins, so clients see "Invalid JSON format".
pub type CredentialsBody = web::Either<web::Json<CredentialsRequest>, web::Form<CredentialsRequest>>;

impl CredentialsRequest {
    fn from_body(body: CredentialsBody) -> Self {
        match body {
            web::Either::Left(json) => json.into_inner(),
            web::Either::Right(form) => form.into_inner(),
        }
    }

    fn require(&self) -> Result<(&str, &str), AppError> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Ok((email, password))
            }
            _ => Err(AppError::ValidationError(MISSING_CREDENTIALS.to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

impl AuthResponse {
    fn failure(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            token: None,
            user: None,
        }
    }
}

pub async fn login(
    body: CredentialsBody,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = CredentialsRequest::from_body(body);
    let (email, password) = req.require()?;
    info!("Received login request for email: {}", email);

    let outcome = state.auth_service.authenticate(email, password).await;
    Ok(login_response(outcome))
}

pub async fn register(
    body: CredentialsBody,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = CredentialsRequest::from_body(body);
    let (email, password) = req.require()?;
    info!("Received registration request for email: {}", email);

    let outcome = state.auth_service.register(email, password).await;
    Ok(register_response(outcome))
}

pub fn login_response(outcome: AuthOutcome) -> HttpResponse {
    match outcome {
        AuthOutcome::Authenticated { token, user } => HttpResponse::Ok().json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
            token: Some(token),
            user: Some(user),
        }),
        AuthOutcome::Rejected(reason) => {
            let body = AuthResponse::failure(reason.message());
            match reason {
                AuthRejection::EmailNotFound | AuthRejection::InvalidPassword => {
                    HttpResponse::Unauthorized().json(body)
                }
                AuthRejection::ServerError => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}

pub fn register_response(outcome: RegistrationOutcome) -> HttpResponse {
    match outcome {
        RegistrationOutcome::Created(user) => HttpResponse::Created().json(AuthResponse {
            success: true,
            message: "User created successfully".to_string(),
            token: None,
            user: Some(user),
        }),
        RegistrationOutcome::Rejected(reason) => {
            let body = AuthResponse::failure(reason.message());
            match reason {
                RegistrationRejection::UserExists => HttpResponse::Conflict().json(body),
                RegistrationRejection::ServerError => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}

/// Turns body extraction failures into the uniform 400 response.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!("Rejected malformed body on {}: {}", req.path(), err);
    AppError::InvalidJson(err.to_string()).into()
}

pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use uuid::Uuid;

    async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_require_rejects_missing_or_empty() {
        let cases = [
            (None, Some("pw")),
            (Some("a@x.com"), None),
            (Some(""), Some("pw")),
            (Some("a@x.com"), Some("")),
            (None, None),
        ];
        for (email, password) in cases {
            let req = CredentialsRequest {
                email: email.map(String::from),
                password: password.map(String::from),
            };
            assert!(matches!(req.require(), Err(AppError::ValidationError(_))));
        }
    }

    #[actix_web::test]
    async fn test_login_status_mapping() {
        let resp = login_response(AuthOutcome::Rejected(AuthRejection::EmailNotFound));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Email not found");
        assert!(body.get("token").is_none());

        let resp = login_response(AuthOutcome::Rejected(AuthRejection::InvalidPassword));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = login_response(AuthOutcome::Rejected(AuthRejection::ServerError));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["message"], "Internal server error");
    }

    #[actix_web::test]
    async fn test_register_status_mapping() {
        let user = PublicUser { id: Uuid::new_v4(), email: "a@x.com".into() };
        let resp = register_response(RegistrationOutcome::Created(user));
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["user"]["email"], "a@x.com");

        let resp = register_response(RegistrationOutcome::Rejected(RegistrationRejection::UserExists));
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = register_response(RegistrationOutcome::Rejected(RegistrationRejection::ServerError));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
