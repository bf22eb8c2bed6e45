use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequest, Request, State},
    http::Request as HttpRequest,
    middleware::Next,
    response::Response,
    Json,
};
use headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Rejects requests without a valid bearer token and stores the decoded
/// [`User`] in the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: HttpRequest<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if request.headers().get("Authorization").is_none() {
        return Err(AppError::Auth("Missing authorization header".to_string()));
    }

    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))?;

    let user = validate_token(bearer.token(), &config.jwt_secret)
        .map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

pub fn require_role(user: &User, allowed: &[Role], action: &str) -> Result<(), AppError> {
    if user.has_any_role(allowed) {
        Ok(())
    } else {
        let roles: Vec<&str> = allowed.iter().map(Role::as_str).collect();
        Err(AppError::Forbidden(format!("Only {} can {}", roles.join("/"), action)))
    }
}

/// Path identities that do not parse can never match a stored document.
pub fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{} not found", entity)))
}

/// JSON body extractor whose rejection is a 400 with a `{message}` body.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ValidJson(value))
    }
}
