use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_database::{Document, StoreError};
use shared_models::auth::Role;
use shared_models::error::AppError;

/// Branch scope of an account that may act on every branch.
pub const ALL_BRANCHES: &str = "all";

/// A staff login. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub branch_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for UserAccount {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Reuse an existing identity, e.g. a doctor's record id.
    pub id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub branch_id: String,
}

/// Profile fields kept in step with the record an account belongs to.
/// `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct AccountProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub branch_id: Option<String>,
}

impl AccountProfile {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.branch_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in user as returned by login. `role` is the wire tag, kept as
/// sent so a client can still route a tag it does not know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub branch_id: String,
}

impl SessionUser {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email {0} is already registered")]
    EmailTaken(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Token issuance failed: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Auth(err.to_string()),
            AuthError::EmailTaken(_) | AuthError::ValidationError(_) => AppError::BadRequest(err.to_string()),
            AuthError::PasswordHash(_) | AuthError::Token(_) => AppError::Internal(err.to_string()),
            AuthError::DatabaseError(_) => AppError::Database(err.to_string()),
        }
    }
}
