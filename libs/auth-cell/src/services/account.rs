use chrono::{Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{AppState, Collection, StoreError};
use shared_utils::jwt::{issue_token, TokenSubject};

use crate::models::{AccountProfile, AuthError, LoginRequest, LoginResponse, NewAccount, SessionUser, UserAccount};
use crate::services::password::PasswordService;

pub struct AccountService {
    users: Collection<UserAccount>,
}

impl AccountService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.db.collection(),
        }
    }

    pub async fn create_account(&self, account: NewAccount) -> Result<UserAccount, AuthError> {
        debug!("Creating {} account for: {}", account.role, account.email);

        let email = account.email.trim().to_ascii_lowercase();
        if email.is_empty() || account.name.trim().is_empty() {
            return Err(AuthError::ValidationError("Name and email are required".to_string()));
        }
        if account.password.is_empty() {
            return Err(AuthError::ValidationError("Password is required".to_string()));
        }

        let password_hash = PasswordService::hash_password(&account.password)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        let now = Utc::now();
        let user = UserAccount {
            id: account.id.unwrap_or_else(Uuid::new_v4),
            name: account.name.trim().to_string(),
            email: email.clone(),
            password_hash,
            role: account.role,
            branch_id: account.branch_id,
            created_at: now,
            updated_at: now,
        };

        let created = self.users
            .insert_unique(user, "email", |existing, new| existing.email == new.email)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => AuthError::EmailTaken(email),
                other => other.into(),
            })?;

        info!("Account {} created with role {}", created.id, created.role);
        Ok(created)
    }

    /// Rewrites the profile of an existing account. `Ok(None)` when there is
    /// no account with that id.
    pub async fn update_profile(
        &self,
        account_id: Uuid,
        profile: AccountProfile,
    ) -> Result<Option<UserAccount>, AuthError> {
        debug!("Updating profile of account {}", account_id);

        let email = profile.email.map(|e| e.trim().to_ascii_lowercase());
        if email.as_deref().is_some_and(str::is_empty) || profile.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AuthError::ValidationError("Name and email are required".to_string()));
        }

        let taken = email.clone();
        let updated = self.users
            .update_unique(
                account_id,
                "email",
                |user| {
                    if let Some(name) = profile.name {
                        user.name = name.trim().to_string();
                    }
                    if let Some(email) = email {
                        user.email = email;
                    }
                    if let Some(branch_id) = profile.branch_id {
                        user.branch_id = branch_id;
                    }
                    user.updated_at = Utc::now();
                },
                |existing, new| existing.email == new.email,
            )
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => AuthError::EmailTaken(taken.unwrap_or_default()),
                other => other.into(),
            })?;

        if let Some(user) = &updated {
            info!("Account {} profile updated", user.id);
        }
        Ok(updated)
    }

    pub async fn delete_account(&self, account_id: Uuid) -> Option<UserAccount> {
        let removed = self.users.delete(account_id).await;
        if removed.is_some() {
            info!("Account {} deleted", account_id);
        }
        removed
    }

    pub async fn find_by_email(&self, email: &str) -> Option<UserAccount> {
        let email = email.trim().to_ascii_lowercase();
        self.users.find_one(|u| u.email == email).await
    }

    pub async fn login(&self, request: LoginRequest, config: &AppConfig) -> Result<LoginResponse, AuthError> {
        debug!("Login attempt for: {}", request.email);

        let Some(account) = self.find_by_email(&request.email).await else {
            warn!("Login failed: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let matches = PasswordService::verify_password(&request.password, &account.password_hash)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        if !matches {
            warn!("Login failed: bad password for {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        let id = account.id.to_string();
        let subject = TokenSubject {
            id: &id,
            name: &account.name,
            email: &account.email,
            role: account.role.as_str(),
            branch_id: &account.branch_id,
        };
        let token = issue_token(&subject, &config.jwt_secret, Duration::minutes(config.token_ttl_minutes))
            .map_err(AuthError::Token)?;

        info!("User {} logged in as {}", account.id, account.role);
        Ok(LoginResponse {
            token,
            user: SessionUser {
                id: account.id,
                name: account.name,
                role: account.role.as_str().to_string(),
                branch_id: account.branch_id,
            },
        })
    }
}
