use chrono::{Duration, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::jwt::{issue_token, TokenSubject};

pub struct TestConfig {
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            token_ttl_minutes: 60,
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl_minutes: self.token_ttl_minutes,
            port: 0,
            api_prefix: "/api".to_string(),
            seed_demo_data: false,
        }
    }
}

pub struct TestUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub branch_id: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("test@example.com", "employee")
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: format!("Test {}", role),
            email: email.to_string(),
            role: role.to_string(),
            branch_id: "all".to_string(),
        }
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn employee(email: &str) -> Self {
        Self::new(email, "employee")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            branch_id: Some(self.branch_id.clone()),
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_minutes: Option<i64>) -> String {
        let subject = TokenSubject {
            id: &user.id,
            name: &user.name,
            email: &user.email,
            role: &user.role,
            branch_id: &user.branch_id,
        };
        issue_token(&subject, secret, Duration::minutes(exp_minutes.unwrap_or(60)))
            .expect("test secret must not be empty")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-5))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(60))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}
