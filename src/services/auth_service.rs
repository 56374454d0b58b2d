use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::{PasswordHasher, TokenCodec};
use crate::database::models::User;
use crate::database::store::UserStore;
use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// A fresh session: the account plus a signed bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, tokens: TokenCodec) -> Self {
        Self { users, hasher, tokens }
    }

    pub async fn register(&self, input: RegisterInput) -> Result<Session, ApiError> {
        // Pre-check gives the friendly message; the store's unique index
        // still backstops the race.
        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(ApiError::conflict("A user with this email already exists"));
        }

        let password_hash = self.hasher.hash(&input.password)?;
        let user =
            self.users.insert(User::new(input.email, password_hash, input.display_name)).await?;

        let token = self.tokens.sign(user.id, &user.email)?;
        tracing::info!(user_id = %user.id, "registered new account");
        Ok(Session { user, token })
    }

    pub async fn login(&self, input: LoginInput) -> Result<Session, ApiError> {
        // One message for both unknown email and bad password, so login
        // cannot be used to probe which accounts exist.
        let invalid = || ApiError::unauthenticated("Invalid email or password");

        let user = self.users.find_by_email(&input.email).await?.ok_or_else(invalid)?;
        if !self.hasher.verify(&input.password, &user.password_hash) {
            return Err(invalid());
        }

        let token = self.tokens.sign(user.id, &user.email)?;
        Ok(Session { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::database::memory::MemoryStore;

    fn service() -> AuthService {
        let security = SecurityConfig {
            jwt_secret: Some("auth-service-test".to_string()),
            jwt_expiry_hours: 24,
            bcrypt_cost: 4,
        };
        AuthService::new(
            Arc::new(MemoryStore::new()),
            PasswordHasher::new(&security),
            TokenCodec::new(&security),
        )
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput {
            email: email.to_string(),
            password: "Passw0rd!".to_string(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let service = service();
        let session = service.register(register_input("a@x.com")).await.unwrap();
        assert!(!session.token.is_empty());

        let session = service
            .login(LoginInput { email: "a@x.com".to_string(), password: "Passw0rd!".to_string() })
            .await
            .unwrap();
        assert_eq!(session.user.email, "a@x.com");
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_case_insensitively() {
        let service = service();
        service.register(register_input("a@x.com")).await.unwrap();
        let err = service.register(register_input("A@X.COM")).await.unwrap_err();
        assert_eq!(err.error_code(), "CONFLICT");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_identical() {
        let service = service();
        service.register(register_input("a@x.com")).await.unwrap();

        let wrong_password = service
            .login(LoginInput { email: "a@x.com".to_string(), password: "nope".to_string() })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginInput { email: "b@x.com".to_string(), password: "nope".to_string() })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.error_code(), "UNAUTHENTICATED");
        assert_eq!(wrong_password.message(), unknown_email.message());
    }

    #[tokio::test]
    async fn password_hash_never_serializes() {
        let service = service();
        let session = service.register(register_input("a@x.com")).await.unwrap();
        let body = serde_json::to_value(&session).unwrap();
        assert!(body["user"].get("passwordHash").is_none());
        assert!(body["user"].get("password_hash").is_none());
    }
}
