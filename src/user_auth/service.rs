//! Core auth flows: registration and login.
//!
//! Orchestrates the credential verifier, the token codec, and the user
//! repository. Argon2 work is pushed onto the blocking pool so it never
//! stalls the request event loop.

use std::sync::Arc;

use super::error::AuthError;
use super::models::{Claims, LoginRequest, RegisterRequest, Role, SessionResponse, UserProfile};
use super::password::{hash_password, verify_password};
use super::token::TokenCodec;
use crate::db::{UserRecord, UserRepository};

pub struct AuthService {
    repo: UserRepository,
    codec: Arc<TokenCodec>,
}

fn profile_of(record: &UserRecord) -> UserProfile {
    UserProfile {
        id: record.id,
        email: record.email.clone(),
        name: record.name.clone(),
        role: Role::from_db(&record.role),
        avatar: record.avatar.clone(),
    }
}

impl AuthService {
    pub fn new(repo: UserRepository, codec: Arc<TokenCodec>) -> Self {
        Self { repo, codec }
    }

    /// Register a new user and issue a session token.
    pub async fn register(&self, req: RegisterRequest) -> Result<SessionResponse, AuthError> {
        if self.repo.find_by_email(&req.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password = req.password;
        let digest = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hash task failed: {}", e)))??;

        let id = self
            .repo
            .insert(&req.email, &digest, &req.name, Role::User.as_str())
            .await
            .map_err(|e| {
                // The pre-check races with concurrent registration; the UNIQUE
                // constraint is the authority.
                if e.to_string().contains("UNIQUE") {
                    AuthError::EmailTaken
                } else {
                    AuthError::Database(e)
                }
            })?;

        let token = self.codec.issue(id, &req.email, Role::User)?;
        tracing::info!(user_id = id, "user registered");

        Ok(SessionResponse {
            token,
            user: UserProfile {
                id,
                email: req.email,
                name: req.name,
                role: Role::User,
                avatar: None,
            },
        })
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, req: LoginRequest) -> Result<SessionResponse, AuthError> {
        let user = self
            .repo
            .find_by_email(&req.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = req.password;
        let digest = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &digest))
            .await
            .map_err(|e| AuthError::Internal(format!("verify task failed: {}", e)))??;

        if !ok {
            tracing::warn!(user_id = user.id, "failed login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let role = Role::from_db(&user.role);
        let token = self.codec.issue(user.id, &user.email, role)?;
        tracing::info!(user_id = user.id, "login succeeded");

        Ok(SessionResponse {
            token,
            user: profile_of(&user),
        })
    }

    /// Fetch the fresh profile for an authenticated session.
    pub async fn me(&self, claims: &Claims) -> Result<UserProfile, AuthError> {
        let user = self
            .repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        Ok(profile_of(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn service() -> AuthService {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init_schema(&pool).await.unwrap();
        let codec = Arc::new(TokenCodec::new("test-secret-at-least-32-bytes-long!!"));
        AuthService::new(UserRepository::new(pool), codec)
    }

    fn register_req(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "hunter22hunter22".to_string(),
            name: "Tester".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let service = service().await;
        let session = service.register(register_req("a@b.com")).await.unwrap();
        assert_eq!(session.user.role, Role::User);
        assert!(!session.token.is_empty());

        let login = service
            .login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "hunter22hunter22".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user.id, session.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let service = service().await;
        service.register(register_req("a@b.com")).await.unwrap();
        let dup = service.register(register_req("a@b.com")).await;
        assert!(matches!(dup, Err(AuthError::EmailTaken)));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_alike() {
        let service = service().await;
        service.register(register_req("a@b.com")).await.unwrap();

        let wrong_password = service
            .login(LoginRequest {
                email: "a@b.com".to_string(),
                password: "wrong password!!".to_string(),
            })
            .await;
        let unknown_email = service
            .login(LoginRequest {
                email: "nobody@b.com".to_string(),
                password: "hunter22hunter22".to_string(),
            })
            .await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_me_returns_fresh_profile() {
        let service = service().await;
        let session = service.register(register_req("a@b.com")).await.unwrap();
        let claims = Claims {
            sub: session.user.id,
            email: "a@b.com".to_string(),
            role: Role::User,
            iat: 0,
            exp: i64::MAX,
        };
        let profile = service.me(&claims).await.unwrap();
        assert_eq!(profile.id, session.user.id);
        assert_eq!(profile.email, "a@b.com");
    }
}
