//! User service
//!
//! Registration, login, and session handling. The first account ever
//! registered becomes the administrator; everyone after that defaults to
//! a customer account unless an admin assigns a role.

use anyhow::Result;
use std::sync::Arc;
use validator::Validate;

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, User, UserRole, UserStatus};
use crate::services::password::{hash_password, verify_password};

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials or disabled account)
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Username or email already taken
    #[error("User already exists: {0}")]
    UserExists(String),

    /// Session missing or expired
    #[error("Session invalid")]
    SessionInvalid,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    /// Register a new user. The first user in the system becomes Admin.
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        input
            .validate()
            .map_err(|e| UserServiceError::ValidationError(e.to_string()))?;

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(UserServiceError::UserExists(input.username));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(UserServiceError::UserExists(input.email));
        }

        let role = if self.user_repo.count().await? == 0 {
            UserRole::Admin
        } else {
            input.role.unwrap_or(UserRole::Customer)
        };

        let password_hash = hash_password(&input.password)?;
        let user = User::new(input.username, input.email, password_hash, role);
        Ok(self.user_repo.create(&user).await?)
    }

    /// Log in with username (or email) and password, returning a session.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<(User, Session), UserServiceError> {
        let user = match self.user_repo.find_by_username(identifier).await? {
            Some(user) => Some(user),
            None => self.user_repo.find_by_email(identifier).await?,
        };

        // Same error for unknown user and bad password
        let Some(user) = user else {
            return Err(UserServiceError::AuthenticationFailed);
        };
        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::AuthenticationFailed);
        }
        if user.status == UserStatus::Disabled {
            return Err(UserServiceError::AuthenticationFailed);
        }

        let session = Session::new(user.id);
        self.session_repo.create(&session).await?;
        Ok((user, session))
    }

    /// Resolve a session token to its user. Expired sessions are deleted
    /// on sight.
    pub async fn validate_session(&self, token: &str) -> Result<User, UserServiceError> {
        let Some(session) = self.session_repo.find_by_id(token).await? else {
            return Err(UserServiceError::SessionInvalid);
        };

        if session.is_expired() {
            self.session_repo.delete(token).await?;
            return Err(UserServiceError::SessionInvalid);
        }

        let Some(user) = self.user_repo.find_by_id(session.user_id).await? else {
            return Err(UserServiceError::SessionInvalid);
        };
        if user.status == UserStatus::Disabled {
            return Err(UserServiceError::SessionInvalid);
        }

        Ok(user)
    }

    /// Log out by deleting the session. Unknown tokens are a no-op.
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo.delete(token).await?;
        Ok(())
    }

    /// Change a user's password and revoke their other sessions.
    pub async fn change_password(
        &self,
        user_id: i64,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        if new_password.len() < 8 {
            return Err(UserServiceError::ValidationError(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        let password_hash = hash_password(new_password)?;
        self.user_repo
            .update_password_hash(user_id, &password_hash)
            .await?;
        self.session_repo.delete_for_user(user_id).await?;
        Ok(())
    }

    /// Remove expired sessions. Called periodically from the server loop.
    pub async fn cleanup_sessions(&self) -> Result<u64> {
        self.session_repo.delete_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};

    async fn service() -> UserService {
        let pool = create_test_pool().await.unwrap();
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn input(username: &str) -> CreateUserInput {
        CreateUserInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "secret-password".to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let service = service().await;

        let first = service.register(input("founder")).await.unwrap();
        assert_eq!(first.role, UserRole::Admin);

        let second = service.register(input("guest")).await.unwrap();
        assert_eq!(second.role, UserRole::Customer);
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let service = service().await;
        service.register(input("founder")).await.unwrap();

        let result = service.register(input("founder")).await;
        assert!(matches!(result, Err(UserServiceError::UserExists(_))));
    }

    #[tokio::test]
    async fn test_login_and_session_validation() {
        let service = service().await;
        service.register(input("founder")).await.unwrap();

        let (user, session) = service.login("founder", "secret-password").await.unwrap();
        assert_eq!(user.username, "founder");

        let resolved = service.validate_session(&session.id).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_login_by_email() {
        let service = service().await;
        service.register(input("founder")).await.unwrap();

        let result = service.login("founder@example.com", "secret-password").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let service = service().await;
        service.register(input("founder")).await.unwrap();

        let result = service.login("founder", "wrong").await;
        assert!(matches!(
            result,
            Err(UserServiceError::AuthenticationFailed)
        ));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = service().await;
        service.register(input("founder")).await.unwrap();

        let (_, session) = service.login("founder", "secret-password").await.unwrap();
        service.logout(&session.id).await.unwrap();

        let result = service.validate_session(&session.id).await;
        assert!(matches!(result, Err(UserServiceError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_change_password_revokes_sessions() {
        let service = service().await;
        let user = service.register(input("founder")).await.unwrap();

        let (_, session) = service.login("founder", "secret-password").await.unwrap();
        service
            .change_password(user.id, "new-secret-password")
            .await
            .unwrap();

        assert!(service.validate_session(&session.id).await.is_err());
        assert!(service.login("founder", "new-secret-password").await.is_ok());
    }
}
