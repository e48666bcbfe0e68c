//! Account flows: registration, login checks, user-bound sessions and password
//! reset.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    error::{AuthError, StoreError},
    password::PasswordHasher,
    repository::{User, UserRepository},
};

/// Result of checking an email/password pair.
#[derive(Debug)]
pub enum LoginOutcome {
    Valid(User),
    UnknownUser,
    WrongPassword,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl AuthService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Errors
    /// `AuthError::EmailTaken` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register_user(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if self.users.find_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken(email.to_string()));
        }
        let digest = self.hasher.hash_blocking(password).await?;
        match self.users.add_user(email, &digest).await {
            Ok(user) => {
                info!("Registered user {}", user.id);
                Ok(user)
            }
            // lost a race with a concurrent registration
            Err(StoreError::Conflict(_)) => Err(AuthError::EmailTaken(email.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// # Errors
    /// Only repository failures.
    #[instrument(skip(self, password))]
    pub async fn check_login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let Some(user) = self.users.find_user_by_email(email).await? else {
            self.hasher.verify_dummy_blocking(password).await;
            return Ok(LoginOutcome::UnknownUser);
        };
        if self
            .hasher
            .verify_blocking(&user.hashed_password, password)
            .await
        {
            Ok(LoginOutcome::Valid(user))
        } else {
            debug!("Wrong password for user {}", user.id);
            Ok(LoginOutcome::WrongPassword)
        }
    }

    /// # Errors
    /// Only repository failures.
    pub async fn valid_login(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        Ok(matches!(
            self.check_login(email, password).await?,
            LoginOutcome::Valid(_)
        ))
    }

    /// Bind a fresh session id to the user with `email` and return it.
    ///
    /// # Errors
    /// Only repository failures. An unknown email yields `Ok(None)`.
    pub async fn create_session(&self, email: &str) -> Result<Option<String>, AuthError> {
        let Some(mut user) = self.users.find_user_by_email(email).await? else {
            return Ok(None);
        };
        let session_id = uuid::Uuid::new_v4().to_string();
        user.session_id = Some(session_id.clone());
        self.users.save_user(&user).await?;
        Ok(Some(session_id))
    }

    /// # Errors
    /// Only repository failures.
    pub async fn get_user_from_session_id(
        &self,
        session_id: Option<&str>,
    ) -> Result<Option<User>, AuthError> {
        let Some(session_id) = session_id else {
            return Ok(None);
        };
        Ok(self.users.find_user_by_session_id(session_id).await?)
    }

    /// Clear the user-bound session id. Unknown users are ignored.
    ///
    /// # Errors
    /// Only repository failures.
    pub async fn destroy_session(&self, user_id: &str) -> Result<(), AuthError> {
        if let Some(mut user) = self.users.find_user_by_id(user_id).await? {
            user.session_id = None;
            self.users.save_user(&user).await?;
        }
        Ok(())
    }

    /// Issue a reset token for the user with `email`.
    ///
    /// # Errors
    /// `AuthError::UnknownUser` if no user has this email.
    #[instrument(skip(self))]
    pub async fn get_reset_password_token(&self, email: &str) -> Result<String, AuthError> {
        let mut user = self
            .users
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        let token = uuid::Uuid::new_v4().to_string();
        user.reset_token = Some(token.clone());
        self.users.save_user(&user).await?;
        Ok(token)
    }

    /// Redeem a reset token: set a new password and invalidate the token.
    ///
    /// # Errors
    /// `AuthError::InvalidResetToken` if no user holds `reset_token`.
    #[instrument(skip(self, reset_token, password))]
    pub async fn update_password(&self, reset_token: &str, password: &str) -> Result<User, AuthError> {
        let mut user = self
            .users
            .find_user_by_reset_token(reset_token)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;
        user.hashed_password = self.hasher.hash_blocking(password).await?;
        user.reset_token = None;
        self.users.save_user(&user).await?;
        info!("Password updated for user {}", user.id);
        Ok(user)
    }
}
