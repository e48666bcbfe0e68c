//! Request and response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::User;

/// `email` and `password` form fields, used by registration and login.
#[derive(Default, Deserialize, ToSchema)]
pub struct CredentialsForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ResetPasswordForm {
    pub email: Option<String>,
}

#[derive(Default, Deserialize, ToSchema)]
pub struct UpdatePasswordForm {
    pub email: Option<String>,
    pub reset_token: Option<String>,
    pub new_password: Option<String>,
}

impl std::fmt::Debug for UpdatePasswordForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdatePasswordForm")
            .field("email", &self.email)
            .field("reset_token", &self.reset_token.as_ref().map(|_| "***"))
            .field("new_password", &self.new_password.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResetTokenResponse {
    pub email: String,
    pub reset_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}
