//! Authentication endpoints.

use reqwest::Method;
use secrecy::SecretString;
use tracing::{debug, instrument};

use super::ApiClient;
use super::types::{ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest};
use crate::error::{ApiError, Result};
use crate::session::AuthSession;
use bookbarn_core::Email;

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// The returned session is not persisted; hand it to
    /// [`SessionStore::login`](crate::session::SessionStore::login) for that.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with status 401 on bad credentials.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<AuthSession> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidInput("username is required".to_string()));
        }

        let body = LoginRequest {
            username: username.to_string(),
            password: password.clone(),
        };
        let url = self.endpoint(&["auth", "login"])?;
        let response: LoginResponse = self.send(self.request(Method::POST, url, None).json(&body)).await?;

        debug!(user_id = %response.user_id, "Login accepted");
        Ok(AuthSession::new(response.token, response.user_id))
    }

    /// Create a shopper account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration (for example
    /// a taken username).
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        let url = self.endpoint(&["auth", "register"])?;
        self.send_empty(self.request(Method::POST, url, None).json(request))
            .await
    }

    /// Ask the backend to email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(domain = %email.domain()))]
    pub async fn forgot_password(&self, email: &Email) -> Result<()> {
        let url = self.endpoint(&["auth", "forgot-password"])?;
        let body = ForgotPasswordRequest {
            email: email.clone(),
        };
        self.send_empty(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// Set a new password using the token from the reset email.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is expired or invalid.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &SecretString) -> Result<()> {
        if token.trim().is_empty() {
            return Err(ApiError::InvalidInput("reset token is required".to_string()));
        }
        let url = self.endpoint(&["auth", "reset-password"])?;
        let body = ResetPasswordRequest {
            token: token.trim().to_string(),
            new_password: new_password.clone(),
        };
        self.send_empty(self.request(Method::POST, url, None).json(&body))
            .await
    }
}
