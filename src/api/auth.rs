//! Auth resource
//!
//! - POST /auth/login - exchange credentials for a token
//! - POST /auth/register - create an account
//! - GET /auth/logout - revoke a token
//! - GET /auth/verify - check a token is still valid

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{bearer, ApiClient, ApiError};
use crate::models::{LoginInput, RegisterInput};

const AUTH_PATH: &str = "/auth";

/// Identity operations the session manager depends on
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange credentials for a fresh token
    async fn login(&self, user_name: &str, password: &str) -> Result<String, ApiError>;

    /// Revoke `token` on the server
    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// Whether `token` is still valid
    async fn verify(&self, token: &str) -> Result<bool, ApiError>;
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct RegisterResponse {
    #[serde(default)]
    message: String,
}

impl ApiClient {
    /// Register a new account, returning the server's confirmation message
    pub async fn register(&self, input: &RegisterInput) -> Result<String, ApiError> {
        let request = self
            .http()
            .post(self.url(&format!("{}/register", AUTH_PATH)))
            .json(input);
        let response: RegisterResponse = self.send_json(request, "Registration failed").await?;
        Ok(response.message)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, user_name: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginInput {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        let request = self
            .http()
            .post(self.url(&format!("{}/login", AUTH_PATH)))
            .json(&body);
        let response: LoginResponse = self.send_json(request, "Login failed").await?;
        Ok(response.token)
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let request = bearer(
            self.http().get(self.url(&format!("{}/logout", AUTH_PATH))),
            token,
        );
        self.send_empty(request, "Logout failed").await
    }

    async fn verify(&self, token: &str) -> Result<bool, ApiError> {
        let request = bearer(
            self.http().get(self.url(&format!("{}/verify", AUTH_PATH))),
            token,
        );
        let response = self.send(request, "Verification failed").await?;
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Verification failed: {}", e)))?;
        Ok(parse_verify_body(&body))
    }
}

/// Interpret a success body from the verify route.
///
/// Accepts `{"valid": bool}` or a bare boolean; any other success body
/// counts as valid.
fn parse_verify_body(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Bool(valid)) => valid,
        Ok(value) => value.get("valid").and_then(Value::as_bool).unwrap_or(true),
        Err(_) => true,
    }
}
