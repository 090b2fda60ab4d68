//! Remote API client
//!
//! Stateless request wrappers over the storefront HTTP API:
//! - `auth` - login, register, logout, verify
//! - `products` - catalog CRUD, tags, ratings
//! - `carts` - the current user's cart
//!
//! Every operation is a single request with no retry. Non-success responses
//! are translated into `ApiError`, carrying the server's `message` field when
//! present and a per-operation fallback otherwise.

pub mod auth;
pub mod carts;
pub mod products;

#[cfg(test)]
pub(crate) mod test_support;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::config::ApiConfig;

pub use auth::AuthApi;

/// Error returned by remote API calls
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Invalid credentials or an invalid / expired token
    #[error("{0}")]
    Auth(String),

    /// The server rejected the submitted data
    #[error("{0}")]
    Validation(String),

    /// The requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Any other non-success status
    #[error("{message} (status {status})")]
    Server { status: u16, message: String },

    /// The server could not be reached
    #[error("{0}")]
    Transport(String),

    /// A success response did not have the expected shape
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Map a non-success status and message to an error
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Self::Validation(message)
            }
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the server rejected the credentials or token
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the storefront API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client from configuration
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Transport(format!("HTTP client error: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are issued against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send a request and decode the JSON body of a success response
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, fallback).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Send a write request and return its JSON reply.
    ///
    /// A success with no body (204, or an empty 200) yields `Value::Null`.
    pub(crate) async fn send_value(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Value, ApiError> {
        let response = self.send(request, fallback).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Send a request, keeping only the status of a success response
    pub(crate) async fn send_empty(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<(), ApiError> {
        self.send(request, fallback).await.map(|_| ())
    }

    pub(crate) async fn send(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{}: {}", fallback, e)))?;

        let status = response.status();
        tracing::debug!("{} {}", status.as_u16(), response.url().path());

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message)
            .unwrap_or_else(|| fallback.to_string());

        Err(ApiError::from_status(status, message))
    }
}

/// Attach the bearer token to a request
pub(crate) fn bearer(request: RequestBuilder, token: &str) -> RequestBuilder {
    request.bearer_auth(token)
}
