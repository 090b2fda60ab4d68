//! Session model
//!
//! The client-side authentication state. A token never exists without its
//! username (and vice versa): the only way to carry both is the
//! `Authenticated` variant.

use serde::{Deserialize, Serialize};

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the username the token was issued to
pub const USERNAME_KEY: &str = "username";

/// Session state owned by the session manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    /// Startup check has not resolved yet
    #[default]
    Uninitialized,
    /// Logged out
    Absent,
    /// Logged in with a token issued to `username`
    Authenticated { token: String, username: String },
}

impl SessionState {
    /// Build the authenticated state
    pub fn authenticated(token: impl Into<String>, username: impl Into<String>) -> Self {
        Self::Authenticated {
            token: token.into(),
            username: username.into(),
        }
    }

    /// Whether the session may be used for authenticated requests.
    ///
    /// `Uninitialized` renders exactly like `Absent`.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    /// Whether the startup check has resolved
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    /// Current bearer token, if logged in
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Current username, if logged in
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Authenticated { username, .. } => Some(username),
            _ => None,
        }
    }
}

/// Lifecycle notifications broadcast to session consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Startup check resolved
    Initialized { authenticated: bool },
    /// A fresh token was stored
    LoggedIn { username: String },
    /// User-initiated logout finished
    LoggedOut,
    /// The client dropped an invalid or mismatched session.
    ///
    /// Consumers must discard anything derived from the previous session.
    ForcedLogout { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_renders_as_logged_out() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Uninitialized);
        assert!(!state.is_authenticated());
        assert!(!state.is_initialized());
        assert_eq!(state.token(), None);
        assert_eq!(state.username(), None);
    }

    #[test]
    fn test_authenticated_exposes_both_fields() {
        let state = SessionState::authenticated("abc", "alice");
        assert!(state.is_authenticated());
        assert!(state.is_initialized());
        assert_eq!(state.token(), Some("abc"));
        assert_eq!(state.username(), Some("alice"));
    }

    #[test]
    fn test_absent_has_neither_field() {
        let state = SessionState::Absent;
        assert!(state.is_initialized());
        assert_eq!(state.token(), None);
        assert_eq!(state.username(), None);
    }

    #[test]
    fn test_serializes_with_status_tag() {
        let json = serde_json::to_value(SessionState::authenticated("t", "u")).unwrap();
        assert_eq!(json["status"], "authenticated");
        assert_eq!(json["token"], "t");
        assert_eq!(json["username"], "u");
    }
}
