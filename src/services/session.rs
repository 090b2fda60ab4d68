//! Session manager
//!
//! Owns the client's authentication state and keeps the persisted copy in
//! step with it:
//! - `initialize` - restore a persisted session, verified remotely
//! - `login` / `authenticate` - store a freshly issued token
//! - `logout` - best-effort remote revoke, unconditional local cleanup
//! - `force_logout` / `revalidate` - drop an invalid or mismatched session
//! - `ensure_verified` - `revalidate` unless already verified since the last transition
//!
//! Every transition runs under one write lock together with its storage
//! writes, and bumps an epoch. Remote checks (`verify`) run without the lock;
//! their outcome is applied only if the epoch is unchanged, so an explicit
//! login or logout always wins over a verification that was in flight.

use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::api::{ApiError, AuthApi};
use crate::models::{SessionEvent, SessionState, TOKEN_KEY, USERNAME_KEY};
use crate::services::token::decode_claims;
use crate::storage::DynSessionStore;

/// Capacity of the lifecycle event channel
const EVENT_CHANNEL_CAPACITY: usize = 16;

struct Inner {
    state: SessionState,
    epoch: u64,
    /// Epoch at which the server last accepted the current token
    verified_epoch: Option<u64>,
}

/// Session manager
pub struct SessionManager {
    store: DynSessionStore,
    auth: Arc<dyn AuthApi>,
    inner: RwLock<Inner>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    /// Create a manager in the `Uninitialized` state
    pub fn new(store: DynSessionStore, auth: Arc<dyn AuthApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            auth,
            inner: RwLock::new(Inner {
                state: SessionState::Uninitialized,
                epoch: 0,
                verified_epoch: None,
            }),
            events,
        }
    }

    /// Snapshot of the current state
    pub async fn state(&self) -> SessionState {
        self.inner.read().await.state.clone()
    }

    /// Whether requests may be made on behalf of a user
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.state.is_authenticated()
    }

    /// Current bearer token
    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.state.token().map(str::to_string)
    }

    /// Current username
    pub async fn username(&self) -> Option<String> {
        self.inner.read().await.state.username().map(str::to_string)
    }

    /// Receive lifecycle events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Restore the persisted session.
    ///
    /// Resolves to `Authenticated` only when both entries are present, the
    /// token decodes, the server accepts it, and its `user_name` claim equals
    /// the stored username. Every other outcome resolves to `Absent` and
    /// erases the persisted entries.
    pub async fn initialize(&self) -> SessionState {
        let epoch = self.inner.read().await.epoch;

        let outcome = match self.read_persisted().await {
            None => {
                debug!("No persisted session");
                None
            }
            Some((token, username)) => self.check_persisted(token, username).await,
        };

        let state = {
            let mut inner = self.inner.write().await;
            if inner.epoch != epoch {
                debug!("Session changed during startup check; keeping the newer state");
                return inner.state.clone();
            }

            inner.state = match outcome {
                Some((token, username)) => {
                    info!("Restored session for {}", username);
                    SessionState::authenticated(token, username)
                }
                None => {
                    self.erase_persisted().await;
                    SessionState::Absent
                }
            };
            inner.epoch += 1;
            if inner.state.is_authenticated() {
                inner.verified_epoch = Some(inner.epoch);
            }
            inner.state.clone()
        };

        self.notify(SessionEvent::Initialized {
            authenticated: state.is_authenticated(),
        });
        state
    }

    async fn check_persisted(&self, token: String, username: String) -> Option<(String, String)> {
        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Discarding persisted session: {}", e);
                return None;
            }
        };

        match self.auth.verify(&token).await {
            Ok(true) if claims.user_name == username => Some((token, username)),
            Ok(true) => {
                warn!("Discarding persisted session: token was issued to another user");
                None
            }
            Ok(false) => {
                warn!("Discarding persisted session: token rejected by server");
                None
            }
            Err(e) => {
                warn!("Discarding persisted session: verification failed: {}", e);
                None
            }
        }
    }

    /// Store a token the server just issued to `username`.
    ///
    /// The token is trusted as-is; no verification round-trip.
    pub async fn login(&self, token: impl Into<String>, username: impl Into<String>) {
        let (token, username) = (token.into(), username.into());
        {
            let mut inner = self.inner.write().await;
            if let Err(e) = self.persist(&token, &username).await {
                warn!("Failed to persist session for {}: {:#}", username, e);
            }
            inner.state = SessionState::authenticated(token, username.clone());
            inner.epoch += 1;
        }

        info!("Logged in as {}", username);
        self.notify(SessionEvent::LoggedIn { username });
    }

    /// Log in with credentials: remote login, then `login` with the issued token.
    ///
    /// Remote failures are returned for display and leave the session untouched.
    pub async fn authenticate(&self, user_name: &str, password: &str) -> Result<(), ApiError> {
        let token = self.auth.login(user_name, password).await?;
        self.login(token, user_name).await;
        Ok(())
    }

    /// Log out.
    ///
    /// The remote revoke is attempted once; its failure is logged and local
    /// cleanup happens regardless. Never fails from the caller's view.
    pub async fn logout(&self) {
        if let Some(token) = self.token().await {
            if let Err(e) = self.auth.logout(&token).await {
                warn!("Remote logout failed: {}", e);
            }
        }

        let mut inner = self.inner.write().await;
        self.clear_locked(&mut inner).await;
        drop(inner);

        info!("Logged out");
        self.notify(SessionEvent::LoggedOut);
    }

    /// Drop the session without contacting the server and tell every
    /// subscriber to reset whatever it derived from it.
    pub async fn force_logout(&self, reason: &str) {
        let mut inner = self.inner.write().await;
        self.clear_locked(&mut inner).await;
        drop(inner);

        warn!("Session dropped: {}", reason);
        self.notify(SessionEvent::ForcedLogout {
            reason: reason.to_string(),
        });
    }

    /// Re-check the current session with the server.
    ///
    /// Forces logout when the token is rejected, verification fails, or the
    /// token's claim no longer matches the username. Returns whether the
    /// session is authenticated afterwards.
    pub async fn revalidate(&self) -> bool {
        let (epoch, token, username) = {
            let inner = self.inner.read().await;
            match &inner.state {
                SessionState::Authenticated { token, username } => {
                    (inner.epoch, token.clone(), username.clone())
                }
                _ => return false,
            }
        };

        let failure = match self.auth.verify(&token).await {
            Ok(true) => match decode_claims(&token) {
                Ok(claims) if claims.user_name == username => None,
                Ok(_) => Some("token was issued to another user".to_string()),
                Err(e) => Some(e.to_string()),
            },
            Ok(false) => Some("token rejected by server".to_string()),
            Err(e) => Some(format!("verification failed: {}", e)),
        };

        let mut inner = self.inner.write().await;
        let Some(reason) = failure else {
            if inner.epoch == epoch {
                inner.verified_epoch = Some(epoch);
            }
            return inner.state.is_authenticated();
        };

        if inner.epoch != epoch {
            debug!("Session changed during revalidation; keeping the newer state");
            return inner.state.is_authenticated();
        }
        self.clear_locked(&mut inner).await;
        drop(inner);

        warn!("Session dropped: {}", reason);
        self.notify(SessionEvent::ForcedLogout { reason });
        false
    }

    /// Whether the session is authenticated, asking the server only when the
    /// current token has not been verified since the last transition.
    pub async fn ensure_verified(&self) -> bool {
        {
            let inner = self.inner.read().await;
            if !inner.state.is_authenticated() {
                return false;
            }
            if inner.verified_epoch == Some(inner.epoch) {
                return true;
            }
        }
        self.revalidate().await
    }

    async fn clear_locked(&self, inner: &mut Inner) {
        self.erase_persisted().await;
        inner.state = SessionState::Absent;
        inner.epoch += 1;
    }

    async fn read_persisted(&self) -> Option<(String, String)> {
        let token = self.read_key(TOKEN_KEY).await;
        let username = self.read_key(USERNAME_KEY).await;
        match (token, username) {
            (Some(token), Some(username)) => Some((token, username)),
            (None, None) => None,
            _ => {
                warn!("Persisted session is half-written; discarding it");
                None
            }
        }
    }

    async fn read_key(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Failed to read '{}' from session storage: {:#}", key, e);
                None
            }
        }
    }

    async fn persist(&self, token: &str, username: &str) -> anyhow::Result<()> {
        self.store.set(TOKEN_KEY, token).await?;
        self.store.set(USERNAME_KEY, username).await?;
        Ok(())
    }

    async fn erase_persisted(&self) {
        for key in [TOKEN_KEY, USERNAME_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!("Failed to remove '{}' from session storage: {:#}", key, e);
            }
        }
    }

    fn notify(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }
}
