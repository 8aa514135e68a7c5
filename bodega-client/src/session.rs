//! Session store
//!
//! Single authority on "who is logged in and how". The lifecycle is an
//! explicit three-state machine: the application boots in `Pending`,
//! and a one-shot [`SessionStore::restore`] resolves it to either
//! `Authenticated` or `Anonymous`. Protected views must not render
//! while the state is `Pending`.

use std::sync::Arc;

use shared::client::UserInfo;

use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::storage::{CredentialStore, StorageError};

/// How the current session authenticates against the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// `Authorization: Bearer <token>`
    Token,
    /// `x-api-key: <key>`
    ApiKey,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Token => "token",
            AuthMethod::ApiKey => "api-key",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "token" => Some(AuthMethod::Token),
            "api-key" => Some(AuthMethod::ApiKey),
            _ => None,
        }
    }
}

/// An authenticated identity and its credential
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserInfo,
    pub method: AuthMethod,
    pub credential: String,
}

/// Session lifecycle state
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    /// Startup restore still in flight
    #[default]
    Pending,
    /// No session; only the login view may render
    Anonymous,
    Authenticated(Session),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::Authenticated(s) => Some(s),
            _ => None,
        }
    }
}

/// Owns the auth state and the credential store writes
#[derive(Debug)]
pub struct SessionStore {
    state: AuthState,
    storage: Arc<CredentialStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<CredentialStore>) -> Self {
        Self {
            state: AuthState::Pending,
            storage,
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Persist a token session and switch to `Authenticated`
    pub fn login_with_token(&mut self, user: UserInfo, token: String) -> Result<(), StorageError> {
        self.storage.store_token(&token, &user)?;
        tracing::info!(username = %user.username, "Logged in with token");
        self.state = AuthState::Authenticated(Session {
            user,
            method: AuthMethod::Token,
            credential: token,
        });
        Ok(())
    }

    /// Persist an API-key session and switch to `Authenticated`
    pub fn login_with_api_key(&mut self, user: UserInfo, key: String) -> Result<(), StorageError> {
        self.storage.store_api_key(&key, &user)?;
        tracing::info!(username = %user.username, "Logged in with API key");
        self.state = AuthState::Authenticated(Session {
            user,
            method: AuthMethod::ApiKey,
            credential: key,
        });
        Ok(())
    }

    /// Clear persisted credentials and switch to `Anonymous`. Idempotent.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.storage.clear()?;
        self.state = AuthState::Anonymous;
        Ok(())
    }

    /// Resolve the boot-time `Pending` state from persisted fields.
    ///
    /// Token sessions are revalidated against `GET /auth/verify`; a
    /// failed check degrades silently to logged-out. Single best-effort
    /// attempt, no retry. API-key sessions restore without a network
    /// call (the key is validated by the server on the next request).
    pub async fn restore(&mut self, api: &ApiClient) -> ClientResult<()> {
        let probed = Self::probe_stored(&self.storage, api).await;
        self.finish_restore(probed)?;
        Ok(())
    }

    /// The read-and-revalidate half of [`restore`](Self::restore),
    /// callable from a background task that does not own the store.
    /// A failed check yields `None`; [`finish_restore`](Self::finish_restore)
    /// completes the logout.
    pub async fn probe_stored(storage: &CredentialStore, api: &ApiClient) -> Option<Session> {
        let stored = storage.snapshot();

        let method = stored.auth_method.as_deref().and_then(AuthMethod::parse);
        let user = stored.user_info();

        match (method, user) {
            (Some(AuthMethod::Token), Some(user)) => match stored.token {
                Some(token) => match api.verify().await {
                    Ok(()) => Some(Session {
                        user,
                        method: AuthMethod::Token,
                        credential: token,
                    }),
                    Err(e) => {
                        tracing::warn!(error = %e, "Stored token failed verification");
                        None
                    }
                },
                None => None,
            },
            (Some(AuthMethod::ApiKey), Some(user)) => stored.api_key.map(|key| Session {
                user,
                method: AuthMethod::ApiKey,
                credential: key,
            }),
            _ => None,
        }
    }

    /// Apply the probe result: authenticated on a live session,
    /// otherwise a clean logout.
    pub fn finish_restore(&mut self, restored: Option<Session>) -> Result<(), StorageError> {
        match restored {
            Some(session) => {
                tracing::info!(username = %session.user.username, "Session restored");
                self.state = AuthState::Authenticated(session);
                Ok(())
            }
            None => self.logout(),
        }
    }
}
