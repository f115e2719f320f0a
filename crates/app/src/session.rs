//! Session state.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use rouge::storage::{Storage, StorageError};

/// Storage key holding the persisted session.
pub const SESSION_KEY: &str = "rouge.session.v1";

/// Errors raised while persisting the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Storage couldn't be read or written.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The session couldn't be encoded.
    #[error("failed to encode session")]
    Encode(#[source] serde_json::Error),
}

/// Bearer token of an authenticated customer.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token value, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Who is looking at the cart.
///
/// Supplied by whatever resolves authentication; the cart layer never looks it
/// up itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "token", rename_all = "snake_case")]
pub enum Session {
    /// Authentication hasn't been resolved yet.
    #[default]
    Unknown,

    /// Anonymous visitor.
    Guest,

    /// Logged-in customer.
    Authenticated(AccessToken),
}

impl Session {
    /// Access token, when authenticated.
    #[must_use]
    pub fn token(&self) -> Option<&AccessToken> {
        match self {
            Self::Authenticated(token) => Some(token),
            Self::Unknown | Self::Guest => None,
        }
    }
}

/// Read the persisted session. Nothing stored, or something unreadable, means
/// an anonymous visitor.
///
/// # Errors
///
/// Returns an error when storage can't be read.
pub fn load_session(storage: &dyn Storage) -> Result<Session, SessionError> {
    let Some(raw) = storage.get(SESSION_KEY)? else {
        return Ok(Session::Guest);
    };

    match serde_json::from_str::<Session>(&raw) {
        Ok(Session::Unknown) => Ok(Session::Guest),
        Ok(session) => Ok(session),
        Err(error) => {
            warn!(key = SESSION_KEY, %error, "discarding unreadable session");

            storage.remove(SESSION_KEY)?;

            Ok(Session::Guest)
        }
    }
}

/// Persist `session`. Guest and unknown sessions are stored as "no session".
///
/// # Errors
///
/// Returns an error when the session can't be encoded or storage can't be
/// written.
pub fn save_session(storage: &dyn Storage, session: &Session) -> Result<(), SessionError> {
    match session {
        Session::Authenticated(_) => {
            let raw = serde_json::to_string(session).map_err(SessionError::Encode)?;

            storage.set(SESSION_KEY, &raw)?;
        }
        Session::Unknown | Session::Guest => storage.remove(SESSION_KEY)?,
    }

    Ok(())
}

/// Which store is currently authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Session not resolved; no store is active.
    Unknown,

    /// Local guest store is active.
    Guest,

    /// Guest items are being copied to the remote cart.
    Migrating,

    /// Remote store is active.
    Authenticated,
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Guest => "guest",
            Self::Migrating => "migrating",
            Self::Authenticated => "authenticated",
        })
    }
}
