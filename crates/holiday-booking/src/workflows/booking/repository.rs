use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::session::BookingSession;

/// Opaque handle a client uses to address its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|_| RepositoryError::NotFound)
    }
}

/// Session storage. `with_session` runs the closure while the store holds
/// whatever lock it uses, so callers must not await inside it. Stores may
/// forget sessions (idle expiry, capacity); a forgotten id reads as
/// `NotFound`.
pub trait SessionRepository: Send + Sync {
    fn insert(&self, id: SessionId, session: BookingSession) -> Result<(), RepositoryError>;
    fn with_session<T, F>(&self, id: &SessionId, apply: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&mut BookingSession) -> T;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("too many active booking sessions, try again later")]
    AtCapacity,
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
