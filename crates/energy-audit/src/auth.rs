//! Contract with the authentication provider guarding the admin surface.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Signed-in administrator. Presence of a session is the only access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub identifier: String,
    pub started_at: DateTime<Utc>,
}

/// Called with the current session (or `None`) after every sign-in change.
pub type SessionListener = Box<dyn Fn(Option<&Session>) + Send + Sync>;

/// Handle returned by [`AuthProvider::subscribe`]; calling it stops delivery.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

pub trait AuthProvider: Send + Sync {
    fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError>;
    fn logout(&self, token: &str) -> Result<(), AuthError>;
    fn session(&self, token: &str) -> Option<Session>;
    fn subscribe(&self, listener: SessionListener) -> Unsubscribe;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no active session")]
    NoSession,
    #[error("authentication provider unavailable: {0}")]
    Unavailable(String),
}
