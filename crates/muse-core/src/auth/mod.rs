//! Auth provider contract and session types.
//!
//! The rest of the crate only sees [`AuthProvider`]: the current session,
//! sign-up/sign-in/sign-out, and a stream of [`AuthEvent`]s.
//! [`SupabaseAuthClient`] is the GoTrue-backed implementation.

mod redirect;
mod supabase;
mod validation;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::util::unix_timestamp_now;

pub use redirect::AuthRedirect;
pub use supabase::SupabaseAuthClient;
pub use validation::{
    validate_sign_up, SignUpForm, SignUpValidationError, MIN_PASSWORD_LENGTH,
};

const EXPIRY_SKEW_SECONDS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
}

impl AuthUser {
    #[must_use]
    pub const fn is_email_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// True when this user is `email` and that address has been confirmed.
    #[must_use]
    pub fn has_confirmed_email(&self, email: &str) -> bool {
        self.is_email_confirmed()
            && self
                .email
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(email.trim()))
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    pub user: AuthUser,
}

impl AuthSession {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= unix_timestamp_now() + EXPIRY_SKEW_SECONDS
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    SignedIn(AuthSession),
    ConfirmationRequired,
}

/// Auth-state change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(AuthSession),
    TokenRefreshed(AuthSession),
    SignedOut,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid auth request: {0}")]
    InvalidRequest(&'static str),
    #[error("Auth request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed auth payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Validation(#[from] SignUpValidationError),
    #[error("Secure storage error: {0}")]
    SecureStorage(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Where a signed-in session is kept between runs.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> AuthResult<Option<AuthSession>>;
    fn save_session(&self, session: &AuthSession) -> AuthResult<()>;
    fn clear_session(&self) -> AuthResult<()>;
}

/// Process-local session store.
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    session: Arc<Mutex<Option<String>>>,
}

impl MemorySessionStore {
    fn lock(&self) -> AuthResult<MutexGuard<'_, Option<String>>> {
        self.session
            .lock()
            .map_err(|error| AuthError::SecureStorage(error.to_string()))
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> AuthResult<Option<AuthSession>> {
        self.lock()?
            .as_deref()
            .map(|raw| serde_json::from_str(raw).map_err(AuthError::from))
            .transpose()
    }

    fn save_session(&self, session: &AuthSession) -> AuthResult<()> {
        let raw = serde_json::to_string(session)?;
        *self.lock()? = Some(raw);
        Ok(())
    }

    fn clear_session(&self) -> AuthResult<()> {
        self.lock()?.take();
        Ok(())
    }
}

/// The auth collaborator as seen by stores, the session boundary and the
/// verification flows.
#[allow(async_fn_in_trait)]
pub trait AuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome>;

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession>;

    async fn sign_out(&self) -> AuthResult<()>;

    /// Current session, refreshed if it had expired. `Ok(None)` when signed out.
    async fn current_session(&self) -> AuthResult<Option<AuthSession>>;

    /// Subscribe to auth-state changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(email: &str, confirmed: bool) -> AuthSession {
        AuthSession {
            access_token: "secret-access-token".to_string(),
            refresh_token: "secret-refresh-token".to_string(),
            expires_at: 1_700_000_000,
            user: AuthUser {
                id: "user".to_string(),
                email: Some(email.to_string()),
                email_confirmed_at: confirmed.then(Utc::now),
            },
        }
    }

    #[test]
    fn session_debug_redacts_tokens() {
        let rendered = format!("{:?}", session("a@example.com", true));
        assert!(!rendered.contains("secret-access-token"));
        assert!(!rendered.contains("secret-refresh-token"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn has_confirmed_email_requires_match_and_confirmation() {
        let confirmed = session("Reader@Example.com", true).user;
        assert!(confirmed.has_confirmed_email("reader@example.com"));
        assert!(!confirmed.has_confirmed_email("other@example.com"));

        let unconfirmed = session("reader@example.com", false).user;
        assert!(!unconfirmed.has_confirmed_email("reader@example.com"));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemorySessionStore::default();
        assert!(store.load_session().unwrap().is_none());

        let saved = session("a@example.com", false);
        store.save_session(&saved).unwrap();
        assert_eq!(store.load_session().unwrap(), Some(saved));

        store.clear_session().unwrap();
        store.clear_session().unwrap();
        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn expired_session_detection() {
        let mut current = session("a@example.com", true);
        current.expires_at = unix_timestamp_now() + 3600;
        assert!(!current.is_expired());
        current.expires_at = unix_timestamp_now() + 10;
        assert!(current.is_expired());
    }
}
