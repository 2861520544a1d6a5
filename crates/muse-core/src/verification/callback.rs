//! Email-verification callback handling.

use std::time::Duration;

use super::marker::PendingVerificationStore;
use crate::auth::{AuthProvider, AuthRedirect};

/// Delay before the single re-check when no session is present yet.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const VERIFICATION_FAILED_PATH: &str = "/login?error=verification_failed";

/// Why a callback ended in [`CallbackState::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackFailure {
    /// The redirect itself carried an error parameter.
    Rejected(String),
    /// Fetching the session failed.
    Session(String),
    /// Still no session after the delayed re-check.
    NoSession,
}

impl CallbackFailure {
    #[must_use]
    pub const fn redirect_path(&self) -> &'static str {
        match self {
            Self::Rejected(_) | Self::Session(_) => VERIFICATION_FAILED_PATH,
            Self::NoSession => LOGIN_PATH,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected(message) | Self::Session(message) => message,
            Self::NoSession => "No session was established by the verification link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackState {
    Verifying,
    Success,
    Error(CallbackFailure),
}

impl CallbackState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Verifying)
    }

    /// The one place each terminal state leads to.
    #[must_use]
    pub const fn redirect_path(&self) -> Option<&'static str> {
        match self {
            Self::Verifying => None,
            Self::Success => Some(HOME_PATH),
            Self::Error(failure) => Some(failure.redirect_path()),
        }
    }
}

/// Runs the verifying → success/error transition once per callback.
pub struct VerificationCallback<'a, P, M> {
    provider: &'a P,
    marker: &'a M,
    retry_delay: Duration,
    state: CallbackState,
}

impl<'a, P: AuthProvider, M: PendingVerificationStore> VerificationCallback<'a, P, M> {
    pub const fn new(provider: &'a P, marker: &'a M) -> Self {
        Self {
            provider,
            marker,
            retry_delay: RETRY_DELAY,
            state: CallbackState::Verifying,
        }
    }

    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub const fn state(&self) -> &CallbackState {
        &self.state
    }

    /// Drive the machine to a terminal state. Re-running a finished callback
    /// returns the existing outcome.
    pub async fn run(&mut self, redirect: &AuthRedirect) -> &CallbackState {
        if self.state.is_terminal() {
            return &self.state;
        }
        self.state = self.resolve(redirect).await;
        match &self.state {
            CallbackState::Success => tracing::info!("Email verification completed"),
            CallbackState::Error(failure) => {
                tracing::warn!("Email verification failed: {}", failure.message());
            }
            CallbackState::Verifying => {}
        }
        &self.state
    }

    async fn resolve(&self, redirect: &AuthRedirect) -> CallbackState {
        if let Some(error) = redirect.error() {
            return CallbackState::Error(CallbackFailure::Rejected(error));
        }

        match self.provider.current_session().await {
            Err(error) => {
                tracing::error!("Error getting session: {}", error);
                return CallbackState::Error(CallbackFailure::Session(error.to_string()));
            }
            Ok(Some(_)) => return self.succeed(),
            Ok(None) => {}
        }

        tracing::debug!("No session yet; re-checking in {:?}", self.retry_delay);
        tokio::time::sleep(self.retry_delay).await;
        match self.provider.current_session().await {
            Ok(Some(_)) => self.succeed(),
            Ok(None) => CallbackState::Error(CallbackFailure::NoSession),
            Err(error) => {
                tracing::debug!("Session re-check failed: {}", error);
                CallbackState::Error(CallbackFailure::NoSession)
            }
        }
    }

    fn succeed(&self) -> CallbackState {
        if let Err(error) = self.marker.clear() {
            tracing::warn!("Failed to clear pending verification marker: {}", error);
        }
        CallbackState::Success
    }
}
