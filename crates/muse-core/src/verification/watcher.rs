//! Background detection of a completed email verification.
//!
//! While a sign-up is awaiting confirmation, the watcher polls the current
//! session and listens to auth-state events. Either path ends in
//! [`VerificationWatcher::mark_verified`], which is safe to reach twice.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::MissedTickBehavior;

use super::marker::{MarkerResult, PendingVerificationStore};
use crate::auth::{AuthEvent, AuthProvider, AuthSession};

pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// View state of the "check your email" dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationDialog {
    pending_email: Option<String>,
    verified: bool,
    dismissed: bool,
}

impl VerificationDialog {
    #[must_use]
    pub const fn new(pending_email: Option<String>) -> Self {
        Self {
            pending_email,
            verified: false,
            dismissed: false,
        }
    }

    #[must_use]
    pub fn pending_email(&self) -> Option<&str> {
        self.pending_email.as_deref()
    }

    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.verified
    }

    /// Hidden on the callback route, which shows its own progress.
    #[must_use]
    pub const fn should_show(&self, on_callback_route: bool) -> bool {
        self.pending_email.is_some() && !self.verified && !self.dismissed && !on_callback_route
    }

    /// Close the dialog; the pending marker is left in place.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Verified,
    NothingPending,
    Cancelled,
}

pub struct VerificationWatcher<'a, P, M> {
    provider: &'a P,
    marker: &'a M,
    dialog: VerificationDialog,
    poll_interval: Duration,
}

impl<'a, P: AuthProvider, M: PendingVerificationStore> VerificationWatcher<'a, P, M> {
    /// Load the pending marker. Without one there is nothing to watch.
    pub fn new(provider: &'a P, marker: &'a M) -> MarkerResult<Self> {
        let pending_email = marker.pending_email()?;
        Ok(Self {
            provider,
            marker,
            dialog: VerificationDialog::new(pending_email),
            poll_interval: POLL_INTERVAL,
        })
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub const fn dialog(&self) -> &VerificationDialog {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut VerificationDialog {
        &mut self.dialog
    }

    /// Clear the marker and flag the dialog verified.
    pub fn mark_verified(&mut self) {
        if let Err(error) = self.marker.clear() {
            tracing::warn!("Failed to clear pending verification marker: {}", error);
        }
        if !self.dialog.verified {
            tracing::info!("Email verification detected");
        }
        self.dialog.verified = true;
        self.dialog.pending_email = None;
    }

    fn confirms_pending(&self, session: &AuthSession) -> bool {
        self.dialog
            .pending_email()
            .is_some_and(|email| session.user.has_confirmed_email(email))
    }

    /// One poll of the current session. Errors are expected while the user
    /// is unverified and are ignored.
    pub async fn poll_once(&mut self) -> bool {
        match self.provider.current_session().await {
            Ok(Some(session)) if self.confirms_pending(&session) => {
                self.mark_verified();
                true
            }
            Ok(_) => false,
            Err(error) => {
                tracing::debug!("Verification poll skipped: {}", error);
                false
            }
        }
    }

    /// Handle one auth-state event; returns true when it verified the email.
    pub fn observe(&mut self, event: &AuthEvent) -> bool {
        match event {
            AuthEvent::SignedIn(session) if self.confirms_pending(session) => {
                self.mark_verified();
                true
            }
            _ => false,
        }
    }

    /// Poll and listen until verified or `cancel` completes. Dropping the
    /// returned future stops the interval as well.
    pub async fn run_until(&mut self, cancel: impl Future<Output = ()>) -> WatchOutcome {
        if self.dialog.pending_email.is_none() {
            return if self.dialog.verified {
                WatchOutcome::Verified
            } else {
                WatchOutcome::NothingPending
            };
        }

        let mut events = self.provider.subscribe();
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(cancel);

        loop {
            tokio::select! {
                () = &mut cancel => return WatchOutcome::Cancelled,
                _ = ticker.tick() => {
                    if self.poll_once().await {
                        return WatchOutcome::Verified;
                    }
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        if self.observe(&event) {
                            return WatchOutcome::Verified;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Auth events lagged by {}", skipped);
                    }
                    // Sender gone: keep polling.
                    Err(RecvError::Closed) => events = self.provider.subscribe(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use crate::testing::{session_for, FakeAuthProvider};
    use crate::verification::MemoryMarkerStore;

    const EMAIL: &str = "reader@example.com";

    fn pending_marker() -> MemoryMarkerStore {
        let marker = MemoryMarkerStore::default();
        marker.set_pending_email(EMAIL).unwrap();
        marker
    }

    fn never() -> impl Future<Output = ()> {
        std::future::pending()
    }

    #[test]
    fn dialog_visibility_rules() {
        let mut dialog = VerificationDialog::new(Some(EMAIL.to_string()));
        assert!(dialog.should_show(false));
        assert!(!dialog.should_show(true));
        dialog.dismiss();
        assert!(!dialog.should_show(false));
        assert!(!VerificationDialog::new(None).should_show(false));
    }

    #[tokio::test(start_paused = true)]
    async fn poll_path_detects_verification() {
        let provider = FakeAuthProvider::default();
        provider.queue_session(Err(AuthError::Api("Invalid Refresh Token (400)".to_string())));
        provider.queue_session(Ok(Some(session_for(EMAIL, false))));
        provider.set_session(Some(session_for(EMAIL, true)));
        let marker = pending_marker();

        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();
        assert!(watcher.dialog().should_show(false));
        let started = tokio::time::Instant::now();

        assert_eq!(watcher.run_until(never()).await, WatchOutcome::Verified);
        assert_eq!(provider.session_calls(), 3);
        assert!(started.elapsed() >= POLL_INTERVAL * 2);
        assert!(watcher.dialog().is_verified());
        assert!(!watcher.dialog().should_show(false));
        assert_eq!(marker.pending_email().unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn push_path_detects_verification() {
        let provider = FakeAuthProvider::default();
        let marker = pending_marker();
        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();

        let pusher = provider.clone();
        let push = async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            pusher.emit(AuthEvent::SignedIn(session_for(EMAIL, true)));
            std::future::pending::<()>().await;
        };
        let outcome = tokio::select! {
            outcome = watcher.run_until(never()) => outcome,
            () = push => unreachable!(),
        };

        assert_eq!(outcome, WatchOutcome::Verified);
        // Only the immediate first poll ran.
        assert_eq!(provider.session_calls(), 1);
        assert_eq!(marker.pending_email().unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn unrelated_sign_in_is_ignored() {
        let provider = FakeAuthProvider::default();
        let marker = pending_marker();
        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();

        assert!(!watcher.observe(&AuthEvent::SignedIn(session_for("other@example.com", true))));
        assert!(!watcher.observe(&AuthEvent::SignedIn(session_for(EMAIL, false))));
        assert!(!watcher.observe(&AuthEvent::SignedOut));
        assert!(marker.pending_email().unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn both_paths_together_clear_once_without_error() {
        let provider = FakeAuthProvider::with_session(session_for(EMAIL, true));
        let marker = pending_marker();
        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();

        assert!(watcher.poll_once().await);
        watcher.observe(&AuthEvent::SignedIn(session_for(EMAIL, true)));
        watcher.mark_verified();

        assert!(watcher.dialog().is_verified());
        assert_eq!(marker.pending_email().unwrap(), None);
        assert_eq!(watcher.run_until(never()).await, WatchOutcome::Verified);
    }

    #[tokio::test(start_paused = true)]
    async fn no_marker_means_nothing_to_watch() {
        let provider = FakeAuthProvider::with_session(session_for(EMAIL, true));
        let marker = MemoryMarkerStore::default();
        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();

        assert!(!watcher.dialog().should_show(false));
        assert_eq!(watcher.run_until(never()).await, WatchOutcome::NothingPending);
        assert_eq!(provider.session_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_polling() {
        let provider = FakeAuthProvider::default();
        let marker = pending_marker();
        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();

        let outcome = watcher
            .run_until(tokio::time::sleep(Duration::from_secs(25)))
            .await;
        assert_eq!(outcome, WatchOutcome::Cancelled);
        // Immediate poll plus ticks at 10s and 20s.
        assert_eq!(provider.session_calls(), 3);
        assert!(marker.pending_email().unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn dismissing_keeps_marker() {
        let provider = FakeAuthProvider::default();
        let marker = pending_marker();
        let mut watcher = VerificationWatcher::new(&provider, &marker).unwrap();

        watcher.dialog_mut().dismiss();
        assert!(!watcher.dialog().should_show(false));
        assert_eq!(marker.pending_email().unwrap().as_deref(), Some(EMAIL));
    }
}
