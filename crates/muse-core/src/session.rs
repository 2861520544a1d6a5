//! The signed-in user as seen by the rest of the app.

use crate::auth::{
    validate_sign_up, AuthProvider, AuthResult, AuthSession, AuthUser, SignUpForm, SignUpOutcome,
};
use crate::verification::PendingVerificationStore;

/// Auth facade: validation before requests, and the pending-verification
/// marker written on sign-up.
pub struct AuthBoundary<P, M> {
    provider: P,
    marker: M,
}

impl<P: AuthProvider, M: PendingVerificationStore> AuthBoundary<P, M> {
    pub const fn new(provider: P, marker: M) -> Self {
        Self { provider, marker }
    }

    pub const fn provider(&self) -> &P {
        &self.provider
    }

    pub const fn marker(&self) -> &M {
        &self.marker
    }

    pub async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        self.provider.current_session().await
    }

    pub async fn current_user(&self) -> AuthResult<Option<AuthUser>> {
        Ok(self.current_session().await?.map(|session| session.user))
    }

    /// Validate the form, register the account and remember the email as
    /// awaiting verification.
    pub async fn sign_up(&self, form: &SignUpForm) -> AuthResult<SignUpOutcome> {
        validate_sign_up(form)?;
        let email = form.email.trim();
        let outcome = self.provider.sign_up(email, &form.password).await?;

        if let Err(error) = self.marker.set_pending_email(email) {
            tracing::warn!("Failed to record pending verification: {}", error);
        }
        match &outcome {
            SignUpOutcome::ConfirmationRequired => {
                tracing::info!("Sign-up for {} awaits email confirmation", email);
            }
            SignUpOutcome::SignedIn(_) => tracing::info!("Signed up as {}", email),
        }
        Ok(outcome)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        self.provider.sign_in(email.trim(), password).await
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.provider.sign_out().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, SignUpValidationError};
    use crate::testing::FakeAuthProvider;
    use crate::verification::MemoryMarkerStore;

    fn form(email: &str, password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn boundary() -> AuthBoundary<FakeAuthProvider, MemoryMarkerStore> {
        AuthBoundary::new(FakeAuthProvider::default(), MemoryMarkerStore::default())
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_provider() {
        let boundary = boundary();

        let short = boundary.sign_up(&form("a@example.com", "12345", "12345")).await;
        assert!(matches!(
            short,
            Err(AuthError::Validation(SignUpValidationError::PasswordTooShort))
        ));
        let mismatch = boundary.sign_up(&form("a@example.com", "123456", "654321")).await;
        assert!(matches!(
            mismatch,
            Err(AuthError::Validation(SignUpValidationError::PasswordMismatch))
        ));
        assert_eq!(boundary.provider().sign_up_calls(), 0);
        assert_eq!(boundary.marker().pending_email().unwrap(), None);
    }

    #[tokio::test]
    async fn sign_up_records_pending_email() {
        let boundary = boundary();
        boundary
            .provider()
            .set_sign_up_result(Ok(SignUpOutcome::ConfirmationRequired));

        let outcome = boundary
            .sign_up(&form(" reader@example.com ", "secret1", "secret1"))
            .await
            .unwrap();
        assert_eq!(outcome, SignUpOutcome::ConfirmationRequired);
        assert_eq!(
            boundary.marker().pending_email().unwrap().as_deref(),
            Some("reader@example.com")
        );
    }

    #[tokio::test]
    async fn failed_sign_up_leaves_no_marker() {
        let boundary = boundary();
        boundary
            .provider()
            .set_sign_up_result(Err(AuthError::Api("User already registered (422)".to_string())));

        assert!(boundary
            .sign_up(&form("reader@example.com", "secret1", "secret1"))
            .await
            .is_err());
        assert_eq!(boundary.marker().pending_email().unwrap(), None);
    }

    #[tokio::test]
    async fn current_user_follows_sign_in_and_out() {
        let boundary = boundary();
        assert!(boundary.current_user().await.unwrap().is_none());

        boundary.sign_in("reader@example.com", "secret1").await.unwrap();
        let user = boundary.current_user().await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("reader@example.com"));

        boundary.sign_out().await.unwrap();
        assert!(boundary.current_user().await.unwrap().is_none());
        assert!(boundary.provider().signed_out());
    }
}
