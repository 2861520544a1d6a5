//! Sign-up form checks that run before any request is issued.

use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SignUpValidationError {
    #[error("Email is required")]
    EmailRequired,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,
}

#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Validate the form; the mismatch check runs before the length check.
pub fn validate_sign_up(form: &SignUpForm) -> Result<(), SignUpValidationError> {
    if form.email.trim().is_empty() {
        return Err(SignUpValidationError::EmailRequired);
    }
    if form.password != form.confirm_password {
        return Err(SignUpValidationError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(SignUpValidationError::PasswordTooShort);
    }
    Ok(())
}
