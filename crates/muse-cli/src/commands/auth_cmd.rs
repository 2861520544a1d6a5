use std::time::Duration;

use muse_core::auth::{AuthRedirect, AuthUser, SignUpForm, SignUpOutcome};
use muse_core::session::AuthBoundary;
use muse_core::verification::{
    CallbackState, FileMarkerStore, HOME_PATH, PendingVerificationStore, VerificationCallback,
    VerificationWatcher, WatchOutcome,
};

use crate::auth::CliAuthClient;
use crate::cli::AuthCommands;
use crate::commands::common::ProfileContext;
use crate::error::CliError;

type CliAuthBoundary = AuthBoundary<CliAuthClient, FileMarkerStore>;

fn boundary(profile: &ProfileContext) -> Result<CliAuthBoundary, CliError> {
    Ok(AuthBoundary::new(
        profile.auth_client()?,
        FileMarkerStore::in_data_dir()?,
    ))
}

fn email_label(user: &AuthUser) -> &str {
    user.email.as_deref().unwrap_or("(no email)")
}

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    let profile = ProfileContext::resolve(global_profile)?;
    let boundary = boundary(&profile)?;

    match command {
        AuthCommands::Signup {
            email,
            password,
            confirm_password,
        } => {
            let form = SignUpForm {
                email,
                password,
                confirm_password,
            };
            match boundary.sign_up(&form).await? {
                SignUpOutcome::SignedIn(session) => {
                    println!("Account created. Signed in as {}", email_label(&session.user));
                }
                SignUpOutcome::ConfirmationRequired => {
                    println!(
                        "Account created. Check {} for a confirmation link.",
                        form.email.trim()
                    );
                }
            }
            println!("Run `muse auth wait-verification` to wait for the confirmation.");
            Ok(())
        }
        AuthCommands::Login { email, password } => {
            let session = boundary.sign_in(&email, &password).await?;
            println!(
                "Signed in profile '{}' as {}",
                profile.name,
                email_label(&session.user)
            );
            Ok(())
        }
        AuthCommands::Logout => {
            boundary.sign_out().await?;
            println!("Signed out profile '{}'", profile.name);
            Ok(())
        }
        AuthCommands::Status => run_status(&profile, &boundary).await,
        AuthCommands::Callback { url } => run_callback(&boundary, &url).await,
        AuthCommands::WaitVerification { timeout } => run_wait(&boundary, timeout).await,
    }
}

async fn run_status(profile: &ProfileContext, boundary: &CliAuthBoundary) -> Result<(), CliError> {
    match boundary.current_user().await? {
        Some(user) => {
            let verified = if user.is_email_confirmed() {
                "verified"
            } else {
                "unverified"
            };
            println!(
                "Profile '{}' is signed in as {} ({verified})",
                profile.name,
                email_label(&user)
            );
        }
        None => println!("Profile '{}' is not signed in.", profile.name),
    }
    if let Some(email) = boundary.marker().pending_email()? {
        println!("Pending email verification: {email}");
    }
    Ok(())
}

/// Exchange any tokens in the redirect for a session, then resolve the
/// callback state.
async fn run_callback(boundary: &CliAuthBoundary, url: &str) -> Result<(), CliError> {
    let redirect = AuthRedirect::parse(url)?;
    if !redirect.is_callback_route() {
        tracing::warn!("{} is not the auth callback route", redirect.path());
    }
    if redirect.error().is_none() && redirect.has_tokens() {
        if let Err(error) = boundary.provider().session_from_redirect(&redirect).await {
            tracing::warn!("Failed to establish session from redirect: {}", error);
        }
    }

    println!("Verifying your email...");
    let mut callback = VerificationCallback::new(boundary.provider(), boundary.marker());
    match callback.run(&redirect).await {
        CallbackState::Success => {
            println!("Email verified. You are signed in.");
            println!("Continue at {HOME_PATH}");
            Ok(())
        }
        CallbackState::Error(failure) => {
            println!("Continue at {}", failure.redirect_path());
            Err(CliError::Verification(failure.message().to_string()))
        }
        CallbackState::Verifying => Ok(()),
    }
}

async fn run_wait(boundary: &CliAuthBoundary, timeout: Option<u64>) -> Result<(), CliError> {
    let mut watcher = VerificationWatcher::new(boundary.provider(), boundary.marker())?;
    let Some(email) = watcher.dialog().pending_email().map(str::to_string) else {
        println!("No email verification is pending.");
        return Ok(());
    };
    println!("Waiting for {email} to be verified (Ctrl-C to stop)...");

    let cancel = async {
        match timeout {
            Some(seconds) => {
                tokio::select! {
                    () = tokio::time::sleep(Duration::from_secs(seconds)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };

    match watcher.run_until(cancel).await {
        WatchOutcome::Verified => println!("Email verified: {email}"),
        WatchOutcome::NothingPending => println!("No email verification is pending."),
        WatchOutcome::Cancelled => println!("Stopped waiting; {email} is still unverified."),
    }
    Ok(())
}
