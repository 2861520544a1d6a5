//! GoTrue (Supabase auth) client.

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::{
    AuthError, AuthEvent, AuthProvider, AuthRedirect, AuthResult, AuthSession, AuthUser,
    SessionPersistence, SignUpOutcome,
};
use crate::config::SupabaseConfig;
use crate::util::{parse_api_error, unix_timestamp_now};

const AUTH_EVENT_CAPACITY: usize = 16;
const DEFAULT_SESSION_TTL_SECONDS: i64 = 3600;

#[derive(Clone)]
pub struct SupabaseAuthClient<S: SessionPersistence> {
    auth_url: String,
    anon_key: String,
    redirect_url: Option<String>,
    client: Client,
    store: S,
    events: broadcast::Sender<AuthEvent>,
}

impl<S: SessionPersistence> SupabaseAuthClient<S> {
    pub fn new(config: &SupabaseConfig, store: S) -> AuthResult<Self> {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            auth_url: config.auth_url(),
            anon_key: config.anon_key.clone(),
            redirect_url: config.redirect_url.clone(),
            client: Client::builder().build()?,
            store,
            events,
        })
    }

    /// Stored session, refreshed first if it has expired. A failed refresh
    /// signs the user out.
    pub async fn restore_session(&self) -> AuthResult<Option<AuthSession>> {
        let Some(stored) = self.store.load_session()? else {
            return Ok(None);
        };
        if !stored.is_expired() {
            return Ok(Some(stored));
        }

        match self.refresh_session(&stored.refresh_token).await {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(error) => {
                tracing::warn!("Stored session could not be refreshed: {}", error);
                self.forget_session()?;
                Ok(None)
            }
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let credentials = Credentials::new(email, password)?;
        let mut request = self.client.post(self.endpoint("signup"));
        if let Some(redirect_url) = &self.redirect_url {
            request = request.query(&[("redirect_to", redirect_url)]);
        }

        let Some(session) = self.send_for_session(request.json(&credentials)).await? else {
            return Ok(SignUpOutcome::ConfirmationRequired);
        };
        self.store_session(&session, AuthEvent::SignedIn(session.clone()))?;
        Ok(SignUpOutcome::SignedIn(session))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        let credentials = Credentials::new(email, password)?;
        let session = self.token_grant("password", &credentials).await?;
        self.store_session(&session, AuthEvent::SignedIn(session.clone()))?;
        tracing::info!("Signed in as {}", credentials.email);
        Ok(session)
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> AuthResult<AuthSession> {
        if refresh_token.trim().is_empty() {
            return Err(AuthError::InvalidRequest(
                "Refresh token must not be empty",
            ));
        }
        let session = self
            .token_grant("refresh_token", &RefreshGrant { refresh_token })
            .await?;
        self.store_session(&session, AuthEvent::TokenRefreshed(session.clone()))?;
        Ok(session)
    }

    /// Revoke the access token server-side, then forget the local session.
    /// An already-invalid token still counts as signed out.
    pub async fn revoke_session(&self, access_token: &str) -> AuthResult<()> {
        let response = self
            .client
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            ensure_success(response).await?;
        }
        self.forget_session()
    }

    /// The user behind an access token, including confirmation state.
    pub async fn fetch_user(&self, access_token: &str) -> AuthResult<AuthUser> {
        let response = self
            .client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        let user = ensure_success(response).await?.json::<SupabaseUser>().await?;
        Ok(user.into())
    }

    /// Establish a session from tokens carried by a verification redirect.
    pub async fn session_from_redirect(&self, redirect: &AuthRedirect) -> AuthResult<AuthSession> {
        let (access_token, _) = redirect_tokens(redirect)?;
        let user = self.fetch_user(access_token).await?;
        self.store_redirect_session(redirect, user)
    }

    /// Persist the redirect's tokens for an already-resolved `user` and
    /// announce the sign-in.
    pub fn store_redirect_session(
        &self,
        redirect: &AuthRedirect,
        user: AuthUser,
    ) -> AuthResult<AuthSession> {
        let (access_token, refresh_token) = redirect_tokens(redirect)?;
        let expires_at = redirect.expires_at().unwrap_or_else(|| {
            let ttl = redirect.expires_in().unwrap_or(DEFAULT_SESSION_TTL_SECONDS);
            unix_timestamp_now().saturating_add(ttl)
        });
        let session = AuthSession {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at,
            user,
        };

        self.store_session(&session, AuthEvent::SignedIn(session.clone()))?;
        tracing::info!("Session established from auth redirect");
        Ok(session)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.auth_url)
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: &impl Serialize,
    ) -> AuthResult<AuthSession> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", grant_type)])
            .json(body);
        self.send_for_session(request).await?.ok_or_else(|| {
            AuthError::Api(format!(
                "Token grant '{grant_type}' did not return an active session"
            ))
        })
    }

    async fn send_for_session(&self, request: RequestBuilder) -> AuthResult<Option<AuthSession>> {
        let response = request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;
        ensure_success(response)
            .await?
            .json::<SupabaseAuthResponse>()
            .await?
            .into_session()
    }

    fn store_session(&self, session: &AuthSession, event: AuthEvent) -> AuthResult<()> {
        self.store.save_session(session)?;
        self.publish(event);
        Ok(())
    }

    fn forget_session(&self) -> AuthResult<()> {
        self.store.clear_session()?;
        self.publish(AuthEvent::SignedOut);
        Ok(())
    }

    fn publish(&self, event: AuthEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

fn redirect_tokens(redirect: &AuthRedirect) -> AuthResult<(&str, &str)> {
    if let Some(error) = redirect.error() {
        return Err(AuthError::Api(error));
    }
    match (redirect.access_token(), redirect.refresh_token()) {
        (Some(access_token), Some(refresh_token)) => Ok((access_token, refresh_token)),
        _ => Err(AuthError::Api(
            "Redirect URL did not include session tokens".to_string(),
        )),
    }
}

async fn ensure_success(response: Response) -> AuthResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AuthError::Api(parse_api_error(status, &body)))
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

impl<'a> Credentials<'a> {
    fn new(email: &'a str, password: &'a str) -> AuthResult<Self> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Api("Email is required".to_string()));
        }
        if password.trim().is_empty() {
            return Err(AuthError::Api("Password is required".to_string()));
        }
        Ok(Self { email, password })
    }
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

impl<S: SessionPersistence> AuthProvider for SupabaseAuthClient<S> {
    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        Self::sign_up(self, email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<AuthSession> {
        Self::sign_in(self, email, password).await
    }

    async fn sign_out(&self) -> AuthResult<()> {
        match self.store.load_session()? {
            Some(session) => self.revoke_session(&session.access_token).await,
            None => self.forget_session(),
        }
    }

    async fn current_session(&self) -> AuthResult<Option<AuthSession>> {
        self.restore_session().await
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[derive(Debug, Deserialize)]
struct SupabaseAuthResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
    session: Option<SupabaseAuthResponseSession>,
    // Sign-up without a session returns the bare user object.
    id: Option<String>,
}

impl SupabaseAuthResponse {
    /// Tokens may sit at the top level or under `session`. A user with no
    /// tokens at all means the sign-up still needs email confirmation.
    fn into_session(self) -> AuthResult<Option<AuthSession>> {
        let bare_user = self.id.is_some();
        let nested = self.session.unwrap_or_default();
        let ttl = self.expires_in.or(nested.expires_in);

        let access_token = self.access_token.or(nested.access_token);
        let refresh_token = self.refresh_token.or(nested.refresh_token);
        let expires_at = self
            .expires_at
            .or(nested.expires_at)
            .or_else(|| ttl.map(|ttl| unix_timestamp_now().saturating_add(ttl)));
        let user = self.user.or(nested.user).map(AuthUser::from);

        match (access_token, refresh_token, expires_at, user) {
            (Some(access_token), Some(refresh_token), Some(expires_at), Some(user)) => {
                Ok(Some(AuthSession {
                    access_token,
                    refresh_token,
                    expires_at,
                    user,
                }))
            }
            (None, None, None, Some(_)) => Ok(None),
            (None, None, None, None) if bare_user => Ok(None),
            _ => Err(AuthError::Api(
                "Auth response is missing session fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SupabaseAuthResponseSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
    expires_in: Option<i64>,
    user: Option<SupabaseUser>,
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    confirmed_at: Option<DateTime<Utc>>,
}

impl From<SupabaseUser> for AuthUser {
    fn from(value: SupabaseUser) -> Self {
        Self {
            id: value.id,
            email: value.email,
            email_confirmed_at: value.email_confirmed_at.or(value.confirmed_at),
        }
    }
}
