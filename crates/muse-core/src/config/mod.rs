//! Client configuration for the Supabase project backing Muse.
//!
//! The URL and anon key are safe-to-ship public values. Secret credentials
//! (service-role keys) must never be stored here.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Environment variable holding the Supabase project URL.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
/// Environment variable holding the Supabase anon/public key.
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
/// Environment variable holding the email verification redirect URL.
pub const REDIRECT_URL_ENV: &str = "MUSE_REDIRECT_URL";

/// Path the auth provider redirects to after email verification.
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

/// Resolved Supabase project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project base URL without trailing slash
    pub url: String,
    /// Anon/public API key
    pub anon_key: String,
    /// Where verification emails send the browser back to
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl SupabaseConfig {
    /// Validate and normalize a config from raw parts.
    pub fn new(
        url: impl Into<String>,
        anon_key: impl Into<String>,
        redirect_url: Option<String>,
    ) -> Result<Self> {
        let url = normalize_required_http_url(url.into(), "Supabase URL")?;
        let anon_key = normalize_text_option(Some(anon_key.into()))
            .ok_or_else(|| Error::Config("Supabase anon key must not be empty".to_string()))?;
        let redirect_url = match normalize_text_option(redirect_url) {
            Some(redirect) => Some(normalize_required_http_url(redirect, "Redirect URL")?),
            None => None,
        };

        Ok(Self {
            url,
            anon_key,
            redirect_url,
        })
    }

    /// Resolve an optional config: both values missing means "not configured",
    /// exactly one missing is an error.
    pub fn resolve_optional(
        url: Option<String>,
        anon_key: Option<String>,
        redirect_url: Option<String>,
    ) -> Result<Option<Self>> {
        match (normalize_text_option(url), normalize_text_option(anon_key)) {
            (None, None) => Ok(None),
            (Some(url), Some(anon_key)) => Self::new(url, anon_key, redirect_url).map(Some),
            (Some(_), None) => Err(Error::Config(format!(
                "{SUPABASE_ANON_KEY_ENV} is required when {SUPABASE_URL_ENV} is set"
            ))),
            (None, Some(_)) => Err(Error::Config(format!(
                "{SUPABASE_URL_ENV} is required when {SUPABASE_ANON_KEY_ENV} is set"
            ))),
        }
    }

    /// Read the config from process environment variables.
    pub fn from_env() -> Result<Option<Self>> {
        Self::resolve_optional(
            std::env::var(SUPABASE_URL_ENV).ok(),
            std::env::var(SUPABASE_ANON_KEY_ENV).ok(),
            std::env::var(REDIRECT_URL_ENV).ok(),
        )
    }

    /// GoTrue base URL
    #[must_use]
    pub fn auth_url(&self) -> String {
        format!("{}/auth/v1", self.url)
    }

    /// PostgREST base URL
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}

fn normalize_required_http_url(raw: String, field: &str) -> Result<String> {
    let value = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Config(format!("{field} must not be empty")))?;
    if !is_http_url(&value) {
        return Err(Error::Config(format!(
            "{field} must include http:// or https://"
        )));
    }
    let value = value.trim_end_matches('/');
    let value = value.strip_suffix("/auth/v1").unwrap_or(value);
    Ok(value.to_string())
}
