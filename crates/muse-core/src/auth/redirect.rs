//! Parsing of the URL the auth provider redirects back to.

use std::collections::HashMap;

use url::Url;

use crate::config::AUTH_CALLBACK_PATH;
use crate::error::{Error, Result};

/// Parameters carried by an auth redirect, merged from query and fragment.
///
/// GoTrue puts tokens in the fragment (`#access_token=...`) and failures in
/// either place (`?error=...&error_description=...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRedirect {
    path: String,
    params: HashMap<String, String>,
}

impl AuthRedirect {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|error| Error::InvalidInput(format!("Invalid redirect URL: {error}")))?;

        let mut params = HashMap::new();
        for (key, value) in url.query_pairs() {
            params.insert(key.into_owned(), value.into_owned());
        }
        if let Some(fragment) = url.fragment() {
            for (key, value) in url::form_urlencoded::parse(fragment.as_bytes()) {
                params.insert(key.into_owned(), value.into_owned());
            }
        }

        Ok(Self {
            path: url.path().to_string(),
            params,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn is_callback_route(&self) -> bool {
        self.path.trim_end_matches('/') == AUTH_CALLBACK_PATH
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Explicit failure reported by the provider, preferring the description.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.param("error_description")
            .or_else(|| self.param("error"))
            .or_else(|| self.param("error_code"))
            .map(ToString::to_string)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.param("access_token")
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.param("refresh_token")
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.param("expires_at").and_then(|value| value.parse().ok())
    }

    #[must_use]
    pub fn expires_in(&self) -> Option<i64> {
        self.param("expires_in").and_then(|value| value.parse().ok())
    }

    /// Redirect type reported by GoTrue (`signup`, `recovery`, ...)
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.param("type")
    }

    #[must_use]
    pub fn has_tokens(&self) -> bool {
        self.access_token().is_some() && self.refresh_token().is_some()
    }
}
