//! Small helpers shared by the config, auth and store modules.

use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

const API_ERROR_MAX_CHARS: usize = 180;

/// Trimmed text, or `None` when absent or blank.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

/// Absolute `http`/`https` URL with a host.
pub fn is_http_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
    })
}

pub fn unix_timestamp_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// GoTrue and PostgREST disagree on where the message lives.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ApiErrorBody {
    fn into_message(self) -> Option<String> {
        [self.message, self.msg, self.error_description, self.error]
            .into_iter()
            .flatten()
            .map(|message| message.trim().to_string())
            .find(|message| !message.is_empty())
    }
}

/// Render a failed response as `"<message> (<status>)"`.
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    let code = status.as_u16();
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| body.trim().chars().take(API_ERROR_MAX_CHARS).collect());

    if message.is_empty() {
        format!("HTTP {code}")
    } else {
        format!("{message} ({code})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_normalizes_to_none() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some(" \t ".to_string())), None);
        assert_eq!(
            normalize_text_option(Some(" anon-key ".to_string())),
            Some("anon-key".to_string())
        );
    }

    #[test]
    fn http_urls_need_scheme_and_host() {
        assert!(is_http_url("http://localhost:54321"));
        assert!(is_http_url("https://project.supabase.co"));
        assert!(!is_http_url("ftp://project.supabase.co"));
        assert!(!is_http_url("project.supabase.co"));
        assert!(!is_http_url("https://"));
    }

    #[test]
    fn api_error_uses_first_message_field() {
        let rendered = parse_api_error(
            StatusCode::FORBIDDEN,
            r#"{"message":"new row violates row-level security policy","code":"42501"}"#,
        );
        assert_eq!(rendered, "new row violates row-level security policy (403)");

        let rendered = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#,
        );
        assert_eq!(rendered, "Email not confirmed (400)");
    }

    #[test]
    fn api_error_falls_back_to_body_then_status() {
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
        assert_eq!(
            parse_api_error(StatusCode::UNAUTHORIZED, "invalid JWT"),
            "invalid JWT (401)"
        );
    }
}
