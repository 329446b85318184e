use reqwest::StatusCode;
use reqwest::header::{HeaderMap, WWW_AUTHENTICATE};
use serde::Deserialize;

const MAX_BODY_DETAIL: usize = 512;

/// OAuth2-style error body (`{"error": .., "error_description": ..}`).
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Describe a non-success upstream response using whatever the provider
/// reported: the `WWW-Authenticate` challenge, an OAuth2 error body, or the
/// raw body text.
pub(crate) fn error_detail(status: StatusCode, headers: &HeaderMap, body: &str) -> String {
    let reported = headers
        .get(WWW_AUTHENTICATE)
        .and_then(|value| value.to_str().ok())
        .and_then(challenge_error)
        .or_else(|| json_error(body))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| truncate(trimmed))
        });

    match reported {
        Some(detail) => format!("{}: {}", status, detail),
        None => status.to_string(),
    }
}

fn json_error(body: &str) -> Option<String> {
    let parsed: ProviderErrorBody = serde_json::from_str(body).ok()?;
    join_error(parsed.error, parsed.error_description)
}

/// Pull `error` and `error_description` out of a Bearer challenge such as
/// `Bearer error="invalid_token", error_description="The token expired"`.
fn challenge_error(challenge: &str) -> Option<String> {
    let mut error = None;
    let mut description = None;
    for part in challenge.split(',') {
        let part = part.trim().trim_start_matches("Bearer").trim();
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').to_string();
        match key.trim() {
            "error" => error = Some(value),
            "error_description" => description = Some(value),
            _ => {}
        }
    }
    join_error(error, description)
}

fn join_error(error: Option<String>, description: Option<String>) -> Option<String> {
    match (error, description) {
        (Some(error), Some(description)) => Some(format!("{} ({})", error, description)),
        (Some(error), None) => Some(error),
        (None, Some(description)) => Some(description),
        (None, None) => None,
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_BODY_DETAIL {
        return body.to_string();
    }
    let mut end = MAX_BODY_DETAIL;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
