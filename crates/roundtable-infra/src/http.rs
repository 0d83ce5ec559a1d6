//! Shared HTTP plumbing for provider clients.
//!
//! Every provider maps failures onto the same three-way [`ProviderError`]
//! taxonomy: rejected credentials are `Auth`, any other non-2xx answer is
//! `Provider` with the vendor's own message, and anything that never produced
//! an answer is `Transport`.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use roundtable_types::error::ProviderError;

/// Upper bound for one generation call.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Upper bound for one speech-synthesis call.
pub const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a pooled client with a whole-request timeout.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| ProviderError::Transport(format!("failed to create HTTP client: {e}")))
}

/// Send `request`, turning connection failures and error statuses into
/// [`ProviderError`]s prefixed with `vendor`.
pub(crate) async fn send(
    vendor: &str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(vendor, &e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(vendor, status, &body));
    }
    Ok(response)
}

/// Decode a successful JSON body.
///
/// Some providers answer 200 with an `error` object; that is still a
/// provider failure.
pub(crate) async fn read_json<T: DeserializeOwned>(
    vendor: &str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(vendor, &e))?;
    parse_body(vendor, &body)
}

/// Read a successful binary body.
pub(crate) async fn read_bytes(
    vendor: &str,
    response: reqwest::Response,
) -> Result<Vec<u8>, ProviderError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(vendor, &e))?;
    Ok(bytes.to_vec())
}

pub(crate) fn parse_body<T: DeserializeOwned>(vendor: &str, body: &str) -> Result<T, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::Provider(format!("{vendor}: malformed response: {e}")))?;

    if value.get("error").is_some() {
        let detail = extract_error_message(body).unwrap_or_else(|| "unknown error".to_string());
        return Err(ProviderError::Provider(format!("{vendor}: {detail}")));
    }

    serde_json::from_value(value)
        .map_err(|e| ProviderError::Provider(format!("{vendor}: malformed response: {e}")))
}

pub(crate) fn transport_error(vendor: &str, err: &reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Transport(format!("{vendor}: request timed out"))
    } else {
        ProviderError::Transport(format!("{vendor}: {err}"))
    }
}

pub(crate) fn status_error(vendor: &str, status: StatusCode, body: &str) -> ProviderError {
    let detail = extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    let message = format!("{vendor}: {detail}");
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
        _ => ProviderError::Provider(message),
    }
}

/// Pull a human-readable message out of a vendor error body.
///
/// Understands `{"error": {"message": ..}}` (OpenAI, Anthropic, Gemini),
/// `{"detail": {"message": ..}}` and `{"detail": ".."}` (ElevenLabs), and a
/// bare `{"error": ".."}`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    [
        value.pointer("/error/message"),
        value.pointer("/detail/message"),
        value.get("detail"),
        value.get("error"),
    ]
    .into_iter()
    .flatten()
    .filter_map(|v| v.as_str())
    .map(str::trim)
    .find(|s| !s.is_empty())
    .map(str::to_string)
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
