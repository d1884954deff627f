//! Temporary token retrieval for socket authentication.
//!
//! The streaming socket authenticates with a short-lived token passed as a
//! query parameter, so the long-lived API key never appears in the URL.

use crate::error::{Result, ScribeError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Fetch a one-time temporary token from the transcription service.
///
/// # Errors
///
/// Returns an error on network failure, a non-success status, or an
/// unexpected response body.
pub async fn fetch_stream_token(
    endpoint: &str,
    api_key: &str,
    expires_in_seconds: u32,
) -> Result<String> {
    let client = reqwest::Client::new();
    let response = client
        .get(endpoint)
        .query(&[("expires_in_seconds", expires_in_seconds)])
        .header("Authorization", api_key)
        .send()
        .await
        .map_err(|e| ScribeError::TokenRequest {
            message: format!("request failed: {e}"),
        })?;

    if !response.status().is_success() {
        return Err(ScribeError::TokenRequest {
            message: format!("token endpoint returned status {}", response.status()),
        });
    }

    let body: TokenResponse = response.json().await.map_err(|e| ScribeError::TokenRequest {
        message: format!("invalid token response: {e}"),
    })?;

    Ok(body.token)
}
