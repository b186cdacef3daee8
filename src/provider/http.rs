//! HTTP plumbing shared by the provider adapters.
//!
//! # Responsibilities
//! - Build a `reqwest` client with a request deadline
//! - Map transport errors, status codes and decode failures onto `ProviderError`

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::provider::error::ProviderError;

const USER_AGENT: &str = concat!("balance-hammer/", env!("CARGO_PKG_VERSION"));

/// Build the client used by one adapter.
pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::unreachable(provider, format!("failed to build HTTP client: {}", e)))
}

/// Map a send error. Timeouts and connection failures both count as unreachable.
pub(crate) fn send_error(provider: &str, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::unreachable(provider, "request timed out")
    } else {
        ProviderError::unreachable(provider, err.to_string())
    }
}

/// Reject any non-2xx status. 429 is reported separately so the governor can react.
pub(crate) fn check_status(provider: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::rate_limited(provider));
    }
    if !status.is_success() {
        return Err(ProviderError::unreachable(
            provider,
            format!("error response, got status code: {}", status.as_u16()),
        ));
    }
    Ok(response)
}

/// Read the body and decode it as JSON.
pub(crate) async fn decode_json<T: DeserializeOwned>(provider: &str, response: Response) -> Result<T, ProviderError> {
    let body = response.bytes().await.map_err(|e| send_error(provider, e))?;
    serde_json::from_slice(&body).map_err(|e| ProviderError::invalid_response(provider, e.to_string()))
}
