//! HTTP plumbing shared by the Google collaborators.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{ProviderError, ProviderResult};

/// Builds a client with the given timeout and user agent.
pub(crate) fn build_client(
    provider: &'static str,
    timeout: Duration,
    user_agent: &str,
) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| {
            ProviderError::configuration(format!("failed to create HTTP client: {}", e))
                .with_provider(provider)
        })
}

/// Sends a request, mapping transport failures and non-success statuses.
pub(crate) async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    what: &str,
) -> ProviderResult<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        let message = if e.is_timeout() {
            format!("{}: request timeout", what)
        } else if e.is_connect() {
            format!("{}: connection failed: {}", what, e)
        } else {
            format!("{}: request failed: {}", what, e)
        };
        ProviderError::network(message)
            .with_provider(provider)
            .with_source(e)
    })?;

    let status = response.status();
    trace!(status = status.as_u16(), what, provider, "google response");
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::from_status(status.as_u16(), &body).with_provider(provider));
    }
    Ok(response)
}

/// Decodes a JSON body.
pub(crate) async fn json<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
    what: &str,
) -> ProviderResult<T> {
    let body = response.text().await.map_err(|e| {
        ProviderError::network(format!("{}: failed to read body: {}", what, e))
            .with_provider(provider)
            .with_source(e)
    })?;
    serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid_response(format!("{}: failed to parse response: {}", what, e))
            .with_provider(provider)
            .with_source(e)
    })
}
