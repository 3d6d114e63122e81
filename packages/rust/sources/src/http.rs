//! HTTP client construction and response helpers shared by the adapters.

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use subjekt_shared::{Result, SubjektError};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User-Agent for the registry-facing clients.
pub(crate) const USER_AGENT: &str = concat!("subjekt/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the given identification and default headers.
///
/// Time limits are applied per call by the adapters, not by the client.
pub(crate) fn build_client(user_agent: &str, headers: HeaderMap) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| SubjektError::Network(format!("failed to build HTTP client: {e}")))
}

/// Send `request` and return the body of a success response.
///
/// Non-success statuses become [`SubjektError::UpstreamStatus`].
pub(crate) async fn send_for_text(request: RequestBuilder, url: &str) -> Result<String> {
    let response = request
        .send()
        .await
        .map_err(|e| SubjektError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    debug!(%url, status = status.as_u16(), "upstream responded");
    if !status.is_success() {
        return Err(SubjektError::UpstreamStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| SubjektError::Network(format!("{url}: body read failed: {e}")))
}
