//! API generation detection.
//!
//! Anonymous clients can only reach the modern hub, so they skip the network
//! entirely. With a token, a successful GET on the legacy statistics endpoint
//! means the service is legacy; any failure at all means modern.

use crate::api::endpoints::PROBE_PATH;
use crate::types::{ApiGeneration, ClientConfig};
use reqwest::{Client, Response};

/// Detect which API generation the configured service speaks.
///
/// Never fails: every transport or status error resolves to
/// [`ApiGeneration::Modern`].
pub async fn detect_api_generation(session: &Client, config: &ClientConfig) -> ApiGeneration {
    if !config.has_token() {
        tracing::debug!("No token configured, assuming the modern API");
        return ApiGeneration::Modern;
    }

    let url = format!("{}{}", config.url_base(), PROBE_PATH);
    let result = session
        .get(&url)
        .timeout(config.timeout_duration())
        .send()
        .await
        .and_then(Response::error_for_status);

    match result {
        Ok(_) => {
            tracing::debug!(url = %url, "Legacy statistics endpoint answered");
            ApiGeneration::Legacy
        }
        Err(e) => {
            tracing::debug!(
                url = %url,
                error = %e,
                "Legacy statistics endpoint failed, assuming the modern API"
            );
            ApiGeneration::Modern
        }
    }
}
