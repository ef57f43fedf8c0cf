//! Endpoint selection.
//!
//! | purpose | legacy | modern, token | modern, anonymous |
//! |---|---|---|---|
//! | pull | `/v1/subject/search` | `/v1/aggregation/subject/search` | `/v1/hub/aggregation/subject/search` |
//! | status | `/v1/status/{type}` | `/v1/contracts/self-delivery` | `/v1/hub/status/{type}` |
//! | whois | `/v1/status/whois` | `/v1/status/whois` | `/v1/status/whois` |
//!
//! An `Unknown` generation routes like `Legacy`; the client always resolves
//! the generation before picking an endpoint.

use crate::types::{ApiGeneration, CheckerType};

/// Legacy-only statistics endpoint used to detect the API generation.
pub const PROBE_PATH: &str = "/v1/stats/subject";

/// Endpoint for subject lookups.
pub fn pull_endpoint(url_base: &str, generation: ApiGeneration, has_token: bool) -> String {
    match (generation, has_token) {
        (ApiGeneration::Modern, true) => format!("{}/v1/aggregation/subject/search", url_base),
        (ApiGeneration::Modern, false) => {
            format!("{}/v1/hub/aggregation/subject/search", url_base)
        }
        _ => format!("{}/v1/subject/search", url_base),
    }
}

/// Endpoint for status submissions.
pub fn status_endpoint(
    url_base: &str,
    generation: ApiGeneration,
    has_token: bool,
    checker_type: CheckerType,
) -> String {
    match (generation, has_token) {
        (ApiGeneration::Modern, true) => format!("{}/v1/contracts/self-delivery", url_base),
        (ApiGeneration::Modern, false) => format!("{}/v1/hub/status/{}", url_base, checker_type),
        _ => format!("{}/v1/status/{}", url_base, checker_type),
    }
}

/// Endpoint for WHOIS submissions, shared by every generation.
pub fn whois_endpoint(url_base: &str) -> String {
    format!("{}/v1/status/whois", url_base)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.example.test";

    #[test]
    fn test_pull_endpoints() {
        assert_eq!(
            pull_endpoint(BASE, ApiGeneration::Modern, true),
            "https://api.example.test/v1/aggregation/subject/search"
        );
        assert_eq!(
            pull_endpoint(BASE, ApiGeneration::Modern, false),
            "https://api.example.test/v1/hub/aggregation/subject/search"
        );
        assert_eq!(
            pull_endpoint(BASE, ApiGeneration::Legacy, true),
            "https://api.example.test/v1/subject/search"
        );
        assert_eq!(
            pull_endpoint(BASE, ApiGeneration::Legacy, false),
            "https://api.example.test/v1/subject/search"
        );
    }

    #[test]
    fn test_status_endpoints() {
        for checker_type in CheckerType::SUPPORTED {
            assert_eq!(
                status_endpoint(BASE, ApiGeneration::Modern, true, checker_type),
                "https://api.example.test/v1/contracts/self-delivery"
            );
            assert_eq!(
                status_endpoint(BASE, ApiGeneration::Modern, false, checker_type),
                format!("https://api.example.test/v1/hub/status/{}", checker_type)
            );
            assert_eq!(
                status_endpoint(BASE, ApiGeneration::Legacy, true, checker_type),
                format!("https://api.example.test/v1/status/{}", checker_type)
            );
        }
    }

    #[test]
    fn test_whois_endpoint() {
        assert_eq!(whois_endpoint(BASE), "https://api.example.test/v1/status/whois");
    }
}
