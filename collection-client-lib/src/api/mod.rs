//! Collection API plumbing.
//!
//! This module contains the pieces the client composes: the HTTP session,
//! endpoint selection per API generation and the generation probe.

/// Shared HTTP session and the soft-failure request helpers
pub mod session;

/// Endpoint paths per API generation
pub mod endpoints;

/// Detection of the API generation
pub mod probe;

pub use endpoints::{pull_endpoint, status_endpoint, whois_endpoint, PROBE_PATH};
pub use probe::detect_api_generation;
pub use session::{build_session, post_json, VERSION_HEADER};
