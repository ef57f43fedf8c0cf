//! Core data types for talking to the collection API.
//!
//! This module defines the validated client configuration together with the
//! small enumerations that drive endpoint selection.

use crate::error::CollectionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// URL base used when nothing else is configured.
pub const STD_URL_BASE: &str = "http://localhost:8001";

/// Timeout (in seconds) used when nothing else is configured.
pub const STD_TIMEOUT: f64 = 5.0;

/// Which generation of the collection API the client is talking to.
///
/// A client starts in `Unknown` and moves to one of the concrete values the
/// first time a network call needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiGeneration {
    /// Not detected yet
    #[default]
    Unknown,

    /// The first protocol, with per-checker status paths
    Legacy,

    /// The newer protocol split between contracts and the anonymous hub
    Modern,
}

impl ApiGeneration {
    /// Whether detection already produced a concrete value.
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for ApiGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiGeneration::Unknown => write!(f, "unknown"),
            ApiGeneration::Legacy => write!(f, "legacy"),
            ApiGeneration::Modern => write!(f, "modern"),
        }
    }
}

/// Kind of checker that produced a status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckerType {
    Syntax,
    Reputation,
    Availability,
}

impl CheckerType {
    /// All checker types the collection API accepts.
    pub const SUPPORTED: [CheckerType; 3] = [
        CheckerType::Syntax,
        CheckerType::Reputation,
        CheckerType::Availability,
    ];

    /// Route key used in status paths.
    pub fn as_str(self) -> &'static str {
        match self {
            CheckerType::Syntax => "syntax",
            CheckerType::Reputation => "reputation",
            CheckerType::Availability => "availability",
        }
    }
}

impl FromStr for CheckerType {
    type Err = CollectionError;

    /// Parse a checker type, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "syntax" => Ok(Self::Syntax),
            "reputation" => Ok(Self::Reputation),
            "availability" => Ok(Self::Availability),
            _ => Err(CollectionError::invalid_value(
                "checker_type",
                format!("({}) is not supported", s),
            )),
        }
    }
}

impl fmt::Display for CheckerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preferred origin of the statuses served by the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusOrigin {
    #[default]
    Frequent,
    Latest,
    Recommended,
}

impl StatusOrigin {
    /// Every accepted value, in the order they are documented.
    pub const SUPPORTED: [StatusOrigin; 3] = [
        StatusOrigin::Frequent,
        StatusOrigin::Latest,
        StatusOrigin::Recommended,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusOrigin::Frequent => "frequent",
            StatusOrigin::Latest => "latest",
            StatusOrigin::Recommended => "recommended",
        }
    }
}

impl FromStr for StatusOrigin {
    type Err = CollectionError;

    /// Parse a status origin. Matching is exact: `"Latest"` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SUPPORTED
            .into_iter()
            .find(|origin| origin.as_str() == s)
            .ok_or_else(|| {
                CollectionError::invalid_value(
                    "preferred_status_origin",
                    format!("({}) is not supported", s),
                )
            })
    }
}

impl fmt::Display for StatusOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating configuration of one collection client.
///
/// Fields are private and only ever written through validating setters, so a
/// `ClientConfig` never holds an invalid URL base or a non-numeric timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    token: String,
    url_base: String,
    preferred_status_origin: StatusOrigin,
    timeout: f64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            url_base: STD_URL_BASE.to_string(),
            preferred_status_origin: StatusOrigin::default(),
            timeout: STD_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// The bearer token. Empty means anonymous.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Whether a non-empty token is configured.
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn url_base(&self) -> &str {
        &self.url_base
    }

    pub fn preferred_status_origin(&self) -> StatusOrigin {
        self.preferred_status_origin
    }

    /// Timeout in seconds.
    pub fn timeout(&self) -> f64 {
        self.timeout
    }

    /// Timeout as a `Duration`. Negative timeouts collapse to zero, timeouts
    /// too large for a `Duration` saturate to `Duration::MAX`.
    pub fn timeout_duration(&self) -> Duration {
        if self.timeout <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.timeout).unwrap_or(Duration::MAX)
    }

    /// Set the token. An empty string switches the client to anonymous mode.
    pub fn set_token<T: Into<String>>(&mut self, value: T) {
        self.token = value.into();
    }

    /// Set the URL base.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` when the value does not start with `http` or
    /// `https`.
    pub fn set_url_base(&mut self, value: &str) -> Result<(), CollectionError> {
        self.url_base = validate_url_base(value)?;
        Ok(())
    }

    /// Set the preferred status origin from its textual form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` when the value is not one of `frequent`,
    /// `latest` or `recommended`.
    pub fn set_preferred_status_origin(&mut self, value: &str) -> Result<(), CollectionError> {
        self.preferred_status_origin = value.parse()?;
        Ok(())
    }

    /// Set the timeout in seconds.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the value is NaN or infinite.
    pub fn set_timeout(&mut self, value: f64) -> Result<(), CollectionError> {
        if !value.is_finite() {
            return Err(CollectionError::type_mismatch(
                "timeout",
                "a number",
                value.to_string(),
            ));
        }
        self.timeout = value;
        Ok(())
    }

    pub fn with_token<T: Into<String>>(mut self, value: T) -> Self {
        self.set_token(value);
        self
    }

    pub fn with_url_base(mut self, value: &str) -> Result<Self, CollectionError> {
        self.set_url_base(value)?;
        Ok(self)
    }

    pub fn with_preferred_status_origin(mut self, value: &str) -> Result<Self, CollectionError> {
        self.set_preferred_status_origin(value)?;
        Ok(self)
    }

    pub fn with_timeout(mut self, value: f64) -> Result<Self, CollectionError> {
        self.set_timeout(value)?;
        Ok(self)
    }
}

/// Validate a URL base and strip its trailing slashes.
pub fn validate_url_base(value: &str) -> Result<String, CollectionError> {
    // "https" also starts with "http".
    if !value.starts_with("http") {
        return Err(CollectionError::invalid_value(
            "url_base",
            format!("missing the scheme (http/https), {} given", value),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}

/// Parse a timeout written as text (environment, CLI, files).
///
/// # Errors
///
/// Returns `TypeMismatch` when the text is not a finite number.
pub fn parse_timeout(value: &str) -> Result<f64, CollectionError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|timeout| timeout.is_finite())
        .ok_or_else(|| CollectionError::type_mismatch("timeout", "a number", format!("{:?}", value)))
}
