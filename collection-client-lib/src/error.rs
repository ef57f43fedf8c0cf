//! Error handling for collection client operations.
//!
//! Only input errors ever reach the caller of `pull`/`push`. Network and
//! parsing failures are still classified here so the transport layer can log
//! them before turning them into an absent result.

use std::fmt;

/// Main error type for collection client operations.
#[derive(Debug, Clone)]
pub enum CollectionError {
    /// A value had the wrong kind (e.g. a timeout that is not a number)
    TypeMismatch {
        field: String,
        expected: String,
        given: String,
    },

    /// A value had the right kind but is outside the accepted domain
    InvalidValue {
        field: String,
        reason: String,
    },

    /// Configuration errors (invalid file contents, bad settings)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading configuration or status files
    FileError {
        path: String,
        message: String,
    },

    /// Network-related errors (connection, timeout, non-success status)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// JSON parsing errors for API responses
    ParseError {
        message: String,
    },
}

impl CollectionError {
    /// Create a new type mismatch error.
    pub fn type_mismatch<F: Into<String>, E: Into<String>, G: Into<String>>(
        field: F,
        expected: E,
        given: G,
    ) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected: expected.into(),
            given: given.into(),
        }
    }

    /// Create a new invalid value error.
    pub fn invalid_value<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Whether this error comes from misuse of the API rather than from the
    /// remote service being unavailable.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. } | Self::InvalidValue { .. })
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch {
                field,
                expected,
                given,
            } => {
                write!(f, "<{}> should be {}, {} given", field, expected, given)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid <{}>: {}", field, reason)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ParseError { message } => {
                write!(f, "Parse error: {}", message)
            }
        }
    }
}

impl std::error::Error for CollectionError {}

impl From<reqwest::Error> for CollectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timed out", err.to_string())
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if err.is_decode() {
            Self::ParseError {
                message: format!("Response body could not be decoded: {}", err),
            }
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        assert!(CollectionError::invalid_value("url_base", "missing scheme").is_input_error());
        assert!(CollectionError::type_mismatch("timeout", "a number", "NaN").is_input_error());
        assert!(!CollectionError::network("connection refused").is_input_error());
        assert!(!CollectionError::config("bad file").is_input_error());
    }

    #[test]
    fn test_display_messages() {
        let err = CollectionError::type_mismatch("timeout", "a number", "\"abc\"");
        assert_eq!(err.to_string(), "<timeout> should be a number, \"abc\" given");

        let err = CollectionError::network_with_source("Connection failed", "refused");
        assert_eq!(
            err.to_string(),
            "Network error: Connection failed (source: refused)"
        );
    }
}
