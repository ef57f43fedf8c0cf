//! Checker status records accepted by `push`.
//!
//! The checkers that produce these records live elsewhere; the client only
//! needs their subject, checker type, optional expiration date and a JSON
//! form. Each kind shares a common [`StatusBase`] and adds its own fields.

use crate::error::CollectionError;
use serde::{Deserialize, Serialize};

/// Fields every status record carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusBase {
    /// The domain, IP or URL that was checked
    pub subject: String,

    /// IDNA form of the subject
    #[serde(default)]
    pub idna_subject: String,

    /// Checker type tag as reported by the checker (e.g. "AVAILABILITY")
    pub checker_type: String,

    /// Final status (e.g. "ACTIVE", "INACTIVE", "VALID", "MALICIOUS")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Which test produced the status (e.g. "DNSLOOKUP", "WHOIS", "SYNTAX")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_source: Option<String>,

    /// When the subject was tested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_at: Option<String>,
}

impl StatusBase {
    pub fn new<S: Into<String>, C: Into<String>>(subject: S, checker_type: C) -> Self {
        let subject = subject.into();
        Self {
            idna_subject: subject.clone(),
            subject,
            checker_type: checker_type.into(),
            ..Default::default()
        }
    }
}

/// Syntax flags shared by the syntax and reputation checkers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_syntax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_level_domain_syntax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain_syntax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_syntax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_syntax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_syntax: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_syntax: Option<bool>,
}

/// Result of a syntax check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyntaxStatus {
    #[serde(flatten)]
    pub base: StatusBase,

    #[serde(flatten)]
    pub syntax: SyntaxFlags,
}

/// Result of a reputation check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReputationStatus {
    #[serde(flatten)]
    pub base: StatusBase,

    #[serde(flatten)]
    pub syntax: SyntaxFlags,
}

/// Result of an availability check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityStatus {
    #[serde(flatten)]
    pub base: StatusBase,

    #[serde(flatten)]
    pub syntax: SyntaxFlags,

    /// Expiration date extracted from the WHOIS record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// Registrar extracted from the WHOIS record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrar: Option<String>,

    /// HTTP status code seen while checking the subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status_code: Option<u16>,

    /// Addresses the DNS lookup resolved to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_lookup: Vec<String>,
}

/// A status record from one of the three supported checkers.
///
/// Serialized with an internal `kind` tag so a file of mixed records can be
/// read back into the right variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CheckerStatus {
    Syntax(SyntaxStatus),
    Reputation(ReputationStatus),
    Availability(AvailabilityStatus),
}

impl CheckerStatus {
    fn base(&self) -> &StatusBase {
        match self {
            CheckerStatus::Syntax(status) => &status.base,
            CheckerStatus::Reputation(status) => &status.base,
            CheckerStatus::Availability(status) => &status.base,
        }
    }

    pub fn subject(&self) -> &str {
        &self.base().subject
    }

    /// Checker type tag exactly as carried by the record.
    pub fn checker_type(&self) -> &str {
        &self.base().checker_type
    }

    /// Expiration date, if the record carries a non-empty one.
    pub fn expiration_date(&self) -> Option<&str> {
        match self {
            CheckerStatus::Availability(status) => status
                .expiration_date
                .as_deref()
                .filter(|date| !date.is_empty()),
            _ => None,
        }
    }

    /// JSON form of the record as submitted to the collection.
    ///
    /// The `kind` tag is local bookkeeping and is left out.
    pub fn to_json(&self) -> Result<serde_json::Value, CollectionError> {
        let value = match self {
            CheckerStatus::Syntax(status) => serde_json::to_value(status)?,
            CheckerStatus::Reputation(status) => serde_json::to_value(status)?,
            CheckerStatus::Availability(status) => serde_json::to_value(status)?,
        };
        Ok(value)
    }
}

impl From<SyntaxStatus> for CheckerStatus {
    fn from(status: SyntaxStatus) -> Self {
        CheckerStatus::Syntax(status)
    }
}

impl From<ReputationStatus> for CheckerStatus {
    fn from(status: ReputationStatus) -> Self {
        CheckerStatus::Reputation(status)
    }
}

impl From<AvailabilityStatus> for CheckerStatus {
    fn from(status: AvailabilityStatus) -> Self {
        CheckerStatus::Availability(status)
    }
}
