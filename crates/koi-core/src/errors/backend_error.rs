use std::fmt;

use serde::{Deserialize, Serialize};

/// Postgres SQLSTATE codes that mean the database is restarting or briefly
/// unreachable rather than rejecting the query.
const TRANSIENT_DB_CODES: &[&str] = &[
    "57P01", // admin_shutdown
    "57P02", // crash_shutdown
    "57P03", // cannot_connect_now
    "08006", // connection_failure
    "08001", // sqlclient_unable_to_establish_sqlconnection
    "08004", // sqlserver_rejected_establishment_of_sqlconnection
];

/// What made a backend call fail transiently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientCause {
    ConnectionRefused,
    ConnectionReset,
    Timeout,
    DnsFailure,
    /// Retriable HTTP status (5xx except 501, 408, 429).
    Status(u16),
    DatabaseShutdown,
    /// Any other request-level network failure.
    Network,
}

impl fmt::Display for TransientCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionRefused => f.write_str("connection refused"),
            Self::ConnectionReset => f.write_str("connection reset"),
            Self::Timeout => f.write_str("timeout"),
            Self::DnsFailure => f.write_str("dns failure"),
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::DatabaseShutdown => f.write_str("database shutdown"),
            Self::Network => f.write_str("network error"),
        }
    }
}

/// Errors reported by an external backend (graph, vector, similarity).
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{dependency} transient failure ({cause}): {detail}")]
    Transient {
        dependency: String,
        cause: TransientCause,
        detail: String,
    },

    #[error("{dependency} rejected request (status {status:?}): {detail}")]
    Permanent {
        dependency: String,
        status: Option<u16>,
        detail: String,
    },
}

impl BackendError {
    /// Build the right variant for a non-success HTTP status.
    pub fn from_status(dependency: &str, status: u16, detail: impl Into<String>) -> Self {
        if is_retriable_status(status) {
            Self::Transient {
                dependency: dependency.to_string(),
                cause: TransientCause::Status(status),
                detail: detail.into(),
            }
        } else {
            Self::Permanent {
                dependency: dependency.to_string(),
                status: Some(status),
                detail: detail.into(),
            }
        }
    }

    /// Build the right variant for a database SQLSTATE code.
    pub fn from_db_code(dependency: &str, code: &str, detail: impl Into<String>) -> Self {
        if is_transient_db_code(code) {
            Self::Transient {
                dependency: dependency.to_string(),
                cause: TransientCause::DatabaseShutdown,
                detail: detail.into(),
            }
        } else {
            Self::Permanent {
                dependency: dependency.to_string(),
                status: None,
                detail: format!("sqlstate {code}: {}", detail.into()),
            }
        }
    }

    pub fn dependency(&self) -> &str {
        match self {
            Self::Transient { dependency, .. } | Self::Permanent { dependency, .. } => dependency,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

/// 5xx (except 501 Not Implemented), 429 Too Many Requests and 408 Request Timeout.
pub fn is_retriable_status(status: u16) -> bool {
    match status {
        501 => false,
        500..=599 => true,
        408 | 429 => true,
        _ => false,
    }
}

pub fn is_transient_db_code(code: &str) -> bool {
    TRANSIENT_DB_CODES.contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retriable_statuses() {
        for status in [500, 502, 503, 504, 599, 408, 429] {
            assert!(is_retriable_status(status), "{status} should be retriable");
        }
        for status in [200, 400, 401, 403, 404, 422, 501] {
            assert!(!is_retriable_status(status), "{status} should not be retriable");
        }
    }

    #[test]
    fn status_maps_to_variant() {
        assert!(BackendError::from_status("graph-api", 503, "busy").is_transient());
        assert!(!BackendError::from_status("graph-api", 501, "nope").is_transient());
        assert!(!BackendError::from_status("graph-api", 400, "bad cypher").is_transient());
    }

    #[test]
    fn db_shutdown_codes_are_transient() {
        assert!(BackendError::from_db_code("database", "57P01", "terminating").is_transient());
        assert!(!BackendError::from_db_code("database", "42601", "syntax error").is_transient());
    }
}
