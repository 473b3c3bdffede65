//! Maps HTTP statuses and reqwest failures onto `BackendError`.

use std::error::Error as StdError;
use std::io;

use koi_core::errors::{BackendError, TransientCause};
use reqwest::StatusCode;

/// Longest response excerpt carried in an error detail.
const MAX_DETAIL_CHARS: usize = 256;

/// `None` for 2xx. Otherwise the transient/permanent error for this status.
pub fn from_status(dependency: &str, status: StatusCode, body: &str) -> Option<BackendError> {
    if status.is_success() {
        return None;
    }
    Some(BackendError::from_status(
        dependency,
        status.as_u16(),
        excerpt(body),
    ))
}

/// Classify a failed send or body read.
pub fn from_request_error(dependency: &str, err: &reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return transient(dependency, TransientCause::Timeout, err);
    }
    if err.is_builder() || err.is_decode() || err.is_redirect() {
        return BackendError::Permanent {
            dependency: dependency.to_string(),
            status: err.status().map(|s| s.as_u16()),
            detail: err.to_string(),
        };
    }
    if err.is_connect() {
        return transient(dependency, connect_cause(err), err);
    }
    if let Some(status) = err.status() {
        return BackendError::from_status(dependency, status.as_u16(), err.to_string());
    }
    let cause = match io_kind(err) {
        Some(io::ErrorKind::ConnectionReset) | Some(io::ErrorKind::BrokenPipe) => {
            TransientCause::ConnectionReset
        }
        _ => TransientCause::Network,
    };
    transient(dependency, cause, err)
}

/// A 2xx body that does not have the expected shape. Retrying will not fix it.
pub fn decode_error(dependency: &str, err: &serde_json::Error) -> BackendError {
    BackendError::Permanent {
        dependency: dependency.to_string(),
        status: None,
        detail: format!("undecodable response: {err}"),
    }
}

fn connect_cause(err: &reqwest::Error) -> TransientCause {
    match io_kind(err) {
        Some(io::ErrorKind::ConnectionReset) => TransientCause::ConnectionReset,
        Some(io::ErrorKind::TimedOut) => TransientCause::Timeout,
        _ if mentions_dns(err) => TransientCause::DnsFailure,
        _ => TransientCause::ConnectionRefused,
    }
}

fn transient(dependency: &str, cause: TransientCause, err: &reqwest::Error) -> BackendError {
    BackendError::Transient {
        dependency: dependency.to_string(),
        cause,
        detail: err.to_string(),
    }
}

/// First `io::Error` kind found along the source chain.
fn io_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        current = e.source();
    }
    None
}

fn mentions_dns(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_lowercase();
        if message.contains("dns error") || message.contains("failed to lookup address") {
            return true;
        }
        current = e.source();
    }
    false
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_DETAIL_CHARS {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(MAX_DETAIL_CHARS).collect();
    out.push_str("...");
    out
}
