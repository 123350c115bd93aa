//! Backend client
//!
//! `Transport` is the seam between query construction and the network:
//! it takes a path plus query string relative to the API root and returns
//! the decoded JSON body, or an [`ApiFailure`] describing what went wrong.
//! Failures are data, so callers can render them instead of aborting.
//!
//! ```text
//! FilterGroupRoot -> SampleApi (paths, query strings) -> Transport::get -> reshape
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

mod api;
mod http;

pub use api::{
    FilteredStatistics, PropertyDefinition, SampleApi, SamplePage, SampleStatistics,
};
pub use http::HttpTransport;

/// Coarse classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Unauthorized,
    /// 4xx other than 401
    Client,
    /// 5xx
    Server,
    Timeout,
    /// No status, unexpected status, or an undecodable body
    Unknown,
}

impl FailureKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => FailureKind::Unauthorized,
            400..=499 => FailureKind::Client,
            500..=599 => FailureKind::Server,
            _ => FailureKind::Unknown,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Unauthorized => "unauthorized",
            FailureKind::Client => "client error",
            FailureKind::Server => "server error",
            FailureKind::Timeout => "timeout",
            FailureKind::Unknown => "unknown error",
        };
        f.write_str(s)
    }
}

/// A failed backend request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct ApiFailure {
    pub status: Option<u16>,
    pub kind: FailureKind,
    pub detail: String,
}

impl ApiFailure {
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            kind: FailureKind::from_status(status),
            detail: detail.into(),
        }
    }

    /// Failure from a non-success response; `detail` comes from the body's
    /// `detail` field when present, else the raw body
    pub fn from_response(status: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => match map.get("detail") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => Value::Object(map).to_string(),
            },
            Ok(Value::String(s)) => s,
            _ => body.trim().to_string(),
        };
        Self::from_status(status, detail)
    }

    pub fn timeout(url: &str) -> Self {
        Self {
            status: None,
            kind: FailureKind::Timeout,
            detail: format!("Request timed out on {}", url),
        }
    }

    pub fn unknown(detail: impl Into<String>) -> Self {
        Self {
            status: None,
            kind: FailureKind::Unknown,
            detail: detail.into(),
        }
    }

    /// Message shown to the user in place of results
    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::Client | FailureKind::Unauthorized => {
                format!("Client error:\n{}", self.detail)
            }
            FailureKind::Server => "Server error occurred. Please try again later.".to_string(),
            FailureKind::Timeout | FailureKind::Unknown => {
                "An unknown error occurred.".to_string()
            }
        }
    }
}

/// Issues GET requests against the backend API root
#[async_trait]
pub trait Transport: Send + Sync {
    /// `path` is relative to the API root and may carry a query string
    async fn get(&self, path: &str) -> Result<Value, ApiFailure>;

    /// API root the paths are resolved against, ending in `/`
    fn base_address(&self) -> &str;
}
