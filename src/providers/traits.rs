use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::Url;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::bundle::Bundle;
use crate::humanize::{self, ByteSize};
use crate::link::RewriteRule;

/// Longest response body snippet shown in error messages
const BODY_SNIPPET_CHARS: usize = 200;

/// Coarse classification of an upload failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never completed (DNS, refused connection, transport timeout)
    Transport,
    /// A response arrived with a failing status code
    HttpStatus,
    /// The response body did not have the expected shape
    MalformedResponse,
    /// The provider answered well-formed but reported failure
    Provider,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Transport => "transport",
            FailureKind::HttpStatus => "http-status",
            FailureKind::MalformedResponse => "malformed-response",
            FailureKind::Provider => "provider",
        };
        f.write_str(label)
    }
}

/// Upload errors, one variant per [`FailureKind`]
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{provider}: request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider}: HTTP {status}: {}", snippet(.body))]
    HttpStatus {
        provider: &'static str,
        status: u16,
        /// Full raw response body, kept for diagnostics
        body: String,
    },

    #[error("{provider}: unexpected response ({reason}): {}", snippet(.body))]
    MalformedResponse {
        provider: &'static str,
        reason: String,
        body: String,
    },

    #[error("{provider}: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
}

impl UploadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            UploadError::Transport { .. } => FailureKind::Transport,
            UploadError::HttpStatus { .. } => FailureKind::HttpStatus,
            UploadError::MalformedResponse { .. } => FailureKind::MalformedResponse,
            UploadError::Provider { .. } => FailureKind::Provider,
        }
    }

    pub fn provider(&self) -> &'static str {
        match self {
            UploadError::Transport { provider, .. }
            | UploadError::HttpStatus { provider, .. }
            | UploadError::MalformedResponse { provider, .. }
            | UploadError::Provider { provider, .. } => provider,
        }
    }

    /// Raw response body, when a response was received
    pub fn body(&self) -> Option<&str> {
        match self {
            UploadError::HttpStatus { body, .. } | UploadError::MalformedResponse { body, .. } => {
                Some(body)
            }
            _ => None,
        }
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "<empty body>".to_string();
    }
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Link returned by a provider, before any rewriting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub url: String,
}

/// How long a provider keeps an upload, and how to tell the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retention {
    pub window: Duration,
    pub notice: String,
}

impl Retention {
    pub fn new(window: Duration, notice: impl Into<String>) -> Self {
        Self {
            window,
            notice: notice.into(),
        }
    }

    /// Notice of the form "This file will be deleted in 12 hours."
    pub fn deleted_in(window: Duration) -> Self {
        let notice = format!(
            "This file will be deleted in {}.",
            humanize::duration(window)
        );
        Self::new(window, notice)
    }

    /// Moment the upload stops being available, counted from `uploaded_at`
    pub fn expires_at(&self, uploaded_at: DateTime<Local>) -> Option<DateTime<Local>> {
        let window = chrono::Duration::from_std(self.window).ok()?;
        uploaded_at.checked_add_signed(window)
    }
}

/// Upload capability implemented once per hosting backend
///
/// Adapters return the provider's raw link; rewriting to a direct-download
/// link is applied by the caller using [`UploadProvider::rewrite_rule`].
#[async_trait]
pub trait UploadProvider: Send + Sync {
    /// Registry name, e.g. `file-io`
    fn name(&self) -> &'static str;

    /// Primary endpoint contacted by the adapter
    fn endpoint(&self) -> &Url;

    fn retention(&self) -> &Retention;

    /// Rule turning the provider's view link into a direct-download link
    fn rewrite_rule(&self) -> Option<&RewriteRule> {
        None
    }

    /// Largest bundle the provider accepts, if known
    fn max_upload_bytes(&self) -> Option<ByteSize> {
        None
    }

    /// Upload the bundle and return the provider's link
    async fn upload(&self, bundle: &Bundle) -> Result<UploadResult, UploadError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_kind_classification() {
        let status = UploadError::HttpStatus {
            provider: "transfer-sh",
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(status.kind(), FailureKind::HttpStatus);
        assert_eq!(status.body(), Some("boom"));
        assert_eq!(status.provider(), "transfer-sh");

        let logical = UploadError::Provider {
            provider: "gofile",
            message: "server assignment failed".to_string(),
        };
        assert_eq!(logical.kind(), FailureKind::Provider);
        assert_eq!(logical.body(), None);
    }

    #[test]
    fn test_display_truncates_long_bodies() {
        let err = UploadError::MalformedResponse {
            provider: "file-io",
            reason: "not JSON".to_string(),
            body: "<html>".repeat(100),
        };
        let message = err.to_string();
        assert!(message.starts_with("file-io: unexpected response (not JSON): <html>"));
        assert!(message.ends_with("..."));
        assert!(message.len() < 300);
    }

    #[test]
    fn test_display_marks_empty_body() {
        let err = UploadError::HttpStatus {
            provider: "tmpfiles",
            status: 502,
            body: "  ".to_string(),
        };
        assert_eq!(err.to_string(), "tmpfiles: HTTP 502: <empty body>");
    }

    #[test]
    fn test_retention_expiry() {
        let retention = Retention::deleted_in(Duration::from_secs(12 * 3600));
        assert_eq!(retention.notice, "This file will be deleted in 12 hours.");

        let start = Local.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let expiry = retention.expires_at(start).unwrap();
        assert_eq!(expiry - start, chrono::Duration::hours(12));
    }
}
