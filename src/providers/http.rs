//! HTTP plumbing shared by the provider adapters

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::UploadError;
use crate::bundle::Bundle;
use crate::config::HttpSettings;

/// Build the client shared by all providers
///
/// No timeout is applied unless configured.
pub fn build_client(settings: &HttpSettings) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(&settings.user_agent);

    if let Some(secs) = settings.connect_timeout_secs {
        builder = builder.connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = settings.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Which status codes count as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusPolicy {
    /// Any 2xx
    Success,
    /// 200 only
    ExactlyOk,
}

impl StatusPolicy {
    fn accepts(self, status: StatusCode) -> bool {
        match self {
            StatusPolicy::Success => status.is_success(),
            StatusPolicy::ExactlyOk => status == StatusCode::OK,
        }
    }
}

/// Multipart form with the bundle under the `file` field
///
/// The part shares the bundle's buffer instead of copying it.
pub(crate) fn file_form(bundle: &Bundle) -> Form {
    let part = Part::stream(bundle.bytes.clone()).file_name(bundle.filename.clone());
    Form::new().part("file", part)
}

/// Send a request and return the body of an accepted response
pub(crate) async fn send(
    provider: &'static str,
    request: RequestBuilder,
    policy: StatusPolicy,
) -> Result<String, UploadError> {
    let response = request.send().await.map_err(|source| {
        warn!(provider, timeout = source.is_timeout(), error = %source, "Request failed");
        UploadError::Transport { provider, source }
    })?;

    read_body(provider, response, policy).await
}

async fn read_body(
    provider: &'static str,
    response: Response,
    policy: StatusPolicy,
) -> Result<String, UploadError> {
    let status = response.status();
    let url = response.url().to_string();

    let body = response
        .text()
        .await
        .map_err(|source| UploadError::Transport { provider, source })?;

    if !policy.accepts(status) {
        warn!(provider, %url, status = status.as_u16(), "Provider returned failing status");
        return Err(UploadError::HttpStatus {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    debug!(provider, %url, status = status.as_u16(), size = body.len(), "Response received");
    Ok(body)
}

/// Parse a JSON response body, keeping the raw body on failure
pub(crate) fn parse_json<T: DeserializeOwned>(
    provider: &'static str,
    body: &str,
) -> Result<T, UploadError> {
    serde_json::from_str(body).map_err(|e| UploadError::MalformedResponse {
        provider,
        reason: format!("invalid JSON: {e}"),
        body: body.to_string(),
    })
}

/// Pull a required field out of a parsed response
pub(crate) fn required<T>(
    provider: &'static str,
    value: Option<T>,
    field: &str,
    body: &str,
) -> Result<T, UploadError> {
    value.ok_or_else(|| UploadError::MalformedResponse {
        provider,
        reason: format!("missing field '{field}'"),
        body: body.to_string(),
    })
}
