//! gofile.io adapter: ask for an upload server, then POST the bundle to it

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::http::{self, StatusPolicy};
use super::traits::{Retention, UploadError, UploadProvider, UploadResult};
use crate::bundle::Bundle;
use crate::config::{GofileConfig, ValidationError, retention_window, validate_url};
use crate::humanize::{self, ByteSize};

pub const NAME: &str = "gofile";

const STATUS_OK: &str = "ok";

/// `{status, data}` envelope used by every gofile endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ServerData {
    server: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadData {
    download_page: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GofileProvider {
    client: Client,
    server_endpoint: Url,
    upload_scheme: String,
    retention: Retention,
    max_upload_bytes: Option<ByteSize>,
}

impl GofileProvider {
    pub fn new(config: &GofileConfig, client: Client) -> Result<Self, ValidationError> {
        let server_endpoint = validate_url(NAME, "server_endpoint", &config.server_endpoint)?;
        let window = retention_window(config.retention_minutes);
        let retention = Retention::new(
            window,
            format!(
                "This file will be deleted after {} without downloads.",
                humanize::duration(window)
            ),
        );

        Ok(Self {
            client,
            server_endpoint,
            upload_scheme: config.upload_scheme.clone(),
            retention,
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Step one: ask which host should receive the upload
    async fn assign_upload_url(&self) -> Result<Url, UploadError> {
        let request = self.client.get(self.server_endpoint.clone());
        let body = http::send(NAME, request, StatusPolicy::Success).await?;
        let reply: Envelope<ServerData> = http::parse_json(NAME, &body)?;

        if reply.status != STATUS_OK {
            return Err(UploadError::Provider {
                provider: NAME,
                message: format!("server assignment returned status '{}'", reply.status),
            });
        }

        let server = http::required(
            NAME,
            reply.data.and_then(|d| d.server),
            "data.server",
            &body,
        )?;

        debug!(provider = NAME, %server, "Upload server assigned");

        let raw = format!("{}://{}/uploadFile", self.upload_scheme, server);
        Url::parse(&raw).map_err(|e| UploadError::MalformedResponse {
            provider: NAME,
            reason: format!("assigned server '{server}' is not a valid host: {e}"),
            body,
        })
    }
}

#[async_trait]
impl UploadProvider for GofileProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn endpoint(&self) -> &Url {
        &self.server_endpoint
    }

    fn retention(&self) -> &Retention {
        &self.retention
    }

    fn max_upload_bytes(&self) -> Option<ByteSize> {
        self.max_upload_bytes
    }

    async fn upload(&self, bundle: &Bundle) -> Result<UploadResult, UploadError> {
        let upload_url = self.assign_upload_url().await?;

        let request = self
            .client
            .post(upload_url)
            .multipart(http::file_form(bundle));

        let body = http::send(NAME, request, StatusPolicy::Success).await?;
        let reply: Envelope<UploadData> = http::parse_json(NAME, &body)?;

        if reply.status != STATUS_OK {
            return Err(UploadError::Provider {
                provider: NAME,
                message: format!("upload returned status '{}'", reply.status),
            });
        }

        let url = http::required(
            NAME,
            reply.data.and_then(|d| d.download_page),
            "data.downloadPage",
            &body,
        )?;
        Ok(UploadResult { url })
    }
}
