//! file.io adapter: one multipart POST with a retention field

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::http::{self, StatusPolicy};
use super::traits::{Retention, UploadError, UploadProvider, UploadResult};
use crate::bundle::Bundle;
use crate::config::{FileIoConfig, ValidationError, retention_window, validate_url};
use crate::humanize::{self, ByteSize};

pub const NAME: &str = "file-io";

#[derive(Debug, Deserialize)]
struct FileIoResponse {
    success: bool,
    link: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileIoProvider {
    client: Client,
    endpoint: Url,
    expires: String,
    retention: Retention,
    max_upload_bytes: Option<ByteSize>,
}

impl FileIoProvider {
    pub fn new(config: &FileIoConfig, client: Client) -> Result<Self, ValidationError> {
        let endpoint = validate_url(NAME, "endpoint", &config.endpoint)?;
        let window = retention_window(config.retention_minutes);
        let retention = Retention::new(
            window,
            format!(
                "This file will be deleted immediately after the first download or in {}.",
                humanize::duration(window)
            ),
        );

        Ok(Self {
            client,
            endpoint,
            expires: config.expires.clone(),
            retention,
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

#[async_trait]
impl UploadProvider for FileIoProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn retention(&self) -> &Retention {
        &self.retention
    }

    fn max_upload_bytes(&self) -> Option<ByteSize> {
        self.max_upload_bytes
    }

    async fn upload(&self, bundle: &Bundle) -> Result<UploadResult, UploadError> {
        let form = http::file_form(bundle).text("expires", self.expires.clone());
        let request = self.client.post(self.endpoint.clone()).multipart(form);

        let body = http::send(NAME, request, StatusPolicy::Success).await?;
        let reply: FileIoResponse = http::parse_json(NAME, &body)?;

        if !reply.success {
            return Err(UploadError::Provider {
                provider: NAME,
                message: reply
                    .message
                    .unwrap_or_else(|| "upload rejected (success = false)".to_string()),
            });
        }

        let url = http::required(NAME, reply.link, "link", &body)?;
        Ok(UploadResult { url })
    }
}
