//! tmpfiles.org adapter: multipart POST, view link needs rewriting to `/dl/`

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::http::{self, StatusPolicy};
use super::traits::{Retention, UploadError, UploadProvider, UploadResult};
use crate::bundle::Bundle;
use crate::config::{TmpfilesConfig, ValidationError, retention_window, validate_url};
use crate::humanize::ByteSize;
use crate::link::RewriteRule;

pub const NAME: &str = "tmpfiles";

const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct TmpfilesResponse {
    status: String,
    data: Option<TmpfilesData>,
}

#[derive(Debug, Deserialize)]
struct TmpfilesData {
    url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TmpfilesProvider {
    client: Client,
    endpoint: Url,
    rewrite: RewriteRule,
    retention: Retention,
    max_upload_bytes: Option<ByteSize>,
}

impl TmpfilesProvider {
    pub fn new(config: &TmpfilesConfig, client: Client) -> Result<Self, ValidationError> {
        let endpoint = validate_url(NAME, "endpoint", &config.endpoint)?;
        let rewrite = config.rewrite_rule();
        if !rewrite.is_well_formed() {
            return Err(ValidationError::InvalidRewriteRule { provider: NAME });
        }

        Ok(Self {
            client,
            endpoint,
            rewrite,
            retention: Retention::deleted_in(retention_window(config.retention_minutes)),
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

#[async_trait]
impl UploadProvider for TmpfilesProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn retention(&self) -> &Retention {
        &self.retention
    }

    fn rewrite_rule(&self) -> Option<&RewriteRule> {
        Some(&self.rewrite)
    }

    fn max_upload_bytes(&self) -> Option<ByteSize> {
        self.max_upload_bytes
    }

    async fn upload(&self, bundle: &Bundle) -> Result<UploadResult, UploadError> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .multipart(http::file_form(bundle));

        let body = http::send(NAME, request, StatusPolicy::Success).await?;
        let reply: TmpfilesResponse = http::parse_json(NAME, &body)?;

        if reply.status != STATUS_SUCCESS {
            return Err(UploadError::Provider {
                provider: NAME,
                message: format!("upload returned status '{}'", reply.status),
            });
        }

        let url = http::required(NAME, reply.data.and_then(|d| d.url), "data.url", &body)?;
        Ok(UploadResult { url })
    }
}
