//! transfer.sh adapter: raw PUT to `{endpoint}/{filename}`, link returned as plain text

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};

use super::http::{self, StatusPolicy};
use super::traits::{Retention, UploadError, UploadProvider, UploadResult};
use crate::bundle::Bundle;
use crate::config::{TransferShConfig, ValidationError, retention_window, validate_url};
use crate::humanize::ByteSize;

pub const NAME: &str = "transfer-sh";

#[derive(Debug, Clone)]
pub struct TransferShProvider {
    client: Client,
    endpoint: Url,
    retention: Retention,
    max_upload_bytes: Option<ByteSize>,
}

impl TransferShProvider {
    pub fn new(config: &TransferShConfig, client: Client) -> Result<Self, ValidationError> {
        let endpoint = validate_url(NAME, "endpoint", &config.endpoint)?;

        Ok(Self {
            client,
            endpoint,
            retention: Retention::deleted_in(retention_window(config.retention_minutes)),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// Endpoint with the filename appended as one percent-encoded path segment
    pub fn upload_url(&self, filename: &str) -> Url {
        let mut url = self.endpoint.clone();
        // validate_url rejected cannot-be-a-base URLs, so segments are always available
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(filename);
        }
        url
    }
}

#[async_trait]
impl UploadProvider for TransferShProvider {
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
        let request = self
            .client
            .put(self.upload_url(&bundle.filename))
            .header(CONTENT_TYPE, mime::APPLICATION_OCTET_STREAM.as_ref())
            .body(bundle.bytes.clone());

        let body = http::send(NAME, request, StatusPolicy::ExactlyOk).await?;

        let url = body.trim();
        if let Err(e) = Url::parse(url) {
            return Err(UploadError::MalformedResponse {
                provider: NAME,
                reason: format!("response is not a link: {e}"),
                body: body.clone(),
            });
        }

        Ok(UploadResult {
            url: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpSettings;
    use crate::providers::FailureKind;
    use wiremock::matchers::{body_bytes, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_with_endpoint(endpoint: String) -> TransferShProvider {
        let config = TransferShConfig {
            endpoint,
            ..TransferShConfig::default()
        };
        let client = http::build_client(&HttpSettings::default()).unwrap();
        TransferShProvider::new(&config, client).unwrap()
    }

    fn provider_for(server: &MockServer) -> TransferShProvider {
        provider_with_endpoint(server.uri())
    }

    fn bundle(name: &str) -> Bundle {
        Bundle {
            filename: name.to_string(),
            bytes: "hello transfer".into(),
        }
    }

    #[test]
    fn test_upload_url_encodes_filename() {
        let provider = provider_with_endpoint("https://transfer.sh".to_string());
        assert_eq!(
            provider.upload_url("a.txt").as_str(),
            "https://transfer.sh/a.txt"
        );
        assert_eq!(
            provider.upload_url("my report #1.pdf").as_str(),
            "https://transfer.sh/my%20report%20%231.pdf"
        );

        let nested = provider_with_endpoint("https://files.example.com/put/".to_string());
        assert_eq!(
            nested.upload_url("x.bin").as_str(),
            "https://files.example.com/put/x.bin"
        );
    }

    #[tokio::test]
    async fn test_put_raw_body_and_trim_response() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/hello.txt"))
            .and(header("content-type", "application/octet-stream"))
            .and(body_bytes(b"hello transfer".to_vec()))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("  https://transfer.sh/Ab3/hello.txt\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = provider_for(&server).upload(&bundle("hello.txt")).await.unwrap();
        assert_eq!(result.url, "https://transfer.sh/Ab3/hello.txt");
    }

    #[tokio::test]
    async fn test_server_error_surfaces_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("storage backend offline"))
            .mount(&server)
            .await;

        let err = provider_for(&server).upload(&bundle("a.txt")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::HttpStatus);
        assert_eq!(err.body(), Some("storage backend offline"));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_non_200_success_is_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201).set_body_string("https://transfer.sh/x/a.txt"))
            .mount(&server)
            .await;

        let err = provider_for(&server).upload(&bundle("a.txt")).await.unwrap_err();
        assert!(matches!(err, UploadError::HttpStatus { status: 201, .. }));
    }

    #[tokio::test]
    async fn test_non_link_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&server)
            .await;

        let err = provider_for(&server).upload(&bundle("a.txt")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport_failure() {
        let provider = provider_with_endpoint("http://127.0.0.1:1".to_string());

        let err = provider.upload(&bundle("a.txt")).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.provider(), NAME);
    }
}
