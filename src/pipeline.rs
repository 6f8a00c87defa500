//! One share run: bundle the files, upload, normalize the link, render the QR code
//!
//! Everything the run needs is passed in; nothing here reads config or global state.

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{info, warn};

use crate::bundle::{self, Bundle, BundleError, DEFAULT_ARCHIVE_NAME, InputFile};
use crate::humanize::ByteSize;
use crate::link;
use crate::providers::{FailureKind, Retention, UploadError, UploadProvider};
use crate::qr::{self, QrStyle, RenderError};

#[derive(Debug, Error)]
pub enum ShareError {
    #[error("no files selected")]
    NoFiles,

    #[error("bundling failed: {0}")]
    Bundle(#[from] BundleError),

    #[error("{provider}: bundle is {size}, larger than the {limit} limit")]
    BundleTooLarge {
        provider: &'static str,
        size: ByteSize,
        limit: ByteSize,
    },

    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("QR rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl ShareError {
    /// Upload failure classification, if the run failed during upload
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ShareError::Upload(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Per-run knobs
#[derive(Debug, Clone)]
pub struct ShareOptions {
    pub archive_name: String,
    pub qr: QrStyle,
}

impl Default for ShareOptions {
    fn default() -> Self {
        Self {
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            qr: QrStyle::default(),
        }
    }
}

/// Everything the front end shows after a successful run
#[derive(Debug, Clone)]
pub struct ShareOutcome {
    pub provider: &'static str,
    pub bundle_name: String,
    pub size: ByteSize,
    /// Link as returned by the provider
    pub raw_url: String,
    /// Link after normalization; this is what the QR code encodes
    pub url: String,
    pub qr_png: Vec<u8>,
    pub qr_text: String,
    pub retention: Retention,
    pub uploaded_at: DateTime<Local>,
}

impl ShareOutcome {
    pub fn expires_at(&self) -> Option<DateTime<Local>> {
        self.retention.expires_at(self.uploaded_at)
    }
}

/// Bundle the files and check the result against the provider's size limit
///
/// No network traffic happens here.
pub fn prepare(
    files: &[InputFile],
    provider: &dyn UploadProvider,
    options: &ShareOptions,
) -> Result<Bundle, ShareError> {
    if files.is_empty() {
        return Err(ShareError::NoFiles);
    }

    let bundle = bundle::bundle(files, &options.archive_name)?;
    let size = bundle.size();

    info!(
        files = files.len(),
        bundle = %bundle.filename,
        %size,
        "Bundle ready"
    );

    if let Some(limit) = provider.max_upload_bytes() {
        if size > limit {
            warn!(provider = provider.name(), %size, %limit, "Bundle exceeds provider limit");
            return Err(ShareError::BundleTooLarge {
                provider: provider.name(),
                size,
                limit,
            });
        }
    }

    Ok(bundle)
}

/// Upload a prepared bundle and turn the returned link into a QR code
pub async fn publish(
    bundle: &Bundle,
    provider: &dyn UploadProvider,
    options: &ShareOptions,
) -> Result<ShareOutcome, ShareError> {
    let name = provider.name();

    let uploaded = provider.upload(bundle).await.map_err(|e| {
        warn!(provider = name, kind = %e.kind(), error = %e, "Upload failed");
        e
    })?;
    let uploaded_at = Local::now();

    let url = link::normalize(&uploaded.url, provider.rewrite_rule());
    info!(provider = name, url = %url, "Upload complete");

    let qr_png = qr::render_png(&url, options.qr)?;
    let qr_text = qr::render_terminal(&url)?;

    Ok(ShareOutcome {
        provider: name,
        bundle_name: bundle.filename.clone(),
        size: bundle.size(),
        raw_url: uploaded.url,
        url,
        qr_png,
        qr_text,
        retention: provider.retention().clone(),
        uploaded_at,
    })
}

/// Run the whole pipeline once
pub async fn share(
    files: &[InputFile],
    provider: &dyn UploadProvider,
    options: &ShareOptions,
) -> Result<ShareOutcome, ShareError> {
    let bundle = prepare(files, provider, options)?;
    publish(&bundle, provider, options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::RewriteRule;
    use crate::providers::UploadResult;
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-process provider that records what it was given
    struct StubProvider {
        endpoint: Url,
        retention: Retention,
        rewrite: Option<RewriteRule>,
        limit: Option<ByteSize>,
        reply: fn() -> Result<UploadResult, UploadError>,
        seen: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn new(reply: fn() -> Result<UploadResult, UploadError>) -> Self {
            Self {
                endpoint: Url::parse("https://stub.invalid/").unwrap(),
                retention: Retention::deleted_in(Duration::from_secs(3600)),
                rewrite: None,
                limit: None,
                reply,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl UploadProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn endpoint(&self) -> &Url {
            &self.endpoint
        }

        fn retention(&self) -> &Retention {
            &self.retention
        }

        fn rewrite_rule(&self) -> Option<&RewriteRule> {
            self.rewrite.as_ref()
        }

        fn max_upload_bytes(&self) -> Option<ByteSize> {
            self.limit
        }

        async fn upload(&self, bundle: &Bundle) -> Result<UploadResult, UploadError> {
            self.seen.lock().unwrap().push(bundle.filename.clone());
            (self.reply)()
        }
    }

    fn ok_link() -> Result<UploadResult, UploadError> {
        Ok(UploadResult {
            url: "https://tmpfiles.org/123/f.txt".to_string(),
        })
    }

    fn provider_failure() -> Result<UploadResult, UploadError> {
        Err(UploadError::Provider {
            provider: "stub",
            message: "nope".to_string(),
        })
    }

    #[tokio::test]
    async fn test_share_single_file() {
        let provider = StubProvider::new(ok_link);
        let files = vec![InputFile::new("f.txt", "hello")];

        let outcome = share(&files, &provider, &ShareOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.bundle_name, "f.txt");
        assert_eq!(outcome.size, ByteSize(5));
        assert_eq!(outcome.url, outcome.raw_url);
        assert!(outcome.qr_png.starts_with(b"\x89PNG"));
        assert!(!outcome.qr_text.is_empty());
        assert_eq!(
            outcome.expires_at().unwrap() - outcome.uploaded_at,
            chrono::Duration::hours(1)
        );
        assert_eq!(*provider.seen.lock().unwrap(), vec!["f.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_share_applies_rewrite_rule() {
        let mut provider = StubProvider::new(ok_link);
        provider.rewrite = Some(RewriteRule::new("tmpfiles.org/", "tmpfiles.org/dl/"));

        let files = vec![InputFile::new("f.txt", "x")];
        let outcome = share(&files, &provider, &ShareOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.raw_url, "https://tmpfiles.org/123/f.txt");
        assert_eq!(outcome.url, "https://tmpfiles.org/dl/123/f.txt");
    }

    #[tokio::test]
    async fn test_multiple_files_upload_archive() {
        let provider = StubProvider::new(ok_link);
        let files = vec![InputFile::new("a.txt", "hi"), InputFile::new("b.txt", "bye")];
        let options = ShareOptions {
            archive_name: "bundle.zip".to_string(),
            ..ShareOptions::default()
        };

        let outcome = share(&files, &provider, &options).await.unwrap();
        assert_eq!(outcome.bundle_name, "bundle.zip");
        assert_eq!(*provider.seen.lock().unwrap(), vec!["bundle.zip".to_string()]);
    }

    #[tokio::test]
    async fn test_no_files() {
        let provider = StubProvider::new(ok_link);
        let err = share(&[], &provider, &ShareOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ShareError::NoFiles));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_size_limit_checked_before_upload() {
        let mut provider = StubProvider::new(ok_link);
        provider.limit = Some(ByteSize(4));

        let files = vec![InputFile::new("big.bin", vec![0u8; 5])];
        let err = share(&files, &provider, &ShareOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ShareError::BundleTooLarge { size: ByteSize(5), limit: ByteSize(4), .. }
        ));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_keeps_kind() {
        let provider = StubProvider::new(provider_failure);
        let files = vec![InputFile::new("f.txt", "x")];

        let err = share(&files, &provider, &ShareOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::Provider));
        assert_eq!(err.to_string(), "upload failed: stub: nope");
    }
}
