use crate::bundle::DEFAULT_ARCHIVE_NAME;
use crate::humanize::ByteSize;
use crate::link::RewriteRule;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Provider used when none is given on the command line
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub bundle: BundleConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            http: HttpSettings::default(),
            bundle: BundleConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

fn default_provider() -> String {
    "file-io".to_string()
}

/// HTTP client settings shared by all providers
///
/// Timeouts are unset by default, leaving the transport's own behavior in place.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: None,
            request_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    concat!("quickshare/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BundleConfig {
    /// Name given to the archive built from two or more files
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            archive_name: default_archive_name(),
        }
    }
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub file_io: FileIoConfig,
    #[serde(default)]
    pub gofile: GofileConfig,
    #[serde(default)]
    pub transfer_sh: TransferShConfig,
    #[serde(default)]
    pub tmpfiles: TmpfilesConfig,
}

/// file.io: single multipart POST with an `expires` field
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileIoConfig {
    #[serde(default = "default_file_io_endpoint")]
    pub endpoint: String,
    /// Value of the `expires` form field
    #[serde(default = "default_file_io_expires")]
    pub expires: String,
    #[serde(default = "default_file_io_retention")]
    pub retention_minutes: u64,
    pub max_upload_bytes: Option<ByteSize>,
}

impl Default for FileIoConfig {
    fn default() -> Self {
        Self {
            endpoint: default_file_io_endpoint(),
            expires: default_file_io_expires(),
            retention_minutes: default_file_io_retention(),
            max_upload_bytes: None,
        }
    }
}

fn default_file_io_endpoint() -> String {
    "https://file.io/".to_string()
}

fn default_file_io_expires() -> String {
    "12h".to_string()
}

fn default_file_io_retention() -> u64 {
    12 * 60
}

/// gofile.io: server assignment, then multipart POST to the assigned host
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GofileConfig {
    #[serde(default = "default_gofile_server_endpoint")]
    pub server_endpoint: String,
    /// Scheme used to reach the assigned upload host
    #[serde(default = "default_upload_scheme")]
    pub upload_scheme: String,
    #[serde(default = "default_gofile_retention")]
    pub retention_minutes: u64,
    pub max_upload_bytes: Option<ByteSize>,
}

impl Default for GofileConfig {
    fn default() -> Self {
        Self {
            server_endpoint: default_gofile_server_endpoint(),
            upload_scheme: default_upload_scheme(),
            retention_minutes: default_gofile_retention(),
            max_upload_bytes: None,
        }
    }
}

fn default_gofile_server_endpoint() -> String {
    "https://api.gofile.io/getServer".to_string()
}

fn default_upload_scheme() -> String {
    "https".to_string()
}

fn default_gofile_retention() -> u64 {
    10 * 24 * 60
}

/// transfer.sh: raw PUT, plain-text link in the response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransferShConfig {
    #[serde(default = "default_transfer_sh_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_transfer_sh_retention")]
    pub retention_minutes: u64,
    pub max_upload_bytes: Option<ByteSize>,
}

impl Default for TransferShConfig {
    fn default() -> Self {
        Self {
            endpoint: default_transfer_sh_endpoint(),
            retention_minutes: default_transfer_sh_retention(),
            max_upload_bytes: None,
        }
    }
}

fn default_transfer_sh_endpoint() -> String {
    "https://transfer.sh".to_string()
}

fn default_transfer_sh_retention() -> u64 {
    14 * 24 * 60
}

/// tmpfiles.org: multipart POST, view link rewritten to a download link
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmpfilesConfig {
    #[serde(default = "default_tmpfiles_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_tmpfiles_rewrite_from")]
    pub rewrite_from: String,
    #[serde(default = "default_tmpfiles_rewrite_to")]
    pub rewrite_to: String,
    #[serde(default = "default_tmpfiles_retention")]
    pub retention_minutes: u64,
    pub max_upload_bytes: Option<ByteSize>,
}

impl TmpfilesConfig {
    pub fn rewrite_rule(&self) -> RewriteRule {
        RewriteRule::new(&self.rewrite_from, &self.rewrite_to)
    }
}

impl Default for TmpfilesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_tmpfiles_endpoint(),
            rewrite_from: default_tmpfiles_rewrite_from(),
            rewrite_to: default_tmpfiles_rewrite_to(),
            retention_minutes: default_tmpfiles_retention(),
            max_upload_bytes: None,
        }
    }
}

fn default_tmpfiles_endpoint() -> String {
    "https://tmpfiles.org/api/v1/upload".to_string()
}

fn default_tmpfiles_rewrite_from() -> String {
    "tmpfiles.org/".to_string()
}

fn default_tmpfiles_rewrite_to() -> String {
    "tmpfiles.org/dl/".to_string()
}

fn default_tmpfiles_retention() -> u64 {
    60
}

/// Convert a configured retention in minutes
pub fn retention_window(minutes: u64) -> Duration {
    Duration::from_secs(minutes.saturating_mul(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.default_provider, "file-io");
        assert_eq!(config.bundle.archive_name, "archive.zip");
        assert!(config.http.request_timeout_secs.is_none());
        assert!(config.http.user_agent.starts_with("quickshare/"));
        assert_eq!(config.providers.file_io.endpoint, "https://file.io/");
        assert_eq!(config.providers.file_io.expires, "12h");
        assert_eq!(config.providers.gofile.upload_scheme, "https");
        assert_eq!(config.providers.transfer_sh.retention_minutes, 14 * 24 * 60);
        assert_eq!(
            config.providers.tmpfiles.rewrite_rule(),
            RewriteRule::new("tmpfiles.org/", "tmpfiles.org/dl/")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
default_provider = "tmpfiles"

[providers.tmpfiles]
max_upload_bytes = "100MB"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_provider, "tmpfiles");
        assert_eq!(
            config.providers.tmpfiles.max_upload_bytes,
            Some(ByteSize(100 * 1024 * 1024))
        );
        assert_eq!(config.providers.tmpfiles.retention_minutes, 60);
        assert_eq!(config.providers.file_io.expires, "12h");
    }

    #[test]
    fn test_retention_window_saturates() {
        assert_eq!(retention_window(60), Duration::from_secs(3600));
        assert_eq!(retention_window(u64::MAX), Duration::from_secs(u64::MAX));
    }
}
