use super::models::Config;
use crate::humanize::ByteSize;
use crate::providers::PROVIDER_NAMES;
use reqwest::Url;
use thiserror::Error;

/// Upper bound on configured retention, one year
const MAX_RETENTION_MINUTES: u64 = 366 * 24 * 60;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Unknown default provider '{name}' (expected one of: {known})")]
    UnknownProvider { name: String, known: String },

    #[error("Provider '{provider}' has invalid {field} '{value}': {reason}")]
    InvalidEndpoint {
        provider: &'static str,
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Provider '{provider}' rewrite rule must have a non-empty search text distinct from its replacement")]
    InvalidRewriteRule { provider: &'static str },

    #[error("Provider '{provider}' retention must be between 1 and 527040 minutes (366 days), got {value}")]
    InvalidRetention { provider: &'static str, value: u64 },

    #[error("Provider '{provider}' max_upload_bytes must be positive")]
    ZeroUploadLimit { provider: &'static str },

    #[error("Archive name must not be empty")]
    EmptyArchiveName,

    #[error("HTTP {field} must be positive")]
    ZeroTimeout { field: &'static str },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_default_provider(config)?;
    validate_http(config)?;
    validate_bundle(config)?;
    validate_providers(config)?;
    Ok(())
}

fn validate_default_provider(config: &Config) -> Result<(), ValidationError> {
    if !PROVIDER_NAMES.contains(&config.default_provider.as_str()) {
        return Err(ValidationError::UnknownProvider {
            name: config.default_provider.clone(),
            known: PROVIDER_NAMES.join(", "),
        });
    }
    Ok(())
}

fn validate_http(config: &Config) -> Result<(), ValidationError> {
    if config.http.connect_timeout_secs == Some(0) {
        return Err(ValidationError::ZeroTimeout {
            field: "connect_timeout_secs",
        });
    }
    if config.http.request_timeout_secs == Some(0) {
        return Err(ValidationError::ZeroTimeout {
            field: "request_timeout_secs",
        });
    }
    Ok(())
}

fn validate_bundle(config: &Config) -> Result<(), ValidationError> {
    if config.bundle.archive_name.trim().is_empty() {
        return Err(ValidationError::EmptyArchiveName);
    }
    Ok(())
}

fn validate_providers(config: &Config) -> Result<(), ValidationError> {
    let p = &config.providers;

    validate_url("file-io", "endpoint", &p.file_io.endpoint)?;
    validate_limits("file-io", p.file_io.retention_minutes, p.file_io.max_upload_bytes)?;

    validate_url("gofile", "server_endpoint", &p.gofile.server_endpoint)?;
    if !matches!(p.gofile.upload_scheme.as_str(), "http" | "https") {
        return Err(ValidationError::InvalidEndpoint {
            provider: "gofile",
            field: "upload_scheme",
            value: p.gofile.upload_scheme.clone(),
            reason: "expected 'http' or 'https'".to_string(),
        });
    }
    validate_limits("gofile", p.gofile.retention_minutes, p.gofile.max_upload_bytes)?;

    validate_url("transfer-sh", "endpoint", &p.transfer_sh.endpoint)?;
    validate_limits(
        "transfer-sh",
        p.transfer_sh.retention_minutes,
        p.transfer_sh.max_upload_bytes,
    )?;

    validate_url("tmpfiles", "endpoint", &p.tmpfiles.endpoint)?;
    if !p.tmpfiles.rewrite_rule().is_well_formed() {
        return Err(ValidationError::InvalidRewriteRule {
            provider: "tmpfiles",
        });
    }
    validate_limits("tmpfiles", p.tmpfiles.retention_minutes, p.tmpfiles.max_upload_bytes)?;

    Ok(())
}

/// Endpoints must be absolute http(s) URLs
pub(crate) fn validate_url(
    provider: &'static str,
    field: &'static str,
    value: &str,
) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidEndpoint {
        provider,
        field,
        value: value.to_string(),
        reason,
    };

    let url = Url::parse(value).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn validate_limits(
    provider: &'static str,
    retention_minutes: u64,
    max_upload_bytes: Option<ByteSize>,
) -> Result<(), ValidationError> {
    if retention_minutes == 0 || retention_minutes > MAX_RETENTION_MINUTES {
        return Err(ValidationError::InvalidRetention {
            provider,
            value: retention_minutes,
        });
    }
    if max_upload_bytes.is_some_and(|b| b.as_u64() == 0) {
        return Err(ValidationError::ZeroUploadLimit { provider });
    }
    Ok(())
}
