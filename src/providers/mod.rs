//! Upload providers for quickshare
//!
//! Each provider is an adapter that turns a [`Bundle`](crate::bundle::Bundle)
//! into a public link using one hosting service's protocol.
//!
//! ## Key Components
//!
//! - [`UploadProvider`] - Trait every adapter implements
//! - [`ProviderRegistry`] - Name to adapter lookup, built from config
//! - [`UploadError`] / [`FailureKind`] - Failure classification shared by all adapters
//! - [`Retention`] - How long a provider keeps the upload, and the notice shown to users
//!
//! ## Example
//!
//! ```rust,ignore
//! use quickshare::config::Config;
//! use quickshare::providers::ProviderRegistry;
//!
//! let registry = ProviderRegistry::from_config(&Config::default())?;
//! let provider = registry.get("transfer-sh")?;
//! let result = provider.upload(&bundle).await?;
//! ```

mod file_io;
mod gofile;
mod http;
mod registry;
mod tmpfiles;
mod traits;
mod transfer_sh;

pub use file_io::FileIoProvider;
pub use gofile::GofileProvider;
pub use http::build_client;
pub use registry::{ProviderRegistry, RegistryError};
pub use tmpfiles::TmpfilesProvider;
pub use traits::{FailureKind, Retention, UploadError, UploadProvider, UploadResult};
pub use transfer_sh::TransferShProvider;

/// Names of the built-in providers, in presentation order
pub const PROVIDER_NAMES: [&str; 4] = [
    file_io::NAME,
    gofile::NAME,
    transfer_sh::NAME,
    tmpfiles::NAME,
];
