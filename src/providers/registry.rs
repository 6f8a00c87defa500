use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::file_io::FileIoProvider;
use super::gofile::GofileProvider;
use super::http::build_client;
use super::tmpfiles::TmpfilesProvider;
use super::traits::UploadProvider;
use super::transfer_sh::TransferShProvider;
use crate::config::{Config, ValidationError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("provider not found: {name} (known: {known})")]
    NotFound { name: String, known: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ValidationError),
}

/// Registry mapping provider names to adapter instances
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn UploadProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the adapter's own name, replacing any previous entry
    pub fn register(&mut self, provider: Arc<dyn UploadProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn UploadProvider>, RegistryError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
                known: self.names().join(", "),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn UploadProvider>> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Build every built-in adapter from config, sharing one HTTP client
    pub fn from_config(config: &Config) -> Result<Self, RegistryError> {
        let client = build_client(&config.http)?;
        let providers = &config.providers;

        let mut registry = Self::new();
        registry.register(Arc::new(FileIoProvider::new(
            &providers.file_io,
            client.clone(),
        )?));
        registry.register(Arc::new(GofileProvider::new(
            &providers.gofile,
            client.clone(),
        )?));
        registry.register(Arc::new(TransferShProvider::new(
            &providers.transfer_sh,
            client.clone(),
        )?));
        registry.register(Arc::new(TmpfilesProvider::new(&providers.tmpfiles, client)?));

        Ok(registry)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}
