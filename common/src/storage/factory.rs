//! Storage factory for creating storage instances from configuration.

use std::sync::Arc;

use super::config::StorageConfig;
use super::in_memory::InMemoryStorage;
use super::{Storage, StorageResult};

/// Creates a storage instance based on the provided configuration.
pub async fn create_storage(config: &StorageConfig) -> StorageResult<Arc<dyn Storage>> {
    StorageBuilder::new(config.clone()).build().await
}

/// Builder for creating storage instances.
pub struct StorageBuilder {
    config: StorageConfig,
}

impl StorageBuilder {
    /// Creates a new storage builder with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Builds the storage instance.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn build(self) -> StorageResult<Arc<dyn Storage>> {
        match self.config {
            StorageConfig::InMemory => Ok(Arc::new(InMemoryStorage::new())),
        }
    }
}
