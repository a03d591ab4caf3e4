//! Configuration for opening [`CollectionsDb`](crate::CollectionsDb).

use common::StorageConfig;
use serde::Deserialize;

/// Configuration for opening a [`CollectionsDb`](crate::CollectionsDb).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Storage backend configuration.
    #[serde(default)]
    pub storage: StorageConfig,
}
