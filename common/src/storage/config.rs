//! Storage backend configuration.

use serde::Deserialize;

/// Selects the storage backend.
///
/// Deserializes from a table tagged by `type`:
///
/// ```toml
/// [storage]
/// type = "InMemory"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum StorageConfig {
    /// Volatile `BTreeMap`-backed storage.
    #[default]
    InMemory,
}
