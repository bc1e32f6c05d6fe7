//! Cached model form.
//!
//! A [`CachedModel`] keeps what downstream consumers need without the
//! symbolic pipeline: partition variable names and the three lowered
//! evaluators. Raw equations are not retained. Encoding is bincode.

use std::path::Path;

use crate::lower::{LowerError, ModelFunctions};
use crate::model::Model;
use crate::variable::Partition;

/// Error writing or reading a cached model.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error(transparent)]
    Lower(#[from] LowerError),
    #[error("failed to encode cached model: {0}")]
    Encode(bincode::Error),
    #[error("failed to decode cached model: {0}")]
    Decode(bincode::Error),
    #[error("cache file `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One partition of a cached model.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CachedPartition {
    pub partition: Partition,
    pub names: Vec<String>,
}

/// A model reduced to its evaluators.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CachedModel {
    pub partitions: Vec<CachedPartition>,
    pub functions: ModelFunctions,
}

impl CachedModel {
    /// Lower `model` and capture its partition names.
    pub fn from_model(model: &Model) -> Result<Self, CacheError> {
        let functions = model.functions()?;
        let partitions = Partition::ORDERED
            .iter()
            .map(|&partition| CachedPartition {
                partition,
                names: model
                    .partition(partition)
                    .iter()
                    .map(|&id| model.name(id).to_owned())
                    .collect(),
            })
            .collect();
        Ok(Self {
            partitions,
            functions,
        })
    }

    /// Variable names of `partition`, empty if absent.
    pub fn names(&self, partition: Partition) -> &[String] {
        self.partitions
            .iter()
            .find(|p| p.partition == partition)
            .map_or(&[][..], |p| &p.names)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        bincode::serialize(self).map_err(CacheError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CacheError> {
        bincode::deserialize(bytes).map_err(CacheError::Decode)
    }

    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote cached model");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CacheError> {
        let bytes = std::fs::read(path).map_err(|source| CacheError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}
