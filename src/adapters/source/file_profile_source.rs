//! File-based Profile Source Adapter
//!
//! Reads a profile table (material → category → {mean, std}) from a JSON or
//! YAML file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::domain::profile::ImpactProfileTable;
use crate::ports::{ProfileSource, SourceError};

use super::file_format::read_document;

/// Profile table stored on disk
#[derive(Debug, Clone)]
pub struct FileProfileSource {
    path: PathBuf,
}

impl FileProfileSource {
    /// Create a source reading `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ProfileSource for FileProfileSource {
    async fn load_profiles(&self) -> Result<ImpactProfileTable, SourceError> {
        let table: ImpactProfileTable = read_document(&self.path).await?;
        debug!(
            path = %self.path.display(),
            materials = table.material_count(),
            "Loaded impact profiles"
        );
        Ok(table)
    }
}
