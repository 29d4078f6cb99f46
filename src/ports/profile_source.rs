//! Profile Source Port - Where raw impact statistics come from.

use async_trait::async_trait;

use crate::domain::profile::ImpactProfileTable;

use super::SourceError;

/// Port for loading the per-material impact statistics of one run.
///
/// Loading completes before the pipeline starts; the core only ever sees the
/// returned in-memory table.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Load the profile table.
    ///
    /// # Errors
    /// Returns `SourceError` if the table cannot be read or parsed.
    async fn load_profiles(&self) -> Result<ImpactProfileTable, SourceError>;
}
