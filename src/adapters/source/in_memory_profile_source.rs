//! In-Memory Profile Source Adapter
//!
//! Serves a profile table held in memory. Used when profiles arrive embedded
//! in a scenario, and in tests.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::profile::ImpactProfileTable;
use crate::ports::{ProfileSource, SourceError};

/// In-memory profile table
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileSource {
    table: Arc<RwLock<ImpactProfileTable>>,
}

impl InMemoryProfileSource {
    /// Create a source serving `table`
    pub fn new(table: ImpactProfileTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }

    /// Replace the served table
    pub async fn replace(&self, table: ImpactProfileTable) {
        *self.table.write().await = table;
    }
}

#[async_trait]
impl ProfileSource for InMemoryProfileSource {
    async fn load_profiles(&self) -> Result<ImpactProfileTable, SourceError> {
        Ok(self.table.read().await.clone())
    }
}
