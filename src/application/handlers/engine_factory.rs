//! EngineFactory - Builds one simulation engine per run.

use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::{DomainError, ErrorCode, ImpactCategory};
use crate::domain::profile::{FallbackPolicy, ImpactProfileStore};
use crate::domain::simulation::{EngineSettings, ServiceLifeTable, SimulationEngine};
use crate::ports::ProfileSource;

/// Loads profiles and assembles a fresh engine for every run.
///
/// Nothing built here outlives the run it was built for.
#[derive(Clone)]
pub struct EngineFactory {
    profiles: Arc<dyn ProfileSource>,
    settings: EngineSettings,
    fallback: FallbackPolicy,
}

impl EngineFactory {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        settings: EngineSettings,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            profiles,
            settings,
            fallback,
        }
    }

    /// Builds an engine over freshly loaded profiles.
    ///
    /// Categories default to those present in the profile table, or the EF 3.0
    /// list for an empty table. `lives` replaces the expected-life table.
    pub async fn build(
        &self,
        categories: Option<Vec<ImpactCategory>>,
        lives: Option<ServiceLifeTable>,
    ) -> Result<SimulationEngine, DomainError> {
        let table = self.profiles.load_profiles().await?;

        let categories = categories
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| table.categories());
        let categories = if categories.is_empty() {
            ImpactCategory::defaults().to_vec()
        } else {
            categories
        };

        let store = ImpactProfileStore::from_table(&table, categories, self.fallback)?;
        info!(
            materials = store.material_count(),
            categories = store.categories().len(),
            fallback = self.fallback.is_enabled(),
            "Built impact profile store"
        );

        let mut settings = self.settings.clone();
        if let Some(lives) = lives {
            settings.renewal = settings.renewal.with_lives(lives);
        }
        Ok(SimulationEngine::new(store, settings))
    }
}

/// Maps a failed blocking task to an internal error.
pub(crate) fn task_failed(err: tokio::task::JoinError) -> DomainError {
    DomainError::new(
        ErrorCode::InternalError,
        format!("Simulation task failed: {}", err),
    )
}
