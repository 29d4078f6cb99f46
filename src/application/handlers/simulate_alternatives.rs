//! SimulateAlternativesHandler - Monte Carlo simulation of every alternative.

use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::{DomainError, ImpactCategory, RunId};
use crate::domain::profile::FallbackPolicy;
use crate::domain::simulation::{
    AlternativeSimulation, AlternativeSpec, EngineSettings, RunContext, ServiceLifeParams,
    ServiceLifeTable,
};
use crate::ports::ProfileSource;

use super::engine_factory::{task_failed, EngineFactory};

/// Command to simulate a set of alternatives under one service life.
#[derive(Debug, Clone)]
pub struct SimulateAlternativesCommand {
    pub alternatives: Vec<AlternativeSpec>,
    pub service_life: ServiceLifeParams,
    pub categories: Option<Vec<ImpactCategory>>,
    pub service_lives: Option<ServiceLifeTable>,
}

/// Result of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulateAlternativesResult {
    pub run_id: RunId,
    pub seed: u64,
    pub simulations: Vec<AlternativeSimulation>,
}

/// Handler for simulating alternatives.
pub struct SimulateAlternativesHandler {
    factory: EngineFactory,
}

impl SimulateAlternativesHandler {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        settings: EngineSettings,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            factory: EngineFactory::new(profiles, settings, fallback),
        }
    }

    /// Simulates every alternative on its own random stream, in command order.
    pub async fn handle(
        &self,
        cmd: SimulateAlternativesCommand,
        ctx: RunContext,
    ) -> Result<SimulateAlternativesResult, DomainError> {
        if cmd.alternatives.is_empty() {
            return Err(DomainError::invalid_parameter(
                "alternatives",
                "At least one alternative is required",
            ));
        }

        // 1. Build a fresh engine for this run
        let engine = self.factory.build(cmd.categories, cmd.service_lives).await?;
        for alternative in &cmd.alternatives {
            engine.module_plan(alternative).log_gaps(&alternative.name);
        }

        // 2. Run the draws off the async runtime
        let run_id = ctx.run_id;
        let seed = ctx.seed;
        let started_at = ctx.started_at;
        let alternatives = cmd.alternatives;
        let service_life = cmd.service_life;
        let simulations = tokio::task::spawn_blocking(move || {
            alternatives
                .iter()
                .enumerate()
                .map(|(stream, alternative)| {
                    engine.simulate(alternative, &service_life, &ctx, stream as u64)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(task_failed)??;

        info!(
            run_id = %run_id,
            seed,
            alternatives = simulations.len(),
            elapsed_ms = started_at.elapsed_ms(),
            "Simulation run complete"
        );

        Ok(SimulateAlternativesResult {
            run_id,
            seed,
            simulations,
        })
    }
}
