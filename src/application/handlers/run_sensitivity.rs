//! RunSensitivityHandler - One-at-a-time sensitivity analysis of one alternative.

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::domain::foundation::{DomainError, ImpactCategory, RunId};
use crate::domain::profile::FallbackPolicy;
use crate::domain::sensitivity::{
    BaseState, PerturbationFraction, SensitivityAnalyzer, SensitivityReport, SensitivityTarget,
};
use crate::domain::simulation::{
    AlternativeSpec, EngineSettings, RunContext, ServiceLifeParams, ServiceLifeTable,
};
use crate::ports::ProfileSource;

use super::engine_factory::{task_failed, EngineFactory};

/// Command to analyse one alternative's parameters.
#[derive(Debug, Clone)]
pub struct RunSensitivityCommand {
    pub alternative: AlternativeSpec,
    pub service_life: ServiceLifeParams,
    pub fraction: PerturbationFraction,
    pub target: SensitivityTarget,
    pub categories: Option<Vec<ImpactCategory>>,
    pub service_lives: Option<ServiceLifeTable>,
}

/// Result of a sensitivity run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSensitivityResult {
    pub run_id: RunId,
    pub seed: u64,
    pub report: SensitivityReport,
}

/// Handler for sensitivity analyses.
pub struct RunSensitivityHandler {
    factory: EngineFactory,
}

impl RunSensitivityHandler {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        settings: EngineSettings,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            factory: EngineFactory::new(profiles, settings, fallback),
        }
    }

    /// Runs the baseline and every trial with the seed of `ctx`.
    pub async fn handle(
        &self,
        cmd: RunSensitivityCommand,
        ctx: RunContext,
    ) -> Result<RunSensitivityResult, DomainError> {
        // 1. Validate the base state before loading anything
        let base = BaseState::new(cmd.alternative, cmd.service_life)?;

        // 2. Build a fresh engine for this run
        let engine = self.factory.build(cmd.categories, cmd.service_lives).await?;
        engine
            .module_plan(base.alternative())
            .log_gaps(&base.alternative().name);

        // 3. Run baseline and trials off the async runtime
        let run_id = ctx.run_id;
        let seed = ctx.seed;
        let started_at = ctx.started_at;
        let target = cmd.target;
        let fraction = cmd.fraction;
        let report = tokio::task::spawn_blocking(move || {
            SensitivityAnalyzer::new(&engine, target).run(&base, fraction, &ctx)
        })
        .await
        .map_err(task_failed)??;

        info!(
            run_id = %run_id,
            alternative = %report.alternative,
            baseline = report.baseline,
            elapsed_ms = started_at.elapsed_ms(),
            most_influential = report.records.first().map(|r| r.parameter.as_str()).unwrap_or("-"),
            "Sensitivity analysis complete"
        );

        Ok(RunSensitivityResult {
            run_id,
            seed,
            report,
        })
    }
}
