//! `lca-uncertainty <scenario.{json,yaml}>`
//!
//! Simulates every alternative of a scenario, compares them and runs the
//! requested sensitivity analyses. The report is printed to stdout as JSON;
//! logs go to stderr.

use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*};

use lca_uncertainty::adapters::{FileProfileSource, FileScenarioSource, InMemoryProfileSource};
use lca_uncertainty::application::{
    CompareAlternativesCommand, CompareAlternativesHandler, ComparisonReport,
    RunSensitivityCommand, RunSensitivityHandler, SimulateAlternativesCommand,
    SimulateAlternativesHandler,
};
use lca_uncertainty::config::{AppConfig, LoggingConfig};
use lca_uncertainty::domain::comparison::ComparisonEngine;
use lca_uncertainty::domain::foundation::RunId;
use lca_uncertainty::domain::sensitivity::{SensitivityRecord, SensitivityReport, SensitivityTarget};
use lca_uncertainty::domain::simulation::AlternativeSimulation;
use lca_uncertainty::ports::{ProfileSource, ScenarioSource, SourceError};

#[derive(Serialize)]
struct RunReport {
    run_id: RunId,
    scenario: Option<String>,
    seed: u64,
    draws: usize,
    simulations: Vec<AlternativeSimulation>,
    comparison: ComparisonReport,
    sensitivity: Vec<SensitivityEntry>,
}

#[derive(Serialize)]
struct SensitivityEntry {
    #[serde(flatten)]
    report: SensitivityReport,
    top: Vec<SensitivityRecord>,
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn Error>> {
    let filter = logging.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

async fn run(scenario_path: PathBuf) -> Result<RunReport, Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.logging)?;

    let scenario = FileScenarioSource::new(&scenario_path).load_scenario().await?;

    let profiles: Arc<dyn ProfileSource> = match (&scenario.profiles, &scenario.profiles_path) {
        (Some(table), _) => Arc::new(InMemoryProfileSource::new(table.clone())),
        (None, Some(path)) => Arc::new(FileProfileSource::new(path)),
        (None, None) => {
            return Err(SourceError::Invalid("scenario has no profiles".to_string()).into())
        }
    };

    let settings = config.engine_settings()?;
    let lives = scenario.service_life_table(settings.renewal.lives())?;
    let fallback = config.profiles.fallback_policy();
    let ctx = config
        .simulation
        .run_context(scenario.draws, scenario.seed)?;

    info!(
        run_id = %ctx.run_id,
        scenario = %scenario_path.display(),
        alternatives = scenario.alternatives.len(),
        draws = ctx.draws,
        seed = ctx.seed,
        "Starting analysis run"
    );

    // 1. Simulate every alternative
    let simulated = SimulateAlternativesHandler::new(profiles.clone(), settings.clone(), fallback)
        .handle(
            SimulateAlternativesCommand {
                alternatives: scenario.alternatives.clone(),
                service_life: scenario.service_life,
                categories: scenario.categories.clone(),
                service_lives: Some(lives.clone()),
            },
            ctx.clone(),
        )
        .await?;

    // 2. Compare them
    let comparison = CompareAlternativesHandler::new(ComparisonEngine::new(config.comparison.settings())?)
        .handle(
            CompareAlternativesCommand {
                simulations: simulated.simulations.clone(),
                ranking_basis: scenario.ranking_basis.clone(),
                include_drd: false,
                include_heatmaps: true,
            },
            &ctx,
        )?;

    // 3. Sensitivity for the flagged alternatives
    let sensitivity_handler = RunSensitivityHandler::new(profiles, settings, fallback);
    let fraction = config.sensitivity.fraction()?;
    let mut sensitivity = Vec::with_capacity(scenario.sensitivity.len());
    for name in &scenario.sensitivity {
        let alternative = scenario
            .alternative(name)
            .cloned()
            .ok_or_else(|| SourceError::Invalid(format!("unknown alternative '{}'", name)))?;
        let result = sensitivity_handler
            .handle(
                RunSensitivityCommand {
                    alternative,
                    service_life: scenario.service_life,
                    fraction,
                    target: SensitivityTarget::MeanRowTotal,
                    categories: scenario.categories.clone(),
                    service_lives: Some(lives.clone()),
                },
                ctx.clone(),
            )
            .await?;
        let top = result.report.top(config.sensitivity.top_n).to_vec();
        sensitivity.push(SensitivityEntry {
            report: result.report,
            top,
        });
    }

    Ok(RunReport {
        run_id: ctx.run_id,
        scenario: scenario.name,
        seed: ctx.seed,
        draws: ctx.draws,
        simulations: simulated.simulations,
        comparison,
        sensitivity,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let Some(scenario_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("usage: lca-uncertainty <scenario.json|scenario.yaml>");
        return ExitCode::from(2);
    };

    match run(scenario_path).await {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("failed to serialize report: {}", e);
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(error = %e, "Analysis run failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
