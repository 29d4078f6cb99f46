//! CompareAlternativesHandler - Statistical comparison of simulated alternatives.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::comparison::{
    ComparisonEngine, DiscernibilityReport, DrdResult, HeatmapTriplets, HeijungsOverview,
    HeijungsResult, LabeledMatrix, PairwiseOverview, RankingBasis, RankingProbabilities,
    SmdResult, UncertaintySummary,
};
use crate::domain::foundation::{DomainError, RunId};
use crate::domain::simulation::{AlternativeSimulation, RunContext};

/// Command to compare simulated alternatives.
#[derive(Debug, Clone)]
pub struct CompareAlternativesCommand {
    pub simulations: Vec<AlternativeSimulation>,
    pub ranking_basis: RankingBasis,
    /// Include the per-draw relative differences of every pair.
    pub include_drd: bool,
    /// Include sparse heatmaps of every metric.
    pub include_heatmaps: bool,
}

impl CompareAlternativesCommand {
    pub fn new(simulations: Vec<AlternativeSimulation>) -> Self {
        Self {
            simulations,
            ranking_basis: RankingBasis::default(),
            include_drd: false,
            include_heatmaps: false,
        }
    }
}

/// Sparse heatmaps of every metric.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonHeatmaps {
    pub discernibility: HeatmapTriplets,
    pub smd: HeatmapTriplets,
    pub hsm: HeatmapTriplets,
    pub ranking: HeatmapTriplets,
}

/// All comparison metrics of one run. Pairwise lists cover pairs i < j in input order.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub run_id: RunId,
    pub alternatives: Vec<String>,
    pub summaries: BTreeMap<String, Vec<UncertaintySummary>>,
    pub discernibility: DiscernibilityReport,
    pub smd: Vec<SmdResult>,
    pub heijungs: Vec<HeijungsResult>,
    pub heijungs_overview: HeijungsOverview,
    pub ranking: RankingProbabilities,
    pub overview: PairwiseOverview,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drd: Option<Vec<DrdResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmaps: Option<ComparisonHeatmaps>,
}

/// Handler for comparing alternatives.
///
/// Pure computation over Row Total matrices; no ports are involved.
pub struct CompareAlternativesHandler {
    engine: ComparisonEngine,
}

impl CompareAlternativesHandler {
    pub fn new(engine: ComparisonEngine) -> Self {
        Self { engine }
    }

    pub fn handle(
        &self,
        cmd: CompareAlternativesCommand,
        ctx: &RunContext,
    ) -> Result<ComparisonReport, DomainError> {
        if cmd.simulations.is_empty() {
            return Err(DomainError::invalid_parameter(
                "alternatives",
                "At least one simulated alternative is required",
            ));
        }

        let labeled: Vec<LabeledMatrix<'_>> = cmd
            .simulations
            .iter()
            .map(|s| LabeledMatrix::new(&s.alternative, &s.row_total))
            .collect();

        let summaries = labeled
            .iter()
            .map(|l| (l.label.to_string(), self.engine.summarize(l.matrix)))
            .collect();

        let mut smd = Vec::new();
        let mut heijungs = Vec::new();
        let mut drd = Vec::new();
        for (i, left) in labeled.iter().enumerate() {
            for right in &labeled[i + 1..] {
                smd.push(self.engine.smd(*left, *right)?);
                heijungs.push(self.engine.heijungs(*left, *right)?);
                if cmd.include_drd {
                    drd.push(self.engine.drd(*left, *right)?);
                }
            }
        }

        let ranking = self.engine.ranking_probabilities(&labeled, &cmd.ranking_basis)?;

        let heatmaps = if cmd.include_heatmaps {
            Some(ComparisonHeatmaps {
                discernibility: self.engine.discernibility_heatmap(&labeled)?.to_triplets(),
                smd: self.engine.smd_heatmap(&labeled)?.to_triplets(),
                hsm: self.engine.hsm_heatmap(&labeled)?.to_triplets(),
                ranking: self.engine.ranking_heatmap(&ranking).to_triplets(),
            })
        } else {
            None
        };

        debug!(
            run_id = %ctx.run_id,
            alternatives = labeled.len(),
            pairs = smd.len(),
            "Comparison complete"
        );

        Ok(ComparisonReport {
            run_id: ctx.run_id,
            alternatives: labeled.iter().map(|l| l.label.to_string()).collect(),
            summaries,
            discernibility: self.engine.discernibility_analysis(&labeled)?,
            smd,
            heijungs,
            heijungs_overview: self.engine.heijungs_overview(&labeled)?,
            ranking,
            overview: self.engine.pairwise_overview(&labeled)?,
            drd: cmd.include_drd.then_some(drd),
            heatmaps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::ComparisonSettings;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::profile::{FallbackPolicy, ImpactProfileStore};
    use crate::domain::simulation::{
        AlternativeSpec, ComponentQuantities, EngineSettings, ServiceLifeParams, SimulationEngine,
    };

    fn simulations() -> Vec<AlternativeSimulation> {
        simulations_with_draws(200)
    }

    fn simulations_with_draws(draws: usize) -> Vec<AlternativeSimulation> {
        let store = ImpactProfileStore::builder()
            .categories(vec!["Climate change", "Water use"])
            .profile("Hemp", "Climate change", 5.0, 1.0)
            .profile("Hemp", "Water use", 2.0, 0.4)
            .profile("Concrete", "Climate change", 3.0, 0.6)
            .profile("Concrete", "Water use", 1.0, 0.2)
            .fallback(FallbackPolicy::Disabled)
            .build()
            .unwrap();
        let engine = SimulationEngine::new(store, EngineSettings::default());
        let ctx = RunContext::new(draws, Some(5)).unwrap();
        let service_life = ServiceLifeParams::new(50.0, 5.0).unwrap();

        [("Hemp", 10.0), ("Concrete", 4.0), ("Mixed", 6.0)]
            .iter()
            .enumerate()
            .map(|(stream, (name, q))| {
                let material: &str = if *name == "Mixed" { "Hemp" } else { *name };
                let spec = AlternativeSpec::new(
                    *name,
                    ComponentQuantities::from_pairs(&[(material, *q)]).unwrap(),
                )
                .unwrap();
                engine.simulate(&spec, &service_life, &ctx, stream as u64).unwrap()
            })
            .collect()
    }

    fn handler() -> CompareAlternativesHandler {
        CompareAlternativesHandler::new(ComparisonEngine::new(ComparisonSettings::default()).unwrap())
    }

    #[test]
    fn single_draw_run_still_compares() {
        let ctx = RunContext::new(1, Some(1)).unwrap();
        let report = handler()
            .handle(CompareAlternativesCommand::new(simulations_with_draws(1)), &ctx)
            .unwrap();

        assert_eq!(report.smd.len(), 3);
        for result in &report.smd {
            assert_eq!(result.smd, vec![0.0, 0.0]);
            assert_eq!(result.std_error, vec![0.0, 0.0]);
        }
        assert!(report
            .heijungs_overview
            .heijungs_metrics
            .values()
            .flat_map(|row| row.values())
            .all(|v| v.is_finite()));
    }

    #[test]
    fn repeated_alternative_name_is_rejected() {
        let mut sims = simulations();
        sims[2].alternative = "Hemp".to_string();
        let ctx = RunContext::new(1, Some(1)).unwrap();

        let err = handler()
            .handle(CompareAlternativesCommand::new(sims), &ctx)
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidParameter);
        assert_eq!(err.detail("label"), Some("Hemp"));
    }

    #[test]
    fn report_covers_every_pair() {
        let ctx = RunContext::new(1, Some(1)).unwrap();
        let report = handler()
            .handle(CompareAlternativesCommand::new(simulations()), &ctx)
            .unwrap();

        assert_eq!(report.run_id, ctx.run_id);
        assert_eq!(report.alternatives, vec!["Hemp", "Concrete", "Mixed"]);
        assert_eq!(report.discernibility.comparisons.len(), 3);
        assert_eq!(report.smd.len(), 3);
        assert_eq!(report.heijungs.len(), 3);
        assert_eq!(report.summaries["Hemp"].len(), 2);
        assert!(report.drd.is_none());
        assert!(report.heatmaps.is_none());

        // Concrete (12 + 4) is well below Hemp (50 + 20) in every draw.
        assert_eq!(report.ranking.probability("Concrete", 1), Some(1.0));
    }

    #[test]
    fn optional_sections_are_included_on_request() {
        let ctx = RunContext::new(1, Some(1)).unwrap();
        let cmd = CompareAlternativesCommand {
            include_drd: true,
            include_heatmaps: true,
            ..CompareAlternativesCommand::new(simulations())
        };
        let report = handler().handle(cmd, &ctx).unwrap();

        assert_eq!(report.drd.as_ref().map(Vec::len), Some(3));
        let heatmaps = report.heatmaps.unwrap();
        assert_eq!(heatmaps.smd.rows.len(), 6);
        assert_eq!(heatmaps.ranking.cols, vec!["Rank 1", "Rank 2", "Rank 3"]);
    }

    #[test]
    fn report_serializes() {
        let ctx = RunContext::new(1, Some(1)).unwrap();
        let report = handler()
            .handle(CompareAlternativesCommand::new(simulations()), &ctx)
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("drd").is_none());
        assert_eq!(json["ranking"]["house_ids"][0], "Hemp");
    }

    #[test]
    fn empty_command_is_rejected() {
        let ctx = RunContext::new(1, Some(1)).unwrap();
        let err = handler()
            .handle(CompareAlternativesCommand::new(vec![]), &ctx)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }
}
