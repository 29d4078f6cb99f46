//! Per-factor uncertainty summaries.

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::domain::simulation::SimulationMatrix;

use super::engine::ComparisonEngine;

/// Location and spread of one factor's draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncertaintySummary {
    pub factor: String,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
}

impl UncertaintySummary {
    /// Summarizes one vector of draws. `None` when there are no draws.
    pub fn from_draws(factor: impl Into<String>, draws: &[f64]) -> Option<Self> {
        if draws.is_empty() {
            return None;
        }
        let mean = draws.iter().mean();
        let std = if draws.len() > 1 { draws.iter().std_dev() } else { 0.0 };
        let mut data = Data::new(draws.to_vec());

        Some(Self {
            factor: factor.into(),
            mean,
            median: data.median(),
            std,
            p5: data.percentile(5),
            p25: data.percentile(25),
            p75: data.percentile(75),
            p95: data.percentile(95),
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

impl ComparisonEngine {
    /// Summary of every factor of a matrix.
    pub fn summarize(&self, matrix: &SimulationMatrix) -> Vec<UncertaintySummary> {
        matrix
            .factors()
            .iter()
            .enumerate()
            .filter_map(|(j, name)| UncertaintySummary::from_draws(name.clone(), matrix.column(j)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_values() {
        let draws: Vec<f64> = (1..=101).map(f64::from).collect();
        let summary = UncertaintySummary::from_draws("x", &draws).unwrap();
        assert_eq!(summary.mean, 51.0);
        assert_eq!(summary.median, 51.0);
        assert!(summary.p5 < summary.p25);
        assert!(summary.p25 < summary.median);
        assert!(summary.median < summary.p75);
        assert!(summary.p75 < summary.p95);
        assert!(summary.iqr() > 0.0);
    }

    #[test]
    fn single_draw_has_zero_spread() {
        let summary = UncertaintySummary::from_draws("x", &[4.0]).unwrap();
        assert_eq!(summary.std, 0.0);
        assert_eq!(summary.median, 4.0);
    }

    #[test]
    fn empty_draws_have_no_summary() {
        assert!(UncertaintySummary::from_draws("x", &[]).is_none());
    }

    #[test]
    fn summarize_covers_every_factor() {
        let m = SimulationMatrix::from_columns(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0]],
        )
        .unwrap();
        let summaries = ComparisonEngine::default().summarize(&m);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].std, 0.0);
        assert_eq!(summaries[0].median, 2.0);
    }
}
