//! Heatmap-ready matrices and the all-pairs overview.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

use super::engine::{ComparisonEngine, LabeledMatrix};
use super::ranking::RankingProbabilities;

/// Labelled rows × cols numeric table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapMatrix {
    pub title: String,
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Sparse form: zero cells are omitted and read back as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapTriplets {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub data: Vec<(usize, usize, f64)>,
}

impl HeatmapMatrix {
    /// Converts to `{rows, cols, data: [[r, c, v]]}`.
    pub fn to_triplets(&self) -> HeatmapTriplets {
        let data = self
            .values
            .iter()
            .enumerate()
            .flat_map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(move |(c, v)| (r, c, *v))
            })
            .collect();
        HeatmapTriplets {
            rows: self.rows.clone(),
            cols: self.cols.clone(),
            data,
        }
    }
}

impl HeatmapTriplets {
    /// Expands back to a dense matrix.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.cols.len()]; self.rows.len()];
        for &(r, c, v) in &self.data {
            if let Some(cell) = dense.get_mut(r).and_then(|row| row.get_mut(c)) {
                *cell = v;
            }
        }
        dense
    }
}

/// DA for every ordered pair and mean SMD for every ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseOverview {
    pub labels: Vec<String>,
    /// `probabilities[i][j][factor]`; zeros on the diagonal.
    pub probabilities: Vec<Vec<Vec<f64>>>,
    /// `smd_values[i][j]`; zeros on the diagonal.
    pub smd_values: Vec<Vec<f64>>,
}

fn factor_names(alternatives: &[LabeledMatrix<'_>]) -> Vec<String> {
    alternatives
        .first()
        .map(|a| a.matrix.factors().to_vec())
        .unwrap_or_default()
}

impl ComparisonEngine {
    /// One row "A > B" per pair i < j, one column per factor, DA values.
    pub fn discernibility_heatmap(
        &self,
        alternatives: &[LabeledMatrix<'_>],
    ) -> Result<HeatmapMatrix, DomainError> {
        let report = self.discernibility_analysis(alternatives)?;
        Ok(HeatmapMatrix {
            title: "Discernibility".to_string(),
            rows: report
                .comparisons
                .iter()
                .map(|c| format!("{} > {}", c.alt1, c.alt2))
                .collect(),
            cols: report.factors,
            values: report.comparisons.into_iter().map(|c| c.values).collect(),
        })
    }

    /// One row "A vs B" per ordered pair, SMD values.
    pub fn smd_heatmap(
        &self,
        alternatives: &[LabeledMatrix<'_>],
    ) -> Result<HeatmapMatrix, DomainError> {
        self.ordered_pair_heatmap("Standardized Mean Difference", "vs", alternatives, |l, r| {
            self.smd(l, r).map(|s| s.smd)
        })
    }

    /// One row "A / B" per ordered pair, HSM values.
    pub fn hsm_heatmap(
        &self,
        alternatives: &[LabeledMatrix<'_>],
    ) -> Result<HeatmapMatrix, DomainError> {
        self.ordered_pair_heatmap("Heijungs Significance", "/", alternatives, |l, r| self.hsm(l, r))
    }

    fn ordered_pair_heatmap<F>(
        &self,
        title: &str,
        separator: &str,
        alternatives: &[LabeledMatrix<'_>],
        metric: F,
    ) -> Result<HeatmapMatrix, DomainError>
    where
        F: for<'x> Fn(LabeledMatrix<'x>, LabeledMatrix<'x>) -> Result<Vec<f64>, DomainError>,
    {
        self.trimmed_rows(alternatives)?;
        let mut rows = Vec::new();
        let mut values = Vec::new();
        for (i, left) in alternatives.iter().enumerate() {
            for (j, right) in alternatives.iter().enumerate() {
                if i == j {
                    continue;
                }
                rows.push(format!("{} {} {}", left.label, separator, right.label));
                values.push(metric(*left, *right)?);
            }
        }
        Ok(HeatmapMatrix {
            title: title.to_string(),
            rows,
            cols: factor_names(alternatives),
            values,
        })
    }

    /// Rows are alternatives, columns are ranks.
    pub fn ranking_heatmap(&self, ranking: &RankingProbabilities) -> HeatmapMatrix {
        HeatmapMatrix {
            title: "Ranking Probabilities".to_string(),
            rows: ranking.alternatives.clone(),
            cols: (1..=ranking.alternatives.len())
                .map(|r| format!("Rank {}", r))
                .collect(),
            values: ranking.probabilities.clone(),
        }
    }

    /// DA and mean SMD for every ordered pair.
    pub fn pairwise_overview(
        &self,
        alternatives: &[LabeledMatrix<'_>],
    ) -> Result<PairwiseOverview, DomainError> {
        self.trimmed_rows(alternatives)?;
        let n = alternatives.len();
        let factors = factor_names(alternatives).len();
        let mut probabilities = vec![vec![vec![0.0; factors]; n]; n];
        let mut smd_values = vec![vec![0.0; n]; n];

        for (i, left) in alternatives.iter().enumerate() {
            for (j, right) in alternatives.iter().enumerate() {
                if i == j {
                    continue;
                }
                probabilities[i][j] = self.discernibility(*left, *right)?;
                smd_values[i][j] = self.smd(*left, *right)?.mean_smd();
            }
        }

        Ok(PairwiseOverview {
            labels: alternatives.iter().map(|a| a.label.to_string()).collect(),
            probabilities,
            smd_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comparison::RankingBasis;
    use crate::domain::simulation::SimulationMatrix;

    fn matrix(columns: Vec<Vec<f64>>) -> SimulationMatrix {
        let factors = (0..columns.len()).map(|j| format!("f{}", j)).collect();
        SimulationMatrix::from_columns(factors, columns).unwrap()
    }

    #[test]
    fn discernibility_rows_are_labelled_pairs() {
        let a = matrix(vec![vec![1.0, 2.0], vec![5.0, 5.0]]);
        let b = matrix(vec![vec![3.0, 4.0], vec![1.0, 1.0]]);
        let heatmap = ComparisonEngine::default()
            .discernibility_heatmap(&[("A", &a).into(), ("B", &b).into()])
            .unwrap();
        assert_eq!(heatmap.rows, vec!["A > B"]);
        assert_eq!(heatmap.cols, vec!["f0", "f1"]);
        assert_eq!(heatmap.values, vec![vec![1.0, 0.0]]);
    }

    #[test]
    fn triplets_skip_zero_cells_and_round_trip() {
        let heatmap = HeatmapMatrix {
            title: "t".into(),
            rows: vec!["r0".into(), "r1".into()],
            cols: vec!["c0".into(), "c1".into()],
            values: vec![vec![0.0, 0.25], vec![1.0, 0.0]],
        };
        let triplets = heatmap.to_triplets();
        assert_eq!(triplets.data, vec![(0, 1, 0.25), (1, 0, 1.0)]);
        assert_eq!(triplets.to_dense(), heatmap.values);

        let json = serde_json::to_value(&triplets).unwrap();
        assert_eq!(json["data"][0], serde_json::json!([0, 1, 0.25]));
    }

    #[test]
    fn smd_heatmap_has_every_ordered_pair() {
        let a = matrix(vec![vec![1.0, 2.0, 4.0]]);
        let b = matrix(vec![vec![2.0, 2.0, 1.0]]);
        let heatmap = ComparisonEngine::default()
            .smd_heatmap(&[("A", &a).into(), ("B", &b).into()])
            .unwrap();
        assert_eq!(heatmap.rows, vec!["A vs B", "B vs A"]);
        assert_eq!(heatmap.values[0][0], -heatmap.values[1][0]);
    }

    #[test]
    fn ranking_heatmap_uses_rank_columns() {
        let a = matrix(vec![vec![1.0]]);
        let b = matrix(vec![vec![2.0]]);
        let engine = ComparisonEngine::default();
        let ranking = engine
            .ranking_probabilities(&[("A", &a).into(), ("B", &b).into()], &RankingBasis::Total)
            .unwrap();
        let heatmap = engine.ranking_heatmap(&ranking);
        assert_eq!(heatmap.cols, vec!["Rank 1", "Rank 2"]);
        assert_eq!(heatmap.values, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn overview_diagonal_is_zero() {
        let a = matrix(vec![vec![1.0, 2.0, 3.0]]);
        let b = matrix(vec![vec![3.0, 1.0, 2.0]]);
        let overview = ComparisonEngine::default()
            .pairwise_overview(&[("A", &a).into(), ("B", &b).into()])
            .unwrap();
        assert_eq!(overview.labels, vec!["A", "B"]);
        assert_eq!(overview.probabilities[0][0], vec![0.0]);
        assert_eq!(overview.smd_values[1][1], 0.0);
        assert!((overview.probabilities[0][1][0] + overview.probabilities[1][0][0] - 1.0).abs() < 1e-12);
    }
}
