//! Ranking probabilities - how often each alternative takes each rank.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::foundation::DomainError;

use super::engine::{ComparisonEngine, LabeledMatrix};

/// What value alternatives are ranked by in each draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "basis", content = "factor", rename_all = "snake_case")]
pub enum RankingBasis {
    /// Sum over all factors of the draw.
    #[default]
    Total,
    /// One named factor.
    Factor(String),
}

/// Empirical frequency of one complete ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderingFrequency {
    /// Alternatives from lowest (rank 1) to highest.
    pub ordering: Vec<String>,
    pub probability: f64,
}

/// Probability of each alternative taking each rank (1 = lowest impact).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "RankingRepr")]
pub struct RankingProbabilities {
    pub alternatives: Vec<String>,
    pub basis: RankingBasis,
    pub draws: usize,
    /// `probabilities[alternative][rank - 1]`.
    pub probabilities: Vec<Vec<f64>>,
    /// Most frequent first.
    pub orderings: Vec<OrderingFrequency>,
}

#[derive(Debug, Clone, Serialize)]
struct RankingRepr {
    house_ids: Vec<String>,
    basis: RankingBasis,
    draws: usize,
    ranking_probabilities: BTreeMap<usize, BTreeMap<String, f64>>,
    orderings: Vec<OrderingFrequency>,
}

impl From<RankingProbabilities> for RankingRepr {
    fn from(ranking: RankingProbabilities) -> Self {
        let ranks = ranking.alternatives.len();
        let ranking_probabilities = (0..ranks)
            .map(|r| {
                let by_alternative = ranking
                    .alternatives
                    .iter()
                    .zip(&ranking.probabilities)
                    .map(|(name, probs)| (name.clone(), probs[r]))
                    .collect();
                (r + 1, by_alternative)
            })
            .collect();
        RankingRepr {
            house_ids: ranking.alternatives,
            basis: ranking.basis,
            draws: ranking.draws,
            ranking_probabilities,
            orderings: ranking.orderings,
        }
    }
}

impl RankingProbabilities {
    /// Probability that an alternative takes a rank (1-based).
    pub fn probability(&self, alternative: &str, rank: usize) -> Option<f64> {
        let i = self.alternatives.iter().position(|a| a == alternative)?;
        self.probabilities.get(i)?.get(rank.checked_sub(1)?).copied()
    }

    /// Expected rank of each alternative.
    pub fn expected_ranks(&self) -> Vec<f64> {
        self.probabilities
            .iter()
            .map(|probs| {
                probs
                    .iter()
                    .enumerate()
                    .map(|(r, p)| (r + 1) as f64 * p)
                    .sum()
            })
            .collect()
    }
}

impl ComparisonEngine {
    /// Ranks alternatives ascending in every draw and accumulates rank frequencies.
    ///
    /// Matrices are trimmed to their common draw count. Ties keep input order.
    ///
    /// # Errors
    /// - `ShapeMismatch` if factor lists differ
    /// - `InvalidParameter` for no alternatives, no draws or an unknown factor
    pub fn ranking_probabilities(
        &self,
        alternatives: &[LabeledMatrix<'_>],
        basis: &RankingBasis,
    ) -> Result<RankingProbabilities, DomainError> {
        let rows = self.trimmed_rows(alternatives)?;
        if rows == 0 {
            return Err(DomainError::invalid_parameter(
                "draws",
                "Ranking requires at least one draw",
            ));
        }

        let series: Vec<Vec<f64>> = alternatives
            .iter()
            .map(|alt| match basis {
                RankingBasis::Total => Ok(alt.matrix.row_sums()[..rows].to_vec()),
                RankingBasis::Factor(name) => alt
                    .matrix
                    .column_by_name(name)
                    .map(|c| c[..rows].to_vec())
                    .ok_or_else(|| {
                        DomainError::invalid_parameter(
                            "factor",
                            format!("Unknown ranking factor '{}'", name),
                        )
                    }),
            })
            .collect::<Result<_, _>>()?;

        let n = alternatives.len();
        let mut counts = vec![vec![0usize; n]; n];
        let mut ordering_counts: HashMap<Vec<usize>, usize> = HashMap::new();
        let mut order: Vec<usize> = (0..n).collect();

        for draw in 0..rows {
            order.sort_by(|&a, &b| series[a][draw].total_cmp(&series[b][draw]).then(a.cmp(&b)));
            for (rank, &alt) in order.iter().enumerate() {
                counts[alt][rank] += 1;
            }
            *ordering_counts.entry(order.clone()).or_insert(0) += 1;
        }

        let probabilities = counts
            .into_iter()
            .map(|row| row.into_iter().map(|c| c as f64 / rows as f64).collect())
            .collect();

        let mut orderings: Vec<(Vec<usize>, usize)> = ordering_counts.into_iter().collect();
        orderings.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let orderings = orderings
            .into_iter()
            .map(|(order, count)| OrderingFrequency {
                ordering: order.iter().map(|&i| alternatives[i].label.to_string()).collect(),
                probability: count as f64 / rows as f64,
            })
            .collect();

        Ok(RankingProbabilities {
            alternatives: alternatives.iter().map(|a| a.label.to_string()).collect(),
            basis: basis.clone(),
            draws: rows,
            probabilities,
            orderings,
        })
    }
}
