//! Heijungs significance metric and the mean-separation overview.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::domain::foundation::DomainError;

use super::engine::{
    check_factors, check_unique_labels, require_rows, ComparisonEngine, LabeledMatrix,
};

/// HSM in both directions for one pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeijungsResult {
    pub alt1: String,
    pub alt2: String,
    pub factors: Vec<String>,
    pub threshold: f64,
    /// Share of draws where alt1 / alt2 > 1 + λ.
    pub forward: Vec<f64>,
    /// Share of draws where alt2 / alt1 > 1 + λ.
    pub backward: Vec<f64>,
}

/// Mean separation index for every ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeijungsOverview {
    pub heijungs_metrics: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Share of draws whose ratio a/b exceeds 1 + λ.
///
/// A zero divisor counts as exceeding when the numerator is positive.
fn exceed_share(a: &[f64], b: &[f64], lambda: f64) -> f64 {
    let bound = 1.0 + lambda;
    let hits = a
        .iter()
        .zip(b)
        .filter(|(x, y)| if **y == 0.0 { **x > 0.0 } else { *x / *y > bound })
        .count();
    hits as f64 / a.len() as f64
}

impl ComparisonEngine {
    /// HSM of `left` over `right` with the configured λ.
    ///
    /// # Errors
    /// - `ShapeMismatch` for different factors, or different draw counts under strict alignment
    /// - `InvalidParameter` if there are no paired draws
    pub fn hsm<'a>(
        &self,
        left: impl Into<LabeledMatrix<'a>>,
        right: impl Into<LabeledMatrix<'a>>,
    ) -> Result<Vec<f64>, DomainError> {
        let (left, right) = (left.into(), right.into());
        let rows = self.paired_rows(left, right)?;
        require_rows(rows, 1, left, right)?;
        let lambda = self.settings().indifference_threshold;

        Ok((0..left.matrix.factor_count())
            .map(|j| {
                exceed_share(
                    &left.matrix.column(j)[..rows],
                    &right.matrix.column(j)[..rows],
                    lambda,
                )
            })
            .collect())
    }

    /// HSM in both directions.
    pub fn heijungs<'a>(
        &self,
        left: impl Into<LabeledMatrix<'a>>,
        right: impl Into<LabeledMatrix<'a>>,
    ) -> Result<HeijungsResult, DomainError> {
        let (left, right) = (left.into(), right.into());
        Ok(HeijungsResult {
            alt1: left.label.to_string(),
            alt2: right.label.to_string(),
            factors: left.matrix.factors().to_vec(),
            threshold: self.settings().indifference_threshold,
            forward: self.hsm(left, right)?,
            backward: self.hsm(right, left)?,
        })
    }

    /// Mean over factors of (mean₁ − mean₂) / √(var₁ + var₂).
    ///
    /// Draws need not be paired. A factor with zero pooled variance contributes 0;
    /// a matrix with a single draw has zero variance.
    ///
    /// # Errors
    /// - `ShapeMismatch` if factor lists differ
    /// - `InvalidParameter` if either matrix has no draws
    pub fn mean_separation_index<'a>(
        &self,
        left: impl Into<LabeledMatrix<'a>>,
        right: impl Into<LabeledMatrix<'a>>,
    ) -> Result<f64, DomainError> {
        let (left, right) = (left.into(), right.into());
        check_factors(left, right)?;
        require_rows(left.matrix.draws().min(right.matrix.draws()), 1, left, right)?;

        let factor_count = left.matrix.factor_count();
        let total: f64 = (0..factor_count)
            .map(|j| {
                let (a, b) = (left.matrix.column(j), right.matrix.column(j));
                let spread = (sample_variance(a) + sample_variance(b)).sqrt();
                if spread > 0.0 && spread.is_finite() {
                    (a.iter().mean() - b.iter().mean()) / spread
                } else {
                    0.0
                }
            })
            .sum();
        Ok(total / factor_count as f64)
    }

    /// Mean separation index for every ordered pair of distinct alternatives.
    ///
    /// # Errors
    /// `InvalidParameter` if a label repeats, plus the errors of `mean_separation_index`.
    pub fn heijungs_overview(
        &self,
        alternatives: &[LabeledMatrix<'_>],
    ) -> Result<HeijungsOverview, DomainError> {
        check_unique_labels(alternatives)?;
        let mut metrics = BTreeMap::new();
        for (i, left) in alternatives.iter().enumerate() {
            let mut row = BTreeMap::new();
            for (j, right) in alternatives.iter().enumerate() {
                if i != j {
                    row.insert(
                        right.label.to_string(),
                        self.mean_separation_index(*left, *right)?,
                    );
                }
            }
            metrics.insert(left.label.to_string(), row);
        }
        Ok(HeijungsOverview {
            heijungs_metrics: metrics,
        })
    }
}

fn sample_variance(draws: &[f64]) -> f64 {
    if draws.len() > 1 {
        draws.iter().variance()
    } else {
        0.0
    }
}
