//! Standardized mean difference of paired draws.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::domain::foundation::DomainError;

use super::engine::{require_rows, ComparisonEngine, LabeledMatrix};

/// SMD and its standard error per factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmdResult {
    pub alt1: String,
    pub alt2: String,
    pub factors: Vec<String>,
    #[serde(rename = "SMD")]
    pub smd: Vec<f64>,
    #[serde(rename = "StdError")]
    pub std_error: Vec<f64>,
}

impl SmdResult {
    /// Mean SMD over factors.
    pub fn mean_smd(&self) -> f64 {
        if self.smd.is_empty() {
            0.0
        } else {
            self.smd.iter().sum::<f64>() / self.smd.len() as f64
        }
    }
}

impl ComparisonEngine {
    /// mean(d) / std(d) with d = left − right per draw, using the sample std.
    ///
    /// A zero (or non-finite) std gives SMD 0. The standard error is std(d)/√n.
    /// A single paired draw has no sample std, so it gives SMD 0 and StdError 0.
    ///
    /// # Errors
    /// - `ShapeMismatch` for different factors, or different draw counts under strict alignment
    /// - `InvalidParameter` when there is no paired draw
    pub fn smd<'a>(
        &self,
        left: impl Into<LabeledMatrix<'a>>,
        right: impl Into<LabeledMatrix<'a>>,
    ) -> Result<SmdResult, DomainError> {
        let (left, right) = (left.into(), right.into());
        let rows = self.paired_rows(left, right)?;
        require_rows(rows, 1, left, right)?;

        let factor_count = left.matrix.factor_count();
        let mut smd = Vec::with_capacity(factor_count);
        let mut std_error = Vec::with_capacity(factor_count);

        for j in 0..factor_count {
            let diff: Vec<f64> = left.matrix.column(j)[..rows]
                .iter()
                .zip(&right.matrix.column(j)[..rows])
                .map(|(a, b)| a - b)
                .collect();
            let mean = diff.iter().mean();
            let std = if rows > 1 { diff.iter().std_dev() } else { 0.0 };

            if std > 0.0 && std.is_finite() {
                smd.push(mean / std);
                std_error.push(std / (rows as f64).sqrt());
            } else {
                smd.push(0.0);
                std_error.push(0.0);
            }
        }

        Ok(SmdResult {
            alt1: left.label.to_string(),
            alt2: right.label.to_string(),
            factors: left.matrix.factors().to_vec(),
            smd,
            std_error,
        })
    }
}
