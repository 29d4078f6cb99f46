//! Distribution of relative differences.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;
use crate::domain::simulation::SimulationMatrix;

use super::engine::{require_rows, ComparisonEngine, LabeledMatrix};

/// Per-draw relative differences, with a summary per factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrdResult {
    pub alt1: String,
    pub alt2: String,
    pub values: SimulationMatrix,
}

impl DrdResult {
    /// Share of draws per factor whose |DRD| lies within `zone`.
    pub fn indifference_share(&self, zone: f64) -> Vec<f64> {
        let rows = self.values.draws();
        (0..self.values.factor_count())
            .map(|j| {
                if rows == 0 {
                    return 0.0;
                }
                let inside = self.values.column(j).iter().filter(|v| v.abs() <= zone).count();
                inside as f64 / rows as f64
            })
            .collect()
    }
}

/// (a − b) / max(a, b), or 0 when the maximum is 0.
pub fn relative_difference(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == 0.0 {
        0.0
    } else {
        (a - b) / max
    }
}

impl ComparisonEngine {
    /// Relative difference per draw and factor.
    ///
    /// # Errors
    /// - `ShapeMismatch` for different factors, or different draw counts under strict alignment
    /// - `InvalidParameter` if there are no paired draws
    pub fn drd<'a>(
        &self,
        left: impl Into<LabeledMatrix<'a>>,
        right: impl Into<LabeledMatrix<'a>>,
    ) -> Result<DrdResult, DomainError> {
        let (left, right) = (left.into(), right.into());
        let rows = self.paired_rows(left, right)?;
        require_rows(rows, 1, left, right)?;

        let columns = (0..left.matrix.factor_count())
            .map(|j| {
                left.matrix.column(j)[..rows]
                    .iter()
                    .zip(&right.matrix.column(j)[..rows])
                    .map(|(a, b)| relative_difference(*a, *b))
                    .collect()
            })
            .collect();

        Ok(DrdResult {
            alt1: left.label.to_string(),
            alt2: right.label.to_string(),
            values: SimulationMatrix::from_columns(left.matrix.factors().to_vec(), columns)?,
        })
    }
}
