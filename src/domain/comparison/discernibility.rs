//! Discernibility - probability that one alternative is lower than another.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

use super::engine::{require_rows, ComparisonEngine, LabeledMatrix};

/// DA values of one ordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscernibilityComparison {
    pub alt1: String,
    pub alt2: String,
    pub values: Vec<f64>,
}

/// All i < j pairs of a set of alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscernibilityReport {
    pub factors: Vec<String>,
    pub comparisons: Vec<DiscernibilityComparison>,
}

impl ComparisonEngine {
    /// Per factor, the share of draws where `left` < `right`.
    ///
    /// Both matrices are trimmed to their common draw count.
    ///
    /// # Errors
    /// - `ShapeMismatch` if factor lists differ
    /// - `InvalidParameter` if there are no draws
    pub fn discernibility<'a>(
        &self,
        left: impl Into<LabeledMatrix<'a>>,
        right: impl Into<LabeledMatrix<'a>>,
    ) -> Result<Vec<f64>, DomainError> {
        let (left, right) = (left.into(), right.into());
        let rows = self.trimmed_rows(&[left, right])?;
        require_rows(rows, 1, left, right)?;

        Ok((0..left.matrix.factor_count())
            .map(|j| {
                let a = &left.matrix.column(j)[..rows];
                let b = &right.matrix.column(j)[..rows];
                let lower = a.iter().zip(b).filter(|(x, y)| x < y).count();
                lower as f64 / rows as f64
            })
            .collect())
    }

    /// DA for every pair i < j in input order.
    pub fn discernibility_analysis(
        &self,
        alternatives: &[LabeledMatrix<'_>],
    ) -> Result<DiscernibilityReport, DomainError> {
        self.trimmed_rows(alternatives)?;
        let factors = alternatives[0].matrix.factors().to_vec();

        let mut comparisons = Vec::new();
        for (i, left) in alternatives.iter().enumerate() {
            for right in &alternatives[i + 1..] {
                comparisons.push(DiscernibilityComparison {
                    alt1: left.label.to_string(),
                    alt2: right.label.to_string(),
                    values: self.discernibility(*left, *right)?,
                });
            }
        }

        Ok(DiscernibilityReport {
            factors,
            comparisons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::simulation::SimulationMatrix;

    fn matrix(columns: Vec<Vec<f64>>) -> SimulationMatrix {
        let factors = (0..columns.len()).map(|j| format!("f{}", j)).collect();
        SimulationMatrix::from_columns(factors, columns).unwrap()
    }

    #[test]
    fn counts_strictly_lower_draws() {
        let a = matrix(vec![vec![1.0, 2.0, 3.0, 4.0], vec![0.0, 0.0, 0.0, 0.0]]);
        let b = matrix(vec![vec![2.0, 2.0, 2.0, 5.0], vec![1.0, 1.0, 1.0, 1.0]]);
        let da = ComparisonEngine::default().discernibility(("A", &a), ("B", &b)).unwrap();
        assert_eq!(da, vec![0.5, 1.0]);
    }

    #[test]
    fn complement_holds_without_ties() {
        let a = matrix(vec![vec![1.0, 5.0, 3.0]]);
        let b = matrix(vec![vec![2.0, 4.0, 6.0]]);
        let engine = ComparisonEngine::default();
        let ab = engine.discernibility(("A", &a), ("B", &b)).unwrap();
        let ba = engine.discernibility(("B", &b), ("A", &a)).unwrap();
        assert!((ab[0] + ba[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unequal_draws_are_trimmed() {
        let a = matrix(vec![vec![1.0, 1.0, 9.0, 9.0]]);
        let b = matrix(vec![vec![2.0, 2.0]]);
        let da = ComparisonEngine::default().discernibility(("A", &a), ("B", &b)).unwrap();
        assert_eq!(da, vec![1.0]);
    }

    #[test]
    fn empty_matrices_are_rejected() {
        let a = matrix(vec![vec![]]);
        let err = ComparisonEngine::default()
            .discernibility(("A", &a), ("B", &a))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[test]
    fn analysis_covers_all_pairs_in_order() {
        let a = matrix(vec![vec![1.0]]);
        let b = matrix(vec![vec![2.0]]);
        let c = matrix(vec![vec![3.0]]);
        let report = ComparisonEngine::default()
            .discernibility_analysis(&[("A", &a).into(), ("B", &b).into(), ("C", &c).into()])
            .unwrap();

        let pairs: Vec<(&str, &str)> = report
            .comparisons
            .iter()
            .map(|c| (c.alt1.as_str(), c.alt2.as_str()))
            .collect();
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
        assert_eq!(report.factors, vec!["f0"]);
        assert!(report.comparisons.iter().all(|c| c.values == vec![1.0]));
    }
}
