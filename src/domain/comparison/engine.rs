//! Comparison Engine - settings, input labelling and row alignment.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::domain::foundation::DomainError;
use crate::domain::simulation::SimulationMatrix;

/// How paired metrics treat matrices with different draw counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAlignment {
    /// Trim both to the shorter draw count.
    #[default]
    Truncate,
    /// Fail with `ShapeMismatch`.
    Strict,
}

/// Tunables shared by all comparison metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSettings {
    /// Indifference threshold λ of the Heijungs metric.
    pub indifference_threshold: f64,
    pub row_alignment: RowAlignment,
}

impl Default for ComparisonSettings {
    fn default() -> Self {
        Self {
            indifference_threshold: 0.05,
            row_alignment: RowAlignment::Truncate,
        }
    }
}

/// A matrix together with the alternative it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct LabeledMatrix<'a> {
    pub label: &'a str,
    pub matrix: &'a SimulationMatrix,
}

impl<'a> LabeledMatrix<'a> {
    pub fn new(label: &'a str, matrix: &'a SimulationMatrix) -> Self {
        Self { label, matrix }
    }
}

impl<'a> From<(&'a str, &'a SimulationMatrix)> for LabeledMatrix<'a> {
    fn from((label, matrix): (&'a str, &'a SimulationMatrix)) -> Self {
        Self { label, matrix }
    }
}

/// Pure statistical comparisons between simulation matrices.
///
/// Metric implementations live in sibling modules, one per metric family.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonEngine {
    settings: ComparisonSettings,
}

impl ComparisonEngine {
    /// Creates an engine.
    ///
    /// # Errors
    /// `InvalidParameter` if the indifference threshold is negative or not finite.
    pub fn new(settings: ComparisonSettings) -> Result<Self, DomainError> {
        let lambda = settings.indifference_threshold;
        if !lambda.is_finite() || lambda < 0.0 {
            return Err(DomainError::invalid_parameter(
                "indifference_threshold",
                format!("Indifference threshold must be non-negative, got {}", lambda),
            ));
        }
        Ok(Self { settings })
    }

    /// The engine settings.
    pub fn settings(&self) -> &ComparisonSettings {
        &self.settings
    }

    /// Rows usable by a paired metric, honoring the configured alignment.
    pub(crate) fn paired_rows(
        &self,
        left: LabeledMatrix<'_>,
        right: LabeledMatrix<'_>,
    ) -> Result<usize, DomainError> {
        check_factors(left, right)?;
        let (n1, n2) = (left.matrix.draws(), right.matrix.draws());
        if n1 != n2 && self.settings.row_alignment == RowAlignment::Strict {
            return Err(DomainError::shape_mismatch(
                left.label,
                right.label,
                format!("Draw counts differ: {} vs {}", n1, n2),
            ));
        }
        Ok(common_rows(left, right))
    }

    /// Rows shared by a set of alternatives after trimming to the shortest.
    ///
    /// Labels key the per-alternative results, so they must be unique.
    pub(crate) fn trimmed_rows(&self, alternatives: &[LabeledMatrix<'_>]) -> Result<usize, DomainError> {
        let first = alternatives.first().ok_or_else(|| {
            DomainError::invalid_parameter("alternatives", "At least one alternative is required")
        })?;
        check_unique_labels(alternatives)?;
        let mut rows = first.matrix.draws();
        for other in &alternatives[1..] {
            check_factors(*first, *other)?;
            rows = rows.min(other.matrix.draws());
        }
        Ok(rows)
    }
}

/// Fails on the first label used by more than one alternative.
pub(crate) fn check_unique_labels(alternatives: &[LabeledMatrix<'_>]) -> Result<(), DomainError> {
    let mut seen = HashSet::with_capacity(alternatives.len());
    match alternatives.iter().find(|a| !seen.insert(a.label)) {
        Some(duplicate) => Err(DomainError::invalid_parameter(
            "alternatives",
            format!("Alternative '{}' appears more than once", duplicate.label),
        )
        .with_detail("label", duplicate.label)),
        None => Ok(()),
    }
}

/// Fails unless both matrices carry the same factor names in the same order.
pub(crate) fn check_factors(left: LabeledMatrix<'_>, right: LabeledMatrix<'_>) -> Result<(), DomainError> {
    if left.matrix.same_factors(right.matrix) {
        return Ok(());
    }
    Err(DomainError::shape_mismatch(
        left.label,
        right.label,
        format!(
            "Factor lists differ: [{}] vs [{}]",
            left.matrix.factors().join(", "),
            right.matrix.factors().join(", ")
        ),
    ))
}

fn common_rows(left: LabeledMatrix<'_>, right: LabeledMatrix<'_>) -> usize {
    let (n1, n2) = (left.matrix.draws(), right.matrix.draws());
    if n1 != n2 {
        debug!(
            left = left.label,
            right = right.label,
            n1,
            n2,
            "Trimming to common draw count"
        );
    }
    n1.min(n2)
}

/// Fails when a metric has no draws to work with.
pub(crate) fn require_rows(
    rows: usize,
    minimum: usize,
    left: LabeledMatrix<'_>,
    right: LabeledMatrix<'_>,
) -> Result<(), DomainError> {
    if rows < minimum {
        return Err(DomainError::invalid_parameter(
            "draws",
            format!("At least {} paired draws are required, got {}", minimum, rows),
        )
        .with_detail("left", left.label)
        .with_detail("right", right.label));
    }
    Ok(())
}
