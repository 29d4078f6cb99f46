//! Simulation Matrix - Draws × named factors, immutable once built.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;

/// Rows are independent Monte Carlo draws, columns are named factors.
///
/// Stored column-major since every metric walks one factor at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixRepr", into = "MatrixRepr")]
pub struct SimulationMatrix {
    factors: Vec<String>,
    columns: Vec<Vec<f64>>,
}

/// Serialized row-major form.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MatrixRepr {
    factors: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TryFrom<MatrixRepr> for SimulationMatrix {
    type Error = DomainError;

    fn try_from(repr: MatrixRepr) -> Result<Self, Self::Error> {
        SimulationMatrix::from_rows(repr.factors, repr.rows)
    }
}

impl From<SimulationMatrix> for MatrixRepr {
    fn from(matrix: SimulationMatrix) -> Self {
        let rows = (0..matrix.draws()).map(|i| matrix.row(i)).collect();
        MatrixRepr {
            factors: matrix.factors,
            rows,
        }
    }
}

impl SimulationMatrix {
    /// Builds a matrix from row-major draws.
    ///
    /// # Errors
    /// `InvalidParameter` when there are no factors, a row has the wrong width,
    /// or factor names repeat.
    pub fn from_rows(factors: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, DomainError> {
        Self::check_factors(&factors)?;
        let mut columns = vec![Vec::with_capacity(rows.len()); factors.len()];
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != factors.len() {
                return Err(DomainError::invalid_parameter(
                    "rows",
                    format!(
                        "Row {} has {} values, expected {}",
                        i,
                        row.len(),
                        factors.len()
                    ),
                ));
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Ok(Self { factors, columns })
    }

    /// Builds a matrix from one vector of draws per factor.
    ///
    /// # Errors
    /// `InvalidParameter` when the column count differs from the factor count
    /// or columns differ in length.
    pub fn from_columns(factors: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self, DomainError> {
        Self::check_factors(&factors)?;
        if columns.len() != factors.len() {
            return Err(DomainError::invalid_parameter(
                "columns",
                format!("{} columns for {} factors", columns.len(), factors.len()),
            ));
        }
        let draws = columns.first().map(Vec::len).unwrap_or(0);
        if let Some((j, column)) = columns.iter().enumerate().find(|(_, c)| c.len() != draws) {
            return Err(DomainError::invalid_parameter(
                "columns",
                format!(
                    "Factor '{}' has {} draws, expected {}",
                    factors[j],
                    column.len(),
                    draws
                ),
            ));
        }
        Ok(Self { factors, columns })
    }

    fn check_factors(factors: &[String]) -> Result<(), DomainError> {
        if factors.is_empty() {
            return Err(DomainError::invalid_parameter(
                "factors",
                "At least one factor is required",
            ));
        }
        for (i, name) in factors.iter().enumerate() {
            if factors[..i].contains(name) {
                return Err(DomainError::invalid_parameter(
                    "factors",
                    format!("Duplicate factor '{}'", name),
                ));
            }
        }
        Ok(())
    }

    /// Factor names in column order.
    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    /// Number of draws (rows).
    pub fn draws(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    /// Number of factors (columns).
    pub fn factor_count(&self) -> usize {
        self.factors.len()
    }

    /// All draws of one factor.
    pub fn column(&self, index: usize) -> &[f64] {
        &self.columns[index]
    }

    /// Column index of a factor name.
    pub fn factor_index(&self, name: &str) -> Option<usize> {
        self.factors.iter().position(|f| f == name)
    }

    /// Draws of a factor by name.
    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        self.factor_index(name).map(|j| self.column(j))
    }

    /// One draw across all factors.
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    /// Per-draw sum over all factors.
    pub fn row_sums(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.draws()];
        for column in &self.columns {
            for (sum, value) in sums.iter_mut().zip(column) {
                *sum += value;
            }
        }
        sums
    }

    /// Mean over every cell.
    pub fn grand_mean(&self) -> f64 {
        let cells = self.draws() * self.factor_count();
        if cells == 0 {
            return 0.0;
        }
        self.columns.iter().flatten().sum::<f64>() / cells as f64
    }

    /// Mean of one factor over draws.
    pub fn column_mean(&self, index: usize) -> f64 {
        let column = self.column(index);
        if column.is_empty() {
            return 0.0;
        }
        column.iter().sum::<f64>() / column.len() as f64
    }

    /// Returns true if both matrices have the same factor names in the same order.
    pub fn same_factors(&self, other: &SimulationMatrix) -> bool {
        self.factors == other.factors
    }
}
