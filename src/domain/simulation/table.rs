//! Impact Table - Typed per-draw table of impact contributions.
//!
//! Rows are impact categories. Columns are either the categorical label
//! column or numeric per-component columns. Numeric-only transforms leave
//! categorical columns untouched.

use crate::domain::foundation::{DomainError, ImpactCategory};

/// Name of the label column holding the impact category of each row.
pub const CATEGORY_COLUMN: &str = "Impact Category";

/// Declared kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Column payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ColumnData {
    fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

/// Table of named, kinded columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpactTable {
    row_count: usize,
    columns: Vec<Column>,
}

impl ImpactTable {
    /// Creates a table whose only column labels each row with its category.
    pub fn with_categories(categories: &[ImpactCategory]) -> Self {
        Self {
            row_count: categories.len(),
            columns: vec![Column {
                name: CATEGORY_COLUMN.to_string(),
                data: ColumnData::Categorical(
                    categories.iter().map(|c| c.as_str().to_string()).collect(),
                ),
            }],
        }
    }

    /// Appends a numeric column.
    ///
    /// # Errors
    /// `InvalidParameter` on a duplicate name or a length that differs from the row count.
    pub fn push_numeric(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<(), DomainError> {
        self.push(Column {
            name: name.into(),
            data: ColumnData::Numeric(values),
        })
    }

    fn push(&mut self, column: Column) -> Result<(), DomainError> {
        if self.contains(&column.name) {
            return Err(DomainError::invalid_parameter(
                "column",
                format!("Duplicate column '{}'", column.name),
            ));
        }
        if column.data.len() != self.row_count {
            return Err(DomainError::invalid_parameter(
                "column",
                format!(
                    "Column '{}' has {} rows, table has {}",
                    column.name,
                    column.data.len(),
                    self.row_count
                ),
            ));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Number of rows (impact categories).
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns true if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Declared kind of a column.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.data.kind())
    }

    /// Values of a numeric column; `None` for missing or categorical columns.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.columns.iter().find(|c| c.name == name).and_then(|c| match &c.data {
            ColumnData::Numeric(values) => Some(values.as_slice()),
            ColumnData::Categorical(_) => None,
        })
    }

    /// Names of all numeric columns, in insertion order.
    pub fn numeric_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.data.kind() == ColumnKind::Numeric)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Returns a new table with every numeric column multiplied by
    /// `multiplier(name)`. Categorical columns pass through unchanged.
    pub fn scale_numeric<F>(&self, multiplier: F) -> ImpactTable
    where
        F: Fn(&str) -> f64,
    {
        let columns = self
            .columns
            .iter()
            .map(|column| match &column.data {
                ColumnData::Numeric(values) => {
                    let factor = multiplier(&column.name);
                    Column {
                        name: column.name.clone(),
                        data: ColumnData::Numeric(values.iter().map(|v| v * factor).collect()),
                    }
                }
                ColumnData::Categorical(_) => column.clone(),
            })
            .collect();

        ImpactTable {
            row_count: self.row_count,
            columns,
        }
    }

    /// Row-wise sum of the named numeric columns that exist.
    ///
    /// Returns `None` when none of the names is a numeric column.
    pub fn sum_columns<S: AsRef<str>>(&self, names: &[S]) -> Option<Vec<f64>> {
        let mut found = false;
        let mut sums = vec![0.0; self.row_count];
        for name in names {
            if let Some(values) = self.numeric(name.as_ref()) {
                found = true;
                for (sum, value) in sums.iter_mut().zip(values) {
                    *sum += value;
                }
            }
        }
        found.then_some(sums)
    }
}
