//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' must be finite and non-negative, got {actual}")]
    Negative { field: String, actual: f64 },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates a negative-value validation error.
    pub fn negative(field: impl Into<String>, actual: f64) -> Self {
        ValidationError::Negative {
            field: field.into(),
            actual,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input errors
    ValidationFailed,
    InvalidParameter,

    // Structural errors
    ShapeMismatch,
    ProfileNotFound,

    // Numeric errors that could not be recovered locally
    DegenerateDistribution,

    // Collaborator errors
    SourceUnavailable,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidParameter => "INVALID_PARAMETER",
            ErrorCode::ShapeMismatch => "SHAPE_MISMATCH",
            ErrorCode::ProfileNotFound => "PROFILE_NOT_FOUND",
            ErrorCode::DegenerateDistribution => "DEGENERATE_DISTRIBUTION",
            ErrorCode::SourceUnavailable => "SOURCE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
///
/// Details carry the context a collaborator needs to render an actionable
/// message (`material`, `category`, `alternative`, `left`, `right`, `parameter`).
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates an invalid parameter error naming the parameter.
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message).with_detail("parameter", parameter.into())
    }

    /// Creates a shape mismatch error identifying both inputs.
    pub fn shape_mismatch(
        left: impl Into<String>,
        right: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorCode::ShapeMismatch, message)
            .with_detail("left", left.into())
            .with_detail("right", right.into())
    }

    /// Creates a profile-not-found error for a material/category pair.
    pub fn profile_not_found(material: impl Into<String>, category: impl Into<String>) -> Self {
        let material = material.into();
        let category = category.into();
        Self::new(
            ErrorCode::ProfileNotFound,
            format!("No impact profile for '{}' in category '{}'", material, category),
        )
        .with_detail("material", material)
        .with_detail("category", category)
    }

    /// Creates a degenerate distribution error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DegenerateDistribution, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns a detail value if present.
    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.get(key).map(String::as_str)
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field, .. } => field.clone(),
        };
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("alternative");
        assert_eq!(format!("{}", err), "Field 'alternative' cannot be empty");
    }

    #[test]
    fn validation_error_out_of_range_displays_correctly() {
        let err = ValidationError::out_of_range("perturbation_fraction", 0.0, 1.0, 1.5);
        assert_eq!(
            format!("{}", err),
            "Field 'perturbation_fraction' must be between 0 and 1, got 1.5"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::ShapeMismatch, "Factor lists differ");
        assert_eq!(format!("{}", err), "[SHAPE_MISMATCH] Factor lists differ");
    }

    #[test]
    fn shape_mismatch_identifies_both_inputs() {
        let err = DomainError::shape_mismatch("Hemp", "Concrete", "draw counts differ");
        assert_eq!(err.code, ErrorCode::ShapeMismatch);
        assert_eq!(err.detail("left"), Some("Hemp"));
        assert_eq!(err.detail("right"), Some("Concrete"));
    }

    #[test]
    fn profile_not_found_carries_material_and_category() {
        let err = DomainError::profile_not_found("Steel", "Water use");
        assert_eq!(err.code, ErrorCode::ProfileNotFound);
        assert_eq!(err.detail("material"), Some("Steel"));
        assert_eq!(err.detail("category"), Some("Water use"));
        assert!(err.message.contains("Steel"));
    }

    #[test]
    fn validation_error_converts_to_domain_error() {
        let err: DomainError = ValidationError::negative("quantity", -2.0).into();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert_eq!(err.detail("field"), Some("quantity"));
    }
}
