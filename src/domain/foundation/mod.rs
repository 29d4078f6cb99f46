//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the uncertainty analysis domain.

mod errors;
mod ids;
mod impact_category;
mod material;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::RunId;
pub use impact_category::{ImpactCategory, EF_IMPACT_CATEGORIES};
pub use material::{MaterialClass, MaterialName};
pub use timestamp::Timestamp;
