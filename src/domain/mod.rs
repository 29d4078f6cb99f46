//! Domain layer containing the uncertainty analysis logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `profile` - Impact intensity statistics per material and category
//! - `simulation` - Monte Carlo pipeline from quantities to Row Totals
//! - `comparison` - Statistical comparison of simulated alternatives
//! - `sensitivity` - One-at-a-time parameter influence

pub mod comparison;
pub mod foundation;
pub mod profile;
pub mod sensitivity;
pub mod simulation;
