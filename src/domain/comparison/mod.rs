//! Comparison Module - Statistical comparison of simulated alternatives.
//!
//! All metrics are pure functions of their input matrices. Factor lists must
//! match by name and order; a mismatch is a `ShapeMismatch` naming both inputs.
//!
//! # Metrics
//!
//! - Discernibility: P(left < right) per factor
//! - SMD: standardized mean difference of paired draws
//! - DRD: per-draw relative differences
//! - Heijungs: share of ratios above 1 + λ, and the mean separation index
//! - Ranking: rank frequencies per alternative across draws

mod discernibility;
mod drd;
mod engine;
mod heatmap;
mod heijungs;
mod ranking;
mod smd;
mod summary;

pub use discernibility::{DiscernibilityComparison, DiscernibilityReport};
pub use drd::{relative_difference, DrdResult};
pub use engine::{ComparisonEngine, ComparisonSettings, LabeledMatrix, RowAlignment};
pub use heatmap::{HeatmapMatrix, HeatmapTriplets, PairwiseOverview};
pub use heijungs::{HeijungsOverview, HeijungsResult};
pub use ranking::{OrderingFrequency, RankingBasis, RankingProbabilities};
pub use smd::SmdResult;
pub use summary::UncertaintySummary;
