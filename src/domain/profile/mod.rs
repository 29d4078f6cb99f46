//! Profile Module - Impact intensity statistics per material and category.
//!
//! # Components
//!
//! - `ImpactProfileStore` - Immutable lookup of (mean, std) per material/category
//! - `FallbackPolicy` - Class-aware synthesis for materials missing from the tables

mod fallback;
mod store;

pub use fallback::{category_scale, FallbackPolicy, SynthesisPrior};
pub use store::{
    ImpactProfileStore, ImpactProfileStoreBuilder, ImpactProfileTable, IntensityStats,
    MaterialImpactProfile, ProfileLookup, ProfileOrigin,
};
