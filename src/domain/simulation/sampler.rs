//! Lognormal Sampler - Moment-matched lognormal draws with explicit fallbacks.
//!
//! Every draw returns a tagged [`SampleOutcome`] so the substitution policy
//! is observable instead of silently absorbed.

use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::LogNormal;

use crate::domain::profile::IntensityStats;

/// Numeric guards applied while sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Upper bound on the lognormal shape parameter σ.
    pub sigma_cap: f64,
    /// Draws above this value are replaced by `sentinel_value`.
    pub value_ceiling: f64,
    /// Bounded stand-in for non-finite or oversized draws.
    pub sentinel_value: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sigma_cap: 0.5,
            value_ceiling: 1e6,
            sentinel_value: 1000.0,
        }
    }
}

/// Why a draw was replaced by the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionReason {
    NonFinite,
    AboveCeiling,
}

/// Outcome of one draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SampleOutcome {
    /// Regular lognormal draw.
    Sampled { value: f64, sigma_capped: bool },
    /// Standard deviation ≤ 0: the mean itself.
    PointMass { value: f64 },
    /// Mean ≤ 0: contributes zero.
    NonSamplable,
    /// Draw replaced by the configured sentinel.
    Substituted { value: f64, reason: SubstitutionReason },
}

impl SampleOutcome {
    /// The value to use downstream.
    pub fn value(&self) -> f64 {
        match self {
            SampleOutcome::Sampled { value, .. }
            | SampleOutcome::PointMass { value }
            | SampleOutcome::Substituted { value, .. } => *value,
            SampleOutcome::NonSamplable => 0.0,
        }
    }
}

/// Lognormal location/shape fitted from (mean, std).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LognormalParams {
    pub mu: f64,
    pub sigma: f64,
    pub sigma_capped: bool,
}

/// Counts of sampling outcomes over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingDiagnostics {
    pub sampled: u64,
    pub point_mass: u64,
    pub non_samplable: u64,
    pub substituted_non_finite: u64,
    pub substituted_above_ceiling: u64,
    pub sigma_capped: u64,
}

impl SamplingDiagnostics {
    /// Records one outcome.
    pub fn record(&mut self, outcome: &SampleOutcome) {
        match outcome {
            SampleOutcome::Sampled { sigma_capped, .. } => {
                self.sampled += 1;
                if *sigma_capped {
                    self.sigma_capped += 1;
                }
            }
            SampleOutcome::PointMass { .. } => self.point_mass += 1,
            SampleOutcome::NonSamplable => self.non_samplable += 1,
            SampleOutcome::Substituted { reason, .. } => match reason {
                SubstitutionReason::NonFinite => self.substituted_non_finite += 1,
                SubstitutionReason::AboveCeiling => self.substituted_above_ceiling += 1,
            },
        }
    }

    /// Adds another set of counts into this one.
    pub fn merge(&mut self, other: &SamplingDiagnostics) {
        self.sampled += other.sampled;
        self.point_mass += other.point_mass;
        self.non_samplable += other.non_samplable;
        self.substituted_non_finite += other.substituted_non_finite;
        self.substituted_above_ceiling += other.substituted_above_ceiling;
        self.sigma_capped += other.sigma_capped;
    }

    /// Total number of substituted draws.
    pub fn substituted(&self) -> u64 {
        self.substituted_non_finite + self.substituted_above_ceiling
    }

    /// Total number of recorded outcomes.
    pub fn total(&self) -> u64 {
        self.sampled + self.point_mass + self.non_samplable + self.substituted()
    }
}

/// Draws per-unit impact values from (mean, std) pairs.
///
/// The sampler holds no random state; callers pass their own generator,
/// which keeps draws independently seedable and safe to run in parallel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LognormalSampler {
    config: SamplerConfig,
}

impl LognormalSampler {
    /// Creates a sampler with the given guards.
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    /// The sampler's guards.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Fits lognormal parameters so that the distribution has the given mean.
    ///
    /// σ² = ln(std²/mean² + 1), μ = ln(mean) − σ²/2. When σ exceeds the cap it
    /// is clamped and μ recomputed from the capped σ, so the mean is preserved.
    /// Returns `None` when the input is degenerate (mean ≤ 0, std ≤ 0, or σ = 0).
    pub fn fit(&self, mean: f64, std: f64) -> Option<LognormalParams> {
        if !(mean > 0.0) || !(std > 0.0) {
            return None;
        }

        let variance = std * std;
        let mut sigma_sq = (variance / (mean * mean) + 1.0).ln();
        let mut sigma = sigma_sq.sqrt();
        if !(sigma > 0.0) {
            return None;
        }

        let sigma_capped = sigma > self.config.sigma_cap;
        if sigma_capped {
            sigma = self.config.sigma_cap;
            sigma_sq = sigma * sigma;
        }

        Some(LognormalParams {
            mu: mean.ln() - sigma_sq / 2.0,
            sigma,
            sigma_capped,
        })
    }

    /// Draws one value.
    ///
    /// # Degenerate inputs
    /// - mean ≤ 0 → `NonSamplable` (contributes 0)
    /// - std ≤ 0 → `PointMass` at the mean
    /// - NaN/∞ or a draw above the ceiling → `Substituted` with the sentinel
    pub fn sample<R: Rng + ?Sized>(&self, stats: IntensityStats, rng: &mut R) -> SampleOutcome {
        if !(stats.mean > 0.0) {
            return SampleOutcome::NonSamplable;
        }
        if !stats.mean.is_finite() {
            return self.substitute(SubstitutionReason::NonFinite);
        }

        let params = match self.fit(stats.mean, stats.std) {
            Some(params) => params,
            None => return self.bounded(stats.mean, |value| SampleOutcome::PointMass { value }),
        };

        let distribution = match LogNormal::new(params.mu, params.sigma) {
            Ok(distribution) => distribution,
            Err(_) => return self.substitute(SubstitutionReason::NonFinite),
        };

        let value = distribution.sample(rng);
        self.bounded(value, |value| SampleOutcome::Sampled {
            value,
            sigma_capped: params.sigma_capped,
        })
    }

    /// Draws `n` values for the same statistics.
    pub fn sample_n<R: Rng + ?Sized>(&self, stats: IntensityStats, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample(stats, rng).value()).collect()
    }

    fn bounded<F>(&self, value: f64, accept: F) -> SampleOutcome
    where
        F: FnOnce(f64) -> SampleOutcome,
    {
        if !value.is_finite() {
            self.substitute(SubstitutionReason::NonFinite)
        } else if value > self.config.value_ceiling {
            self.substitute(SubstitutionReason::AboveCeiling)
        } else {
            accept(value)
        }
    }

    fn substitute(&self, reason: SubstitutionReason) -> SampleOutcome {
        SampleOutcome::Substituted {
            value: self.config.sentinel_value,
            reason,
        }
    }
}
