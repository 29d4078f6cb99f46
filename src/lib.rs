//! LCA Uncertainty - Monte Carlo uncertainty analysis for building alternatives
//!
//! This crate simulates the environmental impact of building-construction
//! alternatives from per-material impact distributions, then compares the
//! alternatives statistically and ranks the inputs that drive each result.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
