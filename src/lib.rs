//! Daily solar noon estimation for PV power and irradiance matrices.
//!
//! The estimators live in [`estimator`]. The remaining modules support the
//! `solar-noon` command-line tool: configuration, synthetic datasets,
//! MessagePack storage and summary statistics.

pub mod analysis;
pub mod config;
pub mod estimator;
pub mod manager;
pub mod stats;
pub mod synth;
pub mod types;
