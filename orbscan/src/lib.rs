//! Orbscan - adaptive ground-coverage scanning for orbiting survey vehicles
//!
//! This library reconstructs continuous sensor coverage of a rotating body
//! from sparse, irregularly spaced vehicle position samples. When time
//! compression stretches the gap between two samples, the scan sampler
//! bisects the interval using orbital interpolation so the swept ground
//! track is registered instead of isolated points.
//!
//! # Architecture
//!
//! ```text
//! ScanController ──► SensorRegistry ──► ScanSampler ──► footprint ──► CoverageMap
//!   (tick gates)      (per vehicle)     (bisection)     (cells)       (per body)
//! ```
//!
//! Orbital mechanics ([`ephemeris::Ephemeris`]) and coverage storage
//! ([`coverage::CoverageMap`]) are collaborator traits. Simple reference
//! implementations ([`ephemeris::CircularOrbit`], [`coverage::GridCoverage`])
//! are provided for tests and the CLI.

pub mod config;
pub mod controller;
pub mod coord;
pub mod coverage;
pub mod ephemeris;
pub mod footprint;
pub mod persistence;
pub mod sampler;
pub mod science;
pub mod sensor;

/// Crate version, for banners and saved-state headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
