//! Coverage surface collaborator.
//!
//! One [`CoverageMap`] exists per body. The sampler only ever writes passes
//! into it and reads back aggregate coverage; how cells are stored,
//! aggregated and serialized is up to the implementation.
//!
//! Aggregates are snapshots: [`CoverageMap::coverage`] reports the state as
//! of the last [`CoverageMap::refresh`], which the controller calls once at
//! the start of every tick.

mod grid;

pub use grid::GridCoverage;

use thiserror::Error;

use crate::sensor::SensorType;

/// Errors restoring a persisted coverage map.
#[derive(Debug, Error)]
pub enum CoverageError {
    /// The stored text is not valid for this encoding.
    #[error("invalid coverage encoding: {0}")]
    InvalidEncoding(String),

    /// Decompression failed.
    #[error("failed to decompress coverage data: {0}")]
    Decompress(#[from] std::io::Error),

    /// Binary decoding failed.
    #[error("failed to decode coverage data: {0}")]
    Decode(#[from] bincode::Error),

    /// The decoded grid has the wrong number of cells.
    #[error("coverage grid has {actual} cells, expected {expected}")]
    WrongSize { expected: usize, actual: usize },
}

/// Per-body record of which surface cells each sensor has seen.
pub trait CoverageMap {
    /// Mark the cell containing `(lon, lat)` as seen by `sensor`.
    ///
    /// Coordinates outside the canonical ranges wrap onto the surface.
    fn register_pass(&mut self, lon: f64, lat: f64, sensor: SensorType);

    /// Covered fraction (0..=1) for `mask`, as of the last refresh.
    fn coverage(&self, mask: SensorType) -> f64;

    /// Covered percentage (0..=100) for `mask`, as of the last refresh.
    fn coverage_percentage(&self, mask: SensorType) -> f64 {
        self.coverage(mask) * 100.0
    }

    /// Recompute aggregate coverage.
    fn refresh(&mut self);

    /// Whether scanning of this body is enabled.
    fn is_enabled(&self) -> bool;

    /// Enable or disable scanning of this body.
    fn set_enabled(&mut self, enabled: bool);

    /// Encode the map as text for persistence.
    fn snapshot(&self) -> Result<String, CoverageError>;

    /// Replace the map's contents from [`CoverageMap::snapshot`] output.
    fn restore(&mut self, blob: &str) -> Result<(), CoverageError>;
}
