//! One-degree grid coverage map.
//!
//! Stores one sensor bitmask per 1°×1° cell (360×180 cells). Aggregate
//! counts per sensor bit are recomputed on [`CoverageMap::refresh`].
//!
//! # Snapshot format
//!
//! ```text
//! cells (Vec<u32>) ──bincode──► bytes ──zlib──► bytes ──base64──► text
//! ```

use std::io::{Read, Write};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::{CoverageError, CoverageMap};
use crate::coord::GeoCell;
use crate::sensor::SensorType;

/// Total number of cells in the grid.
const CELL_COUNT: usize = GeoCell::COLS * GeoCell::ROWS;

/// Coverage map backed by a flat one-degree grid.
#[derive(Debug, Clone)]
pub struct GridCoverage {
    /// Sensor bits seen per cell, row-major from the south-west corner.
    cells: Vec<u32>,
    /// Covered cell count per sensor bit, as of the last refresh.
    counts: [usize; 32],
    /// Whether scanning is enabled for this body.
    enabled: bool,
}

impl Default for GridCoverage {
    fn default() -> Self {
        Self::new()
    }
}

impl GridCoverage {
    /// Create an empty, enabled grid.
    pub fn new() -> Self {
        Self {
            cells: vec![0; CELL_COUNT],
            counts: [0; 32],
            enabled: true,
        }
    }

    /// Sensor bits recorded for the cell containing `(lon, lat)`.
    pub fn cell(&self, lon: f64, lat: f64) -> SensorType {
        let cell = GeoCell::from_lon_lat(lon, lat);
        SensorType::from_bits_truncate(self.cells[cell.index()])
    }

    /// Number of cells with any bit of `mask`, counted live.
    pub fn covered_cells(&self, mask: SensorType) -> usize {
        self.cells
            .iter()
            .filter(|bits| **bits & mask.bits() != 0)
            .count()
    }
}

impl CoverageMap for GridCoverage {
    fn register_pass(&mut self, lon: f64, lat: f64, sensor: SensorType) {
        if !lon.is_finite() || !lat.is_finite() {
            return;
        }
        let cell = GeoCell::from_lon_lat(lon, lat);
        self.cells[cell.index()] |= sensor.bits();
    }

    fn coverage(&self, mask: SensorType) -> f64 {
        let mut covered = 0usize;
        let mut bits = 0usize;
        for bit in mask.single_bits() {
            covered += self.counts[bit.bits().trailing_zeros() as usize];
            bits += 1;
        }
        if bits == 0 {
            return 0.0;
        }
        covered as f64 / (bits * CELL_COUNT) as f64
    }

    fn refresh(&mut self) {
        let mut counts = [0usize; 32];
        for bits in &self.cells {
            let mut remaining = *bits;
            while remaining != 0 {
                counts[remaining.trailing_zeros() as usize] += 1;
                remaining &= remaining - 1;
            }
        }
        self.counts = counts;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn snapshot(&self) -> Result<String, CoverageError> {
        let raw = bincode::serialize(&self.cells)?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw)?;
        let compressed = encoder.finish()?;
        Ok(STANDARD.encode(compressed))
    }

    fn restore(&mut self, blob: &str) -> Result<(), CoverageError> {
        let compressed = STANDARD
            .decode(blob.trim())
            .map_err(|e| CoverageError::InvalidEncoding(e.to_string()))?;
        let mut raw = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut raw)?;
        let cells: Vec<u32> = bincode::deserialize(&raw)?;
        if cells.len() != CELL_COUNT {
            return Err(CoverageError::WrongSize {
                expected: CELL_COUNT,
                actual: cells.len(),
            });
        }
        self.cells = cells;
        self.refresh();
        Ok(())
    }
}
