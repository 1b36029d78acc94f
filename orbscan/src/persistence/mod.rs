//! Saved scan state.
//!
//! A [`ScanState`] captures what a controller must remember across
//! sessions: every vehicle's sensors and every body's coverage map. It is
//! stored as JSON.
//!
//! # Format
//!
//! ```json
//! {
//!   "version": "0.3.0",
//!   "scanners": [
//!     { "guid": "…", "name": "Surveyor", "sensors": [
//!         { "type": 8, "fov": 5.0, "min_alt": 5000.0, "max_alt": 500000.0, "best_alt": 200000.0 }
//!     ] }
//!   ],
//!   "progress": [ { "name": "Kerbin", "disabled": false, "map": "eJzt…" } ]
//! }
//! ```
//!
//! Loading is best effort. A body map that fails to decode is logged and
//! left empty, and the rest of the state still loads.

mod error;
mod record;

pub use error::{PersistenceError, PersistenceResult};
pub use record::{BodyRecord, ScanState, SensorRecord, VehicleRecord};

use std::fs;
use std::path::Path;

use crate::controller::ScanController;
use crate::coverage::CoverageMap;
use crate::sensor::{SensorEnvelope, SensorType};

/// What a restore managed to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Vehicle records applied.
    pub vehicles: usize,
    /// Body maps restored.
    pub bodies: usize,
    /// Bodies whose map could not be decoded.
    pub failed_bodies: Vec<String>,
    /// Sensor records skipped because their type was not a single sensor.
    pub skipped_sensors: usize,
}

impl ScanState {
    /// Capture the state of a controller.
    pub fn capture<C: CoverageMap + Default>(
        controller: &ScanController<C>,
    ) -> PersistenceResult<Self> {
        let mut scanners: Vec<VehicleRecord> = controller
            .registry()
            .vehicles()
            .map(VehicleRecord::from_state)
            .collect();
        scanners.sort_by_key(|record| record.guid);

        let progress = controller
            .bodies()
            .map(|(name, map)| {
                let blob = map.snapshot().map_err(|source| PersistenceError::Snapshot {
                    body: name.to_string(),
                    source,
                })?;
                Ok(BodyRecord {
                    name: name.to_string(),
                    disabled: !map.is_enabled(),
                    map: blob,
                })
            })
            .collect::<PersistenceResult<Vec<_>>>()?;

        Ok(Self {
            version: crate::VERSION.to_string(),
            scanners,
            progress,
        })
    }

    /// Apply this state to a controller.
    ///
    /// Vehicle sensors are registered on top of what the controller already
    /// has. Body maps replace existing ones.
    pub fn apply<C: CoverageMap + Default>(&self, controller: &mut ScanController<C>) -> RestoreReport {
        let mut report = RestoreReport::default();

        tracing::info!(vehicles = self.scanners.len(), "Loading known vehicles");
        for record in &self.scanners {
            let registry = controller.registry_mut();
            let legacy = record.legacy_sensors();
            if !legacy.is_empty() {
                registry.register_sensors(record.guid, legacy, SensorEnvelope::DEFAULTS);
            }
            for sensor in &record.sensors {
                match SensorType::from_bits(sensor.kind) {
                    Some(kind) if kind.is_single() => {
                        registry.register_sensors(record.guid, kind, sensor.envelope());
                    }
                    _ => {
                        tracing::warn!(
                            vehicle = %record.guid,
                            sensor = sensor.kind,
                            "Skipping unknown sensor type"
                        );
                        report.skipped_sensors += 1;
                    }
                }
            }
            if let (Some(name), Ok(vehicle)) = (&record.name, registry.vehicle_mut(record.guid)) {
                vehicle.name = Some(name.clone());
            }
            report.vehicles += 1;
        }

        for body in &self.progress {
            tracing::info!(body = %body.name, "Loading coverage map");
            let mut map = C::default();
            match map.restore(&body.map) {
                Ok(()) => report.bodies += 1,
                Err(e) => {
                    tracing::warn!(body = %body.name, error = %e, "Failed to restore coverage map");
                    map = C::default();
                    report.failed_bodies.push(body.name.clone());
                }
            }
            map.set_enabled(!body.disabled);
            controller.insert_map(body.name.clone(), map);
        }

        report
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(text: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Write to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> PersistenceResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| PersistenceError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Saved scan state");
        Ok(())
    }

    /// Read from a file.
    pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PersistenceError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}
