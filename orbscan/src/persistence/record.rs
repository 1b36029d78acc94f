//! Serialized records.

use serde::{Deserialize, Serialize};

use crate::sensor::{SensorConfig, SensorEnvelope, SensorType, VehicleId, VehicleState};

/// Everything saved for a scanning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    /// Version of the library that wrote the state.
    #[serde(default)]
    pub version: String,
    /// Known vehicles and their sensors.
    #[serde(default)]
    pub scanners: Vec<VehicleRecord>,
    /// Coverage of each body.
    #[serde(default)]
    pub progress: Vec<BodyRecord>,
}

/// One vehicle and its sensors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Stable vehicle id.
    pub guid: VehicleId,
    /// Display name. Written for readability, not needed to restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Older saves stored only a raw sensor mask; those sensors get default
    /// envelopes on load. Unknown bits are ignored.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sensors_mask: u32,
    /// Individually configured sensors.
    #[serde(default)]
    pub sensors: Vec<SensorRecord>,
}

impl VehicleRecord {
    /// Sensors named by the legacy mask.
    pub fn legacy_sensors(&self) -> SensorType {
        SensorType::from_bits_truncate(self.sensors_mask)
    }

    /// Record a registry entry.
    pub fn from_state(state: &VehicleState) -> Self {
        Self {
            guid: state.id,
            name: state.name.clone(),
            sensors_mask: 0,
            sensors: state.sensors.values().map(SensorRecord::from_config).collect(),
        }
    }
}

fn is_zero(mask: &u32) -> bool {
    *mask == 0
}

/// One sensor's envelope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRecord {
    /// Raw sensor bits; must be a single sensor to load.
    #[serde(rename = "type")]
    pub kind: u32,
    pub fov: f64,
    pub min_alt: f64,
    pub max_alt: f64,
    pub best_alt: f64,
}

impl SensorRecord {
    /// Record a sensor configuration.
    pub fn from_config(config: &SensorConfig) -> Self {
        Self {
            kind: config.kind.bits(),
            fov: config.fov,
            min_alt: config.min_altitude,
            max_alt: config.max_altitude,
            best_alt: config.best_altitude,
        }
    }

    /// The envelope to register.
    pub fn envelope(&self) -> SensorEnvelope {
        SensorEnvelope::new(self.fov, self.min_alt, self.max_alt, self.best_alt)
    }
}

/// One body's coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    /// Body name.
    pub name: String,
    /// Whether scanning of the body is disabled.
    #[serde(default)]
    pub disabled: bool,
    /// Encoded coverage map.
    #[serde(default)]
    pub map: String,
}
