//! Sensor types, envelopes and the per-vehicle registry.
//!
//! # Example
//!
//! ```
//! use orbscan::sensor::{SensorEnvelope, SensorRegistry, SensorType, VehicleId};
//!
//! let mut registry = SensorRegistry::new();
//! let probe = VehicleId::new_random();
//!
//! // Non-positive max altitude selects the built-in profile per bit.
//! registry.register_sensors(probe, SensorType::ALTIMETRY, SensorEnvelope::DEFAULTS);
//! assert_eq!(registry.active_sensors(probe), SensorType::ALTIMETRY);
//!
//! registry.unregister_sensors(probe, SensorType::ALTIMETRY);
//! assert!(!registry.is_known(probe));
//! ```

mod config;
mod registry;
mod types;

pub use config::{
    SensorConfig, SensorEnvelope, DEFAULT_BEST_ALTITUDE, DEFAULT_FOV, DEFAULT_MAX_ALTITUDE,
    DEFAULT_MIN_ALTITUDE,
};
pub use registry::{LookupError, SensorRegistry, VehicleId, VehicleState};
pub use types::SensorType;
