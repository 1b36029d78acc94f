//! Per-sensor altitude and field-of-view envelopes.

use serde::{Deserialize, Serialize};

use super::SensorType;

/// Default minimum scanning altitude (meters).
pub const DEFAULT_MIN_ALTITUDE: f64 = 5_000.0;

/// Default maximum scanning altitude (meters).
pub const DEFAULT_MAX_ALTITUDE: f64 = 500_000.0;

/// Default best (full field of view) altitude (meters).
pub const DEFAULT_BEST_ALTITUDE: f64 = 200_000.0;

/// Default field of view (degrees).
pub const DEFAULT_FOV: f64 = 5.0;

/// Field of view for high-resolution altimetry (degrees).
const HI_RES_FOV: f64 = 3.0;

/// Anomaly detail sensors only work close to the surface.
const ANOMALY_DETAIL_ENVELOPE: SensorEnvelope = SensorEnvelope {
    fov: 1.0,
    min_altitude: 0.0,
    max_altitude: 2_000.0,
    best_altitude: 0.0,
};

/// Requested field of view and altitude envelope for a registration.
///
/// A non-positive `max_altitude` means "use the built-in profile", which is
/// resolved per sensor bit by [`SensorEnvelope::resolve_for`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorEnvelope {
    /// Nominal field of view at best altitude (degrees).
    pub fov: f64,
    /// Lowest altitude at which the sensor works (meters).
    pub min_altitude: f64,
    /// Highest altitude at which the sensor works (meters).
    pub max_altitude: f64,
    /// Altitude at and above which the full field of view applies (meters).
    pub best_altitude: f64,
}

impl SensorEnvelope {
    /// Envelope that asks the registry for per-bit defaults.
    pub const DEFAULTS: SensorEnvelope = SensorEnvelope {
        fov: 0.0,
        min_altitude: 0.0,
        max_altitude: 0.0,
        best_altitude: 0.0,
    };

    /// Create an explicit envelope.
    pub fn new(fov: f64, min_altitude: f64, max_altitude: f64, best_altitude: f64) -> Self {
        Self {
            fov,
            min_altitude,
            max_altitude,
            best_altitude,
        }
    }

    /// Whether this envelope requests the built-in profile.
    #[inline]
    pub fn uses_defaults(&self) -> bool {
        self.max_altitude <= 0.0
    }

    /// Resolve the envelope that applies to one sensor bit.
    ///
    /// Explicit envelopes are returned as-is. Default requests get the
    /// generic profile, narrowed for high-resolution altimetry and replaced
    /// entirely for anomaly detail.
    pub fn resolve_for(&self, sensor: SensorType) -> SensorEnvelope {
        if !self.uses_defaults() {
            return *self;
        }

        if sensor.intersects(SensorType::ANOMALY_DETAIL) {
            return ANOMALY_DETAIL_ENVELOPE;
        }

        let fov = if sensor.intersects(SensorType::ALTIMETRY_HI_RES) {
            HI_RES_FOV
        } else {
            DEFAULT_FOV
        };

        SensorEnvelope {
            fov,
            min_altitude: DEFAULT_MIN_ALTITUDE,
            max_altitude: DEFAULT_MAX_ALTITUDE,
            best_altitude: DEFAULT_BEST_ALTITUDE,
        }
    }
}

/// Configuration of one sensor bit on one vehicle.
///
/// `in_range` and `at_best_range` are transient: the sampler recomputes them
/// on every processed sample.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorConfig {
    /// The single sensor bit this configuration belongs to.
    pub kind: SensorType,
    /// Nominal field of view (degrees).
    pub fov: f64,
    /// Minimum working altitude (meters).
    pub min_altitude: f64,
    /// Maximum working altitude (meters).
    pub max_altitude: f64,
    /// Best altitude (meters).
    pub best_altitude: f64,
    /// Whether the last processed sample was inside the altitude envelope.
    pub in_range: bool,
    /// Whether the last processed sample was at or above best altitude.
    pub at_best_range: bool,
}

impl SensorConfig {
    /// Build a configuration for `kind` from a resolved envelope.
    pub fn new(kind: SensorType, envelope: SensorEnvelope) -> Self {
        Self {
            kind,
            fov: envelope.fov,
            min_altitude: envelope.min_altitude,
            max_altitude: envelope.max_altitude,
            best_altitude: envelope.best_altitude,
            in_range: false,
            at_best_range: false,
        }
    }

    /// Overwrite the envelope, keeping the transient range flags.
    pub fn apply(&mut self, envelope: SensorEnvelope) {
        self.fov = envelope.fov;
        self.min_altitude = envelope.min_altitude;
        self.max_altitude = envelope.max_altitude;
        self.best_altitude = envelope.best_altitude;
    }

    /// The configured envelope.
    pub fn envelope(&self) -> SensorEnvelope {
        SensorEnvelope {
            fov: self.fov,
            min_altitude: self.min_altitude,
            max_altitude: self.max_altitude,
            best_altitude: self.best_altitude,
        }
    }
}
