//! Celestial body description.

use serde::{Deserialize, Serialize};

/// Static properties of a body that scanning depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Unique body name, used to key coverage maps.
    pub name: String,
    /// Mean radius (meters).
    pub radius: f64,
    /// Sphere of influence radius measured from the center (meters).
    pub sphere_of_influence: f64,
    /// Sidereal rotation period (seconds), `None` for tidally static bodies.
    pub rotation_period: Option<f64>,
    /// Whether the body has terrain that altimetry can measure.
    pub has_terrain: bool,
    /// Whether the body has a biome map.
    pub has_biomes: bool,
}

impl Body {
    /// Create a non-rotating body with terrain and biomes.
    pub fn new(name: impl Into<String>, radius: f64, sphere_of_influence: f64) -> Self {
        Self {
            name: name.into(),
            radius,
            sphere_of_influence,
            rotation_period: None,
            has_terrain: true,
            has_biomes: true,
        }
    }

    /// Set the sidereal rotation period.
    pub fn with_rotation_period(mut self, seconds: f64) -> Self {
        self.rotation_period = Some(seconds);
        self
    }

    /// Set whether altimetry has terrain to measure.
    pub fn with_terrain(mut self, has_terrain: bool) -> Self {
        self.has_terrain = has_terrain;
        self
    }

    /// Set whether a biome map exists.
    pub fn with_biomes(mut self, has_biomes: bool) -> Self {
        self.has_biomes = has_biomes;
        self
    }

    /// Whether the body rotates.
    pub fn rotates(&self) -> bool {
        self.rotation_period.is_some_and(|p| p > 0.0)
    }

    /// Height of the sphere of influence above the surface (meters).
    ///
    /// No sensor works above this, whatever its configured ceiling.
    #[inline]
    pub fn soi_altitude(&self) -> f64 {
        self.sphere_of_influence - self.radius
    }

    /// Degrees the body turns between `reference_ut` and `ut`.
    ///
    /// Negative when `ut` precedes the reference. Zero for bodies that do
    /// not rotate.
    pub fn rotation_offset(&self, ut: f64, reference_ut: f64) -> f64 {
        match self.rotation_period {
            Some(period) if period > 0.0 => (360.0 * ((ut - reference_ut) / period)) % 360.0,
            _ => 0.0,
        }
    }
}
