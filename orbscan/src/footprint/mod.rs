//! Sensor footprint projection.
//!
//! Converts a sensor's envelope and the vehicle's current altitude into the
//! block of one-degree cells the sensor sees.
//!
//! # Rules
//!
//! ```text
//! out of range:   altitude < min  or  altitude > min(max, soi_altitude)
//! below best:     fov *= altitude / min(best, min(max, soi_altitude))
//! body scaling:   fov *= sqrt(max(1, 600 km / radius))
//! clamp:          0 <= fov <= 20
//! cells:          x, y in [-floor(fov), floor(fov) + round(frac(fov))]
//! ```
//!
//! The footprint is a near-square block, biased one cell towards the
//! north-east when the fractional part rounds up.

use crate::sensor::SensorConfig;

/// Body radius at which no angular scaling is applied (meters).
pub const REFERENCE_RADIUS: f64 = 600_000.0;

/// Largest field of view a footprint may have (degrees).
pub const MAX_FOV_DEG: f64 = 20.0;

/// The cells one sensor covers at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    /// Effective field of view after all scaling (degrees, 0..=20).
    pub fov: f64,
    /// Cells extending west/south of the sample.
    pub near: i32,
    /// Cells extending east/north of the sample.
    pub far: i32,
    /// Whether the sensor was at or above its best altitude.
    pub at_best_range: bool,
}

impl Footprint {
    fn from_fov(fov: f64, at_best_range: bool) -> Self {
        let fov = fov.clamp(0.0, MAX_FOV_DEG);
        let near = fov.floor();
        let far = near + (fov - near).round_ties_even();
        Self {
            fov,
            near: near as i32,
            far: far as i32,
            at_best_range,
        }
    }

    /// Integer degree offsets `(dx, dy)` covered by this footprint.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> {
        let (near, far) = (self.near, self.far);
        (-near..=far).flat_map(move |x| (-near..=far).map(move |y| (x, y)))
    }

    /// Absolute `(lon, lat)` points to register around a sample.
    ///
    /// Points are not wrapped; the coverage map folds them onto its grid.
    pub fn cells(&self, lon: f64, lat: f64) -> impl Iterator<Item = (f64, f64)> {
        self.offsets()
            .map(move |(x, y)| (lon + x as f64, lat + y as f64))
    }

    /// Number of cells in the footprint.
    pub fn cell_count(&self) -> usize {
        let side = (self.near + self.far + 1) as usize;
        side * side
    }
}

/// Angular scale factor for a body of the given radius.
///
/// Bodies smaller than the reference get wider angular footprints so the
/// ground area seen stays comparable.
#[inline]
pub fn surface_scale(body_radius: f64) -> f64 {
    (REFERENCE_RADIUS / body_radius).max(1.0).sqrt()
}

/// Project a sensor's footprint at `altitude`.
///
/// Returns `None` when the altitude is outside the sensor's working
/// envelope, whose ceiling is capped by `soi_altitude` (the height of the
/// sphere of influence above the surface).
pub fn project(
    sensor: &SensorConfig,
    altitude: f64,
    body_radius: f64,
    soi_altitude: f64,
) -> Option<Footprint> {
    let ceiling = sensor.max_altitude.min(soi_altitude);
    if altitude < sensor.min_altitude || altitude > ceiling {
        return None;
    }

    let best = sensor.best_altitude.min(ceiling);
    let (mut fov, at_best_range) = if altitude < best && best > 0.0 {
        (sensor.fov * altitude / best, false)
    } else {
        (sensor.fov, true)
    };

    fov *= surface_scale(body_radius);
    Some(Footprint::from_fov(fov, at_best_range))
}

/// Project a footprint and record the range flags on the sensor.
pub fn assess(
    sensor: &mut SensorConfig,
    altitude: f64,
    body_radius: f64,
    soi_altitude: f64,
) -> Option<Footprint> {
    let footprint = project(sensor, altitude, body_radius, soi_altitude);
    sensor.in_range = footprint.is_some();
    sensor.at_best_range = footprint.is_some_and(|f| f.at_best_range);
    footprint
}
