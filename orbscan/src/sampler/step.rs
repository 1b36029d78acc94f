//! Bisection work items.

use crate::ephemeris::SurfacePoint;

/// One sample to evaluate within a vehicle pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanStep {
    /// Time of this sample.
    pub ut: f64,
    /// Younger end of the interval this branch is refining.
    pub start_ut: f64,
    /// Older end of the interval this branch is refining.
    pub last_ut: f64,
    /// Latitude of the sample this step refines.
    pub prev_latitude: f64,
    /// Longitude of the sample this step refines.
    pub prev_longitude: f64,
    /// Bisection depth; 0 is the live sample at the tick.
    pub depth: u32,
}

impl ScanStep {
    /// The live sample at the tick, refining back towards the vehicle's
    /// previous sample.
    pub fn initial(tick_ut: f64, last_ut: f64, last_latitude: f64, last_longitude: f64) -> Self {
        Self {
            ut: tick_ut,
            start_ut: tick_ut,
            last_ut,
            prev_latitude: last_latitude,
            prev_longitude: last_longitude,
            depth: 0,
        }
    }

    /// The branch covering `(ut, start_ut)`, if that interval is not empty.
    ///
    /// Its older end is this step's time.
    pub fn younger_half(&self, point: &SurfacePoint) -> Option<Self> {
        (self.start_ut > self.ut).then(|| Self {
            ut: midpoint(self.start_ut, self.ut),
            start_ut: self.start_ut,
            last_ut: self.ut,
            prev_latitude: point.latitude,
            prev_longitude: point.longitude,
            depth: self.depth + 1,
        })
    }

    /// The next step of this branch, halfway back towards `last_ut`.
    pub fn refine(&self, point: &SurfacePoint) -> Self {
        Self {
            ut: midpoint(self.last_ut, self.ut),
            start_ut: self.ut,
            last_ut: self.last_ut,
            prev_latitude: point.latitude,
            prev_longitude: point.longitude,
            depth: self.depth + 1,
        }
    }
}

#[inline]
fn midpoint(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}
