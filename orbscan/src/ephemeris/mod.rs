//! Orbital position collaborator.
//!
//! The scanning core never propagates orbits itself. It asks an
//! [`Ephemeris`] where the vehicle is at a given universal time and how that
//! position maps onto the body's surface.
//!
//! # Frames
//!
//! `surface_point` answers in the body-fixed frame as the body is oriented
//! at the current tick. Interpolated samples at other times are corrected by
//! the rotation the body accumulates between that time and the tick, see
//! [`Body::rotation_offset`].

mod body;
mod circular;

pub use body::Body;
pub use circular::CircularOrbit;

use crate::coord::{normalize_latitude, normalize_longitude};

/// A position relative to the body's center (meters).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance from the body's center.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Whether every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Altitude and surface coordinates under a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Altitude above the reference surface (meters).
    pub altitude: f64,
    /// Latitude (degrees).
    pub latitude: f64,
    /// Longitude (degrees).
    pub longitude: f64,
}

/// Orbit interpolation for one vehicle.
pub trait Ephemeris {
    /// Orbital period in seconds. Non-positive for degenerate orbits.
    fn orbital_period(&self) -> f64;

    /// Time since periapsis at `ut`. Non-finite when the orbit cannot be
    /// evaluated at that time.
    fn orbit_time_at(&self, ut: f64) -> f64;

    /// Position relative to the body at `ut`, if it can be computed.
    fn position_at(&self, ut: f64) -> Option<Position>;

    /// Surface coordinates under `position`, body oriented as at the
    /// current tick.
    fn surface_point(&self, body: &Body, position: Position) -> SurfacePoint;

    /// Surface coordinates under a position sampled at `ut`, with the
    /// longitude corrected for body rotation since `reference_ut`.
    ///
    /// Angles come back normalized.
    fn surface_point_at(
        &self,
        body: &Body,
        position: Position,
        ut: f64,
        reference_ut: f64,
    ) -> SurfacePoint {
        let raw = self.surface_point(body, position);
        let rotation = body.rotation_offset(ut, reference_ut);
        SurfacePoint {
            altitude: raw.altitude,
            latitude: normalize_latitude(raw.latitude),
            longitude: normalize_longitude(raw.longitude - rotation),
        }
    }
}
