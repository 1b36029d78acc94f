//! Circular-orbit reference ephemeris.
//!
//! Good enough for demos and tests: a vehicle on a circular, inclined orbit
//! around a body whose prime meridian points along +X at UT 0. Hosts with
//! real orbit propagation provide their own [`Ephemeris`].

use std::f64::consts::TAU;

use super::{Body, Ephemeris, Position, SurfacePoint};

/// A circular orbit with fixed inclination.
#[derive(Debug, Clone)]
pub struct CircularOrbit {
    /// Orbit radius from the body's center (meters).
    radius: f64,
    /// Orbital period (seconds).
    period: f64,
    /// Inclination (radians).
    inclination: f64,
    /// Phase angle at `epoch` (radians, measured from the ascending node).
    phase: f64,
    /// UT at which the vehicle is at `phase`.
    epoch: f64,
    /// UT whose body orientation `surface_point` answers in.
    frame_ut: f64,
    /// Body rotation period (seconds), if it rotates.
    body_rotation_period: Option<f64>,
}

impl CircularOrbit {
    /// Orbit `altitude` meters above `body`, given the body's gravitational
    /// parameter `mu` (m³/s²).
    pub fn new(body: &Body, altitude: f64, mu: f64) -> Self {
        let radius = body.radius + altitude;
        let period = if mu > 0.0 && radius > 0.0 {
            TAU * (radius.powi(3) / mu).sqrt()
        } else {
            0.0
        };
        Self {
            radius,
            period,
            inclination: 0.0,
            phase: 0.0,
            epoch: 0.0,
            frame_ut: 0.0,
            body_rotation_period: body.rotation_period,
        }
    }

    /// Set the inclination in degrees.
    pub fn with_inclination(mut self, degrees: f64) -> Self {
        self.inclination = degrees.to_radians();
        self
    }

    /// Set the phase (degrees past the ascending node) at `epoch`.
    pub fn with_phase(mut self, degrees: f64, epoch: f64) -> Self {
        self.phase = degrees.to_radians();
        self.epoch = epoch;
        self
    }

    /// Orient the body-fixed frame as at `ut`.
    ///
    /// Hosts call this once per tick, before sampling.
    pub fn set_frame_time(&mut self, ut: f64) {
        self.frame_ut = ut;
    }

    /// Orbit radius from the body's center (meters).
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Surface coordinates directly below the vehicle at `ut`.
    pub fn ground_point(&self, body: &Body, ut: f64) -> Option<SurfacePoint> {
        let position = self.position_at(ut)?;
        Some(self.surface_point_at(body, position, ut, self.frame_ut))
    }

    fn frame_rotation(&self) -> f64 {
        match self.body_rotation_period {
            Some(period) if period > 0.0 => (self.frame_ut / period * TAU) % TAU,
            _ => 0.0,
        }
    }
}

impl Ephemeris for CircularOrbit {
    fn orbital_period(&self) -> f64 {
        self.period
    }

    fn orbit_time_at(&self, ut: f64) -> f64 {
        if self.period.is_nan() || self.period <= 0.0 || !ut.is_finite() {
            return f64::NAN;
        }
        (ut - self.epoch + self.phase / TAU * self.period).rem_euclid(self.period)
    }

    fn position_at(&self, ut: f64) -> Option<Position> {
        let t = self.orbit_time_at(ut);
        if !t.is_finite() {
            return None;
        }
        let angle = t / self.period * TAU;
        let (sin, cos) = angle.sin_cos();
        Some(Position::new(
            self.radius * cos,
            self.radius * sin * self.inclination.cos(),
            self.radius * sin * self.inclination.sin(),
        ))
    }

    fn surface_point(&self, body: &Body, position: Position) -> SurfacePoint {
        let r = position.magnitude();
        let latitude = if r > 0.0 {
            (position.z / r).clamp(-1.0, 1.0).asin().to_degrees()
        } else {
            0.0
        };
        let longitude = (position.y.atan2(position.x) - self.frame_rotation()).to_degrees();
        SurfacePoint {
            altitude: r - body.radius,
            latitude,
            longitude,
        }
    }
}
