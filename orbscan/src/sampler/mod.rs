//! Adaptive interval-bisection scan sampler.
//!
//! When time compression stretches the gap between two ticks, registering
//! only the current position would leave the ground track between the two
//! samples unscanned. The sampler fills that gap by interpolating positions
//! from the vehicle's orbit, halving the interval until consecutive samples
//! are within the convergence distance or the depth limit is reached.
//!
//! # Design
//!
//! The recursion is unrolled into a FIFO work queue. Each step carries its
//! own interval bounds and the position of the sample it refines:
//!
//! ```text
//! depth 0   tick ──────────────────────────────────── (registered)
//! depth 1   last ─────────────── mid ─────────────── tick
//! depth 2   last ──── q1 ──── mid        mid ──── q3 ──── tick
//!                     ▲ continues          ▲ queued
//! ```
//!
//! The younger half is queued while the older half continues immediately.
//! The work of one pass is bounded by the depth limit alone, no matter how
//! much time elapsed.

mod step;

pub use step::ScanStep;

use std::collections::VecDeque;

use thiserror::Error;

use crate::config::ScanConfig;
use crate::coord::{normalize_latitude, normalize_longitude};
use crate::coverage::CoverageMap;
use crate::ephemeris::{Body, Ephemeris, SurfacePoint};
use crate::footprint;
use crate::sensor::{VehicleId, VehicleState};

/// Recoverable conditions met while sampling.
///
/// Nothing here is fatal: each one ends at most one branch of a pass.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    /// The orbit cannot be evaluated at an interpolated time.
    #[error("orbit cannot be evaluated at UT {ut} (depth {depth})")]
    InvalidOrbitState { ut: f64, depth: u32 },

    /// The vehicle has no usable previous sample to interpolate towards.
    #[error("vehicle {0} has no previous sample to interpolate from")]
    StaleAnchor(VehicleId),
}

/// Live state of a vehicle at the current tick.
pub struct VehicleSample<'a> {
    /// Body the vehicle orbits.
    pub body: &'a Body,
    /// Current latitude (degrees, any range).
    pub latitude: f64,
    /// Current longitude (degrees, any range).
    pub longitude: f64,
    /// Altitude above the reference surface (meters).
    pub altitude: f64,
    /// Height above terrain (meters), when the host knows it.
    pub terrain_altitude: Option<f64>,
    /// Whether the vehicle is landed or splashed down.
    pub landed: bool,
    /// Orbit interpolation for this vehicle.
    pub ephemeris: &'a dyn Ephemeris,
}

impl VehicleSample<'_> {
    /// Altitude used for the sample at the tick itself.
    ///
    /// Prefers terrain-relative height when it is available and not
    /// negative.
    pub fn sensing_altitude(&self) -> f64 {
        self.terrain_altitude
            .filter(|height| *height >= 0.0)
            .unwrap_or(self.altitude)
    }
}

/// Counters for one vehicle pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Samples that were registered against sensors.
    pub samples: u32,
    /// Deepest bisection level evaluated.
    pub max_depth: u32,
    /// Steps abandoned because the orbit could not be evaluated.
    pub abandoned: u32,
    /// Steps dropped because they were within the convergence distance.
    pub converged: u32,
}

/// What to do after a step has been processed.
enum Flow {
    /// Keep refining the current branch.
    Continue(ScanStep),
    /// This branch is finished; take the next queued one.
    Dequeue,
    /// The whole pass is finished.
    Stop,
}

/// Bisection engine, reused across vehicles and ticks.
#[derive(Debug)]
pub struct ScanSampler {
    queue: VecDeque<ScanStep>,
    max_resolution: u32,
    convergence_deg: f64,
}

impl Default for ScanSampler {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

impl ScanSampler {
    /// Create a sampler with an explicit depth limit and convergence
    /// distance (degrees).
    pub fn new(max_resolution: u32, convergence_deg: f64) -> Self {
        Self {
            queue: VecDeque::new(),
            max_resolution,
            convergence_deg,
        }
    }

    /// Create a sampler from scan configuration.
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.max_resolution, config.convergence_deg)
    }

    /// Maximum bisection depth.
    pub fn max_resolution(&self) -> u32 {
        self.max_resolution
    }

    /// Run one vehicle pass for the tick at `tick_ut`.
    ///
    /// Registers the current sample and, when the vehicle has a valid
    /// previous sample, the interpolated samples between the two. Sensor
    /// range flags on `vehicle` are updated along the way. The vehicle's
    /// anchor is not touched; the caller records it after the pass.
    pub fn scan_pass<C>(
        &mut self,
        vehicle: &mut VehicleState,
        sample: &VehicleSample<'_>,
        tick_ut: f64,
        coverage: &mut C,
    ) -> PassStats
    where
        C: CoverageMap + ?Sized,
    {
        self.queue.clear();
        let mut stats = PassStats::default();

        let mut next = Some(ScanStep::initial(
            tick_ut,
            vehicle.last_universal_time,
            vehicle.last_latitude,
            vehicle.last_longitude,
        ));

        while let Some(step) = next.take().or_else(|| self.queue.pop_front()) {
            match self.process(step, vehicle, sample, tick_ut, coverage, &mut stats) {
                Flow::Continue(refined) => next = Some(refined),
                Flow::Dequeue => {}
                Flow::Stop => break,
            }
        }
        self.queue.clear();

        tracing::trace!(
            vehicle = %vehicle.id,
            samples = stats.samples,
            max_depth = stats.max_depth,
            abandoned = stats.abandoned,
            "Scan pass complete"
        );
        stats
    }

    fn process<C>(
        &mut self,
        step: ScanStep,
        vehicle: &mut VehicleState,
        sample: &VehicleSample<'_>,
        tick_ut: f64,
        coverage: &mut C,
        stats: &mut PassStats,
    ) -> Flow
    where
        C: CoverageMap + ?Sized,
    {
        let point = if step.depth > 0 {
            match locate(&step, sample, tick_ut) {
                Ok(point) => point,
                Err(err) => {
                    tracing::trace!(vehicle = %vehicle.id, error = %err, "Abandoning scan step");
                    stats.abandoned += 1;
                    return Flow::Dequeue;
                }
            }
        } else {
            SurfacePoint {
                altitude: sample.sensing_altitude(),
                latitude: normalize_latitude(sample.latitude),
                longitude: normalize_longitude(sample.longitude),
            }
        };
        stats.max_depth = stats.max_depth.max(step.depth);

        if step.depth > 0 && self.converged(&step, &point) {
            stats.converged += 1;
            return Flow::Dequeue;
        }
        stats.samples += 1;

        let body = sample.body;
        let soi_altitude = body.soi_altitude();
        let mut uncovered = step.depth == 0;
        for sensor in vehicle.sensors.values_mut() {
            if step.depth == 0 && coverage.coverage(sensor.kind) > 0.0 {
                uncovered = false;
            }
            let Some(footprint) =
                footprint::assess(sensor, point.altitude, body.radius, soi_altitude)
            else {
                continue;
            };
            for (lon, lat) in footprint.cells(point.longitude, point.latitude) {
                coverage.register_pass(lon, lat, sensor.kind);
            }
        }
        if uncovered {
            return Flow::Stop;
        }

        if let Err(err) = check_anchor(vehicle) {
            tracing::trace!(error = %err, "Registering current sample only");
            return Flow::Stop;
        }
        if sample.landed {
            return Flow::Stop;
        }
        if step.depth >= self.max_resolution {
            return Flow::Dequeue;
        }

        if let Some(younger) = step.younger_half(&point) {
            self.queue.push_back(younger);
        }
        Flow::Continue(step.refine(&point))
    }

    fn converged(&self, step: &ScanStep, point: &SurfacePoint) -> bool {
        (point.latitude - step.prev_latitude).abs() < self.convergence_deg
            && (point.longitude - step.prev_longitude).abs() < self.convergence_deg
    }
}

/// Interpolated surface point for a refinement step.
fn locate(
    step: &ScanStep,
    sample: &VehicleSample<'_>,
    tick_ut: f64,
) -> Result<SurfacePoint, ScanError> {
    let invalid = || ScanError::InvalidOrbitState {
        ut: step.ut,
        depth: step.depth,
    };
    let ephemeris = sample.ephemeris;
    let period = ephemeris.orbital_period();

    if !step.ut.is_finite() || period.is_nan() || period <= 0.0 {
        return Err(invalid());
    }
    if !ephemeris.orbit_time_at(step.ut).is_finite() {
        return Err(invalid());
    }
    let position = ephemeris
        .position_at(step.ut)
        .filter(|position| position.is_finite())
        .ok_or_else(invalid)?;

    let mut point = ephemeris.surface_point_at(sample.body, position, step.ut, tick_ut);
    point.altitude = point.altitude.max(0.0);
    Ok(point)
}

fn check_anchor(vehicle: &VehicleState) -> Result<(), ScanError> {
    if vehicle.has_anchor() {
        Ok(())
    } else {
        Err(ScanError::StaleAnchor(vehicle.id))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::coverage::GridCoverage;
    use crate::ephemeris::{CircularOrbit, Position};
    use crate::sensor::{SensorEnvelope, SensorRegistry, SensorType};
    use uuid::Uuid;

    const KERBIN_MU: f64 = 3.5316e12;

    fn kerbin() -> Body {
        Body::new("Kerbin", 600_000.0, 84_159_286.0)
    }

    /// Ephemeris whose ground track moves 3° of longitude per second and
    /// records every time it is asked for a position.
    struct Linear {
        period: f64,
        calls: RefCell<Vec<f64>>,
    }

    impl Linear {
        fn new(period: f64) -> Self {
            Self {
                period,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Ephemeris for Linear {
        fn orbital_period(&self) -> f64 {
            self.period
        }

        fn orbit_time_at(&self, ut: f64) -> f64 {
            ut
        }

        fn position_at(&self, ut: f64) -> Option<Position> {
            self.calls.borrow_mut().push(ut);
            Some(Position::new(ut, 0.0, 0.0))
        }

        fn surface_point(&self, _body: &Body, position: Position) -> SurfacePoint {
            SurfacePoint {
                altitude: 200_000.0,
                latitude: 0.0,
                longitude: position.x * 3.0,
            }
        }
    }

    /// Ephemeris that always reports the same ground point.
    struct Parked;

    impl Ephemeris for Parked {
        fn orbital_period(&self) -> f64 {
            2_000.0
        }

        fn orbit_time_at(&self, ut: f64) -> f64 {
            ut
        }

        fn position_at(&self, _ut: f64) -> Option<Position> {
            Some(Position::new(1.0, 0.0, 0.0))
        }

        fn surface_point(&self, _body: &Body, _position: Position) -> SurfacePoint {
            SurfacePoint {
                altitude: 200_000.0,
                latitude: 10.0,
                longitude: 20.0,
            }
        }
    }

    fn vehicle_with(mask: SensorType) -> VehicleState {
        let id = VehicleId(Uuid::from_u128(7));
        let mut registry = SensorRegistry::new();
        registry.register_sensors(id, mask, SensorEnvelope::DEFAULTS);
        registry.vehicle(id).unwrap().clone()
    }

    fn anchored(mut vehicle: VehicleState, lat: f64, lon: f64, ut: f64) -> VehicleState {
        vehicle.record_anchor("Kerbin", lat, lon, 1, ut);
        vehicle
    }

    /// A coverage map that already has something for `mask`, so the first
    /// sample of a pass is not treated as uncovered.
    fn seeded(mask: SensorType) -> GridCoverage {
        let mut grid = GridCoverage::new();
        grid.register_pass(-100.0, -60.0, mask);
        grid.refresh();
        grid
    }

    fn sample<'a>(body: &'a Body, eph: &'a dyn Ephemeris, lat: f64, lon: f64) -> VehicleSample<'a> {
        VehicleSample {
            body,
            latitude: lat,
            longitude: lon,
            altitude: 200_000.0,
            terrain_altitude: None,
            landed: false,
            ephemeris: eph,
        }
    }

    #[test]
    fn test_uncovered_first_sample_stops_pass() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = anchored(vehicle_with(SensorType::BIOME), 0.0, 0.0, 50.0);
        let mut grid = GridCoverage::new();
        grid.refresh();

        let mut sampler = ScanSampler::default();
        let stats = sampler.scan_pass(&mut vehicle, &sample(&body, &eph, 0.0, 100.0), 100.0, &mut grid);

        assert_eq!(stats.samples, 1);
        assert!(eph.calls.borrow().is_empty());
        grid.refresh();
        assert_eq!(grid.covered_cells(SensorType::BIOME), 121);
    }

    #[test]
    fn test_stale_anchor_registers_single_point() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = vehicle_with(SensorType::BIOME);
        let mut grid = seeded(SensorType::BIOME);

        let mut sampler = ScanSampler::default();
        let stats = sampler.scan_pass(&mut vehicle, &sample(&body, &eph, 0.0, 100.0), 100.0, &mut grid);

        assert_eq!(stats.samples, 1);
        assert_eq!(stats.max_depth, 0);
        assert!(eph.calls.borrow().is_empty());
    }

    #[test]
    fn test_landed_registers_single_point() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = anchored(vehicle_with(SensorType::BIOME), 0.0, 0.0, 50.0);
        let mut grid = seeded(SensorType::BIOME);

        let mut landed = sample(&body, &eph, 0.0, 100.0);
        landed.landed = true;
        landed.altitude = 6_000.0;
        let stats = ScanSampler::default().scan_pass(&mut vehicle, &landed, 100.0, &mut grid);

        assert_eq!(stats.samples, 1);
        assert!(eph.calls.borrow().is_empty());
    }

    #[test]
    fn test_convergence_short_circuit() {
        let body = kerbin();
        let mut vehicle = anchored(vehicle_with(SensorType::BIOME), 10.0, 20.0, 50.0);
        let mut grid = seeded(SensorType::BIOME);

        let stats = ScanSampler::default().scan_pass(
            &mut vehicle,
            &sample(&body, &Parked, 10.0, 20.0),
            100.0,
            &mut grid,
        );

        assert_eq!(stats.samples, 1);
        assert_eq!(stats.converged, 1);
        assert_eq!(stats.max_depth, 1);
    }

    #[test]
    fn test_refinement_order_is_fifo() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = anchored(vehicle_with(SensorType::BIOME), 0.0, 0.0, 1.0);
        let mut grid = seeded(SensorType::BIOME);

        // Anchor at UT 1 so the interval is [1, 101] with midpoints on
        // exact binary fractions.
        let mut sampler = ScanSampler::new(3, 1.0);
        let stats = sampler.scan_pass(&mut vehicle, &sample(&body, &eph, 0.0, 303.0), 101.0, &mut grid);

        assert_eq!(
            *eph.calls.borrow(),
            vec![51.0, 26.0, 13.5, 76.0, 63.5, 38.5, 88.5]
        );
        assert_eq!(stats.samples, 8);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn test_invalid_orbit_abandons_step() {
        let body = kerbin();
        let eph = Linear::new(0.0);
        let mut vehicle = anchored(vehicle_with(SensorType::BIOME), 0.0, 0.0, 50.0);
        let mut grid = seeded(SensorType::BIOME);

        let stats = ScanSampler::default().scan_pass(
            &mut vehicle,
            &sample(&body, &eph, 0.0, 100.0),
            100.0,
            &mut grid,
        );

        assert_eq!(stats.samples, 1);
        assert_eq!(stats.abandoned, 1);
        assert!(eph.calls.borrow().is_empty());
    }

    #[test]
    fn test_out_of_range_sensor_registers_nothing() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = vehicle_with(SensorType::ANOMALY_DETAIL);
        let mut grid = seeded(SensorType::ANOMALY_DETAIL);

        let stats = ScanSampler::default().scan_pass(
            &mut vehicle,
            &sample(&body, &eph, 45.0, 45.0),
            100.0,
            &mut grid,
        );

        assert_eq!(stats.samples, 1);
        let sensor = &vehicle.sensors[&SensorType::ANOMALY_DETAIL];
        assert!(!sensor.in_range);
        assert!(!sensor.at_best_range);
        assert_eq!(grid.covered_cells(SensorType::ANOMALY_DETAIL), 1);
    }

    #[test]
    fn test_terrain_altitude_preferred_at_tick() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = vehicle_with(SensorType::ANOMALY_DETAIL);
        let mut grid = seeded(SensorType::ANOMALY_DETAIL);

        let mut low = sample(&body, &eph, 45.0, 45.0);
        low.altitude = 10_000.0;
        low.terrain_altitude = Some(1_500.0);
        ScanSampler::default().scan_pass(&mut vehicle, &low, 100.0, &mut grid);

        assert!(vehicle.sensors[&SensorType::ANOMALY_DETAIL].in_range);
        assert_eq!(low.sensing_altitude(), 1_500.0);

        low.terrain_altitude = Some(-3.0);
        assert_eq!(low.sensing_altitude(), 10_000.0);
    }

    #[test]
    fn test_time_warp_fills_ground_track() {
        let body = kerbin();
        let orbit = CircularOrbit::new(&body, 200_000.0, KERBIN_MU);
        let period = orbit.orbital_period();
        let start = orbit.ground_point(&body, 10.0).unwrap();
        let mut vehicle = anchored(
            vehicle_with(SensorType::ALTIMETRY_LO_RES),
            start.latitude,
            start.longitude,
            10.0,
        );
        let mut grid = seeded(SensorType::ALTIMETRY_LO_RES);

        // Half an orbit passes between two ticks
        let tick = 10.0 + period / 2.0;
        let now = orbit.ground_point(&body, tick).unwrap();
        let live = VehicleSample {
            altitude: now.altitude,
            ..sample(&body, &orbit, now.latitude, now.longitude)
        };
        let stats = ScanSampler::default().scan_pass(&mut vehicle, &live, tick, &mut grid);

        assert!(stats.samples > 100, "samples = {}", stats.samples);
        assert!(stats.max_depth <= 20);
        grid.refresh();
        // The equator is covered all the way between the two samples
        for lon in (5..=175).step_by(10) {
            assert_eq!(
                grid.cell(lon as f64, 0.0),
                SensorType::ALTIMETRY_LO_RES,
                "gap at longitude {}",
                lon
            );
        }
    }

    #[test]
    fn test_queue_cleared_between_passes() {
        let body = kerbin();
        let eph = Linear::new(2_000.0);
        let mut vehicle = anchored(vehicle_with(SensorType::BIOME), 0.0, 0.0, 1.0);
        let mut grid = seeded(SensorType::BIOME);
        let mut sampler = ScanSampler::new(4, 1.0);

        let first = sampler.scan_pass(&mut vehicle, &sample(&body, &eph, 0.0, 303.0), 101.0, &mut grid);
        let second = sampler.scan_pass(&mut vehicle, &sample(&body, &eph, 0.0, 303.0), 101.0, &mut grid);

        assert_eq!(first, second);
        assert!(sampler.queue.is_empty());
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_depth_never_exceeds_limit(
                gap in 1.0f64..1.0e7,
                max_resolution in 0u32..8,
                inclination in 0.0f64..180.0,
            ) {
                let body = kerbin().with_rotation_period(21_549.4);
                let mut orbit = CircularOrbit::new(&body, 150_000.0, KERBIN_MU)
                    .with_inclination(inclination);
                let last_ut = 100.0;
                let tick = last_ut + gap;
                orbit.set_frame_time(tick);

                let mut vehicle = vehicle_with(SensorType::BIOME);
                vehicle.record_anchor("Kerbin", 0.0, 0.0, 1, last_ut);
                let mut grid = seeded(SensorType::BIOME);
                let now = orbit.ground_point(&body, tick).unwrap();

                let mut sampler = ScanSampler::new(max_resolution, 1.0);
                let stats = sampler.scan_pass(
                    &mut vehicle,
                    &sample(&body, &orbit, now.latitude, now.longitude),
                    tick,
                    &mut grid,
                );

                prop_assert!(stats.max_depth <= max_resolution);
                prop_assert!(u64::from(stats.samples) <= 1u64 << max_resolution);
            }
        }
    }
}
