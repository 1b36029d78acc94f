//! Scan orchestration.
//!
//! [`ScanController`] owns everything scanning needs between ticks: the
//! sensor registry, one coverage map per body, the tick gate, and the
//! diagnostics of the last tick.
//!
//! # Tick
//!
//! ```text
//! gate ──► refresh every map ──► for each vehicle update:
//!                                   scan pass (if eligible)
//!                                   record anchor (always)
//! ```
//!
//! A vehicle is eligible when it is registered with at least one sensor,
//! is not debris, its body's map is enabled, and either background
//! scanning is on or it orbits the focus body.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use orbscan::config::ScanConfig;
//! use orbscan::controller::{ScanController, TickClock, VehicleUpdate};
//! use orbscan::ephemeris::{Body, CircularOrbit};
//! use orbscan::sampler::VehicleSample;
//! use orbscan::sensor::{SensorEnvelope, SensorType, VehicleId};
//!
//! let kerbin = Body::new("Kerbin", 600_000.0, 84_159_286.0);
//! let orbit = CircularOrbit::new(&kerbin, 200_000.0, 3.5316e12);
//! let id = VehicleId::new_random();
//!
//! let mut controller: ScanController = ScanController::new(ScanConfig::default());
//! controller
//!     .registry_mut()
//!     .register_sensors(id, SensorType::BIOME, SensorEnvelope::DEFAULTS);
//!
//! let update = VehicleUpdate::new(
//!     id,
//!     VehicleSample {
//!         body: &kerbin,
//!         latitude: 0.0,
//!         longitude: 0.0,
//!         altitude: 200_000.0,
//!         terrain_altitude: None,
//!         landed: false,
//!         ephemeris: &orbit,
//!     },
//! );
//! let clock = TickClock::new(1, Duration::from_secs(5), 10.0);
//! let stats = controller.tick(&clock, Some("Kerbin"), &[update]).unwrap();
//! assert_eq!(stats.active_vehicles, 1);
//! ```

mod gate;

pub use gate::{TickClock, TickGate};

use std::collections::BTreeMap;

use crate::config::ScanConfig;
use crate::coverage::{CoverageMap, GridCoverage};
use crate::ephemeris::Body;
use crate::sampler::{PassStats, ScanSampler, VehicleSample};
use crate::science::{science_yield, select_experiment, ScienceOffer, SubjectCatalog};
use crate::sensor::{SensorRegistry, SensorType, VehicleId};

/// One vehicle's live state, handed to [`ScanController::tick`].
pub struct VehicleUpdate<'a> {
    /// Vehicle identity.
    pub id: VehicleId,
    /// Current position and orbit.
    pub sample: VehicleSample<'a>,
    /// Debris never scans, whatever sensors it once had.
    pub debris: bool,
}

impl<'a> VehicleUpdate<'a> {
    /// An update for a regular (non-debris) vehicle.
    pub fn new(id: VehicleId, sample: VehicleSample<'a>) -> Self {
        Self {
            id,
            sample,
            debris: false,
        }
    }

    /// Mark the vehicle as debris.
    pub fn as_debris(mut self) -> Self {
        self.debris = true;
        self
    }
}

/// Diagnostics for the last admitted tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Samples registered across all vehicle passes.
    pub samples: u32,
    /// Deepest bisection level reached by any pass.
    pub max_depth: u32,
    /// Steps abandoned because an orbit could not be evaluated.
    pub abandoned: u32,
    /// Steps dropped as converged.
    pub converged: u32,
    /// Vehicles that ran a scan pass.
    pub active_vehicles: usize,
    /// Sensors carried by those vehicles.
    pub active_sensors: usize,
}

impl ScanStats {
    fn absorb(&mut self, pass: &PassStats) {
        self.samples += pass.samples;
        self.max_depth = self.max_depth.max(pass.max_depth);
        self.abandoned += pass.abandoned;
        self.converged += pass.converged;
    }
}

/// Owns scanning state and runs ticks.
#[derive(Debug)]
pub struct ScanController<C = GridCoverage> {
    config: ScanConfig,
    registry: SensorRegistry,
    maps: BTreeMap<String, C>,
    sampler: ScanSampler,
    gate: TickGate,
    stats: ScanStats,
    last_tick_ut: f64,
}

impl<C: CoverageMap + Default> ScanController<C> {
    /// Create a controller with no vehicles and no maps.
    pub fn new(config: ScanConfig) -> Self {
        let sampler = ScanSampler::from_config(&config);
        Self {
            config,
            registry: SensorRegistry::new(),
            maps: BTreeMap::new(),
            sampler,
            gate: TickGate::new(),
            stats: ScanStats::default(),
            last_tick_ut: 0.0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Sensor registry.
    pub fn registry(&self) -> &SensorRegistry {
        &self.registry
    }

    /// Mutable sensor registry, for registering and removing sensors.
    pub fn registry_mut(&mut self) -> &mut SensorRegistry {
        &mut self.registry
    }

    /// Diagnostics of the last admitted tick.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Universal time of the last admitted tick.
    pub fn last_tick_ut(&self) -> f64 {
        self.last_tick_ut
    }

    /// Coverage map of a body, if it has one yet.
    pub fn coverage(&self, body: &str) -> Option<&C> {
        self.maps.get(body)
    }

    /// Coverage map of a body, created empty on first use.
    pub fn coverage_mut(&mut self, body: &str) -> &mut C {
        self.maps.entry(body.to_string()).or_default()
    }

    /// All bodies with a coverage map, in name order.
    pub fn bodies(&self) -> impl Iterator<Item = (&str, &C)> {
        self.maps.iter().map(|(name, map)| (name.as_str(), map))
    }

    /// Whether scanning of a body is enabled. Bodies without a map are.
    pub fn is_body_enabled(&self, body: &str) -> bool {
        self.maps.get(body).map_or(true, |map| map.is_enabled())
    }

    /// Enable or disable scanning of a body.
    pub fn set_body_enabled(&mut self, body: &str, enabled: bool) {
        self.coverage_mut(body).set_enabled(enabled);
        tracing::info!(body, enabled, "Body scanning toggled");
    }

    /// Recompute aggregate coverage of every map.
    ///
    /// Ticks do this on their own; call it to read coverage that includes
    /// the passes of the last tick.
    pub fn refresh_coverage(&mut self) {
        for map in self.maps.values_mut() {
            map.refresh();
        }
    }

    /// Run one tick.
    ///
    /// Returns `None` when the tick gate rejects it. `focus_body` restricts
    /// scanning to one body when background scanning is off.
    pub fn tick(
        &mut self,
        clock: &TickClock,
        focus_body: Option<&str>,
        updates: &[VehicleUpdate<'_>],
    ) -> Option<ScanStats> {
        if !self.gate.admit(clock, self.config.min_tick_interval) {
            tracing::trace!(frame = clock.frame, "Tick throttled");
            return None;
        }

        let tick_ut = clock.universal_time;
        self.last_tick_ut = tick_ut;
        self.stats = ScanStats::default();
        self.refresh_coverage();

        for update in updates {
            let Ok(vehicle) = self.registry.vehicle_mut(update.id) else {
                continue;
            };
            let body = update.sample.body;
            let map = self.maps.entry(body.name.clone()).or_default();

            let in_focus = self.config.scan_background || focus_body == Some(body.name.as_str());
            if map.is_enabled() && in_focus && !update.debris && !vehicle.sensors.is_empty() {
                let pass = self
                    .sampler
                    .scan_pass(vehicle, &update.sample, tick_ut, map);
                self.stats.absorb(&pass);
                self.stats.active_vehicles += 1;
                self.stats.active_sensors += vehicle.sensors.len();
            }

            vehicle.record_anchor(
                &body.name,
                update.sample.latitude,
                update.sample.longitude,
                clock.frame,
                tick_ut,
            );
        }

        tracing::debug!(
            ut = tick_ut,
            frame = clock.frame,
            samples = self.stats.samples,
            max_depth = self.stats.max_depth,
            converged = self.stats.converged,
            vehicles = self.stats.active_vehicles,
            sensors = self.stats.active_sensors,
            "Scan tick complete"
        );
        Some(self.stats)
    }

    /// Science a vehicle carrying `sensors` could return for `body` now.
    ///
    /// `None` when no experiment applies or the catalog has no subject.
    pub fn available_science(
        &self,
        body: &Body,
        sensors: SensorType,
        never_zero: bool,
        catalog: &impl SubjectCatalog,
    ) -> Option<ScienceOffer> {
        let experiment = select_experiment(body, sensors)?;
        let coverage = self
            .maps
            .get(&body.name)
            .map_or(0.0, |map| map.coverage_percentage(experiment.coverage_mask()));
        let subject = catalog.subject(experiment, body)?;
        let value = science_yield(coverage, &subject, never_zero);

        Some(ScienceOffer {
            experiment,
            subject_id: subject.id,
            title: format!("{} of {}", experiment.title(), body.name),
            coverage,
            value,
        })
    }

    /// Insert a restored map, replacing any existing one.
    pub(crate) fn insert_map(&mut self, body: String, map: C) {
        self.maps.insert(body, map);
    }
}

impl<C: CoverageMap + Default> Default for ScanController<C> {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}
