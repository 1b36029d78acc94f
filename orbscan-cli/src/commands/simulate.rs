//! Simulate command - fly a survey campaign around a body.
//!
//! A single vehicle on a circular orbit is ticked at a fixed real-time
//! cadence while the universal time advances `warp` times faster. Coverage
//! and the science it unlocks are reported at the end.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use orbscan::config::{ScanConfig, MAX_RESOLUTION_LIMIT};
use orbscan::controller::{ScanController, TickClock, VehicleUpdate};
use orbscan::coverage::CoverageMap;
use orbscan::ephemeris::{Body, CircularOrbit, Ephemeris};
use orbscan::persistence::ScanState;
use orbscan::sampler::VehicleSample;
use orbscan::science::{Experiment, ScienceOffer, ScienceSubject};
use orbscan::sensor::{SensorEnvelope, SensorType, VehicleId};

use super::common::{demo_subject, print_coverage, BodyPreset};
use crate::error::CliError;

/// Arguments for the simulate command.
#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Body to orbit
    #[arg(long, value_enum, default_value_t = BodyPreset::Kerbin)]
    pub body: BodyPreset,

    /// Orbit altitude above the surface, in kilometers
    #[arg(long, default_value_t = 250.0)]
    pub altitude: f64,

    /// Orbit inclination, in degrees
    #[arg(long, default_value_t = 85.0)]
    pub inclination: f64,

    /// Sensors carried, comma separated (e.g. "altimetry-lo,biome")
    #[arg(long, default_value = "everything")]
    pub sensors: String,

    /// Vehicle name
    #[arg(long, default_value = "Surveyor")]
    pub name: String,

    /// Seconds of universal time per real second
    #[arg(long, default_value_t = 1_000.0)]
    pub warp: f64,

    /// Real seconds between ticks
    #[arg(long, default_value_t = 1.0)]
    pub tick_seconds: f64,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    pub ticks: u64,

    /// Override the bisection depth limit
    #[arg(long)]
    pub max_resolution: Option<u32>,

    /// Report a tiny non-zero yield instead of nothing
    #[arg(long)]
    pub never_zero: bool,

    /// Scan settings file (INI)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the resulting scan state to this file (JSON)
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// What a simulation run produced.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    /// Ticks the controller admitted.
    pub ticks_run: u64,
    /// Ticks rejected by throttling.
    pub throttled: u64,
    /// Total sample points registered.
    pub samples: u64,
    /// Deepest bisection level reached.
    pub max_depth: u32,
    /// Final coverage percentage per single sensor.
    pub coverage: Vec<(SensorType, f64)>,
    /// Science available at the end of the run.
    pub offer: Option<ScienceOffer>,
}

fn validate(args: &SimulateArgs) -> Result<SensorType, CliError> {
    let positive = |value: f64| value.is_finite() && value > 0.0;
    if !positive(args.altitude) {
        return Err(CliError::InvalidArgument(format!(
            "altitude must be positive, got {} km",
            args.altitude
        )));
    }
    if !positive(args.warp) || !positive(args.tick_seconds) {
        return Err(CliError::InvalidArgument(
            "warp and tick-seconds must be positive".to_string(),
        ));
    }
    if args.ticks == 0 {
        return Err(CliError::InvalidArgument("ticks must be at least 1".to_string()));
    }
    let span = args.ticks as f64 * args.tick_seconds;
    if Duration::try_from_secs_f64(span).is_err() || !(span * args.warp).is_finite() {
        return Err(CliError::InvalidArgument(format!(
            "{} ticks of {} s at {}x warp is too long to simulate",
            args.ticks, args.tick_seconds, args.warp
        )));
    }
    if let Some(depth) = args.max_resolution {
        if depth > MAX_RESOLUTION_LIMIT {
            return Err(CliError::InvalidArgument(format!(
                "max-resolution must be at most {}, got {}",
                MAX_RESOLUTION_LIMIT, depth
            )));
        }
    }

    let sensors: SensorType = args.sensors.parse().map_err(CliError::InvalidArgument)?;
    if sensors.is_empty() {
        return Err(CliError::InvalidArgument("no sensors selected".to_string()));
    }
    Ok(sensors)
}

fn load_config(args: &SimulateArgs) -> Result<ScanConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::default(),
    };
    if let Some(depth) = args.max_resolution {
        config = config.with_max_resolution(depth);
    }
    Ok(config)
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<SimulationSummary, CliError> {
    let sensors = validate(&args)?;
    let config = load_config(&args)?;

    let preset = args.body;
    let body = preset.body();
    let mut orbit = CircularOrbit::new(&body, args.altitude * 1_000.0, preset.mu())
        .with_inclination(args.inclination);
    let start = orbit.ground_point(&body, 0.0).ok_or_else(|| {
        CliError::InvalidArgument(format!("cannot evaluate an orbit around {}", body.name))
    })?;

    let vehicle = VehicleId::new_random();
    let mut controller: ScanController = ScanController::new(config);
    let registry = controller.registry_mut();
    registry.register_sensors_at(
        vehicle,
        sensors,
        SensorEnvelope::DEFAULTS,
        start.latitude,
        start.longitude,
    );
    registry
        .set_vehicle_name(vehicle, args.name.as_str())
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    println!(
        "Surveying {} from {:.0} km at {:.1}° inclination ({:.0} s orbit)",
        body.name,
        args.altitude,
        args.inclination,
        orbit.orbital_period()
    );
    let labels: Vec<_> = sensors.single_bits().map(|sensor| sensor.label()).collect();
    println!("Sensors: {}", labels.join(", "));
    println!(
        "Warp: {}x, {} ticks every {} s",
        args.warp, args.ticks, args.tick_seconds
    );
    println!();

    let mut summary = SimulationSummary {
        ticks_run: 0,
        throttled: 0,
        samples: 0,
        max_depth: 0,
        coverage: Vec::new(),
        offer: None,
    };

    for frame in 1..=args.ticks {
        let realtime = frame as f64 * args.tick_seconds;
        let ut = realtime * args.warp;
        orbit.set_frame_time(ut);

        let Some(point) = orbit.ground_point(&body, ut) else {
            tracing::warn!(ut, "Orbit could not be evaluated, skipping tick");
            continue;
        };
        let update = VehicleUpdate::new(
            vehicle,
            VehicleSample {
                body: &body,
                latitude: point.latitude,
                longitude: point.longitude,
                altitude: point.altitude,
                terrain_altitude: None,
                landed: false,
                ephemeris: &orbit,
            },
        );
        let elapsed = Duration::try_from_secs_f64(realtime)
            .map_err(|e| CliError::InvalidArgument(format!("tick time {} s: {}", realtime, e)))?;
        let clock = TickClock::new(frame, elapsed, ut);

        match controller.tick(&clock, Some(body.name.as_str()), &[update]) {
            Some(stats) => {
                summary.ticks_run += 1;
                summary.samples += u64::from(stats.samples);
                summary.max_depth = summary.max_depth.max(stats.max_depth);
            }
            None => summary.throttled += 1,
        }
    }
    controller.refresh_coverage();

    if let Some(map) = controller.coverage(&body.name) {
        summary.coverage = SensorType::SINGLE_BITS
            .iter()
            .map(|&sensor| (sensor, map.coverage_percentage(sensor)))
            .collect();
    }

    let catalog = |experiment: Experiment, body: &Body| -> Option<ScienceSubject> {
        Some(demo_subject(preset, experiment, body))
    };
    summary.offer = controller.available_science(&body, sensors, args.never_zero, &catalog);

    print_summary(&body.name, &controller, &summary);

    if let Some(path) = &args.save {
        ScanState::capture(&controller)?.save(path)?;
        println!();
        println!("Scan state saved to {}", path.display());
    }

    Ok(summary)
}

fn print_summary(body: &str, controller: &ScanController, summary: &SimulationSummary) {
    println!("Ticks:       {} run, {} throttled", summary.ticks_run, summary.throttled);
    println!("Samples:     {}", summary.samples);
    println!("Max depth:   {}", summary.max_depth);
    println!();
    println!("Coverage of {}:", body);
    if let Some(map) = controller.coverage(body) {
        print_coverage(map);
    }
    println!();
    match &summary.offer {
        Some(offer) => println!(
            "Science: {} [{}] at {:.1}% coverage is worth {:.2}",
            offer.title, offer.subject_id, offer.coverage, offer.value
        ),
        None => println!("Science: no experiment applies"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SimulateArgs {
        SimulateArgs {
            body: BodyPreset::Kerbin,
            altitude: 250.0,
            inclination: 85.0,
            sensors: "biome".to_string(),
            name: "Test".to_string(),
            warp: 1_000.0,
            tick_seconds: 1.0,
            ticks: 40,
            max_resolution: None,
            never_zero: false,
            config: None,
            save: None,
        }
    }

    #[test]
    fn test_simulation_produces_coverage() {
        let summary = run(args()).unwrap();

        assert_eq!(summary.ticks_run, 40);
        assert_eq!(summary.throttled, 0);
        assert!(summary.samples > 40);
        let biome = summary
            .coverage
            .iter()
            .find(|(sensor, _)| *sensor == SensorType::BIOME)
            .map(|(_, pct)| *pct)
            .unwrap();
        assert!(biome > 0.0);

        let offer = summary.offer.unwrap();
        assert_eq!(offer.subject_id, "biome-anomaly@Kerbin");
    }

    #[test]
    fn test_fast_ticks_are_throttled() {
        let summary = run(SimulateArgs {
            tick_seconds: 0.5,
            ticks: 10,
            ..args()
        })
        .unwrap();

        assert_eq!(summary.ticks_run, 5);
        assert_eq!(summary.throttled, 5);
    }

    #[test]
    fn test_invalid_arguments() {
        for bad in [
            SimulateArgs { altitude: 0.0, ..args() },
            SimulateArgs { ticks: 0, ..args() },
            SimulateArgs { warp: -1.0, ..args() },
            SimulateArgs { sensors: "sonar".to_string(), ..args() },
            SimulateArgs { sensors: "".to_string(), ..args() },
            SimulateArgs { max_resolution: Some(31), ..args() },
            SimulateArgs { tick_seconds: 1.0e20, ticks: 1, ..args() },
            SimulateArgs { warp: 1.0e300, tick_seconds: 1.0e10, ..args() },
        ] {
            assert!(matches!(run(bad), Err(CliError::InvalidArgument(_))));
        }
    }

    #[test]
    fn test_save_writes_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campaign.json");

        run(SimulateArgs {
            ticks: 5,
            save: Some(path.clone()),
            ..args()
        })
        .unwrap();

        let state = ScanState::load(&path).unwrap();
        assert_eq!(state.scanners.len(), 1);
        assert_eq!(state.scanners[0].name.as_deref(), Some("Test"));
        assert_eq!(state.progress.len(), 1);
        assert_eq!(state.progress[0].name, "Kerbin");
    }

    #[test]
    fn test_config_file_is_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.ini");
        std::fs::write(&path, "[scan]\ntime_warp_resolution = 0\n").unwrap();

        let summary = run(SimulateArgs {
            ticks: 10,
            config: Some(path),
            ..args()
        })
        .unwrap();

        assert_eq!(summary.max_depth, 0);
        assert_eq!(summary.samples, 10);
    }
}
