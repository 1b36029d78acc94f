//! Inspect command - summarize a saved scan state file.

use std::path::PathBuf;

use clap::Args;
use orbscan::controller::ScanController;
use orbscan::coverage::CoverageMap;
use orbscan::persistence::{RestoreReport, ScanState};

use super::common::print_coverage;
use crate::error::CliError;

/// Arguments for the inspect command.
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Scan state file (JSON)
    pub path: PathBuf,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> Result<RestoreReport, CliError> {
    let state = ScanState::load(&args.path)?;
    let mut controller: ScanController = ScanController::default();
    let report = state.apply(&mut controller);

    println!("Scan state: {}", args.path.display());
    if state.version.is_empty() {
        println!("Saved by:   unknown version");
    } else {
        println!("Saved by:   orbscan {}", state.version);
    }
    println!();

    println!("Vehicles ({}):", controller.registry().len());
    for vehicle in controller.registry().vehicles() {
        println!(
            "  {} {}",
            vehicle.id,
            vehicle.name.as_deref().unwrap_or("(unnamed)")
        );
        for sensor in vehicle.sensors.values() {
            println!(
                "    {:<16} fov {:>4.1}°  range {:.0}-{:.0} m  best {:.0} m",
                sensor.kind.label(),
                sensor.fov,
                sensor.min_altitude,
                sensor.max_altitude,
                sensor.best_altitude
            );
        }
    }
    println!();

    println!("Bodies ({}):", report.bodies + report.failed_bodies.len());
    for (name, map) in controller.bodies() {
        let status = if map.is_enabled() { "" } else { " (disabled)" };
        println!("  {}{}", name, status);
        print_coverage(map);
    }

    if !report.failed_bodies.is_empty() {
        println!();
        println!(
            "Warning: {} map(s) could not be decoded and were reset: {}",
            report.failed_bodies.len(),
            report.failed_bodies.join(", ")
        );
    }
    if report.skipped_sensors > 0 {
        println!(
            "Warning: skipped {} sensor record(s) of unknown type",
            report.skipped_sensors
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::BodyPreset;
    use crate::commands::simulate::{self, SimulateArgs};

    #[test]
    fn test_inspect_simulated_campaign() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campaign.json");

        simulate::run(SimulateArgs {
            body: BodyPreset::Mun,
            altitude: 60.0,
            inclination: 70.0,
            sensors: "altimetry-lo,anomaly".to_string(),
            name: "Mapper".to_string(),
            warp: 500.0,
            tick_seconds: 1.0,
            ticks: 20,
            max_resolution: None,
            never_zero: false,
            config: None,
            save: Some(path.clone()),
        })
        .unwrap();

        let report = run(InspectArgs { path }).unwrap();
        assert_eq!(report.vehicles, 1);
        assert_eq!(report.bodies, 1);
        assert!(report.failed_bodies.is_empty());
        assert_eq!(report.skipped_sensors, 0);
    }

    #[test]
    fn test_inspect_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(InspectArgs {
            path: dir.path().join("missing.json"),
        });
        assert!(matches!(result, Err(CliError::Persistence(_))));
    }

    #[test]
    fn test_inspect_reports_corrupt_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.json");
        std::fs::write(
            &path,
            r#"{ "scanners": [], "progress": [ { "name": "Eve", "disabled": false, "map": "zz" } ] }"#,
        )
        .unwrap();

        let report = run(InspectArgs { path }).unwrap();
        assert_eq!(report.bodies, 0);
        assert_eq!(report.failed_bodies, vec!["Eve".to_string()]);
    }
}
