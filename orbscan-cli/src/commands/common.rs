//! Common types and utilities shared across CLI commands.

use clap::ValueEnum;
use orbscan::coverage::CoverageMap;
use orbscan::ephemeris::Body;
use orbscan::science::{Experiment, ScienceSubject};
use orbscan::sensor::SensorType;

/// Built-in body selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum BodyPreset {
    /// Homeworld with terrain and biomes
    Kerbin,
    /// Large, slowly rotating moon
    Mun,
    /// Small, fast-rotating moon
    Minmus,
    /// Gas giant (no terrain, no biomes)
    Jool,
}

impl BodyPreset {
    /// The body this preset describes.
    pub fn body(&self) -> Body {
        match self {
            BodyPreset::Kerbin => Body::new("Kerbin", 600_000.0, 84_159_286.0)
                .with_rotation_period(21_549.425),
            BodyPreset::Mun => {
                Body::new("Mun", 200_000.0, 2_429_559.1).with_rotation_period(138_984.38)
            }
            BodyPreset::Minmus => {
                Body::new("Minmus", 60_000.0, 2_247_428.4).with_rotation_period(40_400.0)
            }
            BodyPreset::Jool => Body::new("Jool", 6_000_000.0, 2_455_985_200.0)
                .with_rotation_period(36_000.0)
                .with_terrain(false)
                .with_biomes(false),
        }
    }

    /// Gravitational parameter (m³/s²).
    pub fn mu(&self) -> f64 {
        match self {
            BodyPreset::Kerbin => 3.5316e12,
            BodyPreset::Mun => 6.5138398e10,
            BodyPreset::Minmus => 1.7658e9,
            BodyPreset::Jool => 2.82528e14,
        }
    }

    /// Science multiplier used by the demo subject catalog.
    pub fn science_multiplier(&self) -> f64 {
        match self {
            BodyPreset::Kerbin => 1.0,
            BodyPreset::Mun => 4.0,
            BodyPreset::Minmus => 5.0,
            BodyPreset::Jool => 7.0,
        }
    }
}

/// Subject metadata for the demo catalog.
///
/// Every experiment is capped at 40 science scaled by the body multiplier;
/// nothing has been collected yet.
pub fn demo_subject(preset: BodyPreset, experiment: Experiment, body: &Body) -> ScienceSubject {
    let multiplier = preset.science_multiplier();
    ScienceSubject {
        id: format!("{}@{}", experiment.id(), body.name),
        science_cap: 40.0 * multiplier,
        scientific_value: 1.0,
        subject_value: multiplier,
        collected: 0.0,
    }
}

/// Print one line per sensor with its coverage percentage.
pub fn print_coverage<C: CoverageMap>(map: &C) {
    for sensor in SensorType::SINGLE_BITS {
        println!(
            "    {:<16} {:>6.2}%",
            sensor.label(),
            map.coverage_percentage(sensor)
        );
    }
}
